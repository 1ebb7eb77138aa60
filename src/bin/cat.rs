fn main() {
    unixkit::cli::main::<unixkit::cli::commands::cat::CatArgs>()
}
