fn main() {
    unixkit::cli::main::<unixkit::cli::commands::clear::ClearArgs>()
}
