fn main() {
    unixkit::cli::main::<unixkit::cli::commands::head::HeadArgs>()
}
