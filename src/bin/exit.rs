fn main() {
    unixkit::cli::main::<unixkit::cli::commands::exit::ExitArgs>()
}
