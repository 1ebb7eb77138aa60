fn main() {
    unixkit::cli::main::<unixkit::cli::commands::free::FreeArgs>()
}
