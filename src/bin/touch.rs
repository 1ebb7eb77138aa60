fn main() {
    unixkit::cli::main::<unixkit::cli::commands::touch::TouchArgs>()
}
