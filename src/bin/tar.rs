fn main() {
    unixkit::cli::main::<unixkit::cli::commands::tar::TarArgs>()
}
