fn main() {
    unixkit::cli::main::<unixkit::cli::commands::nl::NlArgs>()
}
