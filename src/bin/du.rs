fn main() {
    unixkit::cli::main::<unixkit::cli::commands::du::DuArgs>()
}
