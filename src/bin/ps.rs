fn main() {
    unixkit::cli::main::<unixkit::cli::commands::ps::PsArgs>()
}
