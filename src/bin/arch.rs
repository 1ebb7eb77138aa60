fn main() {
    unixkit::cli::main::<unixkit::cli::commands::arch::ArchArgs>()
}
