fn main() {
    unixkit::cli::main::<unixkit::cli::commands::cp::CpArgs>()
}
