fn main() {
    unixkit::cli::main::<unixkit::cli::commands::rm::RmArgs>()
}
