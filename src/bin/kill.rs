fn main() {
    unixkit::cli::main::<unixkit::cli::commands::kill::KillArgs>()
}
