fn main() {
    unixkit::cli::main::<unixkit::cli::commands::file::FileArgs>()
}
