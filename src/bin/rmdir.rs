fn main() {
    unixkit::cli::main::<unixkit::cli::commands::rmdir::RmdirArgs>()
}
