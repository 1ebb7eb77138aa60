fn main() {
    unixkit::cli::main::<unixkit::cli::commands::mkdir::MkdirArgs>()
}
