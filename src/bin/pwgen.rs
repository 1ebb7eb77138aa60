fn main() {
    unixkit::cli::main::<unixkit::cli::commands::pwgen::PwgenArgs>()
}
