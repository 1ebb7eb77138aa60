fn main() {
    unixkit::cli::main::<unixkit::cli::commands::pwd::PwdArgs>()
}
