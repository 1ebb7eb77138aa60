fn main() {
    unixkit::cli::main::<unixkit::cli::commands::uname::UnameArgs>()
}
