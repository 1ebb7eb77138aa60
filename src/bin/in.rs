fn main() {
    unixkit::cli::main::<unixkit::cli::commands::bang_n::BangNArgs>()
}
