fn main() {
    unixkit::cli::main::<unixkit::cli::commands::date::DateArgs>()
}
