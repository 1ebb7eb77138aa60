fn main() {
    unixkit::cli::main::<unixkit::cli::commands::ls::LsArgs>()
}
