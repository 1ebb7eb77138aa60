fn main() {
    unixkit::cli::main::<unixkit::cli::commands::cd::CdArgs>()
}
