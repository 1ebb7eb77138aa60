fn main() {
    unixkit::cli::main::<unixkit::cli::commands::wc::WcArgs>()
}
