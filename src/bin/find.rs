fn main() {
    unixkit::cli::main::<unixkit::cli::commands::find::FindArgs>()
}
