fn main() {
    unixkit::cli::main::<unixkit::cli::commands::df::DfArgs>()
}
