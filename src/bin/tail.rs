fn main() {
    unixkit::cli::main::<unixkit::cli::commands::tail::TailArgs>()
}
