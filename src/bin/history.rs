fn main() {
    unixkit::cli::main::<unixkit::cli::commands::history::HistoryArgs>()
}
