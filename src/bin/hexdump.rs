fn main() {
    unixkit::cli::main::<unixkit::cli::commands::hexdump::HexdumpArgs>()
}
