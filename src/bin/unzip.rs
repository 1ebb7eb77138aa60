fn main() {
    unixkit::cli::main::<unixkit::cli::commands::unzip::UnzipArgs>()
}
