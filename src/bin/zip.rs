fn main() {
    unixkit::cli::main::<unixkit::cli::commands::zip::ZipArgs>()
}
