fn main() {
    scan_renamer::cli::run();
}
