fn main() {
    if let Err(e) = ulpcheck::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
