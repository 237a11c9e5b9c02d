fn main() {
    if let Err(e) = vigil::run() {
        eprintln!("vigil: {e}");
        std::process::exit(1);
    }
}
