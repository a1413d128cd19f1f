fn main() {
    if let Err(err) = choromap::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
