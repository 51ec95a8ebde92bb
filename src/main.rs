fn main() {
    if let Err(err) = pie_allocator::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
