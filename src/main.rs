fn main() {
    if let Err(err) = interviewmate_lib::run() {
        log::error!("{err:#}");
        eprintln!("interviewmate: {err:#}");
        std::process::exit(1);
    }
}
