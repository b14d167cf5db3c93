fn main() {
    env_logger::init();

    if let Err(e) = pharos::run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
