fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    #[cfg(windows)]
    let _ = enable_ansi_support::enable_ansi_support();

    shopclock::cli::run_and_exit();
}
