use env_logger::Env;

/// Initializes the global logger.
///
/// Call this first!
///
/// The logs are written to the standard error, because the standard output
/// belongs to the metrics agent. Use `RUST_LOG` to change the level.
///
/// # Example
///
/// ```
/// use raritan_agent::init_logger;
///
/// fn main() {
///     init_logger();
///     log::info!("I can log now!");
/// }
/// ```
pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Print a warning if we are running in debug mode.
    #[cfg(debug_assertions)]
    {
        log::warn!("DEBUG assertions are enabled, this build is fine for debugging, but not for production.");
    }
}
