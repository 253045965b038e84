//! Log output setup

use std::io::Write;

use env_logger::Env;

/// Initialise `env_logger` from `RUST_LOG`, defaulting to warnings.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let result = env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            // Drop the crate prefix and turn the module path into a file-like path
            let target = record.target();
            let target = target.strip_prefix("sheetdiff::").unwrap_or(target);

            writeln!(
                buf,
                "[{}] {} - {} {}",
                record.level(),
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                target.replace("::", "/"),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        log::trace!("logger already initialised");
    }
}
