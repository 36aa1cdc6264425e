use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Initialize the logger shared by all arcade binaries.
///
/// Format: `[YYYY-mm-dd HH:MM:SS] [LEVEL] message`. Defaults to INFO, `RUST_LOG`
/// overrides it.
pub fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .parse_env(Env::default())
        .init();
}
