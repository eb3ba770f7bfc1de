use std::{path::Path, sync::OnceLock};
use tracing_subscriber::{fmt, EnvFilter};

static GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
static INIT: OnceLock<()> = OnceLock::new();

/// Initialise logging once for the whole process, writing to `path`.
/// `RUST_LOG` overrides `filter` when set (e.g. `search=debug`).
pub fn init_logging<P: AsRef<Path>>(path: P, filter: &str) {
    INIT.get_or_init(|| {
        let path = path.as_ref();

        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }

        let file = match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => file,
            // Logging is best-effort; an unwritable path must not kill the
            // engine mid-game.
            Err(_) => return,
        };

        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let _ = GUARD.set(guard);

        let env_filter = if std::env::var_os("RUST_LOG").is_some() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let subscriber = fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(true)
            .with_writer(non_blocking)
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
