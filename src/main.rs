//! Binary entry point: resolve configuration, start logging, open the
//! database, and drive the Ratatui event loop until the user quits.
use anyhow::Context;
use student_registry::logging::init_logging;
use student_registry::{open_store, run_app, App, Config, Session};
use tracing::info;

/// A database that cannot be opened ends the program before the UI appears;
/// the error bubbles up to the terminal through `anyhow`.
fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    let _log_guard = match init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    let conn = open_store(&config.database_path).with_context(|| {
        format!(
            "could not connect to the student database at {}",
            config.database_path.display()
        )
    })?;
    info!("session started");

    let mut app = App::new(Session::new(conn));
    app.start();
    let result = run_app(&mut app);

    app.into_session()
        .close()
        .context("failed to close the student database")?;
    info!("session ended");
    result
}
