//! schoolrec - command-line console for school records.
//!
//! Lists, adds, edits and deletes admin records, and stages class timetables and student
//! enrollments before saving them in one request.

mod app;
mod cli;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::{Command, USAGE};
use schoolrec_core::config::Config;

/// Log file name prefix; the appender adds the date
const LOG_FILE_PREFIX: &str = "schoolrec.log";

/// Initialize the tracing subscriber for logging.
///
/// Returns the file writer guard, which must live until exit so buffered
/// lines are flushed.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn log_dir() -> Option<PathBuf> {
    Config::default().cache_dir().ok().map(|dir| dir.join("logs"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing(log_dir());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return Err(e);
        }
    };

    if command == Command::Help {
        print!("{}", USAGE);
        return Ok(());
    }

    info!(?command, "schoolrec starting");
    let mut app = App::new()?;

    match command {
        Command::Login { username } => app.login(username).await,
        Command::Logout => app.logout(),
        Command::List {
            resource,
            page,
            search,
        } => app.list(resource, page, &search).await,
        Command::Add {
            resource,
            body_file,
        } => app.add(resource, &body_file).await,
        Command::Edit {
            resource,
            id,
            body_file,
        } => app.edit(resource, &id, &body_file).await,
        Command::Delete { resource, id } => app.delete(resource, &id).await,
        Command::Schedule {
            class_id,
            level_id,
            rows_file,
        } => app.schedule(&class_id, &level_id, &rows_file).await,
        Command::Enroll {
            student_id,
            class_id,
            slot_ids,
            remarks,
        } => {
            app.enroll(&student_id, &class_id, &slot_ids, remarks.as_deref())
                .await
        }
        Command::Help => Ok(()),
    }
}
