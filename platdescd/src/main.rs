#![deny(unsafe_code)]

mod config;

use config::Config;
use platdesc_api::{InitHandler, ObjectHandle, UsingResolver};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Resolves `using` directives relative to the directory of the file
/// that named them.
struct FileResolver;

impl UsingResolver for FileResolver {
    fn resolve(&self, include_path: &str, including_file: Option<&Path>) -> io::Result<PathBuf> {
        let base = including_file
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(base.join(include_path))
    }
}

/// An init handler that logs each line it would have run rather than
/// executing anything; running arbitrary init-section commands is the
/// host's business, not this driver's.
struct LoggingInit;

impl InitHandler for LoggingInit {
    fn validate(&self, _container: ObjectHandle, _lines: &[String]) -> Result<(), String> {
        Ok(())
    }

    fn execute(&self, container: ObjectHandle, lines: &[String], _on_error: &mut dyn FnMut(String)) {
        for line in lines {
            tracing::debug!(?container, %line, "init line");
        }
    }
}

fn init_app() -> Option<Config> {
    let cfg = config::get()?;

    tracing_subscriber::fmt()
        .with_max_level(cfg.get_log_level())
        .with_target(false)
        .init();

    Some(cfg)
}

fn run(cfg: Config) -> ExitCode {
    let (catalog, mut machine) = platdesc_toy_machine::new_toy_machine();

    match platdesc_driver::process_file(&cfg.description, &FileResolver, &catalog, &mut machine, &LoggingInit) {
        Ok(()) => {
            tracing::info!(objects = catalog.object_count(), "platform built");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error E{:02}: {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    match init_app() {
        Some(cfg) => run(cfg),
        None => ExitCode::SUCCESS,
    }
}
