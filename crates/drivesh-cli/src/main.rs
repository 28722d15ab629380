//! drivesh: an interactive shell for Google Drive.
//!
//! This binary sets up logging, loads configuration and credentials, and
//! runs the read-eval-print loop over a [`Shell`] session.

mod helper;

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use crossterm::style::Stylize;
use drivesh_core::config::settings::config_dir;
use drivesh_core::{Config, Flow, GoogleDrive, Shell, TokenStore};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::EnvFilter;

use crate::helper::DriveHelper;

/// Environment variable holding the log filter, e.g. `drivesh_core=debug`.
const LOG_ENV: &str = "DRIVESH_LOG";

fn init_logging() -> anyhow::Result<PathBuf> {
    let path = std::env::temp_dir().join("drivesh.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    Ok(path)
}

/// Reads `--config <path>` from the arguments, defaulting to
/// `<config_dir>/config.toml`.
fn config_path(args: &[String]) -> anyhow::Result<PathBuf> {
    match args {
        [] => Ok(config_dir().join("config.toml")),
        [flag, path] if flag == "--config" => Ok(PathBuf::from(path)),
        _ => anyhow::bail!("usage: drivesh [--config <path>]"),
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load_or_default(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn run() -> anyhow::Result<()> {
    let log_path = init_logging()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(&config_path(&args)?)?;
    tracing::info!(log = %log_path.display(), "drivesh starting");

    let tokens = TokenStore::new(config.auth.token_path());
    let access_token = tokens.access_token()?;
    let drive = GoogleDrive::new(&access_token, &config.remote)?;
    let history_path = config.ui.history.then(|| config_dir().join("history"));

    let shell = Rc::new(RefCell::new(
        Shell::new(drive, config, io::stdout()).with_token_store(tokens),
    ));
    shell.borrow_mut().greet()?;

    let mut editor: Editor<DriveHelper<GoogleDrive, io::Stdout>, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(DriveHelper::new(Rc::clone(&shell))));
    if let Some(path) = &history_path {
        let _ = editor.load_history(path);
    }

    loop {
        let prompt = shell.borrow().prompt();
        match editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if shell.borrow_mut().execute(&line) == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                tracing::error!(error = %err, "line editor failed");
                return Err(err.into());
            }
        }
    }

    if let Some(path) = &history_path {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Err(e) = editor.save_history(path) {
            tracing::warn!(error = %e, "failed to save history");
        }
    }
    tracing::info!("drivesh exiting");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_config_path() {
        assert_eq!(config_path(&[]).unwrap(), config_dir().join("config.toml"));
    }

    #[test]
    fn explicit_config_path() {
        assert_eq!(
            config_path(&args(&["--config", "/etc/drivesh.toml"])).unwrap(),
            PathBuf::from("/etc/drivesh.toml")
        );
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        assert!(config_path(&args(&["--verbose"])).is_err());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[transfer]\nroot_dir_name = \"Drive\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.transfer.root_dir_name, "Drive");
        assert_eq!(config.remote.page_size, 100);
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.ui.prompt, "> ");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[remote\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
