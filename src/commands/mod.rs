mod build;
mod clean;
mod search;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Command;
use crate::config::find_project_root;

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Build(args) => build::run_build_command(args),
        Command::Search(args) => search::run_search_command(args),
        Command::Clean(args) => clean::run_clean_command(args),
    }
}

/// Locates the project from `--root` or the working directory.
fn resolve_root(root: Option<&str>) -> Result<PathBuf> {
    let start = match root {
        Some(path) => PathBuf::from(path),
        None => env::current_dir().context("failed to resolve current directory")?,
    };
    find_project_root(start)
}

/// `--output` is relative to where the command was run, not to the root.
fn resolve_output(output: Option<&str>) -> Result<Option<PathBuf>> {
    let Some(output) = output else {
        return Ok(None);
    };
    let path = PathBuf::from(output);
    if path.is_absolute() {
        return Ok(Some(path));
    }
    let cwd = env::current_dir().context("failed to resolve current directory")?;
    Ok(Some(cwd.join(path)))
}
