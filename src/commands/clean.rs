use anyhow::Result;

use crate::cli::CleanArgs;
use crate::render::clean_output;

use super::resolve_root;

pub fn run_clean_command(args: CleanArgs) -> Result<()> {
    let root = resolve_root(args.root.as_deref())?;

    match clean_output(&root)? {
        Some(output) => println!("Removed {}.", output.display()),
        None => println!("Nothing to clean; no output directory found."),
    }

    Ok(())
}
