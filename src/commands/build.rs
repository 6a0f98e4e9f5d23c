use anyhow::Result;

use crate::cli::BuildArgs;
use crate::render::{BuildOptions, build_site};

use super::{resolve_output, resolve_root};

pub fn run_build_command(args: BuildArgs) -> Result<()> {
    let root = resolve_root(args.root.as_deref())?;
    let options = build_options(&args)?;
    build_site(&root, &options)?;
    Ok(())
}

fn build_options(args: &BuildArgs) -> Result<BuildOptions> {
    Ok(BuildOptions {
        include_drafts: args.drafts,
        output: resolve_output(args.output.as_deref())?,
        verbose: args.verbose,
    })
}
