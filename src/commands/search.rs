use anyhow::{Result, bail};

use crate::cli::SearchArgs;
use crate::config::{CONFIG_FILE, Config};
use crate::render::{output_directory, search_index_path};
use crate::search::{SearchEntry, load_index, rank};

use super::{resolve_output, resolve_root};

pub fn run_search_command(args: SearchArgs) -> Result<()> {
    let root = resolve_root(args.root.as_deref())?;
    let config = Config::load(root.join(CONFIG_FILE))?;
    if !config.search.enabled {
        bail!("search is disabled in {}", root.join(CONFIG_FILE).display());
    }

    let output_override = resolve_output(args.output.as_deref())?;
    let output = output_directory(&root, &config, output_override.as_deref());
    let index_path = search_index_path(&output, &config);
    if !index_path.exists() {
        bail!(
            "no search index at {}; run `canopy build` first",
            index_path.display()
        );
    }

    let entries = load_index(&index_path)?;
    let results = rank(&entries, &args.query);
    if results.is_empty() {
        println!("No matches for '{}'.", args.query.trim());
        return Ok(());
    }

    for (entry, score) in results {
        println!("{}", format_result(entry, score));
    }
    Ok(())
}

fn format_result(entry: &SearchEntry, score: i64) -> String {
    let mut line = format!("{score:>5}  {}  {}", entry.title, entry.url);
    if !entry.section.is_empty() {
        line.push_str(&format!("  [{}]", entry.section));
    }
    line
}
