mod aliases;
mod assets;
mod context;
mod feeds;
mod listing;
mod pages;
mod utils;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use minijinja::Environment;
use minijinja::value::Value;

use crate::config::{CONFIG_FILE, Config, DateFormat};
use crate::content::{DiscoverOptions, discover_content};
use crate::search;
use crate::site::{FEED_URL, ROBOTS_URL, SITEMAP_URL, Site};
use crate::template;

use aliases::render_aliases;
use assets::copy_static_assets;
use context::site_context;
use feeds::{render_robots, render_rss, render_sitemap};
use listing::{render_home, render_sections, render_tags};
use pages::render_pages;
use utils::{log_status, output_path, write_output};

const STAGING_PREFIX: &str = ".canopy-staging";

#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    pub include_drafts: bool,
    /// Overrides `output_dir` from the config. Relative paths resolve against
    /// the project root.
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub output: PathBuf,
    pub pages: usize,
    pub sections: usize,
    pub tags: usize,
    pub aliases: usize,
    pub drafts_skipped: usize,
    pub search_entries: Option<usize>,
    pub static_copied: usize,
    pub elapsed: Duration,
}

/// Shared state for the per-kind render passes.
pub(super) struct Renderer<'a> {
    pub env: &'a Environment<'static>,
    pub site: &'a Site<'a>,
    pub site_value: Value,
    pub display: DateFormat,
    pub html_root: &'a Path,
    pub verbose: bool,
}

/// Resolves where a build for `root` lands.
pub fn output_directory(root: &Path, config: &Config, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) => root.join(path),
        None => root.join(&config.output_dir),
    }
}

pub fn search_index_path(output: &Path, config: &Config) -> PathBuf {
    output_path(output, &config.search.asset_path)
}

/// Runs the whole pipeline. Everything is written to a staging directory
/// beside the output; the previous output is replaced only once every stage
/// has succeeded.
pub fn build_site(root: &Path, options: &BuildOptions) -> Result<BuildReport> {
    let started = Instant::now();
    let verbose = options.verbose;

    let config = Config::load(root.join(CONFIG_FILE))?;
    let display = config.display_format()?;
    let offset = config.default_offset()?;
    let output = output_directory(root, &config, options.output.as_deref());
    ensure_safe_output(root, &output)?;

    log_status(verbose, "STEP", "Discovering content");
    let discovered = discover_content(
        root.join("content"),
        DiscoverOptions {
            include_drafts: options.include_drafts,
            offset,
            summary_length: config.search.summary_length,
        },
    )?;

    log_status(verbose, "STEP", "Indexing site");
    let site = Site::index(&config, discovered)?;

    log_status(verbose, "STEP", "Loading templates");
    let mut env = template::environment(&config)?;
    let loaded = template::load_templates(&root.join("templates"), &mut env)?;
    log_status(
        verbose,
        "STEP",
        format!(
            "Loaded {} template(s), {} built-in layout(s)",
            loaded.user, loaded.defaults
        ),
    );

    let parent = staging_parent(&output);
    fs::create_dir_all(&parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&parent)
        .with_context(|| format!("failed to create staging directory in {}", parent.display()))?;
    let html_root = staging.path();

    let renderer = Renderer {
        env: &env,
        site: &site,
        site_value: Value::from_serialize(site_context(&site)),
        display,
        html_root,
        verbose,
    };

    log_status(verbose, "STEP", "Rendering pages");
    let pages = render_pages(&renderer)?;

    log_status(verbose, "STEP", "Rendering indexes");
    let sections = render_sections(&renderer)?;
    let tags = render_tags(&renderer)?;
    render_home(&renderer)?;

    log_status(verbose, "STEP", "Writing feed, sitemap and redirects");
    write_output(&output_path(html_root, FEED_URL), render_rss(&site)?)?;
    write_output(&output_path(html_root, SITEMAP_URL), render_sitemap(&site)?)?;
    write_output(&output_path(html_root, ROBOTS_URL), render_robots(&site))?;
    let aliases = render_aliases(&site, html_root, verbose)?;

    let search_entries = if config.search.enabled {
        let entries = search::build_index(&site);
        let path = search_index_path(html_root, &config);
        search::write_index(&path, &entries)?;
        log_status(
            verbose,
            "SEARCH",
            format!("Wrote search index ({} entries)", entries.len()),
        );
        Some(entries.len())
    } else {
        log_status(verbose, "SEARCH", "Search disabled");
        None
    };

    log_status(verbose, "STATIC", "Copying static assets");
    let assets = copy_static_assets(root, html_root)?;
    if assets.skipped > 0 {
        log_status(
            verbose,
            "STATIC",
            format!("Kept {} generated file(s) over static assets", assets.skipped),
        );
    }

    promote(staging.path(), &output)?;
    drop(staging);
    log_status(verbose, "DONE", format!("Site written to {}", output.display()));

    let report = BuildReport {
        output,
        pages,
        sections,
        tags,
        aliases,
        drafts_skipped: site.drafts_skipped,
        search_entries,
        static_copied: assets.copied,
        elapsed: started.elapsed(),
    };

    println!(
        "[SUMMARY] pages: {}; sections: {}; tags: {}; aliases: {}; drafts skipped: {}; search entries: {}; static assets copied: {}; elapsed: {:.2?}",
        report.pages,
        report.sections,
        report.tags,
        report.aliases,
        report.drafts_skipped,
        report
            .search_entries
            .map_or_else(|| "disabled".to_string(), |count| count.to_string()),
        report.static_copied,
        report.elapsed
    );

    Ok(report)
}

/// Removes the output directory of the project at `root`.
pub fn clean_output(root: &Path) -> Result<Option<PathBuf>> {
    let config = Config::load(root.join(CONFIG_FILE))?;
    let output = output_directory(root, &config, None);
    ensure_safe_output(root, &output)?;
    if !output.exists() {
        return Ok(None);
    }
    fs::remove_dir_all(&output)
        .with_context(|| format!("failed to remove {}", output.display()))?;
    Ok(Some(output))
}

/// The output is replaced wholesale, so it must never be the project root
/// or one of its ancestors.
fn ensure_safe_output(root: &Path, output: &Path) -> Result<()> {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let output = match output.canonicalize() {
        Ok(path) => path,
        Err(_) => return Ok(()),
    };
    if root.starts_with(&output) {
        bail!(
            "refusing to use {} as output directory: it contains the project",
            output.display()
        );
    }
    Ok(())
}

fn staging_parent(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn promote(staged: &Path, output: &Path) -> Result<()> {
    // Staging directories are created owner-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to set permissions on {}", staged.display()))?;
    }
    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("failed to remove previous output {}", output.display()))?;
    }
    fs::rename(staged, output).with_context(|| {
        format!(
            "failed to move {} into place at {}",
            staged.display(),
            output.display()
        )
    })
}
