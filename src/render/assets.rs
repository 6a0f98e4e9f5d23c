use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct AssetCopy {
    pub copied: usize,
    pub skipped: usize,
}

/// Copies `static/` into the staged output. Files the pipeline already
/// produced win over assets at the same path.
pub(super) fn copy_static_assets(root: &Path, html_root: &Path) -> Result<AssetCopy> {
    let static_dir = root.join("static");
    let mut result = AssetCopy::default();
    if !static_dir.exists() {
        return Ok(result);
    }

    for entry in WalkDir::new(&static_dir).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to walk {}", static_dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry.path().strip_prefix(&static_dir).with_context(|| {
            format!(
                "{} is outside {}",
                entry.path().display(),
                static_dir.display()
            )
        })?;
        let destination = html_root.join(relative);
        if destination.exists() {
            result.skipped += 1;
            continue;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(entry.path(), &destination).with_context(|| {
            format!(
                "failed to copy static asset from {} to {}",
                entry.path().display(),
                destination.display()
            )
        })?;
        result.copied += 1;
    }

    Ok(result)
}
