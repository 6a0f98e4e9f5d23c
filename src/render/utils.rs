use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::well_known::{Rfc2822, Rfc3339};

pub(crate) fn log_status(enabled: bool, label: &str, message: impl AsRef<str>) {
    if enabled {
        println!("[{}] {}", label, message.as_ref());
    }
}

/// Maps a site URL to the file that serves it: directory URLs get an
/// `index.html`, anything else is written as-is.
pub(super) fn output_path(html_root: &Path, url: &str) -> PathBuf {
    let relative = url.trim_start_matches('/');
    if relative.is_empty() || url.ends_with('/') {
        html_root.join(relative).join("index.html")
    } else {
        html_root.join(relative)
    }
}

pub(super) fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

pub(super) fn format_rfc3339(date: &OffsetDateTime) -> Result<String> {
    date.format(&Rfc3339).context("failed to format RFC3339 date")
}

pub(super) fn format_rfc2822(date: &OffsetDateTime) -> Result<String> {
    date.format(&Rfc2822).context("failed to format RFC2822 date")
}

pub(super) fn sanitize_cdata(value: &str) -> String {
    value.replace("]]>", "]]]]><![CDATA[>")
}

pub(super) fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
