use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde_json::{Map as JsonMap, Value as JsonValue};
use time::{OffsetDateTime, UtcOffset};
use walkdir::WalkDir;

use crate::error::BuildError;
use crate::markdown::render_markdown;

mod front_matter;
mod slug;
mod summary;


pub use front_matter::{FrontMatterError, parse_front_matter};
pub use slug::{normalize_tags, slugify, tag_slug, tag_url};
pub use summary::summarize;

pub const SECTION_INDEX_FILE: &str = "_index.md";
const CONTENT_EXTENSION: &str = "md";

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub description: Option<String>,
    pub body: String,
    pub body_html: String,
    pub summary: String,
    pub date: Option<OffsetDateTime>,
    pub tags: Vec<String>,
    pub weight: i64,
    pub draft: bool,
    pub aliases: Vec<String>,
    pub section: Option<String>,
    pub slug: String,
    pub url: String,
    pub source_path: PathBuf,
    pub extra: JsonMap<String, JsonValue>,
}

/// Listing metadata for a section, read from its `_index.md` when present.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMeta {
    pub title: String,
    pub description: Option<String>,
    pub extra: JsonMap<String, JsonValue>,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoverOptions {
    pub include_drafts: bool,
    pub offset: UtcOffset,
    pub summary_length: usize,
}

/// Everything one walk of the content tree produces, in discovery order.
#[derive(Debug, Default)]
pub struct Discovered {
    pub pages: Vec<Page>,
    pub sections: BTreeMap<String, SectionMeta>,
    pub drafts_skipped: usize,
}

pub fn discover_content(root: impl AsRef<Path>, options: DiscoverOptions) -> Result<Discovered> {
    let root = root.as_ref();
    if !root.exists() {
        bail!("content directory {} does not exist", root.display());
    }

    let mut page_files = Vec::new();
    let mut section_files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() || !is_content_file(entry.path()) {
            continue;
        }
        if entry.file_name() == SECTION_INDEX_FILE {
            // Only top-level section directories carry listing metadata.
            if entry.depth() == 2 {
                section_files.push(entry.into_path());
            }
            continue;
        }
        page_files.push(entry.into_path());
    }

    let loaded = page_files
        .par_iter()
        .map(|path| load_page(root, path, options))
        .collect::<Result<Vec<_>>>()?;

    let total = loaded.len();
    let pages: Vec<Page> = loaded.into_iter().flatten().collect();
    let drafts_skipped = total - pages.len();

    let mut sections = BTreeMap::new();
    for path in section_files {
        let Some(name) = section_of(root, &path) else {
            continue;
        };
        let meta = load_section_meta(&path, options.offset)?;
        sections.insert(name, meta);
    }

    Ok(Discovered {
        pages,
        sections,
        drafts_skipped,
    })
}

/// Parses and renders one content file. Drafts are dropped here, before any
/// Markdown is rendered, unless the build asked for them.
fn load_page(root: &Path, path: &Path, options: DiscoverOptions) -> Result<Option<Page>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (front, body) =
        parse_front_matter(&raw, options.offset).map_err(|source| BuildError::Validation {
            path: path.to_path_buf(),
            source,
        })?;

    if front.draft && !options.include_drafts {
        return Ok(None);
    }

    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .with_context(|| format!("{}: file name is not valid UTF-8", path.display()))?;
    let slug = slugify(stem);
    if slug.is_empty() {
        bail!("{}: file name does not produce a usable slug", path.display());
    }

    let section = section_of(root, path);
    let url = page_url(section.as_deref(), &slug)
        .with_context(|| format!("{}: section name does not produce a usable slug", path.display()))?;

    let body_html = render_markdown(&body);
    let summary = summarize(&body_html, options.summary_length);

    Ok(Some(Page {
        title: front.title,
        description: front.description,
        body,
        body_html,
        summary,
        date: front.date,
        tags: normalize_tags(&front.tags),
        weight: front.weight,
        draft: front.draft,
        aliases: front.aliases,
        section,
        slug,
        url,
        source_path: path.to_path_buf(),
        extra: front.extra,
    }))
}

fn load_section_meta(path: &Path, offset: UtcOffset) -> Result<SectionMeta> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (front, _body) =
        parse_front_matter(&raw, offset).map_err(|source| BuildError::Validation {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(SectionMeta {
        title: front.title,
        description: front.description,
        extra: front.extra,
    })
}

/// The top-level directory a file lives under; files at the root have none.
fn section_of(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();
    let first = components.next()?;
    components.next()?;
    match first {
        Component::Normal(name) => name.to_str().map(str::to_string),
        _ => None,
    }
}

pub fn page_url(section: Option<&str>, slug: &str) -> Option<String> {
    match section {
        Some(section) => {
            let segment = slugify(section);
            (!segment.is_empty()).then(|| format!("/{segment}/{slug}/"))
        }
        None => Some(format!("/{slug}/")),
    }
}

pub fn section_url(section: &str) -> Option<String> {
    let segment = slugify(section);
    (!segment.is_empty()).then(|| format!("/{segment}/"))
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CONTENT_EXTENSION))
}

/// Dated pages first, newest to oldest; then undated pages by ascending
/// weight. Used with a stable sort so remaining ties keep discovery order.
pub fn compare_pages(left: &Page, right: &Page) -> Ordering {
    match (left.date, right.date) {
        (Some(a), Some(b)) => b.cmp(&a).then_with(|| left.weight.cmp(&right.weight)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.weight.cmp(&right.weight),
    }
}

/// Title-cases a directory name for sections without `_index.md`.
pub fn title_case(name: &str) -> String {
    let mut titled = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.chars() {
        if at_word_start {
            titled.extend(ch.to_uppercase());
        } else {
            titled.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    titled
}
