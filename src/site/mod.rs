//! The indexed site: ordered pages grouped into sections and tag buckets,
//! with every output URL checked for uniqueness.

use std::collections::BTreeMap;

use anyhow::{Result, bail};

use crate::config::Config;
use crate::content::{
    Discovered, Page, SectionMeta, compare_pages, section_url, tag_slug, tag_url, title_case,
};

mod registry;


pub use registry::UrlRegistry;

pub const HOME_URL: &str = "/";
pub const FEED_URL: &str = "/feed.xml";
pub const SITEMAP_URL: &str = "/sitemap.xml";
pub const ROBOTS_URL: &str = "/robots.txt";

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    /// Indexes into `Site::pages`, in site order.
    pub pages: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub slug: String,
    pub url: String,
    pub pages: Vec<usize>,
}

/// A legacy URL that redirects to a page's canonical URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub from: String,
    pub to: String,
}

#[derive(Debug)]
pub struct Site<'a> {
    pub config: &'a Config,
    pub pages: Vec<Page>,
    pub sections: BTreeMap<String, Section>,
    pub tags: BTreeMap<String, Tag>,
    pub aliases: Vec<Alias>,
    pub drafts_skipped: usize,
}

impl<'a> Site<'a> {
    /// Orders the discovered pages, groups them and registers every URL the
    /// build will produce. Runs single-threaded over the complete page set.
    pub fn index(config: &'a Config, discovered: Discovered) -> Result<Self> {
        let Discovered {
            mut pages,
            sections: metadata,
            drafts_skipped,
        } = discovered;

        pages.sort_by(compare_pages);

        let mut registry = UrlRegistry::new();
        registry.claim(HOME_URL, "home page")?;
        registry.claim(FEED_URL, "RSS feed")?;
        registry.claim(SITEMAP_URL, "sitemap")?;
        registry.claim(ROBOTS_URL, "robots.txt")?;
        if config.search.enabled {
            let asset = format!("/{}", config.search.asset_path.trim().trim_start_matches('/'));
            registry.claim(&asset, "search index")?;
        }
        for page in &pages {
            registry.claim(&page.url, page.source_path.display().to_string())?;
        }

        let sections = group_sections(&pages, metadata)?;
        for section in sections.values() {
            registry.claim(&section.url, format!("section '{}' index", section.name))?;
        }

        let tags = group_tags(&pages);
        for tag in tags.values() {
            registry.claim(&tag.url, format!("tag '{}' index", tag.name))?;
        }

        let mut aliases = Vec::new();
        for page in &pages {
            for raw in &page.aliases {
                let Some(from) = normalize_alias(raw, page)? else {
                    continue;
                };
                registry.claim(
                    &from,
                    format!("alias in {}", page.source_path.display()),
                )?;
                aliases.push(Alias {
                    from,
                    to: page.url.clone(),
                });
            }
        }

        Ok(Self {
            config,
            pages,
            sections,
            tags,
            aliases,
            drafts_skipped,
        })
    }

    pub fn section_pages<'s>(&'s self, section: &'s Section) -> impl Iterator<Item = &'s Page> {
        section.pages.iter().map(|index| &self.pages[*index])
    }

    pub fn tag_pages<'s>(&'s self, tag: &'s Tag) -> impl Iterator<Item = &'s Page> {
        tag.pages.iter().map(|index| &self.pages[*index])
    }
}

fn group_sections(
    pages: &[Page],
    mut metadata: BTreeMap<String, SectionMeta>,
) -> Result<BTreeMap<String, Section>> {
    let mut sections: BTreeMap<String, Section> = BTreeMap::new();

    for (index, page) in pages.iter().enumerate() {
        let Some(name) = page.section.as_deref() else {
            continue;
        };
        if !sections.contains_key(name) {
            let section = new_section(name, metadata.remove(name))?;
            sections.insert(name.to_string(), section);
        }
        if let Some(section) = sections.get_mut(name) {
            section.pages.push(index);
        }
    }

    // Sections with an `_index.md` but no pages still get a listing.
    for (name, meta) in metadata {
        if !sections.contains_key(&name) {
            let section = new_section(&name, Some(meta))?;
            sections.insert(name, section);
        }
    }

    Ok(sections)
}

fn new_section(name: &str, meta: Option<SectionMeta>) -> Result<Section> {
    let Some(url) = section_url(name) else {
        bail!("section '{}' does not produce a usable slug", name);
    };
    let (title, description) = match meta {
        Some(meta) => (meta.title, meta.description),
        None => (title_case(name), None),
    };
    Ok(Section {
        name: name.to_string(),
        title,
        description,
        url,
        pages: Vec::new(),
    })
}

fn group_tags(pages: &[Page]) -> BTreeMap<String, Tag> {
    let mut tags: BTreeMap<String, Tag> = BTreeMap::new();
    for (index, page) in pages.iter().enumerate() {
        for name in &page.tags {
            tags.entry(name.clone())
                .or_insert_with(|| Tag {
                    name: name.clone(),
                    slug: tag_slug(name),
                    url: tag_url(name),
                    pages: Vec::new(),
                })
                .pages
                .push(index);
        }
    }
    tags
}

/// Aliases are site-absolute. Paths ending in `.html` name a file; anything
/// else is treated as a directory and gets a trailing slash.
fn normalize_alias(raw: &str, page: &Page) -> Result<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.contains("://") || trimmed.split('/').any(|segment| segment == "..") {
        bail!(
            "{}: alias '{}' must be a site-relative path",
            page.source_path.display(),
            raw
        );
    }

    let mut alias = format!("/{}", trimmed.trim_start_matches('/'));
    if !alias.ends_with('/') && !alias.ends_with(".html") {
        alias.push('/');
    }
    Ok(Some(alias))
}
