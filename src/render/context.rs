//! Serializable views handed to layouts.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::config::{Config, DateFormat, NavEntry};
use crate::content::{Page, tag_url};
use crate::site::{Section, Site, Tag};
use crate::utils::absolute_url;

use super::utils::format_rfc3339;

#[derive(Debug, Serialize)]
pub(super) struct SiteContext<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub base_url: &'a str,
    pub nav: &'a [NavEntry],
    pub sections: Vec<SectionLink<'a>>,
    pub tags: Vec<TagLink>,
    pub search: SearchContext<'a>,
    pub page_count: usize,
    pub extra: &'a JsonMap<String, JsonValue>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchContext<'a> {
    pub enabled: bool,
    pub asset_path: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SectionLink<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub url: &'a str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct TagLink {
    pub name: String,
    pub url: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct PageContext<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub content: &'a str,
    pub summary: &'a str,
    pub date: Option<String>,
    pub date_iso: Option<String>,
    pub tags: Vec<TagLink>,
    pub weight: i64,
    pub draft: bool,
    pub section: Option<&'a str>,
    pub slug: &'a str,
    pub url: &'a str,
    pub permalink: String,
    pub extra: &'a JsonMap<String, JsonValue>,
}

pub(super) fn site_context<'a>(site: &'a Site<'a>) -> SiteContext<'a> {
    let config: &Config = site.config;
    SiteContext {
        name: &config.name,
        title: config.site_title(),
        description: &config.description,
        base_url: &config.base_url,
        nav: &config.nav,
        sections: site.sections.values().map(section_link).collect(),
        tags: site.tags.values().map(tag_link).collect(),
        search: SearchContext {
            enabled: config.search.enabled,
            asset_path: &config.search.asset_path,
        },
        page_count: site.pages.len(),
        extra: &config.extra,
    }
}

pub(super) fn section_link(section: &Section) -> SectionLink<'_> {
    SectionLink {
        name: &section.name,
        title: &section.title,
        description: section.description.as_deref(),
        url: &section.url,
        count: section.pages.len(),
    }
}

pub(super) fn tag_link(tag: &Tag) -> TagLink {
    TagLink {
        name: tag.name.clone(),
        url: tag.url.clone(),
        count: tag.pages.len(),
    }
}

pub(super) fn page_context<'a>(
    page: &'a Page,
    site: &Site<'_>,
    display: &DateFormat,
) -> Result<PageContext<'a>> {
    let (date, date_iso) = match &page.date {
        Some(date) => (Some(display.format(date)?), Some(format_rfc3339(date)?)),
        None => (None, None),
    };

    let tags = page
        .tags
        .iter()
        .map(|name| TagLink {
            name: name.clone(),
            url: tag_url(name),
            count: site.tags.get(name).map_or(0, |tag| tag.pages.len()),
        })
        .collect();

    Ok(PageContext {
        title: &page.title,
        description: page.description.as_deref(),
        content: &page.body_html,
        summary: &page.summary,
        date,
        date_iso,
        tags,
        weight: page.weight,
        draft: page.draft,
        section: page.section.as_deref(),
        slug: &page.slug,
        url: &page.url,
        permalink: absolute_url(&site.config.base_url, &page.url),
        extra: &page.extra,
    })
}

pub(super) fn page_contexts<'a>(
    pages: impl Iterator<Item = &'a Page>,
    site: &Site<'_>,
    display: &DateFormat,
) -> Result<Vec<PageContext<'a>>> {
    pages.map(|page| page_context(page, site, display)).collect()
}
