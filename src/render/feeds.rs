use std::fmt::Write;

use anyhow::Result;
use time::OffsetDateTime;

use crate::content::Page;
use crate::site::{FEED_URL, HOME_URL, SITEMAP_URL, Site};
use crate::utils::absolute_url;

use super::utils::{format_rfc2822, format_rfc3339, sanitize_cdata, xml_escape};

const FEED_ITEMS: usize = 50;

/// RSS 2.0 feed of the newest pages in site order.
pub(super) fn render_rss(site: &Site<'_>) -> Result<String> {
    let config = site.config;
    let site_url = absolute_url(&config.base_url, HOME_URL);
    let feed_url = absolute_url(&config.base_url, FEED_URL);
    let items: Vec<&Page> = site.pages.iter().take(FEED_ITEMS).collect();

    let last_build = items
        .iter()
        .filter_map(|page| page.date)
        .max()
        .unwrap_or_else(OffsetDateTime::now_utc);

    let mut buffer = String::new();
    writeln!(buffer, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(
        buffer,
        r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">"#
    )?;
    writeln!(buffer, "  <channel>")?;
    writeln!(buffer, "    <title>{}</title>", xml_escape(config.site_title()))?;
    writeln!(buffer, "    <link>{}</link>", xml_escape(&site_url))?;
    writeln!(
        buffer,
        "    <description>{}</description>",
        xml_escape(&config.description)
    )?;
    writeln!(
        buffer,
        r#"    <atom:link href="{}" rel="self" type="application/rss+xml"/>"#,
        xml_escape(&feed_url)
    )?;
    writeln!(
        buffer,
        "    <lastBuildDate>{}</lastBuildDate>",
        format_rfc2822(&last_build)?
    )?;

    for page in items {
        let link = absolute_url(&config.base_url, &page.url);
        writeln!(buffer, "    <item>")?;
        writeln!(buffer, "      <title>{}</title>", xml_escape(&page.title))?;
        writeln!(buffer, "      <link>{}</link>", xml_escape(&link))?;
        writeln!(buffer, r#"      <guid isPermaLink="true">{}</guid>"#, xml_escape(&link))?;
        if let Some(date) = &page.date {
            writeln!(buffer, "      <pubDate>{}</pubDate>", format_rfc2822(date)?)?;
        }
        for tag in &page.tags {
            writeln!(buffer, "      <category>{}</category>", xml_escape(tag))?;
        }
        writeln!(
            buffer,
            "      <description><![CDATA[{}]]></description>",
            sanitize_cdata(&page.summary)
        )?;
        writeln!(buffer, "    </item>")?;
    }

    writeln!(buffer, "  </channel>")?;
    writeln!(buffer, "</rss>")?;
    Ok(buffer)
}

struct SitemapEntry {
    loc: String,
    lastmod: Option<String>,
}

/// Canonical URLs only: home, section and tag indexes, then every page.
pub(super) fn render_sitemap(site: &Site<'_>) -> Result<String> {
    let base = &site.config.base_url;
    let newest = |pages: &[usize]| -> Result<Option<String>> {
        pages
            .iter()
            .filter_map(|index| site.pages[*index].date)
            .max()
            .map(|date| format_rfc3339(&date))
            .transpose()
    };

    let mut entries = Vec::new();
    let all: Vec<usize> = (0..site.pages.len()).collect();
    entries.push(SitemapEntry {
        loc: absolute_url(base, HOME_URL),
        lastmod: newest(&all)?,
    });
    for section in site.sections.values() {
        entries.push(SitemapEntry {
            loc: absolute_url(base, &section.url),
            lastmod: newest(&section.pages)?,
        });
    }
    for tag in site.tags.values() {
        entries.push(SitemapEntry {
            loc: absolute_url(base, &tag.url),
            lastmod: newest(&tag.pages)?,
        });
    }
    for page in &site.pages {
        entries.push(SitemapEntry {
            loc: absolute_url(base, &page.url),
            lastmod: page.date.as_ref().map(format_rfc3339).transpose()?,
        });
    }

    let mut buffer = String::new();
    writeln!(buffer, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(
        buffer,
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#
    )?;
    for entry in entries {
        writeln!(buffer, "  <url>")?;
        writeln!(buffer, "    <loc>{}</loc>", xml_escape(&entry.loc))?;
        if let Some(lastmod) = entry.lastmod {
            writeln!(buffer, "    <lastmod>{}</lastmod>", xml_escape(&lastmod))?;
        }
        writeln!(buffer, "  </url>")?;
    }
    writeln!(buffer, "</urlset>")?;
    Ok(buffer)
}

pub(super) fn render_robots(site: &Site<'_>) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        absolute_url(&site.config.base_url, SITEMAP_URL)
    )
}
