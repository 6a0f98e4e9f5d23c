use anyhow::Result;

use crate::template::{LayoutKind, compose};

use super::Renderer;
use super::context::page_context;
use super::utils::{log_status, output_path, write_output};

pub(super) fn render_pages(renderer: &Renderer<'_>) -> Result<usize> {
    let site = renderer.site;
    for page in &site.pages {
        let context = page_context(page, site, &renderer.display)?;
        let scope = format!("rendering {} ({})", page.url, page.source_path.display());
        let html = compose(
            renderer.env,
            LayoutKind::Page {
                section: page.section.as_deref(),
            },
            minijinja::context! { page => &context, site => &renderer.site_value },
            &page.title,
            &renderer.site_value,
            &scope,
        )?;

        write_output(&output_path(renderer.html_root, &page.url), html)?;
        log_status(renderer.verbose, "RENDER", format!("Rendered {}", page.url));
    }

    Ok(site.pages.len())
}
