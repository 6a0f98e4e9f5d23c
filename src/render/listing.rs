use anyhow::Result;
use minijinja::value::Value;

use crate::site::HOME_URL;
use crate::template::{LayoutKind, compose};

use super::Renderer;
use super::context::{page_contexts, section_link, tag_link};
use super::utils::{log_status, output_path, write_output};

pub(super) fn render_sections(renderer: &Renderer<'_>) -> Result<usize> {
    let site = renderer.site;
    for section in site.sections.values() {
        let pages = page_contexts(site.section_pages(section), site, &renderer.display)?;
        let context = minijinja::context! {
            title => &section.title,
            description => &section.description,
            section => section_link(section),
            tag => Value::from(()),
            pages => pages,
            site => &renderer.site_value,
        };
        let scope = format!("rendering section index {}", section.url);
        let html = compose(
            renderer.env,
            LayoutKind::Section {
                name: &section.name,
            },
            context,
            &section.title,
            &renderer.site_value,
            &scope,
        )?;

        write_output(&output_path(renderer.html_root, &section.url), html)?;
        log_status(
            renderer.verbose,
            "LIST",
            format!("Rendered {} ({} pages)", section.url, section.pages.len()),
        );
    }
    Ok(site.sections.len())
}

pub(super) fn render_tags(renderer: &Renderer<'_>) -> Result<usize> {
    let site = renderer.site;
    for tag in site.tags.values() {
        let pages = page_contexts(site.tag_pages(tag), site, &renderer.display)?;
        let context = minijinja::context! {
            title => &tag.name,
            description => Value::from(()),
            section => Value::from(()),
            tag => tag_link(tag),
            pages => pages,
            site => &renderer.site_value,
        };
        let scope = format!("rendering tag index {}", tag.url);
        let html = compose(
            renderer.env,
            LayoutKind::Tag,
            context,
            &tag.name,
            &renderer.site_value,
            &scope,
        )?;

        write_output(&output_path(renderer.html_root, &tag.url), html)?;
        log_status(
            renderer.verbose,
            "TAG",
            format!("Rendered {} ({} pages)", tag.url, tag.pages.len()),
        );
    }
    Ok(site.tags.len())
}

pub(super) fn render_home(renderer: &Renderer<'_>) -> Result<()> {
    let site = renderer.site;
    let title = site.config.site_title();
    let pages = page_contexts(site.pages.iter(), site, &renderer.display)?;
    let context = minijinja::context! {
        title => title,
        description => &site.config.description,
        section => Value::from(()),
        tag => Value::from(()),
        pages => pages,
        site => &renderer.site_value,
    };

    let html = compose(
        renderer.env,
        LayoutKind::Home,
        context,
        title,
        &renderer.site_value,
        "rendering home page",
    )?;

    write_output(&output_path(renderer.html_root, HOME_URL), html)?;
    log_status(renderer.verbose, "LIST", "Rendered home page");
    Ok(())
}
