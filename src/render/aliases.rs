use std::path::Path;

use anyhow::Result;

use crate::markdown::{escape_attribute, escape_html};
use crate::site::Site;
use crate::utils::absolute_url;

use super::utils::{log_status, output_path, write_output};

/// Writes a meta-refresh page at every alias, pointing at the canonical URL.
pub(super) fn render_aliases(site: &Site<'_>, html_root: &Path, verbose: bool) -> Result<usize> {
    for alias in &site.aliases {
        let target = absolute_url(&site.config.base_url, &alias.to);
        write_output(&output_path(html_root, &alias.from), redirect_page(&target))?;
        log_status(verbose, "ALIAS", format!("{} -> {}", alias.from, alias.to));
    }
    Ok(site.aliases.len())
}

fn redirect_page(target: &str) -> String {
    let attribute = escape_attribute(target);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  <title>Redirecting</title>\n  <link rel=\"canonical\" href=\"{attribute}\">\n  <meta name=\"robots\" content=\"noindex\">\n  <meta http-equiv=\"refresh\" content=\"0; url={attribute}\">\n</head>\n<body>\n  <p>This page has moved to <a href=\"{attribute}\">{}</a>.</p>\n</body>\n</html>\n",
        escape_html(target)
    )
}
