/// Joins a site-relative URL onto `base_url`. URLs that already carry a
/// scheme are returned unchanged.
pub fn absolute_url(base: &str, path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }

    let base = base.trim().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
