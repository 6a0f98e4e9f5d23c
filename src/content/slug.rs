/// Lower-cases ASCII alphanumerics and collapses every other run of
/// characters into a single hyphen. Leading and trailing hyphens are dropped,
/// so the result is stable under repeated application.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut previous_dash = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            previous_dash = false;
        } else if !previous_dash && !slug.is_empty() {
            slug.push('-');
            previous_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Tags merge case-insensitively: "Intro", " intro " and "INTRO" share a bucket.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalizes a tag list, dropping blanks and repeats while keeping the
/// order of first appearance.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = normalize_tag(tag);
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

pub fn tag_slug(tag: &str) -> String {
    let slug = slugify(tag);
    if slug.is_empty() {
        "untagged".to_string()
    } else {
        slug
    }
}

pub fn tag_url(tag: &str) -> String {
    format!("/tags/{}/", tag_slug(tag))
}
