//! Layout selection: a fixed lookup order per kind of output, resolved
//! against whatever set of template names is available.

use crate::error::BuildError;

pub const BASE_LAYOUT: &str = "layouts/base.html";
pub const PAGE_LAYOUT: &str = "layouts/page.html";
pub const LIST_LAYOUT: &str = "layouts/list.html";
pub const HOME_LAYOUT: &str = "layouts/home.html";
pub const TAG_LAYOUT: &str = "layouts/tag.html";

/// Section names that would collide with the generic layout names.
const RESERVED: &[&str] = &["base", "page", "list", "home", "tag"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind<'a> {
    Page { section: Option<&'a str> },
    Section { name: &'a str },
    Tag,
    Home,
    Base,
}

impl LayoutKind<'_> {
    /// Template names to try, most specific first.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            LayoutKind::Page { section } => {
                let mut names = Vec::with_capacity(2);
                if let Some(section) = section.filter(|name| !RESERVED.contains(name)) {
                    names.push(format!("layouts/{section}.html"));
                }
                names.push(PAGE_LAYOUT.to_string());
                names
            }
            LayoutKind::Section { name } => {
                vec![format!("layouts/{name}-list.html"), LIST_LAYOUT.to_string()]
            }
            LayoutKind::Tag => vec![TAG_LAYOUT.to_string(), LIST_LAYOUT.to_string()],
            LayoutKind::Home => vec![HOME_LAYOUT.to_string(), LIST_LAYOUT.to_string()],
            LayoutKind::Base => vec![BASE_LAYOUT.to_string()],
        }
    }

    fn describe(&self) -> String {
        match self {
            LayoutKind::Page { section: Some(section) } => format!("page in section '{section}'"),
            LayoutKind::Page { section: None } => "page".to_string(),
            LayoutKind::Section { name } => format!("section index '{name}'"),
            LayoutKind::Tag => "tag index".to_string(),
            LayoutKind::Home => "home page".to_string(),
            LayoutKind::Base => "base layout".to_string(),
        }
    }
}

/// Returns the first candidate for `kind` that `exists` accepts.
pub fn select_layout(
    kind: LayoutKind<'_>,
    exists: impl Fn(&str) -> bool,
) -> Result<String, BuildError> {
    let candidates = kind.candidates();
    match candidates.iter().find(|name| exists(name)) {
        Some(name) => Ok(name.clone()),
        None => Err(BuildError::LayoutMissing {
            kind: kind.describe(),
            candidates,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available<'a>(names: &'a [&'a str]) -> impl Fn(&str) -> bool + 'a {
        move |name| names.contains(&name)
    }

    #[test]
    fn section_layout_wins_over_page_layout() {
        let names = ["layouts/blog.html", PAGE_LAYOUT];
        let picked = select_layout(
            LayoutKind::Page {
                section: Some("blog"),
            },
            available(&names),
        )
        .unwrap();
        assert_eq!(picked, "layouts/blog.html");
    }

    #[test]
    fn falls_back_to_page_layout() {
        let names = [PAGE_LAYOUT];
        let picked = select_layout(
            LayoutKind::Page {
                section: Some("guides"),
            },
            available(&names),
        )
        .unwrap();
        assert_eq!(picked, PAGE_LAYOUT);

        let picked = select_layout(LayoutKind::Page { section: None }, available(&names)).unwrap();
        assert_eq!(picked, PAGE_LAYOUT);
    }

    #[test]
    fn missing_layout_lists_candidates() {
        let error = select_layout(
            LayoutKind::Page {
                section: Some("blog"),
            },
            available(&[]),
        )
        .unwrap_err();
        match error {
            BuildError::LayoutMissing { kind, candidates } => {
                assert_eq!(kind, "page in section 'blog'");
                assert_eq!(candidates, vec!["layouts/blog.html", PAGE_LAYOUT]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_kinds_fall_back_to_list_layout() {
        let names = [LIST_LAYOUT];
        for kind in [
            LayoutKind::Section { name: "blog" },
            LayoutKind::Tag,
            LayoutKind::Home,
        ] {
            assert_eq!(select_layout(kind, available(&names)).unwrap(), LIST_LAYOUT);
        }

        let names = [LIST_LAYOUT, "layouts/blog-list.html", HOME_LAYOUT, TAG_LAYOUT];
        assert_eq!(
            select_layout(LayoutKind::Section { name: "blog" }, available(&names)).unwrap(),
            "layouts/blog-list.html"
        );
        assert_eq!(
            select_layout(LayoutKind::Home, available(&names)).unwrap(),
            HOME_LAYOUT
        );
        assert_eq!(
            select_layout(LayoutKind::Tag, available(&names)).unwrap(),
            TAG_LAYOUT
        );
    }

    #[test]
    fn reserved_section_names_use_page_layout() {
        let names = [BASE_LAYOUT, PAGE_LAYOUT];
        let picked = select_layout(
            LayoutKind::Page {
                section: Some("base"),
            },
            available(&names),
        )
        .unwrap();
        assert_eq!(picked, PAGE_LAYOUT);
    }
}
