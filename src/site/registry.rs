use std::collections::HashMap;

use crate::error::BuildError;

/// Every URL the build will write, keyed to a description of what produces it.
#[derive(Debug, Default)]
pub struct UrlRegistry {
    claimed: HashMap<String, String>,
}

impl UrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, url: &str, origin: impl Into<String>) -> Result<(), BuildError> {
        let origin = origin.into();
        if let Some(first) = self.claimed.get(url) {
            return Err(BuildError::UrlConflict {
                url: url.to_string(),
                first: first.clone(),
                second: origin,
            });
        }
        self.claimed.insert(url.to_string(), origin);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_conflicts_with_both_origins() {
        let mut registry = UrlRegistry::new();
        registry.claim("/blog/a/", "content/blog/a.md").unwrap();
        registry.claim("/blog/b/", "content/blog/b.md").unwrap();

        let error = registry.claim("/blog/a/", "content/blog/A.md").unwrap_err();
        match error {
            BuildError::UrlConflict { url, first, second } => {
                assert_eq!(url, "/blog/a/");
                assert_eq!(first, "content/blog/a.md");
                assert_eq!(second, "content/blog/A.md");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(registry.claimed.len(), 2);
    }
}
