use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use super::model::CONFIG_FILE;

/// Walks upward from `start` until a directory holding `canopy.yaml` is found.
pub fn find_project_root(start: impl AsRef<Path>) -> Result<PathBuf> {
    let mut current = start.as_ref().to_path_buf();

    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }

        if !current.pop() {
            bail!(
                "could not locate {CONFIG_FILE} starting from {}",
                start.as_ref().display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walks_upwards_from_content_directory() {
        let dir = TempDir::new().unwrap();
        let project = dir.path();
        let nested = project.join("content/blog");
        fs::create_dir_all(&nested).unwrap();
        fs::write(project.join(CONFIG_FILE), "name: test\n").unwrap();

        let discovered = find_project_root(&nested).unwrap();
        assert_eq!(discovered, project);
    }

    #[test]
    fn errors_when_config_is_missing() {
        let dir = TempDir::new().unwrap();
        let error = find_project_root(dir.path()).unwrap_err();
        assert!(error.to_string().contains("could not locate canopy.yaml"));
    }
}
