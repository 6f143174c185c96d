//! Workspace discovery logic.

use std::path::{Path, PathBuf};

use miette::{Result, miette};

/// Directory holding the platform state and workspace config.
pub const WORKSPACE_DIR: &str = ".plugbay";

/// Finds the workspace by searching from the current directory upwards.
pub fn find_workspace() -> Result<PathBuf> {
    find_workspace_from(
        &std::env::current_dir().map_err(|e| miette!("Cannot get current directory: {}", e))?,
    )
}

/// Finds the workspace starting from the given directory.
pub fn find_workspace_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(WORKSPACE_DIR);

        if candidate.is_dir() {
            return Ok(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                return Err(miette!(
                    help = "Run 'plugbay init' to create one",
                    "No {} directory in {} or any parent directory",
                    WORKSPACE_DIR,
                    start.display()
                ));
            }
        }
    }
}

/// Resolves the workspace directory from an explicit project root, if given.
pub fn resolve(project: Option<&Path>) -> Result<PathBuf> {
    match project {
        Some(root) => {
            let dir = root.join(WORKSPACE_DIR);
            if dir.is_dir() {
                Ok(dir)
            } else {
                Err(miette!(
                    help = "Run 'plugbay init' to create one",
                    "No {} directory in {}",
                    WORKSPACE_DIR,
                    root.display()
                ))
            }
        }
        None => find_workspace(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_workspace_in_current() {
        let dir = tempdir().unwrap();
        let workspace = dir.path().join(WORKSPACE_DIR);
        fs::create_dir(&workspace).unwrap();

        assert_eq!(find_workspace_from(dir.path()).unwrap(), workspace);
    }

    #[test]
    fn test_find_workspace_in_parent() {
        let dir = tempdir().unwrap();
        let workspace = dir.path().join(WORKSPACE_DIR);
        fs::create_dir(&workspace).unwrap();

        let subdir = dir.path().join("plugins").join("weather");
        fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_workspace_from(&subdir).unwrap(), workspace);
    }

    #[test]
    fn test_resolve_explicit_root() {
        let dir = tempdir().unwrap();
        assert!(resolve(Some(dir.path())).is_err());

        fs::create_dir(dir.path().join(WORKSPACE_DIR)).unwrap();
        assert_eq!(
            resolve(Some(dir.path())).unwrap(),
            dir.path().join(WORKSPACE_DIR)
        );
    }
}
