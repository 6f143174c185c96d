//! Init command implementation.

use std::fs;
use std::path::Path;

use miette::{Result, miette};
use plugbay_engine::FilePlatform;

use crate::config::{CONFIG_FILE, DEFAULT_CONFIG};
use crate::discovery::WORKSPACE_DIR;
use crate::output;

/// Creates the workspace directory under `root`.
pub fn execute(root: &Path, force: bool) -> Result<()> {
    let workspace = root.join(WORKSPACE_DIR);
    let config_path = workspace.join(CONFIG_FILE);

    if config_path.exists() && !force {
        return Err(miette!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        ));
    }

    fs::create_dir_all(&workspace)
        .map_err(|e| miette!("Failed to create {}: {}", workspace.display(), e))?;
    fs::write(&config_path, DEFAULT_CONFIG)
        .map_err(|e| miette!("Failed to write {}: {}", config_path.display(), e))?;

    FilePlatform::open(&workspace)
        .and_then(|platform| platform.flush())
        .map_err(|e| miette!("Failed to initialize platform state: {}", e))?;

    output::success(&format!("Created {}", workspace.display()));
    output::info("Run 'plugbay install --help' to add plugins");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugbay_engine::STATE_FILE;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_workspace() {
        let dir = tempdir().unwrap();
        execute(dir.path(), false).unwrap();

        let workspace = dir.path().join(WORKSPACE_DIR);
        assert!(workspace.join(CONFIG_FILE).is_file());
        assert!(workspace.join(STATE_FILE).is_file());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        execute(dir.path(), false).unwrap();

        assert!(execute(dir.path(), false).is_err());
        assert!(execute(dir.path(), true).is_ok());
    }
}
