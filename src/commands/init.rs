//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write a default config file at `config_path`
pub fn cmd_init(config_path: &Path, force: bool) -> Result<PathBuf> {
    if config_path.exists() && !force {
        return Err(Error::AlreadyInitialized(format!(
            "{} (use --force to overwrite)",
            config_path.display()
        )));
    }

    let config = Config::default().with_config_file(config_path);
    config.save()?;

    info!("Initialized kbase config at {}", config_path.display());
    Ok(config_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        cmd_init(&path, false).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.collection_name, "python_faq_collection");
        assert_eq!(config.paths.config_file, path);
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "collection_name = \"mine\"\n").unwrap();

        assert!(matches!(
            cmd_init(&path, false),
            Err(Error::AlreadyInitialized(_))
        ));
        assert_eq!(Config::load(&path).unwrap().collection_name, "mine");

        cmd_init(&path, true).unwrap();
        assert_eq!(
            Config::load(&path).unwrap().collection_name,
            "python_faq_collection"
        );
    }
}
