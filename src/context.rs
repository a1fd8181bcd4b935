// File: ./src/context.rs
/*! Application context abstraction for filesystem paths.

`AppContext` decides where configuration and alarm data live. Two
implementations are provided:

- `StandardContext`: Uses `directories::ProjectDirs`, or an override root
  passed on the command line (`--root`).
- `TestContext`: Creates a temporary directory for isolated tests and
  removes it when dropped.

Code that touches the filesystem takes a `&dyn AppContext` explicitly; there
is no global path state.
*/

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Defines the file system context for the application.
pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join("config.toml"))
    }

    fn get_alarms_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join("alarms.json"))
    }
}

// --- Production Implementation ---

#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    /// When `override_root` is `Some(path)`, directories are created under that
    /// root as `data` and `config`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    /// `root/<subdir>` when overridden, else the platform directory picked
    /// from `ProjectDirs`. Created on first use.
    fn resolve(&self, subdir: &str, pick: fn(&ProjectDirs) -> &Path) -> Result<PathBuf> {
        let path = match &self.override_root {
            Some(root) => root.join(subdir),
            None => ProjectDirs::from("com", "chime", "chime")
                .map(|proj| pick(&proj).to_path_buf())
                .ok_or_else(|| anyhow!("No home directory to store {} in", subdir))?,
        };
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {:?}", path))?;
        Ok(path)
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        self.resolve("data", ProjectDirs::data_dir)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.resolve("config", ProjectDirs::config_dir)
    }
}

// --- Test Implementation ---

#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a new TestContext backed by a unique temporary directory.
    pub fn new() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let root = std::env::temp_dir().join(format!("chime_test_{}", uuid));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("data");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        let p = self.root.join("config");
        std::fs::create_dir_all(&p)?;
        Ok(p)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        // Best-effort cleanup; ignore errors.
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
