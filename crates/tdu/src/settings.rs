//! Configuration and settings management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::render::RowFormat;
use crate::report::AbsolutePaths;
use crate::tree::{DuplicatePolicy, FileGroup, SortKey};
use crate::viewport::RedrawPolicy;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub input: InputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiSettings {
    #[serde(default)]
    pub ascii_tree_chars: bool,
    #[serde(default)]
    pub show_descendants: bool,
    #[serde(default)]
    pub human_sizes: bool,
    /// Levels below the root shown at startup
    #[serde(default = "default_initial_expand_depth")]
    pub initial_expand_depth: usize,
    #[serde(default)]
    pub initial_sort: SortKey,
    #[serde(default)]
    pub initial_sort_descending: bool,
    #[serde(default)]
    pub redraw: RedrawPolicy,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            ascii_tree_chars: false,
            show_descendants: false,
            human_sizes: false,
            initial_expand_depth: default_initial_expand_depth(),
            initial_sort: SortKey::default(),
            initial_sort_descending: false,
            redraw: RedrawPolicy::default(),
        }
    }
}

impl UiSettings {
    pub fn row_format(&self) -> RowFormat {
        RowFormat {
            ascii: self.ascii_tree_chars,
            show_descendants: self.show_descendants,
            human_sizes: self.human_sizes,
        }
    }
}

fn default_initial_expand_depth() -> usize {
    1
}

/// How report lines are turned into tree paths
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InputSettings {
    #[serde(default)]
    pub duplicate_paths: DuplicatePolicy,
    #[serde(default)]
    pub absolute_paths: AbsolutePaths,
    /// `[[input.groups]]` tables; checked in order against each file name
    #[serde(default)]
    pub groups: Vec<FileGroup>,
}

impl Settings {
    /// Load settings from a file, or return defaults if file doesn't exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        Ok(())
    }

    /// `$XDG_CONFIG_HOME/tdu/settings.toml`, or the platform's equivalent
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tdu");

        config_dir.join("settings.toml")
    }
}

// Minimal stand-in for the dirs crate
mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var_os("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
                })
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("APPDATA").map(PathBuf::from)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}
