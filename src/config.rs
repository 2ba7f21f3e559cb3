//! Pair-file configuration.
//!
//! Configuration is read once from a TOML file and compiled into an
//! immutable [`Settings`] value that every operation receives by reference.
//!
//! # Configuration File Format
//!
//! ```toml
//! [folders]
//! include = "include"
//! src = "src"
//! manual_selection = false
//! create_missing = true
//!
//! [extensions]
//! header = [".h", ".hpp", ".hxx", ".h++"]
//! source = [".c", ".cpp", ".cc", ".cxx"]
//!
//! [guard]
//! style = "ifndef"      # or "pragma_once"
//! suffix = "fixed"      # or "extension"
//!
//! [scan]
//! exclude_dirs = ["node_modules", ".git", ".vscode", "dist", "build"]
//! ```

use crate::matcher::ExtensionSets;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project root.
pub const LOCAL_CONFIG_NAME: &str = ".pairfilerc.toml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
    /// Invalid glob pattern in the directory denylist.
    #[error("Invalid glob pattern '{0}' in scan.exclude_dirs")]
    InvalidGlobPattern(String),
    /// A header or source extension list is empty.
    #[error("No {0} extensions configured")]
    EmptyExtensionSet(&'static str),
    /// The same extension is configured as both header and source.
    #[error("Extension '{0}' is configured as both a header and a source extension")]
    AmbiguousExtension(String),
}

/// How header guards are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardStyle {
    /// `#ifndef TOKEN` / `#define TOKEN` / `#endif`.
    #[default]
    #[serde(rename = "ifndef")]
    IfndefDefine,
    /// A single `#pragma once` line.
    #[serde(rename = "pragma_once")]
    PragmaOnce,
}

/// Which suffix newly created headers put after the sanitized base name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardSuffix {
    /// Always `_H_`, whatever the header extension.
    #[default]
    Fixed,
    /// Derived from the header extension, as renames do (`.hpp` -> `_HPP_`).
    Extension,
}

/// Raw configuration as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairConfig {
    #[serde(default)]
    pub folders: FolderRules,
    #[serde(default)]
    pub extensions: ExtensionRules,
    #[serde(default)]
    pub guard: GuardRules,
    #[serde(default)]
    pub scan: ScanRules,
}

/// Where new files go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRules {
    /// Default header folder, relative to the project root.
    #[serde(default = "default_include_folder")]
    pub include: PathBuf,
    /// Default source folder, relative to the project root.
    #[serde(default = "default_src_folder")]
    pub src: PathBuf,
    /// Ask for the header and source directories instead of using the defaults.
    #[serde(default)]
    pub manual_selection: bool,
    /// Create the default folders when they are missing.
    #[serde(default = "default_create_missing")]
    pub create_missing: bool,
}

fn default_include_folder() -> PathBuf {
    PathBuf::from("include")
}

fn default_src_folder() -> PathBuf {
    PathBuf::from("src")
}

fn default_create_missing() -> bool {
    true
}

impl Default for FolderRules {
    fn default() -> Self {
        Self {
            include: default_include_folder(),
            src: default_src_folder(),
            manual_selection: false,
            create_missing: default_create_missing(),
        }
    }
}

/// Recognized header and source extensions, in prompt order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionRules {
    #[serde(default = "default_header_extensions")]
    pub header: Vec<String>,
    #[serde(default = "default_source_extensions")]
    pub source: Vec<String>,
}

fn default_header_extensions() -> Vec<String> {
    [".h", ".hpp", ".hxx", ".h++"].map(String::from).to_vec()
}

fn default_source_extensions() -> Vec<String> {
    [".c", ".cpp", ".cc", ".cxx"].map(String::from).to_vec()
}

impl Default for ExtensionRules {
    fn default() -> Self {
        Self {
            header: default_header_extensions(),
            source: default_source_extensions(),
        }
    }
}

/// Header guard options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GuardRules {
    #[serde(default)]
    pub style: GuardStyle,
    #[serde(default)]
    pub suffix: GuardSuffix,
}

/// Directory traversal options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRules {
    /// Directory names (glob patterns) never listed or descended into.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

fn default_exclude_dirs() -> Vec<String> {
    ["node_modules", ".git", ".vscode", "dist", "build"]
        .map(String::from)
        .to_vec()
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

impl PairConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.pairfilerc.toml` in the project root
    /// 3. Look for `~/.config/pairfile/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any file found cannot be parsed.
    pub fn load(config_path: Option<&Path>, project_root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = project_root.join(LOCAL_CONFIG_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("pairfile")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "loading configuration");

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Validate the configuration and compile it into [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns an error if an extension list is empty, an extension appears in
    /// both lists, or an exclusion pattern is not a valid glob.
    pub fn compile(self) -> Result<Settings, ConfigError> {
        let header = normalize_extensions(self.extensions.header);
        let source = normalize_extensions(self.extensions.source);

        if header.is_empty() {
            return Err(ConfigError::EmptyExtensionSet("header"));
        }
        if source.is_empty() {
            return Err(ConfigError::EmptyExtensionSet("source"));
        }

        let header_set: HashSet<&str> = header.iter().map(String::as_str).collect();
        if let Some(overlap) = source.iter().find(|ext| header_set.contains(ext.as_str())) {
            return Err(ConfigError::AmbiguousExtension(overlap.clone()));
        }

        let exclude_dirs = self
            .scan
            .exclude_dirs
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Settings {
            include_folder: self.folders.include,
            src_folder: self.folders.src,
            manual_folder_selection: self.folders.manual_selection,
            create_missing_folders: self.folders.create_missing,
            extensions: ExtensionSets::new(header, source),
            guard_style: self.guard.style,
            guard_suffix: self.guard.suffix,
            exclude_dirs,
        })
    }
}

/// Adds the leading `.` where missing, trims whitespace and drops duplicates.
fn normalize_extensions(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|ext| ext.trim().to_string())
        .filter(|ext| !ext.is_empty() && ext != ".")
        .map(|ext| {
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{ext}")
            }
        })
        .filter(|ext| seen.insert(ext.clone()))
        .collect()
}

/// Validated, immutable settings shared by all operations.
#[derive(Debug, Clone)]
pub struct Settings {
    pub include_folder: PathBuf,
    pub src_folder: PathBuf,
    pub manual_folder_selection: bool,
    pub create_missing_folders: bool,
    pub extensions: ExtensionSets,
    pub guard_style: GuardStyle,
    pub guard_suffix: GuardSuffix,
    pub(crate) exclude_dirs: Vec<Pattern>,
}

impl Settings {
    /// Returns true if a directory with this name must not be traversed.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|pattern| pattern.matches(name))
    }
}

impl Default for Settings {
    fn default() -> Self {
        PairConfig::default()
            .compile()
            .expect("default configuration is valid")
    }
}
