use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::DEFAULT_COMPANY_TOKEN_THRESHOLD;

const CONFIG_DIR: &str = ".certindex";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// File extensions treated as certificates (lowercase, no dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Filename globs to skip (lock files, temporaries)
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Skip dot-folders and dot-files
    #[serde(default = "default_true")]
    pub skip_hidden: bool,

    /// Follow symbolic links while walking customer folders
    #[serde(default)]
    pub follow_links: bool,

    /// Names with more tokens than this are read as companies
    #[serde(default = "default_company_token_threshold")]
    pub company_token_threshold: usize,

    /// Only index files whose name contains a certificate keyword
    #[serde(default)]
    pub require_certificate_keyword: bool,

    /// Keywords consulted when `require_certificate_keyword` is set
    #[serde(default = "default_certificate_keywords")]
    pub certificate_keywords: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
            skip_hidden: true,
            follow_links: false,
            company_token_threshold: default_company_token_threshold(),
            require_certificate_keyword: false,
            certificate_keywords: default_certificate_keywords(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    ["pdf", "docx", "doc", "txt", "jpg", "jpeg", "png", "tif", "tiff"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "~$*".to_string(),
        ".~lock.*".to_string(),
        "*.tmp".to_string(),
    ]
}

fn default_company_token_threshold() -> usize {
    DEFAULT_COMPANY_TOKEN_THRESHOLD
}

fn default_certificate_keywords() -> Vec<String> {
    [
        "certificado",
        "certifica",
        "constancia",
        "personería",
        "personeria",
        "firma",
        "vigencia",
        "poderes",
        "bps",
        "msp",
        "abitab",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory (relative paths resolve against the project root)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_registry_file")]
    pub registry_file: String,

    #[serde(default = "default_report_file")]
    pub report_file: String,

    /// Backup directory (relative paths resolve against `data_dir`)
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Copy the previous registry aside before overwriting it
    #[serde(default = "default_true")]
    pub backup_on_save: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            registry_file: default_registry_file(),
            report_file: default_report_file(),
            backup_dir: default_backup_dir(),
            backup_on_save: true,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_registry_file() -> String {
    "customer_registry.json".to_string()
}

fn default_report_file() -> String {
    "customer_report.json".to_string()
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

impl StorageConfig {
    /// Resolve the data directory against `root`.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        resolve(&self.data_dir, root)
    }

    pub fn registry_path(&self, root: &Path) -> PathBuf {
        self.data_dir(root).join(&self.registry_file)
    }

    pub fn report_path(&self, root: &Path) -> PathBuf {
        self.data_dir(root).join(&self.report_file)
    }

    pub fn backup_dir(&self, root: &Path) -> PathBuf {
        resolve(&self.backup_dir, &self.data_dir(root))
    }
}

fn resolve(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rolling files
    #[serde(default)]
    pub enabled: bool,

    /// Write logs to stderr
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// Level for the file layer: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory (relative paths resolve against the project root)
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Rotation: minutely, hourly, daily, never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: true,
            level: default_log_level(),
            directory: default_log_directory(),
            rotation: default_rotation(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".certindex/logs")
}

fn default_rotation() -> String {
    "daily".to_string()
}

fn default_file_prefix() -> String {
    "certindex.log".to_string()
}

impl Config {
    /// Load configuration from the .certindex directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .certindex directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the .certindex directory
    pub fn certindex_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR)
    }

    /// Check if certindex is initialized in the given directory
    pub fn is_initialized(root: &Path) -> bool {
        Self::certindex_dir(root).exists()
    }
}
