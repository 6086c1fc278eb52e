use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "pbi-fixer.toml";
pub const RC_FILE: &str = ".pbi-fixer-rc";

/// Main configuration structure for pbi-fixer
///
/// Every section falls back to its defaults, so a file only needs the keys it
/// changes.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FixerConfig {
    /// Power BI / Fabric API access
    pub api: ApiConfig,
    /// Workspace defaults
    pub workspace: WorkspaceConfig,
    /// Verification polling
    pub polling: PollingConfig,
    /// Embed-save hook for the embed upgrade variant
    pub embed: EmbedConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Bearer token (can be set via env var)
    pub access_token: Option<String>,
    pub powerbi_base_url: String,
    pub fabric_base_url: String,
    pub request_timeout_seconds: u64,
    /// Client-side request rate limit
    pub requests_per_second: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace name or id used when a command gets no --workspace
    pub default: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    /// Wall-clock budget for verification polling
    pub time_limit_seconds: u64,
    /// Interval after a definition round-trip
    pub definition_interval_seconds: u64,
    /// Interval after an embed save
    pub embed_interval_seconds: u64,
    /// Interval for long-running operation status checks
    pub lro_interval_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EmbedConfig {
    /// Program that opens the embedded report and triggers a save
    pub save_command: Option<String>,
    /// Arguments passed before the embed URL, report id and workspace id
    pub save_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (overridden by RUST_LOG)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            access_token: None, // Will be read from env var or pbi-fixer.toml
            powerbi_base_url: "https://api.powerbi.com".to_string(),
            fabric_base_url: "https://api.fabric.microsoft.com".to_string(),
            request_timeout_seconds: 120,
            requests_per_second: 5,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: 60,
            definition_interval_seconds: 3,
            embed_interval_seconds: 2,
            lro_interval_seconds: 2,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl FixerConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (pbi-fixer.toml, .pbi-fixer-rc)
    /// 3. Environment variables (prefixed with PBI_FIXER_, `__` between sections)
    pub fn load() -> Result<Self> {
        let mut files = Vec::new();
        for file in [CONFIG_FILE, RC_FILE] {
            if Path::new(file).exists() {
                files.push(file);
            }
        }
        Self::load_from_files(&files)
    }

    pub fn load_from_files<P: AsRef<Path>>(files: &[P]) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&FixerConfig::default())?);

        for file in files {
            builder = builder.add_source(
                File::from(file.as_ref()).format(FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("PBI_FIXER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut fixer_config: FixerConfig = builder.build()?.try_deserialize()?;
        fixer_config.apply_env_shortcuts();
        Ok(fixer_config)
    }

    /// Token and default workspace may also come from short env var names.
    fn apply_env_shortcuts(&mut self) {
        if self.api.access_token.is_none() {
            self.api.access_token = ["PBI_FIXER_ACCESS_TOKEN", "FABRIC_ACCESS_TOKEN"]
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find(|token| !token.trim().is_empty());
        }

        if self.workspace.default.is_none() {
            self.workspace.default = std::env::var("PBI_FIXER_DEFAULT_WORKSPACE")
                .ok()
                .filter(|w| !w.trim().is_empty());
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<FixerConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = FixerConfig::load_env_file();
        FixerConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static FixerConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
