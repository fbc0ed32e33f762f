use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Root directory for generated files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Largest project document accepted, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Image generation settings
    #[serde(default)]
    pub image: ImageProviderConfig,

    /// Video generation settings
    #[serde(default)]
    pub video: VideoProviderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Image generation (Gemini) configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageProviderConfig {
    // @field: Model path
    #[serde(default = "default_image_model")]
    pub model: String,

    // @field: API key, empty for placeholder output
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for ImageProviderConfig {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            api_key: String::new(),
            endpoint: default_image_endpoint(),
            timeout_secs: default_image_timeout_secs(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
        }
    }
}

/// Video generation (Veo) configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoProviderConfig {
    // @field: Model path
    #[serde(default = "default_video_model")]
    pub model: String,

    // @field: API key, empty for placeholder output
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_video_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_video_timeout_secs")]
    pub timeout_secs: u64,

    /// Length of generated clips
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,

    /// Aspect ratio as `W:H`
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
}

impl Default for VideoProviderConfig {
    fn default() -> Self {
        Self {
            model: default_video_model(),
            api_key: String::new(),
            endpoint: default_video_endpoint(),
            timeout_secs: default_video_timeout_secs(),
            duration_secs: default_duration_secs(),
            aspect_ratio: default_aspect_ratio(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_max_file_size() -> u64 {
    500 * 1024 * 1024
}

fn default_image_model() -> String {
    "models/gemini-3-pro-image-preview".to_string()
}

fn default_image_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_image_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.9
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_video_model() -> String {
    "models/veo-2.0-generate-001".to_string()
}

fn default_video_endpoint() -> String {
    "https://api.veo.google.com/v1".to_string()
}

fn default_video_timeout_secs() -> u64 {
    // video generation is slow
    120
}

fn default_duration_secs() -> u32 {
    5
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            max_file_size: default_max_file_size(),
            image: ImageProviderConfig::default(),
            video: VideoProviderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load the configuration file, writing a default one if it does not exist yet.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Apply environment overrides from the process environment.
    pub fn with_process_env(self) -> Result<Self> {
        self.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides using the given variable lookup.
    ///
    /// Recognized variables: `GEMINI_API_KEY`, `VEO_API_KEY`, `GEMINI_BASE_URL`,
    /// `VEO_BASE_URL`, `OUTPUT_DIR`, `MAX_FILE_SIZE`, `LOG_LEVEL`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.image.api_key = key;
        }
        if let Some(key) = lookup("VEO_API_KEY") {
            self.video.api_key = key;
        }
        if let Some(endpoint) = lookup("GEMINI_BASE_URL") {
            self.image.endpoint = endpoint;
        }
        if let Some(endpoint) = lookup("VEO_BASE_URL") {
            self.video.endpoint = endpoint;
        }
        if let Some(dir) = lookup("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("MAX_FILE_SIZE") {
            self.max_file_size = size
                .trim()
                .parse()
                .with_context(|| format!("MAX_FILE_SIZE is not a byte count: {}", size))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level.parse()?;
        }

        Ok(self)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(anyhow!("max_file_size must be greater than zero"));
        }

        validate_endpoint("image.endpoint", &self.image.endpoint)?;
        validate_endpoint("video.endpoint", &self.video.endpoint)?;

        if self.image.timeout_secs == 0 || self.video.timeout_secs == 0 {
            return Err(anyhow!("Provider timeouts must be greater than zero"));
        }

        if self.video.duration_secs == 0 {
            return Err(anyhow!("video.duration_secs must be greater than zero"));
        }

        if !is_aspect_ratio(&self.video.aspect_ratio) {
            return Err(anyhow!(
                "video.aspect_ratio must look like 16:9, got '{}'",
                self.video.aspect_ratio
            ));
        }

        // Missing keys are allowed: providers fall back to placeholder output
        if self.image.api_key.is_empty() {
            warn!("No image API key configured, image generation will return placeholders");
        }
        if self.video.api_key.is_empty() {
            warn!("No video API key configured, video generation will return placeholders");
        }

        Ok(())
    }
}

fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).with_context(|| format!("{} is not a valid URL: {}", field, endpoint))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("{} must use http or https, got '{}'", field, other)),
    }
}

fn is_aspect_ratio(value: &str) -> bool {
    match value.split_once(':') {
        Some((w, h)) => {
            matches!(w.parse::<u32>(), Ok(w) if w > 0) && matches!(h.parse::<u32>(), Ok(h) if h > 0)
        }
        None => false,
    }
}
