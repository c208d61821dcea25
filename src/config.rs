use crate::error::Error;
use crate::llm::prompt_builder::tokens_to_chars;
use crate::llm::{RequestConfig, prompts};
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Named bundle of defaults, one per historical script variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// gpt-3.5-turbo with the short "creative" instructions.
    Classic,
    /// gpt-4.1-nano with example-driven, <30 char instructions.
    #[default]
    Concise,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Concise => "concise",
        }
    }

    pub fn request_config(&self) -> RequestConfig {
        match self {
            Preset::Classic => {
                RequestConfig::new("gpt-3.5-turbo", prompts::CLASSIC_INSTRUCTIONS, 0.9)
            }
            Preset::Concise => {
                RequestConfig::new("gpt-4.1-nano", prompts::CONCISE_INSTRUCTIONS, 0.9)
            }
        }
    }

    pub fn max_chars(&self) -> usize {
        match self {
            Preset::Classic | Preset::Concise => tokens_to_chars(2000),
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Ok(Preset::Classic),
            "concise" => Ok(Preset::Concise),
            other => Err(Error::InvalidConfig(format!(
                "unknown preset {other:?} (expected \"classic\" or \"concise\")"
            ))),
        }
    }
}

/// Final resolved configuration, built once at startup and passed down.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub timeout: Duration,
    pub max_chars: usize,
    pub preset: Preset,
    pub request: RequestConfig,
}

// Hand-written so the bearer token never reaches a log line.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("max_chars", &self.max_chars)
            .field("preset", &self.preset)
            .field("request", &self.request)
            .finish()
    }
}

impl Config {
    /// Build the config from the process environment and the TOML file.
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn from_sources() -> Result<Self, Error> {
        let file_cfg = load_file_config()?;
        Self::resolve(|key| env::var(key).ok(), file_cfg)
    }

    /// Resolve every setting.
    ///
    /// Precedence:
    ///   1. Env var `COMMITLINE_<KEY>`
    ///   2. TOML file
    ///   3. Preset (env, then file, then `concise`)
    ///
    /// The credential only ever comes from `OPENAI_API_KEY`.
    pub fn resolve<F>(lookup: F, file_cfg: FileConfig) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .ok_or_else(|| Error::MissingCredential(API_KEY_VAR.to_string()))?;

        let preset = match var("COMMITLINE_PRESET").or(file_cfg.preset) {
            Some(name) => name.parse()?,
            None => Preset::default(),
        };

        let mut request = preset.request_config();

        if let Some(model) = var("COMMITLINE_MODEL").or(file_cfg.model) {
            request.model = model;
        }
        if let Some(prompt) = var("COMMITLINE_SYSTEM_PROMPT").or(file_cfg.system_prompt) {
            request.system_instructions = prompt;
        }
        if let Some(n) = parse_var(&var, "COMMITLINE_MAX_TOKENS")?.or(file_cfg.max_tokens) {
            request.max_output_tokens = n;
        }
        if let Some(n) = parse_var(&var, "COMMITLINE_N")?.or(file_cfg.n) {
            request.sample_count = n;
        }
        if let Some(stop) = file_cfg.stop {
            request.stop_sequences = stop;
        }
        if let Some(t) = parse_var(&var, "COMMITLINE_TEMPERATURE")?.or(file_cfg.temperature) {
            request.temperature = t;
        }

        let max_chars = parse_var(&var, "COMMITLINE_MAX_CHARS")?
            .or(file_cfg.max_chars)
            .unwrap_or_else(|| preset.max_chars());

        let api_base_url = var("COMMITLINE_BASE_URL")
            .or(file_cfg.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = parse_var(&var, "COMMITLINE_TIMEOUT_SECS")?
            .or(file_cfg.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let cfg = Config {
            api_key,
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
            max_chars,
            preset,
            request,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), Error> {
        let t = self.request.temperature;
        if !(0.0..=2.0).contains(&t) {
            return Err(Error::InvalidConfig(format!(
                "temperature must be within [0, 2], got {t}"
            )));
        }
        if self.request.max_output_tokens == 0 {
            return Err(Error::InvalidConfig("max_tokens must be greater than 0".into()));
        }
        if self.request.sample_count == 0 {
            return Err(Error::InvalidConfig("n must be greater than 0".into()));
        }
        if self.max_chars == 0 {
            return Err(Error::InvalidConfig("max_chars must be greater than 0".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout_secs must be greater than 0".into()));
        }
        if self.request.model.trim().is_empty() {
            return Err(Error::InvalidConfig("model must not be empty".into()));
        }
        Ok(())
    }
}

fn parse_var<T, F>(var: &F, name: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::InvalidConfig(format!("{name}={raw:?}: {e}")))
        })
        .transpose()
}

/// Logging verbosity from `COMMITLINE_VERBOSITY` (0-3), read before anything else.
pub fn verbosity() -> u8 {
    env::var("COMMITLINE_VERBOSITY")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub preset: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_chars: Option<usize>,
    pub max_tokens: Option<u32>,
    pub n: Option<u32>,
    pub stop: Option<Vec<String>>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `$COMMITLINE_CONFIG`, or `~/.config/commitline.toml`.
fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("COMMITLINE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("commitline.toml"))
}

fn load_file_config() -> Result<FileConfig, Error> {
    let Some(path) = config_path() else {
        return Ok(FileConfig::default());
    };
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let cfg = read_file_config(&path).map_err(|e| Error::InvalidConfig(format!("{e:#}")))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(cfg)
}

fn read_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str::<FileConfig>(&data)
        .with_context(|| format!("failed to parse {}", path.display()))
}
