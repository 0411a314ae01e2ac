use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub regulation: RegulationConfig,
    /// Number of rounds per game (>= 1)
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_rounds() -> u32 {
    5
}

/// Parameters of the demand/profit model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Baseline product value v offered by fringe sellers
    pub base_value: f64,
    /// Convenience benefit b of buying on the platform
    pub convenience: f64,
    /// Platform product-quality advantage
    pub sigma: f64,
    /// Lower bound on seller innovation
    pub min_innovation: f64,
    /// Upper bound on seller innovation
    pub max_innovation: f64,
    /// Scale c of the innovation cost c * (innovation - min_innovation)^2
    pub innovation_cost_scale: f64,
    /// Upper support of the linear outside-option distribution
    pub outside_option_scale: f64,
    /// Consumer mass
    pub market_size: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_value: 100.0,
            convenience: 10.0,
            sigma: 5.0,
            min_innovation: 5.0,
            max_innovation: 60.0,
            innovation_cost_scale: 0.08,
            outside_option_scale: 120.0,
            market_size: 1000,
        }
    }
}

impl GameConfig {
    /// Validate model parameters
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let fields = [
            ("base_value", self.base_value),
            ("convenience", self.convenience),
            ("sigma", self.sigma),
            ("min_innovation", self.min_innovation),
            ("max_innovation", self.max_innovation),
            ("innovation_cost_scale", self.innovation_cost_scale),
            ("outside_option_scale", self.outside_option_scale),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                errors.push(format!("{name} must be finite, got {value}"));
            }
        }

        if self.min_innovation < 0.0 {
            errors.push("min_innovation must be non-negative".to_string());
        }

        if self.min_innovation > self.max_innovation {
            errors.push(format!(
                "min_innovation ({}) must not exceed max_innovation ({})",
                self.min_innovation, self.max_innovation
            ));
        }

        if self.convenience < 0.0 {
            errors.push("convenience must be non-negative".to_string());
        }

        if self.innovation_cost_scale < 0.0 {
            errors.push("innovation_cost_scale must be non-negative".to_string());
        }

        if self.outside_option_scale < 0.0 {
            errors.push("outside_option_scale must be non-negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Regulatory interventions; any combination is valid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulationConfig {
    pub ban_dual_mode: bool,
    pub ban_imitation: bool,
    pub ban_self_preferencing: bool,
}

/// Chat-completions endpoint used as the decision oracle
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// API base URL (`/chat/completions` is appended)
    pub base_url: String,
    /// API key; falls back to `OPENAI_API_KEY` when empty
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per prompt before giving up
    pub max_retries: u32,
    /// Base backoff delay, doubled on every retry
    pub retry_delay_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            timeout_secs: 60,
            max_retries: 5,
            retry_delay_ms: 2000,
        }
    }
}

impl OracleConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Where round records are written as JSON
    #[serde(default = "default_records_path")]
    pub records_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_path: default_records_path(),
        }
    }
}

fn default_records_path() -> String {
    "exp/platform_game_results.json".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            regulation: RegulationConfig::default(),
            rounds: default_rounds(),
            oracle: OracleConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
                json: false,
            },
            output: OutputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("rounds", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/sweep.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("DUALMODE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (DUALMODE_GAME__SIGMA, etc.)
            .add_source(
                Environment::with_prefix("DUALMODE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
        if cfg.oracle.api_key.is_empty() {
            cfg.oracle.api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        }
        Ok(cfg)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = match self.game.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        if self.rounds < 1 {
            errors.push("rounds must be at least 1".to_string());
        }

        if self.oracle.max_retries < 1 {
            errors.push("oracle.max_retries must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
