use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, GameConfig};
use crate::domain::RoundRecord;
use crate::experiment::ScenarioSummary;

#[derive(Parser)]
#[command(name = "dualmode")]
#[command(version = "0.1.0")]
#[command(about = "Platform dual-mode game between LLM-driven platform and seller agents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml, $DUALMODE_ENV.toml)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play one game under a chosen regulation
    Play {
        /// Number of rounds
        #[arg(short, long)]
        rounds: Option<u32>,
        /// Ban the dual mode (platform must pick marketplace or seller)
        #[arg(long)]
        ban_dual: bool,
        /// Forbid product imitation in dual mode
        #[arg(long)]
        ban_imitation: bool,
        /// Force the platform to show the seller to every consumer
        #[arg(long)]
        ban_self_preferencing: bool,
        /// Where to write round records as JSON
        #[arg(short, long)]
        output: Option<String>,
        /// Run offline: every decision falls back to its default
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Run several regulation scenarios and compare them
    Experiments {
        /// Rounds per scenario
        #[arg(short, long, default_value = "3")]
        rounds: u32,
        /// Comma-separated scenario keys (baseline, ban_self_pref, ban_dual_mode, ban_imitation, ban_all)
        #[arg(short, long, default_value = "baseline,ban_self_pref,ban_dual_mode")]
        scenarios: String,
        /// Where to write tagged round records as JSON
        #[arg(short, long)]
        output: Option<String>,
        /// Run offline: every decision falls back to its default
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Print the effective configuration
    Config,
}

/// Model parameter overrides
#[derive(Args, Debug, Clone, Default)]
pub struct GameArgs {
    /// Baseline product value v
    #[arg(long)]
    pub base_value: Option<f64>,
    /// Platform product advantage σ
    #[arg(long)]
    pub sigma: Option<f64>,
    /// Convenience value b offered by the platform
    #[arg(long)]
    pub convenience: Option<f64>,
    /// Lower bound on innovation
    #[arg(long)]
    pub min_innovation: Option<f64>,
    /// Upper bound on innovation
    #[arg(long)]
    pub max_innovation: Option<f64>,
    /// Scale of the quadratic innovation cost
    #[arg(long)]
    pub innovation_cost_scale: Option<f64>,
    /// Upper support of the outside option distribution
    #[arg(long = "outside-scale")]
    pub outside_option_scale: Option<f64>,
    /// Consumer mass
    #[arg(long)]
    pub market_size: Option<u32>,
}

impl GameArgs {
    /// Apply the overrides on top of a loaded configuration
    pub fn apply(&self, mut cfg: GameConfig) -> GameConfig {
        if let Some(v) = self.base_value {
            cfg.base_value = v;
        }
        if let Some(v) = self.sigma {
            cfg.sigma = v;
        }
        if let Some(v) = self.convenience {
            cfg.convenience = v;
        }
        if let Some(v) = self.min_innovation {
            cfg.min_innovation = v;
        }
        if let Some(v) = self.max_innovation {
            cfg.max_innovation = v;
        }
        if let Some(v) = self.innovation_cost_scale {
            cfg.innovation_cost_scale = v;
        }
        if let Some(v) = self.outside_option_scale {
            cfg.outside_option_scale = v;
        }
        if let Some(v) = self.market_size {
            cfg.market_size = v;
        }
        cfg
    }
}

/// Print round records as a table
pub fn print_records(records: &[RoundRecord]) {
    println!(
        "{:>5} {:>12} {:>6} {:>6} {:>4} {:>5} {:>7} {:>7} {:>7} {:>12} {:>12}",
        "round", "mode", "τ", "Δ", "imit", "show", "P_M", "P_S^in", "P_S^out", "Π_M", "π_S"
    );
    for r in records {
        println!(
            "{:>5} {:>12} {:>6.2} {:>6.1} {:>4} {:>5.2} {:>7.2} {:>7.2} {:>7.2} {:>12.2} {:>12.2}",
            r.round,
            r.mode.as_str(),
            r.commission,
            r.innovation,
            if r.imitation { "yes" } else { "no" },
            r.display_share,
            r.price_m,
            r.price_s_platform,
            r.price_s_direct,
            r.profit_m,
            r.profit_s,
        );
    }
}

/// Print per-scenario totals
pub fn print_summaries(summaries: &[ScenarioSummary]) {
    println!(
        "{:<16} {:>6} {:>14} {:>14} {:>8}  modes",
        "scenario", "rounds", "ΣΠ_M", "Σπ_S", "mean Δ"
    );
    for s in summaries {
        let modes: Vec<String> = s
            .mode_counts
            .iter()
            .map(|(mode, n)| format!("{}={}", mode, n))
            .collect();
        println!(
            "{:<16} {:>6} {:>14.2} {:>14.2} {:>8.2}  {}",
            s.scenario,
            s.rounds,
            s.total_profit_m,
            s.total_profit_s,
            s.mean_innovation,
            modes.join(", ")
        );
    }
}

/// Print the effective configuration (API key masked)
pub fn print_config(cfg: &AppConfig) {
    println!("rounds: {}", cfg.rounds);
    println!("game: {:?}", cfg.game);
    println!("regulation: {:?}", cfg.regulation);
    println!(
        "oracle: {} model={} key={} retries={} delay={}ms",
        cfg.oracle.base_url,
        cfg.oracle.model,
        if cfg.oracle.is_configured() { "set" } else { "missing" },
        cfg.oracle.max_retries,
        cfg.oracle.retry_delay_ms
    );
    println!("output: {}", cfg.output.records_path);
}
