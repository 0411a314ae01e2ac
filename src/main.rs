use clap::Parser;
use dualmode::cli::{self, Cli, Commands, GameArgs};
use dualmode::config::{AppConfig, LoggingConfig, OracleConfig, RegulationConfig};
use dualmode::error::{GameError, Result};
use dualmode::experiment;
use dualmode::game::{prompts::DEFAULT_GAME_SETTING, PlatformGame};
use dualmode::oracle::{ChatCompletionsOracle, DecisionOracle, ScriptedOracle};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let app = AppConfig::load_from(&cli.config)?;
    init_logging(&app.logging);
    app.validate()
        .map_err(|errors| GameError::InvalidConfig(errors.join("; ")))?;

    match cli.command {
        Some(Commands::Play {
            rounds,
            ban_dual,
            ban_imitation,
            ban_self_preferencing,
            output,
            dry_run,
            game,
        }) => {
            let regulation = RegulationConfig {
                ban_dual_mode: ban_dual || app.regulation.ban_dual_mode,
                ban_imitation: ban_imitation || app.regulation.ban_imitation,
                ban_self_preferencing: ban_self_preferencing
                    || app.regulation.ban_self_preferencing,
            };
            let rounds = rounds.unwrap_or(app.rounds);
            let output = output.unwrap_or_else(|| app.output.records_path.clone());
            run_play(&app, &game, regulation, rounds, &output, dry_run).await?;
        }
        Some(Commands::Experiments {
            rounds,
            scenarios,
            output,
            dry_run,
            game,
        }) => {
            let output = output.unwrap_or_else(|| app.output.records_path.clone());
            run_experiments(&app, &game, &scenarios, rounds, &output, dry_run).await?;
        }
        Some(Commands::Config) => {
            cli::print_config(&app);
        }
        None => {
            let output = app.output.records_path.clone();
            run_play(
                &app,
                &GameArgs::default(),
                app.regulation,
                app.rounds,
                &output,
                false,
            )
            .await?;
        }
    }

    Ok(())
}

async fn run_play(
    app: &AppConfig,
    overrides: &GameArgs,
    regulation: RegulationConfig,
    rounds: u32,
    output: &str,
    dry_run: bool,
) -> Result<()> {
    let config = overrides.apply(app.game);
    info!(
        "Starting game: {} rounds, regulation={:?}, dry_run={}",
        rounds, regulation, dry_run
    );

    let mut game = PlatformGame::new(
        DEFAULT_GAME_SETTING,
        config,
        regulation,
        build_oracle(&app.oracle, dry_run)?,
    )?;
    game.run(rounds).await?;

    cli::print_records(game.records());
    println!("{}", game.platform().status());
    println!("{}", game.seller().status());
    experiment::write_json(output, game.records())?;
    println!("Saved round records to {}", output);
    Ok(())
}

async fn run_experiments(
    app: &AppConfig,
    overrides: &GameArgs,
    scenarios: &str,
    rounds: u32,
    output: &str,
    dry_run: bool,
) -> Result<()> {
    let labels = experiment::parse_scenarios(scenarios)?;
    let config = overrides.apply(app.game);

    let records = experiment::run_scenarios(&labels, rounds, config, DEFAULT_GAME_SETTING, |_| {
        build_oracle(&app.oracle, dry_run)
    })
    .await?;

    cli::print_summaries(&experiment::summarize(&records));
    experiment::write_json(output, &records)?;
    println!("Saved raw data to {}", output);
    Ok(())
}

fn build_oracle(cfg: &OracleConfig, dry_run: bool) -> Result<Arc<dyn DecisionOracle>> {
    if dry_run {
        info!("Dry run: decisions fall back to stage defaults");
        return Ok(Arc::new(ScriptedOracle::default()));
    }
    match ChatCompletionsOracle::new(cfg.clone()) {
        Ok(oracle) => {
            info!("Using oracle model {}", oracle.model());
            Ok(Arc::new(oracle))
        }
        Err(GameError::Oracle(e)) => Err(GameError::InvalidConfig(format!(
            "{}; set DUALMODE_ORACLE__API_KEY or OPENAI_API_KEY, or pass --dry-run",
            e
        ))),
        Err(e) => Err(e),
    }
}

fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},dualmode=debug", cfg.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if cfg.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
