//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_data_adapter::CsvDataAdapter;
use crate::adapters::csv_schedule_adapter::CsvScheduleWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{validate_data_config, validate_strategy_config};
use crate::domain::error::WeekrotError;
use crate::domain::rotation::{RotationConfig, TimingConvention};
use crate::domain::schedule::AllocationSchedule;
use crate::domain::strategy::{Strategy, WeeklyRotation};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::schedule_port::SchedulePort;

#[derive(Parser, Debug)]
#[command(name = "weekrot", about = "Weekly rotation allocation scheduler")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the allocation schedule and write it as CSV
    Schedule {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the configured timing convention
        #[arg(long)]
        timing: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range for the configured symbols
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Schedule {
            config,
            output,
            timing,
            dry_run,
        } => run_schedule(&config, output.as_ref(), timing.as_deref(), dry_run),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = WeekrotError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Read the `[strategy]` section into a `RotationConfig`, applying defaults
/// for absent keys.
pub fn build_rotation_config(adapter: &dyn ConfigPort) -> Result<RotationConfig, WeekrotError> {
    let defaults = RotationConfig::default();

    let warmup = adapter.get_int("strategy", "warmup_days", defaults.warmup_days as i64);
    if warmup < 0 {
        return Err(WeekrotError::ConfigInvalid {
            section: "strategy".into(),
            key: "warmup_days".into(),
            reason: "warmup_days must be non-negative".into(),
        });
    }

    let timing_str = adapter
        .get_string("strategy", "timing")
        .unwrap_or_else(|| defaults.timing.as_str().to_string());
    let timing = TimingConvention::parse(timing_str.trim()).ok_or_else(|| {
        WeekrotError::ConfigInvalid {
            section: "strategy".into(),
            key: "timing".into(),
            reason: format!("unrecognized timing '{timing_str}'"),
        }
    })?;

    Ok(RotationConfig {
        warmup_days: warmup as usize,
        take_profit_pct: adapter.get_double("strategy", "take_profit_pct", defaults.take_profit_pct),
        legacy_take_profit_pct: adapter.get_double(
            "strategy",
            "legacy_take_profit_pct",
            defaults.legacy_take_profit_pct,
        ),
        timing,
    })
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<WeeklyRotation, WeekrotError> {
    let symbol = adapter
        .get_string("strategy", "symbol")
        .ok_or_else(|| WeekrotError::ConfigMissing {
            section: "strategy".into(),
            key: "symbol".into(),
        })?;
    let benchmark = adapter
        .get_string("strategy", "benchmark")
        .ok_or_else(|| WeekrotError::ConfigMissing {
            section: "strategy".into(),
            key: "benchmark".into(),
        })?;

    let config = build_rotation_config(adapter)?;
    Ok(WeeklyRotation::new(
        symbol.trim().to_uppercase().as_str(),
        benchmark.trim().to_uppercase().as_str(),
        config,
    ))
}

/// Flat-to-long transitions in the traded-instrument column.
fn count_entries(schedule: &AllocationSchedule) -> usize {
    let mut entries = 0;
    let mut prev = 0.0;
    for i in 0..schedule.len() {
        let w = schedule.weight(i, 0);
        if w > 0.0 && prev == 0.0 {
            entries += 1;
        }
        prev = w;
    }
    entries
}

fn run_schedule(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    timing_override: Option<&str>,
    dry_run: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let mut strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Some(raw) = timing_override {
        match TimingConvention::parse(raw.trim()) {
            Some(t) => strategy.config.timing = t,
            None => {
                eprintln!(
                    "error: unrecognized --timing '{raw}' (expected prior_close or same_close_deferred)"
                );
                return ExitCode::from(2);
            }
        }
    }

    eprintln!(
        "Strategy: {} v{} on {} (benchmark {}, timing {})",
        strategy.name(),
        strategy.version(),
        strategy.symbol(),
        strategy.benchmark(),
        strategy.config.timing.as_str(),
    );

    if dry_run {
        eprintln!("Dry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    let data_port = match CsvDataAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let history = match data_port.fetch_history(strategy.universe()) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  Processing: {} dates", history.len());

    let schedule = match strategy.run(&history) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Schedule Summary ===");
    eprintln!("Trading days:     {}", schedule.len());
    eprintln!("Warm-up days:     {}", strategy.config.warmup_days.min(schedule.len()));
    eprintln!("Entries:          {}", count_entries(&schedule));
    eprintln!("Days exposed:     {}", schedule.exposure_days(0));

    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("schedule.csv"));
    let writer = CsvScheduleWriter::new(output.clone());
    match writer.write_schedule(&schedule) {
        Ok(()) => {
            eprintln!("\nSchedule written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    match build_strategy(&adapter) {
        Ok(strategy) => {
            eprintln!("  symbol:     {}", strategy.symbol());
            eprintln!("  benchmark:  {}", strategy.benchmark());
            eprintln!("  warmup:     {} days", strategy.config.warmup_days);
            eprintln!(
                "  take-profit: +{:.1}% (legacy +{:.1}%)",
                strategy.config.take_profit_pct * 100.0,
                strategy.config.legacy_take_profit_pct * 100.0,
            );
            eprintln!("  timing:     {}", strategy.config.timing.as_str());
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let strategy = match build_strategy(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = match CsvDataAdapter::from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for symbol in strategy.universe() {
        match data_port.data_range(symbol) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} rows, {} to {}", symbol, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", symbol);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", symbol, e);
            }
        }
    }
    ExitCode::SUCCESS
}
