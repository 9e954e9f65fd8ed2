use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use signdeck::config::Config;
use signdeck::refresh::{Refresher, RunClock};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "signdeck", version, about = "Refresh the signage deck")]
struct Cli {
    /// Configuration file
    #[arg(long, env = "SIGNDECK_CONFIG", default_value = "signdeck.toml")]
    config: PathBuf,

    /// Logging verbosity level
    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all feeds and rewrite the deck
    Refresh {
        /// Run as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Print this week's recognitions without touching the deck
    Preview {
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Print JSON instead of one message per line
        #[arg(long)]
        json: bool,
    },
}

fn clock(today: Option<NaiveDate>) -> RunClock {
    let now = RunClock::now();
    RunClock {
        today: today.unwrap_or(now.today),
        hour: now.hour,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(cli.log_level))
        .init();

    let config = Config::load(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let refresher = Refresher::new(config)?;

    match cli.command {
        Command::Refresh { today } => {
            let report = refresher.run(clock(today)).await.context("refresh failed")?;
            println!("{}", serde_json::to_string(&report)?);
        },
        Command::Preview { today, json } => {
            let weekly = refresher
                .preview(clock(today).today)
                .await
                .context("cannot read the HR report")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&weekly)?);
            } else {
                println!("Birthdays:");
                for recognition in &weekly.birthdays {
                    println!("  {}", recognition.message);
                }
                println!("Anniversaries:");
                for recognition in &weekly.anniversaries {
                    println!("  {}", recognition.message);
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["signdeck", "refresh"]).unwrap();
        assert!(matches!(cli.log_level, LogLevel::Info));
        assert!(matches!(cli.command, Command::Refresh { today: None }));
    }

    #[test]
    fn cli_preview_with_date() {
        let cli = Cli::try_parse_from([
            "signdeck",
            "--config",
            "/etc/signdeck.toml",
            "--log-level",
            "debug",
            "preview",
            "--today",
            "2024-06-03",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/signdeck.toml"));
        assert!(matches!(cli.log_level, LogLevel::Debug));
        match cli.command {
            Command::Preview { today, json } => {
                assert_eq!(today, NaiveDate::from_ymd_opt(2024, 6, 3));
                assert!(json);
            },
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_rejects_bad_date() {
        assert!(Cli::try_parse_from(["signdeck", "refresh", "--today", "06/03/2024"]).is_err());
    }

    #[test]
    fn cli_requires_command() {
        assert!(Cli::try_parse_from(["signdeck"]).is_err());
    }
}
