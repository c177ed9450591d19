use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use potlog_settle::BalanceMode;

#[derive(Parser)]
#[command(
    name = "potlog",
    about = "Potlog: cash-game ledger and settlement engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Show the debts settling a session file would produce
    Preview(PreviewArgs),
    /// Show how far reported cash-outs are from the total buy-in
    Diff(DiffArgs),
    /// Check a session file for ledger inconsistencies
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on; overrides the config file and PORT
    #[arg(long)]
    pub bind: Option<String>,
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Store sessions as JSON files in this directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Session document (JSON)
    #[arg(long)]
    pub session: PathBuf,
    /// Cash-outs as a JSON object of player id to amount
    #[arg(long)]
    pub cash_outs: PathBuf,
    #[arg(long, value_enum, default_value = "max-winner")]
    pub mode: ModeArg,
}

#[derive(Args)]
pub struct DiffArgs {
    #[arg(long)]
    pub session: PathBuf,
    #[arg(long)]
    pub cash_outs: PathBuf,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(long)]
    pub session: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    MaxWinner,
    Proportional,
}

impl From<ModeArg> for BalanceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::MaxWinner => BalanceMode::MaxWinner,
            ModeArg::Proportional => BalanceMode::Proportional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["potlog", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));
            assert!(args.config.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_preview_defaults_to_max_winner() {
        let cli = Cli::try_parse_from([
            "potlog",
            "preview",
            "--session",
            "s.json",
            "--cash-outs",
            "c.json",
        ])
        .unwrap();
        if let Command::Preview(args) = cli.command {
            assert_eq!(args.mode, ModeArg::MaxWinner);
            assert_eq!(args.session, PathBuf::from("s.json"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_proportional_mode() {
        let cli = Cli::try_parse_from([
            "potlog",
            "preview",
            "--session",
            "s.json",
            "--cash-outs",
            "c.json",
            "--mode",
            "proportional",
        ])
        .unwrap();
        if let Command::Preview(args) = cli.command {
            assert_eq!(BalanceMode::from(args.mode), BalanceMode::Proportional);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn preview_requires_files() {
        assert!(Cli::try_parse_from(["potlog", "preview", "--session", "s.json"]).is_err());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["potlog", "--verbose", "validate", "--session", "s.json"])
            .unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from([
            "potlog", "diff", "--session", "s.json", "--cash-outs", "c.json", "--format", "json",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
