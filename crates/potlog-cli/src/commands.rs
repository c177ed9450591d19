use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use potlog_ledger::SessionValidator;
use potlog_server::{PotlogServer, ServerConfig};
use potlog_settle::{calculate_diff, preview_settlement, Amount, CashOuts, PlayerId, Session};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Preview(args) => cmd_preview(args, &cli.format),
        Command::Diff(args) => cmd_diff(args, &cli.format),
        Command::Validate(args) => cmd_validate(args, &cli.format),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    let mut config = config.with_env()?;
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address: {bind}"))?;
    }
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir;
    }

    let server = PotlogServer::new(config)?;
    println!(
        "{} Potlog server on {}",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_preview(args: PreviewArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let session = read_session(&args.session)?;
    let cash_outs = read_cash_outs(&args.cash_outs)?;
    let preview = preview_settlement(&session, &cash_outs, args.mode.into())?;
    tracing::debug!(debts = preview.debts.len(), mode = ?args.mode, "computed preview");

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!(
        "Session {} ({}), {} players",
        session.numeric_id.to_string().yellow().bold(),
        session.stakes,
        session.players.len()
    );
    if preview.debts.is_empty() {
        println!("{} Nobody owes anything.", "✓".green().bold());
    }
    for debt in &preview.debts {
        println!(
            "  {} → {}  {}",
            player_name(&session, &debt.from_player_id).red(),
            player_name(&session, &debt.to_player_id).green(),
            format_amount(debt.amount).bold()
        );
    }
    if !preview.transfers.is_empty() {
        println!(
            "  ({} direct transfers already netted out)",
            preview.transfers.len()
        );
    }
    Ok(())
}

fn cmd_diff(args: DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let session = read_session(&args.session)?;
    let cash_outs = read_cash_outs(&args.cash_outs)?;
    let diff = calculate_diff(&session, &cash_outs)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "diff": diff })),
        OutputFormat::Text if diff == 0 => {
            println!("{} Cash-outs match the total buy-in.", "✓".green().bold())
        }
        OutputFormat::Text if diff > 0 => println!(
            "Cash-outs are {} short of the total buy-in.",
            format_amount(diff).yellow().bold()
        ),
        OutputFormat::Text => println!(
            "Cash-outs exceed the total buy-in by {}.",
            format_amount(-diff).yellow().bold()
        ),
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let session = read_session(&args.session)?;
    let report = SessionValidator::validate(&session);
    tracing::debug!(
        numeric_id = %report.numeric_id,
        violations = report.violations.len(),
        "validated session file"
    );

    if let OutputFormat::Json = format {
        let violations: Vec<_> = report
            .violations
            .iter()
            .map(|v| serde_json::json!({ "kind": format!("{:?}", v.kind), "description": v.description }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "numericId": report.numeric_id,
                "valid": report.is_valid(),
                "violations": violations,
            }))?
        );
    } else if report.is_valid() {
        println!(
            "{} Session {} is consistent ({} players)",
            "✓".green().bold(),
            report.numeric_id.to_string().yellow(),
            report.player_count
        );
    } else {
        for violation in &report.violations {
            println!("  {} {}", "✗".red().bold(), violation.description);
        }
    }

    if !report.is_valid() {
        anyhow::bail!("{} violations found", report.violations.len());
    }
    Ok(())
}

fn read_session(path: &Path) -> anyhow::Result<Session> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading session {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing session {}", path.display()))
}

fn read_cash_outs(path: &Path) -> anyhow::Result<CashOuts> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading cash-outs {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing cash-outs {}", path.display()))
}

fn player_name<'a>(session: &'a Session, id: &'a PlayerId) -> &'a str {
    session
        .player(id)
        .map(|p| p.name.as_str())
        .unwrap_or(id.as_str())
}

/// Minor units as a two-decimal major amount: `-1234` is `-12.34`.
fn format_amount(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use potlog_settle::{NumericCode, Player};

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(110_00), "110.00");
        assert_eq!(format_amount(-1234), "-12.34");
    }

    fn write_fixture(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let mut session = Session::new(NumericCode::new(314_159).unwrap(), "1/2");
        session.players.push(Player::with_id("a", "Alice", 100_00));
        session.players.push(Player::with_id("b", "Bob", 100_00));
        let session_path = dir.join("session.json");
        std::fs::write(&session_path, serde_json::to_string(&session).unwrap()).unwrap();
        let cash_path = dir.join("cash.json");
        std::fs::write(&cash_path, r#"{"a": 150000, "b": 5000}"#).unwrap();
        (session_path, cash_path)
    }

    #[test]
    fn preview_and_diff_read_files() {
        let dir = tempfile::tempdir().unwrap();
        let (session, cash_outs) = write_fixture(dir.path());
        cmd_preview(
            PreviewArgs {
                session: session.clone(),
                cash_outs: cash_outs.clone(),
                mode: ModeArg::Proportional,
            },
            &OutputFormat::Json,
        )
        .unwrap();
        cmd_diff(DiffArgs { session, cash_outs }, &OutputFormat::Text).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_session(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("reading session"));
    }

    #[test]
    fn validate_flags_inconsistent_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let (session, _) = write_fixture(dir.path());
        // Buy-ins without matching ledger entries.
        assert!(cmd_validate(ValidateArgs { session }, &OutputFormat::Text).is_err());
    }
}
