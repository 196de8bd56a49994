#![deny(warnings)]

//! Headless front end for the guild shipbuilding tracker.
//!
//! Members' holdings are entered with `save` commands on stdin (or primed from
//! a JSON seed file) and the progress report is printed on demand.

use anyhow::{Context, Result};
use guild_core::Catalog;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{parse_command, Session, HELP};

#[derive(Debug, Default, PartialEq)]
struct Args {
    catalog: Option<PathBuf>,
    seed: Option<PathBuf>,
    json: bool,
    report_only: bool,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Args {
    let mut parsed = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--catalog" => parsed.catalog = it.next().map(PathBuf::from),
            "--seed" => parsed.seed = it.next().map(PathBuf::from),
            "--json" => parsed.json = true,
            "--report" => parsed.report_only = true,
            "--version" | "-V" => parsed.version = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    parsed
}

/// Submissions keyed by member id, each a map of resource to quantity.
type Seed = BTreeMap<String, BTreeMap<String, i64>>;

fn apply_seed(session: &mut Session, path: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let seed: Seed = serde_json::from_str(&text)
        .with_context(|| format!("parsing seed file {}", path.display()))?;
    for (id, quantities) in &seed {
        session
            .ledger_mut()
            .upsert(id, quantities.iter().map(|(r, q)| (r.as_str(), *q)))
            .with_context(|| format!("seeding member {id}"))?;
    }
    Ok(seed.len())
}

fn run_prompt(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{HELP}")?;
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let outcome = parse_command(&line).and_then(|cmd| session.execute(cmd, &mut stdout));
        match outcome {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("error: {e:#}"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1));
    if args.version {
        println!(
            "guild-cli {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(?args, "starting CLI");

    let catalog = match &args.catalog {
        Some(path) => guild_core::load_catalog(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::shipbuilding(),
    };
    let mut session = Session::new(catalog, args.json);
    if let Some(seed) = &args.seed {
        let n = apply_seed(&mut session, seed)?;
        info!(members = n, "applied seed submissions");
    }

    if args.report_only {
        session.write_report(&mut io::stdout())?;
        return Ok(());
    }
    run_prompt(&mut session)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags() {
        let a = args(&["--catalog", "c.yaml", "--seed", "s.json", "--json", "--report"]);
        assert_eq!(a.catalog, Some(PathBuf::from("c.yaml")));
        assert_eq!(a.seed, Some(PathBuf::from("s.json")));
        assert!(a.json && a.report_only && !a.version);
        assert_eq!(args(&["--bogus"]), Args::default());
    }

    #[test]
    fn seed_file_primes_ledger() {
        let path = std::env::temp_dir().join(format!("guild-seed-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"Alice": {"강철괴": 100}, "Bob": {"강철괴": 50, "점토": -3}}"#)
            .unwrap();
        let mut session = Session::new(Catalog::shipbuilding(), false);
        assert_eq!(apply_seed(&mut session, &path).unwrap(), 2);
        assert_eq!(session.ledger_mut().get("Bob").unwrap()["점토"], 0);
        let mut out = Vec::new();
        session.write_report(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("강철괴: 150/1500 (short 1350)"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn seed_with_unknown_resource_fails() {
        let path = std::env::temp_dir().join(format!("guild-bad-seed-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"Alice": {"금괴": 1}}"#).unwrap();
        let mut session = Session::new(Catalog::shipbuilding(), false);
        assert!(apply_seed(&mut session, &path).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
