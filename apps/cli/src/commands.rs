//! Line commands for the interactive prompt and the session that runs them.

use anyhow::{anyhow, bail, Context, Result};
use guild_core::Catalog;
use guild_ledger::{MemberLedger, UpsertOutcome};
use guild_progress::build_report;
use std::io::Write;

pub const HELP: &str = "\
commands:
  save <id> <resource>=<qty>...   replace a member's holdings (omitted resources = 0)
  show <id>                       print a member's saved holdings
  report                          progress toward every target
  members                         table of member submissions
  resources                       list reportable base resources
  help                            this text
  quit                            exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Save {
        id: String,
        quantities: Vec<(String, i64)>,
    },
    Show(String),
    Report,
    Members,
    Resources,
    Help,
    Quit,
    Empty,
}

fn parse_quantity(token: &str) -> Result<(String, i64)> {
    let (name, qty) = token
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected <resource>=<qty>, got {token:?}"))?;
    if name.is_empty() {
        bail!("missing resource name in {token:?}");
    }
    let qty: i64 = qty
        .parse()
        .with_context(|| format!("invalid quantity for {name}"))?;
    Ok((name.to_string(), qty))
}

/// Parse one prompt line.
pub fn parse_command(line: &str) -> Result<Command> {
    let mut tokens = line.split_whitespace();
    let Some(head) = tokens.next() else {
        return Ok(Command::Empty);
    };
    let cmd = match head {
        "save" => {
            let id = tokens.next().ok_or_else(|| anyhow!("usage: save <id> <resource>=<qty>..."))?;
            let quantities = tokens.map(parse_quantity).collect::<Result<Vec<_>>>()?;
            Command::Save {
                id: id.to_string(),
                quantities,
            }
        }
        "show" => {
            let id = tokens.next().ok_or_else(|| anyhow!("usage: show <id>"))?;
            Command::Show(id.to_string())
        }
        "report" | "view" => Command::Report,
        "members" => Command::Members,
        "resources" => Command::Resources,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {other:?} (try help)"),
    };
    Ok(cmd)
}

/// Catalog plus ledger for one running process.
pub struct Session {
    catalog: Catalog,
    ledger: MemberLedger,
    json: bool,
}

impl Session {
    pub fn new(catalog: Catalog, json: bool) -> Self {
        let ledger = MemberLedger::new(&catalog);
        Self {
            catalog,
            ledger,
            json,
        }
    }

    pub fn ledger_mut(&mut self) -> &mut MemberLedger {
        &mut self.ledger
    }

    /// Print the full progress report.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<()> {
        let report = build_report(&self.catalog, &self.ledger);
        if self.json {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        } else {
            write!(out, "{report}")?;
        }
        Ok(())
    }

    /// Run a command. Returns `false` once the user asked to quit.
    pub fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<bool> {
        match cmd {
            Command::Save { id, quantities } => {
                match self.ledger.upsert(&id, quantities)? {
                    UpsertOutcome::Ignored => writeln!(out, "member id is empty; nothing saved")?,
                    _ => writeln!(out, "saved holdings for {}", id.trim())?,
                }
            }
            Command::Show(id) => {
                if self.ledger.get(&id).is_none() {
                    writeln!(out, "{id} has not submitted yet")?;
                }
                let values = self.ledger.prefill(&id);
                for r in &self.catalog.base_resources {
                    writeln!(out, "{r} = {}", values.get(r).copied().unwrap_or(0))?;
                }
            }
            Command::Report => self.write_report(out)?,
            Command::Members => {
                let report = build_report(&self.catalog, &self.ledger);
                write!(out, "{}", report.members)?;
            }
            Command::Resources => {
                for r in &self.catalog.base_resources {
                    writeln!(out, "{r}")?;
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
            Command::Empty => {}
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, line: &str) -> String {
        let mut out = Vec::new();
        let cmd = parse_command(line).unwrap();
        session.execute(cmd, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_save_with_negative_and_plus_names() {
        let cmd = parse_command("save Alice 목재+=100 점토=-5").unwrap();
        assert_eq!(
            cmd,
            Command::Save {
                id: "Alice".to_string(),
                quantities: vec![("목재+".to_string(), 100), ("점토".to_string(), -5)],
            }
        );
    }

    #[test]
    fn parse_errors() {
        assert!(parse_command("save").is_err());
        assert!(parse_command("save Alice 점토").is_err());
        assert!(parse_command("save Alice 점토=lots").is_err());
        assert!(parse_command("save Alice =5").is_err());
        assert!(parse_command("fly").is_err());
        assert_eq!(parse_command("   ").unwrap(), Command::Empty);
        assert_eq!(parse_command("view").unwrap(), Command::Report);
    }

    #[test]
    fn save_then_show_and_report() {
        let mut s = Session::new(Catalog::shipbuilding(), false);
        assert_eq!(run(&mut s, "save Alice 통나무=100 점토=100"), "saved holdings for Alice\n");
        let shown = run(&mut s, "show Alice");
        assert!(shown.contains("통나무 = 100"));
        assert!(shown.contains("강철괴 = 0"));
        let report = run(&mut s, "report");
        assert!(report.contains("타르: 2/200 (short 198)"));
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let mut s = Session::new(Catalog::shipbuilding(), false);
        let cmd = parse_command("save Alice 타르=1").unwrap();
        let mut out = Vec::new();
        assert!(s.execute(cmd, &mut out).is_err());
        assert!(s.ledger_mut().is_empty());
    }

    #[test]
    fn show_unknown_member_prefills_zeros() {
        let mut s = Session::new(Catalog::shipbuilding(), false);
        let shown = run(&mut s, "show Nobody");
        assert!(shown.starts_with("Nobody has not submitted yet"));
        assert!(shown.contains("물이든병 = 0"));
    }

    #[test]
    fn json_report() {
        let mut s = Session::new(Catalog::shipbuilding(), true);
        run(&mut s, "save Bob 강철괴=50");
        let v: serde_json::Value = serde_json::from_str(&run(&mut s, "report")).unwrap();
        assert_eq!(v["totals"]["강철괴"], 50);
    }

    #[test]
    fn quit_stops() {
        let mut s = Session::new(Catalog::shipbuilding(), false);
        let mut out = Vec::new();
        assert!(!s.execute(Command::Quit, &mut out).unwrap());
        assert!(s.execute(Command::Help, &mut out).unwrap());
    }
}
