//! Full progress report: per-tier rows plus the member input table.

use crate::{ledger_totals, progress, Progress, TargetKind, Totals};
use guild_core::{Catalog, MemberId, ResourceName};
use guild_ledger::{LedgerStore, MemberLedger};
use serde::Serialize;
use std::fmt;

const BAR_CELLS: usize = 20;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TierReport {
    pub name: String,
    pub rows: Vec<Progress>,
}

/// One member's raw submission, aligned with [`MemberTable::columns`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberRow {
    pub member: MemberId,
    pub quantities: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberTable {
    pub columns: Vec<ResourceName>,
    pub rows: Vec<MemberRow>,
}

impl MemberTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the status page shows, derived from one ledger snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressReport {
    pub tiers: Vec<TierReport>,
    pub totals: Totals,
    pub members: MemberTable,
}

/// Build the report for every catalog target against the current ledger.
pub fn build_report<S: LedgerStore>(catalog: &Catalog, ledger: &MemberLedger<S>) -> ProgressReport {
    let totals = ledger_totals(ledger);
    let tiers = catalog
        .tiers
        .iter()
        .map(|tier| TierReport {
            name: tier.name.clone(),
            rows: tier.targets.iter().map(|t| progress(t, &totals)).collect(),
        })
        .collect();

    let columns = catalog.base_resources.clone();
    let rows = ledger
        .all()
        .iter()
        .map(|(member, holdings)| MemberRow {
            member: member.clone(),
            quantities: columns
                .iter()
                .map(|c| holdings.get(c).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    ProgressReport {
        tiers,
        totals,
        members: MemberTable { columns, rows },
    }
}

fn bar(ratio: f64) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * BAR_CELLS as f64).round() as usize).min(BAR_CELLS);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_CELLS - filled))
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &Progress) -> fmt::Result {
    writeln!(
        f,
        "{}: {}/{} (short {})",
        row.label, row.have, row.need, row.shortfall
    )?;
    writeln!(f, "  {} {:>5.1}%", bar(row.ratio), row.ratio * 100.0)?;
    if row.kind == TargetKind::Derived {
        let join = |pick: fn(&crate::IngredientProgress) -> u64| {
            row.ingredients
                .iter()
                .map(|i| format!("{} {}", i.resource, pick(i)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "  needs {} for {}", join(|i| i.required), row.need)?;
        if row.shortfall > 0 {
            writeln!(f, "  remaining {}", join(|i| i.remaining))?;
        }
        if let Some(b) = &row.bottleneck {
            writeln!(f, "  bottleneck: {}", b)?;
        }
    }
    Ok(())
}

impl fmt::Display for MemberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "no resources submitted yet");
        }
        let header: Vec<&str> = std::iter::once("member")
            .chain(self.columns.iter().map(|c| c.as_str()))
            .collect();
        writeln!(f, "{}", header.join(" | "))?;
        for row in &self.rows {
            let cells: Vec<String> = std::iter::once(row.member.to_string())
                .chain(row.quantities.iter().map(|q| q.to_string()))
                .collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tier in &self.tiers {
            writeln!(f, "[{}]", tier.name)?;
            for row in &tier.rows {
                write_row(f, row)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "[members]")?;
        write!(f, "{}", self.members)
    }
}
