//! Export — JSONL record series, yield CSV, merged protocol tables.
//!
//! Records are written one JSON object per line: `timestamp` plus the
//! record's fields, nulls included, so every line of a series has the same
//! key set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ratelab_core::merge::{MergedTable, TableKind};
use ratelab_core::{MarketDataRecord, MergedTables};

use crate::history::MarketHistory;
use crate::yields::YieldPoint;

// ─── JSONL ──────────────────────────────────────────────────────────

pub fn export_records_jsonl(records: &[MarketDataRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record).context("failed to serialize record")?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Parse a JSONL series. Blank lines are ignored.
pub fn import_records_jsonl(text: &str) -> Result<Vec<MarketDataRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid record on line {}", i + 1))
        })
        .collect()
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Columns: timestamp, apr.
pub fn export_yield_csv(points: &[YieldPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "apr"])?;
    for p in points {
        wtr.write_record([p.timestamp.to_rfc3339(), p.apr.to_string()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: Token, Contract, then one per protocol. Nulls are empty cells.
pub fn export_merged_csv(table: &MergedTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["Token".to_string(), "Contract".to_string()];
    header.extend(table.protocols.iter().cloned());
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut fields = vec![row.token.clone(), row.contract.clone()];
        fields.extend(
            row.values
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&fields)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact files ─────────────────────────────────────────────────

/// Write `{strategy_type}_{strategy_id}.jsonl` and, if any timestamps were
/// skipped, `{strategy_type}_{strategy_id}_skipped.jsonl` under `output_dir`.
///
/// Returns the path of the records file.
pub fn save_history(history: &MarketHistory, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let stem = format!("{}_{}", history.strategy_type, history.strategy_id);
    let path = output_dir.join(format!("{stem}.jsonl"));
    std::fs::write(&path, export_records_jsonl(&history.records)?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    if !history.skipped.is_empty() {
        let mut skipped = String::new();
        for entry in &history.skipped {
            skipped.push_str(&serde_json::to_string(entry)?);
            skipped.push('\n');
        }
        let skipped_path = output_dir.join(format!("{stem}_skipped.jsonl"));
        std::fs::write(&skipped_path, skipped)
            .with_context(|| format!("failed to write {}", skipped_path.display()))?;
    }

    Ok(path)
}

/// Write `lend.csv`, `borrow.csv`, `collateral.csv` under `output_dir`.
pub fn save_merged(tables: &MergedTables, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    TableKind::ALL
        .into_iter()
        .map(|kind| -> Result<PathBuf> {
            let path = output_dir.join(format!("{}.csv", file_stem(kind)));
            std::fs::write(&path, export_merged_csv(tables.table(kind))?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(path)
        })
        .collect()
}

fn file_stem(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Lend => "lend",
        TableKind::Borrow => "borrow",
        TableKind::Collateral => "collateral",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ratelab_core::merge::MergedRow;

    fn record() -> MarketDataRecord {
        let mut r = MarketDataRecord::new(Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap());
        r.insert("token1", "USDC");
        r.insert("lend_total_apr_1A", 0.052);
        r.insert("lend_avg8hr_apr_3B", None::<f64>);
        r
    }

    #[test]
    fn jsonl_one_object_per_line() {
        let text = export_records_jsonl(&[record(), record()]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v["token1"], "USDC");
        assert!(v["lend_avg8hr_apr_3B"].is_null());
        assert!(v.get("timestamp").is_some());
    }

    #[test]
    fn jsonl_reads_back() {
        let text = export_records_jsonl(&[record()]).unwrap();
        let back = import_records_jsonl(&format!("{text}\n")).unwrap();
        assert_eq!(back, vec![record()]);
    }

    #[test]
    fn yield_csv_header() {
        let csv = export_yield_csv(&[YieldPoint {
            timestamp: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            apr: 0.05,
        }])
        .unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("timestamp,apr"));
        assert_eq!(lines.next(), Some("2025-02-01T00:00:00+00:00,0.05"));
    }

    #[test]
    fn merged_csv_blank_for_null() {
        let table = MergedTable {
            kind: TableKind::Borrow,
            protocols: vec!["navi".into(), "suilend".into()],
            rows: vec![MergedRow {
                token: "SUI".into(),
                contract: "0x2::sui::SUI".into(),
                values: vec![None, Some(0.07)],
            }],
        };
        let csv = export_merged_csv(&table).unwrap();
        assert_eq!(csv, "Token,Contract,navi,suilend\nSUI,0x2::sui::SUI,,0.07\n");
    }
}
