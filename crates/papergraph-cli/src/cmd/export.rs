//! `papergraph export` / `papergraph verify`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color};
use papergraph_core::{fmt_mib, fmt_num};
use papergraph_export::{ExportConfig, verify_export};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export directory (overrides [output] public_dir)
    #[arg(short, long)]
    pub public_dir: Option<PathBuf>,
}

impl ExportArgs {
    fn export_config(&self, config: &Config) -> ExportConfig {
        ExportConfig::new(
            self.public_dir
                .clone()
                .unwrap_or_else(|| config.output.public_dir.clone()),
        )
    }
}

pub fn export(args: ExportArgs, config: &Config) -> Result<()> {
    let export_config = args.export_config(config);
    let db = super::open_database(config)?;
    let summary = papergraph_export::run(&db, &export_config)?;

    let mut table = super::table(&["Item", "Count"]);
    let stats = &summary.statistics;
    table.add_row(vec!["Papers".to_string(), fmt_num(stats.paper_count)]);
    table.add_row(vec!["Authors".to_string(), fmt_num(stats.author_count)]);
    table.add_row(vec!["Venues".to_string(), fmt_num(stats.venue_count)]);
    table.add_row(vec!["Nodes".to_string(), fmt_num(summary.node_count)]);
    table.add_row(vec!["Links".to_string(), fmt_num(summary.link_count)]);
    table.add_row(vec!["Chunks".to_string(), fmt_num(summary.chunk_count)]);
    table.add_row(vec!["Total size".to_string(), fmt_mib(summary.total_size)]);

    eprintln!("\n{table}");
    eprintln!(
        "Exported to {} in {:.1}s",
        export_config.public_dir.display(),
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}

pub fn verify(args: ExportArgs, config: &Config) -> Result<()> {
    let export_config = args.export_config(config);
    let report = verify_export(&export_config)?;

    let mut table = super::table(&["Chunk", "Size", "Records", "Status"]);
    for check in &report.chunks {
        let size = match check.actual_size {
            Some(actual) if actual != check.expected_size => {
                format!("{actual} (expected {})", check.expected_size)
            }
            Some(actual) => actual.to_string(),
            None => "missing".to_string(),
        };
        let records = match check.actual_count {
            Some(actual) if actual != check.expected_count => {
                format!("{actual} (expected {})", check.expected_count)
            }
            Some(actual) => actual.to_string(),
            None => "-".to_string(),
        };
        let status = if check.ok {
            Cell::new("OK").fg(Color::Green)
        } else {
            Cell::new("FAIL").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&check.filename),
            Cell::new(size),
            Cell::new(records),
            status,
        ]);
    }
    eprintln!("\n{table}");

    if !report.total_size_ok {
        eprintln!(
            "totalSize {} does not match the sum of chunk sizes",
            report.manifest.total_size
        );
    }
    if report.is_ok() {
        eprintln!("All {} chunks verified OK.", report.chunks.len());
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} chunks failed verification",
            report.failures().count(),
            report.chunks.len()
        )
    }
}
