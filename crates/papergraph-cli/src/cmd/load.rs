//! `papergraph load` - load a published export the way the frontend does

use anyhow::Result;
use clap::Args;
use indicatif::ProgressBar;
use papergraph_core::{SHARED_RUNTIME, SharedProgress, fmt_mib, fmt_num};
use papergraph_loader::{
    ChunkSource, DataLoader, DirSource, HttpSource, LoadError, LoadObserver, LoadProgress,
    LoadResult,
};

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Base URL (http/https) or directory holding data-manifest.json
    pub source: String,
}

/// Drives a percent bar from loader progress reports
struct BarObserver {
    bar: ProgressBar,
}

impl LoadObserver for BarObserver {
    fn on_progress(&self, progress: &LoadProgress<'_>) {
        self.bar.set_position(progress.percent.round() as u64);
        self.bar.set_message(progress.label.to_string());
        log::debug!("{:.1}% {}", progress.percent, progress.label);
    }

    fn on_error(&self, error: &LoadError) {
        self.bar.abandon_with_message(error.to_string());
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

async fn load_from<S: ChunkSource>(
    source: S,
    observer: &BarObserver,
) -> Result<LoadResult, LoadError> {
    log::info!("Loading from {}", source.location());
    DataLoader::new(source).load(observer).await
}

pub fn run(args: LoadArgs, progress: &SharedProgress) -> Result<()> {
    let observer = BarObserver {
        bar: progress.percent_bar("load"),
    };

    let result = SHARED_RUNTIME.block_on(async {
        if is_url(&args.source) {
            load_from(HttpSource::new(&args.source), &observer).await
        } else {
            load_from(DirSource::new(&args.source), &observer).await
        }
    })?;
    observer.bar.finish_and_clear();

    let data = &result.data;
    let mut table = super::table(&["Item", "Count"]);
    table.add_row(vec!["Papers".to_string(), fmt_num(data.statistics.paper_count)]);
    table.add_row(vec!["Authors".to_string(), fmt_num(data.statistics.author_count)]);
    table.add_row(vec!["Venues".to_string(), fmt_num(data.statistics.venue_count)]);
    table.add_row(vec!["Nodes".to_string(), fmt_num(data.network.nodes.len())]);
    table.add_row(vec!["Links".to_string(), fmt_num(data.network.links.len())]);
    table.add_row(vec!["Chunks".to_string(), fmt_num(result.loaded_chunks.len())]);
    table.add_row(vec!["Total size".to_string(), fmt_mib(result.total_size)]);
    eprintln!("\n{table}");
    Ok(())
}
