use std::path::Path;

use anyhow::{Context, Result};
use showlist_core::{ShowListConfig, ShowsPipeline};

use crate::Format;
use crate::commands::print_outcome;

pub fn run(config: &ShowListConfig, file: &Path, format: Format) -> Result<()> {
    let feed = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let pipeline = ShowsPipeline::from_config(config);
    let outcome = pipeline.rows_from_feed(&feed, pipeline.now());

    print_outcome(outcome, format)
}
