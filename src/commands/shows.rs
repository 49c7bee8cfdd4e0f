use anyhow::Result;
use showlist_core::{FeedRetriever, ShowListConfig, ShowsPipeline};

use crate::Format;
use crate::commands::print_outcome;
use crate::utils::create_spinner;

pub async fn run(config: &ShowListConfig, format: Format) -> Result<()> {
    let pipeline = ShowsPipeline::from_config(config);
    let retriever = FeedRetriever::new(config.feed_source());

    let spinner = create_spinner(format!("Fetching {}", config.calendar_id));
    let outcome = pipeline.load(&retriever, pipeline.now()).await;
    spinner.finish_and_clear();

    print_outcome(outcome, format)
}
