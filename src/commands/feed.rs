//! Write the syndication feed to stdout

use anyhow::Result;
use chrono::Local;

use crate::feed::{build_feed, collect_items, FeedChannel};
use crate::Folio;

/// Generate the RSS document with the same builder the server uses
pub async fn run(folio: &Folio) -> Result<()> {
    let store = folio.store();
    let now = Local::now();

    let items = collect_items(&store, &folio.config, now).await?;
    let channel = FeedChannel::from_config(&folio.config);
    let xml = build_feed(&channel, items, folio.config.feed.limit, now);

    print!("{}", xml);
    Ok(())
}
