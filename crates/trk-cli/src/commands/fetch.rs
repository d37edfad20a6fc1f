use anyhow::{Context, Result};
use trk_fetch::{HttpOrderFetcher, OrderFetcher};
use trk_view::{replay, ViewEvent};

use crate::SourceArgs;

/// Fetch once, render, and fail the process if the fetch failed.
pub async fn run(order_id: &str, args: &SourceArgs) -> Result<()> {
    let cfg = super::resolve_config(args)?;
    let style = super::style_for(&cfg, args);
    let fetcher = HttpOrderFetcher::from_config(&cfg.api);
    tracing::info!(url = %fetcher.tracking_url(), order_id, "fetching order");

    let result = fetcher.fetch_order(order_id).await;
    let failure = result.as_ref().err().cloned();

    // Same reducer path as live tracking, minus the push channel.
    let view = replay([
        ViewEvent::Mounted {
            session: 1,
            order_id: order_id.to_string(),
        },
        ViewEvent::FetchStarted { session: 1 },
        ViewEvent::FetchResolved { session: 1, result },
    ]);
    print!("{}", trk_timeline::render_view(view.state(), style));

    match failure {
        Some(err) => Err(err).with_context(|| format!("order fetch failed for {order_id}")),
        None => Ok(()),
    }
}
