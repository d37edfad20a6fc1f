use std::sync::Arc;

use anyhow::{Context, Result};
use trk_fetch::HttpOrderFetcher;
use trk_live::WsTransport;
use trk_view::spawn_tracker;

use crate::SourceArgs;

/// Re-render on every state change until Ctrl-C, then unmount.
pub async fn run(order_id: &str, args: &SourceArgs) -> Result<()> {
    let cfg = super::resolve_config(args)?;
    let style = super::style_for(&cfg, args);

    let fetcher = Arc::new(HttpOrderFetcher::from_config(&cfg.api));
    let transport = Arc::new(WsTransport::new(cfg.push.url.clone()));
    let handle = spawn_tracker(fetcher, transport);
    let mut states = handle.subscribe();

    handle
        .track(order_id)
        .await
        .context("tracker stopped before tracking began")?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let panel = trk_timeline::render_view(&states.borrow_and_update(), style);
                if !panel.is_empty() {
                    println!("----");
                    print!("{panel}");
                }
            }
            signal = &mut ctrl_c => {
                signal.context("failed to listen for Ctrl-C")?;
                tracing::info!("interrupt received");
                break;
            }
        }
    }

    handle.unmount().await;
    Ok(())
}
