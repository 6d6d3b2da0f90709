//! Scoreboard demo: a tabbed page driven by simulated client payloads.
//!
//! Run with `cargo run -p remui-demo-scoreboard`. Every outbound update is
//! logged by the in-memory transport, so the whole decode → route → mutate
//! → patch loop is visible in the console.

mod tabs;
mod transport;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tabs::{DemoSession, ExamplePage};
use transport::ConsoleSink;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let sink = Arc::new(ConsoleSink::new());
    let mut page = ExamplePage::new(sink.clone());
    let session = DemoSession::new("Ada");

    // A plausible client interaction sequence: open the scoreboard tab,
    // bump the score twice, wander to tab 3 and back, then send garbage.
    let payloads = [
        r#"{"Action":"tab-2-selected"}"#,
        r#"{"Action":"tab-2-btn-clicked"}"#,
        r#"{"Action":"tab-2-btn-clicked"}"#,
        r#"{"Action":"tab-2-next-clicked"}"#,
        r#"{"Action":"tab-3-back-btn-clicked"}"#,
        r#"{"Action":"tab-4-selected"}"#,
        r#"{"Action":"tab-4-back-btn-clicked"}"#,
        r#"{}"#,
        r#"{"Action":"no-such-action"}"#,
        r#"this is not json"#,
    ];

    for raw in payloads {
        info!(raw, "client -> server");
        page.handle_client_payload(&session, raw);
    }

    info!(updates = sink.delivered(), "demo complete");
}
