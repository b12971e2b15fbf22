//! Scriptorium demo CLI.
//!
//! Loads a small script graph through a simulated fetcher and logs every
//! lifecycle transition.
//!
//! # Usage
//!
//! ```bash
//! scriptorium-demo [pretty|compact|json] [--fail <src>] [--latency-ms <ms>]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=debug scriptorium-demo compact --fail https://cdn.example/analytics.js
//! ```

use std::sync::Arc;
use std::time::Duration;

use example::{DemoPage, SimulatedFetcher, TracingConfig, TracingFormat, demo_loader, log_lifecycle};
use scriptorium_hooks::HooksAPI;

const DEFAULT_LATENCY_MS: u64 = 25;

struct Args {
    format: TracingFormat,
    failing: Vec<String>,
    latency: Duration,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        format: TracingFormat::default(),
        failing: Vec::new(),
        latency: Duration::from_millis(DEFAULT_LATENCY_MS),
    };

    let mut raw = std::env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--fail" => {
                let src = raw.next().ok_or("--fail needs a source")?;
                args.failing.push(src);
            }
            "--latency-ms" => {
                let ms = raw.next().ok_or("--latency-ms needs a value")?;
                let ms = ms.parse().map_err(|e| format!("invalid latency '{ms}': {e}"))?;
                args.latency = Duration::from_millis(ms);
            }
            other => args.format = other.parse().map_err(|e| format!("{e}"))?,
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: [pretty|compact|json] [--fail <src>] [--latency-ms <ms>]");
            std::process::exit(1);
        }
    };

    TracingConfig::default().with_format(args.format).init();

    let fetcher = args
        .failing
        .into_iter()
        .fold(SimulatedFetcher::new(args.latency), SimulatedFetcher::fail_on);
    let fetcher = Arc::new(fetcher);

    let hooks = Arc::new(HooksAPI::new());
    if let Err(e) = log_lifecycle(&hooks) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let page = match DemoPage::build(&demo_loader(Arc::clone(&fetcher), hooks)) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let startup = page.queue_startup();
    match page.load().await {
        Ok(()) => {
            let callbacks = startup.await.unwrap_or_default();
            tracing::info!(callbacks, executed = ?fetcher.executed(), "page ready");
        }
        Err(e) => {
            tracing::error!(error = %e, "page failed to load");
            std::process::exit(1);
        }
    }
}
