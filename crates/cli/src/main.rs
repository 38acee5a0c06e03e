mod event;
mod tui;
mod widgets;

use std::sync::Arc;

use robobat_core::config::SimCfg;
use robobat_core::runtime::Runtime;
use robobat_logs::source::LogSource;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Panic hook: restore terminal even on panic in raw mode
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        default_hook(info);
    }));

    // Tracing: write to file when RUST_LOG is set (raw mode breaks stderr)
    if std::env::var("RUST_LOG").is_ok() {
        let file = std::fs::File::create("/tmp/robobat.log")?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().json().with_target(true).with_writer(file))
            .init();
    }

    let cfg = Arc::new(SimCfg::from_env());
    tracing::info!(?cfg, "config loaded");

    let logs = robobat_logs::http::from_env();
    tracing::info!(name = logs.name(), url = logs.endpoint(), "log source initialized");
    let log_source: Arc<dyn LogSource> = Arc::new(logs);

    let (mut runtime, command_tx, note_rx, status_rx) = Runtime::new(cfg.clone());
    runtime.listen_for_signals();
    let token = runtime.token();

    // Both futures share this task. Whichever finishes first cancels the other,
    // then we wait for it so the terminal is restored.
    let tui_token = token.clone();
    let runtime_fut = runtime.run();
    let tui_fut = tui::run_app(cfg, command_tx, note_rx, status_rx, log_source, tui_token);
    tokio::pin!(runtime_fut);
    tokio::pin!(tui_fut);

    let mut runtime_done = false;
    let mut tui_result: Option<anyhow::Result<()>> = None;

    loop {
        tokio::select! {
            _ = &mut runtime_fut, if !runtime_done => {
                runtime_done = true;
                token.cancel();
                if tui_result.is_none() {
                    tui_result = Some((&mut tui_fut).await);
                }
            }
            result = &mut tui_fut, if tui_result.is_none() => {
                tui_result = Some(result);
                token.cancel();
            }
        }

        if runtime_done && tui_result.is_some() {
            break;
        }
    }

    tui_result.unwrap_or(Ok(()))
}
