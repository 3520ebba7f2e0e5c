use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::Event;
use tokio::sync::{mpsc, watch};

use tickflow::config::Config;
use tickflow::event::AppEvent;
use tickflow::feed::SimulatedFeed;
use tickflow::flow::FlowBook;
use tickflow::input::{parse_main_command, UiCommand};
use tickflow::model::tick::Tick;
use tickflow::refdata;
use tickflow::store::FlowStore;
use tickflow::ui::{self, AppState};

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Single consumer loop owning all window/burst state. Selects over the tick
/// channel, the snapshot timer, and the shutdown flag; performs the final
/// flush (no reset) before returning so an interrupt loses nothing.
async fn run_aggregation(
    mut book: FlowBook,
    mut store: FlowStore,
    mut tick_rx: mpsc::Receiver<Tick>,
    app_tx: mpsc::Sender<AppEvent>,
    mut shutdown: watch::Receiver<bool>,
    snapshot_interval: Duration,
) {
    let start = tokio::time::Instant::now();
    let mut flush_timer =
        tokio::time::interval_at(start + snapshot_interval, snapshot_interval);

    loop {
        tokio::select! {
            maybe_tick = tick_rx.recv() => {
                let Some(tick) = maybe_tick else { break };
                let Some(outcome) = book.ingest(tick.clone()) else {
                    // Unroutable symbol: dropped silently.
                    continue;
                };

                for notification in outcome.notifications {
                    tracing::info!(
                        title = %notification.title,
                        message = %notification.message,
                        "burst notification"
                    );
                    let _ = app_tx.try_send(AppEvent::Notification {
                        title: notification.title,
                        message: notification.message,
                    });
                }
                if !outcome.burst_logs.is_empty() {
                    if let Err(e) = store.append_burst_ticks(&outcome.burst_logs) {
                        tracing::warn!(error = %e, "Failed to append burst ticks");
                    }
                }

                // Display updates are best-effort; the UI may lag but the
                // aggregation path never blocks on it.
                let _ = app_tx.try_send(AppEvent::MarketTick(tick));
                let _ = app_tx.try_send(AppEvent::FlowRows(book.rows(now_ms())));
            }
            _ = flush_timer.tick() => {
                let ts = now_ms();
                let rows = book.snapshot_and_reset(ts);
                let count = rows.len();
                match store.append_snapshot(&rows) {
                    Ok(()) => {
                        tracing::info!(rows = count, "Snapshot flushed, windows reset");
                        let _ = app_tx.try_send(AppEvent::SnapshotFlushed {
                            rows: count,
                            timestamp_ms: ts,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to persist snapshot");
                        let _ = app_tx.try_send(AppEvent::Error(format!(
                            "snapshot persist failed: {}",
                            e
                        )));
                    }
                }
                let _ = app_tx.try_send(AppEvent::FlowRows(book.rows(ts)));
            }
            _ = shutdown.changed() => break,
        }
    }

    // Final flush without reset.
    let rows = book.flush(now_ms());
    match store.append_snapshot(&rows) {
        Ok(()) => tracing::info!(rows = rows.len(), "Final snapshot flushed"),
        Err(e) => tracing::warn!(error = %e, "Final snapshot flush failed"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists");
            std::process::exit(1);
        }
    };

    // Init tracing (log to file so it doesn't interfere with TUI)
    let log_file = std::fs::File::create("tickflow.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| "info".parse().unwrap())
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let symbols = config.symbols();
    tracing::info!(
        symbols = ?symbols,
        snapshot_interval_secs = config.snapshot.interval_secs,
        "Starting tickflow"
    );

    let mut thresholds: HashMap<String, f64> = HashMap::new();
    for inst in &config.instruments {
        let symbol = inst.symbol.trim().to_ascii_uppercase();
        match inst.burst_threshold {
            Some(t) => {
                thresholds.insert(symbol, t);
            }
            None => {
                // Threshold 0 means every tick registers as a burst.
                tracing::warn!(symbol = %symbol, "No burst_threshold configured, defaulting to 0");
            }
        }
    }

    let lows = refdata::reference_lows(&config.instruments);
    let book = FlowBook::new(&symbols, thresholds, lows);
    let store = FlowStore::open(Path::new(&config.snapshot.db_path))
        .with_context(|| format!("failed to open {}", config.snapshot.db_path))?;

    // Channels
    let (tick_tx, tick_rx) = mpsc::channel::<Tick>(config.feed.channel_capacity);
    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Feed producer
    let feed = SimulatedFeed::new(&config.feed, &config.instruments);
    let feed_app_tx = app_tx.clone();
    let feed_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        if let Err(e) = feed.run(tick_tx, feed_app_tx, feed_shutdown).await {
            tracing::warn!(error = %e, "Feed task ended with error");
        }
    });

    // Aggregation consumer
    let agg_handle = tokio::spawn(run_aggregation(
        book,
        store,
        tick_rx,
        app_tx.clone(),
        shutdown_rx.clone(),
        Duration::from_secs(config.snapshot.interval_secs),
    ));

    // Ctrl+C handler
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    // TUI main loop
    let mut terminal = ratatui::init();
    let candle_interval_ms = config
        .ui
        .candle_interval_ms()
        .context("validated ui.candle_interval became invalid at runtime")?;
    let mut app_state = AppState::new(
        &symbols,
        candle_interval_ms,
        config.ui.price_history_len,
        config.snapshot.interval_secs * 1_000,
    );
    app_state.push_log(format!("tickflow started | {} symbols", symbols.len()));

    loop {
        terminal.draw(|frame| ui::render(frame, &app_state))?;

        // Handle input (non-blocking with timeout)
        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                if let Some(cmd) = parse_main_command(&key.code) {
                    match cmd {
                        UiCommand::Quit => {
                            tracing::info!("User quit");
                            let _ = shutdown_tx.send(true);
                            break;
                        }
                        UiCommand::Pause => {
                            if !app_state.paused {
                                app_state.paused = true;
                                app_state.push_log("Table paused".to_string());
                            }
                        }
                        UiCommand::Resume => {
                            if app_state.paused {
                                app_state.paused = false;
                                app_state.push_log("Table live".to_string());
                            }
                        }
                        UiCommand::SelectPrev => app_state.select_prev(),
                        UiCommand::SelectNext => app_state.select_next(),
                    }
                }
            }
        }

        // Drain events from channel
        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt);
        }

        // Check shutdown
        if *shutdown_rx.borrow() {
            break;
        }
    }

    let _ = shutdown_tx.send(true);
    // Wait for the final flush before tearing down the terminal.
    if let Err(e) = agg_handle.await {
        tracing::warn!(error = %e, "Aggregation task join failed");
    }

    ratatui::restore();
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check tickflow.log for details.");
    Ok(())
}
