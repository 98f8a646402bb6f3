//! Export to disk example
//!
//! This example demonstrates the core functionality of paper-export:
//! - Reading the access token from the environment (or a `.env` file)
//! - Creating an exporter instance
//! - Subscribing to events
//! - Stopping the run cleanly on Ctrl+C
//!
//! Run with:
//!
//! ```text
//! DROPBOX_TOKEN=sl.xxx PAPER_EXPORT_ARCHIVE=1 cargo run --example export_to_disk
//! ```

use paper_export::config::{Config, ExportConfig};
use paper_export::{Event, ExportRequest, MessageLevel, PaperExporter, RunOutcome, stop_on_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let token = std::env::var("DROPBOX_TOKEN").unwrap_or_default();
    let archive = std::env::var("PAPER_EXPORT_ARCHIVE")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let config = Config {
        export: ExportConfig {
            output_dir: "exports".into(),
            ..Default::default()
        },
        ..Default::default()
    };

    let exporter = PaperExporter::new(config)?;

    // Subscribe to events
    let mut events = exporter.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Status {
                    level: MessageLevel::Error,
                    message,
                    ..
                } => {
                    eprintln!("✗ {}", message);
                }
                Event::Status { message, .. } => {
                    println!("  {}", message);
                }
                Event::Progress {
                    current,
                    total,
                    percent,
                } => {
                    println!("⬇ {}/{} ({:.0}%)", current, total, percent);
                }
                Event::StateChanged { state, action } => {
                    println!("» {:?} (control: {:?})", state, action);
                }
                _ => {}
            }
        }
    });

    let signal_task = tokio::spawn(stop_on_signal(exporter.clone()));

    let outcome = exporter.start(ExportRequest::new(token, archive)).await;

    // Drop every event sender so the printer drains and exits
    signal_task.abort();
    signal_task.await.ok();
    drop(exporter);
    printer.await.ok();

    match outcome? {
        RunOutcome::NothingFound => println!("Nothing to export"),
        RunOutcome::Completed(summary) => {
            println!(
                "✓ Exported {} of {} documents ({} not found)",
                summary.exported, summary.total, summary.not_found
            );
            if let Some(path) = summary.archive_path {
                println!("✓ Archive: {}", path.display());
            }
        }
        RunOutcome::Stopped(summary) => {
            println!(
                "Stopped after {} of {} documents",
                summary.attempted, summary.total
            );
        }
    }

    Ok(())
}
