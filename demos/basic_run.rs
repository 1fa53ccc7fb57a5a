//! Basic run example
//!
//! This example demonstrates the core functionality of cloudscale:
//! - Building a configuration from credentials
//! - Creating an engine instance
//! - Subscribing to events
//! - Scanning a folder and running the batch
//! - Saving the resulting archive

use cloudscale::{BatchUpscaler, Config, Event, scan_folder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let folder = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./images".to_string());

    // Only the account credentials are required; everything else defaults
    // to the vendor endpoints and pacing constants.
    let config = Config::new("your-cloud-name", "your-unsigned-preset");
    let engine = BatchUpscaler::new(config)?;

    // Subscribe to events
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::RunStarted { total } => {
                    println!("▶ Processing {} image(s)", total);
                }
                Event::StateChanged {
                    index,
                    state,
                    progress_hint,
                } => {
                    println!("  [{}] {:?} ({}%)", index, state, progress_hint);
                }
                Event::ItemFailed { name, error, .. } => {
                    println!("✕ Failed: {} — {}", name, error);
                }
                Event::ArchiveReady { name, entries } => {
                    println!("📦 Archive {} ready with {} entrie(s)", name, entries);
                }
                Event::RunComplete { completed, errors } => {
                    println!("✓ Done: {} completed, {} failed", completed, errors);
                }
                Event::RunFailed { error } => {
                    println!("✕ Run failed: {}", error);
                }
                _ => {}
            }
        }
    });

    // Scan the folder and run the batch
    let selection = scan_folder(&folder)?;
    let report = engine.run(selection).await?;

    // Save the archive next to the current directory
    if let Some(archive) = &report.archive {
        let path = archive.write_to(".")?;
        println!("Saved {}", path.display());
    }

    Ok(())
}
