//! Multiple subscriber example
//!
//! Events are broadcast: any number of consumers can subscribe
//! independently. Here one task renders progress while another records
//! processing handles for later cleanup of the remote media library.

use cloudscale::{BatchUpscaler, Config, Event, scan_folder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::new("your-cloud-name", "your-unsigned-preset");
    let engine = BatchUpscaler::new(config)?;

    // Subscriber 1: progress display
    let mut progress = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = progress.recv().await {
            if let Event::StateChanged {
                index,
                state,
                progress_hint,
            } = event
            {
                println!("[progress] item {} -> {:?} ({}%)", index, state, progress_hint);
            }
        }
    });

    // Subscriber 2: handle audit log. Uploads cannot be deleted through
    // this library, so keep the handles for manual cleanup.
    let mut audit = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = audit.recv().await {
            if let Event::HandleCreated { index, public_id } = event {
                println!("[audit] item {} uploaded as {}", index, public_id);
            }
        }
    });

    let report = engine.run(scan_folder("./images")?).await?;
    println!(
        "finished: {} completed, {} failed",
        report.completed, report.errors
    );

    Ok(())
}
