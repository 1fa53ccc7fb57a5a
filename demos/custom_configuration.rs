//! Custom configuration example
//!
//! Shows every configuration knob with its default, plus JSON persistence
//! of the settings blob.

use cloudscale::config::{ArchiveConfig, EndpointConfig, PacingConfig, RetryConfig};
use cloudscale::{BatchUpscaler, Config};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config {
        cloud_name: "your-cloud-name".to_string(),
        upload_preset: "your-unsigned-preset".to_string(),

        // Items processed per window; clamped to [1, 5] at run start.
        concurrency: 3,

        // Tag attached to every upload for later manual cleanup.
        upload_tag: "cloudscale_temp".to_string(),

        // Transform fetches retry with a linear-multiplied backoff:
        // base_delay * 1, base_delay * 2, ...
        retry: RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        },

        // Pause between windows, a guard against remote rate limiting.
        pacing: PacingConfig {
            cooldown: Duration::from_millis(600),
        },

        // Low/fast Deflate level for the output bundle.
        archive: ArchiveConfig {
            compression_level: 3,
        },

        // Both bases can point at a proxy or a mock server.
        endpoints: EndpointConfig {
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
            delivery_base: "https://res.cloudinary.com".to_string(),
        },
    };

    // Persist the settings and read them back — the same JSON blob a
    // settings form would write.
    config.save("cloudscale.json")?;
    let loaded = Config::load("cloudscale.json")?;

    let engine = BatchUpscaler::new(loaded)?;
    println!(
        "engine ready (concurrency {})",
        engine.config().effective_concurrency()
    );

    Ok(())
}
