//! Per-item pipeline: upload → transform fetch → archive insert.

use crate::archive::ArchiveBuilder;
use crate::config::RetryConfig;
use crate::error::Error;
use crate::retry::fetch_bytes_with_retry;
use crate::types::{Event, ItemState, SourceFile};
use crate::upload::UploadClient;
use crate::utils::upscaled_file_name;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

use super::session::RunSession;

/// Everything one item task needs, bundled for the spawn site
pub(crate) struct ItemTaskContext {
    /// Item index in selection order
    pub(crate) index: usize,
    /// The file being processed
    pub(crate) file: Arc<SourceFile>,
    /// Shared upload/transform client
    pub(crate) uploader: Arc<UploadClient>,
    /// Retry settings for the transform fetch
    pub(crate) retry: RetryConfig,
    /// Shared archive accumulating successful results
    pub(crate) archive: Arc<Mutex<ArchiveBuilder>>,
    /// Shared run session, written only with non-terminal progress
    pub(crate) session: Arc<Mutex<RunSession>>,
    /// Event channel for observers
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl ItemTaskContext {
    /// Report a state transition
    ///
    /// Non-terminal states land in the session; terminal ones are applied
    /// by the scheduler at settlement. The event always goes out.
    async fn report(&self, state: ItemState, progress_hint: u8) {
        self.session
            .lock()
            .await
            .report_progress(self.index, state);
        let _ = self.event_tx.send(Event::StateChanged {
            index: self.index,
            state,
            progress_hint,
        });
    }
}

/// Run one item through upload → transform fetch → archive insert
///
/// A failure at any step propagates to the scheduler, which settles this
/// item and carries on with its siblings.
pub(crate) async fn run_item_task(ctx: ItemTaskContext) -> Result<(), Error> {
    ctx.report(ItemState::Uploading, 15).await;
    let public_id = ctx.uploader.upload(&ctx.file).await?;

    // Uploaded assets can only be removed through the vendor's media
    // library; surface the handle so an external collaborator can clean up.
    tracing::info!(
        index = ctx.index,
        public_id = %public_id,
        "uploaded asset; remove from the remote media library manually if needed"
    );
    let _ = ctx.event_tx.send(Event::HandleCreated {
        index: ctx.index,
        public_id: public_id.clone(),
    });

    ctx.report(ItemState::Transforming, 45).await;
    let url = ctx.uploader.transform_url(&public_id);
    let bytes = fetch_bytes_with_retry(ctx.uploader.http(), &url, &ctx.retry).await?;

    let out_name = upscaled_file_name(ctx.file.name());
    ctx.archive.lock().await.add_entry(&out_name, &bytes)?;

    ctx.report(ItemState::Completed, 100).await;
    Ok(())
}
