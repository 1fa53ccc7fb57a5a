//! Run orchestration: window partitioning, barriers, settlement, cooldown.

use crate::archive::{ArchiveBuilder, archive_name};
use crate::error::{ArchiveError, Error, Result};
use crate::source::Selection;
use crate::types::{Event, ItemState, RunReport, SourceFile};
use crate::upload::UploadClient;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::Mutex;

use super::BatchUpscaler;
use super::item_task::{ItemTaskContext, run_item_task};
use super::session::RunSession;

impl BatchUpscaler {
    /// Run the batch pipeline over a selection
    ///
    /// Partitions the items into consecutive windows of the configured
    /// concurrency, runs each window's items in parallel behind a barrier,
    /// paces windows with the cooldown, and finalizes the archive once all
    /// windows settle. One item's failure never aborts its siblings or the
    /// run. Only one run may be active per engine; a second call fails with
    /// [`Error::RunActive`].
    pub async fn run(&self, selection: Selection) -> Result<RunReport> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::RunActive);
        }
        let result = self.run_inner(selection).await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(&self, selection: Selection) -> Result<RunReport> {
        let Selection { folder, files } = selection;
        if files.is_empty() {
            return Err(Error::NoSources(folder));
        }

        let total = files.len();
        let concurrency = self.config.effective_concurrency();
        *self.session.lock().await = RunSession::for_items(total);
        let _ = self.event_tx.send(Event::RunStarted { total });
        tracing::info!(total, concurrency, folder = %folder, "starting upscale run");

        let files: Vec<Arc<SourceFile>> = files.into_iter().map(Arc::new).collect();
        let uploader = Arc::new(UploadClient::new(self.client.clone(), &self.config));
        let archive = Arc::new(Mutex::new(ArchiveBuilder::new(
            self.config.archive.compression_level,
        )));

        let mut start = 0usize;
        while start < total {
            let end = (start + concurrency).min(total);

            // Administrative pre-mark: the whole window reads as uploading
            // before any request is actually in flight.
            {
                let mut session = self.session.lock().await;
                for index in start..end {
                    session.mark_uploading(index);
                }
            }
            for index in start..end {
                let _ = self.event_tx.send(Event::StateChanged {
                    index,
                    state: ItemState::Uploading,
                    progress_hint: 10,
                });
            }

            let tasks = (start..end).map(|index| {
                run_item_task(ItemTaskContext {
                    index,
                    file: Arc::clone(&files[index]),
                    uploader: Arc::clone(&uploader),
                    retry: self.config.retry.clone(),
                    archive: Arc::clone(&archive),
                    session: Arc::clone(&self.session),
                    event_tx: self.event_tx.clone(),
                })
            });
            // Window barrier: nothing from the next window starts until
            // every item here has settled.
            let results = join_all(tasks).await;

            {
                let mut session = self.session.lock().await;
                for (offset, result) in results.into_iter().enumerate() {
                    let index = start + offset;
                    match result {
                        Ok(()) => session.settle_success(index),
                        Err(e) => {
                            session.settle_failure(index);
                            let name = files[index].name().to_string();
                            tracing::warn!(index, file = %name, error = %e, "item failed");
                            let _ = self.event_tx.send(Event::ItemFailed {
                                index,
                                name,
                                error: e.to_string(),
                            });
                        }
                    }
                }
            }

            start = end;
            if start < total {
                tokio::time::sleep(self.config.pacing.cooldown).await;
            }
        }

        let stats = self.stats().await;
        let finished_at = chrono::Utc::now();

        if stats.completed > 0 {
            let builder = Arc::try_unwrap(archive)
                .map_err(|_| {
                    Error::Archive(ArchiveError::Finalize {
                        reason: "archive still shared after all windows settled".to_string(),
                    })
                })?
                .into_inner();
            let output = builder.finalize(archive_name(&folder))?;
            let _ = self.event_tx.send(Event::ArchiveReady {
                name: output.name.clone(),
                entries: output.entries,
            });
            let _ = self.event_tx.send(Event::RunComplete {
                completed: stats.completed,
                errors: stats.errors,
            });
            tracing::info!(
                completed = stats.completed,
                errors = stats.errors,
                archive = %output.name,
                "run complete"
            );
            Ok(RunReport {
                completed: stats.completed,
                errors: stats.errors,
                archive: Some(output),
                finished_at,
            })
        } else {
            let message = "all items failed; check the account credentials".to_string();
            tracing::error!(errors = stats.errors, "run produced no successes");
            let _ = self.event_tx.send(Event::RunFailed {
                error: message,
            });
            Ok(RunReport {
                completed: 0,
                errors: stats.errors,
                archive: None,
                finished_at,
            })
        }
    }
}
