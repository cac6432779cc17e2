use std::{sync::Arc, time::Duration};

use futures::{future, stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    domain::models::{BatchResult, EntryStatus, RenameOutcome, RenamePlan, RenamePlanEntry},
    ports::storage::ObjectStore,
    services::{settings::EngineSettings, timeout::bounded, StorageSession},
};

/// Applies the selected entries of a rename plan.
///
/// Each entry is an independent copy followed, unless originals are kept,
/// by a delete of the source. Entries run concurrently up to the configured
/// limit and never affect each other: a failure is recorded on that entry
/// only. Nothing is rolled back.
#[derive(Debug, Clone, Default)]
pub struct RenameExecutor {
    settings: EngineSettings,
}

impl RenameExecutor {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Execute `plan` and report one outcome per started entry, in plan order.
    ///
    /// Unselected entries become `Skipped`. Once `cancel` fires no further
    /// entries are started; those already in flight complete and the ones
    /// never started stay `Pending`.
    pub async fn execute(
        &self,
        session: &StorageSession,
        plan: &mut RenamePlan,
        keep_original: bool,
        cancel: &CancellationToken,
    ) -> BatchResult {
        let batch_id = Uuid::new_v4();
        let mut skipped = 0;
        let mut work = Vec::new();

        for (index, entry) in plan.entries.iter_mut().enumerate() {
            if entry.is_selected() {
                entry.set_status(EntryStatus::Pending);
                work.push((index, entry.clone()));
            } else {
                entry.set_status(EntryStatus::Skipped);
                skipped += 1;
            }
        }

        let selected = work.len();
        info!(
            %batch_id,
            bucket = %session.bucket(),
            selected,
            skipped,
            keep_original,
            concurrency = self.settings.concurrency(),
            "starting rename batch"
        );

        let store = session.store();
        let limit = self.settings.request_timeout();
        let gate = cancel.clone();

        let mut finished: Vec<(usize, RenameOutcome)> = stream::iter(work)
            .take_while(move |_| future::ready(!gate.is_cancelled()))
            .map(|(index, entry)| async move {
                let outcome = rename_one(store, &entry, keep_original, limit).await;
                (index, outcome)
            })
            .buffer_unordered(self.settings.concurrency())
            .collect()
            .await;

        finished.sort_by_key(|(index, _)| *index);
        for (index, outcome) in &finished {
            plan.entries[*index].set_status(outcome.status);
        }

        let outcomes: Vec<RenameOutcome> = finished.into_iter().map(|(_, o)| o).collect();
        let not_started = selected - outcomes.len();
        let result = BatchResult::new(
            batch_id,
            keep_original,
            skipped,
            not_started,
            not_started > 0,
            outcomes,
        );

        info!(
            %batch_id,
            applied = result.applied,
            failed = result.failed,
            skipped = result.skipped,
            delete_warnings = result.delete_warnings,
            not_started = result.not_started,
            "rename batch finished"
        );
        result
    }
}

/// Copy, then delete the original unless it is kept
async fn rename_one(
    store: &Arc<dyn ObjectStore>,
    entry: &RenamePlanEntry,
    keep_original: bool,
    limit: Duration,
) -> RenameOutcome {
    let source = entry.source_key();
    let destination = entry.destination_key();

    if let Err(err) = bounded("copy", limit, store.copy_object(source, destination)).await {
        warn!(
            source = %source,
            destination = %destination,
            kind = %err.kind(),
            error = %err,
            "copy failed"
        );
        return RenameOutcome::copy_failed(entry, &err);
    }

    if keep_original {
        debug!(source = %source, destination = %destination, "copied, original kept");
        return RenameOutcome::applied(entry, false);
    }

    match bounded("delete", limit, store.delete_object(source)).await {
        Ok(()) => {
            debug!(source = %source, destination = %destination, "renamed");
            RenameOutcome::applied(entry, true)
        }
        Err(err) => {
            warn!(
                source = %source,
                destination = %destination,
                kind = %err.kind(),
                error = %err,
                "copied but original could not be deleted"
            );
            RenameOutcome::applied_with_delete_warning(entry, &err)
        }
    }
}
