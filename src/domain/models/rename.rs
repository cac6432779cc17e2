use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::{EngineError, ErrorKind, ValidationError};
use crate::domain::value_objects::{Extension, ObjectKey, Prefix};

/// Validated caller input for a rename preview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenameRequest {
    pub prefix: Prefix,
    pub old_extension: Extension,
    pub new_extension: Extension,
    pub recursive: bool,
}

impl RenameRequest {
    pub fn new(
        prefix: impl AsRef<str>,
        old_extension: impl AsRef<str>,
        new_extension: impl AsRef<str>,
        recursive: bool,
    ) -> Result<Self, ValidationError> {
        let prefix = Prefix::new(prefix)?;
        let (old_extension, new_extension) = Extension::rename_pair(old_extension, new_extension)?;
        Ok(Self {
            prefix,
            old_extension,
            new_extension,
            recursive,
        })
    }
}

/// Lifecycle of a single plan entry.
///
/// `Pending` is only valid before execution and `Skipped` only for entries
/// the caller did not select. A selected entry leaves an execution pass as
/// `Applied` or `Failed`; `Applied` carries the kind of a failed delete when
/// the copy landed but the original could not be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Applied { delete_warning: Option<ErrorKind> },
    Failed { error: ErrorKind },
    Skipped,
}

impl EntryStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

/// One proposed rename: copy `source_key` to `destination_key`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenamePlanEntry {
    source_key: ObjectKey,
    destination_key: ObjectKey,
    selected: bool,
    status: EntryStatus,
}

impl RenamePlanEntry {
    pub(crate) fn new(source_key: ObjectKey, destination_key: ObjectKey) -> Self {
        Self {
            source_key,
            destination_key,
            selected: false,
            status: EntryStatus::Pending,
        }
    }

    pub fn source_key(&self) -> &ObjectKey {
        &self.source_key
    }

    pub fn destination_key(&self) -> &ObjectKey {
        &self.destination_key
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: EntryStatus) {
        self.status = status;
    }
}

/// Why a listed key did not become a plan entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ExclusionReason {
    ExtensionMismatch,
    DestinationUnchanged,
    InvalidDestination(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedKey {
    pub key: ObjectKey,
    pub reason: ExclusionReason,
}

/// Ordered set of proposed renames for one extension change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenamePlan {
    pub old_extension: Extension,
    pub new_extension: Extension,
    pub(crate) entries: Vec<RenamePlanEntry>,
    pub excluded: Vec<ExcludedKey>,
}

impl RenamePlan {
    pub fn entries(&self) -> &[RenamePlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn select_all(&mut self) {
        self.entries.iter_mut().for_each(|e| e.selected = true);
    }

    pub fn clear_selection(&mut self) {
        self.entries.iter_mut().for_each(|e| e.selected = false);
    }

    /// Select the entries whose source key is in `keys`; returns how many matched
    pub fn select_sources<I, S>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: std::collections::HashSet<String> =
            keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let mut matched = 0;
        for entry in &mut self.entries {
            if wanted.contains(entry.source_key.as_str()) {
                entry.selected = true;
                matched += 1;
            }
        }
        matched
    }

    pub fn select_where(&mut self, mut predicate: impl FnMut(&RenamePlanEntry) -> bool) {
        for entry in &mut self.entries {
            entry.selected = predicate(entry);
        }
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }

    /// Put every entry back to `Pending` so the plan can be executed again
    pub fn reset_statuses(&mut self) {
        self.entries
            .iter_mut()
            .for_each(|e| e.status = EntryStatus::Pending);
    }
}

/// Plan plus the listing statistics it was built from
#[derive(Debug, Clone, Serialize)]
pub struct RenamePreview {
    pub plan: RenamePlan,
    pub listed: usize,
    pub matched: usize,
    pub listing_cancelled: bool,
}

/// What happened to one selected entry during execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenameOutcome {
    pub source_key: ObjectKey,
    pub destination_key: ObjectKey,
    pub status: EntryStatus,
    pub copied: bool,
    pub original_deleted: bool,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
}

impl RenameOutcome {
    pub(crate) fn applied(entry: &RenamePlanEntry, original_deleted: bool) -> Self {
        Self {
            source_key: entry.source_key.clone(),
            destination_key: entry.destination_key.clone(),
            status: EntryStatus::Applied {
                delete_warning: None,
            },
            copied: true,
            original_deleted,
            error_kind: None,
            message: None,
        }
    }

    /// Copy landed but the original could not be removed
    pub(crate) fn applied_with_delete_warning(entry: &RenamePlanEntry, err: &EngineError) -> Self {
        Self {
            source_key: entry.source_key.clone(),
            destination_key: entry.destination_key.clone(),
            status: EntryStatus::Applied {
                delete_warning: Some(err.kind()),
            },
            copied: true,
            original_deleted: false,
            error_kind: Some(err.kind()),
            message: Some(err.to_string()),
        }
    }

    pub(crate) fn copy_failed(entry: &RenamePlanEntry, err: &EngineError) -> Self {
        Self {
            source_key: entry.source_key.clone(),
            destination_key: entry.destination_key.clone(),
            status: EntryStatus::Failed { error: err.kind() },
            copied: false,
            original_deleted: false,
            error_kind: Some(err.kind()),
            message: Some(err.to_string()),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.status, EntryStatus::Applied { .. })
    }

    pub fn has_delete_warning(&self) -> bool {
        matches!(
            self.status,
            EntryStatus::Applied {
                delete_warning: Some(_)
            }
        )
    }
}

/// Aggregate report of one execution pass, outcomes in plan order
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub batch_id: Uuid,
    pub keep_original: bool,
    pub applied: usize,
    pub failed: usize,
    pub skipped: usize,
    pub delete_warnings: usize,
    /// Selected entries never started because the batch was cancelled
    pub not_started: usize,
    pub cancelled: bool,
    pub outcomes: Vec<RenameOutcome>,
}

impl BatchResult {
    pub(crate) fn new(
        batch_id: Uuid,
        keep_original: bool,
        skipped: usize,
        not_started: usize,
        cancelled: bool,
        outcomes: Vec<RenameOutcome>,
    ) -> Self {
        let applied = outcomes.iter().filter(|o| o.is_applied()).count();
        let delete_warnings = outcomes.iter().filter(|o| o.has_delete_warning()).count();
        Self {
            batch_id,
            keep_original,
            applied,
            failed: outcomes.len() - applied,
            skipped,
            delete_warnings,
            not_started,
            cancelled,
            outcomes,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.delete_warnings == 0 && !self.cancelled
    }

    /// Failed copies grouped by error kind
    pub fn failures_by_kind(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for outcome in &self.outcomes {
            if let EntryStatus::Failed { error } = outcome.status {
                *counts.entry(error).or_insert(0) += 1;
            }
        }
        counts
    }

    /// One-line report, e.g. "Processed 37 files. 3 files had errors (permission denied on 3 of 40 files)."
    pub fn summary(&self) -> String {
        let attempted = self.outcomes.len();
        let mut message = format!("Processed {} files.", self.applied);

        if self.failed > 0 {
            let detail: Vec<String> = self
                .failures_by_kind()
                .iter()
                .map(|(kind, count)| format!("{} on {} of {} files", kind, count, attempted))
                .collect();
            message.push_str(&format!(
                " {} files had errors ({}).",
                self.failed,
                detail.join(", ")
            ));
        }

        if self.delete_warnings > 0 {
            message.push_str(&format!(
                " {} originals could not be deleted and are still present.",
                self.delete_warnings
            ));
        }

        if self.cancelled {
            message.push_str(&format!(
                " Cancelled with {} selected files not started.",
                self.not_started
            ));
        }

        message
    }
}
