//! Turns listed objects into a rename plan without touching storage.

use tracing::debug;

use crate::domain::{
    models::{ExcludedKey, ExclusionReason, ObjectDescriptor, RenamePlan, RenamePlanEntry},
    value_objects::Extension,
};

/// Build a plan replacing the trailing `old` extension with `new`.
///
/// Entries keep input order and start unselected and `Pending`. Keys that
/// do not end in `old`, or whose destination would equal the source, are
/// moved to `excluded` instead of becoming self-copies. The output is a pure
/// function of the input.
pub fn plan<I>(descriptors: I, old: &Extension, new: &Extension) -> RenamePlan
where
    I: IntoIterator<Item = ObjectDescriptor>,
{
    let mut entries = Vec::new();
    let mut excluded = Vec::new();

    for descriptor in descriptors {
        let key = descriptor.key;
        match key.with_extension_replaced(old, new) {
            None => excluded.push(ExcludedKey {
                key,
                reason: ExclusionReason::ExtensionMismatch,
            }),
            Some(Err(err)) => excluded.push(ExcludedKey {
                key,
                reason: ExclusionReason::InvalidDestination(err.to_string()),
            }),
            Some(Ok(destination)) if destination == key => excluded.push(ExcludedKey {
                key,
                reason: ExclusionReason::DestinationUnchanged,
            }),
            Some(Ok(destination)) => entries.push(RenamePlanEntry::new(key, destination)),
        }
    }

    debug!(
        old = %old,
        new = %new,
        entries = entries.len(),
        excluded = excluded.len(),
        "built rename plan"
    );

    RenamePlan {
        old_extension: old.clone(),
        new_extension: new.clone(),
        entries,
        excluded,
    }
}
