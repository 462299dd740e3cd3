use std::collections::HashSet;

use crate::types::GenerationRecord;

/// History exports overlap when the user re-exports a session; the provider
/// record id is stable across exports, so first occurrence wins.
pub fn dedup(records: Vec<GenerationRecord>) -> Vec<GenerationRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}
