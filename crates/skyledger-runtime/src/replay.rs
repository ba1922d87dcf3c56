//! Replay assembly.

use skyledger_core::{CanonicalRecord, Cursor, QueryDescriptor, Replay};

/// Package one page of records for the orchestrator.
pub fn assemble(
    resource: &str,
    next: Cursor,
    query: QueryDescriptor,
    result: Vec<CanonicalRecord>,
) -> Replay {
    tracing::info!(
        resource,
        records = result.len(),
        next = %next,
        "replay assembled"
    );
    Replay {
        next,
        query,
        result,
    }
}

/// Replay for a chain that is already exhausted.
pub fn exhausted(resource: &str, query: QueryDescriptor) -> Replay {
    assemble(resource, Cursor::new(), query, Vec::new())
}
