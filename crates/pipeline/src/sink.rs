use tracing::{error, info};

use crate::classify::EventRecord;

/// Consumer of classified records, invoked strictly in arrival order.
pub trait RecordSink {
    fn emit(&mut self, record: EventRecord);
}

/// Emits one structured log entry per record through `tracing`.
///
/// An absent checksum is rendered as an explicit empty value, never omitted,
/// so downstream consumers can tell "not computed" from "computed but empty
/// file". A failed read is surfaced as its own error entry first; the record
/// entry follows regardless.
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&mut self, record: EventRecord) {
        if let Some(reason) = &record.read_error {
            error!(
                event = %record.op,
                file = %record.path.display(),
                error = %reason,
                "Failed to read file"
            );
        }
        info!(
            event = %record.op,
            file = %record.path.display(),
            md5sum = record.md5sum.as_deref().unwrap_or(""),
            "Detected"
        );
    }
}
