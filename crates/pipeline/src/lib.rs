//! Classification, content hashing and ordered emission of watch events.
//!
//! A single consumer task drains the watcher's channel, classifies each raw
//! event (hashing file content where the operation warrants it) and hands
//! the resulting record to a sink. Processing is strictly sequential: no two
//! checksum computations run concurrently, and the sink observes records in
//! exactly the order the watcher produced them.

mod checksum;
mod classify;
mod sink;

pub use checksum::file_md5;
pub use classify::{EventRecord, classify};
pub use sink::{RecordSink, TracingSink};

use fsaudit_watcher::RawEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;

/// Drive the classify-and-emit loop until shutdown is signalled or the
/// event stream ends.
///
/// The shutdown signal is checked before each blocking receive; on
/// cancellation an in-flight event either completes classification or is
/// dropped untouched, so no partial record ever reaches the sink. The file
/// read for a checksum happens inline: a large file delays subsequent
/// events rather than reordering them.
pub async fn run_pipeline(
    mut events: UnboundedReceiver<RawEvent>,
    mut sink: impl RecordSink,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            maybe = events.recv() => match maybe {
                Some(raw) => sink.emit(classify(raw)),
                None => break,
            },
        }
    }
}
