//! End-to-end: watcher events flow through classification into a sink.

use std::fs;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::sync::watch;

use fsaudit_pipeline::{EventRecord, RecordSink, run_pipeline};
use fsaudit_watcher::{FsOp, RecursiveWatcher};

const MD5_HELLO: &str = "5d41402abc4b2a76b9719d911017c592";

#[derive(Clone, Default)]
struct CollectingSink {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl RecordSink for CollectingSink {
    fn emit(&mut self, record: EventRecord) {
        self.records.lock().unwrap().push(record);
    }
}

async fn wait_until(sink: &CollectingSink, pred: impl Fn(&[EventRecord]) -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(5) {
        if pred(&sink.records.lock().unwrap()) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

#[tokio::test]
async fn file_in_fresh_subdirectory_gets_hashed() {
    let dir = TempDir::new().unwrap();
    let (watcher, events) = RecursiveWatcher::spawn(dir.path()).unwrap();

    let sink = CollectingSink::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = tokio::spawn(run_pipeline(events, sink.clone(), shutdown_rx));

    // Subdirectory plus an immediate write inside it: the record must carry
    // the content digest even though the watch is installed concurrently.
    let sub = dir.path().join("d");
    fs::create_dir(&sub).unwrap();
    let file = sub.join("f");
    fs::write(&file, b"hello").unwrap();

    let found = wait_until(&sink, |records| {
        records
            .iter()
            .any(|r| r.path == file && r.md5sum.as_deref() == Some(MD5_HELLO))
    })
    .await;
    assert!(found, "no record with the expected digest for {file:?}");

    let records = sink.records.lock().unwrap().clone();
    assert!(
        records.iter().any(|r| r.path == file && r.op == FsOp::Create),
        "missing Create record for {file:?}: {records:?}"
    );

    let _ = shutdown_tx.send(true);
    watcher.stop();
    consumer.await.unwrap();
}
