use crate::library::{self, DirectorySource, ScanError, ScanLevel};
use crate::model::Entry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTicket {
    pub level: ScanLevel,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub ticket: ScanTicket,
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub ticket: ScanTicket,
    pub result: Result<Vec<Entry>, ScanError>,
}

impl ScanRequest {
    pub fn run(&self, source: &dyn DirectorySource) -> ScanOutcome {
        let result = library::scan(source, &self.dir, self.ticket.level);
        if let Err(err) = &result {
            warn!(level = self.ticket.level.label(), "scan failed: {err}");
        }
        ScanOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Spawns the scan thread. It exits when either channel is closed.
pub fn spawn_scan_worker(
    source: Arc<dyn DirectorySource>,
    request_rx: Receiver<ScanRequest>,
    outcome_tx: Sender<ScanOutcome>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(request) = request_rx.recv() {
            debug!(
                dir = %request.dir.display(),
                generation = request.ticket.generation,
                "scan requested"
            );
            if outcome_tx.send(request.run(source.as_ref())).is_err() {
                break;
            }
        }
        debug!("scan worker stopped");
    })
}
