use std::{
    sync::{atomic::Ordering, Arc},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use log::{debug, info, warn};

use super::{ingress::DispatchShared, inbound::InboundMessage, DispatchError};
use crate::isolation::run_isolated;

/// Pops and executes up to `batch_size` background messages
pub(crate) fn process_background_batch(shared: &DispatchShared, batch_size: usize) -> usize {
    let mut processed = 0;
    while processed < batch_size {
        let Some(message) = shared.background_queue.pop() else {
            break;
        };
        processed += 1;
        execute_background(shared, message);
    }
    processed
}

fn execute_background(shared: &DispatchShared, message: InboundMessage) {
    let opcode = message.opcode();
    let handler = shared
        .background_handlers
        .read()
        .ok()
        .and_then(|table| table.get(opcode).cloned());

    let Some(handler) = handler else {
        // unregistered after ingest, fall back to engine-thread default handling
        debug!("No background handler for {:?} anymore, deferring to engine thread", opcode);
        shared.engine_queue.push(message);
        return;
    };

    shared.counters.record_background_processed();
    if let Err(error) = run_isolated(|| handler(&message)) {
        shared.counters.record_handler_failure();
        warn!(
            "Background handler for {:?} from {} failed: {}",
            opcode,
            message.peer(),
            error
        );
    }
}

/// Dedicated thread draining the background queue
pub(crate) struct BackgroundWorker {
    handle: Option<JoinHandle<()>>,
    exited: Receiver<()>,
}

impl BackgroundWorker {
    pub fn spawn(
        shared: Arc<DispatchShared>,
        batch_size: usize,
        idle_sleep: Duration,
    ) -> Result<Self, DispatchError> {
        let (exit_sender, exited) = channel::bounded(1);
        shared.worker_running.store(true, Ordering::Release);

        let handle = thread::Builder::new()
            .name("netsync-background".to_string())
            .spawn(move || {
                info!("Background dispatcher started");
                while shared.worker_running.load(Ordering::Acquire) {
                    if process_background_batch(&shared, batch_size.max(1)) == 0 {
                        thread::sleep(idle_sleep);
                    }
                }
                info!("Background dispatcher stopped");
                let _ = exit_sender.send(());
            })
            .map_err(|error| DispatchError::WorkerSpawn {
                reason: error.to_string(),
            })?;

        Ok(Self {
            handle: Some(handle),
            exited,
        })
    }

    /// Signals the worker and waits up to `timeout` for it. Returns false if
    /// the worker had to be left running.
    pub fn stop(mut self, shared: &DispatchShared, timeout: Duration) -> bool {
        shared.worker_running.store(false, Ordering::Release);

        match self.exited.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = self.handle.take() {
                    if handle.join().is_err() {
                        warn!("Background dispatcher thread terminated abnormally");
                    }
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Background dispatcher did not exit within {:?}, detaching it",
                    timeout
                );
                false
            }
        }
    }
}
