//! The single-dispatcher runtime.
//!
//! One dispatcher thread owns the [`AppState`] and applies actions to it in
//! arrival order, so reducers never need locks. Every queued action rides in
//! an [`ActionEnvelope`]; a trigger's follow-up actions inherit its request
//! id, and the dispatcher and workers log under that id. Trigger actions
//! go through the orchestrator's build stage on the dispatcher, then their
//! prepared requests are handed to a small bounded pool of request workers.
//! Workers execute and translate, feed the follow-up actions back into the
//! same queue, and only then mark the request as no longer in flight.
//!
//! Overlapping requests are allowed; completions apply in completion order
//! and the last applied wins. There is no cancellation and no coalescing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use uuid::Uuid;

use crate::action::{Action, ActionEnvelope};
use crate::error::DispatchError;
use crate::orchestrator::{HandlerKind, Orchestrator, PreparedRequest};
use crate::query::QueryClient;
use crate::schema::Schema;
use crate::state::AppState;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum queued actions before `dispatch` reports backpressure.
    pub queue_capacity: usize,
    /// Number of request worker threads.
    pub request_workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            request_workers: 2,
        }
    }
}

enum QueueMsg {
    Action(ActionEnvelope),
    Snapshot { reply: Sender<AppState> },
    Shutdown,
}

struct RequestJob {
    prepared: PreparedRequest,
    /// Correlation id of the trigger envelope; follow-ups inherit it.
    request_id: Uuid,
}

/// Handle to a running sync runtime.
///
/// Dropping the handle shuts the runtime down and joins its threads.
pub struct SyncRuntime {
    action_tx: Sender<QueueMsg>,
    pending: Arc<AtomicUsize>,
    queue_capacity: usize,
    dispatcher: Option<JoinHandle<AppState>>,
    workers: Vec<JoinHandle<()>>,
}

impl SyncRuntime {
    /// Starts the dispatcher and request workers over the injected
    /// capabilities.
    #[must_use]
    pub fn start(
        schema: Arc<dyn Schema>,
        query: Arc<dyn QueryClient>,
        config: RuntimeConfig,
    ) -> Self {
        let queue_capacity = config.queue_capacity.max(1);
        let worker_count = config.request_workers.max(1);

        let (action_tx, action_rx) = bounded::<QueueMsg>(queue_capacity);
        let (job_tx, job_rx) = bounded::<RequestJob>(queue_capacity);
        let pending = Arc::new(AtomicUsize::new(0));
        let orchestrator = Orchestrator::new(schema, query);

        let mut workers = Vec::with_capacity(worker_count);
        for idx in 0..worker_count {
            let job_rx: Receiver<RequestJob> = job_rx.clone();
            let action_tx = action_tx.clone();
            let pending = Arc::clone(&pending);
            let orchestrator = orchestrator.clone();
            let handle = thread::Builder::new()
                .name(format!("syncstore-request-{idx}"))
                .spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        let span =
                            tracing::error_span!("request", request_id = %job.request_id);
                        let _entered = span.enter();
                        let result = orchestrator.execute(&job.prepared);
                        let actions = orchestrator.translate(&job.prepared.context, result);
                        for action in actions {
                            // Dropped if the dispatcher already went away.
                            let _ = action_tx.send(QueueMsg::Action(
                                ActionEnvelope::correlated(job.request_id, action),
                            ));
                        }
                        // Decrement only after follow-ups are queued, so a
                        // zero pending count means the queue holds everything.
                        pending.fetch_sub(1, Ordering::AcqRel);
                    }
                })
                .expect("failed to spawn syncstore request worker");
            workers.push(handle);
        }

        let dispatcher = {
            let pending = Arc::clone(&pending);
            thread::Builder::new()
                .name("syncstore-dispatcher".to_string())
                .spawn(move || dispatcher_loop(&action_rx, &job_tx, &orchestrator, &pending))
                .expect("failed to spawn syncstore dispatcher")
        };

        Self {
            action_tx,
            pending,
            queue_capacity,
            dispatcher: Some(dispatcher),
            workers,
        }
    }

    /// Enqueues an action under a fresh correlation id and returns that id.
    /// Never blocks; reports backpressure instead.
    pub fn dispatch(&self, action: Action) -> Result<Uuid, DispatchError> {
        let envelope = ActionEnvelope::new(action);
        let request_id = envelope.request_id;
        match self.action_tx.try_send(QueueMsg::Action(envelope)) {
            Ok(()) => Ok(request_id),
            Err(TrySendError::Full(_)) => Err(DispatchError::QueueFull {
                capacity: self.queue_capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(DispatchError::Disconnected),
        }
    }

    /// Returns a copy of the state after every action queued so far has been
    /// applied.
    pub fn snapshot(&self) -> Result<AppState, DispatchError> {
        let (tx, rx) = bounded::<AppState>(1);
        self.action_tx
            .send(QueueMsg::Snapshot { reply: tx })
            .map_err(|_| DispatchError::Disconnected)?;
        rx.recv().map_err(|_| DispatchError::Disconnected)
    }

    /// Waits until no requests are in flight and the queue has drained, then
    /// returns the settled state.
    pub fn settle(&self, timeout: Duration) -> Result<AppState, DispatchError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.pending.load(Ordering::Acquire) == 0 {
                // Drain the queue, then confirm nothing new went in flight.
                let snapshot = self.snapshot()?;
                if self.pending.load(Ordering::Acquire) == 0 {
                    return Ok(snapshot);
                }
            }
            if Instant::now() >= deadline {
                return Err(DispatchError::Timeout {
                    duration_ms: timeout.as_millis().min(u128::from(u64::MAX)) as u64,
                });
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Stops the runtime and returns the final state.
    ///
    /// In-flight request completions that have not reached the queue yet are
    /// discarded; call [`settle`](Self::settle) first for a drained result.
    pub fn shutdown(mut self) -> Result<AppState, DispatchError> {
        self.action_tx
            .send(QueueMsg::Shutdown)
            .map_err(|_| DispatchError::Disconnected)?;
        let dispatcher = self
            .dispatcher
            .take()
            .ok_or(DispatchError::Disconnected)?;
        let state = dispatcher.join().map_err(|_| DispatchError::Disconnected)?;
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        Ok(state)
    }
}

impl Drop for SyncRuntime {
    fn drop(&mut self) {
        // Deterministic shutdown: stop the dispatcher, then join everything.
        if let Some(dispatcher) = self.dispatcher.take() {
            let _ = self.action_tx.send(QueueMsg::Shutdown);
            let _ = dispatcher.join();
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn dispatcher_loop(
    action_rx: &Receiver<QueueMsg>,
    job_tx: &Sender<RequestJob>,
    orchestrator: &Orchestrator,
    pending: &Arc<AtomicUsize>,
) -> AppState {
    let mut state = AppState::default();
    while let Ok(msg) = action_rx.recv() {
        match msg {
            QueueMsg::Action(envelope) => {
                apply_action(&mut state, &envelope, job_tx, orchestrator, pending);
            }
            QueueMsg::Snapshot { reply } => {
                let _ = reply.send(state.clone());
            }
            QueueMsg::Shutdown => break,
        }
    }
    // Dropping `job_tx` here closes the job channel; workers drain and exit.
    state
}

fn apply_action(
    state: &mut AppState,
    envelope: &ActionEnvelope,
    job_tx: &Sender<RequestJob>,
    orchestrator: &Orchestrator,
    pending: &Arc<AtomicUsize>,
) {
    let span = tracing::error_span!("action", request_id = %envelope.request_id);
    let _entered = span.enter();
    let action = &envelope.action;
    state.apply(orchestrator.schema(), action);

    let Some(kind) = HandlerKind::for_action(action) else {
        return;
    };

    pending.fetch_add(1, Ordering::AcqRel);
    match orchestrator.build(kind, action, state) {
        Ok(prepared) => {
            let job = RequestJob {
                prepared,
                request_id: envelope.request_id,
            };
            if let Err(err) = job_tx.try_send(job) {
                pending.fetch_sub(1, Ordering::AcqRel);
                tracing::error!(handler = ?kind, "request worker queue rejected job: {err}");
                let error = crate::error::SyncError::Dispatch(match err {
                    TrySendError::Full(_) => DispatchError::QueueFull {
                        capacity: job_tx.capacity().unwrap_or(0),
                    },
                    TrySendError::Disconnected(_) => DispatchError::Disconnected,
                });
                for follow_up in orchestrator.build_failure_actions(kind, &error) {
                    state.apply(orchestrator.schema(), &follow_up);
                }
            }
        }
        Err(error) => {
            pending.fetch_sub(1, Ordering::AcqRel);
            // Build failures never leave the dispatcher; their follow-ups
            // apply immediately.
            for follow_up in orchestrator.build_failure_actions(kind, &error) {
                state.apply(orchestrator.schema(), &follow_up);
            }
        }
    }
}
