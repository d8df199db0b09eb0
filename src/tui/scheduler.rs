//! Runs store operations off the controller thread.
//!
//! Each scheduled [`Operation`] runs on its own short-lived worker and sends
//! exactly one [`Completion`] back into the event queue, in completion order.
//! A panic inside the store becomes a failed result.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::model::{Draft, Record, RecordId};
use crate::store::{RecordStore, StoreError};

use super::event::AppEvent;

/// Identifies the form commit that issued an operation, so its result can
/// find the session that is waiting for it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

impl Ticket {
    /// The ticket after this one
    pub fn next(self) -> Ticket {
        Ticket(self.0.wrapping_add(1))
    }
}

/// A store call requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    /// Log a completed activity
    Insert { draft: Draft, ticket: Ticket },
    /// Open an activity that is still running
    Start { draft: Draft, ticket: Ticket },
    Update {
        id: RecordId,
        draft: Draft,
        ticket: Ticket,
    },
    /// End a running activity now
    Finish { id: RecordId },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Insert { .. } => "insert",
            Operation::Start { .. } => "start",
            Operation::Update { .. } => "update",
            Operation::Finish { .. } => "finish",
        }
    }

    /// What the completion of this operation must carry, kept so a result
    /// can be produced even after the operation itself was moved away
    pub fn receipt(&self) -> Receipt {
        match self {
            Operation::Fetch => Receipt::Fetch,
            Operation::Insert { ticket, .. } | Operation::Start { ticket, .. } => {
                Receipt::Insert(*ticket)
            }
            Operation::Update { id, ticket, .. } => Receipt::Update(*id, *ticket),
            Operation::Finish { id } => Receipt::Finish(*id),
        }
    }
}

/// The context of an operation's completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    Fetch,
    Insert(Ticket),
    Update(RecordId, Ticket),
    Finish(RecordId),
}

impl Receipt {
    /// A failed completion of the matching kind
    pub fn fail(self, error: StoreError) -> Completion {
        match self {
            Receipt::Fetch => Completion::Fetched(Err(error)),
            Receipt::Insert(ticket) => Completion::Inserted {
                ticket,
                result: Err(error),
            },
            Receipt::Update(id, ticket) => Completion::Updated {
                id,
                ticket,
                result: Err(error),
            },
            Receipt::Finish(id) => Completion::Finished {
                id,
                result: Err(error),
            },
        }
    }
}

/// The one terminal result of an operation. Insert and Start both complete
/// as `Inserted`.
#[derive(Debug)]
pub enum Completion {
    Fetched(Result<Vec<Record>, StoreError>),
    Inserted {
        ticket: Ticket,
        result: Result<Record, StoreError>,
    },
    Updated {
        id: RecordId,
        ticket: Ticket,
        result: Result<Record, StoreError>,
    },
    Finished {
        id: RecordId,
        result: Result<Record, StoreError>,
    },
}

impl Completion {
    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Completion::Fetched(r) => r.as_ref().err(),
            Completion::Inserted { result, .. }
            | Completion::Updated { result, .. }
            | Completion::Finished { result, .. } => result.as_ref().err(),
        }
    }
}

/// Run one operation against the store, synchronously
pub fn execute(store: &dyn RecordStore, op: Operation) -> Completion {
    match op {
        Operation::Fetch => Completion::Fetched(guarded(|| store.list())),
        Operation::Insert { draft, ticket } => Completion::Inserted {
            ticket,
            result: guarded(|| store.insert(&draft)),
        },
        Operation::Start { draft, ticket } => Completion::Inserted {
            ticket,
            result: guarded(|| store.start(&draft)),
        },
        Operation::Update { id, draft, ticket } => Completion::Updated {
            id,
            ticket,
            result: guarded(|| store.update(id, &draft)),
        },
        Operation::Finish { id } => Completion::Finished {
            id,
            result: guarded(|| store.finish(id)),
        },
    }
}

fn guarded<T>(call: impl FnOnce() -> Result<T, StoreError>) -> Result<T, StoreError> {
    panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|payload| Err(StoreError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fire-and-forget executor delivering completions into the event queue
pub struct Scheduler {
    store: Arc<dyn RecordStore>,
    tx: Sender<AppEvent>,
}

impl Scheduler {
    pub fn new(store: Arc<dyn RecordStore>, tx: Sender<AppEvent>) -> Self {
        Scheduler { store, tx }
    }

    pub fn schedule(&self, op: Operation) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let name = op.name();
        let receipt = op.receipt();
        tracing::debug!(op = name, "scheduling store operation");

        let spawned = thread::Builder::new()
            .name(format!("store-{name}"))
            .spawn(move || {
                let completion = execute(store.as_ref(), op);
                if let Some(e) = completion.error() {
                    tracing::warn!(op = name, error = %e, "store operation failed");
                }
                // The receiver only goes away at shutdown
                let _ = tx.send(AppEvent::Completed(completion));
            });

        if let Err(e) = spawned {
            tracing::error!(op = name, error = %e, "could not start store worker");
            let failure = StoreError::Unavailable(format!("could not start worker: {e}"));
            let _ = self.tx.send(AppEvent::Completed(receipt.fail(failure)));
        }
    }
}
