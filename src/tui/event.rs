use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use super::scheduler::Completion;

/// Everything the controller reacts to, in arrival order
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),
    Completed(Completion),
    /// The terminal can no longer be read; no further input will arrive
    InputFailed(io::Error),
}

/// The single ordered stream of input events and operation results
pub struct EventQueue {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        EventQueue::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        EventQueue { tx, rx }
    }

    /// A handle producers use to push events
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }

    /// Block until the next event. None only if every sender is gone,
    /// which cannot happen while the queue itself holds one.
    pub fn next(&self) -> Option<AppEvent> {
        self.rx.recv().ok()
    }

    /// Wait up to `timeout` for the next event
    pub fn next_timeout(&self, timeout: Duration) -> Option<AppEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Thread forwarding terminal events into the queue
pub struct InputReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputReader {
    pub fn spawn(tx: Sender<AppEvent>) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("input-reader".into())
            .spawn(move || read_input(&tx, &flag, poll_terminal))?;
        Ok(InputReader {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the reader to stop and wait for it (at most one poll interval)
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Wait up to `timeout` for a terminal event
fn poll_terminal(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Forward events from `source` until stopped. A source error is forwarded
/// as [`AppEvent::InputFailed`] and ends the reader.
fn read_input(
    tx: &Sender<AppEvent>,
    stop: &AtomicBool,
    mut source: impl FnMut(Duration) -> io::Result<Option<Event>>,
) {
    while !stop.load(Ordering::Relaxed) {
        let forwarded = match source(POLL_INTERVAL) {
            Ok(Some(Event::Key(key))) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Ok(Some(Event::Paste(text))) => AppEvent::Paste(text),
            Ok(Some(Event::Resize(w, h))) => AppEvent::Resize(w, h),
            Ok(_) => continue,
            Err(e) => {
                tracing::error!(error = %e, "terminal input failed");
                let _ = tx.send(AppEvent::InputFailed(e));
                break;
            }
        };
        if tx.send(forwarded).is_err() {
            break;
        }
    }
    tracing::debug!("input reader stopped");
}
