//! Off-timeline execution of transport calls.
//!
//! The engine never blocks on a transport. It packages each call as a [`Job`]
//! and hands it to a [`Spawner`]; the finished [`Completion`] is fed back to
//! [`HeartbeatEngine::complete`](crate::engine::HeartbeatEngine::complete) on
//! the engine's own timeline.

use crate::transport::TransportError;
use crate::types::{Presence, TodaySummary};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

/// Result of one transport call, tagged with what it was for.
#[derive(Debug)]
pub enum Completion {
    Heartbeat {
        entity: String,
        result: Result<(), TransportError>,
    },
    Summary {
        result: Result<TodaySummary, TransportError>,
    },
    Presence {
        entity: String,
        result: Result<Presence, TransportError>,
    },
}

pub type Job = Box<dyn FnOnce() -> Completion + Send + 'static>;

pub trait Spawner {
    fn spawn(&self, job: Job);
}

/// Runs each job on its own thread and passes the result to `deliver`.
pub struct ThreadSpawner {
    deliver: Arc<dyn Fn(Completion) + Send + Sync>,
}

impl ThreadSpawner {
    pub fn new(deliver: impl Fn(Completion) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
        }
    }
}

impl Spawner for ThreadSpawner {
    fn spawn(&self, job: Job) {
        let deliver = Arc::clone(&self.deliver);
        let spawned = std::thread::Builder::new()
            .name("zeedas-transport".to_string())
            .spawn(move || deliver(job()));
        if let Err(err) = spawned {
            tracing::error!(error = %err, "Failed to spawn transport thread");
        }
    }
}

/// Queues jobs until the caller runs them. Lets tests decide exactly when
/// each transport call "returns".
#[derive(Clone, Default)]
pub struct DeferredSpawner {
    queue: Rc<RefCell<VecDeque<Job>>>,
}

impl DeferredSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Runs the oldest queued job.
    pub fn run_next(&self) -> Option<Completion> {
        let job = self.queue.borrow_mut().pop_front()?;
        Some(job())
    }
}

impl Spawner for DeferredSpawner {
    fn spawn(&self, job: Job) {
        self.queue.borrow_mut().push_back(job);
    }
}
