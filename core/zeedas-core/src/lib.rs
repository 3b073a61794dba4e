//! # zeedas-core
//!
//! Heartbeat emission engine for the Zeedas editor plugin.
//!
//! Turns a noisy stream of editor events into heartbeats, delivers them through
//! the activity CLI or the activity API, and keeps the status-bar summaries
//! (today's coding time, who else works on the focused file) up to date.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Transport calls run on
//!   worker threads supplied by a [`Spawner`]; results come back as
//!   [`Completion`]s.
//! - **Single timeline**: The engine is an owned value. Only its own methods
//!   mutate it, so it needs no locks.
//! - **Never raises**: Transport failures become status-board state and log
//!   lines, not errors returned to the host.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zeedas_core::{build_transport, EngineOptions, HeartbeatEngine, SystemClock};
//!
//! let storage = StorageConfig::default();
//! let config = ZeedasConfig::load(&storage, None)?;
//! let transport = build_transport(&config, &storage)?;
//! let mut engine = HeartbeatEngine::new(
//!     EngineOptions::from_config(&config, &storage),
//!     transport,
//!     Box::new(ThreadSpawner::new(move |completion| {
//!         let _ = tx.send(completion);
//!     })),
//!     Arc::new(SystemClock),
//! );
//! engine.handle(EditorSignal::SelectionChanged(document));
//! ```

pub mod clock;
pub mod coalescer;
pub mod config;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod gate;
pub mod patterns;
pub mod presence;
pub mod spawner;
pub mod status;
pub mod storage;
pub mod summary;
pub mod transport;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{TransportKind, ZeedasConfig};
pub use engine::{EditorSignal, EngineOptions, HeartbeatEngine};
pub use error::{Result, ZeedasError};
pub use spawner::{Completion, DeferredSpawner, Spawner, ThreadSpawner};
pub use status::{DispatchStatus, StatusBoard, TeamLabel};
pub use storage::StorageConfig;
pub use transport::{build_transport, CliTransport, HttpTransport, Transport, TransportError};
pub use types::{Category, Document, Heartbeat, Presence, PresenceRequest, TodaySummary};
