//! The heartbeat engine.
//!
//! Owns all session state and runs on a single timeline. The host feeds it
//! editor signals, polls it when [`HeartbeatEngine::next_deadline`] passes,
//! and hands back every [`Completion`] produced by the spawner.

use crate::clock::Clock;
use crate::coalescer::{EventCoalescer, NotifyKind};
use crate::config::ZeedasConfig;
use crate::dedupe::DuplicateSuppressor;
use crate::gate::SessionState;
use crate::presence::{Lookup, PresenceCache};
use crate::spawner::{Completion, Spawner};
use crate::status::{DispatchStatus, StatusBoard};
use crate::storage::StorageConfig;
use crate::summary::SummaryCache;
use crate::transport::{Transport, TransportError};
use crate::types::{entity_for, Document, Heartbeat, PresenceRequest, TodaySummary};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use zeedas_protocol::{EditorEventType, EditorMessage, ErrorInfo, TaskInfo};

/// Engine switches, normally derived from [`ZeedasConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub enabled: bool,
    pub show_status_bar: bool,
    pub show_coding_activity: bool,
    pub show_team: bool,
    /// Log file named in error tooltips.
    pub log_file: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            show_status_bar: true,
            show_coding_activity: true,
            show_team: true,
            log_file: StorageConfig::default().log_file().display().to_string(),
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &ZeedasConfig, storage: &StorageConfig) -> Self {
        let log_file = config
            .cli
            .log_file
            .clone()
            .unwrap_or_else(|| storage.log_file());
        Self {
            enabled: !config.settings.disabled,
            show_status_bar: config.settings.status_bar_enabled,
            show_coding_activity: config.settings.status_bar_coding_activity,
            show_team: config.settings.status_bar_team,
            log_file: log_file.display().to_string(),
        }
    }
}

/// Editor notification, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorSignal {
    SelectionChanged(Document),
    /// `None` when no editor has focus.
    ActiveEditorChanged(Option<Document>),
    Saved(Document),
    DebugStarted,
    DebugTerminated,
    /// Breakpoints or the active debug session changed.
    DebugChanged,
    TaskStarted(TaskInfo),
    TaskEnded,
}

impl TryFrom<EditorMessage> for EditorSignal {
    type Error = ErrorInfo;

    fn try_from(message: EditorMessage) -> Result<Self, Self::Error> {
        message.validate()?;
        let document = || {
            message
                .document
                .clone()
                .ok_or_else(|| ErrorInfo::new("missing_field", "document is required"))
        };
        Ok(match message.event {
            EditorEventType::SelectionChanged => Self::SelectionChanged(document()?),
            EditorEventType::ActiveEditorChanged => {
                Self::ActiveEditorChanged(message.document.clone())
            }
            EditorEventType::DocumentSaved => Self::Saved(document()?),
            EditorEventType::DebugSessionStarted => Self::DebugStarted,
            EditorEventType::DebugSessionTerminated => Self::DebugTerminated,
            EditorEventType::DebugSessionChanged => Self::DebugChanged,
            EditorEventType::TaskStarted => Self::TaskStarted(
                message
                    .task
                    .clone()
                    .ok_or_else(|| ErrorInfo::new("missing_field", "task is required"))?,
            ),
            EditorEventType::TaskEnded => Self::TaskEnded,
        })
    }
}

pub struct HeartbeatEngine {
    options: EngineOptions,
    transport: Arc<dyn Transport>,
    spawner: Box<dyn Spawner>,
    clock: Arc<dyn Clock>,
    coalescer: EventCoalescer,
    session: SessionState,
    dedupe: DuplicateSuppressor,
    summary: SummaryCache,
    presence: PresenceCache,
    active: Option<Document>,
    status: StatusBoard,
    published: Option<StatusBoard>,
    in_flight: usize,
}

impl HeartbeatEngine {
    pub fn new(
        options: EngineOptions,
        transport: Arc<dyn Transport>,
        spawner: Box<dyn Spawner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let status = StatusBoard::new(options.enabled && options.show_status_bar);
        Self {
            options,
            transport,
            spawner,
            clock,
            coalescer: EventCoalescer::default(),
            session: SessionState::default(),
            dedupe: DuplicateSuppressor::default(),
            summary: SummaryCache::default(),
            presence: PresenceCache::default(),
            active: None,
            status,
            published: None,
            in_flight: 0,
        }
    }

    /// Kicks off the first summary fetch so the status bar is populated
    /// before the first heartbeat.
    pub fn start(&mut self) {
        if self.options.enabled {
            tracing::info!(transport = self.transport.name(), "Heartbeat engine started");
            self.request_summary();
        }
    }

    pub fn handle(&mut self, signal: EditorSignal) {
        if !self.options.enabled {
            return;
        }
        match signal {
            EditorSignal::SelectionChanged(document) => {
                self.active = Some(document);
                self.notify(NotifyKind::Selection, false);
            }
            EditorSignal::ActiveEditorChanged(document) => {
                self.active = document;
                self.notify(NotifyKind::FocusChange, false);
            }
            EditorSignal::Saved(document) => {
                self.active = Some(document);
                self.notify(NotifyKind::Save, true);
            }
            EditorSignal::DebugStarted => {
                self.session.is_debugging = true;
                self.notify(NotifyKind::FocusChange, false);
            }
            EditorSignal::DebugTerminated => {
                self.session.is_debugging = false;
                self.notify(NotifyKind::FocusChange, false);
            }
            EditorSignal::DebugChanged => self.notify(NotifyKind::FocusChange, false),
            EditorSignal::TaskStarted(task) => {
                let watching = task
                    .detail
                    .as_deref()
                    .is_some_and(|detail| detail.contains("watch"));
                if task.is_background || watching {
                    tracing::trace!(detail = ?task.detail, "Ignoring background task");
                    return;
                }
                self.session.is_compiling = true;
                self.notify(NotifyKind::FocusChange, false);
            }
            EditorSignal::TaskEnded => {
                self.session.is_compiling = false;
                self.notify(NotifyKind::FocusChange, false);
            }
        }
    }

    fn notify(&mut self, kind: NotifyKind, is_write: bool) {
        let now = self.clock.now();
        self.coalescer.notify(kind, is_write, now);
    }

    /// When [`poll`](Self::poll) next has work to do.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.coalescer.deadline()
    }

    /// Evaluates the debounced tick if its timer has expired.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        if let Some(is_write) = self.coalescer.take_due(now) {
            self.evaluate(is_write);
        }
    }

    /// Evaluates the pending tick now, ignoring its timer.
    pub fn flush(&mut self) {
        if let Some(is_write) = self.coalescer.flush() {
            self.evaluate(is_write);
        }
    }

    fn evaluate(&mut self, is_write: bool) {
        if !self.options.enabled {
            return;
        }
        let Some(document) = self.active.clone() else {
            return;
        };
        let now = self.clock.now();
        let entity = entity_for(&document);

        if self.presence.focus(&entity) {
            self.status.clear_team();
            self.lookup_presence(&document);
        }

        if !self.session.should_emit(&entity, now, is_write) {
            return;
        }

        let heartbeat = Heartbeat::from_document(
            &document,
            now,
            is_write,
            self.session.is_debugging,
            self.session.is_compiling,
        );

        if is_write
            && self
                .dedupe
                .is_duplicate(&entity, now, heartbeat.lineno, heartbeat.cursorpos)
        {
            tracing::debug!(entity = %entity, "Skipping duplicate heartbeat");
            return;
        }

        self.dispatch(heartbeat);
        self.session.record_dispatch(&entity, now);
    }

    fn dispatch(&mut self, heartbeat: Heartbeat) {
        tracing::debug!(
            entity = %heartbeat.entity,
            is_write = heartbeat.is_write,
            category = ?heartbeat.category,
            transport = self.transport.name(),
            "Sending heartbeat"
        );
        let transport = Arc::clone(&self.transport);
        self.in_flight += 1;
        self.spawner.spawn(Box::new(move || {
            let result = transport.send_heartbeat(&heartbeat);
            Completion::Heartbeat {
                entity: heartbeat.entity,
                result,
            }
        }));
    }

    fn request_summary(&mut self) {
        if !self.options.show_status_bar {
            return;
        }
        if !self.summary.try_begin(self.clock.now()) {
            return;
        }
        let transport = Arc::clone(&self.transport);
        self.in_flight += 1;
        self.spawner.spawn(Box::new(move || Completion::Summary {
            result: transport.fetch_summary(),
        }));
    }

    fn lookup_presence(&mut self, document: &Document) {
        if !self.options.show_team || !self.summary.has_team_features() {
            return;
        }
        let request = PresenceRequest::from_document(document);
        match self.presence.lookup(&request.entity) {
            Lookup::Hit(presence) => self.status.apply_presence(&presence),
            Lookup::InFlight => {}
            Lookup::Fetch => {
                let transport = Arc::clone(&self.transport);
                self.in_flight += 1;
                self.spawner.spawn(Box::new(move || {
                    let result = transport.fetch_presence(&request);
                    Completion::Presence {
                        entity: request.entity,
                        result,
                    }
                }));
            }
        }
    }

    /// Applies the result of a transport call.
    pub fn complete(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if !self.options.enabled {
            return;
        }
        match completion {
            Completion::Heartbeat { entity, result } => self.complete_heartbeat(&entity, result),
            Completion::Summary { result } => self.complete_summary(result),
            Completion::Presence { entity, result } => match result {
                Ok(presence) => {
                    if let Some(presence) = self.presence.resolve(&entity, Some(presence)) {
                        self.status.apply_presence(&presence);
                    }
                }
                Err(err) => {
                    self.presence.resolve(&entity, None);
                    match err {
                        TransportError::MissingContext(_) => {
                            tracing::debug!(entity = %entity, "No project context for presence lookup")
                        }
                        err => tracing::warn!(entity = %entity, error = %err, "Presence lookup failed"),
                    }
                }
            },
        }
    }

    fn complete_heartbeat(&mut self, entity: &str, result: Result<(), TransportError>) {
        let status = DispatchStatus::classify(&result);
        match &result {
            Ok(()) => tracing::debug!(entity = %entity, "Heartbeat accepted"),
            Err(err) if err.is_offline() => {
                tracing::warn!(entity = %entity, error = %err, "Working offline")
            }
            Err(err) => tracing::error!(entity = %entity, error = %err, "Heartbeat failed"),
        }
        self.status
            .apply_dispatch(status, self.options.show_coding_activity, &self.options.log_file);
        if status == DispatchStatus::Accepted {
            self.request_summary();
        }
    }

    fn complete_summary(&mut self, result: Result<TodaySummary, TransportError>) {
        match result {
            Ok(summary) => {
                self.summary.store(&summary);
                self.status
                    .apply_summary(&summary, self.options.show_coding_activity);
                if let Some(document) = self.active.clone() {
                    self.lookup_presence(&document);
                }
            }
            Err(TransportError::Offline { .. }) => {}
            Err(TransportError::Auth { code }) => {
                tracing::error!(code, "Api key rejected while fetching coding activity");
                self.status.apply_auth_error(code);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch coding activity");
            }
        }
    }

    /// Turns the engine on or off. Turning it off drops all session state.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.options.enabled {
            return;
        }
        self.options.enabled = enabled;
        self.coalescer.cancel();
        self.session = SessionState::default();
        self.dedupe.clear();
        self.presence.clear();
        self.summary.clear();
        self.active = None;
        self.status = StatusBoard::new(enabled && self.options.show_status_bar);
        tracing::info!(enabled, "Heartbeat engine toggled");
        if enabled {
            self.request_summary();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn dedupe(&self) -> &DuplicateSuppressor {
        &self.dedupe
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Returns the status board if it changed since the last call.
    pub fn take_status_update(&mut self) -> Option<StatusBoard> {
        if self.published.as_ref() == Some(&self.status) {
            return None;
        }
        self.published = Some(self.status.clone());
        self.published.clone()
    }

    /// Transport calls spawned but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
