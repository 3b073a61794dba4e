//! Host loop for `zeedas-hook run`.
//!
//! Everything the engine reacts to arrives on one channel: editor lines from
//! the stdin reader thread and completions from transport threads. The loop
//! sleeps until the next input or the engine's debounce deadline, whichever
//! comes first.
//!
//! ## Output
//!
//! One JSON object per line on stdout:
//!
//! ```text
//! {"type":"status","status":{...}}   status board changed
//! {"type":"error","error":{...}}     editor line was rejected
//! ```

use chrono::Utc;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use zeedas_core::{
    build_transport, Completion, EditorSignal, EngineOptions, HeartbeatEngine, StatusBoard,
    StorageConfig, SystemClock, ThreadSpawner, ZeedasConfig,
};
use zeedas_protocol::{parse_editor_message, ErrorInfo};

/// How long in-flight transport calls may take after stdin closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum Input {
    Editor(String),
    Completed(Completion),
    Closed,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum HostOutput<'a> {
    Status { status: &'a StatusBoard },
    Error { error: &'a ErrorInfo },
}

pub fn run(storage: &StorageConfig, config: &ZeedasConfig) -> Result<(), String> {
    let transport =
        build_transport(config, storage).map_err(|e| format!("Failed to build transport: {}", e))?;
    let (tx, rx) = mpsc::channel();
    let mut engine = engine_with_channel(
        EngineOptions::from_config(config, storage),
        transport,
        tx.clone(),
    );
    spawn_stdin_reader(tx);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serve(&mut engine, &rx, &mut out, SHUTDOWN_GRACE)
}

fn engine_with_channel(
    options: EngineOptions,
    transport: Arc<dyn zeedas_core::Transport>,
    tx: Sender<Input>,
) -> HeartbeatEngine {
    let spawner = ThreadSpawner::new(move |completion| {
        let _ = tx.send(Input::Completed(completion));
    });
    HeartbeatEngine::new(options, transport, Box::new(spawner), Arc::new(SystemClock))
}

fn spawn_stdin_reader(tx: Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Input::Editor(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
        let _ = tx.send(Input::Closed);
    });
}

/// Drives the engine until the editor closes stdin, then flushes the pending
/// tick and waits up to `grace` for in-flight calls.
pub fn serve<W: Write>(
    engine: &mut HeartbeatEngine,
    rx: &Receiver<Input>,
    out: &mut W,
    grace: Duration,
) -> Result<(), String> {
    engine.start();
    publish(engine, out)?;

    loop {
        let input = match engine.next_deadline() {
            Some(deadline) => {
                let wait = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                match rx.recv_timeout(wait) {
                    Ok(input) => Some(input),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => Some(Input::Closed),
                }
            }
            None => Some(rx.recv().unwrap_or(Input::Closed)),
        };

        match input {
            Some(Input::Editor(line)) => handle_line(engine, &line, out)?,
            Some(Input::Completed(completion)) => engine.complete(completion),
            Some(Input::Closed) => break,
            None => {}
        }
        engine.poll();
        publish(engine, out)?;
    }

    tracing::debug!(in_flight = engine.in_flight(), "stdin closed, shutting down");
    engine.flush();
    drain(engine, rx, grace);
    publish(engine, out)
}

fn handle_line<W: Write>(
    engine: &mut HeartbeatEngine,
    line: &str,
    out: &mut W,
) -> Result<(), String> {
    if line.trim().is_empty() {
        return Ok(());
    }
    match parse_editor_message(line).and_then(EditorSignal::try_from) {
        Ok(signal) => {
            engine.handle(signal);
            Ok(())
        }
        Err(error) => {
            tracing::warn!(code = %error.code, message = %error.message, "Rejected editor message");
            write_line(out, &HostOutput::Error { error: &error })
        }
    }
}

fn drain(engine: &mut HeartbeatEngine, rx: &Receiver<Input>, grace: Duration) {
    let deadline = Instant::now() + grace;
    while engine.in_flight() > 0 {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            tracing::warn!(
                in_flight = engine.in_flight(),
                "Exiting with transport calls still running"
            );
            return;
        }
        match rx.recv_timeout(left) {
            Ok(Input::Completed(completion)) => engine.complete(completion),
            Ok(_) => {}
            Err(_) => return,
        }
    }
}

fn publish<W: Write>(engine: &mut HeartbeatEngine, out: &mut W) -> Result<(), String> {
    match engine.take_status_update() {
        Some(status) => write_line(out, &HostOutput::Status { status: &status }),
        None => Ok(()),
    }
}

fn write_line<W: Write>(out: &mut W, output: &HostOutput<'_>) -> Result<(), String> {
    serde_json::to_writer(&mut *out, output)
        .map_err(|e| format!("Failed to serialize output: {}", e))?;
    writeln!(out).map_err(|e| format!("Failed to write stdout: {}", e))?;
    out.flush()
        .map_err(|e| format!("Failed to flush stdout: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use zeedas_core::{
        Heartbeat, Presence, PresenceRequest, TodaySummary, Transport, TransportError,
    };

    #[derive(Default)]
    struct CountingTransport {
        heartbeats: Mutex<Vec<String>>,
    }

    impl Transport for CountingTransport {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn send_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), TransportError> {
            self.heartbeats.lock().unwrap().push(heartbeat.entity.clone());
            Ok(())
        }

        fn fetch_summary(&self) -> Result<TodaySummary, TransportError> {
            Ok(TodaySummary {
                text: Some("42 mins".to_string()),
                has_team_features: Some(false),
            })
        }

        fn fetch_presence(&self, _request: &PresenceRequest) -> Result<Presence, TransportError> {
            Ok(Presence::default())
        }
    }

    fn serve_lines(lines: &[&str]) -> (Arc<CountingTransport>, Vec<serde_json::Value>) {
        let transport = Arc::new(CountingTransport::default());
        let (tx, rx) = mpsc::channel();
        let mut engine = engine_with_channel(EngineOptions::default(), transport.clone(), tx.clone());
        for line in lines {
            tx.send(Input::Editor(line.to_string())).unwrap();
        }
        tx.send(Input::Closed).unwrap();

        let mut out = Vec::new();
        serve(&mut engine, &rx, &mut out, Duration::from_secs(5)).unwrap();
        let outputs = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (transport, outputs)
    }

    #[test]
    fn pending_tick_is_flushed_on_close() {
        let (transport, outputs) = serve_lines(&[
            r#"{"event":"selection_changed","document":{"file_name":"/p/a.go","line_count":3}}"#,
        ]);
        assert_eq!(*transport.heartbeats.lock().unwrap(), vec!["/p/a.go".to_string()]);

        let last = outputs.last().unwrap();
        assert_eq!(last["type"], "status");
        assert_eq!(last["status"]["text"], "42 mins");
        assert_eq!(last["status"]["last_dispatch"]["kind"], "accepted");
    }

    #[test]
    fn rejected_lines_are_reported() {
        let (transport, outputs) = serve_lines(&["not json", r#"{"event":"selection_changed"}"#]);
        assert!(transport.heartbeats.lock().unwrap().is_empty());

        let errors: Vec<_> = outputs
            .iter()
            .filter(|output| output["type"] == "error")
            .map(|output| output["error"]["code"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(errors, vec!["invalid_message", "missing_field"]);
    }
}
