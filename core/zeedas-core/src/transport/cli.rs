//! Activity CLI transport.
//!
//! Every call is one subprocess. The exit code carries the outcome; queries
//! also print JSON on stdout.

use super::{classify_exit_code, Transport, TransportError};
use crate::config::ZeedasConfig;
use crate::patterns::is_valid_api_key;
use crate::storage::StorageConfig;
use crate::types::{Heartbeat, Presence, PresenceOther, PresenceRequest, PresenceYou, TodaySummary};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use zeedas_protocol::{CliFileExpertsOutput, CliTodayOutput, FileExpert};

#[derive(Debug, Clone)]
pub struct CliTransport {
    binary: PathBuf,
    user_agent: String,
    api_key: Option<String>,
    api_url: Option<String>,
    config_file: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

impl CliTransport {
    pub fn new(binary: PathBuf, user_agent: impl Into<String>) -> Self {
        Self {
            binary,
            user_agent: user_agent.into(),
            api_key: None,
            api_url: None,
            config_file: None,
            log_file: None,
        }
    }

    pub fn from_config(config: &ZeedasConfig, storage: &StorageConfig) -> Self {
        Self {
            binary: config.cli_binary(storage),
            user_agent: config.plugin.user_agent(),
            // Only explicit overrides are forwarded; the CLI reads its own config otherwise.
            api_key: config.settings.api_key.clone(),
            api_url: config.settings.api_url.clone(),
            config_file: config.cli.config_file.clone(),
            log_file: config.cli.log_file.clone(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn heartbeat_args(&self, heartbeat: &Heartbeat) -> Vec<String> {
        let mut args = vec![
            "--entity".to_string(),
            heartbeat.entity.clone(),
            "--plugin".to_string(),
            self.user_agent.clone(),
            "--lineno".to_string(),
            heartbeat.lineno.to_string(),
            "--cursorpos".to_string(),
            heartbeat.cursorpos.to_string(),
            "--lines-in-file".to_string(),
            heartbeat.lines_in_file.to_string(),
        ];
        if let Some(category) = heartbeat.category.as_wire() {
            args.push("--category".to_string());
            args.push(category.to_string());
        }
        self.push_credentials(&mut args);
        push_project(
            &mut args,
            heartbeat.project.as_deref(),
            heartbeat.project_folder.as_deref(),
        );
        if heartbeat.is_write {
            args.push("--write".to_string());
        }
        self.push_local_files(&mut args);
        if heartbeat.is_unsaved {
            args.push("--is-unsaved-entity".to_string());
        }
        args
    }

    pub fn today_args(&self) -> Vec<String> {
        let mut args = vec![
            "--today".to_string(),
            "--output".to_string(),
            "json".to_string(),
            "--plugin".to_string(),
            self.user_agent.clone(),
        ];
        self.push_credentials(&mut args);
        self.push_local_files(&mut args);
        args
    }

    pub fn file_experts_args(&self, request: &PresenceRequest) -> Vec<String> {
        let mut args = vec![
            "--output".to_string(),
            "json".to_string(),
            "--plugin".to_string(),
            self.user_agent.clone(),
            "--file-experts".to_string(),
            request.entity.clone(),
            "--entity".to_string(),
            request.entity.clone(),
        ];
        self.push_credentials(&mut args);
        push_project(
            &mut args,
            request.project.as_deref(),
            request.project_folder.as_deref(),
        );
        self.push_local_files(&mut args);
        if request.is_unsaved {
            args.push("--is-unsaved-entity".to_string());
        }
        args
    }

    fn push_credentials(&self, args: &mut Vec<String>) {
        if let Some(key) = self.api_key.as_deref().filter(|key| is_valid_api_key(key)) {
            args.push("--key".to_string());
            args.push(key.trim().to_string());
        }
        if let Some(url) = self.api_url.as_deref().filter(|url| !url.trim().is_empty()) {
            args.push("--api-url".to_string());
            args.push(url.trim().to_string());
        }
    }

    fn push_local_files(&self, args: &mut Vec<String>) {
        if let Some(config_file) = &self.config_file {
            args.push("--config".to_string());
            args.push(config_file.to_string_lossy().to_string());
        }
        if let Some(log_file) = &self.log_file {
            args.push("--log-file".to_string());
            args.push(log_file.to_string_lossy().to_string());
        }
    }

    fn run(&self, args: &[String]) -> Result<Output, TransportError> {
        tracing::debug!(
            binary = %self.binary.display(),
            args = %format_args_for_log(args),
            "Running activity CLI"
        );
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                TransportError::unknown(
                    None,
                    format!("failed to run {}: {}", self.binary.display(), err),
                )
            })
    }

    /// Runs the CLI and returns stdout when it exited cleanly.
    fn run_query(&self, args: &[String], what: &str) -> Result<String, TransportError> {
        let output = self.run(args)?;
        if let Err(err) = classify_exit_code(output.status.code()) {
            log_failed_output(&output, what);
            return Err(err);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Transport for CliTransport {
    fn name(&self) -> &'static str {
        "cli"
    }

    fn send_heartbeat(&self, heartbeat: &Heartbeat) -> Result<(), TransportError> {
        let output = self.run(&self.heartbeat_args(heartbeat))?;
        let result = classify_exit_code(output.status.code());
        if result.is_err() {
            log_failed_output(&output, "heartbeat");
        }
        result
    }

    fn fetch_summary(&self) -> Result<TodaySummary, TransportError> {
        let stdout = self.run_query(&self.today_args(), "today")?;
        parse_today_output(&stdout)
    }

    fn fetch_presence(&self, request: &PresenceRequest) -> Result<Presence, TransportError> {
        let stdout = self.run_query(&self.file_experts_args(request), "file experts")?;
        parse_file_experts_output(&stdout)
    }
}

fn push_project(args: &mut Vec<String>, project: Option<&str>, folder: Option<&str>) {
    if let Some(project) = project {
        args.push("--alternate-project".to_string());
        args.push(project.to_string());
    }
    if let Some(folder) = folder {
        args.push("--project-folder".to_string());
        args.push(folder.to_string());
    }
}

/// Argument list with the API key masked.
fn format_args_for_log(args: &[String]) -> String {
    let mut masked = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            masked.push("XXXXXXXX".to_string());
            hide_next = false;
            continue;
        }
        hide_next = arg == "--key";
        masked.push(arg.clone());
    }
    masked.join(" ")
}

fn log_failed_output(output: &Output, what: &str) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    tracing::debug!(
        call = what,
        code = ?output.status.code(),
        stderr = %stderr.trim(),
        stdout = %stdout.trim(),
        "Activity CLI exited with failure"
    );
}

/// Empty output means the backend has nothing to report yet.
pub(crate) fn parse_today_output(stdout: &str) -> Result<TodaySummary, TransportError> {
    if stdout.trim().is_empty() {
        return Ok(TodaySummary::default());
    }
    let parsed: CliTodayOutput =
        serde_json::from_str(stdout).map_err(|source| TransportError::Parse {
            context: "today coding activity".to_string(),
            source,
        })?;
    Ok(TodaySummary {
        text: parsed
            .text
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        has_team_features: Some(parsed.has_team_features),
    })
}

pub(crate) fn parse_file_experts_output(stdout: &str) -> Result<Presence, TransportError> {
    if stdout.trim().is_empty() {
        return Ok(Presence::default());
    }
    let parsed: CliFileExpertsOutput =
        serde_json::from_str(stdout).map_err(|source| TransportError::Parse {
            context: "devs for file".to_string(),
            source,
        })?;
    Ok(Presence {
        you: parsed.you.map(|expert| PresenceYou {
            total_text: expert.total.text,
        }),
        other: parsed.other.map(presence_other),
    })
}

pub(crate) fn presence_other(expert: FileExpert) -> PresenceOther {
    let user = expert.user.unwrap_or_default();
    PresenceOther {
        display_name: user.name,
        long_name: user.long_name,
        total_text: expert.total.text,
    }
}
