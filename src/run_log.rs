use std::fmt::{self, Display};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{UnifyError, ticket::TicketRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// How the run ended, as reported in the log header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub kind: String,
    pub source_label: Option<String>,
    pub message: String,
}

/// Ordered, human-readable record of one run. Every entry is also emitted
/// through `tracing`.
#[derive(Debug, Clone)]
pub struct RunLog {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ticket: Option<TicketRef>,
    pub query_count: Option<usize>,
    pub table_name: Option<String>,
    entries: Vec<LogEntry>,
    failure: Option<RunFailure>,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            ticket: None,
            query_count: None,
            table_name: None,
            entries: vec![],
            failure: None,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(run_id = %self.run_id, "{message}");
        self.entries.push(LogEntry { level: LogLevel::Info, message });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(run_id = %self.run_id, "{message}");
        self.entries.push(LogEntry { level: LogLevel::Warn, message });
    }

    /// Records the terminal error of the run.
    pub fn fail(&mut self, err: &UnifyError) {
        let failure = RunFailure {
            kind: err.kind().to_string(),
            source_label: err.source_label().map(str::to_string),
            message: err.to_string(),
        };

        error!(run_id = %self.run_id, kind = %failure.kind, "{}", failure.message);
        self.entries.push(LogEntry { level: LogLevel::Error, message: failure.message.clone() });
        self.failure = Some(failure);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        self.failure.as_ref()
    }

    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|entry| entry.level == LogLevel::Warn)
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::from("## Query unification report\n\n");

        out.push_str(&format!("- Run: `{}`\n", self.run_id));
        out.push_str(&format!("- Started: {}\n", self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true)));
        if let Some(ticket) = &self.ticket {
            out.push_str(&format!("- Ticket: {ticket}\n"));
        }
        if let Some(count) = self.query_count {
            out.push_str(&format!("- Queries unified: {count}\n"));
        }
        if let Some(table) = &self.table_name {
            out.push_str(&format!("- Final table: `{table}`\n"));
        }

        match &self.failure {
            None => out.push_str("- Status: success\n"),
            Some(failure) => {
                out.push_str(&format!("- Status: failed with {}", failure.kind));
                if let Some(label) = &failure.source_label {
                    out.push_str(&format!(" in {label}"));
                }
                out.push('\n');
            },
        }

        out.push_str("\n### Steps\n\n");
        for entry in &self.entries {
            out.push_str(&format!("- [{}] {}\n", entry.level, entry.message));
        }

        out
    }
}
