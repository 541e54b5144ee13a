//! TaskLog - 1 回の呼び出しに紐づく追記専用ログ
//!
//! # 設計
//! - エントリは追記のみ（一度書いたら変更しない）
//! - clone できるハンドル。runner と Run 中のタスクが同じログに書く
//! - 各エントリは tracing にも流す。Result に埋め込んだ後のログ
//!   （配送や cleanup）は tracing 側にだけ残る

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::Clock;

/// Severity of a task log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
    Success,
}

impl Severity {
    fn marker(&self) -> &'static str {
        match self {
            Severity::Info => "[ ]",
            Severity::Error => "[-]",
            Severity::Success => "[+]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.severity.marker(),
            self.message
        )
    }
}

#[derive(Clone)]
pub struct TaskLog {
    task_id: String,
    task_name: String,
    clock: Arc<dyn Clock>,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TaskLog {
    pub fn new(task_id: impl Into<String>, task_name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            task_id: task_id.into(),
            task_name: task_name.into(),
            clock,
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append an `info` entry.
    pub fn log(&self, message: impl Into<String>) {
        self.push(Severity::Info, message.into());
    }

    /// Append an `error` entry.
    pub fn error(&self, message: impl Into<String>) {
        self.push(Severity::Error, message.into());
    }

    /// Append a `success` entry.
    pub fn good(&self, message: impl Into<String>) {
        self.push(Severity::Success, message.into());
    }

    fn push(&self, severity: Severity, message: String) {
        match severity {
            Severity::Error => {
                tracing::error!(task_id = %self.task_id, task = %self.task_name, "{message}")
            }
            Severity::Info | Severity::Success => {
                tracing::info!(task_id = %self.task_id, task = %self.task_name, "{message}")
            }
        }

        let entry = LogEntry {
            timestamp: self.clock.now(),
            severity,
            message,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.severity == Severity::Error)
    }

    /// Render the whole log, one entry per line.
    pub fn to_text(&self) -> String {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Debug for TaskLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskLog")
            .field("task_id", &self.task_id)
            .field("task_name", &self.task_name)
            .field("entries", &self.len())
            .finish()
    }
}
