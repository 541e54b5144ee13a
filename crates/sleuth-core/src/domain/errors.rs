//! Errors - エラー型と分類
//!
//! どのエラーも `TaskRunner::execute` の外には出ない。
//! runner はここで定義した値を TaskLog と tracing に書いて吸収する。
//!
//! # 分類
//! - SchemaError: option schema の宣言ミス（登録時に検出）
//! - OptionError: ユーザー option の検証・型変換失敗（Setup で検出）
//! - TaskError: Run / Cleanup がタスク固有ロジックから返す失敗
//! - DispatchError: webhook / file への配送失敗
//! - RegistryError / ConfigError / BuildError: 起動時のワイヤリング失敗

use std::path::PathBuf;

use thiserror::Error;

/// Option schema の宣言エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown option type '{0}'")]
    UnknownType(String),

    #[error("unknown validation rule '{0}'")]
    UnknownRule(String),

    #[error("option '{0}' is declared more than once")]
    DuplicateOption(String),

    #[error("default for option '{name}' is not a {expected}")]
    DefaultTypeMismatch { name: String, expected: String },
}

/// Setup 時の option coercion エラー（fail-fast）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("option '{name}' does not match rule {rule} ({value})")]
    PatternMismatch {
        name: String,
        rule: String,
        value: String,
    },

    #[error("option '{name}' is not a representable integer ({value})")]
    InvalidInteger { name: String, value: String },
}

/// タスク固有ロジック（Run / Cleanup）の失敗
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("illegal character in command: {0}")]
    IllegalCommand(String),

    #[error("command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("task cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TaskError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result 配送の失敗。runner がログに書いて捨てる。
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("webhook URI not specified")]
    MissingHookUri,

    #[error("unable to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unable to post result to {uri}: {source}")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unable to write result to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// TaskRegistry の操作エラー
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("task type '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("task type '{task}' declares an invalid option schema: {source}")]
    InvalidSchema {
        task: String,
        #[source]
        source: SchemaError,
    },
}

/// 環境変数から RunnerConfig を読むときのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got '{value}'")]
    InvalidDuration { var: String, value: String },
}

/// アプリケーション構築・呼び出し時のエラー
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Missing task types: {0:?}. These tasks were expected but not registered.")]
    MissingTaskTypes(Vec<String>),

    #[error("no task registered under '{0}'")]
    UnknownTask(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
