//! テスト用の Task と HTTP サーバー

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::domain::TaskMetadata;
use crate::domain::errors::TaskError;
use crate::task::{Task, TaskContext};

#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    Noop,
    /// Create `(type, name)` entities, in order.
    Create(Vec<(&'static str, &'static str)>),
    /// Create entities, then sleep far past any test deadline.
    CreateThenHang(Vec<(&'static str, &'static str)>),
    /// Create entities, then block the worker thread without yielding.
    CreateThenBlock(Vec<(&'static str, &'static str)>, Duration),
    Fail(&'static str),
    Panic,
}

pub(crate) struct StaticTask {
    metadata: TaskMetadata,
    behavior: Behavior,
    runs: Arc<AtomicUsize>,
    cleanups: Arc<AtomicUsize>,
}

impl StaticTask {
    pub(crate) fn new(metadata: TaskMetadata) -> Self {
        Self {
            metadata,
            behavior: Behavior::Noop,
            runs: Arc::new(AtomicUsize::new(0)),
            cleanups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// (run calls, cleanup calls)
    pub(crate) fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.runs.clone(), self.cleanups.clone())
    }
}

fn create_all(ctx: &TaskContext, entities: &[(&str, &str)]) {
    for (entity_type, name) in entities {
        let attrs = BTreeMap::from([("name".to_string(), name.to_string())]);
        ctx.create_entity(entity_type, attrs);
    }
}

#[async_trait]
impl Task for StaticTask {
    fn metadata(&self) -> &TaskMetadata {
        &self.metadata
    }

    async fn run(&self, ctx: &TaskContext) -> Result<(), TaskError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Noop => Ok(()),
            Behavior::Create(entities) => {
                create_all(ctx, entities);
                Ok(())
            }
            Behavior::CreateThenHang(entities) => {
                create_all(ctx, entities);
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            Behavior::CreateThenBlock(entities, block_for) => {
                create_all(ctx, entities);
                std::thread::sleep(*block_for);
                Ok(())
            }
            Behavior::Fail(message) => Err(TaskError::failed(*message)),
            Behavior::Panic => panic!("task blew up"),
        }
    }

    async fn cleanup(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Accepts a single HTTP request, answers with `status_line`, and yields the
/// raw request text (headers and body).
pub(crate) async fn one_shot_server(status_line: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let body_len = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        let response = format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}/receive"), handle)
}
