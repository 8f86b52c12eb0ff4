//! Append-only audit log file
//!
//! Each event is written as one JSON line, linked to the previous event's
//! hash. Appends are serialized through a single mutex so lines never
//! interleave and the chain stays linear across concurrent requests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shared_types::{AuditAction, AuditChain, AuditError, AuditEvent};
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AuditLogError {
    #[error("Audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

#[derive(Debug)]
struct Tail {
    last_hash: Option<String>,
}

/// Shared handle to the audit log file
#[derive(Clone, Debug)]
pub struct AuditLog {
    path: Arc<PathBuf>,
    tail: Arc<Mutex<Tail>>,
}

impl AuditLog {
    /// Open (or create) the log at `path`, resuming the chain from the last
    /// event already on disk
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AuditLogError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let chain = read_chain(&path).await?;
        if let Err(e) = chain.verify() {
            warn!("Existing audit log {} fails verification: {}", path.display(), e);
        }
        info!(
            "Audit log {} opened with {} existing events",
            path.display(),
            chain.events.len()
        );

        Ok(Self {
            path: Arc::new(path),
            tail: Arc::new(Mutex::new(Tail {
                last_hash: chain.last_hash(),
            })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(
        &self,
        action: AuditAction,
        actor: &str,
        document_hash: Option<String>,
        details: Option<String>,
    ) -> Result<AuditEvent, AuditLogError> {
        let mut tail = self.tail.lock().await;

        let event = AuditEvent::new(
            action,
            actor,
            document_hash,
            tail.last_hash.clone(),
            details,
        );
        let mut line = event.to_json_line()?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_ref())
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tail.last_hash = Some(event.compute_hash());
        info!("{}", event.log_line());

        Ok(event)
    }

    /// Append, logging instead of failing; audit problems never fail a request
    pub async fn record(
        &self,
        action: AuditAction,
        actor: &str,
        document_hash: Option<String>,
        details: Option<String>,
    ) {
        if let Err(e) = self.append(action, actor, document_hash, details).await {
            warn!("Failed to append audit event: {}", e);
        }
    }
}

/// Read every parseable event from the log; a missing file is an empty chain
pub async fn read_chain(path: &Path) -> Result<AuditChain, AuditLogError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AuditChain::new()),
        Err(e) => return Err(e.into()),
    };

    let mut events = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match AuditEvent::from_json_line(line) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Skipping audit line {}: {}", number + 1, e),
        }
    }

    Ok(AuditChain::from_events(events))
}
