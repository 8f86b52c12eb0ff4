//! Tamper-evident audit trail for review events

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Marker written when an analysis finds no risky clauses
pub const NO_RISKS_MARKER: &str = "found no risks";

/// Types of auditable events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Upload {
        filename: String,
    },
    RiskScan {
        terms: Vec<String>,
    },
    NoRisks,
    Compare {
        changed: bool,
    },
    TemplateGenerated {
        template: String,
    },
    PrecedentSearch {
        results: usize,
    },
    AssistantQuery,
}

impl AuditAction {
    /// Human-readable description used in the plain-text log line
    pub fn describe(&self) -> String {
        match self {
            AuditAction::Upload { filename } => format!("uploaded {}", filename),
            AuditAction::RiskScan { terms } => format!("risks: {}", terms.join(", ")),
            AuditAction::NoRisks => NO_RISKS_MARKER.to_string(),
            AuditAction::Compare { changed: true } => "compared documents: changed".to_string(),
            AuditAction::Compare { changed: false } => {
                "compared documents: identical".to_string()
            }
            AuditAction::TemplateGenerated { template } => {
                format!("generated template {}", template)
            }
            AuditAction::PrecedentSearch { results } => {
                format!("searched precedents ({} matches)", results)
            }
            AuditAction::AssistantQuery => "asked the document assistant".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("Chain broken at event {index}: expected prev {expected:?}, got {found:?}")]
    BrokenChain {
        index: usize,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("Failed to (de)serialize audit event: {0}")]
    Serialization(String),
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: String,
    pub action: AuditAction,
    pub actor: String,
    pub document_hash: Option<String>,
    pub previous_hash: Option<String>,
    pub details: Option<String>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        actor: &str,
        document_hash: Option<String>,
        previous_hash: Option<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            action,
            actor: actor.to_string(),
            document_hash,
            previous_hash,
            details,
        }
    }

    /// Compute the hash of this event (for chain linking)
    ///
    /// Every field is length-prefixed and optional fields carry a presence
    /// tag, so no two distinct events share an encoding.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hash_field(&mut hasher, &self.event_id);
        hash_field(&mut hasher, &self.timestamp);
        hash_field(&mut hasher, &format!("{:?}", self.action));
        hash_field(&mut hasher, &self.actor);
        hash_optional_field(&mut hasher, self.document_hash.as_deref());
        hash_optional_field(&mut hasher, self.previous_hash.as_deref());
        hash_optional_field(&mut hasher, self.details.as_deref());
        hex::encode(hasher.finalize())
    }

    /// Plain-text line: `<timestamp> - <actor> <description>`
    pub fn log_line(&self) -> String {
        format!(
            "{} - {} {}",
            self.timestamp,
            self.actor,
            self.action.describe()
        )
    }

    pub fn to_json_line(&self) -> Result<String, AuditError> {
        serde_json::to_string(self).map_err(|e| AuditError::Serialization(e.to_string()))
    }

    pub fn from_json_line(line: &str) -> Result<Self, AuditError> {
        serde_json::from_str(line).map_err(|e| AuditError::Serialization(e.to_string()))
    }
}

fn hash_field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_optional_field(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update([1u8]);
            hash_field(hasher, value);
        }
        None => hasher.update([0u8]),
    }
}

/// In-memory chain of audit events with hash linking
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditChain {
    pub events: Vec<AuditEvent>,
}

impl AuditChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a chain from events read back from storage
    pub fn from_events(events: Vec<AuditEvent>) -> Self {
        Self { events }
    }

    pub fn last_hash(&self) -> Option<String> {
        self.events.last().map(|e| e.compute_hash())
    }

    /// Append an event, automatically linking to previous hash
    pub fn append(
        &mut self,
        action: AuditAction,
        actor: &str,
        document_hash: Option<String>,
        details: Option<String>,
    ) -> &AuditEvent {
        let previous_hash = self.last_hash();
        let event = AuditEvent::new(action, actor, document_hash, previous_hash, details);
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Verify the integrity of the chain
    pub fn verify(&self) -> Result<(), AuditError> {
        let mut expected_prev: Option<String> = None;

        for (index, event) in self.events.iter().enumerate() {
            if event.previous_hash != expected_prev {
                return Err(AuditError::BrokenChain {
                    index,
                    expected: expected_prev,
                    found: event.previous_hash.clone(),
                });
            }
            expected_prev = Some(event.compute_hash());
        }

        Ok(())
    }
}

/// Compute SHA-256 hash of document bytes
pub fn hash_document(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_integrity() {
        let mut chain = AuditChain::new();

        chain.append(
            AuditAction::Upload {
                filename: "lease.pdf".to_string(),
            },
            "admin",
            Some("hash1".to_string()),
            None,
        );
        chain.append(
            AuditAction::RiskScan {
                terms: vec!["termination".to_string()],
            },
            "admin",
            Some("hash1".to_string()),
            None,
        );
        chain.append(AuditAction::NoRisks, "admin", Some("hash2".to_string()), None);

        assert!(chain.verify().is_ok());
        assert_eq!(chain.events.len(), 3);
    }

    #[test]
    fn test_chain_tamper_detection() {
        let mut chain = AuditChain::new();

        chain.append(AuditAction::NoRisks, "admin", None, None);
        chain.append(AuditAction::AssistantQuery, "admin", None, None);

        chain.events[0].actor = "mallory".to_string();

        assert!(matches!(
            chain.verify(),
            Err(AuditError::BrokenChain { index: 1, .. })
        ));
    }

    #[test]
    fn test_details_are_covered_by_the_hash() {
        let mut chain = AuditChain::new();

        chain.append(
            AuditAction::AssistantQuery,
            "admin",
            None,
            Some("what is the penalty".to_string()),
        );
        chain.append(AuditAction::NoRisks, "admin", None, None);

        chain.events[0].details = Some("what is the deposit".to_string());

        assert!(matches!(
            chain.verify(),
            Err(AuditError::BrokenChain { index: 1, .. })
        ));
    }

    #[test]
    fn test_hash_separates_fields() {
        let mut event = AuditEvent::new(AuditAction::NoRisks, "ab", None, None, None);
        let absent = event.compute_hash();

        event.details = Some(String::new());
        assert_ne!(event.compute_hash(), absent);

        // Moving bytes between adjacent fields changes the hash
        let mut shifted = event.clone();
        shifted.actor = "a".to_string();
        shifted.document_hash = Some("b".to_string());
        event.document_hash = Some(String::new());
        assert_ne!(shifted.compute_hash(), event.compute_hash());
    }

    #[test]
    fn test_log_line_names_terms() {
        let event = AuditEvent::new(
            AuditAction::RiskScan {
                terms: vec!["liable".to_string(), "damages".to_string()],
            },
            "admin",
            None,
            None,
            None,
        );
        assert!(event.log_line().ends_with("admin risks: liable, damages"));
    }

    #[test]
    fn test_log_line_no_risks_marker() {
        let event = AuditEvent::new(AuditAction::NoRisks, "admin", None, None, None);
        assert!(event.log_line().ends_with(NO_RISKS_MARKER));
    }

    #[test]
    fn test_json_line_roundtrip_keeps_hash() {
        let event = AuditEvent::new(
            AuditAction::Compare { changed: true },
            "reviewer",
            Some(hash_document(b"abc")),
            None,
            Some("two uploads".to_string()),
        );
        let line = event.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let restored = AuditEvent::from_json_line(&line).unwrap();
        assert_eq!(restored.compute_hash(), event.compute_hash());
    }
}
