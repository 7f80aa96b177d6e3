//! Checkpoint and restore for entity contexts.
//!
//! A [`Checkpoint`] captures everything about an entity except its
//! observers, which are closures and cannot be serialized. Restoring
//! validates the snapshot first and reports every inconsistency at once.

use crate::config::EngineConfig;
use crate::core::{Metadata, State, StateHistory};
use crate::machine::EntityContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use uuid::Uuid;

pub mod error;

pub use error::{CheckpointError, CheckpointIssue};

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of an entity context.
/// Does NOT include observers (not serializable).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Checkpoint<S: State> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Identifier of the entity
    pub entity_id: String,

    pub description: String,

    /// Current state of the entity
    pub current_state: S,

    /// Complete transition history
    pub history: StateHistory<S>,

    /// Entity metadata; binary encodings carry it as JSON text
    #[serde(with = "metadata_as_json")]
    pub metadata: Metadata,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl<S: State> Checkpoint<S> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Check the snapshot for consistency, accumulating ALL issues.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<CheckpointIssue>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<CheckpointIssue>>> = Vec::new();

        checks.push(if self.version == CHECKPOINT_VERSION {
            Validation::success(())
        } else {
            Validation::fail(CheckpointIssue::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            })
        });

        let events = self.history.events();
        match (events.first(), events.last()) {
            (Some(first), Some(last)) => {
                if let Some(from) = &first.from {
                    checks.push(Validation::fail(CheckpointIssue::FirstEntryHasSource {
                        from: from.name().to_string(),
                    }));
                }
                if first.to != S::initial() {
                    checks.push(Validation::fail(CheckpointIssue::WrongInitialState {
                        found: first.to.name().to_string(),
                        expected: S::initial().name().to_string(),
                    }));
                }
                if last.to != self.current_state {
                    checks.push(Validation::fail(CheckpointIssue::StateMismatch {
                        current: self.current_state.name().to_string(),
                        last: last.to.name().to_string(),
                    }));
                }
            }
            _ => checks.push(Validation::fail(CheckpointIssue::EmptyHistory)),
        }

        for (offset, pair) in events.windows(2).enumerate() {
            let index = offset + 1;
            let (previous, entry) = (&pair[0], &pair[1]);
            if entry.from.as_ref() != Some(&previous.to) {
                checks.push(Validation::fail(CheckpointIssue::DisconnectedHistory {
                    index,
                    from: entry.from_name().to_string(),
                    previous: previous.to.name().to_string(),
                }));
            }
            if entry.timestamp < previous.timestamp {
                checks.push(Validation::fail(CheckpointIssue::TimestampsOutOfOrder { index }));
            }
        }

        if self.updated_at < self.created_at {
            checks.push(Validation::fail(CheckpointIssue::UpdatedBeforeCreated));
        }

        Validation::all_vec(checks).map(|_| ())
    }
}

impl<S: State> EntityContext<S> {
    /// Snapshot this entity.
    pub fn checkpoint(&self) -> Checkpoint<S> {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            entity_id: self.id().to_string(),
            description: self.description().to_string(),
            current_state: self.current_state().clone(),
            history: self.history().clone(),
            metadata: self.metadata().clone(),
            created_at: self.created_at(),
            updated_at: self.updated_at(),
        }
    }

    /// Rebuild an entity from a checkpoint with the default configuration.
    ///
    /// The restored entity has no observers.
    pub fn restore(checkpoint: Checkpoint<S>) -> Result<Self, CheckpointError> {
        Self::restore_with_config(checkpoint, EngineConfig::default())
    }

    pub fn restore_with_config(
        checkpoint: Checkpoint<S>,
        config: EngineConfig,
    ) -> Result<Self, CheckpointError> {
        if let Validation::Failure(issues) = checkpoint.validate() {
            return Err(CheckpointError::ValidationFailed(
                issues.iter().map(ToString::to_string).collect(),
            ));
        }

        Ok(Self::from_checkpoint(checkpoint, config))
    }
}

mod metadata_as_json {
    use crate::core::Metadata;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<Ser: Serializer>(
        metadata: &Metadata,
        serializer: Ser,
    ) -> Result<Ser::Ok, Ser::Error> {
        if serializer.is_human_readable() {
            return metadata.serialize(serializer);
        }
        let json = serde_json::to_string(metadata).map_err(serde::ser::Error::custom)?;
        json.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Metadata, D::Error> {
        if deserializer.is_human_readable() {
            return Metadata::deserialize(deserializer);
        }
        let json = String::deserialize(deserializer)?;
        serde_json::from_str(&json).map_err(serde::de::Error::custom)
    }
}
