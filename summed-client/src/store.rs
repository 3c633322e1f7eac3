use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::ExtractedMetadata;

/// Where the metadata of one document stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchState {
    /// A summary request is in flight. `previous` is what was shown before it started.
    Pending {
        ticket: Uuid,
        previous: Option<ExtractedMetadata>,
    },
    Ready(ExtractedMetadata),
    Failed(String),
}

impl FetchState {
    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Pending { .. })
    }

    /// Metadata worth displaying, if any
    pub fn metadata(&self) -> Option<&ExtractedMetadata> {
        match self {
            FetchState::Ready(metadata) => Some(metadata),
            FetchState::Pending { previous, .. } => previous.as_ref(),
            FetchState::Failed(_) => None,
        }
    }
}

/// Extracted metadata keyed by source file name.
///
/// Every fetch writes only its own key, and only while its ticket is the latest
/// one issued for that key, so a slow response can never overwrite a newer one.
#[derive(Clone, Debug, Default)]
pub struct MetadataStore {
    entries: Arc<DashMap<String, FetchState>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<FetchState> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Store a finished result directly, superseding any fetch in flight
    pub fn put(&self, key: impl Into<String>, metadata: ExtractedMetadata) {
        self.entries.insert(key.into(), FetchState::Ready(metadata));
    }

    /// Mark `key` as pending and return the ticket its response must present
    pub fn begin(&self, key: impl Into<String>) -> Uuid {
        let ticket = Uuid::new_v4();
        let key = key.into();

        let previous = self
            .entries
            .get(&key)
            .and_then(|entry| entry.metadata().cloned());
        self.entries
            .insert(key, FetchState::Pending { ticket, previous });

        ticket
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    ///
    /// On failure the entry falls back to what was shown before the fetch, or
    /// `Failed` when nothing was. Returns false when the ticket is stale.
    pub fn complete(
        &self,
        key: &str,
        ticket: Uuid,
        outcome: std::result::Result<ExtractedMetadata, String>,
    ) -> bool {
        let Some(mut entry) = self.entries.get_mut(key) else {
            debug!("Dropping response for unknown key {}", key);
            return false;
        };

        let previous = match &*entry {
            FetchState::Pending {
                ticket: current,
                previous,
            } if *current == ticket => previous.clone(),
            _ => {
                debug!("Dropping stale response for {}", key);
                return false;
            }
        };

        *entry = match outcome {
            Ok(metadata) => FetchState::Ready(metadata),
            Err(reason) => match previous {
                Some(metadata) => FetchState::Ready(metadata),
                None => FetchState::Failed(reason),
            },
        };
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
