use async_trait::async_trait;
use trusted_zones_sdk::CorruptState;

use super::document::ProfileDocument;

/// A document as read from storage.
#[derive(Debug, Clone)]
pub struct LoadedProfile {
    /// Parsed document, or defaults when nothing is stored or the stored copy is corrupt.
    pub document: ProfileDocument,
    pub corrupt: Option<CorruptState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { revision: u64 },
    /// The stored revision no longer matches the one the document was read at.
    Conflict { found: u64 },
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn load(&self) -> anyhow::Result<LoadedProfile>;

    /// Persist the whole document if the stored revision still equals
    /// `document.revision`. The stored copy is written with the next revision.
    async fn save(&self, document: &ProfileDocument) -> anyhow::Result<SaveOutcome>;
}

#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn load_theme(&self) -> anyhow::Result<Option<String>>;

    async fn save_theme(&self, value: &str) -> anyhow::Result<()>;
}
