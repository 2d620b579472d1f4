use crate::error::SourceError;
use async_trait::async_trait;
use game_sync_models::{Identity, PlaytimeEntry};

/// Platform policy for one playtime backend.
///
/// Both backends share the same pipeline shape (authenticate, resolve the
/// account, walk the owned-game catalog, enrich each title, normalize) but
/// agree on none of the wire shapes, so catalog entries and detail records
/// are associated types and the per-platform rules live in the impls.
#[async_trait]
pub trait PlaytimeSource: Send {
    /// Raw catalog record for one owned title.
    type Entry: Send + Sync;

    /// Result of the secondary lookup performed per catalog entry.
    type Detail: Send;

    fn source_name(&self) -> &str;

    /// Establish the network session from the credentials the client was
    /// constructed with. Must be called before anything else.
    async fn authenticate(&mut self) -> Result<(), SourceError>;

    async fn resolve_identity(&self) -> Result<Identity, SourceError>;

    /// Fetch the owned-game catalog, already filtered to real base titles.
    async fn fetch_catalog(&self, identity: &Identity) -> Result<Vec<Self::Entry>, SourceError>;

    /// Secondary lookup for one catalog entry. Errors here are isolated per
    /// entry by the pipeline; they never abort the sync.
    async fn enrich(
        &self,
        identity: &Identity,
        entry: &Self::Entry,
    ) -> Result<Self::Detail, SourceError>;

    /// Map a successfully enriched entry into the report shape. `None` means
    /// the platform's policy drops the record (it is not an error).
    fn normalize(&self, entry: &Self::Entry, detail: Self::Detail) -> Option<PlaytimeEntry>;

    /// Release the network session. Called exactly once per sync on every
    /// exit path; must be idempotent and safe after a failed call.
    async fn close(&mut self);
}
