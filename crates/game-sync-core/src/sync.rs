use game_sync_models::{Identity, PlaytimeEntry, SyncReport};
use game_sync_sources::{PlaytimeSource, SourceError};
use tracing::{debug, info, warn};

/// What happened to one catalog entry. Skips keep their error for logging;
/// nothing about them reaches the report.
enum EntryOutcome {
    Recorded(PlaytimeEntry),
    Dropped,
    Skipped(SourceError),
}

/// Run one full sync against `source`.
///
/// The session is released on every exit path, whether the sync succeeded,
/// partially succeeded, or failed outright.
pub async fn sync_playtime<S: PlaytimeSource>(source: &mut S) -> Result<SyncReport, SourceError> {
    let result = run_sync(source).await;
    source.close().await;
    result
}

async fn run_sync<S: PlaytimeSource>(source: &mut S) -> Result<SyncReport, SourceError> {
    source.authenticate().await?;

    let identity = source.resolve_identity().await?;
    debug!(
        source = source.source_name(),
        user = %identity.display_name,
        "resolved identity"
    );

    let catalog = source.fetch_catalog(&identity).await?;
    info!(
        source = source.source_name(),
        titles = catalog.len(),
        "fetched owned-game catalog"
    );

    let mut games = Vec::with_capacity(catalog.len());
    let mut dropped = 0usize;
    let mut skipped = 0usize;

    for entry in &catalog {
        match enrich_entry(source, &identity, entry).await {
            EntryOutcome::Recorded(record) => games.push(record),
            EntryOutcome::Dropped => dropped += 1,
            EntryOutcome::Skipped(err) => {
                // One bad record must never abort the batch.
                warn!(
                    source = source.source_name(),
                    error = %err,
                    "skipping title after failed detail lookup"
                );
                skipped += 1;
            }
        }
    }

    info!(
        source = source.source_name(),
        reported = games.len(),
        dropped,
        skipped,
        "sync finished"
    );

    Ok(SyncReport {
        user_name: identity.display_name,
        games,
    })
}

async fn enrich_entry<S: PlaytimeSource>(
    source: &S,
    identity: &Identity,
    entry: &S::Entry,
) -> EntryOutcome {
    match source.enrich(identity, entry).await {
        Ok(detail) => match source.normalize(entry, detail) {
            Some(record) => EntryOutcome::Recorded(record),
            None => EntryOutcome::Dropped,
        },
        Err(err) => EntryOutcome::Skipped(err),
    }
}
