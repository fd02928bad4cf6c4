//! Compendium import pass
//!
//! Replaces the full contents of a compendium pack with the records of
//! a JSON resource: resolve the pack handle, delete every entry the
//! index currently lists, then create one entry per record in file
//! order. Every host call is issued and awaited sequentially; there is
//! no atomicity and no rollback. A failure partway leaves the pack in a
//! mixed state, and the returned error records how far the pass got.

use std::fmt;

use serde_json::Value;

use crate::error::{ImportError, Result};
use crate::host::CompendiumRegistry;
use crate::pack::PackRef;
use crate::resource::record_name;

/// Options for one import pass
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Resolve, enumerate, and report without deleting or creating
    pub dry_run: bool,
}

/// Outcome of a completed import pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub pack: String,
    pub deleted: usize,
    pub created: usize,
    pub dry_run: bool,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(
                f,
                "dry run for pack '{}': {} entries would be deleted, {} records would be imported",
                self.pack, self.deleted, self.created
            )
        } else {
            write!(
                f,
                "replaced pack '{}': {} entries deleted, {} records imported",
                self.pack, self.deleted, self.created
            )
        }
    }
}

/// Replace the contents of `pack` with `records`.
///
/// Call order: registry snapshot, handle lookup, index enumeration,
/// sequential deletes in the host's enumeration order, sequential
/// creates in file order. An unresolvable pack fails before any write;
/// a failed delete aborts before any create.
pub async fn import_records(
    registry: &dyn CompendiumRegistry,
    pack: &PackRef,
    records: &[Value],
    options: &ImportOptions,
) -> Result<ImportSummary> {
    let snapshot = registry.packs().await?;
    tracing::info!("host registry holds {} packs", snapshot.len());
    tracing::debug!("registry snapshot: {:?}", snapshot);

    let qualified = pack.qualified();
    let handle = registry
        .lookup(pack)
        .await?
        .ok_or_else(|| ImportError::PackNotFound(qualified.clone()))?;

    let index = handle.get_index().await?;
    tracing::info!("pack {} currently holds {} entries", qualified, index.len());
    tracing::debug!(
        "pre-deletion index: {:?}",
        index.iter().map(|e| e.id.as_str()).collect::<Vec<_>>()
    );

    if options.dry_run {
        tracing::info!(
            "dry run: would delete {} entries and import {} records into {}",
            index.len(),
            records.len(),
            qualified
        );
        return Ok(ImportSummary {
            pack: qualified,
            deleted: index.len(),
            created: records.len(),
            dry_run: true,
        });
    }

    let mut deleted = 0;
    for entry in &index {
        handle
            .delete_entry(&entry.id)
            .await
            .map_err(|source| ImportError::DeleteEntry {
                id: entry.id.clone(),
                deleted,
                source: Box::new(source),
            })?;
        deleted += 1;
    }

    let total = records.len();
    let mut created = 0;
    for record in records {
        let name = record_name(record);
        handle
            .create_entry(record)
            .await
            .map_err(|source| ImportError::CreateEntry {
                name: name.to_string(),
                created,
                total,
                source: Box::new(source),
            })?;
        created += 1;
        tracing::info!("imported record '{}' into pack {}", name, handle.collection());
    }

    Ok(ImportSummary {
        pack: qualified,
        deleted,
        created,
        dry_run: false,
    })
}
