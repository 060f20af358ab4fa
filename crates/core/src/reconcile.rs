//! Set reconciliation between a submitted sheet and the persisted rows.
//!
//! For each sub-entity collection, submitted items are classified by id
//! against the set of ids currently persisted for the owning character:
//! a null id is an insert, a matching id an update, and every persisted
//! id that does not reappear in the submission becomes a delete. An item
//! is assigned exactly one fate per call and never reclassified.
//!
//! A submitted non-null id that matches no persisted row is rejected as
//! a validation error: it means the client's view of the sheet has
//! drifted, and silently dropping or re-inserting the item would lose
//! data either way.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::sheet::{CharacterSheet, Language, Rank, Reputation};
use crate::types::DbId;

/// Accessor for a sub-entity's optional persisted id, plus a display
/// name for error messages.
pub trait SubEntity {
    const ENTITY: &'static str;

    fn id(&self) -> Option<DbId>;
}

impl SubEntity for Language {
    const ENTITY: &'static str = "language";

    fn id(&self) -> Option<DbId> {
        self.id
    }
}

impl SubEntity for Reputation {
    const ENTITY: &'static str = "reputation";

    fn id(&self) -> Option<DbId> {
        self.id
    }
}

impl SubEntity for Rank {
    const ENTITY: &'static str = "rank";

    fn id(&self) -> Option<DbId> {
        self.id
    }
}

/// Insert/update/delete sets for one sub-entity collection.
///
/// Updates carry the persisted id alongside the item so the caller never
/// has to unwrap an `Option` that classification already proved present.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDiff<T> {
    pub inserts: Vec<T>,
    pub updates: Vec<(DbId, T)>,
    pub deletes: Vec<DbId>,
}

/// Persisted sub-entity id sets for one character, read before an update.
#[derive(Debug, Clone, Default)]
pub struct PersistedIds {
    pub languages: HashSet<DbId>,
    pub reputations: HashSet<DbId>,
    pub ranks: HashSet<DbId>,
}

/// The full reconciliation plan for one character update.
#[derive(Debug)]
pub struct SheetDiff {
    pub languages: CollectionDiff<Language>,
    pub reputations: CollectionDiff<Reputation>,
    pub ranks: CollectionDiff<Rank>,
}

impl SheetDiff {
    /// Diff every collection of `sheet` against `persisted`. Fails on the
    /// first stale or duplicated submitted id; no partial plan is returned.
    pub fn compute(sheet: &CharacterSheet, persisted: &PersistedIds) -> Result<Self, CoreError> {
        Ok(Self {
            languages: diff_collection(&sheet.languages, &persisted.languages)?,
            reputations: diff_collection(&sheet.reputations, &persisted.reputations)?,
            ranks: diff_collection(&sheet.ranks, &persisted.ranks)?,
        })
    }
}

/// Classify one submitted collection against its persisted id set.
///
/// Deletions are derived purely as the set difference `persisted minus
/// submitted ids`; a submitted item never becomes a delete target.
pub fn diff_collection<T: SubEntity + Clone>(
    submitted: &[T],
    persisted: &HashSet<DbId>,
) -> Result<CollectionDiff<T>, CoreError> {
    let mut inserts = Vec::new();
    let mut updates = Vec::new();
    let mut submitted_ids = HashSet::new();

    for item in submitted {
        match item.id() {
            None => inserts.push(item.clone()),
            Some(id) => {
                if !submitted_ids.insert(id) {
                    return Err(CoreError::Validation(format!(
                        "duplicate {} id {id} in submitted collection",
                        T::ENTITY
                    )));
                }
                if !persisted.contains(&id) {
                    return Err(CoreError::Validation(format!(
                        "submitted {} id {id} does not match any persisted row",
                        T::ENTITY
                    )));
                }
                updates.push((id, item.clone()));
            }
        }
    }

    // Sorted so the delete statements run in a deterministic order.
    let mut deletes: Vec<DbId> = persisted
        .iter()
        .copied()
        .filter(|id| !submitted_ids.contains(id))
        .collect();
    deletes.sort_unstable();

    Ok(CollectionDiff {
        inserts,
        updates,
        deletes,
    })
}
