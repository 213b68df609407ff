use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ReconciledRow, Resolution};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewNote {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub notes: String,
}

/// Operator annotations keyed by canonical EID. Survives re-reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewBook {
    notes: BTreeMap<String, ReviewNote>,
}

impl ReviewBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotate(&mut self, eid: &str, resolution: Resolution, notes: impl Into<String>) {
        self.notes.insert(
            eid.trim().to_string(),
            ReviewNote {
                resolution,
                notes: notes.into(),
            },
        );
    }

    pub fn get(&self, eid: &str) -> Option<&ReviewNote> {
        self.notes.get(eid)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Thread annotations onto freshly reconciled rows. Notes for EIDs with no
/// row are kept in the book but have no effect.
pub fn apply_review(rows: Vec<ReconciledRow>, book: &ReviewBook) -> Vec<ReconciledRow> {
    rows.into_iter()
        .map(|mut row| {
            if let Some(note) = book.get(&row.eid) {
                row.resolution = note.resolution;
                row.notes = note.notes.clone();
            }
            row
        })
        .collect()
}
