//! Operator-declared identifier merges.
//!
//! The map is flattened on every write: no canonical value is ever itself a
//! key, so [`AliasMap::resolve`] needs a single lookup and applying the map
//! twice changes nothing.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::aggregate::aggregate_records;
use crate::error::ReconError;
use crate::model::EmployeeRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasMap {
    entries: BTreeMap<String, String>,
}

/// What a successful merge changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Target after resolving the requested canonical through the map.
    pub canonical: String,
    /// Identifiers newly pointed at `canonical`.
    pub added: Vec<String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<'a>(&'a self, eid: &'a str) -> &'a str {
        self.entries.get(eid).map(String::as_str).unwrap_or(eid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Declare that every id in `ids` is the employee `canonical`.
    ///
    /// Ids are trimmed but otherwise taken verbatim. On error the map is
    /// left untouched.
    pub fn merge_identifiers<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        canonical: &str,
    ) -> Result<MergeOutcome, ReconError> {
        let canonical = canonical.trim();
        if canonical.is_empty() {
            return Err(ReconError::InvalidMergeRequest(
                "canonical identifier is empty".into(),
            ));
        }

        let mut distinct: Vec<&str> = Vec::new();
        for id in ids.iter().map(|s| s.as_ref().trim()) {
            if !id.is_empty() && !distinct.contains(&id) {
                distinct.push(id);
            }
        }
        if distinct.len() < 2 {
            return Err(ReconError::InvalidMergeRequest(format!(
                "need at least two distinct identifiers, got {}",
                distinct.len()
            )));
        }

        let target = self.resolve(canonical).to_string();
        let mut added = Vec::new();

        for id in distinct {
            if id == target {
                continue;
            }
            for value in self.entries.values_mut() {
                if *value == id {
                    *value = target.clone();
                }
            }
            let previous = self.entries.insert(id.to_string(), target.clone());
            if previous.as_deref() != Some(target.as_str()) {
                added.push(id.to_string());
            }
        }

        log::debug!("merged {:?} into {}", added, target);
        Ok(MergeOutcome { canonical: target, added })
    }
}

/// Rewrite every EID through `map` and re-aggregate.
///
/// When records fold together, a non-empty name from the record that
/// already carried the canonical EID takes precedence.
pub fn apply_aliases(records: Vec<EmployeeRecord>, map: &AliasMap) -> Vec<EmployeeRecord> {
    if map.is_empty() {
        return records;
    }

    let mut canonical_names: HashMap<String, String> = HashMap::new();
    let rewritten: Vec<EmployeeRecord> = records
        .into_iter()
        .map(|mut record| {
            let target = map.resolve(&record.eid).to_string();
            if target == record.eid {
                if !record.name.trim().is_empty() {
                    canonical_names.insert(target, record.name.clone());
                }
            } else {
                record.eid = target;
            }
            record
        })
        .collect();

    let mut merged = aggregate_records(rewritten);
    for record in &mut merged {
        if let Some(name) = canonical_names.remove(&record.eid) {
            record.name = name;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hours::Hours;

    fn rec(eid: &str, name: &str, hours: i64) -> EmployeeRecord {
        EmployeeRecord::new(eid, name, Hours::from_centi(hours * 100))
    }

    #[test]
    fn merge_points_ids_at_canonical() {
        let mut map = AliasMap::new();
        let outcome = map.merge_identifiers(&["111", "222"], "111").unwrap();
        assert_eq!(outcome.canonical, "111");
        assert_eq!(outcome.added, vec!["222"]);
        assert_eq!(map.resolve("222"), "111");
        assert_eq!(map.resolve("111"), "111");
        assert_eq!(map.resolve("333"), "333");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn canonical_need_not_be_listed() {
        let mut map = AliasMap::new();
        map.merge_identifiers(&[" 111 ", "222"], " 999").unwrap();
        assert_eq!(map.resolve("111"), "999");
        assert_eq!(map.resolve("222"), "999");
    }

    #[test]
    fn rejects_degenerate_requests() {
        let mut map = AliasMap::new();
        assert!(matches!(
            map.merge_identifiers(&["111"], "111"),
            Err(ReconError::InvalidMergeRequest(_))
        ));
        assert!(map.merge_identifiers(&["111", " 111", ""], "111").is_err());
        assert!(map.merge_identifiers(&["111", "222"], "  ").is_err());
        assert!(map.is_empty());
    }

    #[test]
    fn chained_merges_stay_flat() {
        let mut map = AliasMap::new();
        map.merge_identifiers(&["111", "222"], "222").unwrap();
        map.merge_identifiers(&["222", "333"], "333").unwrap();
        assert_eq!(map.resolve("111"), "333");
        assert_eq!(map.resolve("222"), "333");
        assert!(map.iter().all(|(_, v)| map.resolve(v) == v));
    }

    #[test]
    fn canonical_is_resolved_before_write() {
        let mut map = AliasMap::new();
        map.merge_identifiers(&["111", "222"], "222").unwrap();
        let outcome = map.merge_identifiers(&["333", "444"], "111").unwrap();
        assert_eq!(outcome.canonical, "222");
        assert_eq!(map.resolve("444"), "222");
    }

    #[test]
    fn reversing_a_merge_leaves_no_cycle() {
        let mut map = AliasMap::new();
        map.merge_identifiers(&["111", "222"], "111").unwrap();
        map.merge_identifiers(&["111", "222"], "222").unwrap();
        // "222" resolves to "111" before the write, so the target stays put.
        assert_eq!(map.resolve("222"), "111");
        assert!(map.iter().all(|(k, v)| k != v));
    }

    #[test]
    fn repeated_merge_reports_nothing_added() {
        let mut map = AliasMap::new();
        map.merge_identifiers(&["111", "222"], "111").unwrap();
        let before = map.clone();

        let outcome = map.merge_identifiers(&["111", "222"], "222").unwrap();
        assert_eq!(outcome.canonical, "111");
        assert!(outcome.added.is_empty());
        assert_eq!(map, before);

        let outcome = map.merge_identifiers(&["222", "333"], "111").unwrap();
        assert_eq!(outcome.added, vec!["333"]);
    }

    #[test]
    fn apply_sums_and_prefers_canonical_name() {
        let mut map = AliasMap::new();
        map.merge_identifiers(&["111", "222"], "222").unwrap();
        let out = apply_aliases(
            vec![
                rec("111", "Alpha Doe", 8).with_line("12"),
                rec("222", "Zulu Doe", 4).with_line("14"),
                rec("333", "Other", 1),
            ],
            &map,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].eid, "222");
        assert_eq!(out[0].total_hours, Hours::from_centi(1200));
        assert_eq!(out[0].name, "Zulu Doe");
        assert_eq!(out[0].lines_display().as_deref(), Some("12, 14"));
    }

    #[test]
    fn apply_is_idempotent() {
        let mut map = AliasMap::new();
        map.merge_identifiers(&["1", "2", "3"], "1").unwrap();
        let records = vec![
            rec("1", "", 1),
            rec("2", "", 2),
            rec("3", "", 3),
        ];
        let once = apply_aliases(records, &map);
        let twice = apply_aliases(once.clone(), &map);
        assert_eq!(once, twice);
        assert_eq!(once[0].total_hours, Hours::from_centi(600));
    }
}
