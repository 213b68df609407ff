use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::model::EmployeeRecord;

/// Fold records sharing an EID: sum hours, union lines and badges.
///
/// Output is ordered by EID and independent of input order. When rows for
/// one EID disagree on the name, the lexicographically smallest non-empty
/// name is kept.
pub fn aggregate_records<I>(records: I) -> Vec<EmployeeRecord>
where
    I: IntoIterator<Item = EmployeeRecord>,
{
    let mut groups: BTreeMap<String, EmployeeRecord> = BTreeMap::new();

    for record in records {
        match groups.entry(record.eid.clone()) {
            Entry::Occupied(mut slot) => merge_into(slot.get_mut(), record),
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    groups.into_values().collect()
}

fn merge_into(existing: &mut EmployeeRecord, incoming: EmployeeRecord) {
    existing.total_hours += incoming.total_hours;
    existing.lines.extend(incoming.lines);
    existing.badges.extend(incoming.badges);
    existing.invalid_hours |= incoming.invalid_hours;
    existing.name = pick_name(&existing.eid, &existing.name, incoming.name);
}

fn pick_name(eid: &str, current: &str, incoming: String) -> String {
    let (a, b) = (current.trim(), incoming.trim());
    if b.is_empty() || a == b {
        return current.to_string();
    }
    if a.is_empty() {
        return incoming;
    }
    log::warn!("EID {eid}: conflicting names '{a}' and '{b}'");
    if b < a {
        incoming
    } else {
        current.to_string()
    }
}
