use std::collections::BTreeMap;

use proptest::prelude::*;
use recordset::{find_by_id, Record, RecordId, RecordSet};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Person {
    name: String,
    age: u32,
}

impl Person {
    fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_owned(),
            age,
        }
    }
}

/// Records with unique ids, in an arbitrary order.
fn unique_records() -> impl Strategy<Value = Vec<Record<Person>>> {
    prop::collection::btree_map(any::<RecordId>(), ("[a-zA-Z]{1,12}", 0u32..130), 0..32)
        .prop_map(|map: BTreeMap<RecordId, (String, u32)>| {
            map.into_iter()
                .map(|(id, (name, age))| Record::new(id, Person { name, age }))
                .collect()
        })
        .prop_shuffle()
}

proptest! {
    #[test]
    fn every_record_is_found_by_its_id(records in unique_records()) {
        for record in &records {
            prop_assert_eq!(find_by_id(&records, record.id), Some(record));
        }
    }

    #[test]
    fn unknown_ids_are_absent(records in unique_records(), id in any::<RecordId>()) {
        prop_assume!(records.iter().all(|record| record.id != id));
        prop_assert!(find_by_id(&records, id).is_none());
    }

    #[test]
    fn empty_records_are_always_absent(id in any::<RecordId>()) {
        prop_assert!(find_by_id::<Person>(&[], id).is_none());
    }

    #[test]
    fn lookup_does_not_alter_records(records in unique_records(), id in any::<RecordId>()) {
        let before = records.clone();
        let _ = find_by_id(&records, id);
        prop_assert_eq!(records, before);
    }

    #[test]
    fn set_lookup_matches_slice_lookup(records in unique_records(), id in any::<RecordId>()) {
        let set = RecordSet::from_records(records.clone()).unwrap();

        prop_assert_eq!(set.find_by_id(id), find_by_id(&records, id));
        prop_assert_eq!(set.records(), records.as_slice());
    }
}

#[test]
fn sample_scenarios() {
    let people = RecordSet::from_records(vec![
        Record::new(1, Person::new("João", 25)),
        Record::new(2, Person::new("Maria", 30)),
        Record::new(3, Person::new("Pedro", 22)),
    ])
    .unwrap();

    assert_eq!(
        people.find_by_id(2),
        Some(&Record::new(2, Person::new("Maria", 30)))
    );
    assert_eq!(people.find_by_id(99), None);

    let empty: RecordSet<Person> = RecordSet::builder().build();
    assert_eq!(empty.find_by_id(1), None);
}
