use std::any::Any;
use std::collections::HashSet;

use tracing::debug;

use crate::{
    index::{AnyIndex, Index, IndexType},
    record::{Record, RecordId, RecordType},
    result::{RecordSetError, SetResult},
    set::RecordSet,
};

pub enum QueryOperator {
    And,
    Or,
}

/// Combines lookups on several indexes of the same set.
pub struct QueryBuilder<T>
where
    T: RecordType + 'static,
{
    set: RecordSet<T>,
    search_conditions: Vec<(Box<dyn AnyIndex<T>>, Box<dyn Any>)>,
    /// Names of indexes built over some other set.
    foreign_indexes: Vec<String>,
}

impl<T> QueryBuilder<T>
where
    T: RecordType,
{
    pub fn new(set: &RecordSet<T>) -> Self {
        Self {
            set: set.clone(),
            search_conditions: Vec::new(),
            foreign_indexes: Vec::new(),
        }
    }

    /// Add a lookup on `index`.
    ///
    /// The index must belong to the queried set (or a clone of it), otherwise
    /// [`Self::select`] fails.
    pub fn by<I: IndexType + 'static>(mut self, index: &Index<T, I>, value: I) -> Self {
        if !index.belongs_to(&self.set) {
            self.foreign_indexes.push(index.name().to_owned());
        }

        self.search_conditions
            .push((Box::new(index.clone()), Box::new(value)));

        self
    }

    pub fn select(self, op: QueryOperator) -> SetResult<Vec<Record<T>>> {
        if self.search_conditions.is_empty() {
            return Err(RecordSetError::QueryBuilder(
                "no search conditions were given".to_owned(),
            ));
        }

        if !self.foreign_indexes.is_empty() {
            return Err(RecordSetError::QueryBuilder(format!(
                "indexes {:?} were built over a different set",
                self.foreign_indexes
            )));
        }

        let indexes: Vec<String> = self
            .search_conditions
            .iter()
            .map(|(index, _)| index.idx_name())
            .collect();

        let result_list = self
            .search_conditions
            .into_iter()
            .map(|(index, value)| index.search(value))
            .collect::<SetResult<Vec<Vec<Record<T>>>>>()?;

        let selected = match op {
            QueryOperator::And => {
                let mut results = result_list.into_iter();
                let mut intersection = results.next().unwrap_or_default();
                for other_result in results {
                    let ids: HashSet<RecordId> =
                        other_result.iter().map(|record| record.id).collect();
                    intersection.retain(|record| ids.contains(&record.id));
                }
                intersection
            }
            QueryOperator::Or => {
                let mut seen = HashSet::new();
                result_list
                    .into_iter()
                    .flatten()
                    .filter(|record| seen.insert(record.id))
                    .collect()
            }
        };

        debug!(?indexes, selected = selected.len(), "query select");

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RecordSet<String> {
        RecordSet::builder()
            .insert("value1".to_string())
            .unwrap()
            .insert("value2".to_string())
            .unwrap()
            .build()
    }

    #[test]
    fn query_builder_select_and() {
        let set = sample();

        let index = set.create_index("name", |value| value.to_owned()).unwrap();

        let selected_records = QueryBuilder::new(&set)
            .by(&index, "value1".to_string())
            .by(&index, "value2".to_string())
            .select(QueryOperator::And)
            .expect("Select failed");

        assert_eq!(selected_records.len(), 0);
    }

    #[test]
    fn query_builder_select_and_across_indexes() {
        let set = sample();

        let index = set.create_index("name", |value| value.to_owned()).unwrap();
        let length = set.create_index("length", |value| value.len()).unwrap();

        let selected_records = QueryBuilder::new(&set)
            .by(&index, "value1".to_string())
            .by(&length, 6)
            .select(QueryOperator::And)
            .expect("Select failed");

        assert_eq!(selected_records.len(), 1);
        assert_eq!(selected_records[0].data, "value1");
    }

    #[test]
    fn query_builder_select_or() {
        let set = sample();

        let index = set.create_index("name", |value| value.to_owned()).unwrap();
        let length = set.create_index("length", |value| value.len()).unwrap();

        let selected_records = QueryBuilder::new(&set)
            .by(&index, "value1".to_string())
            .by(&length, 6)
            .select(QueryOperator::Or)
            .expect("Select failed");

        // value1 matches both conditions but is only returned once.
        let ids: Vec<RecordId> = selected_records.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn query_builder_without_conditions() {
        let set = sample();

        assert!(matches!(
            QueryBuilder::new(&set).select(QueryOperator::Or),
            Err(RecordSetError::QueryBuilder(_))
        ));
    }

    #[test]
    fn query_builder_rejects_index_of_other_set() {
        let set = RecordSet::builder()
            .insert_with_id(1, "mine".to_string())
            .unwrap()
            .build();
        // Same id, different data.
        let other = RecordSet::builder()
            .insert_with_id(1, "foreign".to_string())
            .unwrap()
            .build();

        let mine = set.create_index("name", |value| value.to_owned()).unwrap();
        let foreign = other
            .create_index("name", |value| value.to_owned())
            .unwrap();

        assert!(matches!(
            QueryBuilder::new(&set)
                .by(&foreign, "foreign".to_string())
                .select(QueryOperator::Or),
            Err(RecordSetError::QueryBuilder(_))
        ));

        assert!(matches!(
            QueryBuilder::new(&set)
                .by(&mine, "mine".to_string())
                .by(&foreign, "foreign".to_string())
                .select(QueryOperator::And),
            Err(RecordSetError::QueryBuilder(_))
        ));
    }

    #[test]
    fn query_builder_accepts_index_of_cloned_set() {
        let set = sample();
        let index = set
            .clone()
            .create_index("name", |value| value.to_owned())
            .unwrap();

        let selected_records = QueryBuilder::new(&set)
            .by(&index, "value2".to_string())
            .select(QueryOperator::Or)
            .expect("Select failed");

        assert_eq!(selected_records.len(), 1);
        assert_eq!(selected_records[0].id, 2);
    }
}
