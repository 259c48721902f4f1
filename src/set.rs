use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use tracing::debug;

use crate::constraint::{Constraint, ConstraintState};
use crate::encoding::{decode, encode};
use crate::finder::find_by_id;
use crate::index::{Index, IndexInner, IndexType};
use crate::record::{Record, RecordId, RecordType};
use crate::result::{RecordSetError, SetResult};

/// An immutable, ordered set of records with unique ids.
///
/// Cloning is cheap: clones share the same records.
pub struct RecordSet<T: RecordType + 'static>(pub(crate) Arc<RecordSetInner<T>>);

impl<T: RecordType> Clone for RecordSet<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: RecordType> Deref for RecordSet<T> {
    type Target = Arc<RecordSetInner<T>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: RecordType> std::fmt::Debug for RecordSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.records.iter()).finish()
    }
}

pub struct RecordSetInner<T>
where
    T: RecordType + 'static,
{
    records: Vec<Record<T>>,
}

impl<T> RecordSetInner<T>
where
    T: RecordType,
{
    /// Find a record by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the record to find.
    ///
    /// # Returns
    ///
    /// An [`Option`] containing the record if it exists, or [`None`] otherwise.
    pub fn find_by_id(&self, id: RecordId) -> Option<&Record<T>> {
        find_by_id(&self.records, id)
    }

    pub fn contains_id(&self, id: RecordId) -> bool {
        self.find_by_id(id).is_some()
    }

    pub fn records(&self) -> &[Record<T>] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record<T>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encode the whole set, in order, into a byte snapshot.
    pub fn encode(&self) -> SetResult<Vec<u8>> {
        encode(&self.records)
    }
}

impl<T: RecordType> RecordSet<T> {
    pub fn builder() -> RecordSetBuilder<T> {
        RecordSetBuilder::new()
    }

    /// Build a set from records which already carry their ids.
    ///
    /// # Errors
    ///
    /// Returns [`RecordSetError::DuplicateId`] if two records share an id.
    pub fn from_records(records: impl IntoIterator<Item = Record<T>>) -> SetResult<Self> {
        records
            .into_iter()
            .try_fold(Self::builder(), |builder, record| {
                builder.insert_with_id(record.id, record.data)
            })
            .map(RecordSetBuilder::build)
    }

    /// Restore a set from a snapshot produced by [`RecordSetInner::encode`].
    ///
    /// Ids are validated again, a snapshot holding duplicates is rejected.
    pub fn decode(bytes: &[u8]) -> SetResult<Self> {
        let records: Vec<Record<T>> = decode(bytes)?;
        Self::from_records(records)
    }

    /// Create an index over the set.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the index.
    /// * `key_func` - A function which computes the index key for each record.
    ///
    /// # Returns
    ///
    /// An [`Index`] instance for the created index.
    pub fn create_index<I: IndexType>(
        &self,
        name: &str,
        key_func: impl Fn(&T) -> I + Send + Sync + 'static,
    ) -> SetResult<Index<T, I>> {
        Ok(Index(Arc::new(IndexInner::new(name, self, key_func)?)))
    }
}

/// Collects records and constraints, then freezes them into a [`RecordSet`].
pub struct RecordSetBuilder<T: RecordType + 'static> {
    records: Vec<Record<T>>,
    ids: HashSet<RecordId>,
    max_id: Option<RecordId>,
    constraints: Vec<ConstraintState<T>>,
}

impl<T: RecordType> Default for RecordSetBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RecordType> RecordSetBuilder<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            ids: HashSet::new(),
            max_id: None,
            constraints: Vec::new(),
        }
    }

    /// Add a constraint to the set.
    ///
    /// Records inserted before the constraint are checked against it as well.
    /// A unique constraint with an already registered name is ignored. A
    /// violation consumes the builder.
    ///
    /// # Arguments
    ///
    /// * `constraint` - The constraint to add.
    pub fn constraint(mut self, constraint: Constraint<T>) -> SetResult<Self> {
        if let Some(name) = constraint.unique_name() {
            if self.constraints.iter().any(|state| state.name() == Some(name)) {
                return Ok(self);
            }
        }

        let mut state = ConstraintState::new(constraint);
        for record in &self.records {
            let key = state.validate(record)?;
            state.commit(key);
        }

        self.constraints.push(state);
        Ok(self)
    }

    /// Insert a record with an explicit id.
    ///
    /// # Errors
    ///
    /// Fails if the id is taken or a constraint is violated. The builder is
    /// consumed by the failed call, records inserted before it are dropped
    /// along with it.
    pub fn insert_with_id(mut self, id: RecordId, data: T) -> SetResult<Self> {
        if self.ids.contains(&id) {
            return Err(RecordSetError::DuplicateId { id });
        }

        let record = Record { id, data };

        // Validate everything before committing any key.
        let keys = self
            .constraints
            .iter()
            .map(|state| state.validate(&record))
            .collect::<SetResult<Vec<_>>>()?;

        for (state, key) in self.constraints.iter_mut().zip(keys) {
            state.commit(key);
        }

        self.ids.insert(id);
        self.max_id = Some(self.max_id.map_or(id, |max| max.max(id)));
        self.records.push(record);

        Ok(self)
    }

    /// Insert a record, assigning it the id after the largest one so far.
    ///
    /// The first record of an empty builder gets id `1`. Errors consume the
    /// builder, as with [`Self::insert_with_id`].
    pub fn insert(self, data: T) -> SetResult<Self> {
        let id = match self.max_id {
            Some(max) => max.checked_add(1).ok_or(RecordSetError::IdOverflow)?,
            None => 1,
        };

        self.insert_with_id(id, data)
    }

    pub fn build(self) -> RecordSet<T> {
        debug!(
            records = self.records.len(),
            constraints = self.constraints.len(),
            "record set built"
        );

        RecordSet(Arc::new(RecordSetInner {
            records: self.records,
        }))
    }
}
