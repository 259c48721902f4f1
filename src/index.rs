use std::any::Any;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::encoding::encode;
use crate::record::{Record, RecordType};
use crate::result::{RecordSetError, SetResult};
use crate::set::RecordSet;

pub trait IndexType: Serialize + DeserializeOwned {}
impl<T: Serialize + DeserializeOwned> IndexType for T {}

/// A secondary index of a [`RecordSet`].
///
/// # Type Parameters
///
/// * `T` - The type of the data stored in the set.
/// * `I` - The type of the index key.
pub struct Index<T: RecordType + 'static, I: IndexType>(pub(crate) Arc<IndexInner<T, I>>);

impl<T: RecordType, I: IndexType> Clone for Index<T, I> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: RecordType, I: IndexType> Deref for Index<T, I> {
    type Target = Arc<IndexInner<T, I>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub struct IndexInner<T: RecordType + 'static, I: IndexType> {
    name: String,
    set: RecordSet<T>,
    /// Function which computes the key of each record.
    key_func: Box<dyn Fn(&T) -> I + Send + Sync>,
    /// Encoded key to positions in the set, each key can have multiple matching records.
    entries: BTreeMap<Vec<u8>, Vec<usize>>,
}

impl<T: RecordType, I: IndexType> IndexInner<T, I> {
    pub(crate) fn new(
        name: &str,
        set: &RecordSet<T>,
        key_func: impl Fn(&T) -> I + Send + Sync + 'static,
    ) -> SetResult<Self> {
        let mut entries: BTreeMap<Vec<u8>, Vec<usize>> = BTreeMap::new();

        // The set never changes, so the index is built exactly once.
        for (position, record) in set.iter().enumerate() {
            entries
                .entry(encode(&key_func(&record.data))?)
                .or_default()
                .push(position);
        }

        debug!(index = name, keys = entries.len(), "index built");

        Ok(Self {
            name: name.to_owned(),
            set: set.clone(),
            key_func: Box::new(key_func),
            entries,
        })
    }

    /// Query by index key.
    ///
    /// This method returns every [`Record`] matching the key provided, in set order.
    ///
    /// # Arguments
    ///
    /// * `query` - A reference to the query key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key could not be encoded.
    pub fn select(&self, query: &I) -> SetResult<Vec<Record<T>>> {
        let results: Vec<Record<T>> = match self.entries.get(&encode(query)?) {
            Some(positions) => positions
                .iter()
                .filter_map(|position| self.set.records().get(*position).cloned())
                .collect(),
            None => Vec::new(),
        };

        trace!(index = %self.name, matches = results.len(), "index select");

        Ok(results)
    }

    /// Check if a record matches the built index key.
    pub fn exists_record(&self, record: &Record<T>) -> SetResult<bool> {
        self.exists(&(self.key_func)(&record.data))
    }

    /// Check if a record exists by the key.
    pub fn exists(&self, key: &I) -> SetResult<bool> {
        Ok(self.entries.contains_key(&encode(key)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this index was built over `set` or one of its clones.
    pub fn belongs_to(&self, set: &RecordSet<T>) -> bool {
        Arc::ptr_eq(&self.set.0, &set.0)
    }
}

/// Type which [`Index`] can be casted to which doesn't require the `I` type parameter.
pub(crate) trait AnyIndex<T: RecordType> {
    fn search(&self, value: Box<dyn Any>) -> SetResult<Vec<Record<T>>>;
    fn idx_name(&self) -> String;
}

impl<T, I> AnyIndex<T> for Index<T, I>
where
    T: RecordType,
    I: IndexType + 'static,
{
    fn search(&self, value: Box<dyn Any>) -> SetResult<Vec<Record<T>>> {
        let key = value.downcast::<I>().map_err(|_| {
            RecordSetError::QueryBuilder(format!("key type does not match index {}", self.name))
        })?;
        self.select(&key)
    }

    fn idx_name(&self) -> String {
        self.name.clone()
    }
}
