use std::collections::HashSet;

use crate::{
    encoding::encode,
    index::IndexType,
    record::{Record, RecordType},
    result::{RecordSetError, SetResult},
};

type KeyFunc<T> = Box<dyn Fn(&T) -> SetResult<Vec<u8>> + Send + Sync>;

pub(crate) enum ConstraintInner<T: RecordType + 'static> {
    /// Unique constraint over a computed key.
    Unique { name: String, key_func: KeyFunc<T> },
    /// Constraint based on closure check.
    Check(fn(&T) -> bool),
}

/// A rule every record of a set must satisfy, enforced while the set is built.
pub struct Constraint<T: RecordType + 'static>(pub(crate) ConstraintInner<T>);

impl<T: RecordType> Constraint<T> {
    /// No two records may produce the same key.
    pub fn unique<I: IndexType>(
        name: &str,
        key_func: impl Fn(&T) -> I + Send + Sync + 'static,
    ) -> Self {
        Self(ConstraintInner::Unique {
            name: name.to_owned(),
            key_func: Box::new(move |data| encode(&key_func(data))),
        })
    }

    pub fn check(check: fn(&T) -> bool) -> Self {
        Self(ConstraintInner::Check(check))
    }

    pub(crate) fn unique_name(&self) -> Option<&str> {
        match &self.0 {
            ConstraintInner::Unique { name, .. } => Some(name),
            ConstraintInner::Check(_) => None,
        }
    }
}

/// A constraint together with the keys it has already seen.
pub(crate) struct ConstraintState<T: RecordType + 'static> {
    constraint: Constraint<T>,
    seen: HashSet<Vec<u8>>,
}

impl<T: RecordType> ConstraintState<T> {
    pub fn new(constraint: Constraint<T>) -> Self {
        Self {
            constraint,
            seen: HashSet::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.constraint.unique_name()
    }

    /// Validate a record without remembering it.
    pub fn validate(&self, record: &Record<T>) -> SetResult<Option<Vec<u8>>> {
        match &self.constraint.0 {
            ConstraintInner::Unique { name, key_func } => {
                let key = key_func(&record.data)?;
                if self.seen.contains(&key) {
                    return Err(RecordSetError::Exists {
                        constraint: name.clone(),
                        id: record.id,
                    });
                }
                Ok(Some(key))
            }
            ConstraintInner::Check(condition) => {
                if condition(&record.data) {
                    Ok(None)
                } else {
                    Err(RecordSetError::Condition)
                }
            }
        }
    }

    /// Remember a key returned by [`Self::validate`].
    pub fn commit(&mut self, key: Option<Vec<u8>>) {
        if let Some(key) = key {
            self.seen.insert(key);
        }
    }
}
