use thiserror::Error;

use crate::record::RecordId;

#[derive(Error, Debug)]
pub enum RecordSetError {
    #[error("serializer error")]
    Serializer(#[from] bincode::Error),
    #[error("record id {id} is already present in the set")]
    DuplicateId { id: RecordId },
    #[error("record failed to match unique constraint")]
    Exists { constraint: String, id: RecordId },
    #[error("a condition check was not met")]
    Condition,
    #[error("no record id is left after {}", RecordId::MAX)]
    IdOverflow,
    #[error("query builder error: {0}")]
    QueryBuilder(String),
}

pub type SetResult<T> = Result<T, RecordSetError>;
