pub mod finder;
pub use finder::find_by_id;

pub mod index;
pub use index::Index;

pub mod query_builder;
pub use query_builder::{QueryBuilder, QueryOperator};

pub mod result;
pub use result::{RecordSetError, SetResult};

pub mod record;
pub use record::{Record, RecordId, RecordType};

pub mod set;
pub use set::{RecordSet, RecordSetBuilder};

pub mod constraint;
pub use constraint::Constraint;

mod encoding;

#[cfg(feature = "derive")]
pub use recordset_derive::Repository;
