use tracing::trace;

use crate::record::{Record, RecordId};

/// Find the first record with the given `id`.
///
/// Scans `records` in order, so the cost is linear in their length. Absence is
/// an expected outcome and is reported as [`None`].
///
/// # Arguments
///
/// * `records` - The records to search, possibly empty.
/// * `id` - The id to look for. Any value is accepted.
///
/// # Example
///
/// ```
/// use recordset::{find_by_id, Record};
///
/// let records = vec![Record::new(1, "one"), Record::new(2, "two")];
///
/// assert_eq!(find_by_id(&records, 2).map(|record| record.data), Some("two"));
/// assert!(find_by_id(&records, 99).is_none());
/// ```
pub fn find_by_id<T>(records: &[Record<T>], id: RecordId) -> Option<&Record<T>> {
    let found = records.iter().find(|record| record.id == id);
    trace!(id, scanned = records.len(), found = found.is_some(), "find by id");
    found
}
