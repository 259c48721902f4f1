use bincode::Options;

use crate::SetResult;

/// Big endian with fixed width integers, so encoded keys of the same type
/// compare in the same order as the values they came from.
fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

pub(crate) fn encode<S: ?Sized + serde::Serialize>(item: &S) -> SetResult<Vec<u8>> {
    Ok(options().serialize(item)?)
}

pub(crate) fn decode<'a, T: serde::Deserialize<'a>>(bytes: &'a [u8]) -> SetResult<T> {
    Ok(options().deserialize(bytes)?)
}
