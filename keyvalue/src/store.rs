//! The contract every storage backend fulfills.

use bytes::Bytes;

use crate::error::Result;
use crate::model::Operation;

/// Callback invoked once per entry during [`Store::iterate`].
///
/// The slices are only valid for the duration of the call. Returning an error
/// stops the iteration and surfaces that error to the caller.
pub type Visitor<'a> = dyn FnMut(&[u8], &[u8]) -> Result<()> + 'a;

/// A byte-oriented key-value store.
///
/// Keys and values are arbitrary byte strings, NUL and non-UTF-8 bytes
/// included. All methods take `&self` so a store can be shared across
/// threads behind an `Arc`.
pub trait Store: Send + Sync {
    /// Releases the engine. Later calls on the same store fail.
    fn close(&self) -> Result<()>;

    /// Inserts or overwrites `key`.
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Point read. A missing key is [`Error::NotFound`](crate::Error::NotFound).
    fn get(&self, key: &[u8]) -> Result<Bytes>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Visits every entry whose key starts with `prefix` in ascending
    /// lexicographic key order. An empty prefix visits the whole store.
    fn iterate(&self, prefix: &[u8], visit: &mut Visitor<'_>) -> Result<()>;

    /// Makes every write acknowledged so far durable.
    fn sync(&self) -> Result<()>;

    /// Applies `ops` in order as one atomic unit.
    fn apply(&self, ops: &[Operation]) -> Result<()>;
}
