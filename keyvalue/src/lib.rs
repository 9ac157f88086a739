//! OpenData KeyValue - A backend-agnostic embedded key-value store.
//!
//! KeyValue puts two storage engines behind one byte-oriented [`Store`]
//! capability: an LSM-tree store on a local directory (or a throwaway
//! temporary directory), and SlateDB on an object store. Callers pick the
//! engine once, through a location string, and never see which is active.
//!
//! # Key Concepts
//!
//! - **Store**: set/get/delete, ordered prefix iteration, atomic batches and
//!   an explicit durability point.
//! - **Location**: `""`, a filesystem path, or `slatedb:` followed by a path
//!   or a JSON object. See [`config`].
//! - **Codec**: the flat little-endian formats used for batches and scan
//!   results. See [`codec`].
//!
//! # Example
//!
//! ```ignore
//! use keyvalue::{Operation, open};
//!
//! let store = keyvalue::open("slatedb:/var/lib/kv", false)?;
//!
//! store.set(b"user:1", b"alice")?;
//! store.apply(&[
//!     Operation::set(&b"user:2"[..], &b"bob"[..]),
//!     Operation::delete(&b"user:1"[..]),
//! ])?;
//!
//! store.iterate(b"user:", &mut |key, value| {
//!     println!("{:?} = {:?}", key, value);
//!     Ok(())
//! })?;
//!
//! store.sync()?;
//! store.close()?;
//! ```

pub mod codec;
pub mod config;
mod error;
mod lsm;
mod model;
mod opener;
mod slate;
mod store;

pub use config::{Location, LsmConfig, SlateDbConfig};
pub use error::{Error, Result};
pub use lsm::LsmStore;
pub use model::{KeyValueEntry, MAX_KEY_LEN, OP_DELETE, OP_SET, Operation};
pub use opener::{open, open_location};
pub use slate::SlateDbStore;
pub use store::{Store, Visitor};
