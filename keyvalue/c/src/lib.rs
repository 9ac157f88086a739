//! C FFI bindings for opendata-keyvalue.
//!
//! Stores are identified by opaque `u64` handles. Every call reports its
//! outcome twice: through its return value (a status, a handle, or a null
//! pointer) and through the process-wide message read with
//! `opendata_kv_last_error`.
//!
//! # Memory
//!
//! Buffers returned by `opendata_kv_get` and `opendata_kv_scan` belong to the
//! caller and must be released with `opendata_kv_buffer_free`, passing the
//! length reported for them. Strings from `opendata_kv_last_error` are
//! released with `opendata_kv_string_free`. The library never frees memory
//! it handed out, and never frees memory it did not allocate.
//!
//! # Safety
//!
//! All `extern "C"` functions in this crate follow the same safety contract:
//! pointer arguments must be valid for the given length for the duration of
//! the call, and out-pointers must point to writable memory. A null data
//! pointer is accepted only together with a zero length.
#![allow(non_camel_case_types)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]

pub mod ffi;

mod db;
mod error;
mod logging;
mod memory;
mod registry;

// Re-export all public FFI types for cbindgen discovery.
pub use ffi::*;

// Re-export all extern "C" functions so they appear in the cdylib.
pub use db::*;
pub use error::*;
pub use logging::*;
pub use memory::*;

pub use registry::HandleRegistry;
