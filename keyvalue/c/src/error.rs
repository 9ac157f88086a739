//! Process-wide last-error channel.
//!
//! Every boundary call overwrites the slot: failures store their message and
//! successes clear it. The slot is shared by all threads, so under concurrent
//! calls a caller may read another call's message; the status returned by
//! each call is the per-call answer.

use std::ffi::{CString, c_char};
use std::sync::{Mutex, MutexGuard, PoisonError};

static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<String>> {
    LAST_ERROR.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn set_last_error(message: &str) {
    *slot() = Some(message.to_string());
}

pub(crate) fn clear_last_error() {
    *slot() = None;
}

pub(crate) fn last_error_message() -> Option<String> {
    slot().clone()
}

/// Returns a copy of the most recent error message, or null when the last
/// call succeeded. Release it with `opendata_kv_string_free`.
#[unsafe(no_mangle)]
pub extern "C" fn opendata_kv_last_error() -> *mut c_char {
    match last_error_message() {
        // Interior NULs would truncate the message on the C side.
        Some(message) => match CString::new(message.replace('\0', "\\0")) {
            Ok(c_message) => c_message.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        None => std::ptr::null_mut(),
    }
}
