use std::ffi::{CStr, c_char};

use crate::error::{clear_last_error, set_last_error};

/// Opaque store handle. `0` is never a valid handle.
pub type opendata_kv_handle_t = u64;

/// Handle value returned when opening fails.
pub const OPENDATA_KV_INVALID_HANDLE: opendata_kv_handle_t = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum opendata_kv_status_t {
    OPENDATA_KV_OK = 0,
    OPENDATA_KV_ERROR_INVALID_HANDLE,
    OPENDATA_KV_ERROR_OPEN_FAILED,
    OPENDATA_KV_ERROR_NOT_FOUND,
    OPENDATA_KV_ERROR_MALFORMED_INPUT,
    OPENDATA_KV_ERROR_UNKNOWN_OPERATION,
    OPENDATA_KV_ERROR_ALLOCATION_FAILED,
    OPENDATA_KV_ERROR_STORAGE,
    OPENDATA_KV_ERROR_INVALID_INPUT,
    OPENDATA_KV_ERROR_INTERNAL,
}

/// A failed boundary call: the status handed back to the caller and the
/// message mirrored into the last-error channel.
#[derive(Debug)]
pub(crate) struct Failure {
    pub(crate) status: opendata_kv_status_t,
    pub(crate) message: String,
}

impl From<keyvalue::Error> for Failure {
    fn from(err: keyvalue::Error) -> Self {
        use keyvalue::Error;
        use opendata_kv_status_t::*;

        let status = match &err {
            Error::InvalidHandle(_) => OPENDATA_KV_ERROR_INVALID_HANDLE,
            Error::Open(_) => OPENDATA_KV_ERROR_OPEN_FAILED,
            Error::NotFound => OPENDATA_KV_ERROR_NOT_FOUND,
            Error::MalformedInput(_) => OPENDATA_KV_ERROR_MALFORMED_INPUT,
            Error::UnknownOperation(_) => OPENDATA_KV_ERROR_UNKNOWN_OPERATION,
            Error::AllocationFailed(_) => OPENDATA_KV_ERROR_ALLOCATION_FAILED,
            Error::Storage(_) => OPENDATA_KV_ERROR_STORAGE,
            Error::Internal(_) => OPENDATA_KV_ERROR_INTERNAL,
        };
        Failure {
            status,
            message: err.to_string(),
        }
    }
}

pub(crate) fn invalid_input(message: String) -> Failure {
    Failure {
        status: opendata_kv_status_t::OPENDATA_KV_ERROR_INVALID_INPUT,
        message,
    }
}

/// Records the outcome of a call in the last-error channel and converts it
/// to the status returned across the boundary.
pub(crate) fn complete(result: Result<(), Failure>) -> opendata_kv_status_t {
    match result {
        Ok(()) => {
            clear_last_error();
            opendata_kv_status_t::OPENDATA_KV_OK
        }
        Err(failure) => fail(failure),
    }
}

pub(crate) fn fail(failure: Failure) -> opendata_kv_status_t {
    set_last_error(&failure.message);
    failure.status
}

pub(crate) unsafe fn bytes_from_ptr<'a>(
    ptr: *const u8,
    len: usize,
    name: &str,
) -> Result<&'a [u8], Failure> {
    if ptr.is_null() && len > 0 {
        Err(invalid_input(format!(
            "{name} must not be null when length > 0"
        )))
    } else if ptr.is_null() {
        Ok(&[])
    } else {
        Ok(std::slice::from_raw_parts(ptr, len))
    }
}

pub(crate) fn require_out_ptr<T>(ptr: *mut T, name: &str) -> Result<(), Failure> {
    if ptr.is_null() {
        Err(invalid_input(format!("{name} must not be null")))
    } else {
        Ok(())
    }
}

/// Reads a NUL-terminated UTF-8 string; null reads as the empty string.
pub(crate) unsafe fn cstr_or_empty<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, Failure> {
    if ptr.is_null() {
        return Ok("");
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| invalid_input(format!("{name} is not valid UTF-8: {e}")))
}
