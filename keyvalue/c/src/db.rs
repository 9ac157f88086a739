use std::ffi::c_char;

use keyvalue::codec::{ScanEncoder, decode_operations};
use tracing::debug;

use crate::error::clear_last_error;
use crate::ffi::*;
use crate::memory::OwnedBuffer;
use crate::registry::REGISTRY;

unsafe fn open(location: *const c_char, in_memory: bool) -> Result<opendata_kv_handle_t, Failure> {
    let location = cstr_or_empty(location, "location")?;
    let store = keyvalue::open(location, in_memory)?;
    let handle = REGISTRY.register(store)?;
    debug!(handle, location, in_memory, "opened store");
    Ok(handle)
}

/// Opens a store and returns its handle, or `0` on failure.
///
/// A null `location` is treated as the empty string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_open(
    location: *const c_char,
    in_memory: bool,
) -> opendata_kv_handle_t {
    match open(location, in_memory) {
        Ok(handle) => {
            clear_last_error();
            handle
        }
        Err(failure) => {
            fail(failure);
            OPENDATA_KV_INVALID_HANDLE
        }
    }
}

fn close(handle: opendata_kv_handle_t) -> Result<(), Failure> {
    let store = REGISTRY.lookup(handle)?;
    store.close()?;
    REGISTRY.release(handle)?;
    debug!(handle, "closed store");
    Ok(())
}

/// Closes the store and invalidates `handle`. On failure the handle stays
/// registered.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_close(handle: opendata_kv_handle_t) -> opendata_kv_status_t {
    complete(close(handle))
}

unsafe fn set(
    handle: opendata_kv_handle_t,
    key: *const u8,
    key_len: usize,
    value: *const u8,
    value_len: usize,
) -> Result<(), Failure> {
    let key = bytes_from_ptr(key, key_len, "key")?;
    let value = bytes_from_ptr(value, value_len, "value")?;
    REGISTRY.lookup(handle)?.set(key, value)?;
    Ok(())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_set(
    handle: opendata_kv_handle_t,
    key: *const u8,
    key_len: usize,
    value: *const u8,
    value_len: usize,
) -> opendata_kv_status_t {
    complete(set(handle, key, key_len, value, value_len))
}

unsafe fn get(
    handle: opendata_kv_handle_t,
    key: *const u8,
    key_len: usize,
) -> Result<OwnedBuffer, Failure> {
    let key = bytes_from_ptr(key, key_len, "key")?;
    let value = REGISTRY.lookup(handle)?.get(key)?;
    Ok(OwnedBuffer::copy_from(&value)?)
}

/// Reads `key`. Returns a buffer owned by the caller, or null on any failure
/// including a missing key. A present but empty value yields a non-null
/// pointer with `*out_value_len == 0`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_get(
    handle: opendata_kv_handle_t,
    key: *const u8,
    key_len: usize,
    out_value_len: *mut usize,
) -> *mut u8 {
    if let Err(failure) = require_out_ptr(out_value_len, "out_value_len") {
        fail(failure);
        return std::ptr::null_mut();
    }
    *out_value_len = 0;

    match get(handle, key, key_len) {
        Ok(buffer) => {
            clear_last_error();
            let (ptr, len) = buffer.into_raw();
            *out_value_len = len;
            ptr
        }
        Err(failure) => {
            fail(failure);
            std::ptr::null_mut()
        }
    }
}

unsafe fn delete(
    handle: opendata_kv_handle_t,
    key: *const u8,
    key_len: usize,
) -> Result<(), Failure> {
    let key = bytes_from_ptr(key, key_len, "key")?;
    REGISTRY.lookup(handle)?.delete(key)?;
    Ok(())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_delete(
    handle: opendata_kv_handle_t,
    key: *const u8,
    key_len: usize,
) -> opendata_kv_status_t {
    complete(delete(handle, key, key_len))
}

fn sync(handle: opendata_kv_handle_t) -> Result<(), Failure> {
    REGISTRY.lookup(handle)?.sync()?;
    Ok(())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_sync(handle: opendata_kv_handle_t) -> opendata_kv_status_t {
    complete(sync(handle))
}

unsafe fn scan(
    handle: opendata_kv_handle_t,
    prefix: *const u8,
    prefix_len: usize,
) -> Result<ScanEncoder, Failure> {
    let prefix = bytes_from_ptr(prefix, prefix_len, "prefix")?;
    let store = REGISTRY.lookup(handle)?;
    let mut encoder = ScanEncoder::new();
    store.iterate(prefix, &mut |key, value| encoder.append(key, value))?;
    Ok(encoder)
}

/// Collects every entry under `prefix` into one buffer in the scan wire
/// format. An empty result is a null pointer with `*out_len == 0` and a
/// cleared last error; callers tell it apart from failure by the error.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_scan(
    handle: opendata_kv_handle_t,
    prefix: *const u8,
    prefix_len: usize,
    out_len: *mut usize,
) -> *mut u8 {
    if let Err(failure) = require_out_ptr(out_len, "out_len") {
        fail(failure);
        return std::ptr::null_mut();
    }
    *out_len = 0;

    match scan(handle, prefix, prefix_len) {
        Ok(encoder) if encoder.is_empty() => {
            clear_last_error();
            std::ptr::null_mut()
        }
        Ok(encoder) => {
            clear_last_error();
            let (ptr, len) = OwnedBuffer::from_vec(encoder.into_inner()).into_raw();
            *out_len = len;
            ptr
        }
        Err(failure) => {
            fail(failure);
            std::ptr::null_mut()
        }
    }
}

unsafe fn apply(
    handle: opendata_kv_handle_t,
    ops: *const u8,
    ops_len: usize,
) -> Result<(), Failure> {
    let payload = bytes_from_ptr(ops, ops_len, "ops")?;
    let store = REGISTRY.lookup(handle)?;
    let ops = decode_operations(payload)?;
    debug!(handle, count = ops.len(), "applying batch");
    store.apply(&ops)?;
    Ok(())
}

/// Decodes a batch payload and applies it atomically. A payload that fails
/// to decode leaves the store untouched.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_apply(
    handle: opendata_kv_handle_t,
    ops: *const u8,
    ops_len: usize,
) -> opendata_kv_status_t {
    complete(apply(handle, ops, ops_len))
}
