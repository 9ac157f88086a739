use std::ffi::{CString, c_char};

use keyvalue::{Error, Result};

/// A byte buffer whose ownership crosses the boundary.
///
/// Built only here and released only by [`opendata_kv_buffer_free`] with the
/// length reported alongside the pointer. Backed by a boxed slice so capacity
/// always equals length.
pub(crate) struct OwnedBuffer(Box<[u8]>);

impl OwnedBuffer {
    pub(crate) fn copy_from(data: &[u8]) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(data.len())
            .map_err(|e| Error::AllocationFailed(format!("value buffer: {}", e)))?;
        buf.extend_from_slice(data);
        Ok(Self(buf.into_boxed_slice()))
    }

    pub(crate) fn from_vec(buf: Vec<u8>) -> Self {
        Self(buf.into_boxed_slice())
    }

    /// Hands the buffer to the caller. An empty buffer still yields a
    /// non-null pointer.
    pub(crate) fn into_raw(self) -> (*mut u8, usize) {
        let len = self.0.len();
        (Box::into_raw(self.0).cast::<u8>(), len)
    }

    unsafe fn from_raw(ptr: *mut u8, len: usize) -> Self {
        Self(Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)))
    }
}

/// Releases a buffer returned by `opendata_kv_get` or `opendata_kv_scan`.
///
/// `len` must be the length reported for `data`. Null is ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_buffer_free(data: *mut u8, len: usize) {
    if !data.is_null() {
        drop(OwnedBuffer::from_raw(data, len));
    }
}

/// Releases a string returned by `opendata_kv_last_error`. Null is ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn opendata_kv_string_free(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_hand_out_non_null_pointer_for_empty_buffer() {
        // given
        let buffer = OwnedBuffer::copy_from(&[]).unwrap();

        // when
        let (ptr, len) = buffer.into_raw();

        // then
        assert!(!ptr.is_null());
        assert_eq!(len, 0);
        unsafe { opendata_kv_buffer_free(ptr, len) };
    }

    #[test]
    fn should_round_trip_buffer_through_raw_parts() {
        // given
        let (ptr, len) = OwnedBuffer::from_vec(vec![1, 2, 3]).into_raw();

        // when
        let contents = unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec();

        // then
        assert_eq!(contents, vec![1, 2, 3]);
        unsafe { opendata_kv_buffer_free(ptr, len) };
    }

    #[test]
    fn should_ignore_null_pointers() {
        unsafe {
            opendata_kv_buffer_free(std::ptr::null_mut(), 16);
            opendata_kv_string_free(std::ptr::null_mut());
        }
    }
}
