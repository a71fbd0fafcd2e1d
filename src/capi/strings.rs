//! C string helpers
//!
//! String results crossing the boundary are heap-allocated and owned by the
//! caller; [`metakit_string_free`] is their dedicated release call, distinct
//! from the per-handle free functions.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Borrow a C string as `&str`. `None` for null or non-UTF-8 input.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for the
/// duration of the call.
pub(crate) unsafe fn cstr<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Move a Rust string across the boundary as an owned C string.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let sanitized = if s.contains('\0') {
        s.replace('\0', " ")
    } else {
        s
    };
    CString::new(sanitized)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Release a string previously returned by a metakit function. Calling with
/// null is a no-op.
///
/// # Safety
///
/// `s` must be null or a pointer returned by a metakit string-producing
/// function, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn metakit_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
