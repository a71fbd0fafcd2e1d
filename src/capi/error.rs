//! C error handling
//!
//! Failures cross the boundary as owned error objects: a stable numeric
//! code plus a message copied into independently owned storage at the point
//! the failure is caught. Callers inspect them through accessors and
//! release them with [`metakit_error_free`].

use crate::core::error::Error;
use std::ffi::CString;
use std::os::raw::{c_char, c_int};

/// Owned snapshot of an engine failure.
pub struct MetakitError {
    code: c_int,
    message: CString,
}

impl MetakitError {
    pub(crate) fn new(err: &Error) -> Self {
        // Interior NULs cannot cross as a C string.
        let text = err.to_string().replace('\0', " ");
        Self {
            code: err.code(),
            message: CString::new(text).unwrap_or_default(),
        }
    }
}

/// Store an error in the caller's receptacle, when one was provided.
///
/// A null receptacle is the caller opting out of diagnostics; the failure
/// is swallowed and the calling function still returns its null/zero
/// failure result.
///
/// # Safety
///
/// `error` must be null or a valid pointer to writable error-pointer
/// storage.
pub(crate) unsafe fn raise(error: *mut *mut MetakitError, err: &Error) {
    if !error.is_null() {
        *error = Box::into_raw(Box::new(MetakitError::new(err)));
    }
}

/// Numeric code of the error; 0 for a null error.
///
/// # Safety
///
/// `error` must be null or a pointer obtained from a metakit out-parameter.
#[no_mangle]
pub unsafe extern "C" fn metakit_error_code(error: *const MetakitError) -> c_int {
    if error.is_null() {
        return 0;
    }
    (*error).code
}

/// Message text of the error. The pointer borrows from the error object and
/// is valid until the error is freed; it must not be released separately.
///
/// # Safety
///
/// `error` must be null or a pointer obtained from a metakit out-parameter.
#[no_mangle]
pub unsafe extern "C" fn metakit_error_message(error: *const MetakitError) -> *const c_char {
    if error.is_null() {
        return std::ptr::null();
    }
    (*error).message.as_ptr()
}

/// Release an error object. Calling with null is a no-op.
///
/// # Safety
///
/// `error` must be null or a pointer obtained from a metakit out-parameter,
/// not yet freed.
#[no_mangle]
pub unsafe extern "C" fn metakit_error_free(error: *mut MetakitError) {
    if !error.is_null() {
        drop(Box::from_raw(error));
    }
}
