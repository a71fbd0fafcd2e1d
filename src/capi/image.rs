//! C bindings for the image lifecycle
//!
//! An image handle owns one decoded image. Every function taking an
//! optional `error` out-parameter follows the same contract: on failure the
//! function returns its null/zero result and, when the receptacle is
//! non-null, stores a [`MetakitError`] the caller must free.

use crate::capi::error::{raise, MetakitError};
use crate::capi::strings::cstr;
use crate::core::error::Error;
use crate::files::image::Image;
use std::os::raw::{c_char, c_int, c_long};
use std::ptr;

/// Opaque image handle.
pub struct MetakitImage {
    inner: Image,
}

impl MetakitImage {
    pub(crate) fn inner(&self) -> &Image {
        &self.inner
    }
}

/// Open an image file from the filesystem.
///
/// Returns an owned handle, or null on failure (unrecognized format,
/// unreadable path). The metadata is not read yet; call
/// [`metakit_image_read_metadata`] first.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string; `error` must be null or
/// point to writable error-pointer storage.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_open(
    path: *const c_char,
    error: *mut *mut MetakitError,
) -> *mut MetakitImage {
    let Some(path) = cstr(path) else {
        raise(
            error,
            &Error::BadValue("path is null or not valid UTF-8".to_string()),
        );
        return ptr::null_mut();
    };
    match Image::open(path) {
        Ok(inner) => Box::into_raw(Box::new(MetakitImage { inner })),
        Err(e) => {
            raise(error, &e);
            ptr::null_mut()
        }
    }
}

/// Open an image from an in-memory buffer. The buffer is copied; the caller
/// keeps ownership of `data`.
///
/// # Safety
///
/// `data` must point to at least `size` readable bytes; `error` must be
/// null or point to writable error-pointer storage.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_open_bytes(
    data: *const u8,
    size: c_long,
    error: *mut *mut MetakitError,
) -> *mut MetakitImage {
    if data.is_null() || size <= 0 {
        raise(error, &Error::BadValue("input is empty".to_string()));
        return ptr::null_mut();
    }
    let bytes = std::slice::from_raw_parts(data, size as usize);
    match Image::open_bytes(bytes) {
        Ok(inner) => Box::into_raw(Box::new(MetakitImage { inner })),
        Err(e) => {
            raise(error, &e);
            ptr::null_mut()
        }
    }
}

/// Parse the image's embedded metadata. On failure the handle stays valid
/// and the call may be retried.
///
/// # Safety
///
/// `img` must be null or a live image handle; `error` as elsewhere.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_read_metadata(
    img: *mut MetakitImage,
    error: *mut *mut MetakitError,
) {
    if img.is_null() {
        return;
    }
    if let Err(e) = (*img).inner.read_metadata() {
        raise(error, &e);
    }
}

/// Pixel width; 0 before metadata has been read.
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_get_pixel_width(img: *const MetakitImage) -> c_int {
    if img.is_null() {
        return 0;
    }
    (*img).inner.pixel_width() as c_int
}

/// Pixel height; 0 before metadata has been read.
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_get_pixel_height(img: *const MetakitImage) -> c_int {
    if img.is_null() {
        return 0;
    }
    (*img).inner.pixel_height() as c_int
}

/// Embedded ICC profile bytes, or null when the image has none. The pointer
/// borrows from the image and is valid only while the handle lives; read
/// its length from [`metakit_image_icc_profile_size`].
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_icc_profile(img: *const MetakitImage) -> *const u8 {
    if img.is_null() {
        return ptr::null();
    }
    match (*img).inner.icc_profile() {
        Some(profile) => profile.as_ptr(),
        None => ptr::null(),
    }
}

/// Size of the embedded ICC profile in bytes; 0 when absent.
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_icc_profile_size(img: *const MetakitImage) -> c_int {
    if img.is_null() {
        return 0;
    }
    (*img)
        .inner
        .icc_profile()
        .map(|p| p.len() as c_int)
        .unwrap_or(0)
}

/// Size of the current encoded image in bytes.
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_get_size(img: *const MetakitImage) -> c_long {
    if img.is_null() {
        return 0;
    }
    (*img).inner.bytes().len() as c_long
}

/// Pointer to the current encoded image bytes. Borrows from the image;
/// invalidated by any metadata write and by freeing the handle.
///
/// # Safety
///
/// `img` must be null or a live image handle.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_get_bytes_ptr(img: *const MetakitImage) -> *const u8 {
    if img.is_null() {
        return ptr::null();
    }
    (*img).inner.bytes().as_ptr()
}

/// Merge one string-typed EXIF entry and persist immediately.
///
/// The container update and the write-back are separate steps; a write
/// failure after a successful update leaves the two diverged.
///
/// # Safety
///
/// `img` must be null or a live image handle; `key` and `value` must be
/// valid NUL-terminated strings; `error` as elsewhere.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_set_exif_string(
    img: *mut MetakitImage,
    key: *const c_char,
    value: *const c_char,
    error: *mut *mut MetakitError,
) {
    if img.is_null() {
        return;
    }
    let (Some(key), Some(value)) = (cstr(key), cstr(value)) else {
        raise(
            error,
            &Error::BadValue("key or value is null or not valid UTF-8".to_string()),
        );
        return;
    };
    if let Err(e) = (*img).inner.set_exif_string(key, value) {
        raise(error, &e);
    }
}

/// Merge one string-typed IPTC entry and persist immediately.
///
/// Same contract as [`metakit_image_set_exif_string`].
///
/// # Safety
///
/// Same as [`metakit_image_set_exif_string`].
#[no_mangle]
pub unsafe extern "C" fn metakit_image_set_iptc_string(
    img: *mut MetakitImage,
    key: *const c_char,
    value: *const c_char,
    error: *mut *mut MetakitError,
) {
    if img.is_null() {
        return;
    }
    let (Some(key), Some(value)) = (cstr(key), cstr(value)) else {
        raise(
            error,
            &Error::BadValue("key or value is null or not valid UTF-8".to_string()),
        );
        return;
    };
    if let Err(e) = (*img).inner.set_iptc_string(key, value) {
        raise(error, &e);
    }
}

/// Merge one short-typed EXIF entry (text form, parsed as an unsigned
/// 16-bit number) and persist immediately.
///
/// # Safety
///
/// Same as [`metakit_image_set_exif_string`].
#[no_mangle]
pub unsafe extern "C" fn metakit_image_set_exif_short(
    img: *mut MetakitImage,
    key: *const c_char,
    value: *const c_char,
    error: *mut *mut MetakitError,
) {
    if img.is_null() {
        return;
    }
    let (Some(key), Some(value)) = (cstr(key), cstr(value)) else {
        raise(
            error,
            &Error::BadValue("key or value is null or not valid UTF-8".to_string()),
        );
        return;
    };
    if let Err(e) = (*img).inner.set_exif_short(key, value) {
        raise(error, &e);
    }
}

/// Merge one short-typed IPTC entry (text form, parsed as an unsigned
/// 16-bit number) and persist immediately.
///
/// # Safety
///
/// Same as [`metakit_image_set_exif_string`].
#[no_mangle]
pub unsafe extern "C" fn metakit_image_set_iptc_short(
    img: *mut MetakitImage,
    key: *const c_char,
    value: *const c_char,
    error: *mut *mut MetakitError,
) {
    if img.is_null() {
        return;
    }
    let (Some(key), Some(value)) = (cstr(key), cstr(value)) else {
        raise(
            error,
            &Error::BadValue("key or value is null or not valid UTF-8".to_string()),
        );
        return;
    };
    if let Err(e) = (*img).inner.set_iptc_short(key, value) {
        raise(error, &e);
    }
}

/// Release an image handle. Container views, datums and iterators derived
/// from it become invalid; calling with null is a no-op.
///
/// # Safety
///
/// `img` must be null or a live image handle, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn metakit_image_free(img: *mut MetakitImage) {
    if !img.is_null() {
        drop(Box::from_raw(img));
    }
}
