//! C ABI surface tests
//!
//! Exercises the boundary exactly as a C caller would: opaque handles,
//! error receptacles, the has-next/next iterator protocol, and one release
//! call per handle in leaf-first order.

#![cfg(feature = "capi")]

mod fixtures;

use fixtures::{jpeg_with_xmp_bag, minimal_jpeg};
use metakit::capi::error::{
    metakit_error_code, metakit_error_free, metakit_error_message, MetakitError,
};
use metakit::capi::exif::*;
use metakit::capi::image::*;
use metakit::capi::iptc::*;
use metakit::capi::strings::metakit_string_free;
use metakit::capi::xmp::*;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_long};
use std::ptr;

/// Copy a returned string and release it through the boundary.
unsafe fn take_string(ptr: *mut c_char) -> String {
    assert!(!ptr.is_null());
    let s = CStr::from_ptr(ptr).to_string_lossy().into_owned();
    metakit_string_free(ptr);
    s
}

/// Copy the error message, then free the error.
unsafe fn take_error(err: *mut MetakitError) -> (i32, String) {
    assert!(!err.is_null());
    let code = metakit_error_code(err);
    let message = CStr::from_ptr(metakit_error_message(err))
        .to_string_lossy()
        .into_owned();
    metakit_error_free(err);
    (code, message)
}

unsafe fn open_fixture(data: &[u8]) -> *mut MetakitImage {
    let mut err: *mut MetakitError = ptr::null_mut();
    let img = metakit_image_open_bytes(data.as_ptr(), data.len() as c_long, &mut err);
    assert!(!img.is_null());
    assert!(err.is_null());
    metakit_image_read_metadata(img, &mut err);
    assert!(err.is_null());
    img
}

#[test]
fn open_bytes_read_and_free() {
    unsafe {
        let img = open_fixture(&minimal_jpeg());
        assert_eq!(metakit_image_get_pixel_width(img), 32);
        assert_eq!(metakit_image_get_pixel_height(img), 16);
        // No ICC profile in the fixture
        assert!(metakit_image_icc_profile(img).is_null());
        assert_eq!(metakit_image_icc_profile_size(img), 0);
        // Encoded bytes are visible across the boundary
        assert_eq!(
            metakit_image_get_size(img),
            minimal_jpeg().len() as c_long
        );
        assert!(!metakit_image_get_bytes_ptr(img).is_null());
        metakit_image_free(img);
    }
}

#[test]
fn open_invalid_bytes_populates_receptacle() {
    unsafe {
        let data = [0xDEu8, 0xAD, 0xBE, 0xEF];
        let mut err: *mut MetakitError = ptr::null_mut();
        let img = metakit_image_open_bytes(data.as_ptr(), data.len() as c_long, &mut err);
        assert!(img.is_null());
        let (code, message) = take_error(err);
        assert_ne!(code, 0);
        assert!(!message.is_empty());
    }
}

#[test]
fn open_missing_file_populates_receptacle() {
    unsafe {
        let path = CString::new("/no/such/picture.jpg").unwrap();
        let mut err: *mut MetakitError = ptr::null_mut();
        let img = metakit_image_open(path.as_ptr(), &mut err);
        assert!(img.is_null());
        let (_, message) = take_error(err);
        assert!(!message.is_empty());
    }
}

#[test]
fn caller_may_opt_out_of_errors() {
    unsafe {
        // Null receptacle everywhere: failures still yield null results,
        // nothing crashes, nothing leaks an error object.
        let data = [0u8, 1, 2, 3];
        let img = metakit_image_open_bytes(data.as_ptr(), data.len() as c_long, ptr::null_mut());
        assert!(img.is_null());

        let img = open_fixture(&minimal_jpeg());
        let exif = metakit_image_get_exif_data(img);
        let bad_key = CString::new("totally wrong").unwrap();
        let datum = metakit_exif_data_find_key(exif, bad_key.as_ptr(), ptr::null_mut());
        assert!(datum.is_null());
        metakit_exif_data_free(exif);
        metakit_image_free(img);
    }
}

#[test]
fn find_key_absent_vs_malformed() {
    unsafe {
        let img = open_fixture(&minimal_jpeg());
        let exif = metakit_image_get_exif_data(img);

        // Valid but absent: null result AND untouched receptacle
        let mut err: *mut MetakitError = ptr::null_mut();
        let key = CString::new("Exif.Image.Model").unwrap();
        let datum = metakit_exif_data_find_key(exif, key.as_ptr(), &mut err);
        assert!(datum.is_null());
        assert!(err.is_null());

        // Malformed: null result AND populated receptacle
        let key = CString::new("Iptc.Image.Model").unwrap();
        let datum = metakit_exif_data_find_key(exif, key.as_ptr(), &mut err);
        assert!(datum.is_null());
        let (code, message) = take_error(err);
        assert_ne!(code, 0);
        assert!(message.contains("Invalid key"));

        metakit_exif_data_free(exif);
        metakit_image_free(img);
    }
}

#[test]
fn set_exif_string_round_trip() {
    unsafe {
        let img = open_fixture(&minimal_jpeg());
        let mut err: *mut MetakitError = ptr::null_mut();
        let key = CString::new("Exif.Image.Make").unwrap();
        let value = CString::new("Acme").unwrap();
        metakit_image_set_exif_string(img, key.as_ptr(), value.as_ptr(), &mut err);
        assert!(err.is_null());

        // Reopen the written bytes through the boundary
        let size = metakit_image_get_size(img);
        let bytes = std::slice::from_raw_parts(metakit_image_get_bytes_ptr(img), size as usize);
        let reopened = open_fixture(bytes);
        metakit_image_free(img);

        let exif = metakit_image_get_exif_data(reopened);
        let datum = metakit_exif_data_find_key(exif, key.as_ptr(), &mut err);
        assert!(err.is_null());
        assert!(!datum.is_null());
        assert_eq!(take_string(metakit_exif_datum_to_string(datum)), "Acme");
        assert_eq!(
            take_string(metakit_exif_datum_key(datum)),
            "Exif.Image.Make"
        );

        metakit_exif_datum_free(datum);
        metakit_exif_data_free(exif);
        metakit_image_free(reopened);
    }
}

#[test]
fn set_iptc_string_round_trip() {
    unsafe {
        let img = open_fixture(&minimal_jpeg());
        let mut err: *mut MetakitError = ptr::null_mut();
        let key = CString::new("Iptc.Application2.Caption").unwrap();
        let value = CString::new("Boundary caption").unwrap();
        metakit_image_set_iptc_string(img, key.as_ptr(), value.as_ptr(), &mut err);
        assert!(err.is_null());

        let size = metakit_image_get_size(img);
        let bytes = std::slice::from_raw_parts(metakit_image_get_bytes_ptr(img), size as usize);
        let reopened = open_fixture(bytes);
        metakit_image_free(img);

        let iptc = metakit_image_get_iptc_data(reopened);
        let datum = metakit_iptc_data_find_key(iptc, key.as_ptr(), &mut err);
        assert!(!datum.is_null());
        assert_eq!(
            take_string(metakit_iptc_datum_to_string(datum)),
            "Boundary caption"
        );

        metakit_iptc_datum_free(datum);
        metakit_iptc_data_free(iptc);
        metakit_image_free(reopened);
    }
}

#[test]
fn set_exif_short_round_trip() {
    unsafe {
        let img = open_fixture(&minimal_jpeg());
        let mut err: *mut MetakitError = ptr::null_mut();
        let key = CString::new("Exif.Image.Orientation").unwrap();
        let value = CString::new("6").unwrap();
        metakit_image_set_exif_short(img, key.as_ptr(), value.as_ptr(), &mut err);
        assert!(err.is_null());

        // A non-numeric value is rejected
        let bad = CString::new("sideways").unwrap();
        metakit_image_set_exif_short(img, key.as_ptr(), bad.as_ptr(), &mut err);
        let (code, _) = take_error(err);
        assert_ne!(code, 0);

        let size = metakit_image_get_size(img);
        let bytes = std::slice::from_raw_parts(metakit_image_get_bytes_ptr(img), size as usize);
        let reopened = open_fixture(bytes);
        metakit_image_free(img);

        let exif = metakit_image_get_exif_data(reopened);
        let mut err: *mut MetakitError = ptr::null_mut();
        let datum = metakit_exif_data_find_key(exif, key.as_ptr(), &mut err);
        assert!(!datum.is_null());
        assert_eq!(take_string(metakit_exif_datum_to_string(datum)), "6");

        metakit_exif_datum_free(datum);
        metakit_exif_data_free(exif);
        metakit_image_free(reopened);
    }
}

#[test]
fn set_with_invalid_key_reports_error() {
    unsafe {
        let img = open_fixture(&minimal_jpeg());
        let mut err: *mut MetakitError = ptr::null_mut();
        let key = CString::new("Exif.Image").unwrap(); // wrong shape
        let value = CString::new("x").unwrap();
        metakit_image_set_exif_string(img, key.as_ptr(), value.as_ptr(), &mut err);
        let (code, _) = take_error(err);
        assert_ne!(code, 0);
        metakit_image_free(img);
    }
}

#[test]
fn xmp_bag_vs_scalar_stringification() {
    unsafe {
        let img = open_fixture(&jpeg_with_xmp_bag());
        let xmp = metakit_image_get_xmp_data(img);
        let mut err: *mut MetakitError = ptr::null_mut();

        let bag_key = CString::new("Xmp.dc.subject").unwrap();
        let bag = metakit_xmp_data_find_key(xmp, bag_key.as_ptr(), &mut err);
        assert!(err.is_null());
        assert!(!bag.is_null());
        // Bag: all values joined
        assert_eq!(
            take_string(metakit_xmp_datum_to_string(bag)),
            "alpha, beta, gamma"
        );
        assert_eq!(take_string(metakit_xmp_datum_key(bag)), "Xmp.dc.subject");
        metakit_xmp_datum_free(bag);

        let scalar_key = CString::new("Xmp.dc.title").unwrap();
        let scalar = metakit_xmp_data_find_key(xmp, scalar_key.as_ptr(), &mut err);
        assert!(!scalar.is_null());
        // Non-bag: first element form
        assert_eq!(
            take_string(metakit_xmp_datum_to_string(scalar)),
            "Scalar Title"
        );
        metakit_xmp_datum_free(scalar);

        metakit_xmp_data_free(xmp);
        metakit_image_free(img);
    }
}

#[test]
fn iterator_protocol_yields_all_entries_then_null() {
    unsafe {
        let img = open_fixture(&jpeg_with_xmp_bag());
        let xmp = metakit_image_get_xmp_data(img);
        let iter = metakit_xmp_data_iterator(xmp);
        assert!(!iter.is_null());

        let mut keys = Vec::new();
        while metakit_xmp_datum_iterator_has_next(iter) != 0 {
            let datum = metakit_xmp_datum_iterator_next(iter);
            assert!(!datum.is_null());
            keys.push(take_string(metakit_xmp_datum_key(datum)));
            metakit_xmp_datum_free(datum);
        }
        assert_eq!(keys, ["Xmp.dc.subject", "Xmp.dc.title"]);

        // Idempotent at the end
        assert_eq!(metakit_xmp_datum_iterator_has_next(iter), 0);
        assert!(metakit_xmp_datum_iterator_next(iter).is_null());
        assert!(metakit_xmp_datum_iterator_next(iter).is_null());

        metakit_xmp_datum_iterator_free(iter);
        metakit_xmp_data_free(xmp);
        metakit_image_free(img);
    }
}

#[test]
fn datum_outlives_iterator_and_container_view() {
    unsafe {
        let img = open_fixture(&jpeg_with_xmp_bag());
        let xmp = metakit_image_get_xmp_data(img);
        let iter = metakit_xmp_data_iterator(xmp);
        let datum = metakit_xmp_datum_iterator_next(iter);
        assert!(!datum.is_null());

        // Release the iterator and the view first; the datum is an owned copy
        metakit_xmp_datum_iterator_free(iter);
        metakit_xmp_data_free(xmp);
        assert_eq!(take_string(metakit_xmp_datum_key(datum)), "Xmp.dc.subject");

        metakit_xmp_datum_free(datum);
        metakit_image_free(img);
    }
}

#[test]
fn empty_container_iterator_is_immediately_done() {
    unsafe {
        let img = open_fixture(&minimal_jpeg());
        let iptc = metakit_image_get_iptc_data(img);
        let iter = metakit_iptc_data_iterator(iptc);
        assert_eq!(metakit_iptc_datum_iterator_has_next(iter), 0);
        assert!(metakit_iptc_datum_iterator_next(iter).is_null());
        metakit_iptc_datum_iterator_free(iter);
        metakit_iptc_data_free(iptc);
        metakit_image_free(img);
    }
}

#[test]
fn null_handles_are_tolerated() {
    unsafe {
        // Accessors and frees are null-safe; only stale/foreign pointers
        // are undefined behavior.
        assert!(metakit_image_get_exif_data(ptr::null()).is_null());
        assert_eq!(metakit_image_get_pixel_width(ptr::null()), 0);
        assert_eq!(metakit_error_code(ptr::null()), 0);
        assert!(metakit_error_message(ptr::null()).is_null());
        assert!(metakit_exif_data_iterator(ptr::null()).is_null());
        assert_eq!(metakit_exif_datum_iterator_has_next(ptr::null()), 0);
        assert!(metakit_exif_datum_iterator_next(ptr::null_mut()).is_null());
        assert!(metakit_exif_datum_key(ptr::null()).is_null());
        metakit_image_free(ptr::null_mut());
        metakit_exif_data_free(ptr::null_mut());
        metakit_exif_datum_free(ptr::null_mut());
        metakit_exif_datum_iterator_free(ptr::null_mut());
        metakit_error_free(ptr::null_mut());
        metakit_string_free(ptr::null_mut());
    }
}
