//! Per-family binding generator
//!
//! The three metadata families expose an identical C surface: a borrowed
//! container view, key lookup, a has-next/next iterator, datum accessors
//! and one free function per handle type. One macro stamps the surface out
//! per family, the way the original flat-C shims generate their wrapper
//! structs and free functions.

macro_rules! metadata_family {
    (
        accessor: $accessor:ident,
        data: $Data:ident,
        datum: $Datum:ident,
        iterator: $Iter:ident,
        get_data: $get_data:ident,
        data_free: $data_free:ident,
        find_key: $find_key:ident,
        iterator_new: $iterator_new:ident,
        iterator_has_next: $has_next:ident,
        iterator_next: $next:ident,
        iterator_free: $iter_free:ident,
        datum_key: $datum_key:ident,
        datum_to_string: $datum_to_string:ident,
        datum_free: $datum_free:ident $(,)?
    ) => {
        /// Borrowed view over one of an image's metadata containers.
        ///
        /// The view is only valid while the owning image handle lives; its
        /// free function releases the view wrapper, never the container.
        pub struct $Data {
            container: *const crate::core::container::Container,
        }

        /// One owned key/value metadata entry, independent of the container
        /// it was copied from.
        pub struct $Datum {
            inner: crate::core::datum::Datum,
        }

        /// Cursor over a container snapshot taken at creation time.
        ///
        /// Mutating the container or freeing the owning image mid-iteration
        /// invalidates the cursor; that is a caller contract, not a checked
        /// invariant.
        pub struct $Iter {
            container: *const crate::core::container::Container,
            pos: usize,
            end: usize,
        }

        /// Borrow the container view from an image. Always succeeds for a
        /// live handle; returns null only for a null image.
        ///
        /// # Safety
        ///
        /// `img` must be null or a live image handle.
        #[no_mangle]
        pub unsafe extern "C" fn $get_data(
            img: *const crate::capi::image::MetakitImage,
        ) -> *mut $Data {
            if img.is_null() {
                return std::ptr::null_mut();
            }
            let container: *const crate::core::container::Container =
                (*img).inner().$accessor();
            Box::into_raw(Box::new($Data { container }))
        }

        /// Look up an entry by key.
        ///
        /// Returns an owned datum, or null. Null with a populated error
        /// means the key was malformed for this family; null with no error
        /// means the key was valid but absent. The two outcomes are
        /// distinct on purpose.
        ///
        /// # Safety
        ///
        /// `data` must be null or a live container view whose image is
        /// still alive; `key` must be a valid NUL-terminated string;
        /// `error` must be null or point to writable error-pointer storage.
        #[no_mangle]
        pub unsafe extern "C" fn $find_key(
            data: *const $Data,
            key: *const std::os::raw::c_char,
            error: *mut *mut crate::capi::error::MetakitError,
        ) -> *mut $Datum {
            if data.is_null() {
                return std::ptr::null_mut();
            }
            let Some(key) = crate::capi::strings::cstr(key) else {
                crate::capi::error::raise(
                    error,
                    &crate::core::error::Error::BadKey(
                        "key is null or not valid UTF-8".to_string(),
                    ),
                );
                return std::ptr::null_mut();
            };
            let container = &*(*data).container;
            match container.find_key(key) {
                Ok(Some(datum)) => Box::into_raw(Box::new($Datum {
                    inner: datum.clone(),
                })),
                Ok(None) => std::ptr::null_mut(),
                Err(e) => {
                    crate::capi::error::raise(error, &e);
                    std::ptr::null_mut()
                }
            }
        }

        /// Create an iterator over the container, snapshotting its current
        /// begin/end cursors.
        ///
        /// # Safety
        ///
        /// `data` must be null or a live container view whose image is
        /// still alive.
        #[no_mangle]
        pub unsafe extern "C" fn $iterator_new(data: *const $Data) -> *mut $Iter {
            if data.is_null() {
                return std::ptr::null_mut();
            }
            let container = (*data).container;
            let end = (*container).len();
            Box::into_raw(Box::new($Iter {
                container,
                pos: 0,
                end,
            }))
        }

        /// True while the cursor has not reached the snapshotted end.
        ///
        /// # Safety
        ///
        /// `iter` must be null or a live iterator handle.
        #[no_mangle]
        pub unsafe extern "C" fn $has_next(iter: *const $Iter) -> std::os::raw::c_int {
            (!iter.is_null() && (*iter).pos < (*iter).end) as std::os::raw::c_int
        }

        /// Copy the current entry into an owned datum and advance. At the
        /// end returns null without advancing, idempotently. Each returned
        /// datum must be released by the caller regardless of the iterator
        /// or container lifetimes.
        ///
        /// # Safety
        ///
        /// `iter` must be null or a live iterator handle whose container
        /// and image are still alive.
        #[no_mangle]
        pub unsafe extern "C" fn $next(iter: *mut $Iter) -> *mut $Datum {
            if iter.is_null() {
                return std::ptr::null_mut();
            }
            let it = &mut *iter;
            if it.pos >= it.end {
                return std::ptr::null_mut();
            }
            let container = &*it.container;
            let Some(datum) = container.get(it.pos) else {
                return std::ptr::null_mut();
            };
            it.pos += 1;
            Box::into_raw(Box::new($Datum {
                inner: datum.clone(),
            }))
        }

        /// Canonical key text of the entry, e.g. `Exif.Image.Make`. Owned;
        /// release with `metakit_string_free`.
        ///
        /// # Safety
        ///
        /// `datum` must be null or a live datum handle.
        #[no_mangle]
        pub unsafe extern "C" fn $datum_key(
            datum: *const $Datum,
        ) -> *mut std::os::raw::c_char {
            if datum.is_null() {
                return std::ptr::null_mut();
            }
            crate::capi::strings::to_c_string((*datum).inner.key_text())
        }

        /// Render the entry's value as text. An XMP bag joins all of its
        /// values; every other type renders its first component. Owned;
        /// release with `metakit_string_free`.
        ///
        /// # Safety
        ///
        /// `datum` must be null or a live datum handle.
        #[no_mangle]
        pub unsafe extern "C" fn $datum_to_string(
            datum: *const $Datum,
        ) -> *mut std::os::raw::c_char {
            if datum.is_null() {
                return std::ptr::null_mut();
            }
            crate::capi::strings::to_c_string((*datum).inner.to_text())
        }

        /// Release a datum. Calling with null is a no-op.
        ///
        /// # Safety
        ///
        /// `datum` must be null or a live datum handle, not yet freed.
        #[no_mangle]
        pub unsafe extern "C" fn $datum_free(datum: *mut $Datum) {
            if !datum.is_null() {
                drop(Box::from_raw(datum));
            }
        }

        /// Release an iterator. Datums it produced stay valid. Calling with
        /// null is a no-op.
        ///
        /// # Safety
        ///
        /// `iter` must be null or a live iterator handle, not yet freed.
        #[no_mangle]
        pub unsafe extern "C" fn $iter_free(iter: *mut $Iter) {
            if !iter.is_null() {
                drop(Box::from_raw(iter));
            }
        }

        /// Release a container view wrapper. The underlying container is
        /// owned by the image and is not touched. Calling with null is a
        /// no-op.
        ///
        /// # Safety
        ///
        /// `data` must be null or a live container view, not yet freed.
        #[no_mangle]
        pub unsafe extern "C" fn $data_free(data: *mut $Data) {
            if !data.is_null() {
                drop(Box::from_raw(data));
            }
        }
    };
}

pub(crate) use metadata_family;
