//! C bindings for the XMP container
//!
//! XMP exposes the same surface as the other two families, including the
//! key accessor and iterator, so callers see one uniform protocol. The bag
//! stringification special case lives in the datum itself.

use crate::capi::macros::metadata_family;

metadata_family! {
    accessor: xmp_data,
    data: MetakitXmpData,
    datum: MetakitXmpDatum,
    iterator: MetakitXmpDatumIterator,
    get_data: metakit_image_get_xmp_data,
    data_free: metakit_xmp_data_free,
    find_key: metakit_xmp_data_find_key,
    iterator_new: metakit_xmp_data_iterator,
    iterator_has_next: metakit_xmp_datum_iterator_has_next,
    iterator_next: metakit_xmp_datum_iterator_next,
    iterator_free: metakit_xmp_datum_iterator_free,
    datum_key: metakit_xmp_datum_key,
    datum_to_string: metakit_xmp_datum_to_string,
    datum_free: metakit_xmp_datum_free,
}
