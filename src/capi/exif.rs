//! C bindings for the EXIF container

use crate::capi::macros::metadata_family;

metadata_family! {
    accessor: exif_data,
    data: MetakitExifData,
    datum: MetakitExifDatum,
    iterator: MetakitExifDatumIterator,
    get_data: metakit_image_get_exif_data,
    data_free: metakit_exif_data_free,
    find_key: metakit_exif_data_find_key,
    iterator_new: metakit_exif_data_iterator,
    iterator_has_next: metakit_exif_datum_iterator_has_next,
    iterator_next: metakit_exif_datum_iterator_next,
    iterator_free: metakit_exif_datum_iterator_free,
    datum_key: metakit_exif_datum_key,
    datum_to_string: metakit_exif_datum_to_string,
    datum_free: metakit_exif_datum_free,
}
