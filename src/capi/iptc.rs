//! C bindings for the IPTC container

use crate::capi::macros::metadata_family;

metadata_family! {
    accessor: iptc_data,
    data: MetakitIptcData,
    datum: MetakitIptcDatum,
    iterator: MetakitIptcDatumIterator,
    get_data: metakit_image_get_iptc_data,
    data_free: metakit_iptc_data_free,
    find_key: metakit_iptc_data_find_key,
    iterator_new: metakit_iptc_data_iterator,
    iterator_has_next: metakit_iptc_datum_iterator_has_next,
    iterator_next: metakit_iptc_datum_iterator_next,
    iterator_free: metakit_iptc_datum_iterator_free,
    datum_key: metakit_iptc_datum_key,
    datum_to_string: metakit_iptc_datum_to_string,
    datum_free: metakit_iptc_datum_free,
}
