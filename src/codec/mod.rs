//! Wire-level building blocks shared by the SNP table format

mod indexed;
mod primitive;

pub use indexed::{
    IndexedOctetStrings, IndexedStrings, load_indexed_octet_strings, load_indexed_strings,
    store_indexed_octet_strings, store_indexed_strings,
};
pub use primitive::{
    GiWidth, MAX_VARSIZE_BYTES, VarSize, read_fixed_u32, read_gi, read_length_prefixed_bytes,
    read_length_prefixed_string, read_seq_id, read_varsize, write_fixed_u32, write_gi,
    write_length_prefixed_bytes, write_seq_id, write_varsize,
};
pub(crate) use primitive::truncated;
