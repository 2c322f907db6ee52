use std::error::Error as StdError;

/// Custom Result type for binsnp operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the binsnp library, encompassing all possible error cases
/// that can occur while encoding, decoding or building SNP tables.
///
/// Every error is fatal to the read or write call that raised it.
/// A table that fails to decode is discarded as a whole.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Errors raised by the scalar field codec
    #[error("Error processing field: {0}")]
    CodecError(#[from] CodecError),

    /// Errors raised while loading or storing an indexed table
    #[error("Error processing indexed table: {0}")]
    TableError(#[from] TableError),

    /// A record index that does not resolve within its table
    #[error("Error validating SNP record: {0}")]
    IndexError(#[from] IndexError),

    /// Errors that occur during read operations
    #[error("Error reading SNP table: {0}")]
    ReadError(#[from] ReadError),

    /// Errors that occur during write operations
    #[error("Error writing SNP table: {0}")]
    WriteError(#[from] WriteError),

    /// Errors that occur while converting verbose features into a table
    #[error("Error building SNP table: {0}")]
    BuilderError(#[from] BuilderError),

    /// Standard I/O errors
    #[error("Error with IO: {0}")]
    IoError(#[from] std::io::Error),

    /// UTF-8 conversion errors
    #[error("Error with UTF8: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// Errors decoding or encoding verbose features
    #[error("Error with feature encoding: {0}")]
    FeatureEncodingError(#[from] serde_json::Error),

    /// Generic errors for other unexpected situations
    #[error("Generic error: {0}")]
    GenericError(#[from] Box<dyn StdError + Send + Sync>),
}
impl Error {
    /// Checks if the error was caused by a stream ending before a field was complete
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::CodecError(CodecError::Truncated { .. }))
    }

    /// Checks if the error was caused by a magic number mismatch
    ///
    /// Data written by an incompatible version of the format is never interpreted.
    #[must_use]
    pub fn is_version_mismatch(&self) -> bool {
        matches!(self, Self::ReadError(ReadError::InvalidMagicNumber(_)))
    }
}

/// Errors raised by the primitive scalar codec
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// Fewer bytes were available than the field requires
    #[error("Stream truncated while reading {field}")]
    Truncated { field: &'static str },

    /// A host value does not fit the wire width of its field
    #[error("Value {value} of {field} does not fit in 32 bits")]
    ValueTooLarge { field: &'static str, value: u64 },

    /// A variable-length size overflows the 32-bit size type
    #[error("Variable-length size overflow while reading {field}")]
    SizeOverflow { field: &'static str },

    /// A length-prefixed entry claims more bytes than allowed
    #[error("Length {length} of {field} exceeds the maximum of {max_length}")]
    LengthTooLarge {
        field: &'static str,
        length: usize,
        max_length: usize,
    },

    /// A 64-bit gi was read by a reader limited to 32-bit gi values
    #[error("Gi value {value} of {field} does not fit in 32 bits")]
    GiOverflow { field: &'static str, value: i64 },

    /// A textual sequence identifier was empty
    #[error("Empty sequence identifier")]
    EmptySeqId,
}

/// Errors raised while loading or storing indexed string and octet-string tables
#[derive(thiserror::Error, Debug)]
pub enum TableError {
    /// A table claims more entries than its index field can address
    #[error("Table {field} has {count} entries but at most {max_count} are addressable")]
    CountTooLarge {
        field: &'static str,
        count: usize,
        max_count: usize,
    },

    /// The concatenated size of an octet table is not a multiple of its element size
    #[error("Octet table {field} size {total_size} is not a multiple of element size {element_size}")]
    MisalignedOctets {
        field: &'static str,
        total_size: usize,
        element_size: usize,
    },
}

/// A per-record index that does not resolve within its table
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// The index is neither the absent sentinel nor below the table size
    #[error("SNP record {record}: {field} index {index} is out of range (table size {size})")]
    OutOfRange {
        record: usize,
        field: &'static str,
        index: usize,
        size: usize,
    },

    /// The 2-bit quality-code tag selects neither table
    #[error("SNP record {record}: invalid quality codes tag {tag:#04x}")]
    InvalidQualityCodesTag { record: usize, tag: u8 },
}

/// Errors that can occur while reading a SNP table stream
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// The stream was produced by an incompatible version of the format
    ///
    /// # Arguments
    /// * `u32` - The magic number that was found
    #[error("Invalid magic number: {0:#010x}")]
    InvalidMagicNumber(u32),

    /// The file being read is not a regular file
    #[error("File is not regular")]
    IncompatibleFile,

    /// A compressed blob decodes to more bytes than the reader allows
    #[error("Decompressed {field} exceeds the maximum of {max_length} bytes")]
    DecompressedTooLarge {
        field: &'static str,
        max_length: usize,
    },
}

/// Errors that can occur while writing a SNP table
#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    /// Gi 0 is reserved as the textual sequence identifier sentinel
    #[error("Gi 0 is reserved and cannot identify a sequence")]
    ZeroGi,

    /// A table has outgrown the index field that addresses it
    #[error("Table {field} has {count} entries but at most {max_count} are addressable")]
    TableOverflow {
        field: &'static str,
        count: usize,
        max_count: usize,
    },

    /// An entry is longer than a default reader accepts
    #[error("Entry of {field} has length {length}, exceeding the maximum of {max_length}")]
    EntryTooLong {
        field: &'static str,
        length: usize,
        max_length: usize,
    },
}

/// Errors that can occur while converting verbose features into a table
#[derive(thiserror::Error, Debug)]
pub enum BuilderError {
    /// No feature provided a sequence identifier for the table
    #[error("No sequence identifier available: the annotation has no features")]
    MissingSeqId,

    /// A record index is out of range of the table being built
    #[error("Feature index {index} is out of range ({count} records)")]
    FeatureOutOfRange { index: usize, count: usize },

    /// The sequence identifier is gi 0 or empty text and cannot be written
    #[error("Sequence identifier {0:?} cannot identify a sequence")]
    InvalidSeqId(crate::SeqId),
}

/// Trait for converting arbitrary errors into `Error`
pub trait IntoBinsnpError {
    fn into_binsnp_error(self) -> Error;
}

impl<E> IntoBinsnpError for E
where
    E: StdError + Send + Sync + 'static,
{
    fn into_binsnp_error(self) -> Error {
        Error::GenericError(Box::new(self))
    }
}
