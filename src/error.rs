use thiserror::Error;

/// Position-independent classification of a parse failure.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum StringErrorKind {
    Empty,
    TooManySegments,
    TooFewSegments,
    InvalidCharacter,
    InvalidRadix,
    InvalidSegmentValue,
    InvalidPrefixLength,
    InvalidMask,
    ConflictingDialectOptions,
    InvalidZone,
    MixedFormInvalid,
    RangeNotAllowed,
    LeadingZerosNotAllowed,
}

impl core::fmt::Display for StringErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::Empty => "empty address literal",
            Self::TooManySegments => "too many segments",
            Self::TooFewSegments => "too few segments",
            Self::InvalidCharacter => "invalid character",
            Self::InvalidRadix => "radix not permitted here",
            Self::InvalidSegmentValue => "segment value out of range",
            Self::InvalidPrefixLength => "invalid prefix length",
            Self::InvalidMask => "invalid mask literal",
            Self::ConflictingDialectOptions => "notation not permitted by the parse options",
            Self::InvalidZone => "invalid zone",
            Self::MixedFormInvalid => "invalid mixed IPv6/IPv4 form",
            Self::RangeNotAllowed => "range notation not permitted here",
            Self::LeadingZerosNotAllowed => "leading zeros not permitted here",
        };
        f.write_str(msg)
    }
}

/// Failure to interpret an address literal.
///
/// `index` is the byte offset of the offending token within the input.
#[derive(Clone, Copy, Debug, Error, Hash, PartialEq, Eq)]
#[error("{kind} at offset {index}")]
pub struct AddressStringError {
    pub kind: StringErrorKind,
    pub index: usize,
}

impl AddressStringError {
    pub(crate) const fn new(kind: StringErrorKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// Numeric out-of-range on construction from bytes, integers or segments.
#[derive(Clone, Copy, Debug, Error, Hash, PartialEq, Eq)]
pub enum AddressValueError {
    #[error("segment value exceeds the segment maximum")]
    SegmentValue,
    #[error("segment prefix exceeds the segment bit width")]
    SegmentPrefix,
    #[error("segment range bounds are reversed")]
    ReversedRange,
    #[error("segment count does not match the address family")]
    SegmentCount,
    #[error("byte sequence does not fit the address family")]
    ByteLength,
    #[error("arithmetic stepped outside the address space")]
    Overflow,
}

/// An operation cannot produce a representable result because the resulting
/// set is not a Cartesian product of per-segment intervals.
#[derive(Clone, Copy, Debug, Error, Hash, PartialEq, Eq)]
pub enum IncompatibleAddressError {
    #[error("masked value range is not sequential")]
    NonSequentialMask,
    #[error("value range cannot be expressed with per-segment intervals")]
    NonSequentialRange,
    #[error("bit reversal of a ranged segment is not symmetric")]
    ReversedBitsRange,
    #[error("suffix is a non-contiguous mask, not a prefix length")]
    MaskNotPrefix,
    #[error("a ranged segment cannot be rendered in this string form")]
    RangeFormat,
}

/// A prefix length outside `[0, bit_count]`.
#[derive(Clone, Copy, Debug, Error, Hash, PartialEq, Eq)]
#[error("prefix length {length} exceeds the {bit_count}-bit address size")]
pub struct PrefixLengthError {
    pub length: u32,
    pub bit_count: u8,
}

/// Two values built under different process-wide prefix configurations were
/// combined.
#[derive(Clone, Copy, Debug, Default, Error, Hash, PartialEq, Eq)]
#[error("operands were built under different prefix configurations")]
pub struct NetworkMismatchError;

/// A family conversion was requested that the selected converter cannot
/// perform.
#[derive(Clone, Copy, Debug, Default, Error, Hash, PartialEq, Eq)]
#[error("address is not convertible to the requested family")]
pub struct AddressConversionError;

/// Umbrella error for callers combining several of the above.
#[derive(Clone, Copy, Debug, Error, Hash, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    String(#[from] AddressStringError),
    #[error(transparent)]
    Value(#[from] AddressValueError),
    #[error(transparent)]
    Incompatible(#[from] IncompatibleAddressError),
    #[error(transparent)]
    PrefixLength(#[from] PrefixLengthError),
    #[error(transparent)]
    NetworkMismatch(#[from] NetworkMismatchError),
    #[error(transparent)]
    Conversion(#[from] AddressConversionError),
}
