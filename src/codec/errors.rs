use thiserror::Error;

/// Bit-level read failures while walking an RBSP
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    #[error("unexpected end of data after {consumed} bits")]
    EndOfData { consumed: usize },

    #[error("cannot read {requested} bits at once (max 32)")]
    TooManyBits { requested: u8 },

    #[error("exp-golomb code longer than 32 bits")]
    ExpGolombOverflow,
}

/// FLV container framing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlvError {
    #[error("invalid FLV signature: {found:02x?}")]
    InvalidSignature { found: [u8; 3] },

    #[error("invalid FLV header size: {size}")]
    InvalidHeaderSize { size: u32 },
}

/// AVCDecoderConfigurationRecord errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvcError {
    #[error("configuration record truncated: needed {needed} bytes for {field}, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("unsupported configuration version: {0}")]
    UnsupportedVersion(u8),
}

/// Sequence parameter set parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpsError {
    #[error("bit error: {0}")]
    Bits(#[from] BitError),

    #[error("empty NAL unit")]
    Empty,

    #[error("NAL unit type {0} is not a sequence parameter set")]
    NotSps(u8),

    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: u64 },
}
