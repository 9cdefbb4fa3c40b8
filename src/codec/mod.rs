//! Media bitstream parsing used by the live stream probe
//!
//! Only what resolution detection needs is implemented: FLV tag framing,
//! the AVC decoder configuration record carried by a sequence header, and
//! the H.264 sequence parameter set.

pub mod avc;
pub mod bits;
pub mod errors;
pub mod flv;
pub mod sps;

#[cfg(test)]
pub(crate) mod test_support;

pub use avc::AvcDecoderConfigurationRecord;
pub use errors::{AvcError, BitError, FlvError, SpsError};
pub use flv::{FlvTag, FlvTagReader, TagType};
pub use sps::SequenceParameterSet;
