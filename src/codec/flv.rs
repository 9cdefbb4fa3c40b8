//! Incremental FLV tag reader.
//!
//! ```text
//! +--------------------+--------------------------------------------------------+
//! | FLV header         | PreviousTagSize0(4) | Tag1 | PreviousTagSize1(4) | ... |
//! +--------------------+--------------------------------------------------------+
//!
//! Tag header (11 bytes):
//! | Type(1) | DataSize(3) | Timestamp(3) | TimestampExt(1) | StreamID(3) | Data |
//!
//! Video tag data, codec id 7 (AVC):
//! | FrameType(4b) CodecID(4b) | AVCPacketType(1) | CompositionTime(3) | Payload |
//! ```
//!
//! Chunks arrive from the network in arbitrary sizes, so the reader buffers
//! until a whole tag is available and hands tags out one at a time.

use bytes::{Buf, Bytes, BytesMut};

use super::errors::FlvError;

pub const FLV_SIGNATURE: &[u8; 3] = b"FLV";
pub const FLV_HEADER_MIN_LEN: usize = 9;
pub const TAG_HEADER_LEN: usize = 11;
pub const PREVIOUS_TAG_SIZE_LEN: usize = 4;

pub const CODEC_ID_AVC: u8 = 7;
pub const FRAME_TYPE_KEY: u8 = 1;
pub const AVC_PACKET_SEQUENCE_HEADER: u8 = 0;
/// FrameType/CodecID, AVCPacketType and CompositionTime ahead of the AVC payload
pub const AVC_VIDEO_PREAMBLE_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    Audio,
    Video,
    Script,
    Other(u8),
}

impl From<u8> for TagType {
    fn from(value: u8) -> Self {
        // the top bits carry the filter/reserved flags
        match value & 0x1f {
            8 => TagType::Audio,
            9 => TagType::Video,
            18 => TagType::Script,
            other => TagType::Other(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlvTag {
    pub tag_type: TagType,
    pub timestamp: u32,
    pub data: Bytes,
}

impl FlvTag {
    /// Key frame AVC packet carrying the decoder configuration record
    pub fn is_avc_sequence_header(&self) -> bool {
        self.tag_type == TagType::Video
            && self.data.len() >= 2
            && self.data[0] >> 4 == FRAME_TYPE_KEY
            && self.data[0] & 0x0f == CODEC_ID_AVC
            && self.data[1] == AVC_PACKET_SEQUENCE_HEADER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Header,
    Tags,
}

#[derive(Debug)]
pub struct FlvTagReader {
    buffer: BytesMut,
    state: ReadState,
}

impl Default for FlvTagReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FlvTagReader {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            state: ReadState::Header,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Next complete tag, or `None` when more bytes are needed
    pub fn next_tag(&mut self) -> Result<Option<FlvTag>, FlvError> {
        if self.state == ReadState::Header && !self.consume_header()? {
            return Ok(None);
        }

        if self.buffer.len() < TAG_HEADER_LEN {
            return Ok(None);
        }

        let header = &self.buffer[..TAG_HEADER_LEN];
        let data_size = read_u24(&header[1..4]) as usize;
        let total = TAG_HEADER_LEN + data_size + PREVIOUS_TAG_SIZE_LEN;
        if self.buffer.len() < total {
            return Ok(None);
        }

        let tag_type = TagType::from(header[0]);
        let timestamp = read_u24(&header[4..7]) | (u32::from(header[7]) << 24);

        self.buffer.advance(TAG_HEADER_LEN);
        let data = self.buffer.split_to(data_size).freeze();
        self.buffer.advance(PREVIOUS_TAG_SIZE_LEN);

        Ok(Some(FlvTag {
            tag_type,
            timestamp,
            data,
        }))
    }

    /// Returns false while the header (plus PreviousTagSize0) is incomplete
    fn consume_header(&mut self) -> Result<bool, FlvError> {
        if self.buffer.len() < FLV_HEADER_MIN_LEN {
            return Ok(false);
        }

        if &self.buffer[..3] != FLV_SIGNATURE {
            let mut found = [0u8; 3];
            found.copy_from_slice(&self.buffer[..3]);
            return Err(FlvError::InvalidSignature { found });
        }

        let header_size = u32::from_be_bytes([
            self.buffer[5],
            self.buffer[6],
            self.buffer[7],
            self.buffer[8],
        ]);
        if (header_size as usize) < FLV_HEADER_MIN_LEN {
            return Err(FlvError::InvalidHeaderSize { size: header_size });
        }

        let skip = header_size as usize + PREVIOUS_TAG_SIZE_LEN;
        if self.buffer.len() < skip {
            return Ok(false);
        }

        self.buffer.advance(skip);
        self.state = ReadState::Tags;
        Ok(true)
    }
}

fn read_u24(bytes: &[u8]) -> u32 {
    (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2])
}
