//! Bitstream fixtures shared by the codec and prober tests.

/// Baseline 1280x720 (crop bottom 8)
pub const SPS_1280X720: &[u8] = &[0x67, 0x42, 0xc0, 0x1f, 0xf4, 0x02, 0x80, 0x2d, 0xc8];
/// Baseline 720x576
pub const SPS_720X576: &[u8] = &[0x67, 0x42, 0xc0, 0x1f, 0xf4, 0x05, 0xa0, 0x93, 0x20];
/// Baseline 3840x2160 (crop bottom 8)
pub const SPS_3840X2160: &[u8] = &[0x67, 0x42, 0xc0, 0x1f, 0xf4, 0x01, 0xe0, 0x02, 0x1f, 0x20];
/// High profile 1920x1080 as emitted by x264, with emulation prevention bytes
pub const SPS_1920X1080_HIGH: &[u8] = &[
    0x67, 0x64, 0x00, 0x2a, 0xac, 0xd9, 0x40, 0x78, 0x02, 0x27, 0xe5, 0xc0, 0x44, 0x00, 0x00,
    0x03, 0x00, 0x04, 0x00, 0x00, 0x03, 0x00, 0xf0, 0x3c, 0x60, 0xc6, 0x58,
];

#[derive(Default)]
pub struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    pub fn bits(&mut self, value: u64, count: u32) -> &mut Self {
        for shift in (0..count).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
        self
    }

    pub fn flag(&mut self, value: bool) -> &mut Self {
        self.bits.push(value);
        self
    }

    pub fn ue(&mut self, value: u32) -> &mut Self {
        let code = u64::from(value) + 1;
        let length = 64 - code.leading_zeros();
        self.bits(0, length - 1);
        self.bits(code, length)
    }

    pub fn se(&mut self, value: i32) -> &mut Self {
        let code = if value > 0 {
            (value as u32) * 2 - 1
        } else {
            value.unsigned_abs() * 2
        };
        self.ue(code)
    }

    /// Append the rbsp stop bit and pad to a byte boundary
    pub fn finish(mut self) -> Vec<u8> {
        self.bits.push(true);
        while self.bits.len() % 8 != 0 {
            self.bits.push(false);
        }
        self.bits
            .chunks(8)
            .map(|byte| byte.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
            .collect()
    }
}

/// Insert emulation prevention bytes into an RBSP
pub fn add_emulation_prevention(rbsp: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rbsp.len() + 4);
    let mut zeros = 0;
    for &byte in rbsp {
        if zeros >= 2 && byte <= 3 {
            out.push(0x03);
            zeros = 0;
        }
        out.push(byte);
        zeros = if byte == 0 { zeros + 1 } else { 0 };
    }
    out
}

/// Builds SPS NAL units for arbitrary frame sizes
pub struct SpsBuilder {
    profile_idc: u8,
    chroma_format_idc: u32,
    width: u32,
    height: u32,
    frame_mbs_only: bool,
    scaling_lists: bool,
    poc_cycle: Option<u32>,
}

impl SpsBuilder {
    pub fn baseline(width: u32, height: u32) -> Self {
        Self {
            profile_idc: 66,
            chroma_format_idc: 1,
            width,
            height,
            frame_mbs_only: true,
            scaling_lists: false,
            poc_cycle: None,
        }
    }

    pub fn high(width: u32, height: u32) -> Self {
        Self {
            profile_idc: 100,
            ..Self::baseline(width, height)
        }
    }

    pub fn interlaced(mut self) -> Self {
        self.frame_mbs_only = false;
        self
    }

    pub fn with_scaling_lists(mut self) -> Self {
        self.scaling_lists = true;
        self
    }

    pub fn poc_type_one(mut self, cycle: u32) -> Self {
        self.poc_cycle = Some(cycle);
        self
    }

    pub fn chroma_format(mut self, chroma_format_idc: u32) -> Self {
        self.chroma_format_idc = chroma_format_idc;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = BitWriter::default();
        w.bits(u64::from(self.profile_idc), 8).bits(0xc0, 8).bits(31, 8).ue(0);

        if self.profile_idc == 100 {
            w.ue(self.chroma_format_idc);
            if self.chroma_format_idc == 3 {
                w.flag(false);
            }
            w.ue(0).ue(0).flag(false).flag(self.scaling_lists);
            if self.scaling_lists {
                let count = if self.chroma_format_idc == 3 { 12 } else { 8 };
                for index in 0..count {
                    let present = index == 0 || index == 6;
                    w.flag(present);
                    if present {
                        // 8 -> 10 -> 0 ends the list early
                        w.se(2).se(-10);
                    }
                }
            }
        }

        w.ue(0); // log2_max_frame_num_minus4
        match self.poc_cycle {
            Some(cycle) => {
                w.ue(1).flag(false).se(-1).se(1).ue(cycle);
                for offset in 0..cycle {
                    w.se(offset as i32 - 1);
                }
            }
            None => {
                w.ue(0).ue(0);
            }
        }
        w.ue(1).flag(false);

        let field_factor = if self.frame_mbs_only { 1 } else { 2 };
        let (crop_unit_x, crop_unit_y) = if self.chroma_format_idc == 0 {
            (1, field_factor)
        } else {
            let sub_width = if self.chroma_format_idc == 3 { 1 } else { 2 };
            let sub_height = if self.chroma_format_idc == 1 { 2 } else { 1 };
            (sub_width, sub_height * field_factor)
        };
        let width_mbs = self.width.div_ceil(16);
        let map_units = self.height.div_ceil(16 * field_factor);
        let crop_right = (width_mbs * 16 - self.width) / crop_unit_x;
        let crop_bottom = (map_units * 16 * field_factor - self.height) / crop_unit_y;

        w.ue(width_mbs - 1).ue(map_units - 1).flag(self.frame_mbs_only);
        if !self.frame_mbs_only {
            w.flag(false);
        }
        w.flag(true);
        if crop_right > 0 || crop_bottom > 0 {
            w.flag(true).ue(0).ue(crop_right).ue(0).ue(crop_bottom);
        } else {
            w.flag(false);
        }
        w.flag(false); // vui_parameters_present_flag

        let mut nal = vec![0x67];
        nal.extend(add_emulation_prevention(&w.finish()));
        nal
    }
}

pub fn flv_header() -> Vec<u8> {
    vec![b'F', b'L', b'V', 0x01, 0x05, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00]
}

pub fn flv_tag(tag_type: u8, timestamp: u32, data: &[u8]) -> Vec<u8> {
    let size = data.len() as u32;
    let mut tag = vec![tag_type];
    tag.extend_from_slice(&size.to_be_bytes()[1..]);
    tag.extend_from_slice(&timestamp.to_be_bytes()[1..]);
    tag.push((timestamp >> 24) as u8);
    tag.extend_from_slice(&[0, 0, 0]);
    tag.extend_from_slice(data);
    tag.extend_from_slice(&(size + 11).to_be_bytes());
    tag
}

pub fn configuration_record(sps: &[&[u8]], pps: &[&[u8]]) -> Vec<u8> {
    let first = sps.first().copied().unwrap_or(&[0x67, 0x42, 0xc0, 0x1f]);
    let mut record = vec![1, first[1], first[2], first[3], 0xff, 0xe0 | sps.len() as u8];
    for set in sps {
        record.extend_from_slice(&(set.len() as u16).to_be_bytes());
        record.extend_from_slice(set);
    }
    record.push(pps.len() as u8);
    for set in pps {
        record.extend_from_slice(&(set.len() as u16).to_be_bytes());
        record.extend_from_slice(set);
    }
    record
}

/// Video tag body for an AVC sequence header wrapping `record`
pub fn avc_sequence_header(record: &[u8]) -> Vec<u8> {
    let mut data = vec![0x17, 0x00, 0x00, 0x00, 0x00];
    data.extend_from_slice(record);
    data
}

/// A short live FLV stream: metadata, one sequence header, one key frame
pub fn flv_stream(sps: &[u8]) -> Vec<u8> {
    let mut stream = flv_header();
    stream.extend(flv_tag(18, 0, &[0x02, 0x00, 0x0a, b'o', b'n', b'M', b'e', b't', b'a', b'D', b'a', b't', b'a']));
    stream.extend(flv_tag(
        9,
        0,
        &avc_sequence_header(&configuration_record(&[sps], &[&[0x68, 0xce, 0x38, 0x80]])),
    ));
    stream.extend(flv_tag(9, 40, &[0x17, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x65]));
    stream
}
