//! H.264 sequence parameter set parsing (ITU-T H.264 7.3.2.1.1), far enough
//! to recover the cropped frame dimensions. VUI is not read.

use super::bits::{BitReader, strip_emulation_prevention};
use super::errors::SpsError;

pub const NAL_UNIT_TYPE_SPS: u8 = 7;

/// Profiles that carry chroma format, bit depth and scaling matrices
const HIGH_PROFILES: [u8; 13] = [100, 110, 122, 244, 44, 83, 86, 118, 128, 138, 139, 134, 135];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceParameterSet {
    pub profile_idc: u8,
    pub level_idc: u8,
    pub seq_parameter_set_id: u32,
    pub chroma_format_idc: u32,
    pub frame_mbs_only: bool,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
struct FrameCropping {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
}

impl SequenceParameterSet {
    /// Parse a complete SPS NAL unit, header byte included
    pub fn parse(nal: &[u8]) -> Result<Self, SpsError> {
        let (&header, payload) = nal.split_first().ok_or(SpsError::Empty)?;
        let nal_unit_type = header & 0x1f;
        if nal_unit_type != NAL_UNIT_TYPE_SPS {
            return Err(SpsError::NotSps(nal_unit_type));
        }

        let rbsp = strip_emulation_prevention(payload);
        let mut reader = BitReader::new(&rbsp);

        let profile_idc = reader.read_bits(8)? as u8;
        reader.skip_bits(8)?; // constraint_set flags + reserved_zero_2bits
        let level_idc = reader.read_bits(8)? as u8;
        let seq_parameter_set_id = reader.read_ue()?;
        check_range("seq_parameter_set_id", seq_parameter_set_id, 31)?;

        let mut chroma_format_idc = 1;
        let mut separate_colour_plane = false;
        if HIGH_PROFILES.contains(&profile_idc) {
            chroma_format_idc = reader.read_ue()?;
            check_range("chroma_format_idc", chroma_format_idc, 3)?;
            if chroma_format_idc == 3 {
                separate_colour_plane = reader.read_flag()?;
            }
            let bit_depth_luma_minus8 = reader.read_ue()?;
            check_range("bit_depth_luma_minus8", bit_depth_luma_minus8, 6)?;
            let bit_depth_chroma_minus8 = reader.read_ue()?;
            check_range("bit_depth_chroma_minus8", bit_depth_chroma_minus8, 6)?;
            reader.skip_bits(1)?; // qpprime_y_zero_transform_bypass_flag

            if reader.read_flag()? {
                let list_count = if chroma_format_idc == 3 { 12 } else { 8 };
                for index in 0..list_count {
                    if reader.read_flag()? {
                        let size = if index < 6 { 16 } else { 64 };
                        skip_scaling_list(&mut reader, size)?;
                    }
                }
            }
        }

        let log2_max_frame_num_minus4 = reader.read_ue()?;
        check_range("log2_max_frame_num_minus4", log2_max_frame_num_minus4, 12)?;

        let pic_order_cnt_type = reader.read_ue()?;
        match pic_order_cnt_type {
            0 => {
                let log2_max_poc_lsb_minus4 = reader.read_ue()?;
                check_range("log2_max_pic_order_cnt_lsb_minus4", log2_max_poc_lsb_minus4, 12)?;
            }
            1 => {
                reader.skip_bits(1)?; // delta_pic_order_always_zero_flag
                reader.read_se()?; // offset_for_non_ref_pic
                reader.read_se()?; // offset_for_top_to_bottom_field
                let cycle = reader.read_ue()?;
                check_range("num_ref_frames_in_pic_order_cnt_cycle", cycle, 255)?;
                for _ in 0..cycle {
                    reader.read_se()?;
                }
            }
            2 => {}
            other => {
                return Err(SpsError::InvalidValue {
                    field: "pic_order_cnt_type",
                    value: u64::from(other),
                });
            }
        }

        reader.read_ue()?; // max_num_ref_frames
        reader.skip_bits(1)?; // gaps_in_frame_num_value_allowed_flag
        let pic_width_in_mbs_minus1 = reader.read_ue()?;
        let pic_height_in_map_units_minus1 = reader.read_ue()?;
        let frame_mbs_only = reader.read_flag()?;
        if !frame_mbs_only {
            reader.skip_bits(1)?; // mb_adaptive_frame_field_flag
        }
        reader.skip_bits(1)?; // direct_8x8_inference_flag

        let cropping = if reader.read_flag()? {
            FrameCropping {
                left: reader.read_ue()?,
                right: reader.read_ue()?,
                top: reader.read_ue()?,
                bottom: reader.read_ue()?,
            }
        } else {
            FrameCropping::default()
        };

        // Table 6-1 and equations 7-19 .. 7-22
        let chroma_array_type = if separate_colour_plane { 0 } else { chroma_format_idc };
        let field_factor: u64 = if frame_mbs_only { 1 } else { 2 };
        let (crop_unit_x, crop_unit_y): (u64, u64) = if chroma_array_type == 0 {
            (1, field_factor)
        } else {
            let sub_width_c = if chroma_format_idc == 3 { 1 } else { 2 };
            let sub_height_c = if chroma_format_idc == 1 { 2 } else { 1 };
            (sub_width_c, sub_height_c * field_factor)
        };

        let coded_width = (u64::from(pic_width_in_mbs_minus1) + 1) * 16;
        let coded_height = field_factor * (u64::from(pic_height_in_map_units_minus1) + 1) * 16;
        let crop_x = crop_unit_x * (u64::from(cropping.left) + u64::from(cropping.right));
        let crop_y = crop_unit_y * (u64::from(cropping.top) + u64::from(cropping.bottom));

        let width = cropped_dimension("width", coded_width, crop_x)?;
        let height = cropped_dimension("height", coded_height, crop_y)?;

        Ok(Self {
            profile_idc,
            level_idc,
            seq_parameter_set_id,
            chroma_format_idc,
            frame_mbs_only,
            width,
            height,
        })
    }
}

fn skip_scaling_list(reader: &mut BitReader<'_>, size: usize) -> Result<(), SpsError> {
    let mut last_scale: i64 = 8;
    let mut next_scale: i64 = 8;
    for _ in 0..size {
        if next_scale != 0 {
            let delta_scale = i64::from(reader.read_se()?);
            next_scale = (last_scale + delta_scale + 256).rem_euclid(256);
        }
        if next_scale != 0 {
            last_scale = next_scale;
        }
    }
    Ok(())
}

fn check_range(field: &'static str, value: u32, max: u32) -> Result<(), SpsError> {
    if value > max {
        return Err(SpsError::InvalidValue {
            field,
            value: u64::from(value),
        });
    }
    Ok(())
}

fn cropped_dimension(field: &'static str, coded: u64, crop: u64) -> Result<u32, SpsError> {
    coded
        .checked_sub(crop)
        .filter(|value| *value > 0)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or(SpsError::InvalidValue { field, value: coded })
}
