//! AVCDecoderConfigurationRecord (ISO/IEC 14496-15 5.2.4.1).
//!
//! ```text
//! configurationVersion(8) = 1
//! AVCProfileIndication(8) profile_compatibility(8) AVCLevelIndication(8)
//! reserved(6) lengthSizeMinusOne(2)
//! reserved(3) numOfSequenceParameterSets(5)
//!   { sequenceParameterSetLength(16) sequenceParameterSetNALUnit }
//! numOfPictureParameterSets(8)
//!   { pictureParameterSetLength(16) pictureParameterSetNALUnit }
//! ```

use bytes::{Buf, Bytes};

use super::errors::AvcError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvcDecoderConfigurationRecord {
    pub version: u8,
    pub profile_indication: u8,
    pub profile_compatibility: u8,
    pub level_indication: u8,
    pub nalu_length_size: u8,
    pub sps: Vec<Bytes>,
    pub pps: Vec<Bytes>,
}

impl AvcDecoderConfigurationRecord {
    pub fn parse(mut data: Bytes) -> Result<Self, AvcError> {
        let version = take_u8(&mut data, "configurationVersion")?;
        if version != 1 {
            return Err(AvcError::UnsupportedVersion(version));
        }
        let profile_indication = take_u8(&mut data, "AVCProfileIndication")?;
        let profile_compatibility = take_u8(&mut data, "profile_compatibility")?;
        let level_indication = take_u8(&mut data, "AVCLevelIndication")?;
        let nalu_length_size = (take_u8(&mut data, "lengthSizeMinusOne")? & 0x03) + 1;

        let sps_count = take_u8(&mut data, "numOfSequenceParameterSets")? & 0x1f;
        let sps = take_parameter_sets(&mut data, usize::from(sps_count), "sequenceParameterSetNALUnit")?;

        // Some muxers stop after the SPS list; treat a missing PPS count as zero
        let pps = if data.has_remaining() {
            let pps_count = take_u8(&mut data, "numOfPictureParameterSets")?;
            take_parameter_sets(&mut data, usize::from(pps_count), "pictureParameterSetNALUnit")?
        } else {
            Vec::new()
        };

        Ok(Self {
            version,
            profile_indication,
            profile_compatibility,
            level_indication,
            nalu_length_size,
            sps,
            pps,
        })
    }
}

fn take_u8(data: &mut Bytes, field: &'static str) -> Result<u8, AvcError> {
    ensure(data, 1, field)?;
    Ok(data.get_u8())
}

fn take_parameter_sets(
    data: &mut Bytes,
    count: usize,
    field: &'static str,
) -> Result<Vec<Bytes>, AvcError> {
    let mut sets = Vec::with_capacity(count);
    for _ in 0..count {
        ensure(data, 2, field)?;
        let length = usize::from(data.get_u16());
        ensure(data, length, field)?;
        sets.push(data.split_to(length));
    }
    Ok(sets)
}

fn ensure(data: &Bytes, needed: usize, field: &'static str) -> Result<(), AvcError> {
    if data.remaining() < needed {
        return Err(AvcError::Truncated {
            field,
            needed,
            available: data.remaining(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::test_support::{SPS_1280X720, configuration_record};

    #[test]
    fn parses_sps_and_pps() {
        let pps = [0x68, 0xce, 0x38, 0x80];
        let record = configuration_record(&[SPS_1280X720], &[&pps]);

        let parsed = AvcDecoderConfigurationRecord::parse(Bytes::from(record)).unwrap();

        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.profile_indication, SPS_1280X720[1]);
        assert_eq!(parsed.level_indication, SPS_1280X720[3]);
        assert_eq!(parsed.nalu_length_size, 4);
        assert_eq!(parsed.sps, vec![Bytes::from_static(SPS_1280X720)]);
        assert_eq!(parsed.pps, vec![Bytes::copy_from_slice(&pps)]);
    }

    #[test]
    fn empty_sps_list_is_not_an_error_here() {
        let record = configuration_record(&[], &[]);
        let parsed = AvcDecoderConfigurationRecord::parse(Bytes::from(record)).unwrap();
        assert!(parsed.sps.is_empty());
    }

    #[test]
    fn truncated_sps_is_reported() {
        let mut record = configuration_record(&[SPS_1280X720], &[]);
        record.truncate(10);
        let err = AvcDecoderConfigurationRecord::parse(Bytes::from(record)).unwrap_err();
        assert!(matches!(
            err,
            AvcError::Truncated {
                field: "sequenceParameterSetNALUnit",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = AvcDecoderConfigurationRecord::parse(Bytes::from_static(&[2, 0x42, 0, 0x1f])).unwrap_err();
        assert_eq!(err, AvcError::UnsupportedVersion(2));
    }

    #[test]
    fn reports_missing_fields() {
        let err = AvcDecoderConfigurationRecord::parse(Bytes::from_static(&[1, 0x42])).unwrap_err();
        assert_eq!(
            err,
            AvcError::Truncated {
                field: "profile_compatibility",
                needed: 1,
                available: 0
            }
        );
    }
}
