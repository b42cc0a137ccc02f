//! Notification payload decoding
//!
//! The peripheral sends UTF-8 text of the form `"<roll>,<pitch>,<yaw>"`.
//! Extra trailing fields are ignored.

use crate::domain::error::SampleParseError;
use crate::domain::models::SensorSample;
use std::time::Instant;
use tracing::trace;

/// Decode one notification payload received at `timestamp`.
pub fn decode_payload(payload: &[u8], timestamp: Instant) -> Result<SensorSample, SampleParseError> {
    let text = std::str::from_utf8(payload).map_err(|_| SampleParseError::NotUtf8)?;
    let text = text.trim();
    trace!("Payload: {:?}", text);

    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() < 3 {
        return Err(SampleParseError::MissingFields(fields.len()));
    }

    let mut values = [0.0f64; 3];
    for (index, field) in fields.iter().take(3).enumerate() {
        let field = field.trim();
        let value: f64 = field
            .parse()
            .map_err(|_| SampleParseError::InvalidNumber {
                index,
                value: field.to_string(),
            })?;
        if !value.is_finite() {
            return Err(SampleParseError::NonFinite { index });
        }
        values[index] = value;
    }

    Ok(SensorSample {
        roll: values[0],
        pitch: values[1],
        yaw: values[2],
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic() {
        let now = Instant::now();
        let sample = decode_payload(b"0.25,-1.00,3.5", now).unwrap();
        assert_eq!(sample.roll, 0.25);
        assert_eq!(sample.pitch, -1.0);
        assert_eq!(sample.yaw, 3.5);
        assert_eq!(sample.timestamp, now);
    }

    #[test]
    fn test_decode_ignores_extra_fields_and_whitespace() {
        let sample = decode_payload(b" 1.0, -0.6 ,0.1,42,junk\n", Instant::now()).unwrap();
        assert_eq!(sample.roll, 1.0);
        assert_eq!(sample.pitch, -0.6);
        assert_eq!(sample.yaw, 0.1);
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let err = decode_payload(b"abc,def", Instant::now()).unwrap_err();
        assert_eq!(err, SampleParseError::MissingFields(2));
    }

    #[test]
    fn test_decode_rejects_non_numeric() {
        let err = decode_payload(b"0.1,abc,0.3", Instant::now()).unwrap_err();
        assert_eq!(
            err,
            SampleParseError::InvalidNumber {
                index: 1,
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_decode_rejects_non_finite() {
        let err = decode_payload(b"NaN,0,0", Instant::now()).unwrap_err();
        assert_eq!(err, SampleParseError::NonFinite { index: 0 });
        assert!(decode_payload(b"0,inf,0", Instant::now()).is_err());
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_payload(&[0xff, 0xfe, 0x2c], Instant::now()).unwrap_err();
        assert_eq!(err, SampleParseError::NotUtf8);
    }
}
