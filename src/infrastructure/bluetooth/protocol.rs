//! Gyro Peripheral Protocol
//!
//! UUID handling and raw payload extraction for the orientation stream.
//! The payload itself is decoded in `domain::sample`.

use anyhow::Result;

/// Default orientation service UUID advertised by the peripheral
pub const SERVICE_UUID: &str = "0000a000-0000-1000-8000-00805f9b34fb";

/// Default characteristic UUID that notifies `"<roll>,<pitch>,<yaw>"` text
pub const SENSOR_CHAR_UUID: &str = "0000a001-0000-1000-8000-00805f9b34fb";

/// Parse a hyphenated or plain 32-digit UUID string into its 128-bit value
pub fn parse_uuid(uuid_str: &str) -> Result<u128> {
    let hex = uuid_str.trim().replace('-', "");

    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow::anyhow!("Invalid UUID format: {}", uuid_str));
    }

    Ok(u128::from_str_radix(&hex, 16)?)
}

/// Parse a UUID string into a Windows GUID
#[cfg(windows)]
pub fn parse_guid(uuid_str: &str) -> Result<windows::core::GUID> {
    Ok(windows::core::GUID::from_u128(parse_uuid(uuid_str)?))
}

/// Copy the bytes out of a notification buffer
#[cfg(windows)]
pub fn read_buffer(buffer: &windows::Storage::Streams::IBuffer) -> windows::core::Result<Vec<u8>> {
    use windows::Storage::Streams::DataReader;

    let reader = DataReader::FromBuffer(buffer)?;
    let length = reader.UnconsumedBufferLength()? as usize;
    let mut bytes = vec![0u8; length];
    reader.ReadBytes(&mut bytes)?;

    tracing::trace!("Raw notification: {:02X?}", &bytes);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid() {
        let value = parse_uuid(SERVICE_UUID).unwrap();
        assert_eq!(value >> 96, 0x0000a000);
        assert_eq!(value & 0xffff_ffff_ffff, 0x00805f9b34fb);
    }

    #[test]
    fn test_parse_uuid_without_hyphens() {
        assert_eq!(
            parse_uuid("0000a00100001000800000805f9b34fb").unwrap(),
            parse_uuid(SENSOR_CHAR_UUID).unwrap()
        );
    }

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        assert!(parse_uuid("0000a000").is_err());
        assert!(parse_uuid("zzzza000-0000-1000-8000-00805f9b34fb").is_err());
        assert!(parse_uuid("").is_err());
    }
}
