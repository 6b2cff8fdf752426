//! Encoded polyline decoding.
//!
//! The directions provider returns the route overview as an encoded polyline:
//! each coordinate is stored as a zig-zag signed delta from the previous one,
//! scaled by 1e5 and split into 5-bit chunks offset by 63 into printable ASCII.

use thiserror::Error;

use super::LatLng;

/// Fixed-point precision of the encoding (5 decimal places).
const PRECISION: f64 = 1e5;

/// ASCII offset applied to every encoded chunk.
const CHUNK_OFFSET: u8 = 63;

/// Continuation bit set on every chunk but the last of a value.
const CONTINUATION_BIT: u64 = 0x20;

/// Maximum shift before a value would overflow 64 bits.
const MAX_SHIFT: u32 = 60;

/// Errors from decoding an encoded polyline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// A byte outside the encoding alphabet (`?`..=`~`).
    #[error("Invalid polyline character {byte:#04x} at offset {offset}")]
    InvalidCharacter { byte: u8, offset: usize },

    /// Input ended in the middle of a value.
    #[error("Polyline truncated at offset {offset}")]
    Truncated { offset: usize },

    /// A value used more chunks than fit in 64 bits.
    #[error("Polyline value overflow at offset {offset}")]
    Overflow { offset: usize },
}

/// Decode an encoded polyline into coordinates.
///
/// An empty string decodes to an empty path.
pub fn decode_polyline(encoded: &str) -> Result<Vec<LatLng>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut path = Vec::new();
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while offset < bytes.len() {
        lat += next_value(bytes, &mut offset)?;
        lng += next_value(bytes, &mut offset)?;
        path.push(LatLng::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(path)
}

/// Read one zig-zag encoded value starting at `offset`.
fn next_value(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes
            .get(*offset)
            .ok_or(PolylineError::Truncated { offset: *offset })?;
        if !(CHUNK_OFFSET..=b'~').contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                byte,
                offset: *offset,
            });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { offset: *offset });
        }
        *offset += 1;

        let chunk = (byte - CHUNK_OFFSET) as u64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < CONTINUATION_BIT {
            break;
        }
    }

    // Undo zig-zag: low bit carries the sign
    let magnitude = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &LatLng, lat: f64, lng: f64) {
        assert!(
            (actual.lat - lat).abs() < 1e-9 && (actual.lng - lng).abs() < 1e-9,
            "expected ({}, {}), got ({}, {})",
            lat,
            lng,
            actual.lat,
            actual.lng
        );
    }

    #[test]
    fn test_decode_reference_polyline() {
        // Reference example from the encoding documentation
        let path = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(path.len(), 3);
        assert_close(&path[0], 38.5, -120.2);
        assert_close(&path[1], 40.7, -120.95);
        assert_close(&path[2], 43.252, -126.453);
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_polyline("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_origin() {
        // "??" encodes a single (0, 0) point
        let path = decode_polyline("??").unwrap();
        assert_eq!(path.len(), 1);
        assert_close(&path[0], 0.0, 0.0);
    }

    #[test]
    fn test_decode_truncated_latitude_only() {
        // Latitude of the first point with no longitude following
        let err = decode_polyline("_p~iF").unwrap_err();
        assert_eq!(err, PolylineError::Truncated { offset: 5 });
    }

    #[test]
    fn test_decode_truncated_mid_value() {
        // Continuation chunk with nothing after it
        let err = decode_polyline("_").unwrap_err();
        assert_eq!(err, PolylineError::Truncated { offset: 1 });
    }

    #[test]
    fn test_decode_invalid_character() {
        let err = decode_polyline("?? ").unwrap_err();
        assert_eq!(
            err,
            PolylineError::InvalidCharacter {
                byte: b' ',
                offset: 2
            }
        );
    }

    #[test]
    fn test_decode_overflow() {
        let err = decode_polyline(&"_".repeat(20)).unwrap_err();
        assert!(matches!(err, PolylineError::Overflow { .. }));
    }
}
