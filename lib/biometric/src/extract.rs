//! Template extraction from raw fingerprint payloads.
//!
//! Sensor image processing is not part of this crate. Payloads arriving at
//! the door controller are expected to already be minutiae records; the
//! extractor validates and decodes them.

use crate::error::BiometricError;
use crate::template::{
    FingerprintTemplate, HEADER_LEN, MINUTIA_LEN, Minutia, MinutiaKind, RECORD_MAGIC,
};
use rootcause::Report;

/// Turns a raw biometric payload into a minutiae template.
pub trait TemplateExtractor: Send + Sync {
    /// Extracts a template from `raw`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricData` if the payload cannot be parsed.
    fn extract(&self, raw: &[u8]) -> Result<FingerprintTemplate, Report<BiometricError>>;
}

/// Decodes the compact minutiae record format.
///
/// Layout: `b"FMR\0"`, width `u16` BE, height `u16` BE, count `u8`, then
/// `count` records of `x u16 BE, y u16 BE, angle u8 (2 degree units), kind u8`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinutiaeRecordExtractor;

impl TemplateExtractor for MinutiaeRecordExtractor {
    fn extract(&self, raw: &[u8]) -> Result<FingerprintTemplate, Report<BiometricError>> {
        if raw.len() < HEADER_LEN {
            return Err(BiometricError::invalid(format!(
                "payload of {} bytes is shorter than the {HEADER_LEN} byte header",
                raw.len()
            ))
            .into());
        }
        if &raw[..4] != RECORD_MAGIC {
            return Err(BiometricError::invalid("missing minutiae record magic").into());
        }

        let width = u16::from_be_bytes([raw[4], raw[5]]);
        let height = u16::from_be_bytes([raw[6], raw[7]]);
        let count = usize::from(raw[8]);

        let body = &raw[HEADER_LEN..];
        let expected = count * MINUTIA_LEN;
        if body.len() != expected {
            return Err(BiometricError::invalid(format!(
                "expected {expected} bytes for {count} minutiae, found {}",
                body.len()
            ))
            .into());
        }

        let mut minutiae = Vec::with_capacity(count);
        for chunk in body.chunks_exact(MINUTIA_LEN) {
            let x = u16::from_be_bytes([chunk[0], chunk[1]]);
            let y = u16::from_be_bytes([chunk[2], chunk[3]]);
            let angle_units = chunk[4];
            if angle_units >= 180 {
                return Err(BiometricError::invalid(format!(
                    "angle {angle_units} out of range (0..180)"
                ))
                .into());
            }
            let kind = MinutiaKind::from_code(chunk[5]).ok_or_else(|| {
                BiometricError::invalid(format!("unknown minutia kind {}", chunk[5]))
            })?;
            minutiae.push(Minutia::new(x, y, u16::from(angle_units) * 2, kind));
        }

        FingerprintTemplate::new(width, height, minutiae)
    }
}
