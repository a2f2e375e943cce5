//! Minutiae templates.

use crate::error::BiometricError;
use rootcause::Report;
use serde::{Deserialize, Serialize};

/// Maximum minutiae a single record can carry (the count is one byte).
pub const MAX_MINUTIAE: usize = u8::MAX as usize;

/// Magic prefix of a serialized minutiae record.
pub(crate) const RECORD_MAGIC: &[u8; 4] = b"FMR\0";

/// Bytes in the record header: magic, width, height, count.
pub(crate) const HEADER_LEN: usize = 9;

/// Bytes per serialized minutia.
pub(crate) const MINUTIA_LEN: usize = 6;

/// Ridge feature type of a minutia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinutiaKind {
    /// Unclassified feature.
    Other,
    /// A ridge terminates.
    RidgeEnding,
    /// A ridge splits in two.
    Bifurcation,
}

impl MinutiaKind {
    /// Returns the record encoding of this kind.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Other => 0,
            Self::RidgeEnding => 1,
            Self::Bifurcation => 2,
        }
    }

    /// Decodes a record kind byte.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Other),
            1 => Some(Self::RidgeEnding),
            2 => Some(Self::Bifurcation),
            _ => None,
        }
    }
}

/// A single ridge feature: position, orientation and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minutia {
    /// Horizontal position in pixels.
    pub x: u16,
    /// Vertical position in pixels.
    pub y: u16,
    /// Ridge direction in degrees, 0..360, stored at 2 degree resolution.
    pub angle: u16,
    /// Feature type.
    pub kind: MinutiaKind,
}

impl Minutia {
    /// Creates a minutia. The angle is normalized to 0..360 and rounded
    /// down to the 2 degree resolution of the record format.
    #[must_use]
    pub fn new(x: u16, y: u16, angle: u16, kind: MinutiaKind) -> Self {
        let angle = (angle % 360) / 2 * 2;
        Self { x, y, angle, kind }
    }
}

/// The minutiae extracted from one fingerprint sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintTemplate {
    width: u16,
    height: u16,
    minutiae: Vec<Minutia>,
}

impl FingerprintTemplate {
    /// Creates a template for an image of `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricData` if a dimension is zero, there are more
    /// than [`MAX_MINUTIAE`] minutiae, or a minutia lies outside the image or
    /// has an angle of 360 or more.
    pub fn new(
        width: u16,
        height: u16,
        minutiae: Vec<Minutia>,
    ) -> Result<Self, Report<BiometricError>> {
        if width == 0 || height == 0 {
            return Err(BiometricError::invalid("image dimensions must be non-zero").into());
        }
        if minutiae.len() > MAX_MINUTIAE {
            return Err(BiometricError::invalid(format!(
                "{} minutiae exceeds the maximum of {MAX_MINUTIAE}",
                minutiae.len()
            ))
            .into());
        }
        if let Some(m) = minutiae.iter().find(|m| m.x >= width || m.y >= height) {
            return Err(BiometricError::invalid(format!(
                "minutia at ({}, {}) outside {width}x{height} image",
                m.x, m.y
            ))
            .into());
        }
        if let Some(m) = minutiae.iter().find(|m| m.angle >= 360) {
            return Err(BiometricError::invalid(format!(
                "minutia angle {} out of range (0..360)",
                m.angle
            ))
            .into());
        }
        Ok(Self {
            width,
            height,
            minutiae,
        })
    }

    /// Returns the image width in pixels.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Returns the image height in pixels.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns the minutiae.
    #[must_use]
    pub fn minutiae(&self) -> &[Minutia] {
        &self.minutiae
    }

    /// Returns true if the template has no minutiae.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minutiae.is_empty()
    }

    /// Serializes the template as a minutiae record, the format read by
    /// [`MinutiaeRecordExtractor`](crate::MinutiaeRecordExtractor).
    #[must_use]
    pub fn to_record_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.minutiae.len() * MINUTIA_LEN);
        out.extend_from_slice(RECORD_MAGIC);
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        // Bounded by MAX_MINUTIAE in `new`.
        out.push(self.minutiae.len() as u8);
        for m in &self.minutiae {
            out.extend_from_slice(&m.x.to_be_bytes());
            out.extend_from_slice(&m.y.to_be_bytes());
            out.push((m.angle / 2) as u8);
            out.push(m.kind.code());
        }
        out
    }
}
