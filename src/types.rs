//! Core value types: element types, byte order, viewing planes and windows

use crate::error::{RawSliceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric encoding of one sample in a raw volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ElementType {
    /// Unsigned 8-bit integer
    Uint8 = 0,
    /// Signed 8-bit integer
    Int8 = 1,
    /// Unsigned 16-bit integer
    Uint16 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Unsigned 32-bit integer
    Uint32 = 4,
    /// Signed 32-bit integer
    Int32 = 5,
    /// 32-bit IEEE-754 floating point
    Float32 = 6,
    /// 64-bit IEEE-754 floating point
    Float64 = 7,
}

impl ElementType {
    /// Every supported element type, in catalog order
    pub const ALL: [ElementType; 8] = [
        ElementType::Uint8,
        ElementType::Int8,
        ElementType::Uint16,
        ElementType::Int16,
        ElementType::Uint32,
        ElementType::Int32,
        ElementType::Float32,
        ElementType::Float64,
    ];

    /// Size in bytes of one sample of this type
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ElementType::Uint8 | ElementType::Int8 => 1,
            ElementType::Uint16 | ElementType::Int16 => 2,
            ElementType::Uint32 | ElementType::Int32 | ElementType::Float32 => 4,
            ElementType::Float64 => 8,
        }
    }

    /// Lower-case name used by hosts ("uint8", "float32", ...)
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Uint8 => "uint8",
            ElementType::Int8 => "int8",
            ElementType::Uint16 => "uint16",
            ElementType::Int16 => "int16",
            ElementType::Uint32 => "uint32",
            ElementType::Int32 => "int32",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
        }
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Check if this is a signed type
    pub fn is_signed(&self) -> bool {
        !matches!(
            self,
            ElementType::Uint8 | ElementType::Uint16 | ElementType::Uint32
        )
    }
}

impl FromStr for ElementType {
    type Err = RawSliceError;

    fn from_str(s: &str) -> Result<Self> {
        ElementType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| RawSliceError::UnsupportedType(s.to_string()))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of multi-byte samples; ignored for single-byte types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// Map a host-side `littleEndian` flag to a byte order
    pub fn from_little_endian(little_endian: bool) -> Self {
        if little_endian {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    pub fn is_little_endian(&self) -> bool {
        matches!(self, ByteOrder::Little)
    }
}

impl FromStr for ByteOrder {
    type Err = RawSliceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "little" => Ok(ByteOrder::Little),
            "big" => Ok(ByteOrder::Big),
            _ => Err(RawSliceError::UnsupportedByteOrder(s.to_string())),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Little => f.write_str("little"),
            ByteOrder::Big => f.write_str("big"),
        }
    }
}

/// Plane along which slices are taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewingPlane {
    /// Fixed z; contiguous `width x height` blocks in file order
    #[default]
    Axial,
    /// Fixed y; one row gathered from every z block
    Coronal,
}

impl FromStr for ViewingPlane {
    type Err = RawSliceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "axial" => Ok(ViewingPlane::Axial),
            "coronal" => Ok(ViewingPlane::Coronal),
            _ => Err(RawSliceError::UnsupportedPlane(s.to_string())),
        }
    }
}

impl fmt::Display for ViewingPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewingPlane::Axial => f.write_str("axial"),
            ViewingPlane::Coronal => f.write_str("coronal"),
        }
    }
}

/// Display window (level/width expressed as a value interval).
///
/// `min <= max` is not enforced; an inverted window still maps into
/// `[0, 255]`, and [`Window::normalized`] swaps the bounds when needed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub min: f64,
    pub max: f64,
}

impl Window {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Window with `min <= max`
    pub fn normalized(&self) -> Self {
        if self.min > self.max {
            Self::new(self.max, self.min)
        } else {
            *self
        }
    }

    /// Width of the window, with a degenerate window counted as 1
    pub fn range(&self) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }
}

impl From<Extrema> for Window {
    fn from(extrema: Extrema) -> Self {
        Self::new(extrema.min, extrema.max)
    }
}

/// Minimum and maximum sample value of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

impl Extrema {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Merge two partial results with the same strict comparisons a scan uses
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: if other.min < self.min { other.min } else { self.min },
            max: if other.max > self.max { other.max } else { self.max },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        let widths: Vec<usize> = ElementType::ALL
            .iter()
            .map(|ty| ty.bytes_per_pixel())
            .collect();
        assert_eq!(widths, vec![1, 1, 2, 2, 4, 4, 4, 8]);
    }

    #[test]
    fn test_element_type_names() {
        for ty in ElementType::ALL {
            assert_eq!(ty.name().parse::<ElementType>().unwrap(), ty);
            assert_eq!(ty.to_string(), ty.name());
        }
        assert!(matches!(
            "complex64".parse::<ElementType>(),
            Err(RawSliceError::UnsupportedType(name)) if name == "complex64"
        ));
        assert!("Float32".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_element_type_serde() {
        let json = serde_json::to_string(&ElementType::Uint16).unwrap();
        assert_eq!(json, "\"uint16\"");
        let ty: ElementType = serde_json::from_str("\"float64\"").unwrap();
        assert_eq!(ty, ElementType::Float64);
    }

    #[test]
    fn test_signedness() {
        assert!(!ElementType::Uint32.is_signed());
        assert!(ElementType::Int8.is_signed());
        assert!(ElementType::Float32.is_signed());
        assert!(ElementType::Float64.is_float());
        assert!(ElementType::Int16.is_integer());
    }

    #[test]
    fn test_byte_order() {
        assert_eq!(ByteOrder::from_little_endian(true), ByteOrder::Little);
        assert_eq!(ByteOrder::from_little_endian(false), ByteOrder::Big);
        assert_eq!("big".parse::<ByteOrder>().unwrap(), ByteOrder::Big);
        assert!("middle".parse::<ByteOrder>().is_err());
        assert_eq!(ByteOrder::default(), ByteOrder::Little);
    }

    #[test]
    fn test_viewing_plane() {
        assert_eq!("coronal".parse::<ViewingPlane>().unwrap(), ViewingPlane::Coronal);
        assert!(matches!(
            "sagittal".parse::<ViewingPlane>(),
            Err(RawSliceError::UnsupportedPlane(_))
        ));
        assert_eq!(ViewingPlane::default(), ViewingPlane::Axial);
    }

    #[test]
    fn test_window() {
        let inverted = Window::new(10.0, -10.0);
        assert_eq!(inverted.normalized(), Window::new(-10.0, 10.0));
        assert_eq!(Window::new(5.0, 5.0).range(), 1.0);
        assert_eq!(Window::new(0.0, 100.0).range(), 100.0);
    }

    #[test]
    fn test_extrema_merge() {
        let a = Extrema::new(-1.0, 4.0);
        let b = Extrema::new(0.0, 9.0);
        assert_eq!(a.merge(b), Extrema::new(-1.0, 9.0));
        assert!(a.is_valid());
        assert!(!Extrema::new(f64::NAN, 1.0).is_valid());
    }
}
