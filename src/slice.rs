//! Slice extraction - turns a flat volume buffer into 2-D slices along a viewing plane
//!
//! A volume is stored x-fastest, then y, then z. Axial slices are the
//! contiguous `width x height` blocks; coronal slices gather row `y` from
//! every complete z block.

use crate::decode::{decode_all, Samples};
use crate::error::{RawSliceError, Result};
use crate::types::{ByteOrder, ElementType, ViewingPlane};
use bytes::Bytes;
use ndarray::Array2;

/// Caller-declared geometry of a raw volume.
///
/// Only constructible through [`VolumeGeometry::new`], so width and height
/// are always nonzero and one axial slice fits in `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeGeometry {
    width: usize,
    height: usize,
    element_type: ElementType,
}

impl VolumeGeometry {
    /// Create a geometry, rejecting zero width or height
    pub fn new(width: usize, height: usize, element_type: ElementType) -> Result<Self> {
        let geometry = Self {
            width,
            height,
            element_type,
        };
        geometry.checked_axial_slice_size()?;
        Ok(geometry)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Axial slice size in bytes, or `InvalidMetadata` for a zero or overflowing geometry
    fn checked_axial_slice_size(&self) -> Result<usize> {
        if self.width == 0 || self.height == 0 {
            return Err(RawSliceError::InvalidMetadata(format!(
                "Invalid width or height: {}x{}",
                self.width, self.height
            )));
        }
        self.width
            .checked_mul(self.height)
            .and_then(|pixels| pixels.checked_mul(self.element_type.bytes_per_pixel()))
            .ok_or_else(|| {
                RawSliceError::InvalidMetadata(format!(
                    "Slice size overflows for {}x{} {}",
                    self.width, self.height, self.element_type
                ))
            })
    }

    /// Bytes in one row of samples
    pub fn row_bytes(&self) -> usize {
        self.width * self.element_type.bytes_per_pixel()
    }

    /// Bytes in one axial slice
    pub fn axial_slice_size(&self) -> usize {
        self.row_bytes() * self.height
    }

    /// Number of complete axial slices in `len` bytes; also the coronal image height
    pub fn depth(&self, len: usize) -> usize {
        len.checked_div(self.axial_slice_size()).unwrap_or(0)
    }

    /// Number of slices available along `plane` for a file of `len` bytes
    pub fn slice_count(&self, len: usize, plane: ViewingPlane) -> usize {
        match plane {
            ViewingPlane::Axial => self.depth(len),
            ViewingPlane::Coronal => self.height,
        }
    }
}

/// One extracted 2-D slice, still in raw sample bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub data: Bytes,
    pub width: usize,
    pub height: usize,
    pub element_type: ElementType,
}

impl Slice {
    pub fn sample_count(&self) -> usize {
        self.width * self.height
    }

    /// Decode the slice samples in row-major order
    pub fn samples(&self, byte_order: ByteOrder) -> Samples<'_> {
        decode_all(&self.data, self.element_type, byte_order)
    }

    /// Decoded samples as a `(height, width)` array
    pub fn to_array(&self, byte_order: ByteOrder) -> Result<Array2<f64>> {
        let values: Vec<f64> = self.samples(byte_order).collect();
        Array2::from_shape_vec((self.height, self.width), values).map_err(|e| {
            RawSliceError::InvalidMetadata(format!("Slice shape mismatch: {}", e))
        })
    }
}

/// Slice index as `usize`; negative indices are `InvalidSliceIndex`
pub(crate) fn check_slice_index(slice: i64) -> Result<usize> {
    usize::try_from(slice).map_err(|_| RawSliceError::InvalidSliceIndex(slice))
}

/// Extract slice `slice` along `plane` from the full volume buffer.
///
/// Axial slices are copied verbatim. Coronal slices are reassembled into a
/// `width x depth` image where depth counts the complete axial slices in the
/// buffer; trailing bytes past the last complete slice are ignored.
pub fn extract_slice(
    buffer: &[u8],
    geometry: &VolumeGeometry,
    slice: i64,
    plane: ViewingPlane,
) -> Result<Slice> {
    let index = check_slice_index(slice)?;
    let axial_slice_size = geometry.checked_axial_slice_size()?;

    match plane {
        ViewingPlane::Axial => {
            let range = index
                .checked_mul(axial_slice_size)
                .and_then(|offset| Some(offset..offset.checked_add(axial_slice_size)?))
                .filter(|range| range.end <= buffer.len())
                .ok_or_else(|| RawSliceError::SliceOutOfRange {
                    index,
                    reason: format!(
                        "slice of {} bytes extends beyond file size {}",
                        axial_slice_size,
                        buffer.len()
                    ),
                })?;

            Ok(Slice {
                data: Bytes::copy_from_slice(&buffer[range]),
                width: geometry.width,
                height: geometry.height,
                element_type: geometry.element_type,
            })
        }
        ViewingPlane::Coronal => {
            if index >= geometry.height {
                return Err(RawSliceError::SliceOutOfRange {
                    index,
                    reason: format!("extends beyond image height {}", geometry.height),
                });
            }

            let depth = buffer.len() / axial_slice_size;
            let row_bytes = geometry.row_bytes();
            let row_offset = index * row_bytes;
            let mut data = vec![0u8; row_bytes * depth];

            for (z, row) in data.chunks_exact_mut(row_bytes).enumerate() {
                let offset = z * axial_slice_size + row_offset;
                row.copy_from_slice(&buffer[offset..offset + row_bytes]);
            }

            Ok(Slice {
                data: Bytes::from(data),
                width: geometry.width,
                height: depth,
                element_type: geometry.element_type,
            })
        }
    }
}

/// Number of slices along `plane` for a file of `file_len` bytes
pub fn max_slice_count(
    file_len: u64,
    width: usize,
    height: usize,
    element_type: ElementType,
    plane: ViewingPlane,
) -> Result<usize> {
    let geometry = VolumeGeometry::new(width, height, element_type)?;
    match plane {
        ViewingPlane::Axial => {
            let count = file_len / geometry.axial_slice_size() as u64;
            usize::try_from(count).map_err(|_| {
                RawSliceError::InvalidMetadata(format!("Slice count {} overflows", count))
            })
        }
        ViewingPlane::Coronal => Ok(geometry.height),
    }
}

/// Check a slice request against the file size before reading anything
pub fn validate_slice_request(
    slice: i64,
    geometry: &VolumeGeometry,
    file_len: u64,
    plane: ViewingPlane,
) -> Result<usize> {
    let index = check_slice_index(slice)?;
    let available = max_slice_count(
        file_len,
        geometry.width,
        geometry.height,
        geometry.element_type,
        plane,
    )?;
    if index >= available {
        return Err(RawSliceError::SliceOutOfRange {
            index,
            reason: format!("exceeds maximum available slices ({})", available),
        });
    }
    Ok(index)
}
