//! Sample decoding: raw bytes to numeric values under an element type and byte order
//!
//! Every element type decodes to `f64`. Integer types up to 32 bits widen
//! exactly; floats follow IEEE-754 at the requested byte order. Bulk paths are
//! monomorphized per element type through [`with_sample_type`] so the inner
//! loops never branch on the type.

use crate::error::{RawSliceError, Result};
use crate::types::{ByteOrder, ElementType};
use num_traits::NumCast;
use std::iter::FusedIterator;
use std::slice::ChunksExact;

/// A primitive sample type that can be read from and written to raw bytes
pub(crate) trait Sample: Copy + NumCast {
    const WIDTH: usize;

    /// Read one sample; `bytes` must hold at least `WIDTH` bytes
    fn read(bytes: &[u8], order: ByteOrder) -> Self;

    /// Write one sample into the first `WIDTH` bytes of `out`
    fn write(self, order: ByteOrder, out: &mut [u8]);

    fn widen(self) -> f64;
}

macro_rules! impl_sample {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sample for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();

                #[inline]
                fn read(bytes: &[u8], order: ByteOrder) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(&bytes[..Self::WIDTH]);
                    match order {
                        ByteOrder::Little => <$t>::from_le_bytes(raw),
                        ByteOrder::Big => <$t>::from_be_bytes(raw),
                    }
                }

                #[inline]
                fn write(self, order: ByteOrder, out: &mut [u8]) {
                    let raw = match order {
                        ByteOrder::Little => self.to_le_bytes(),
                        ByteOrder::Big => self.to_be_bytes(),
                    };
                    out[..Self::WIDTH].copy_from_slice(&raw);
                }

                #[inline]
                fn widen(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(u8, i8, u16, i16, u32, i32, f32, f64);

/// Run `$body` with `$T` bound to the primitive type behind an [`ElementType`]
macro_rules! with_sample_type {
    ($element_type:expr, $T:ident => $body:expr) => {
        match $element_type {
            $crate::types::ElementType::Uint8 => {
                type $T = u8;
                $body
            }
            $crate::types::ElementType::Int8 => {
                type $T = i8;
                $body
            }
            $crate::types::ElementType::Uint16 => {
                type $T = u16;
                $body
            }
            $crate::types::ElementType::Int16 => {
                type $T = i16;
                $body
            }
            $crate::types::ElementType::Uint32 => {
                type $T = u32;
                $body
            }
            $crate::types::ElementType::Int32 => {
                type $T = i32;
                $body
            }
            $crate::types::ElementType::Float32 => {
                type $T = f32;
                $body
            }
            $crate::types::ElementType::Float64 => {
                type $T = f64;
                $body
            }
        }
    };
}

pub(crate) use with_sample_type;

/// Typed single-pass view over every complete sample of `buffer`
#[inline]
pub(crate) fn samples_as<T: Sample>(
    buffer: &[u8],
    order: ByteOrder,
) -> impl Iterator<Item = f64> + '_ {
    buffer
        .chunks_exact(T::WIDTH)
        .map(move |chunk| T::read(chunk, order).widen())
}

/// Number of complete samples in a buffer of `len` bytes
pub fn sample_count(len: usize, element_type: ElementType) -> usize {
    len / element_type.bytes_per_pixel()
}

/// Decode the sample starting at `offset`
pub fn decode(
    buffer: &[u8],
    offset: usize,
    element_type: ElementType,
    byte_order: ByteOrder,
) -> Result<f64> {
    let width = element_type.bytes_per_pixel();
    let end = offset
        .checked_add(width)
        .filter(|&end| end <= buffer.len())
        .ok_or(RawSliceError::OutOfBounds {
            offset,
            width,
            len: buffer.len(),
        })?;

    Ok(decode_chunk(&buffer[offset..end], element_type, byte_order))
}

#[inline]
fn decode_chunk(chunk: &[u8], element_type: ElementType, byte_order: ByteOrder) -> f64 {
    with_sample_type!(element_type, T => T::read(chunk, byte_order).widen())
}

/// Encode `value` as one sample; the inverse of [`decode`]
///
/// Integer targets reject values outside their range (and NaN). Fractional
/// values are truncated toward zero.
pub fn encode(value: f64, element_type: ElementType, byte_order: ByteOrder) -> Result<Vec<u8>> {
    let mut out = vec![0u8; element_type.bytes_per_pixel()];
    with_sample_type!(element_type, T => {
        let sample = <T as NumCast>::from(value).ok_or_else(|| {
            RawSliceError::UnrepresentableValue {
                value,
                element_type: element_type.to_string(),
            }
        })?;
        sample.write(byte_order, &mut out);
    });
    Ok(out)
}

/// Lazily decode every complete sample of `buffer` in ascending offset order.
///
/// A trailing partial sample is dropped.
pub fn decode_all(buffer: &[u8], element_type: ElementType, byte_order: ByteOrder) -> Samples<'_> {
    Samples {
        chunks: buffer.chunks_exact(element_type.bytes_per_pixel()),
        element_type,
        byte_order,
    }
}

/// Iterator returned by [`decode_all`]
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    chunks: ChunksExact<'a, u8>,
    element_type: ElementType,
    byte_order: ByteOrder,
}

impl Samples<'_> {
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Bytes of a trailing partial sample that will never be yielded
    pub fn remainder(&self) -> &[u8] {
        self.chunks.remainder()
    }
}

impl Iterator for Samples<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.chunks
            .next()
            .map(|chunk| decode_chunk(chunk, self.element_type, self.byte_order))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Samples<'_> {}

impl FusedIterator for Samples<'_> {}
