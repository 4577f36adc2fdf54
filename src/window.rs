//! Window/level mapping of sample values to 8-bit grayscale

use crate::decode::{samples_as, with_sample_type, Sample};
use crate::types::{ByteOrder, ElementType, Window};

/// Map one value through `[window_min, window_max]` to `0..=255`.
///
/// A degenerate window (`min == max`) is treated as having width 1. NaN maps
/// to 0.
#[inline]
pub fn map_to_grayscale(value: f64, window_min: f64, window_max: f64) -> u8 {
    let range = Window::new(window_min, window_max).range();
    let mut normalized = (value - window_min) / range;
    if normalized < 0.0 {
        normalized = 0.0;
    } else if normalized > 1.0 {
        normalized = 1.0;
    }
    // Saturating cast; NaN becomes 0
    (normalized * 255.0).round() as u8
}

/// Map already decoded values through `window`
pub fn apply_window(values: &[f64], window: Window) -> Vec<u8> {
    values
        .iter()
        .map(|&value| map_to_grayscale(value, window.min, window.max))
        .collect()
}

fn fill_grayscale<T: Sample>(out: &mut [u8], bytes: &[u8], byte_order: ByteOrder, window: Window) {
    for (pixel, value) in out.iter_mut().zip(samples_as::<T>(bytes, byte_order)) {
        *pixel = map_to_grayscale(value, window.min, window.max);
    }
}

/// Decode raw sample bytes and map them to grayscale, one output byte per complete sample
pub fn map_samples_to_grayscale(
    bytes: &[u8],
    element_type: ElementType,
    byte_order: ByteOrder,
    window: Window,
) -> Vec<u8> {
    let mut out = vec![0u8; bytes.len() / element_type.bytes_per_pixel()];
    with_sample_type!(element_type, T => fill_grayscale::<T>(&mut out, bytes, byte_order, window));
    out
}
