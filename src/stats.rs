//! Value statistics used to seed display windows

use crate::decode::{samples_as, with_sample_type, Sample};
use crate::types::{ByteOrder, ElementType, Extrema};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Samples per rayon task when scanning in parallel
#[cfg(feature = "parallel")]
const PARALLEL_CHUNK_SAMPLES: usize = 1 << 20;

/// Running min/max with strict comparisons, seeded by the first value.
///
/// A NaN never replaces an existing bound, but a leading NaN becomes the seed.
fn scan<I: Iterator<Item = f64>>(values: I) -> Option<Extrema> {
    values.fold(None, |acc, value| match acc {
        None => Some(Extrema::new(value, value)),
        Some(mut extrema) => {
            if value < extrema.min {
                extrema.min = value;
            }
            if value > extrema.max {
                extrema.max = value;
            }
            Some(extrema)
        }
    })
}

#[cfg(not(feature = "parallel"))]
fn scan_buffer<T: Sample>(buffer: &[u8], byte_order: ByteOrder) -> Option<Extrema> {
    scan(samples_as::<T>(buffer, byte_order))
}

#[cfg(feature = "parallel")]
fn scan_buffer<T: Sample>(buffer: &[u8], byte_order: ByteOrder) -> Option<Extrema> {
    scan_chunks::<T>(buffer, byte_order, PARALLEL_CHUNK_SAMPLES)
}

/// Element-aligned chunks of `chunk_samples` scanned independently, partial results merged
#[cfg(feature = "parallel")]
fn scan_chunks<T: Sample>(
    buffer: &[u8],
    byte_order: ByteOrder,
    chunk_samples: usize,
) -> Option<Extrema> {
    buffer
        .par_chunks(chunk_samples.max(1) * T::WIDTH)
        .map(|chunk| scan(samples_as::<T>(chunk, byte_order)))
        .reduce(
            || None,
            |a, b| match (a, b) {
                (Some(a), Some(b)) => Some(a.merge(b)),
                (a, None) => a,
                (None, b) => b,
            },
        )
}

/// Minimum and maximum over every complete sample of `buffer`.
///
/// Decodes and compares in a single pass. A buffer shorter than one sample
/// yields `(0, 0)`.
pub fn compute_extrema(buffer: &[u8], element_type: ElementType, byte_order: ByteOrder) -> Extrema {
    let extrema = with_sample_type!(element_type, T => scan_buffer::<T>(buffer, byte_order));
    debug!(
        bytes = buffer.len(),
        %element_type,
        %byte_order,
        ?extrema,
        "computed extrema"
    );
    extrema.unwrap_or_default()
}

/// Minimum and maximum of already decoded values; empty input yields `(0, 0)`
pub fn find_min_max(values: &[f64]) -> Extrema {
    scan(values.iter().copied()).unwrap_or_default()
}

/// Count `values` into `bins` equal-width bins over `range` (or the values' own extrema).
///
/// Out-of-range values land in the first or last bin.
pub fn histogram(values: &[f64], bins: usize, range: Option<Extrema>) -> Vec<u64> {
    let mut counts = vec![0u64; bins];
    if values.is_empty() || bins == 0 {
        return counts;
    }

    let Extrema { min, mut max } = range.unwrap_or_else(|| find_min_max(values));
    if min == max {
        max = min + 1.0;
    }
    let bin_width = (max - min) / bins as f64;

    for &value in values {
        let index = ((value - min) / bin_width).floor();
        // NaN and negative indices saturate to 0 in the cast
        let index = (index as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
}

/// Window between the `lower` and `upper` quantiles (0.0..=1.0) of `values`.
///
/// Quantiles interpolate linearly between neighbouring order statistics.
pub fn percentile_range(values: &[f64], lower: f64, upper: f64) -> Extrema {
    if values.is_empty() {
        return Extrema::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let last = sorted.len() - 1;

    let quantile = |p: f64| {
        let position = p.clamp(0.0, 1.0) * last as f64;
        let i0 = position.floor() as usize;
        let i1 = (i0 + 1).min(last);
        let t = position - i0 as f64;
        sorted[i0] * (1.0 - t) + sorted[i1] * t
    };

    Extrema::new(quantile(lower), quantile(upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_extrema_int16() {
        let values = [5i16, -300, 42, 1200, 0];
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let bytes: Vec<u8> = values
                .iter()
                .flat_map(|v| match order {
                    ByteOrder::Little => v.to_le_bytes(),
                    ByteOrder::Big => v.to_be_bytes(),
                })
                .collect();
            let extrema = compute_extrema(&bytes, ElementType::Int16, order);
            assert_eq!(extrema, Extrema::new(-300.0, 1200.0));
        }
    }

    #[test]
    fn test_compute_extrema_float64() {
        let bytes: Vec<u8> = [0.5f64, -1e9, 3.25]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let extrema = compute_extrema(&bytes, ElementType::Float64, ByteOrder::Little);
        assert_eq!(extrema, Extrema::new(-1e9, 3.25));
    }

    #[test]
    fn test_compute_extrema_empty() {
        assert_eq!(
            compute_extrema(&[], ElementType::Uint8, ByteOrder::Little),
            Extrema::new(0.0, 0.0)
        );
        assert_eq!(
            compute_extrema(&[1, 2, 3], ElementType::Float32, ByteOrder::Little),
            Extrema::new(0.0, 0.0)
        );
    }

    #[test]
    fn test_compute_extrema_ignores_partial_sample() {
        let bytes = [10, 0, 20, 0, 0xff];
        assert_eq!(
            compute_extrema(&bytes, ElementType::Uint16, ByteOrder::Little),
            Extrema::new(10.0, 20.0)
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_chunks_match_sequential_scan() {
        // 103 uint16 samples plus a stray byte, min and max in different chunks
        let mut bytes: Vec<u8> = (0u16..103)
            .map(|i| 1000 + (i * 37) % 500)
            .flat_map(|v| v.to_be_bytes())
            .collect();
        bytes[20..22].copy_from_slice(&7u16.to_be_bytes());
        bytes[180..182].copy_from_slice(&60_000u16.to_be_bytes());
        bytes.push(0xff);

        let sequential = scan(samples_as::<u16>(&bytes, ByteOrder::Big));
        assert_eq!(sequential, Some(Extrema::new(7.0, 60_000.0)));
        for chunk_samples in [1, 4, 7, 50, 103, 1000] {
            assert_eq!(
                scan_chunks::<u16>(&bytes, ByteOrder::Big, chunk_samples),
                sequential,
                "chunk of {} samples",
                chunk_samples
            );
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_extrema_across_default_chunks() {
        let samples = 3 * PARALLEL_CHUNK_SAMPLES + 1;
        let mut bytes = vec![0u8; samples * 2];
        let min_at = PARALLEL_CHUNK_SAMPLES / 2;
        let max_at = 2 * PARALLEL_CHUNK_SAMPLES + 5;
        bytes[min_at * 2..min_at * 2 + 2].copy_from_slice(&(-1234i16).to_le_bytes());
        bytes[max_at * 2..max_at * 2 + 2].copy_from_slice(&4321i16.to_le_bytes());

        let extrema = compute_extrema(&bytes, ElementType::Int16, ByteOrder::Little);
        assert_eq!(extrema, Extrema::new(-1234.0, 4321.0));
        assert_eq!(
            Some(extrema),
            scan(samples_as::<i16>(&bytes, ByteOrder::Little))
        );
    }

    #[test]
    fn test_nan_does_not_replace_bounds() {
        let extrema = find_min_max(&[1.0, f64::NAN, 7.0]);
        assert_eq!(extrema, Extrema::new(1.0, 7.0));
    }

    #[test]
    fn test_find_min_max() {
        assert_eq!(find_min_max(&[]), Extrema::default());
        assert_eq!(find_min_max(&[3.0]), Extrema::new(3.0, 3.0));
        assert_eq!(find_min_max(&[3.0, -2.0, 8.5]), Extrema::new(-2.0, 8.5));
    }

    #[test]
    fn test_histogram() {
        let values = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(histogram(&values, 4, None), vec![1, 1, 1, 1]);
        assert_eq!(histogram(&values, 2, None), vec![2, 2]);
        assert_eq!(
            histogram(&values, 2, Some(Extrema::new(1.0, 2.0))),
            vec![2, 2]
        );
        assert_eq!(histogram(&[], 3, None), vec![0, 0, 0]);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        assert_eq!(histogram(&[5.0, 5.0], 4, None), vec![2, 0, 0, 0]);
    }

    #[test]
    fn test_percentile_range() {
        let values = [4.0, 0.0, 2.0, 1.0, 3.0];
        assert_eq!(percentile_range(&values, 0.0, 1.0), Extrema::new(0.0, 4.0));
        assert_eq!(percentile_range(&values, 0.25, 0.75), Extrema::new(1.0, 3.0));
        assert_eq!(
            percentile_range(&values, 0.125, 0.875),
            Extrema::new(0.5, 3.5)
        );
        assert_eq!(percentile_range(&[], 0.1, 0.9), Extrema::default());
    }
}
