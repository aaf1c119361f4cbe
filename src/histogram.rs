use crate::types::{round2, Histogram};

/// Bin a numeric sample into `bins` equal-width bins over [min, max].
///
/// Labels are the bin lower bounds rounded to 2 decimals. A value exactly at
/// the sample max is clamped into the last bin. Zero-count bins are dropped
/// from labels and counts in lockstep, so the output may be shorter than
/// `bins`. An all-identical sample collapses to a single bin labeled with the
/// shared value (no zero-width division).
///
/// The total count always equals the sample length.
pub fn build(data: &[f64], bins: usize) -> Histogram {
    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return Histogram {
            labels: vec![min],
            data: vec![data.len()],
        };
    }

    let bin_size = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &value in data {
        let bin_index = (((value - min) / bin_size) as usize).min(bins - 1);
        counts[bin_index] += 1;
    }

    let mut labels = Vec::new();
    let mut filtered = Vec::new();
    for (i, &count) in counts.iter().enumerate() {
        if count > 0 {
            labels.push(round2(min + i as f64 * bin_size));
            filtered.push(count);
        }
    }

    Histogram {
        labels,
        data: filtered,
    }
}
