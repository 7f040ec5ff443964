//! Smart frame selection.
//!
//! Out of a short run of consecutive frames, the one whose colour histogram
//! is closest to the run's average histogram is taken as the most
//! representative. Black frames, flashes and scene cuts sit far from the
//! average and lose.

use crate::histogram::Histogram;

/// Number of consecutive frames the thumbnailer scores in smart mode.
pub const SMART_FRAME_ATTEMPTS: usize = 25;

/// Buckets that take part in the comparison. The top bucket (255) is left
/// out, which keeps scores identical to existing thumbnail caches.
const COMPARED_BUCKETS: usize = 255;

/// Bucket-wise mean of `histograms`.
pub fn average_histogram(histograms: &[Histogram<u32>]) -> Histogram<f32> {
    let mut average = Histogram::<f32>::new();
    let count = histograms.len() as f32;
    for histogram in histograms {
        for j in 0..COMPARED_BUCKETS {
            average.r[j] += histogram.r[j] as f32 / count;
            average.g[j] += histogram.g[j] as f32 / count;
            average.b[j] += histogram.b[j] as f32 / count;
        }
    }
    average
}

/// Root-mean-squared deviation of `histogram` from `average`. The absolute
/// per-channel deviations of a bucket are summed before squaring.
pub fn rmse(average: &Histogram<f32>, histogram: &Histogram<u32>) -> f32 {
    let mut sum = 0.0f32;
    for j in 0..COMPARED_BUCKETS {
        let error = (average.r[j] - histogram.r[j] as f32).abs()
            + (average.g[j] - histogram.g[j] as f32).abs()
            + (average.b[j] - histogram.b[j] as f32).abs();
        sum += (error * error) / 255.0;
    }
    sum.sqrt()
}

/// Index of the most typical histogram, or `None` for an empty slice.
/// On equal scores the earliest candidate wins.
pub fn best_frame_index(histograms: &[Histogram<u32>]) -> Option<usize> {
    if histograms.is_empty() {
        return None;
    }

    let average = average_histogram(histograms);
    let mut best = None;
    let mut min_rmse = f32::MAX;
    for (index, histogram) in histograms.iter().enumerate() {
        let score = rmse(&average, histogram);
        if score < min_rmse {
            min_rmse = score;
            best = Some(index);
        }
    }

    best
}
