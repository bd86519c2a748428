use serde::{Deserialize, Serialize};

/// How the magnitudes of the bins inside one band collapse into a single
/// level.
///
/// Every strategy is positively homogeneous: scaling all inputs by `c > 0`
/// scales the result by `c`. Band aggregation relies on this to normalize
/// after summarizing instead of copying the spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinSummaryStrategy {
    /// Arithmetic mean of the bins.
    #[default]
    Average,
    /// Mean weighted towards the upper bins of the band.
    WeightedAverage,
    Max,
    /// Root mean square of the bins.
    Rms,
}

impl BinSummaryStrategy {
    /// Summarizes a band. An empty band is 0, not an error: narrow low bands
    /// often hold no bin at all.
    pub fn calculate(&self, bin_slice: &[f32]) -> f32 {
        if bin_slice.is_empty() {
            return 0.0;
        }
        let num_elements = bin_slice.len() as f32;

        match self {
            Self::Average => bin_slice.iter().sum::<f32>() / num_elements,
            Self::Max => bin_slice.iter().copied().fold(0.0, f32::max),
            Self::Rms => {
                let sum_of_squares: f32 = bin_slice.iter().map(|&x| x * x).sum();
                (sum_of_squares / num_elements).sqrt()
            }
            Self::WeightedAverage => {
                let (weighted_sum, total_weight) = bin_slice.iter().enumerate().fold(
                    (0.0f32, 0.0f32),
                    |(sum, total), (i, &x)| {
                        let weight = i as f32 + 1.0;
                        (sum + x * weight, total + weight)
                    },
                );
                weighted_sum / total_weight
            }
        }
    }
}
