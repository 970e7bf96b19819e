/// Descriptive statistics over popularity values
pub struct PopularityStats;

impl PopularityStats {
    pub fn mean(values: &[u32]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().map(|&v| v as f64).sum();
        Some(sum / values.len() as f64)
    }

    /// Middle value, or the mean of the two middle values for even lengths
    pub fn median(values: &[u32]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
        } else {
            Some(sorted[mid] as f64)
        }
    }

    /// Sample standard deviation (n - 1 denominator), undefined below two values
    pub fn sample_std(values: &[u32]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        let mean = Self::mean(values)?;
        let variance = values
            .iter()
            .map(|&v| {
                let diff = v as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / (values.len() - 1) as f64;
        Some(variance.sqrt())
    }
}

/// Round to two decimals, ties to even as the dataframe rounding does
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
