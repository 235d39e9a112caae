//! IQR outlier filtering for agent-count estimates

/// Linear-interpolated quantile of an ascending slice
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// First and third quartiles; `None` for an empty slice
pub fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some((quantile(&sorted, 0.25), quantile(&sorted, 0.75)))
}

/// Fewest values for which quartiles are meaningful
pub const MIN_VALUES_FOR_FILTERING: usize = 4;

/// Which positions of the input survived filtering
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierSplit {
    /// Indices into the input that were kept, ascending
    pub kept: Vec<usize>,
    /// Indices into the input above the upper fence, ascending
    pub excluded: Vec<usize>,
    /// `Q3 + 1.5·IQR`, when filtering ran
    pub upper_fence: Option<f64>,
}

/// Drop values above `Q3 + 1.5·IQR`.
///
/// With fewer than [`MIN_VALUES_FOR_FILTERING`] values nothing is dropped.
///
/// ```
/// use council_domain::consensus::filter_upper_outliers;
///
/// let split = filter_upper_outliers(&[4, 5, 4, 6, 5, 20]);
/// assert_eq!(split.excluded, vec![5]);
/// ```
pub fn filter_upper_outliers(values: &[u32]) -> OutlierSplit {
    let all: Vec<usize> = (0..values.len()).collect();
    if values.len() < MIN_VALUES_FOR_FILTERING {
        return OutlierSplit {
            kept: all,
            excluded: Vec::new(),
            upper_fence: None,
        };
    }

    let as_f64: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
    let Some((q1, q3)) = quartiles(&as_f64) else {
        return OutlierSplit {
            kept: all,
            excluded: Vec::new(),
            upper_fence: None,
        };
    };
    let fence = q3 + 1.5 * (q3 - q1);

    let (kept, excluded): (Vec<usize>, Vec<usize>) =
        all.into_iter().partition(|&i| as_f64[i] <= fence);
    OutlierSplit {
        kept,
        excluded,
        upper_fence: Some(fence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartiles_interpolated() {
        let (q1, q3) = quartiles(&[4.0, 5.0, 4.0, 6.0, 5.0, 20.0]).unwrap();
        assert!((q1 - 4.25).abs() < 1e-9);
        assert!((q3 - 5.75).abs() < 1e-9);
    }

    #[test]
    fn test_outlier_excluded() {
        let split = filter_upper_outliers(&[4, 5, 4, 6, 5, 20]);
        assert_eq!(split.kept, vec![0, 1, 2, 3, 4]);
        assert_eq!(split.excluded, vec![5]);
        assert!((split.upper_fence.unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_outliers() {
        let split = filter_upper_outliers(&[3, 4, 5, 6]);
        assert!(split.excluded.is_empty());
        assert_eq!(split.kept.len(), 4);
    }

    #[test]
    fn test_too_few_values_not_filtered() {
        let split = filter_upper_outliers(&[1, 2, 50]);
        assert!(split.excluded.is_empty());
        assert!(split.upper_fence.is_none());
    }

    #[test]
    fn test_identical_values() {
        let split = filter_upper_outliers(&[5, 5, 5, 5, 5]);
        assert!(split.excluded.is_empty());
    }
}
