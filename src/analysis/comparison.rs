// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of statistical comparison of feature ensembles.

use getset::Getters;
use ndarray::ArrayView1;

use crate::errors::ComparisonError;
use crate::features::featurizer::{FeatureDescriptor, FeatureSeries};

/// Hard cap on the number of histogram bins of a single feature.
/// Protects against absurd bin widths on wide value ranges.
const MAX_BINS: usize = 10_000;

/// Results of a relative entropy comparison of two ensembles.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct RelativeEntropyResult {
    /// Description of each compared feature.
    descriptors: Vec<FeatureDescriptor>,
    /// Mean of each feature over the frames of both ensembles pooled.
    averages: Vec<f64>,
    /// Jensen-Shannon distance (base 2) of each feature. Ranges from 0 to 1.
    js_distances: Vec<f64>,
    /// Kullback-Leibler divergence of the first ensemble from the second.
    kl_first_second: Vec<f64>,
    /// Kullback-Leibler divergence of the second ensemble from the first.
    kl_second_first: Vec<f64>,
}

/// Results of a Kolmogorov-Smirnov comparison of two ensembles.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct KolmogorovSmirnovResult {
    /// Description of each compared feature.
    descriptors: Vec<FeatureDescriptor>,
    /// KS statistic of each feature.
    statistics: Vec<f64>,
    /// Asymptotic p-value of each feature.
    p_values: Vec<f64>,
}

/// Results of a mean difference comparison of two ensembles.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct MeanDifferenceResult {
    /// Description of each compared feature.
    descriptors: Vec<FeatureDescriptor>,
    /// Mean of each feature over the frames of both ensembles pooled.
    averages: Vec<f64>,
    /// Mean of each feature in the first ensemble.
    means_first: Vec<f64>,
    /// Mean of each feature in the second ensemble.
    means_second: Vec<f64>,
    /// Difference of the means (first minus second).
    differences: Vec<f64>,
}

/// Check that two feature series describe the same features.
fn check_compatible(
    first: &FeatureSeries,
    second: &FeatureSeries,
) -> Result<(), ComparisonError> {
    if first.get_n_features() != second.get_n_features() {
        return Err(ComparisonError::ShapeMismatch(
            first.get_n_features(),
            second.get_n_features(),
        ));
    }

    for (a, b) in first
        .get_descriptors()
        .iter()
        .zip(second.get_descriptors().iter())
    {
        if a != b {
            return Err(ComparisonError::FeatureMismatch(
                a.to_string(),
                b.to_string(),
            ));
        }
    }

    if first.get_n_frames() == 0 || second.get_n_frames() == 0 {
        return Err(ComparisonError::EmptyEnsemble);
    }

    Ok(())
}

/// Calculate the mean of a feature over the frames of both ensembles pooled.
fn pooled_average(first: &FeatureSeries, second: &FeatureSeries, feature: usize) -> f64 {
    let sum = first.feature_column(feature).sum() + second.feature_column(feature).sum();
    sum / (first.get_n_frames() + second.get_n_frames()) as f64
}

/// Construct normalized histograms of two samples over their combined range.
///
/// Both histograms use the same bin edges so that the resulting probability
/// distributions can be compared bin by bin. A value equal to the upper edge
/// of the range falls into the last bin.
fn joint_histograms(
    first: ArrayView1<f64>,
    second: ArrayView1<f64>,
    bin_width: f64,
) -> (Vec<f64>, Vec<f64>) {
    let min = first
        .iter()
        .chain(second.iter())
        .cloned()
        .fold(f64::INFINITY, f64::min);
    let max = first
        .iter()
        .chain(second.iter())
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    let range = max - min;
    let n_bins = if range <= 0.0 {
        1
    } else {
        ((range / bin_width).ceil() as usize).clamp(1, MAX_BINS)
    };

    let histogram = |sample: ArrayView1<f64>| -> Vec<f64> {
        let mut counts = vec![0.0; n_bins];
        for &value in sample {
            let mut bin = if range <= 0.0 {
                0
            } else {
                (((value - min) / range) * n_bins as f64) as usize
            };
            if bin >= n_bins {
                bin = n_bins - 1;
            }
            counts[bin] += 1.0;
        }

        let total = sample.len() as f64;
        counts.iter_mut().for_each(|x| *x /= total);
        counts
    };

    (histogram(first), histogram(second))
}

/// Calculate the Kullback-Leibler divergence of distribution `p` from `q`.
///
/// Returns infinity when `p` has probability mass in a bin where `q` is empty.
fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (&pi, &qi) in p.iter().zip(q.iter()) {
        if pi == 0.0 {
            continue;
        }
        if qi == 0.0 {
            return f64::INFINITY;
        }
        sum += pi * (pi / qi).log2();
    }
    sum
}

/// Calculate the Jensen-Shannon distance (base 2) of two distributions.
fn js_distance(p: &[f64], q: &[f64]) -> f64 {
    let m: Vec<f64> = p
        .iter()
        .zip(q.iter())
        .map(|(&pi, &qi)| 0.5 * (pi + qi))
        .collect();

    let divergence = 0.5 * kl_divergence(p, &m) + 0.5 * kl_divergence(q, &m);

    // numerical noise can push the divergence slightly out of [0, 1]
    divergence.clamp(0.0, 1.0).sqrt()
}

/// Compare two ensembles of features using relative entropy metrics.
///
/// For every feature, normalized histograms of both ensembles are built over
/// the combined value range using the given bin width, and the Jensen-Shannon
/// distance and both Kullback-Leibler divergences are calculated from them.
///
/// ## Returns
/// `RelativeEntropyResult` if the comparison was successful.
/// `ComparisonError` if the ensembles are incompatible or `bin_width` is not
/// positive.
pub fn relative_entropy_analysis(
    first: &FeatureSeries,
    second: &FeatureSeries,
    bin_width: f64,
) -> Result<RelativeEntropyResult, ComparisonError> {
    check_compatible(first, second)?;

    if !(bin_width > 0.0) || !bin_width.is_finite() {
        return Err(ComparisonError::InvalidBinWidth(bin_width.to_string()));
    }

    let n = first.get_n_features();
    let mut averages = Vec::with_capacity(n);
    let mut js_distances = Vec::with_capacity(n);
    let mut kl_first_second = Vec::with_capacity(n);
    let mut kl_second_first = Vec::with_capacity(n);

    for feature in 0..n {
        let (p, q) = joint_histograms(
            first.feature_column(feature),
            second.feature_column(feature),
            bin_width,
        );

        averages.push(pooled_average(first, second, feature));
        js_distances.push(js_distance(&p, &q));
        kl_first_second.push(kl_divergence(&p, &q));
        kl_second_first.push(kl_divergence(&q, &p));
    }

    Ok(RelativeEntropyResult {
        descriptors: first.get_descriptors().to_vec(),
        averages,
        js_distances,
        kl_first_second,
        kl_second_first,
    })
}

/// Calculate the two-sample Kolmogorov-Smirnov statistic of two sorted samples.
fn ks_statistic(first: &[f64], second: &[f64]) -> f64 {
    let (n1, n2) = (first.len(), second.len());
    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;

    while i < n1 && j < n2 {
        let x = first[i].min(second[j]);

        while i < n1 && first[i] <= x {
            i += 1;
        }
        while j < n2 && second[j] <= x {
            j += 1;
        }

        let cdf1 = i as f64 / n1 as f64;
        let cdf2 = j as f64 / n2 as f64;
        d = d.max((cdf1 - cdf2).abs());
    }

    d
}

/// Calculate the asymptotic p-value of the two-sample KS statistic.
///
/// Uses the Kolmogorov distribution approximation
/// `Q(lambda) = 2 * sum_{j=1..inf} (-1)^(j-1) * exp(-2 j^2 lambda^2)`
/// with `lambda = (sqrt(ne) + 0.12 + 0.11 / sqrt(ne)) * d`.
fn ks_p_value(d: f64, n1: usize, n2: usize) -> f64 {
    let ne = (n1 * n2) as f64 / (n1 + n2) as f64;
    let lambda = (ne.sqrt() + 0.12 + 0.11 / ne.sqrt()) * d;

    if lambda <= 0.0 {
        return 1.0;
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    for j in 1..=100 {
        let term = sign * (-2.0 * (j as f64) * (j as f64) * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-10 {
            break;
        }
        sign = -sign;
    }

    (2.0 * sum).clamp(0.0, 1.0)
}

/// Compare two ensembles of features using the two-sample Kolmogorov-Smirnov test.
///
/// ## Returns
/// `KolmogorovSmirnovResult` with the KS statistic and asymptotic p-value of
/// every feature. `ComparisonError` if the ensembles are incompatible.
pub fn kolmogorov_smirnov_analysis(
    first: &FeatureSeries,
    second: &FeatureSeries,
) -> Result<KolmogorovSmirnovResult, ComparisonError> {
    check_compatible(first, second)?;

    let n = first.get_n_features();
    let mut statistics = Vec::with_capacity(n);
    let mut p_values = Vec::with_capacity(n);

    for feature in 0..n {
        let mut sample1: Vec<f64> = first.feature_column(feature).to_vec();
        let mut sample2: Vec<f64> = second.feature_column(feature).to_vec();
        sample1.sort_by(|a, b| a.total_cmp(b));
        sample2.sort_by(|a, b| a.total_cmp(b));

        let d = ks_statistic(&sample1, &sample2);
        statistics.push(d);
        p_values.push(ks_p_value(d, sample1.len(), sample2.len()));
    }

    Ok(KolmogorovSmirnovResult {
        descriptors: first.get_descriptors().to_vec(),
        statistics,
        p_values,
    })
}

/// Compare two ensembles of features using the difference of their means.
///
/// ## Returns
/// `MeanDifferenceResult` with the mean of each feature in both ensembles and
/// their difference. `ComparisonError` if the ensembles are incompatible.
pub fn mean_difference_analysis(
    first: &FeatureSeries,
    second: &FeatureSeries,
) -> Result<MeanDifferenceResult, ComparisonError> {
    check_compatible(first, second)?;

    let n = first.get_n_features();
    let mut averages = Vec::with_capacity(n);
    let mut means_first = Vec::with_capacity(n);
    let mut means_second = Vec::with_capacity(n);
    let mut differences = Vec::with_capacity(n);

    for feature in 0..n {
        let mean1 = first.feature_column(feature).mean().expect(
            "FATAL ENSA ERROR | comparison::mean_difference_analysis | Empty feature column.",
        );
        let mean2 = second.feature_column(feature).mean().expect(
            "FATAL ENSA ERROR | comparison::mean_difference_analysis | Empty feature column.",
        );

        averages.push(pooled_average(first, second, feature));
        means_first.push(mean1);
        means_second.push(mean2);
        differences.push(mean1 - mean2);
    }

    Ok(MeanDifferenceResult {
        descriptors: first.get_descriptors().to_vec(),
        averages,
        means_first,
        means_second,
        differences,
    })
}

/// Sort features by the value of a metric, in descending order.
///
/// Features with NaN metrics sort last. Infinite metrics sort first.
pub fn sort_features(
    descriptors: &[FeatureDescriptor],
    values: &[f64],
) -> Vec<(FeatureDescriptor, f64)> {
    let mut sorted: Vec<(FeatureDescriptor, f64)> = descriptors
        .iter()
        .copied()
        .zip(values.iter().copied())
        .collect();

    // descending by value, nan values last
    sorted.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (false, false) => b.1.total_cmp(&a.1),
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
    });
    sorted
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use ndarray::Array2;

    fn series(values: Vec<f64>, n_features: usize) -> FeatureSeries {
        let n_frames = values.len() / n_features;
        let descriptors = (0..n_features)
            .map(|i| FeatureDescriptor::Psi { residue: i + 1 })
            .collect();

        FeatureSeries::new(
            descriptors,
            Array2::from_shape_vec((n_frames, n_features), values).unwrap(),
        )
    }

    #[test]
    fn identical_ensembles() {
        let first = series(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 1);
        let second = series(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 1);

        let result = relative_entropy_analysis(&first, &second, 0.1).unwrap();

        assert_approx_eq!(f64, result.js_distances()[0], 0.0, epsilon = 1e-10);
        assert_approx_eq!(f64, result.kl_first_second()[0], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn disjoint_ensembles() {
        let first = series(vec![0.0, 0.1, 0.2, 0.3], 1);
        let second = series(vec![10.0, 10.1, 10.2, 10.3], 1);

        let result = relative_entropy_analysis(&first, &second, 0.5).unwrap();

        // completely disjoint distributions
        assert_approx_eq!(f64, result.js_distances()[0], 1.0, epsilon = 1e-10);
        assert!(result.kl_first_second()[0].is_infinite());
        assert!(result.kl_second_first()[0].is_infinite());
    }

    #[test]
    fn invalid_bin_width() {
        let first = series(vec![0.0, 1.0], 1);
        let second = series(vec![0.0, 1.0], 1);

        assert!(matches!(
            relative_entropy_analysis(&first, &second, 0.0),
            Err(ComparisonError::InvalidBinWidth(_))
        ));

        assert!(matches!(
            relative_entropy_analysis(&first, &second, f64::NAN),
            Err(ComparisonError::InvalidBinWidth(_))
        ));
    }

    #[test]
    fn mismatched_descriptors() {
        let first = series(vec![0.0, 1.0], 1);

        let second = FeatureSeries::new(
            vec![FeatureDescriptor::Phi { residue: 1 }],
            Array2::from_shape_vec((2, 1), vec![0.0, 1.0]).unwrap(),
        );

        assert!(matches!(
            relative_entropy_analysis(&first, &second, 0.1),
            Err(ComparisonError::FeatureMismatch(_, _))
        ));
    }

    #[test]
    fn mismatched_shapes() {
        let first = series(vec![0.0, 1.0, 2.0, 3.0], 2);
        let second = series(vec![0.0, 1.0], 1);

        assert!(matches!(
            kolmogorov_smirnov_analysis(&first, &second),
            Err(ComparisonError::ShapeMismatch(2, 1))
        ));
    }

    #[test]
    fn ks_identical_samples() {
        let first = series(vec![0.1, 0.2, 0.3, 0.4, 0.5], 1);
        let second = series(vec![0.1, 0.2, 0.3, 0.4, 0.5], 1);

        let result = kolmogorov_smirnov_analysis(&first, &second).unwrap();

        assert_approx_eq!(f64, result.statistics()[0], 0.0, epsilon = 1e-10);
        assert_approx_eq!(f64, result.p_values()[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ks_disjoint_samples() {
        let first = series(vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7], 1);
        let second = series(vec![5.0, 5.1, 5.2, 5.3, 5.4, 5.5, 5.6, 5.7], 1);

        let result = kolmogorov_smirnov_analysis(&first, &second).unwrap();

        assert_approx_eq!(f64, result.statistics()[0], 1.0, epsilon = 1e-10);
        assert!(result.p_values()[0] < 0.05);
    }

    #[test]
    fn ks_statistic_known_value() {
        // F1 jumps to 1.0 at 0.3; F2 is still 0.0 there
        let d = ks_statistic(&[0.1, 0.2, 0.3], &[0.4, 0.5, 0.6]);
        assert_approx_eq!(f64, d, 1.0, epsilon = 1e-10);

        let d = ks_statistic(&[0.1, 0.2, 0.3, 0.4], &[0.3, 0.4, 0.5, 0.6]);
        assert_approx_eq!(f64, d, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn mean_difference() {
        let first = series(vec![1.0, 2.0, 3.0], 1);
        let second = series(vec![2.0, 3.0, 4.0], 1);

        let result = mean_difference_analysis(&first, &second).unwrap();

        assert_approx_eq!(f64, result.means_first()[0], 2.0);
        assert_approx_eq!(f64, result.means_second()[0], 3.0);
        assert_approx_eq!(f64, result.differences()[0], -1.0);
    }

    #[test]
    fn pooled_feature_averages() {
        let first = series(vec![1.0, 2.0, 3.0], 1);
        let second = series(vec![3.0, 4.0, 5.0, 6.0], 1);

        // (1 + 2 + 3 + 3 + 4 + 5 + 6) / 7
        let expected = 24.0 / 7.0;

        let result = relative_entropy_analysis(&first, &second, 0.5).unwrap();
        assert_approx_eq!(f64, result.averages()[0], expected, epsilon = 1e-10);

        let result = mean_difference_analysis(&first, &second).unwrap();
        assert_approx_eq!(f64, result.averages()[0], expected, epsilon = 1e-10);
    }

    #[test]
    fn sorting_features() {
        let descriptors = vec![
            FeatureDescriptor::Phi { residue: 2 },
            FeatureDescriptor::Phi { residue: 3 },
            FeatureDescriptor::Phi { residue: 4 },
        ];
        let values = vec![0.2, f64::NAN, 0.8];

        let sorted = sort_features(&descriptors, &values);

        assert_eq!(sorted[0].0, FeatureDescriptor::Phi { residue: 4 });
        assert_eq!(sorted[1].0, FeatureDescriptor::Phi { residue: 2 });
        assert!(sorted[2].1.is_nan());
    }
}
