// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of visualization output for per-feature comparison results.

use std::path::Path;

use indexmap::IndexMap;

use crate::errors::{WritePdbError, WriteTableError};
use crate::features::featurizer::{FeatureDescriptor, FeatureSeries};
use crate::io::csv_io;
use crate::io::xvg_io::{self, XvgSeries};
use crate::system::general::System;

/// How per-feature values are aggregated into a per-residue value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAggregation {
    /// Keep the highest value of any feature the residue participates in.
    /// Suitable for divergence metrics where high values are interesting.
    Max,
    /// Keep the lowest value of any feature the residue participates in.
    /// Suitable for p-values where low values are interesting.
    Min,
}

impl ProfileAggregation {
    /// Value assigned to residues that participate in no feature.
    fn default_value(&self) -> f64 {
        match self {
            ProfileAggregation::Max => 0.0,
            ProfileAggregation::Min => 1.0,
        }
    }
}

/// Aggregate per-feature values into a per-residue profile.
///
/// A residue participates in a feature when its residue number appears in the
/// feature's descriptor. The profile is ordered by first appearance of each
/// residue in the descriptors.
pub fn per_residue_profile(
    descriptors: &[FeatureDescriptor],
    values: &[f64],
    aggregation: ProfileAggregation,
) -> IndexMap<usize, f64> {
    let mut profile: IndexMap<usize, f64> = IndexMap::new();

    for (descriptor, &value) in descriptors.iter().zip(values.iter()) {
        for residue in descriptor.residues() {
            let entry = profile
                .entry(residue)
                .or_insert_with(|| aggregation.default_value());

            match aggregation {
                ProfileAggregation::Max => {
                    if value > *entry {
                        *entry = value;
                    }
                }
                ProfileAggregation::Min => {
                    if value < *entry {
                        *entry = value;
                    }
                }
            }
        }
    }

    profile
}

/// Write a structure with a per-residue profile stored in the B-factor column.
///
/// Every atom of a residue present in the profile gets the residue's value
/// as its B-factor. Atoms of other residues get the aggregation's default,
/// so the resulting file can be colored by B-factor in molecular viewers.
pub fn write_residue_pdb(
    system: &System,
    profile: &IndexMap<usize, f64>,
    aggregation: ProfileAggregation,
    output: impl AsRef<Path>,
) -> Result<(), WritePdbError> {
    let mut colored = system.clone();

    for atom in colored.atoms_iter_mut() {
        let value = profile
            .get(&atom.get_residue_number())
            .copied()
            .unwrap_or_else(|| aggregation.default_value());

        atom.set_beta(value as f32);
    }

    colored.write_pdb(output)
}

/// Write a per-residue profile as an xvg plot.
pub fn write_profile_xvg(
    profile: &IndexMap<usize, f64>,
    title: &str,
    yaxis: &str,
    output: impl AsRef<Path>,
) -> Result<(), WriteTableError> {
    let mut points: Vec<(f64, f64)> = profile
        .iter()
        .map(|(&residue, &value)| (residue as f64, value))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let series = [XvgSeries::new(yaxis, points)];
    xvg_io::write_xvg(output, title, "residue", yaxis, &series)
}

/// Write the mean alpha-carbon distance matrix of an ensemble as a csv table.
///
/// Residue pairs that are not part of the feature series (those closer in
/// sequence than the minimal separation) are reported as zero.
pub fn write_distance_matrix(
    series: &FeatureSeries,
    output: impl AsRef<Path>,
) -> Result<(), WriteTableError> {
    // ordered list of all residues appearing in distance features
    let mut residues: Vec<usize> = Vec::new();
    for descriptor in series.get_descriptors() {
        if let FeatureDescriptor::CaDistance { first, second } = descriptor {
            for residue in [*first, *second] {
                if !residues.contains(&residue) {
                    residues.push(residue);
                }
            }
        }
    }
    residues.sort_unstable();

    let index_of = |residue: usize| {
        residues
            .binary_search(&residue)
            .expect("FATAL ENSA ERROR | visualization::write_distance_matrix | Unknown residue.")
    };

    let mut matrix = vec![vec![0.0; residues.len()]; residues.len()];

    for (column, descriptor) in series.get_descriptors().iter().enumerate() {
        if let FeatureDescriptor::CaDistance { first, second } = descriptor {
            let mean = series.feature_column(column).mean().unwrap_or(0.0);
            let (i, j) = (index_of(*first), index_of(*second));
            matrix[i][j] = mean;
            matrix[j][i] = mean;
        }
    }

    let labels: Vec<String> = residues.iter().map(|r| r.to_string()).collect();
    csv_io::write_csv_matrix(output, &labels, &matrix)
}

/******************************/
/*         UNIT TESTS         */
/******************************/
