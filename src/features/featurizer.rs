// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of trajectory featurization.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use ndarray::{Array2, ArrayView1};

use crate::errors::FeaturizeError;
use crate::features::distances::{self, MIN_SEQUENCE_SEPARATION};
use crate::features::torsions::{self, BackboneResidue};
use crate::system::general::System;

/// Kind of features calculated from a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Phi and psi backbone torsion angles, in radians.
    BackboneTorsions,
    /// Distances between alpha carbons of distant residues, in nanometers.
    CaDistances,
}

impl FeatureKind {
    /// Get the name of the feature kind used in output file names.
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::BackboneTorsions => "bb-torsions",
            FeatureKind::CaDistances => "ca-distances",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Description of a single feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureDescriptor {
    /// Phi torsion of the given residue.
    Phi { residue: usize },
    /// Psi torsion of the given residue.
    Psi { residue: usize },
    /// Distance between the alpha carbons of two residues.
    CaDistance { first: usize, second: usize },
}

impl FeatureDescriptor {
    /// Get the residue numbers the feature describes.
    pub fn residues(&self) -> Vec<usize> {
        match self {
            FeatureDescriptor::Phi { residue } | FeatureDescriptor::Psi { residue } => {
                vec![*residue]
            }
            FeatureDescriptor::CaDistance { first, second } => vec![*first, *second],
        }
    }
}

impl fmt::Display for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureDescriptor::Phi { residue } => write!(f, "PHI {}", residue),
            FeatureDescriptor::Psi { residue } => write!(f, "PSI {}", residue),
            FeatureDescriptor::CaDistance { first, second } => {
                write!(f, "CA DIST {} {}", first, second)
            }
        }
    }
}

/// Features of one kind calculated for every frame of a trajectory.
#[derive(Debug, Clone)]
pub struct FeatureSeries {
    /// Description of each feature, in column order.
    descriptors: Vec<FeatureDescriptor>,
    /// Feature values with shape `[frames, features]`.
    data: Array2<f64>,
}

impl FeatureSeries {
    /// Create a new feature series.
    ///
    /// ## Panics
    /// Panics if the number of descriptors does not match the number of
    /// columns of the data matrix.
    pub fn new(descriptors: Vec<FeatureDescriptor>, data: Array2<f64>) -> Self {
        if descriptors.len() != data.ncols() {
            panic!("FATAL ENSA ERROR | FeatureSeries::new | Number of descriptors does not match the data matrix.");
        }

        FeatureSeries { descriptors, data }
    }

    /// Get the descriptors of the features, in column order.
    pub fn get_descriptors(&self) -> &[FeatureDescriptor] {
        &self.descriptors
    }

    /// Get the feature values with shape `[frames, features]`.
    pub fn get_data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Get the number of frames of the series.
    pub fn get_n_frames(&self) -> usize {
        self.data.nrows()
    }

    /// Get the number of features of the series.
    pub fn get_n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Get the values of a single feature across all frames.
    pub fn feature_column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.column(index)
    }
}

/// Build the descriptors for one feature kind.
fn build_descriptors(
    kind: FeatureKind,
    backbone: &[BackboneResidue],
    pairs: &[(usize, usize)],
) -> Result<Vec<FeatureDescriptor>, FeaturizeError> {
    match kind {
        FeatureKind::BackboneTorsions => {
            if backbone.len() < 2 {
                return Err(FeaturizeError::NotEnoughResidues(backbone.len()));
            }

            let mut descriptors = Vec::new();
            for (i, residue) in backbone.iter().enumerate() {
                if i > 0 {
                    descriptors.push(FeatureDescriptor::Phi {
                        residue: residue.number,
                    });
                }
                if i + 1 < backbone.len() {
                    descriptors.push(FeatureDescriptor::Psi {
                        residue: residue.number,
                    });
                }
            }

            Ok(descriptors)
        }
        FeatureKind::CaDistances => {
            if backbone.len() <= MIN_SEQUENCE_SEPARATION {
                return Err(FeaturizeError::NotEnoughResidues(backbone.len()));
            }

            Ok(pairs
                .iter()
                .map(|&(i, j)| FeatureDescriptor::CaDistance {
                    first: backbone[i].number,
                    second: backbone[j].number,
                })
                .collect())
        }
    }
}

/// Calculate the feature values of one kind for the current frame of the system.
fn frame_features(
    kind: FeatureKind,
    system: &System,
    backbone: &[BackboneResidue],
    pairs: &[(usize, usize)],
    row: &mut Vec<f64>,
) {
    match kind {
        FeatureKind::BackboneTorsions => {
            for i in 0..backbone.len() {
                if i > 0 {
                    row.push(torsions::phi(system, backbone, i));
                }
                if i + 1 < backbone.len() {
                    row.push(torsions::psi(system, backbone, i));
                }
            }
        }
        FeatureKind::CaDistances => {
            for &pair in pairs {
                row.push(distances::ca_distance(system, backbone, pair));
            }
        }
    }
}

/// Calculate features of the requested kinds for every frame of a trajectory.
///
/// The trajectory is read only once, no matter how many feature kinds are
/// requested. The first `start_frame` frames are skipped, which is useful
/// for discarding an equilibration period.
///
/// ## Returns
/// A map from each requested feature kind to its `FeatureSeries`.
/// `FeaturizeError` if the system lacks backbone atoms, the trajectory can
/// not be read, or no frames remain after skipping.
///
/// ## Example
/// ```no_run
/// use ensa_rs::prelude::*;
///
/// fn example_fn() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let mut system = System::from_file("system.gro")?;
///
///     let features = featurize(
///         &mut system,
///         "trajectory.gro",
///         0,
///         &[FeatureKind::BackboneTorsions, FeatureKind::CaDistances],
///     )?;
///
///     let torsions = &features[&FeatureKind::BackboneTorsions];
///     println!("{} frames, {} features", torsions.get_n_frames(), torsions.get_n_features());
///     Ok(())
/// }
/// ```
pub fn featurize(
    system: &mut System,
    trajectory: impl AsRef<Path>,
    start_frame: usize,
    kinds: &[FeatureKind],
) -> Result<IndexMap<FeatureKind, FeatureSeries>, FeaturizeError> {
    let backbone = torsions::collect_backbone(system)?;
    let pairs = distances::collect_pairs(&backbone);

    let mut descriptors = IndexMap::new();
    for &kind in kinds {
        descriptors.insert(kind, build_descriptors(kind, &backbone, &pairs)?);
    }

    let mut values: IndexMap<FeatureKind, Vec<f64>> =
        kinds.iter().map(|&kind| (kind, Vec::new())).collect();
    let mut n_frames = 0;

    for (index, frame) in system.gro_traj_iter(&trajectory)?.enumerate() {
        let frame = frame?;
        if index < start_frame {
            continue;
        }

        for &kind in kinds {
            frame_features(
                kind,
                frame,
                &backbone,
                &pairs,
                values.get_mut(&kind).expect(
                    "FATAL ENSA ERROR | featurizer::featurize | Feature kind disappeared.",
                ),
            );
        }

        n_frames += 1;
    }

    if n_frames == 0 {
        return Err(FeaturizeError::NoFrames(start_frame));
    }

    let mut result = IndexMap::new();
    for &kind in kinds {
        let desc = descriptors
            .shift_remove(&kind)
            .expect("FATAL ENSA ERROR | featurizer::featurize | Missing descriptors.");
        let flat = values
            .shift_remove(&kind)
            .expect("FATAL ENSA ERROR | featurizer::featurize | Missing values.");

        let data = Array2::from_shape_vec((n_frames, desc.len()), flat)
            .expect("FATAL ENSA ERROR | featurizer::featurize | Inconsistent feature matrix.");

        result.insert(kind, FeatureSeries::new(desc, data));
    }

    Ok(result)
}

/******************************/
/*         UNIT TESTS         */
/******************************/
