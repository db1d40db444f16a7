// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! # ensa_rs: Ensemble Analysis of Molecular Dynamics Trajectories in Rust
//!
//! Rust library for comparing structural ensembles sampled by molecular
//! dynamics simulations of the same protein under different conditions.
//! Currently in an early stage of development:
//! anything can break, change or stop working at any time.
//!
//! ## Usage
//!
//! Run
//!
//! ```bash
//! $ cargo add ensa_rs
//! ```
//!
//! Import the crate in your Rust code:
//! ```
//! use ensa_rs::prelude::*;
//! ```
//!
//! ## Examples
//!
//! #### Extracting a selection from a trajectory
//!
//! Build a selection from a residue ranges file, extract the matching atoms
//! from a structure and a trajectory, and write them into new files.
//!
//! ```no_run
//! use ensa_rs::analysis::extraction::extract_coordinates;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     // `ranges.txt` contains one `first last` residue pair per line
//!     let n_atoms = extract_coordinates(
//!         "condition_a.gro",
//!         &["condition_a_traj.gro"],
//!         "ranges.txt",
//!         "name N CA C O",
//!         "extracted.gro",
//!         "extracted_traj.gro",
//!         0,
//!     )?;
//!
//!     println!("extracted {} atoms", n_atoms);
//!     Ok(())
//! }
//! ```
//!
//! #### Comparing two simulation conditions
//!
//! Calculate backbone torsions for two trajectories of the same protein and
//! compare their distributions feature by feature.
//!
//! ```no_run
//! use ensa_rs::prelude::*;
//! use ensa_rs::analysis::comparison::relative_entropy_analysis;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let mut system_a = System::from_file("condition_a.gro")?;
//!     let mut system_b = System::from_file("condition_b.gro")?;
//!
//!     let kinds = [FeatureKind::BackboneTorsions];
//!     let features_a = featurize(&mut system_a, "condition_a_traj.gro", 0, &kinds)?;
//!     let features_b = featurize(&mut system_b, "condition_b_traj.gro", 0, &kinds)?;
//!
//!     let result = relative_entropy_analysis(
//!         &features_a[&FeatureKind::BackboneTorsions],
//!         &features_b[&FeatureKind::BackboneTorsions],
//!         0.1,
//!     )?;
//!
//!     for (descriptor, js) in result.descriptors().iter().zip(result.js_distances()) {
//!         println!("{}: {:.4}", descriptor, js);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Iterating over a trajectory
//!
//! Iterate over the frames of a multi-frame gro trajectory, reading each
//! frame into the `System` structure.
//!
//! ```no_run
//! use ensa_rs::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let mut system = System::from_file("condition_a.gro")?;
//!
//!     for frame in system.gro_traj_iter("condition_a_traj.gro")? {
//!         // check that the frame has been read correctly
//!         let frame = frame?;
//!         println!("time: {} ps", frame.get_simulation_time());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//! - Selection expressions combining residue ranges from a file with a base
//!   selection (atom and residue names, residue and atom numbers, chains,
//!   regular expressions).
//! - Reading and writing gro and pdb files and multi-frame gro trajectories.
//! - Featurization of trajectories into backbone torsions and alpha-carbon
//!   distances.
//! - Statistical comparison of feature ensembles: relative entropy metrics,
//!   Kolmogorov-Smirnov test, mean differences.
//! - Principal component analysis and frame sorting along components.
//! - K-means clustering of combined ensembles with per-condition tracking.
//! - Visualization output: per-residue profiles as xvg plots and pdb files
//!   with the profile in the B-factor column.
//!
//! ## Limitations
//! - Only orthogonal simulation boxes are supported.
//! - Trajectories are read from multi-frame gro files; compressed Gromacs
//!   formats are not supported.

/// Current version of the crate.
pub const ENSA_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod analysis {
    pub mod clustering;
    pub mod comparison;
    pub mod extraction;
    pub mod pca;
    pub mod visualization;
}
pub mod config;
pub mod errors;
pub mod features {
    pub mod distances;
    pub mod featurizer;
    pub mod torsions;
}
pub mod files;
pub mod io {
    pub mod csv_io;
    pub mod gro_io;
    pub mod pdb_io;
    pub mod traj_io;
    pub mod xvg_io;
}
pub mod progress;
pub mod selections {
    mod numbers;
    pub mod ranges;
    pub mod select;
}
pub mod structures {
    pub mod atom;
    pub mod group;
    pub mod simbox;
    pub mod vector3d;
}
pub mod system {
    pub mod general;
    mod groups;
}

/// Reexported basic `ensa_rs` structures and functions.
pub mod prelude {
    pub use crate::analysis::clustering::{combined_clusters, kmeans, CombinedClusters, KMeans};
    pub use crate::analysis::pca::Pca;
    pub use crate::config::OutputLayout;
    pub use crate::features::featurizer::{
        featurize, FeatureDescriptor, FeatureKind, FeatureSeries,
    };
    pub use crate::io::traj_io::{GroTrajReader, GroTrajWriter};
    pub use crate::progress::{ProgressPrinter, ProgressStatus};
    pub use crate::selections::ranges::{build_selection, load_selection, ResidueRange};
    pub use crate::structures::atom::Atom;
    pub use crate::structures::simbox::SimBox;
    pub use crate::structures::vector3d::Vector3D;
    pub use crate::system::general::System;
}
