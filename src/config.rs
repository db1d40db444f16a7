// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of the output directory layout of an analysis run.

use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Directories into which the results of an analysis run are written.
///
/// The layout can be loaded from a yaml file; fields that are not specified
/// keep their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputLayout {
    /// Directory for extracted trajectories.
    #[serde(default = "default_traj_dir")]
    pub traj_dir: PathBuf,
    /// Directory for tables of comparison results.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Directory for plot files.
    #[serde(default = "default_plots_dir")]
    pub plots_dir: PathBuf,
    /// Directory for principal component analysis output.
    #[serde(default = "default_pca_dir")]
    pub pca_dir: PathBuf,
    /// Directory for cluster trajectories.
    #[serde(default = "default_clusters_dir")]
    pub clusters_dir: PathBuf,
    /// Directory for structures used for visualization.
    #[serde(default = "default_vis_dir")]
    pub vis_dir: PathBuf,
}

fn default_traj_dir() -> PathBuf {
    PathBuf::from("traj")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_plots_dir() -> PathBuf {
    PathBuf::from("plots")
}

fn default_pca_dir() -> PathBuf {
    PathBuf::from("pca")
}

fn default_clusters_dir() -> PathBuf {
    PathBuf::from("clusters")
}

fn default_vis_dir() -> PathBuf {
    PathBuf::from("vis")
}

impl Default for OutputLayout {
    fn default() -> Self {
        OutputLayout {
            traj_dir: default_traj_dir(),
            results_dir: default_results_dir(),
            plots_dir: default_plots_dir(),
            pca_dir: default_pca_dir(),
            clusters_dir: default_clusters_dir(),
            vis_dir: default_vis_dir(),
        }
    }
}

impl OutputLayout {
    /// Load the output layout from a yaml file.
    ///
    /// ## Returns
    /// `OutputLayout` if the file could be read and parsed. Otherwise `ConfigError`.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<OutputLayout, ConfigError> {
        let file = File::open(filename.as_ref())
            .map_err(|_| ConfigError::FileNotFound(Box::from(filename.as_ref())))?;

        serde_yaml::from_reader(file)
            .map_err(|e| ConfigError::CouldNotParse(Box::from(filename.as_ref()), e.to_string()))
    }

    /// Create all directories of the layout that do not exist yet.
    pub fn ensure(&self) -> Result<(), ConfigError> {
        for dir in [
            &self.traj_dir,
            &self.results_dir,
            &self.plots_dir,
            &self.pca_dir,
            &self.clusters_dir,
            &self.vis_dir,
        ] {
            create_dir_all(dir).map_err(|_| ConfigError::CouldNotCreateDir(Box::from(dir.as_path())))?;
        }

        Ok(())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn default_layout() {
        let layout = OutputLayout::default();

        assert_eq!(layout.traj_dir, PathBuf::from("traj"));
        assert_eq!(layout.results_dir, PathBuf::from("results"));
        assert_eq!(layout.vis_dir, PathBuf::from("vis"));
    }

    #[test]
    fn from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "traj_dir: my_traj").unwrap();
        writeln!(file, "results_dir: my_results").unwrap();
        file.flush().unwrap();

        let layout = OutputLayout::from_file(file.path()).unwrap();

        assert_eq!(layout.traj_dir, PathBuf::from("my_traj"));
        assert_eq!(layout.results_dir, PathBuf::from("my_results"));
        // unspecified fields keep their defaults
        assert_eq!(layout.pca_dir, PathBuf::from("pca"));
    }

    #[test]
    fn from_file_unknown_field() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "trajectory_directory: my_traj").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            OutputLayout::from_file(file.path()),
            Err(ConfigError::CouldNotParse(_, _))
        ));
    }

    #[test]
    fn from_file_nonexistent() {
        assert!(matches!(
            OutputLayout::from_file("test_files/nonexistent.yaml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn ensure_creates_directories() {
        let root = TempDir::new().unwrap();

        let layout = OutputLayout {
            traj_dir: root.path().join("traj"),
            results_dir: root.path().join("results"),
            plots_dir: root.path().join("plots"),
            pca_dir: root.path().join("pca"),
            clusters_dir: root.path().join("clusters"),
            vis_dir: root.path().join("vis"),
        };

        layout.ensure().unwrap();

        assert!(layout.traj_dir.is_dir());
        assert!(layout.vis_dir.is_dir());
    }
}
