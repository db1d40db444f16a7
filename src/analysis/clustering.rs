// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of k-means clustering of conformational ensembles.

use std::path::Path;

use getset::Getters;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::ClusterError;
use crate::features::featurizer::FeatureSeries;
use crate::io::traj_io::GroTrajWriter;
use crate::system::general::System;

/// Default cap on the number of Lloyd iterations of a single k-means run.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Convergence threshold for centroid movement between iterations.
const CONVERGENCE_TOLERANCE: f64 = 1e-6;

/// Result of k-means clustering of a data matrix.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct KMeans {
    /// Cluster centroids with shape `[k, features]`.
    centroids: Array2<f64>,
    /// Cluster index of each frame.
    labels: Vec<usize>,
    /// Sum of squared distances of frames to their assigned centroids.
    inertia: f64,
}

/// Squared euclidean distance of two points.
fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum()
}

/// Choose initial centroids using the k-means++ scheme.
fn initial_centroids(data: &Array2<f64>, k: usize, rng: &mut StdRng) -> Vec<usize> {
    let n = data.nrows();
    let mut chosen = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n));

    let mut distances: Vec<f64> = (0..n)
        .map(|i| squared_distance(data.row(i), data.row(chosen[0])))
        .collect();

    while chosen.len() < k {
        let total: f64 = distances.iter().sum();

        let next = if total <= 0.0 {
            // all remaining points coincide with a centroid
            rng.gen_range(0..n)
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut selected = n - 1;
            for (i, &d) in distances.iter().enumerate() {
                target -= d;
                if target <= 0.0 {
                    selected = i;
                    break;
                }
            }
            selected
        };

        chosen.push(next);

        for i in 0..n {
            let d = squared_distance(data.row(i), data.row(next));
            if d < distances[i] {
                distances[i] = d;
            }
        }
    }

    chosen
}

/// Cluster the rows of a data matrix into `k` clusters using k-means.
///
/// Initialization uses the k-means++ scheme with a seeded random generator,
/// so results are reproducible for a given seed. Lloyd iterations stop after
/// `max_iter` rounds or once the centroids stop moving; at least one
/// assignment pass is always performed.
///
/// ## Returns
/// `KMeans` if the clustering was successful. `ClusterError` if `k` is zero,
/// exceeds the number of frames, or the data is empty.
pub fn kmeans(
    data: &Array2<f64>,
    k: usize,
    max_iter: usize,
    seed: u64,
) -> Result<KMeans, ClusterError> {
    if k == 0 {
        return Err(ClusterError::ZeroClusters);
    }

    let n = data.nrows();
    if n == 0 {
        return Err(ClusterError::EmptyData);
    }

    if k > n {
        return Err(ClusterError::TooManyClusters(k, n));
    }

    let n_features = data.ncols();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut centroids = Array2::zeros((k, n_features));
    for (c, &row) in initial_centroids(data, k, &mut rng).iter().enumerate() {
        centroids.row_mut(c).assign(&data.row(row));
    }

    let mut labels = vec![0; n];

    for _ in 0..max_iter.max(1) {
        // assignment step
        for i in 0..n {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for c in 0..k {
                let d = squared_distance(data.row(i), centroids.row(c));
                if d < best_distance {
                    best_distance = d;
                    best = c;
                }
            }
            labels[i] = best;
        }

        // update step
        let mut new_centroids = Array2::zeros((k, n_features));
        let mut counts = vec![0usize; k];

        for i in 0..n {
            let c = labels[i];
            counts[c] += 1;
            let mut target = new_centroids.row_mut(c);
            target += &data.row(i);
        }

        for c in 0..k {
            if counts[c] == 0 {
                // empty cluster keeps its previous centroid
                new_centroids.row_mut(c).assign(&centroids.row(c));
            } else {
                let mut target = new_centroids.row_mut(c);
                target /= counts[c] as f64;
            }
        }

        let shift: f64 = (0..k)
            .map(|c| squared_distance(centroids.row(c), new_centroids.row(c)))
            .sum();

        centroids = new_centroids;

        if shift < CONVERGENCE_TOLERANCE {
            break;
        }
    }

    let inertia = (0..n)
        .map(|i| squared_distance(data.row(i), centroids.row(labels[i])))
        .sum();

    Ok(KMeans {
        centroids,
        labels,
        inertia,
    })
}

/// Clusters of the combined frames of several ensembles.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct CombinedClusters {
    /// Number of clusters.
    k: usize,
    /// Cluster index of each frame, one vector per input ensemble, in
    /// original frame order.
    labels: Vec<Vec<usize>>,
    /// Number of frames of each ensemble in each cluster, indexed as
    /// `sizes[ensemble][cluster]`.
    sizes: Vec<Vec<usize>>,
}

/// Cluster the combined frames of several feature ensembles.
///
/// Frames of all ensembles are pooled into a single data matrix and
/// clustered together. Every frame keeps its association with the ensemble
/// it came from, so the populations of each cluster in each ensemble can be
/// compared.
///
/// ## Returns
/// `CombinedClusters` if the clustering was successful. `ClusterError` if
/// the ensembles describe different numbers of features or the requested
/// number of clusters is invalid.
pub fn combined_clusters(
    ensembles: &[&FeatureSeries],
    k: usize,
    max_iter: usize,
    seed: u64,
) -> Result<CombinedClusters, ClusterError> {
    if ensembles.is_empty() {
        return Err(ClusterError::EmptyData);
    }

    let n_features = ensembles[0].get_n_features();
    for series in ensembles {
        if series.get_n_features() != n_features {
            return Err(ClusterError::ShapeMismatch(
                n_features,
                series.get_n_features(),
            ));
        }
    }

    let total_frames: usize = ensembles.iter().map(|s| s.get_n_frames()).sum();

    let mut flat = Vec::with_capacity(total_frames * n_features);
    for series in ensembles {
        flat.extend(series.get_data().iter().copied());
    }

    let data = Array2::from_shape_vec((total_frames, n_features), flat)
        .expect("FATAL ENSA ERROR | clustering::combined_clusters | Inconsistent data matrix.");

    let result = kmeans(&data, k, max_iter, seed)?;

    let mut labels = Vec::with_capacity(ensembles.len());
    let mut sizes = vec![vec![0usize; k]; ensembles.len()];

    let mut offset = 0;
    for (e, series) in ensembles.iter().enumerate() {
        let frames = series.get_n_frames();
        let ensemble_labels = result.labels()[offset..offset + frames].to_vec();

        for &label in &ensemble_labels {
            sizes[e][label] += 1;
        }

        labels.push(ensemble_labels);
        offset += frames;
    }

    Ok(CombinedClusters { k, labels, sizes })
}

/// Write the frames of a trajectory into separate files according to their
/// cluster assignment.
///
/// The first `start_frame` frames of the trajectory are skipped; `labels[i]`
/// is the cluster of trajectory frame `start_frame + i`, matching the offset
/// used during featurization. Output files are named `<name>_cluster<i>.gro`
/// and placed into the given directory. Clusters with no frames in this
/// trajectory produce no file.
///
/// ## Returns
/// Paths of the written files, indexed by cluster.
pub fn write_cluster_traj(
    system: &mut System,
    trajectory: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    name: &str,
    labels: &[usize],
    k: usize,
    start_frame: usize,
) -> Result<Vec<Option<std::path::PathBuf>>, ClusterError> {
    let mut writers: Vec<Option<(std::path::PathBuf, GroTrajWriter)>> =
        (0..k).map(|_| None).collect();

    let mut n_frames = 0;
    for (index, result) in system.gro_traj_iter(&trajectory)?.enumerate() {
        let frame = result?;

        if index < start_frame {
            continue;
        }
        let index = index - start_frame;

        if index >= labels.len() {
            return Err(ClusterError::ShapeMismatch(index + 1, labels.len()));
        }

        let cluster = labels[index];
        if writers[cluster].is_none() {
            let path = output_dir
                .as_ref()
                .join(format!("{}_cluster{}.gro", name, cluster));
            let writer = GroTrajWriter::new(frame, "all", &path, false)
                .map_err(ClusterError::CouldNotWriteTraj)?;
            writers[cluster] = Some((path, writer));
        }

        writers[cluster]
            .as_mut()
            .expect("FATAL ENSA ERROR | clustering::write_cluster_traj | Writer disappeared.")
            .1
            .write_frame(frame)
            .map_err(ClusterError::CouldNotWriteTraj)?;

        n_frames += 1;
    }

    if n_frames != labels.len() {
        return Err(ClusterError::ShapeMismatch(n_frames, labels.len()));
    }

    Ok(writers
        .into_iter()
        .map(|w| w.map(|(path, _)| path))
        .collect())
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::featurizer::FeatureDescriptor;
    use float_cmp::assert_approx_eq;

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
    fn two_well_separated_clusters() {
        let data = Array2::from_shape_vec(
            (6, 2),
            vec![
                0.0, 0.1, 0.1, 0.0, 0.05, 0.05, 10.0, 10.1, 10.1, 10.0, 10.05, 10.05,
            ],
        )
        .unwrap();

        let result = kmeans(&data, 2, DEFAULT_MAX_ITERATIONS, 42).unwrap();

        let labels = result.labels();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);

        // tight clusters have a small inertia
        assert!(*result.inertia() < 0.1);
    }

    #[test]
    fn single_cluster() {
        let data =
            Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        let result = kmeans(&data, 1, DEFAULT_MAX_ITERATIONS, 0).unwrap();

        assert!(result.labels().iter().all(|&l| l == 0));
        assert_approx_eq!(f64, result.centroids()[(0, 0)], 2.5, epsilon = 1e-10);
    }

    #[test]
    fn reproducible_for_seed() {
        let data = Array2::from_shape_vec(
            (6, 1),
            vec![0.0, 0.1, 0.2, 5.0, 5.1, 5.2],
        )
        .unwrap();

        let first = kmeans(&data, 2, DEFAULT_MAX_ITERATIONS, 7).unwrap();
        let second = kmeans(&data, 2, DEFAULT_MAX_ITERATIONS, 7).unwrap();

        assert_eq!(first.labels(), second.labels());
    }

    #[test]
    fn invalid_cluster_counts() {
        let data = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();

        assert!(matches!(
            kmeans(&data, 0, DEFAULT_MAX_ITERATIONS, 0),
            Err(ClusterError::ZeroClusters)
        ));
        assert!(matches!(
            kmeans(&data, 4, DEFAULT_MAX_ITERATIONS, 0),
            Err(ClusterError::TooManyClusters(4, 3))
        ));
    }

    #[test]
    fn combined_tracking() {
        let first = series(vec![0.0, 0.1, 0.2], 1);
        let second = series(vec![5.0, 5.1, 5.2, 0.05], 1);

        let result = combined_clusters(&[&first, &second], 2, DEFAULT_MAX_ITERATIONS, 42).unwrap();

        assert_eq!(*result.k(), 2);
        assert_eq!(result.labels()[0].len(), 3);
        assert_eq!(result.labels()[1].len(), 4);

        // all frames of the first ensemble fall into one cluster
        let c = result.labels()[0][0];
        assert!(result.labels()[0].iter().all(|&l| l == c));

        // the last frame of the second ensemble joins them
        assert_eq!(result.labels()[1][3], c);

        assert_eq!(result.sizes()[0][c], 3);
        assert_eq!(result.sizes()[1][c], 1);
    }

    #[test]
    fn combined_shape_mismatch() {
        let first = series(vec![0.0, 1.0], 1);
        let second = series(vec![0.0, 1.0, 2.0, 3.0], 2);

        assert!(matches!(
            combined_clusters(&[&first, &second], 2, DEFAULT_MAX_ITERATIONS, 0),
            Err(ClusterError::ShapeMismatch(1, 2))
        ));
    }

    #[test]
    fn cluster_trajectories() {
        let mut system = System::from_file("test_files/example.gro").unwrap();
        let output_dir = tempfile::TempDir::new().unwrap();

        let labels = vec![0, 1, 0, 1, 0];
        let paths = write_cluster_traj(
            &mut system,
            "test_files/example_traj.gro",
            output_dir.path(),
            "condition-a",
            &labels,
            3,
            0,
        )
        .unwrap();

        assert!(paths[0].is_some());
        assert!(paths[1].is_some());
        // cluster 2 has no frames
        assert!(paths[2].is_none());

        let mut reread = System::from_file("test_files/example.gro").unwrap();
        let n = reread
            .gro_traj_iter(paths[0].as_ref().unwrap())
            .unwrap()
            .count();
        assert_eq!(n, 3);
    }

    #[test]
    fn cluster_label_count_mismatch() {
        let mut system = System::from_file("test_files/example.gro").unwrap();
        let output_dir = tempfile::TempDir::new().unwrap();

        let labels = vec![0, 1];
        assert!(matches!(
            write_cluster_traj(
                &mut system,
                "test_files/example_traj.gro",
                output_dir.path(),
                "condition-a",
                &labels,
                2,
                0,
            ),
            Err(ClusterError::ShapeMismatch(3, 2))
        ));
    }

    #[test]
    fn cluster_trajectories_with_offset() {
        let mut system = System::from_file("test_files/example.gro").unwrap();
        let output_dir = tempfile::TempDir::new().unwrap();

        // labels cover the three frames remaining after the offset
        let labels = vec![0, 1, 0];
        let paths = write_cluster_traj(
            &mut system,
            "test_files/example_traj.gro",
            output_dir.path(),
            "condition-a",
            &labels,
            2,
            2,
        )
        .unwrap();

        let mut reread = System::from_file("test_files/example.gro").unwrap();
        let n = reread
            .gro_traj_iter(paths[0].as_ref().unwrap())
            .unwrap()
            .count();
        assert_eq!(n, 2);

        let n = reread
            .gro_traj_iter(paths[1].as_ref().unwrap())
            .unwrap()
            .count();
        assert_eq!(n, 1);
    }

    #[test]
    fn iteration_cap_still_assigns() {
        let data = Array2::from_shape_vec(
            (6, 1),
            vec![0.0, 0.1, 0.2, 5.0, 5.1, 5.2],
        )
        .unwrap();

        // even a single iteration separates well-divided data
        let result = kmeans(&data, 2, 1, 42).unwrap();

        let labels = result.labels();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);

        // a zero cap degrades to a single assignment pass
        let result = kmeans(&data, 2, 0, 42).unwrap();
        assert_eq!(result.labels().len(), 6);
    }
}
