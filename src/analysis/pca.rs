// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of principal component analysis of feature ensembles.

use std::path::Path;

use nalgebra::{DMatrix, Dyn, SymmetricEigen};
use ndarray::{Array1, Array2};

use crate::errors::PcaError;
use crate::features::featurizer::FeatureSeries;
use crate::io::traj_io::GroTrajWriter;
use crate::system::general::System;

/// Principal component analysis of a feature ensemble.
///
/// Construct with [`Pca::compute`]. The internals of the decomposition are
/// not exposed; projections are obtained through [`Pca::project`].
#[derive(Debug, Clone)]
pub struct Pca {
    /// Mean of each feature of the input data.
    means: Array1<f64>,
    /// Eigenvectors of the covariance matrix, one column per component,
    /// ordered by descending eigenvalue.
    components: DMatrix<f64>,
    /// Eigenvalues ordered descending.
    eigenvalues: Vec<f64>,
}

impl Pca {
    /// Perform principal component analysis of the given feature series.
    ///
    /// The covariance matrix of the (mean-centered) features is decomposed
    /// into eigenvectors which form the principal components, ordered by
    /// descending variance.
    ///
    /// ## Returns
    /// `Pca` if the decomposition was successful. `PcaError` if the data has
    /// no features or fewer than 2 frames.
    pub fn compute(series: &FeatureSeries) -> Result<Pca, PcaError> {
        let data = series.get_data();
        let (n_frames, n_features) = (data.nrows(), data.ncols());

        if n_features == 0 {
            return Err(PcaError::NoFeatures);
        }

        if n_frames < 2 {
            return Err(PcaError::NotEnoughFrames(n_frames));
        }

        let means = data
            .mean_axis(ndarray::Axis(0))
            .expect("FATAL ENSA ERROR | Pca::compute | Data matrix has no frames.");

        // covariance matrix of the mean-centered data
        let mut covariance = DMatrix::zeros(n_features, n_features);
        for frame in data.rows() {
            for i in 0..n_features {
                let di = frame[i] - means[i];
                for j in i..n_features {
                    covariance[(i, j)] += di * (frame[j] - means[j]);
                }
            }
        }

        let norm = (n_frames - 1) as f64;
        for i in 0..n_features {
            for j in i..n_features {
                covariance[(i, j)] /= norm;
                covariance[(j, i)] = covariance[(i, j)];
            }
        }

        let eigen: SymmetricEigen<f64, Dyn> = SymmetricEigen::new(covariance);

        // order components by descending eigenvalue
        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let mut components = DMatrix::zeros(n_features, n_features);
        let mut eigenvalues = Vec::with_capacity(n_features);

        for (target, &source) in order.iter().enumerate() {
            components.set_column(target, &eigen.eigenvectors.column(source));
            eigenvalues.push(eigen.eigenvalues[source]);
        }

        Ok(Pca {
            means,
            components,
            eigenvalues,
        })
    }

    /// Get the eigenvalues of the analysis, ordered descending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Get the number of principal components of the analysis.
    pub fn component_count(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Project frames of a feature series onto a single principal component.
    ///
    /// ## Returns
    /// One projection value per frame. `PcaError` if the component does not
    /// exist or the series has a different number of features than the
    /// analyzed data.
    pub fn project(&self, series: &FeatureSeries, component: usize) -> Result<Vec<f64>, PcaError> {
        if component >= self.component_count() {
            return Err(PcaError::ComponentOutOfRange(
                component,
                self.component_count(),
            ));
        }

        let data = series.get_data();
        if data.ncols() != self.means.len() {
            return Err(PcaError::ShapeMismatch(data.ncols(), self.means.len()));
        }

        let axis = self.components.column(component);

        Ok(data
            .rows()
            .into_iter()
            .map(|frame| {
                frame
                    .iter()
                    .enumerate()
                    .map(|(i, &x)| (x - self.means[i]) * axis[i])
                    .sum()
            })
            .collect())
    }

    /// Project frames of a feature series onto the first `n_components`
    /// principal components.
    ///
    /// ## Returns
    /// A matrix with shape `[frames, n_components]`.
    pub fn project_all(
        &self,
        series: &FeatureSeries,
        n_components: usize,
    ) -> Result<Array2<f64>, PcaError> {
        let mut flat = Vec::with_capacity(series.get_n_frames() * n_components);
        let mut columns = Vec::with_capacity(n_components);

        for component in 0..n_components {
            columns.push(self.project(series, component)?);
        }

        for frame in 0..series.get_n_frames() {
            for column in &columns {
                flat.push(column[frame]);
            }
        }

        Ok(
            Array2::from_shape_vec((series.get_n_frames(), n_components), flat).expect(
                "FATAL ENSA ERROR | Pca::project_all | Inconsistent projection matrix.",
            ),
        )
    }
}

/// Write the frames of a trajectory sorted by their projection onto a
/// principal component, ascending.
///
/// The first `start_frame` frames of the trajectory are the equilibration
/// frames skipped during featurization; row `i` of the feature data
/// describes trajectory frame `start_frame + i`. The trajectory is read
/// twice: once to establish the frame order and once to write the frames in
/// that order.
///
/// ## Returns
/// The sorted projection values. `PcaError` if the trajectory does not match
/// the feature data or an io operation fails.
pub fn sort_traj_along_pc(
    system: &mut System,
    trajectory: impl AsRef<Path>,
    output: impl AsRef<Path>,
    pca: &Pca,
    series: &FeatureSeries,
    component: usize,
    start_frame: usize,
) -> Result<Vec<f64>, PcaError> {
    let projection = pca.project(series, component)?;

    let n_frames = system.gro_traj_iter(&trajectory)?.count();
    let usable = n_frames.saturating_sub(start_frame);
    if usable != projection.len() {
        return Err(PcaError::FrameCountMismatch(usable, projection.len()));
    }

    let mut order: Vec<usize> = (0..projection.len()).collect();
    order.sort_by(|&a, &b| projection[a].total_cmp(&projection[b]));

    // rank of each source frame in the sorted output
    let mut rank = vec![0; order.len()];
    for (target, &source) in order.iter().enumerate() {
        rank[source] = target;
    }

    write_reordered(system, &trajectory, output, &rank, start_frame)?;

    Ok(order.iter().map(|&i| projection[i]).collect())
}

/// Write the frames of several trajectories sorted by their projection onto
/// a principal component common to all of them, ascending.
///
/// The analysis must have been computed on the concatenation of the feature
/// series in the given order. One output trajectory is written, interleaving
/// frames of all input trajectories in ascending projection order. The first
/// `start_frame` frames of every trajectory are skipped, matching the offset
/// used during featurization.
pub fn sort_trajs_along_common_pc(
    systems: &mut [System],
    trajectories: &[impl AsRef<Path>],
    output: impl AsRef<Path>,
    pca: &Pca,
    series: &[FeatureSeries],
    component: usize,
    start_frame: usize,
) -> Result<Vec<f64>, PcaError> {
    if systems.is_empty() {
        return Ok(Vec::new());
    }

    // projection of every frame of every trajectory, tagged with its origin
    let mut tagged: Vec<(f64, usize, usize)> = Vec::new();
    for (t, s) in series.iter().enumerate() {
        for (frame, value) in pca.project(s, component)?.into_iter().enumerate() {
            tagged.push((value, t, frame));
        }
    }

    tagged.sort_by(|a, b| a.0.total_cmp(&b.0));

    // buffer every usable frame of every trajectory so that the combined
    // output can be written in projection order across trajectories
    let mut buffered: Vec<Vec<System>> = Vec::with_capacity(systems.len());
    for ((system, trajectory), s) in systems
        .iter_mut()
        .zip(trajectories.iter())
        .zip(series.iter())
    {
        let mut frames = Vec::new();

        for (index, result) in system.gro_traj_iter(trajectory)?.enumerate() {
            let frame = result?;
            if index < start_frame {
                continue;
            }
            frames.push(frame.clone());
        }

        if frames.len() != s.get_n_frames() {
            return Err(PcaError::FrameCountMismatch(frames.len(), s.get_n_frames()));
        }

        buffered.push(frames);
    }

    // all systems must contain the same atoms for the combined output
    let mut writer = GroTrajWriter::new(&systems[0], "all", &output, false)
        .map_err(PcaError::CouldNotWriteTraj)?;

    for (rank, &(_, t, frame)) in tagged.iter().enumerate() {
        let frame_system = &mut buffered[t][frame];
        // rank is used as the simulation step so that the position of each
        // frame in the combined ordering survives in the output
        frame_system.set_simulation_step(rank as u64);
        writer
            .write_frame(frame_system)
            .map_err(PcaError::CouldNotWriteTraj)?;
    }

    Ok(tagged.into_iter().map(|(value, _, _)| value).collect())
}

/// Write the frames of a trajectory reordered by the given ranks.
///
/// The first `start_frame` frames are skipped; `rank[i]` is the output
/// position of trajectory frame `start_frame + i`.
fn write_reordered(
    system: &mut System,
    trajectory: impl AsRef<Path>,
    output: impl AsRef<Path>,
    rank: &[usize],
    start_frame: usize,
) -> Result<(), PcaError> {
    // frames are buffered in memory so that they can be written out of order
    let mut frames: Vec<(usize, System)> = Vec::with_capacity(rank.len());

    for (index, result) in system.gro_traj_iter(&trajectory)?.enumerate() {
        let frame = result?;
        if index < start_frame {
            continue;
        }
        frames.push((rank[index - start_frame], frame.clone()));
    }

    if frames.is_empty() {
        return Ok(());
    }

    frames.sort_by_key(|&(r, _)| r);

    let writer_source = &frames[0].1;
    let mut writer =
        GroTrajWriter::new(writer_source, "all", &output, false).map_err(PcaError::CouldNotWriteTraj)?;

    for (_, frame) in &frames {
        writer.write_frame(frame).map_err(PcaError::CouldNotWriteTraj)?;
    }

    Ok(())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
