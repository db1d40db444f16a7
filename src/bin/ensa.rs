// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Command line interface for comparing ensembles of molecular dynamics trajectories.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use ensa_rs::analysis::clustering::{self, combined_clusters};
use ensa_rs::analysis::comparison::{
    kolmogorov_smirnov_analysis, mean_difference_analysis, relative_entropy_analysis,
    sort_features,
};
use ensa_rs::analysis::extraction::{extract_combined, extract_coordinates};
use ensa_rs::analysis::pca::{sort_traj_along_pc, Pca};
use ensa_rs::analysis::visualization::{
    per_residue_profile, write_distance_matrix, write_profile_xvg, write_residue_pdb,
    ProfileAggregation,
};
use ensa_rs::config::OutputLayout;
use ensa_rs::features::featurizer::{featurize, FeatureKind, FeatureSeries};
use ensa_rs::io::csv_io::write_csv;
use ensa_rs::io::xvg_io::{write_xvg, XvgSeries};
use ensa_rs::system::general::System;

#[derive(Parser)]
#[command(
    name = "ensa",
    version,
    about = "Ensemble analysis of molecular dynamics trajectories."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Yaml file describing the output directory layout.
    #[arg(long, global = true)]
    layout: Option<PathBuf>,
}

/// Kind of features calculated from trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum FeatureArg {
    /// Phi and psi backbone torsion angles.
    BbTorsions,
    /// Distances between alpha carbons of distant residues.
    CaDistances,
}

impl From<FeatureArg> for FeatureKind {
    fn from(arg: FeatureArg) -> Self {
        match arg {
            FeatureArg::BbTorsions => FeatureKind::BackboneTorsions,
            FeatureArg::CaDistances => FeatureKind::CaDistances,
        }
    }
}

/// Statistical method used to compare two ensembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum CompareMethod {
    /// Jensen-Shannon distance and Kullback-Leibler divergences.
    RelativeEntropy,
    /// Two-sample Kolmogorov-Smirnov test.
    KolmogorovSmirnov,
    /// Difference of feature means.
    MeanDifference,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a selection of atoms from a structure and its trajectories.
    Extract {
        /// Input structure file (gro or pdb).
        #[arg(short, long)]
        structure: PathBuf,
        /// Input trajectory files (multi-frame gro), concatenated in order.
        #[arg(short, long, num_args = 1..)]
        trajectories: Vec<PathBuf>,
        /// File with residue ranges, one `first last` pair per line.
        #[arg(short, long)]
        ranges: PathBuf,
        /// Base selection the residue ranges are combined with.
        #[arg(short = 'e', long, default_value = "name N CA C O")]
        selection: String,
        /// Number of equilibration frames to skip at the start of each trajectory.
        #[arg(long, default_value_t = 0)]
        start_frame: usize,
        /// Name of the extracted dataset, used in output file names.
        #[arg(short, long)]
        name: String,
    },
    /// Extract per-condition selections into a single concatenated trajectory.
    ExtractCombined {
        /// Input structure files, one per condition.
        #[arg(short, long, num_args = 1..)]
        structures: Vec<PathBuf>,
        /// Input trajectory files, one per condition.
        #[arg(short, long, num_args = 1..)]
        trajectories: Vec<PathBuf>,
        /// File with residue ranges, one `first last` pair per line.
        #[arg(short, long)]
        ranges: PathBuf,
        /// Base selections the residue ranges are combined with, either one
        /// shared by all conditions or one per condition.
        #[arg(short = 'e', long, num_args = 1.., default_value = "name N CA C O")]
        selections: Vec<String>,
        /// Number of equilibration frames to skip at the start of each trajectory.
        #[arg(long, default_value_t = 0)]
        start_frame: usize,
        /// Name of the combined dataset, used in output file names.
        #[arg(short, long)]
        name: String,
    },
    /// Compare the feature distributions of two simulation conditions.
    Compare {
        /// Structure file of the first condition.
        #[arg(long)]
        structure_a: PathBuf,
        /// Trajectory file of the first condition.
        #[arg(long)]
        trajectory_a: PathBuf,
        /// Structure file of the second condition.
        #[arg(long)]
        structure_b: PathBuf,
        /// Trajectory file of the second condition.
        #[arg(long)]
        trajectory_b: PathBuf,
        /// Kind of features to compare.
        #[arg(short, long, value_enum, default_value_t = FeatureArg::BbTorsions)]
        feature: FeatureArg,
        /// Statistical method of the comparison.
        #[arg(short, long, value_enum, default_value_t = CompareMethod::RelativeEntropy)]
        method: CompareMethod,
        /// Histogram bin width for the relative entropy method.
        #[arg(short, long, default_value_t = 0.1)]
        bin_width: f64,
        /// Number of equilibration frames to skip at the start of each trajectory.
        #[arg(long, default_value_t = 0)]
        start_frame: usize,
        /// Name of the comparison, used in output file names.
        #[arg(short, long)]
        name: String,
    },
    /// Perform principal component analysis of a trajectory.
    Pca {
        /// Input structure file (gro or pdb).
        #[arg(short, long)]
        structure: PathBuf,
        /// Input trajectory file (multi-frame gro).
        #[arg(short, long)]
        trajectory: PathBuf,
        /// Kind of features to analyze.
        #[arg(short, long, value_enum, default_value_t = FeatureArg::BbTorsions)]
        feature: FeatureArg,
        /// Number of principal components to report.
        #[arg(short = 'c', long, default_value_t = 3)]
        components: usize,
        /// Number of equilibration frames to skip at the start of the trajectory.
        #[arg(long, default_value_t = 0)]
        start_frame: usize,
        /// Name of the analysis, used in output file names.
        #[arg(short, long)]
        name: String,
    },
    /// Cluster the combined frames of several conditions.
    Cluster {
        /// Input structure files, one per condition.
        #[arg(short, long, num_args = 1..)]
        structures: Vec<PathBuf>,
        /// Input trajectory files, one per condition.
        #[arg(short, long, num_args = 1..)]
        trajectories: Vec<PathBuf>,
        /// Names of the conditions, used in output file names.
        #[arg(short, long, num_args = 1..)]
        names: Vec<String>,
        /// Kind of features to cluster on.
        #[arg(short, long, value_enum, default_value_t = FeatureArg::BbTorsions)]
        feature: FeatureArg,
        /// Number of clusters.
        #[arg(short, long, default_value_t = 2)]
        k: usize,
        /// Maximal number of k-means iterations.
        #[arg(long, default_value_t = clustering::DEFAULT_MAX_ITERATIONS)]
        max_iter: usize,
        /// Seed of the random generator, for reproducible clustering.
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of equilibration frames to skip at the start of each trajectory.
        #[arg(long, default_value_t = 0)]
        start_frame: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let layout = match &cli.layout {
        Some(path) => match OutputLayout::from_file(path) {
            Ok(x) => x,
            Err(e) => report_error(e),
        },
        None => OutputLayout::default(),
    };

    if let Err(e) = layout.ensure() {
        report_error(e);
    }

    let result = match cli.command {
        Command::Extract {
            structure,
            trajectories,
            ranges,
            selection,
            start_frame,
            name,
        } => run_extract(
            &layout,
            structure,
            trajectories,
            ranges,
            &selection,
            start_frame,
            &name,
        ),
        Command::ExtractCombined {
            structures,
            trajectories,
            ranges,
            selections,
            start_frame,
            name,
        } => run_extract_combined(
            &layout,
            structures,
            trajectories,
            ranges,
            selections,
            start_frame,
            &name,
        ),
        Command::Compare {
            structure_a,
            trajectory_a,
            structure_b,
            trajectory_b,
            feature,
            method,
            bin_width,
            start_frame,
            name,
        } => run_compare(
            &layout,
            structure_a,
            trajectory_a,
            structure_b,
            trajectory_b,
            feature.into(),
            method,
            bin_width,
            start_frame,
            &name,
        ),
        Command::Pca {
            structure,
            trajectory,
            feature,
            components,
            start_frame,
            name,
        } => run_pca(
            &layout,
            structure,
            trajectory,
            feature.into(),
            components,
            start_frame,
            &name,
        ),
        Command::Cluster {
            structures,
            trajectories,
            names,
            feature,
            k,
            max_iter,
            seed,
            start_frame,
        } => run_cluster(
            &layout,
            structures,
            trajectories,
            &names,
            feature.into(),
            k,
            max_iter,
            seed,
            start_frame,
        ),
    };

    if let Err(e) = result {
        report_error_boxed(e);
    }
}

fn report_error(error: impl std::error::Error) -> ! {
    eprintln!("{} {}", "error:".red().bold(), error);
    process::exit(1);
}

fn report_error_boxed(error: Box<dyn std::error::Error>) -> ! {
    eprintln!("{} {}", "error:".red().bold(), error);
    process::exit(1);
}

type RunResult = Result<(), Box<dyn std::error::Error>>;

#[allow(clippy::too_many_arguments)]
fn run_extract(
    layout: &OutputLayout,
    structure: PathBuf,
    trajectories: Vec<PathBuf>,
    ranges: PathBuf,
    selection: &str,
    start_frame: usize,
    name: &str,
) -> RunResult {
    let output_structure = layout.traj_dir.join(format!("{}.gro", name));
    let output_trajectory = layout.traj_dir.join(format!("{}_traj.gro", name));

    let n_atoms = extract_coordinates(
        structure,
        &trajectories,
        ranges,
        selection,
        &output_structure,
        &output_trajectory,
        start_frame,
    )?;

    println!(
        "Extracted {} atoms into `{}`.",
        n_atoms,
        output_trajectory.display()
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_extract_combined(
    layout: &OutputLayout,
    structures: Vec<PathBuf>,
    trajectories: Vec<PathBuf>,
    ranges: PathBuf,
    mut selections: Vec<String>,
    start_frame: usize,
    name: &str,
) -> RunResult {
    // a single selection is shared by all conditions
    if selections.len() == 1 && structures.len() > 1 {
        selections = vec![selections[0].clone(); structures.len()];
    }

    let output_structure = layout.traj_dir.join(format!("{}.gro", name));
    let output_trajectory = layout.traj_dir.join(format!("{}_traj.gro", name));

    let n_atoms = extract_combined(
        &structures,
        &trajectories,
        ranges,
        &selections,
        &output_structure,
        &output_trajectory,
        start_frame,
    )?;

    println!(
        "Extracted {} atoms per condition into `{}`.",
        n_atoms,
        output_trajectory.display()
    );

    Ok(())
}

/// Calculate features of one kind for a single condition.
fn condition_features(
    structure: PathBuf,
    trajectory: PathBuf,
    kind: FeatureKind,
    start_frame: usize,
) -> Result<FeatureSeries, Box<dyn std::error::Error>> {
    let mut system = System::from_file(structure)?;
    let mut features = featurize(&mut system, trajectory, start_frame, &[kind])?;

    Ok(features
        .shift_remove(&kind)
        .expect("FATAL ENSA ERROR | ensa::condition_features | Requested features missing."))
}

#[allow(clippy::too_many_arguments)]
fn run_compare(
    layout: &OutputLayout,
    structure_a: PathBuf,
    trajectory_a: PathBuf,
    structure_b: PathBuf,
    trajectory_b: PathBuf,
    kind: FeatureKind,
    method: CompareMethod,
    bin_width: f64,
    start_frame: usize,
    name: &str,
) -> RunResult {
    let first = condition_features(structure_a.clone(), trajectory_a, kind, start_frame)?;
    let second = condition_features(structure_b, trajectory_b, kind, start_frame)?;

    let (values, aggregation, metric) = match method {
        CompareMethod::RelativeEntropy => {
            let result = relative_entropy_analysis(&first, &second, bin_width)?;

            let header = vec![
                "feature".to_string(),
                "average".to_string(),
                "js_distance".to_string(),
                "kl_first_second".to_string(),
                "kl_second_first".to_string(),
            ];
            let rows: Vec<Vec<String>> = result
                .descriptors()
                .iter()
                .zip(result.averages())
                .zip(result.js_distances())
                .zip(result.kl_first_second())
                .zip(result.kl_second_first())
                .map(|((((descriptor, average), js), kl1), kl2)| {
                    vec![
                        descriptor.to_string(),
                        format!("{:.6}", average),
                        format!("{:.6}", js),
                        format!("{:.6}", kl1),
                        format!("{:.6}", kl2),
                    ]
                })
                .collect();

            write_csv(
                layout
                    .results_dir
                    .join(format!("{}_relative_entropy.csv", name)),
                &header,
                &rows,
            )?;

            (
                result.js_distances().clone(),
                ProfileAggregation::Max,
                "JS distance",
            )
        }
        CompareMethod::KolmogorovSmirnov => {
            let result = kolmogorov_smirnov_analysis(&first, &second)?;

            let header = vec![
                "feature".to_string(),
                "statistic".to_string(),
                "p_value".to_string(),
            ];
            let rows: Vec<Vec<String>> = result
                .descriptors()
                .iter()
                .zip(result.statistics())
                .zip(result.p_values())
                .map(|((descriptor, statistic), p)| {
                    vec![
                        descriptor.to_string(),
                        format!("{:.6}", statistic),
                        format!("{:.6}", p),
                    ]
                })
                .collect();

            write_csv(
                layout
                    .results_dir
                    .join(format!("{}_kolmogorov_smirnov.csv", name)),
                &header,
                &rows,
            )?;

            (
                result.p_values().clone(),
                ProfileAggregation::Min,
                "KS p-value",
            )
        }
        CompareMethod::MeanDifference => {
            let result = mean_difference_analysis(&first, &second)?;

            let header = vec![
                "feature".to_string(),
                "average".to_string(),
                "mean_first".to_string(),
                "mean_second".to_string(),
                "difference".to_string(),
            ];
            let rows: Vec<Vec<String>> = result
                .descriptors()
                .iter()
                .zip(result.averages())
                .zip(result.means_first())
                .zip(result.means_second())
                .zip(result.differences())
                .map(|((((descriptor, average), mean1), mean2), diff)| {
                    vec![
                        descriptor.to_string(),
                        format!("{:.6}", average),
                        format!("{:.6}", mean1),
                        format!("{:.6}", mean2),
                        format!("{:.6}", diff),
                    ]
                })
                .collect();

            write_csv(
                layout
                    .results_dir
                    .join(format!("{}_mean_difference.csv", name)),
                &header,
                &rows,
            )?;

            let absolute: Vec<f64> = result.differences().iter().map(|d| d.abs()).collect();
            (absolute, ProfileAggregation::Max, "mean difference")
        }
    };

    // report the most different features
    let sorted = sort_features(first.get_descriptors(), &values);
    println!("Most different features ({}):", metric);
    for (descriptor, value) in sorted.iter().take(10) {
        println!("  {:<16} {:.4}", descriptor.to_string(), value);
    }

    let profile = per_residue_profile(first.get_descriptors(), &values, aggregation);

    write_profile_xvg(
        &profile,
        &format!("Per-residue {}", metric),
        metric,
        layout.plots_dir.join(format!("{}_{}.xvg", name, kind)),
    )?;

    let system = System::from_file(structure_a)?;
    write_residue_pdb(
        &system,
        &profile,
        aggregation,
        layout.vis_dir.join(format!("{}_{}.pdb", name, kind)),
    )?;

    // mean residue-residue distance matrices of both conditions
    if kind == FeatureKind::CaDistances {
        write_distance_matrix(
            &first,
            layout.vis_dir.join(format!("{}_distances_a.csv", name)),
        )?;
        write_distance_matrix(
            &second,
            layout.vis_dir.join(format!("{}_distances_b.csv", name)),
        )?;
    }

    Ok(())
}

fn run_pca(
    layout: &OutputLayout,
    structure: PathBuf,
    trajectory: PathBuf,
    kind: FeatureKind,
    components: usize,
    start_frame: usize,
    name: &str,
) -> RunResult {
    let series = condition_features(structure.clone(), trajectory.clone(), kind, start_frame)?;

    let pca = Pca::compute(&series)?;
    let components = components.min(pca.component_count());

    // eigenvalue spectrum
    let points: Vec<(f64, f64)> = pca
        .eigenvalues()
        .iter()
        .enumerate()
        .map(|(i, &value)| ((i + 1) as f64, value))
        .collect();

    write_xvg(
        layout.pca_dir.join(format!("{}_eigenvalues.xvg", name)),
        "PCA eigenvalues",
        "component",
        "eigenvalue",
        &[XvgSeries::new("eigenvalues", points)],
    )?;

    let total: f64 = pca.eigenvalues().iter().sum();
    for component in 0..components {
        let fraction = pca.eigenvalues()[component] / total;
        println!(
            "Component {}: {:.2} % of total variance",
            component + 1,
            fraction * 100.0
        );
    }

    // trajectories sorted along each reported component
    let mut system = System::from_file(structure)?;
    for component in 0..components {
        let output = layout
            .pca_dir
            .join(format!("{}_sorted_pc{}.gro", name, component + 1));

        let sorted = sort_traj_along_pc(
            &mut system,
            &trajectory,
            &output,
            &pca,
            &series,
            component,
            start_frame,
        )?;

        let points: Vec<(f64, f64)> = sorted
            .iter()
            .enumerate()
            .map(|(i, &value)| (i as f64, value))
            .collect();

        write_xvg(
            layout
                .pca_dir
                .join(format!("{}_projection_pc{}.xvg", name, component + 1)),
            &format!("Projection onto component {}", component + 1),
            "frame (sorted)",
            "projection",
            &[XvgSeries::new("projection", points)],
        )?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_cluster(
    layout: &OutputLayout,
    structures: Vec<PathBuf>,
    trajectories: Vec<PathBuf>,
    names: &[String],
    kind: FeatureKind,
    k: usize,
    max_iter: usize,
    seed: u64,
    start_frame: usize,
) -> RunResult {
    if structures.len() != trajectories.len() || structures.len() != names.len() {
        return Err(format!(
            "provided {} structure files, {} trajectory files, and {} names",
            structures.len(),
            trajectories.len(),
            names.len()
        )
        .into());
    }

    let mut all_series = Vec::with_capacity(structures.len());
    for (structure, trajectory) in structures.iter().zip(trajectories.iter()) {
        all_series.push(condition_features(
            structure.clone(),
            trajectory.clone(),
            kind,
            start_frame,
        )?);
    }

    let references: Vec<&FeatureSeries> = all_series.iter().collect();
    let clusters = combined_clusters(&references, k, max_iter, seed)?;

    for (condition, name) in names.iter().enumerate() {
        print!("{:<16}", name);
        for cluster in 0..k {
            print!(" cluster {}: {:>6}", cluster, clusters.sizes()[condition][cluster]);
        }
        println!();
    }

    // write per-cluster trajectories of every condition
    for ((structure, trajectory), (name, labels)) in structures
        .iter()
        .zip(trajectories.iter())
        .zip(names.iter().zip(clusters.labels().iter()))
    {
        let mut system = System::from_file(structure)?;
        clustering::write_cluster_traj(
            &mut system,
            trajectory,
            &layout.clusters_dir,
            name,
            labels,
            k,
            start_frame,
        )?;
    }

    // cluster populations as a csv table
    let mut header = vec!["condition".to_string()];
    header.extend((0..k).map(|c| format!("cluster_{}", c)));

    let rows: Vec<Vec<String>> = names
        .iter()
        .enumerate()
        .map(|(condition, name)| {
            let mut row = vec![name.clone()];
            row.extend(
                clusters.sizes()[condition]
                    .iter()
                    .map(|size| size.to_string()),
            );
            row
        })
        .collect();

    write_csv(
        layout.results_dir.join("cluster_populations.csv"),
        &header,
        &rows,
    )?;

    Ok(())
}
