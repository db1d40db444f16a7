// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of coordinate extraction from simulation trajectories.

use std::path::Path;

use crate::errors::ExtractError;
use crate::io::traj_io::GroTrajWriter;
use crate::progress::ProgressPrinter;
use crate::selections::ranges::load_selection;
use crate::system::general::System;

/// Name of the working group used during extraction.
const EXTRACTION_GROUP: &str = "ExtractedSelection";

/// Extract the atoms matching a selection from a structure and its trajectories.
///
/// The selection is built from a base selection string and a residue ranges
/// file. The extracted structure is written as a gro file and the extracted
/// frames of all listed trajectories, in order, as a single multi-frame gro
/// file. The first `start_frame` frames of every trajectory are skipped.
///
/// ## Returns
/// The number of extracted atoms. `ExtractError` if the selection matches no
/// atoms or an io operation fails.
pub fn extract_coordinates(
    structure: impl AsRef<Path>,
    trajectories: &[impl AsRef<Path>],
    ranges_file: impl AsRef<Path>,
    base_selection: &str,
    output_structure: impl AsRef<Path>,
    output_trajectory: impl AsRef<Path>,
    start_frame: usize,
) -> Result<usize, ExtractError> {
    let selection = load_selection(ranges_file, base_selection)?;

    let mut system = System::from_file(structure)?;
    system.group_create(EXTRACTION_GROUP, &selection)?;

    let n_atoms = system
        .group_get_n_atoms(EXTRACTION_GROUP)
        .expect("FATAL ENSA ERROR | extraction::extract_coordinates | Group disappeared.");

    if n_atoms == 0 {
        return Err(ExtractError::EmptySelection(selection));
    }

    system.group_write_gro(EXTRACTION_GROUP, output_structure, false)?;

    let mut writer = GroTrajWriter::new(&system, EXTRACTION_GROUP, output_trajectory, false)
        .map_err(ExtractError::CouldNotWriteTraj)?;

    for trajectory in trajectories {
        write_selected_frames(&mut system, trajectory, &mut writer, start_frame)?;
    }

    Ok(n_atoms)
}

/// Extract per-condition selections into a single concatenated trajectory.
///
/// Each condition is described by a structure file, a trajectory file, and a
/// base selection string combined with the shared residue ranges file. The
/// selections of all conditions must match in the number of selected atoms,
/// otherwise the concatenated frames could not be compared feature by
/// feature. The topology of the first condition is written as the output
/// structure and the selected frames of every condition, in order, are
/// appended to one output trajectory.
///
/// ## Returns
/// The number of extracted atoms, common to all conditions.
#[allow(clippy::too_many_arguments)]
pub fn extract_combined(
    structures: &[impl AsRef<Path>],
    trajectories: &[impl AsRef<Path>],
    ranges_file: impl AsRef<Path>,
    base_selections: &[impl AsRef<str>],
    output_structure: impl AsRef<Path>,
    output_trajectory: impl AsRef<Path>,
    start_frame: usize,
) -> Result<usize, ExtractError> {
    if structures.len() != trajectories.len() {
        return Err(ExtractError::InputLengthMismatch(
            structures.len(),
            trajectories.len(),
        ));
    }

    if structures.len() != base_selections.len() {
        return Err(ExtractError::InputLengthMismatch(
            structures.len(),
            base_selections.len(),
        ));
    }

    let mut common_atoms = None;
    let mut writer = None;

    for ((structure, trajectory), base_selection) in structures
        .iter()
        .zip(trajectories.iter())
        .zip(base_selections.iter())
    {
        let selection = load_selection(&ranges_file, base_selection.as_ref())?;

        let mut system = System::from_file(structure)?;
        system.group_create(EXTRACTION_GROUP, &selection)?;

        let n_atoms = system
            .group_get_n_atoms(EXTRACTION_GROUP)
            .expect("FATAL ENSA ERROR | extraction::extract_combined | Group disappeared.");

        if n_atoms == 0 {
            return Err(ExtractError::EmptySelection(selection));
        }

        match common_atoms {
            None => {
                // the first condition provides the shared topology
                system.group_write_gro(EXTRACTION_GROUP, &output_structure, false)?;
                writer = Some(
                    GroTrajWriter::new(&system, EXTRACTION_GROUP, &output_trajectory, false)
                        .map_err(ExtractError::CouldNotWriteTraj)?,
                );
                common_atoms = Some(n_atoms);
            }
            Some(expected) if expected != n_atoms => {
                return Err(ExtractError::AtomCountMismatch(expected, n_atoms));
            }
            Some(_) => (),
        }

        let writer = writer
            .as_mut()
            .expect("FATAL ENSA ERROR | extraction::extract_combined | Writer disappeared.");

        write_selected_frames(&mut system, trajectory, writer, start_frame)?;
    }

    Ok(common_atoms.unwrap_or(0))
}

/// Append the frames of a trajectory, skipping the first `start_frame`.
fn write_selected_frames(
    system: &mut System,
    trajectory: impl AsRef<Path>,
    writer: &mut GroTrajWriter,
    start_frame: usize,
) -> Result<(), ExtractError> {
    let reader = system
        .gro_traj_iter(trajectory)?
        .print_progress(ProgressPrinter::new());

    for (index, frame) in reader.enumerate() {
        let frame = frame?;
        if index < start_frame {
            continue;
        }

        writer
            .write_frame(frame)
            .map_err(ExtractError::CouldNotWriteTraj)?;
    }

    Ok(())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
