// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of iteration over frames of multi-frame gro trajectories.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use regex::Regex;

use crate::errors::{ReadTrajError, WriteTrajError};
use crate::io::gro_io;
use crate::progress::{ProgressPrinter, ProgressStatus};
use crate::structures::simbox::SimBox;
use crate::structures::vector3d::Vector3D;
use crate::system::general::System;

/**************************/
/*     READING FRAMES     */
/**************************/

/// Data of a single trajectory frame.
#[derive(Debug)]
struct GroFrameData {
    step: Option<u64>,
    time: Option<f32>,
    simbox: Option<SimBox>,
    positions: Vec<Vector3D>,
    velocities: Vec<Option<Vector3D>>,
}

impl GroFrameData {
    /// Read data of a single frame from an open gro trajectory.
    ///
    /// ## Returns
    /// - `None` if the file has been read completely.
    /// - `Some(GroFrameData)` if the frame has been successfully read.
    /// - `Some(ReadTrajError)` if the frame could not be read.
    fn from_frame(
        buffer: &mut BufReader<File>,
        title_pattern: &Regex,
        n_atoms: usize,
    ) -> Option<Result<GroFrameData, ReadTrajError>> {
        let mut title = String::new();
        match buffer.read_line(&mut title) {
            // file is completely read
            Ok(0) => return None,
            Ok(_) => (),
            Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
        }

        // extract time and step from the frame title, if present
        let (time, step) = match title_pattern.captures(&title) {
            Some(caps) => (
                caps.get(1).and_then(|x| x.as_str().parse::<f32>().ok()),
                caps.get(2).and_then(|x| x.as_str().parse::<u64>().ok()),
            ),
            None => (None, None),
        };

        let mut natoms_line = String::new();
        if buffer.read_line(&mut natoms_line).is_err() {
            return Some(Err(ReadTrajError::FrameNotFound));
        }

        let frame_atoms = match natoms_line.trim().parse::<usize>() {
            Ok(x) => x,
            Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
        };

        if frame_atoms != n_atoms {
            return Some(Err(ReadTrajError::AtomsNumberMismatch(frame_atoms, n_atoms)));
        }

        let mut positions = Vec::with_capacity(n_atoms);
        let mut velocities = Vec::with_capacity(n_atoms);

        for _ in 0..n_atoms {
            let mut line = String::new();
            match buffer.read_line(&mut line) {
                Ok(0) | Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
                Ok(_) => (),
            }

            let atom = match gro_io::line_as_atom(line.trim_end()) {
                Ok(x) => x,
                Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
            };

            positions.push(*atom.get_position());
            velocities.push(atom.get_velocity().copied());
        }

        let mut box_line = String::new();
        match buffer.read_line(&mut box_line) {
            Ok(0) | Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
            Ok(_) => (),
        }

        let simbox = match gro_io::line_as_box(box_line.trim_end()) {
            Ok(x) if x.is_zero() => None,
            Ok(x) => Some(x),
            Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
        };

        Some(Ok(GroFrameData {
            step,
            time,
            simbox,
            positions,
            velocities,
        }))
    }

    /// Update the `System` structure based on data from `GroFrameData`.
    fn update_system(self, system: &mut System) {
        for (atom, (position, velocity)) in system
            .atoms_iter_mut()
            .zip(self.positions.into_iter().zip(self.velocities))
        {
            atom.set_position(position);
            match velocity {
                Some(v) => atom.set_velocity(v),
                None => atom.reset_velocity(),
            }
        }

        if let Some(step) = self.step {
            system.set_simulation_step(step);
        }

        if let Some(time) = self.time {
            system.set_simulation_time(time);
        }

        system.set_box(self.simbox);
    }
}

/// Iterator over the frames of a multi-frame gro file.
///
/// Each iteration reads the next frame into the `System` structure and yields
/// a mutable reference to the system.
pub struct GroTrajReader<'a> {
    system: *mut System,
    buffer: BufReader<File>,
    title_pattern: Regex,
    progress: Option<ProgressPrinter>,
    frame_number: usize,
    phantom: PhantomData<&'a mut System>,
}

impl<'a> GroTrajReader<'a> {
    /// Create an iterator over a multi-frame gro file.
    ///
    /// ## Returns
    /// `GroTrajReader` if the file exists. Otherwise `ReadTrajError`.
    ///
    /// ## Notes
    /// - The number of atoms in each frame must match the number of atoms
    /// in the system, otherwise iteration fails with `AtomsNumberMismatch`.
    /// - Time and simulation step are extracted from frame titles of the
    /// form `... t= TIME step= STEP`. Frames with other titles keep the
    /// previous time and step of the system.
    pub fn new(
        system: &'a mut System,
        filename: impl AsRef<Path>,
    ) -> Result<GroTrajReader<'a>, ReadTrajError> {
        let file = match File::open(filename.as_ref()) {
            Ok(x) => x,
            Err(_) => return Err(ReadTrajError::FileNotFound(Box::from(filename.as_ref()))),
        };

        let title_pattern = Regex::new(r"t=\s*([\d\.\-]+)\s+step=\s*(\d+)")
            .expect("FATAL ENSA ERROR | GroTrajReader::new | Could not construct titles regex.");

        Ok(GroTrajReader {
            system: system as *mut System,
            buffer: BufReader::new(file),
            title_pattern,
            progress: None,
            frame_number: 0,
            phantom: PhantomData,
        })
    }

    /// Report the progress of the iteration using the provided `ProgressPrinter`.
    pub fn print_progress(mut self, printer: ProgressPrinter) -> Self {
        self.progress = Some(printer);
        self
    }
}

impl<'a> Iterator for GroTrajReader<'a> {
    type Item = Result<&'a mut System, ReadTrajError>;

    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            let system = self
                .system
                .as_mut()
                .expect("FATAL ENSA ERROR | GroTrajReader::next | System is NULL.");

            let result = match GroFrameData::from_frame(
                &mut self.buffer,
                &self.title_pattern,
                system.get_n_atoms(),
            ) {
                None => None,
                Some(Err(e)) => Some(Err(e)),
                Some(Ok(data)) => {
                    data.update_system(system);
                    Some(Ok(&mut *self.system))
                }
            };

            if let Some(printer) = self.progress.as_mut() {
                match &result {
                    Some(Ok(_)) => {
                        printer.set_status(ProgressStatus::Running);
                        printer.print(
                            self.frame_number,
                            system.get_simulation_step(),
                            system.get_simulation_time(),
                        );
                    }
                    Some(Err(_)) => {
                        printer.set_status(ProgressStatus::Failed);
                        printer.print(
                            self.frame_number,
                            system.get_simulation_step(),
                            system.get_simulation_time(),
                        );
                    }
                    None => {
                        printer.set_status(ProgressStatus::Completed);
                        printer.print(
                            self.frame_number,
                            system.get_simulation_step(),
                            system.get_simulation_time(),
                        );
                    }
                }
            }

            if matches!(result, Some(Ok(_))) {
                self.frame_number += 1;
            }

            result
        }
    }
}

/// ## Methods for iterating over trajectories.
impl System {
    /// Create an iterator over a multi-frame gro file.
    ///
    /// ## Example
    /// Calculating the average z-coordinate of the first atom.
    /// ```no_run
    /// use ensa_rs::prelude::*;
    ///
    /// fn example_fn() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    ///     let mut system = System::from_file("system.gro")?;
    ///
    ///     let mut sum = 0.0;
    ///     let mut frames = 0;
    ///     for frame in system.gro_traj_iter("trajectory.gro")? {
    ///         let frame = frame?;
    ///         sum += frame.get_atoms_as_ref()[0].get_position().z;
    ///         frames += 1;
    ///     }
    ///
    ///     println!("{}", sum / frames as f32);
    ///     Ok(())
    /// }
    /// ```
    pub fn gro_traj_iter(
        &mut self,
        filename: impl AsRef<Path>,
    ) -> Result<GroTrajReader, ReadTrajError> {
        GroTrajReader::new(self, filename)
    }
}

/**************************/
/*     WRITING FRAMES     */
/**************************/

/// Structure for writing frames of the system into a multi-frame gro file.
pub struct GroTrajWriter {
    writer: BufWriter<File>,
    group: String,
    write_velocities: bool,
}

impl GroTrajWriter {
    /// Open a new multi-frame gro file for writing, storing atoms of the specified group.
    ///
    /// ## Returns
    /// `GroTrajWriter` if the file could be created and the group exists.
    /// Otherwise `WriteTrajError`.
    pub fn new(
        system: &System,
        group_name: &str,
        filename: impl AsRef<Path>,
        write_velocities: bool,
    ) -> Result<GroTrajWriter, WriteTrajError> {
        if !system.group_exists(group_name) {
            return Err(WriteTrajError::GroupNotFound(group_name.to_string()));
        }

        let output = File::create(&filename)
            .map_err(|_| WriteTrajError::CouldNotCreate(Box::from(filename.as_ref())))?;

        Ok(GroTrajWriter {
            writer: BufWriter::new(output),
            group: group_name.to_string(),
            write_velocities,
        })
    }

    /// Write the current state of the system as a frame of the trajectory.
    ///
    /// The frame title carries the current simulation time and step so that
    /// the frame can be matched with the source trajectory when read back.
    pub fn write_frame(&mut self, system: &System) -> Result<(), WriteTrajError> {
        let title = format!(
            "{} t= {:.5} step= {}",
            system.get_name(),
            system.get_simulation_time(),
            system.get_simulation_step()
        );

        gro_io::write_frame(
            &mut self.writer,
            system,
            &self.group,
            &title,
            self.write_velocities,
        )
        .map_err(|_| WriteTrajError::CouldNotWrite)?;

        self.writer
            .flush()
            .map_err(|_| WriteTrajError::CouldNotWrite)?;

        Ok(())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn read_traj() {
        let mut system = System::from_file("test_files/example.gro").unwrap();

        let mut times = Vec::new();
        let mut steps = Vec::new();
        let mut first_atom_x = Vec::new();

        for frame in system.gro_traj_iter("test_files/example_traj.gro").unwrap() {
            let frame = frame.unwrap();
            times.push(frame.get_simulation_time());
            steps.push(frame.get_simulation_step());
            first_atom_x.push(frame.get_atoms_as_ref()[0].get_position().x);
        }

        assert_eq!(times.len(), 5);
        assert_eq!(steps, vec![0, 1000, 2000, 3000, 4000]);

        assert_approx_eq!(f32, times[0], 0.0);
        assert_approx_eq!(f32, times[4], 40.0);

        // coordinates must change between frames
        assert!(first_atom_x.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn read_traj_with_progress() {
        let mut system = System::from_file("test_files/example.gro").unwrap();

        let progress_file = NamedTempFile::new().unwrap();
        let printer = crate::progress::ProgressPrinter::new()
            .with_output(Box::from(progress_file.reopen().unwrap()))
            .with_colored(false)
            .with_print_freq(1);

        let reader = system
            .gro_traj_iter("test_files/example_traj.gro")
            .unwrap()
            .print_progress(printer);

        let mut n_frames = 0;
        for frame in reader {
            frame.unwrap();
            n_frames += 1;
        }
        assert_eq!(n_frames, 5);

        let content = std::fs::read_to_string(progress_file.path()).unwrap();
        assert_eq!(content.matches("RUNNING").count(), 5);
        assert_eq!(content.matches("COMPLETED").count(), 1);
    }

    #[test]
    fn read_traj_nonexistent() {
        let mut system = System::from_file("test_files/example.gro").unwrap();

        assert!(matches!(
            system.gro_traj_iter("test_files/nonexistent.gro"),
            Err(ReadTrajError::FileNotFound(_))
        ));
    }

    #[test]
    fn read_traj_atom_mismatch() {
        let mut system = System::from_file("test_files/example.gro").unwrap();
        system.group_create("partial", "resid 1 to 3").unwrap();
        let atoms = system.group_extract("partial").unwrap();
        let mut smaller = System::new("Partial system", atoms, system.get_box_as_ref().copied());

        let result = smaller
            .gro_traj_iter("test_files/example_traj.gro")
            .unwrap()
            .next()
            .unwrap();

        assert!(matches!(
            result,
            Err(ReadTrajError::AtomsNumberMismatch(28, 12))
        ));
    }

    #[test]
    fn write_traj() {
        let mut system = System::from_file("test_files/example.gro").unwrap();

        let output = NamedTempFile::new().unwrap();
        let mut writer = GroTrajWriter::new(&system, "all", output.path(), false).unwrap();

        for frame in system.gro_traj_iter("test_files/example_traj.gro").unwrap() {
            let frame = frame.unwrap();
            writer.write_frame(frame).unwrap();
        }

        // the rewritten trajectory must contain the same frames
        let mut original = System::from_file("test_files/example.gro").unwrap();
        let mut times = Vec::new();
        for frame in original.gro_traj_iter(output.path()).unwrap() {
            let frame = frame.unwrap();
            times.push(frame.get_simulation_time());
        }

        assert_eq!(times.len(), 5);
        assert_approx_eq!(f32, times[4], 40.0);
    }

    #[test]
    fn write_traj_group() {
        let mut system = System::from_file("test_files/example.gro").unwrap();
        system.group_create("calphas", "name CA").unwrap();

        let output = NamedTempFile::new().unwrap();
        let mut writer = GroTrajWriter::new(&system, "calphas", output.path(), false).unwrap();

        for frame in system.gro_traj_iter("test_files/example_traj.gro").unwrap() {
            let frame = frame.unwrap();
            writer.write_frame(frame).unwrap();
        }

        let mut full = System::from_file("test_files/example.gro").unwrap();
        full.group_create("calphas", "name CA").unwrap();
        let atoms = full.group_extract("calphas").unwrap();
        let mut subsystem = System::new("Calphas", atoms, full.get_box_as_ref().copied());

        let mut n_frames = 0;
        for frame in subsystem.gro_traj_iter(output.path()).unwrap() {
            frame.unwrap();
            n_frames += 1;
        }

        assert_eq!(n_frames, 5);
    }

    #[test]
    fn write_traj_invalid_group() {
        let system = System::from_file("test_files/example.gro").unwrap();

        assert!(matches!(
            GroTrajWriter::new(&system, "nonexistent", "will-not-be-created.gro", false),
            Err(WriteTrajError::GroupNotFound(_))
        ));
    }
}
