// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of functions for reading and writing gro files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::{ParseGroError, WriteGroError};
use crate::structures::{atom::Atom, simbox::SimBox};
use crate::system::general::System;

/// ## Methods for writing gro files.
impl System {
    /// Write all atoms of the `System` into a gro file with the given name.
    ///
    /// ## Returns
    /// `Ok` if writing has been successful. Otherwise `WriteGroError`.
    ///
    /// ## Notes
    /// - Velocities are written only if `write_velocities == true`.
    /// - An undefined simulation box is written as a sequence of zeros.
    pub fn write_gro(
        &self,
        filename: impl AsRef<Path>,
        write_velocities: bool,
    ) -> Result<(), WriteGroError> {
        match self.group_write_gro("all", filename, write_velocities) {
            Ok(_) => Ok(()),
            Err(WriteGroError::GroupNotFound(_)) => {
                panic!("FATAL ENSA ERROR | System::write_gro | Default group 'all' does not exist.")
            }
            Err(e) => Err(e),
        }
    }

    /// Write atoms of the specified group into a gro file with the given name.
    ///
    /// ## Returns
    /// `Ok` if writing has been successful. Otherwise `WriteGroError`.
    ///
    /// ## Example
    /// ```no_run
    /// use ensa_rs::prelude::*;
    ///
    /// let mut system = System::from_file("structure.gro").unwrap();
    /// system.group_create("Backbone", "name N CA C").unwrap();
    /// system.group_write_gro("Backbone", "backbone.gro", false).unwrap();
    /// ```
    pub fn group_write_gro(
        &self,
        group_name: &str,
        filename: impl AsRef<Path>,
        write_velocities: bool,
    ) -> Result<(), WriteGroError> {
        if !self.group_exists(group_name) {
            return Err(WriteGroError::GroupNotFound(group_name.to_string()));
        }

        let output = File::create(&filename)
            .map_err(|_| WriteGroError::CouldNotCreate(Box::from(filename.as_ref())))?;

        let mut writer = BufWriter::new(output);

        let title = match group_name {
            "all" => self.get_name().to_owned(),
            _ => format!("Group `{}` from {}", group_name, self.get_name()),
        };

        write_frame(&mut writer, self, group_name, &title, write_velocities)?;

        writer.flush().map_err(|_| WriteGroError::CouldNotWrite)?;

        Ok(())
    }
}

/// Write a single gro frame (header, atoms of the group, box) into an open stream.
pub(crate) fn write_frame(
    writer: &mut impl Write,
    system: &System,
    group_name: &str,
    title: &str,
    write_velocities: bool,
) -> Result<(), WriteGroError> {
    let n_atoms = system
        .group_get_n_atoms(group_name)
        .map_err(|_| WriteGroError::GroupNotFound(group_name.to_string()))?;

    writeln!(writer, "{}", title).map_err(|_| WriteGroError::CouldNotWrite)?;
    writeln!(writer, "{:>5}", n_atoms).map_err(|_| WriteGroError::CouldNotWrite)?;

    for atom in system
        .group_iter(group_name)
        .expect("FATAL ENSA ERROR | gro_io::write_frame | Group should exist but it does not.")
    {
        atom.write_gro(writer, write_velocities)?;
    }

    write_box(writer, system.get_box_as_ref())?;

    Ok(())
}

/// Write box dimensions into an open gro file.
fn write_box(writer: &mut impl Write, simbox: Option<&SimBox>) -> Result<(), WriteGroError> {
    match simbox {
        Some(sbox) => writeln!(writer, " {:9.5} {:9.5} {:9.5}", sbox.x, sbox.y, sbox.z)
            .map_err(|_| WriteGroError::CouldNotWrite)?,
        None => {
            let x = 0.0;
            writeln!(writer, " {x:9.5} {x:9.5} {x:9.5}")
                .map_err(|_| WriteGroError::CouldNotWrite)?
        }
    }

    Ok(())
}

/// Read a gro file and construct a System structure.
///
/// ## Notes
/// - A zero simulation box is treated as an undefined box.
pub fn read_gro(filename: impl AsRef<Path>) -> Result<System, ParseGroError> {
    let file = match File::open(filename.as_ref()) {
        Ok(x) => x,
        Err(_) => return Err(ParseGroError::FileNotFound(Box::from(filename.as_ref()))),
    };

    let mut buffer = BufReader::new(file);

    // get title and number of atoms
    let title = get_title(&mut buffer, filename.as_ref())?;
    let n_atoms = get_natoms(&mut buffer, filename.as_ref())?;
    let mut simulation_box = None;

    let mut atoms: Vec<Atom> = Vec::with_capacity(n_atoms);

    // parse all remaining lines
    for (index, raw_line) in buffer.lines().enumerate() {
        let line = match raw_line {
            Ok(x) => x,
            Err(_) => return Err(ParseGroError::LineNotFound(Box::from(filename.as_ref()))),
        };

        if index == n_atoms {
            let sbox = line_as_box(&line)?;
            if !sbox.is_zero() {
                simulation_box = Some(sbox);
            }
        } else if index < n_atoms {
            atoms.push(line_as_atom(&line)?);
        }
    }

    if atoms.len() != n_atoms {
        return Err(ParseGroError::LineNotFound(Box::from(filename.as_ref())));
    }

    Ok(System::new(&title, atoms, simulation_box))
}

/// Read the next line in the provided buffer and parse it as a title.
fn get_title(
    buffer: &mut BufReader<File>,
    filename: impl AsRef<Path>,
) -> Result<String, ParseGroError> {
    let mut title = String::new();
    match buffer.read_line(&mut title) {
        Ok(0) | Err(_) => Err(ParseGroError::LineNotFound(Box::from(filename.as_ref()))),
        Ok(_) => Ok(title.trim().to_string()),
    }
}

/// Read the next line in the provided buffer and parse it as the number of atoms.
fn get_natoms(
    buffer: &mut BufReader<File>,
    filename: impl AsRef<Path>,
) -> Result<usize, ParseGroError> {
    let mut line = String::new();
    match buffer.read_line(&mut line) {
        Ok(0) | Err(_) => Err(ParseGroError::LineNotFound(Box::from(filename.as_ref()))),
        Ok(_) => match line.trim().parse::<usize>() {
            Ok(x) => Ok(x),
            Err(_) => Err(ParseGroError::ParseLineErr(line.trim().to_string())),
        },
    }
}

/// Parse a line of a gro file as an atom.
pub(crate) fn line_as_atom(line: &str) -> Result<Atom, ParseGroError> {
    if line.len() < 44 {
        return Err(ParseGroError::ParseAtomLineErr(line.to_string()));
    }

    // parse residue number
    let resid = line[0..5]
        .trim()
        .parse::<usize>()
        .map_err(|_| ParseGroError::ParseAtomLineErr(line.to_string()))?;

    // parse residue name
    let resname = line[5..10].trim().to_string();
    if resname.is_empty() {
        return Err(ParseGroError::ParseAtomLineErr(line.to_string()));
    }

    // parse atom name
    let atomname = line[10..15].trim().to_string();
    if atomname.is_empty() {
        return Err(ParseGroError::ParseAtomLineErr(line.to_string()));
    }

    // parse atom number
    let atomid = line[15..20]
        .trim()
        .parse::<usize>()
        .map_err(|_| ParseGroError::ParseAtomLineErr(line.to_string()))?;

    // parse position
    let mut position = [0.0; 3];
    for (i, item) in position.iter_mut().enumerate() {
        let curr = 20 + i * 8;
        *item = line[curr..curr + 8]
            .trim()
            .parse::<f32>()
            .map_err(|_| ParseGroError::ParseAtomLineErr(line.to_string()))?;
    }

    let atom = Atom::new(resid, &resname, atomid, &atomname, position.into());

    // parse velocity, if present
    if line.trim_end().len() >= 68 {
        let mut velocity = [0.0; 3];

        for (i, item) in velocity.iter_mut().enumerate() {
            let curr = 44 + i * 8;
            *item = line[curr..curr + 8]
                .trim()
                .parse::<f32>()
                .map_err(|_| ParseGroError::ParseAtomLineErr(line.to_string()))?;
        }

        Ok(atom.with_velocity(velocity.into()))
    } else {
        Ok(atom)
    }
}

/// Parse a line of a gro file as simulation box dimensions.
pub(crate) fn line_as_box(line: &str) -> Result<SimBox, ParseGroError> {
    let mut dimensions = [0.0f32; 9];
    let mut i = 0usize;

    for split in line.split_whitespace() {
        if i >= 9 {
            return Err(ParseGroError::ParseBoxLineErr(line.to_string()));
        }

        dimensions[i] = split
            .parse::<f32>()
            .map_err(|_| ParseGroError::ParseBoxLineErr(line.to_string()))?;
        i += 1;
    }

    if i != 3 && i != 9 {
        return Err(ParseGroError::ParseBoxLineErr(line.to_string()));
    }

    // only orthogonal boxes are supported
    if dimensions[3..].iter().any(|&x| x != 0.0) {
        return Err(ParseGroError::UnsupportedBox(line.to_string()));
    }

    Ok([dimensions[0], dimensions[1], dimensions[2]].into())
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests_read {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn read() {
        let system = read_gro("test_files/example.gro").unwrap();

        assert_eq!(system.get_name(), "Heptapeptide backbone");
        assert_eq!(system.get_n_atoms(), 28);

        let simbox = system.get_box_as_ref().unwrap();
        assert_approx_eq!(f32, simbox.x, 10.0);
        assert_approx_eq!(f32, simbox.y, 10.0);
        assert_approx_eq!(f32, simbox.z, 10.0);

        let atoms = system.get_atoms_as_ref();

        let first = &atoms[0];
        assert_eq!(first.get_residue_number(), 1);
        assert_eq!(first.get_residue_name(), "ALA");
        assert_eq!(first.get_atom_name(), "N");
        assert_eq!(first.get_atom_number(), 1);
        assert_approx_eq!(f32, first.get_position().x, 1.0);
        assert_approx_eq!(f32, first.get_position().y, 2.0);
        assert_approx_eq!(f32, first.get_position().z, 2.0);

        let last = &atoms[27];
        assert_eq!(last.get_residue_number(), 7);
        assert_eq!(last.get_residue_name(), "GLY");
        assert_eq!(last.get_atom_name(), "O");
        assert_eq!(last.get_atom_number(), 28);
    }

    #[test]
    fn read_no_velocities() {
        let system = read_gro("test_files/example.gro").unwrap();

        for atom in system.atoms_iter() {
            assert!(!atom.has_velocity());
        }
    }

    #[test]
    fn read_nonexistent() {
        assert!(matches!(
            read_gro("test_files/nonexistent.gro"),
            Err(ParseGroError::FileNotFound(_))
        ));
    }

    #[test]
    fn atom_line() {
        let atom = line_as_atom("   43GLY     CA  123   1.500   2.500   3.500").unwrap();

        assert_eq!(atom.get_residue_number(), 43);
        assert_eq!(atom.get_residue_name(), "GLY");
        assert_eq!(atom.get_atom_name(), "CA");
        assert_eq!(atom.get_atom_number(), 123);
        assert!(!atom.has_velocity());
    }

    #[test]
    fn atom_line_velocities() {
        let atom = line_as_atom(
            "   43GLY     CA  123   1.500   2.500   3.500  0.1000 -0.2000  0.3000",
        )
        .unwrap();

        assert!(atom.has_velocity());
        assert_approx_eq!(f32, atom.get_velocity().unwrap().x, 0.1);
        assert_approx_eq!(f32, atom.get_velocity().unwrap().y, -0.2);
        assert_approx_eq!(f32, atom.get_velocity().unwrap().z, 0.3);
    }

    #[test]
    fn invalid_atom_line() {
        assert!(matches!(
            line_as_atom("   43GLY     CA  123   1.500   2.500"),
            Err(ParseGroError::ParseAtomLineErr(_))
        ));
        assert!(matches!(
            line_as_atom("   4xGLY     CA  123   1.500   2.500   3.500"),
            Err(ParseGroError::ParseAtomLineErr(_))
        ));
    }

    #[test]
    fn box_line() {
        let sbox = line_as_box("   10.00000   11.00000   12.00000").unwrap();
        assert_approx_eq!(f32, sbox.x, 10.0);
        assert_approx_eq!(f32, sbox.y, 11.0);
        assert_approx_eq!(f32, sbox.z, 12.0);
    }

    #[test]
    fn invalid_box_line() {
        assert!(matches!(
            line_as_box("   10.00000   11.00000"),
            Err(ParseGroError::ParseBoxLineErr(_))
        ));
        assert!(matches!(
            line_as_box("10.0 10.0 10.0 0.0 0.0 5.0 0.0 0.0 0.0"),
            Err(ParseGroError::UnsupportedBox(_))
        ));
    }
}
