// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of functions for reading and writing pdb files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::{ParsePdbError, WritePdbError};
use crate::structures::{atom::Atom, simbox::SimBox};
use crate::system::general::System;

/// ## Methods for writing pdb files.
impl System {
    /// Write all atoms of the `System` into a pdb file with the given name.
    ///
    /// ## Returns
    /// `Ok` if writing has been successful. Otherwise `WritePdbError`.
    ///
    /// ## Notes
    /// - Coordinates are converted from nanometers to angstroms.
    /// - B-factors of the atoms are written into the B-factor column.
    pub fn write_pdb(&self, filename: impl AsRef<Path>) -> Result<(), WritePdbError> {
        match self.group_write_pdb("all", filename) {
            Ok(_) => Ok(()),
            Err(WritePdbError::GroupNotFound(_)) => {
                panic!("FATAL ENSA ERROR | System::write_pdb | Default group 'all' does not exist.")
            }
            Err(e) => Err(e),
        }
    }

    /// Write atoms of the specified group into a pdb file with the given name.
    ///
    /// ## Returns
    /// `Ok` if writing has been successful. Otherwise `WritePdbError`.
    pub fn group_write_pdb(
        &self,
        group_name: &str,
        filename: impl AsRef<Path>,
    ) -> Result<(), WritePdbError> {
        if !self.group_exists(group_name) {
            return Err(WritePdbError::GroupNotFound(group_name.to_string()));
        }

        let output = File::create(&filename)
            .map_err(|_| WritePdbError::CouldNotCreate(Box::from(filename.as_ref())))?;

        let mut writer = BufWriter::new(output);

        let title = match group_name {
            "all" => self.get_name().to_owned(),
            _ => format!("Group `{}` from {}", group_name, self.get_name()),
        };

        write_header(&mut writer, &title, self.get_box_as_ref())?;

        for atom in self
            .group_iter(group_name)
            .expect("FATAL ENSA ERROR | pdb_io::group_write_pdb | Group should exist but it does not.")
        {
            atom.write_pdb(&mut writer)?;
        }

        writeln!(writer, "TER").map_err(|_| WritePdbError::CouldNotWrite)?;
        writeln!(writer, "END").map_err(|_| WritePdbError::CouldNotWrite)?;

        writer.flush().map_err(|_| WritePdbError::CouldNotWrite)?;

        Ok(())
    }
}

/// Write a header for a pdb file.
fn write_header(
    writer: &mut impl Write,
    title: &str,
    simbox: Option<&SimBox>,
) -> Result<(), WritePdbError> {
    writeln!(writer, "TITLE     {}", title).map_err(|_| WritePdbError::CouldNotWrite)?;

    if let Some(sbox) = simbox {
        writeln!(
            writer,
            "CRYST1{:>9.3}{:>9.3}{:>9.3}{:>7.2}{:>7.2}{:>7.2} P 1           1",
            sbox.x * 10.0,
            sbox.y * 10.0,
            sbox.z * 10.0,
            90.0,
            90.0,
            90.0
        )
        .map_err(|_| WritePdbError::CouldNotWrite)?;
    }

    Ok(())
}

/// Read a pdb file and construct a System structure.
///
/// ## Notes
/// - Parses lines starting with ATOM, HETATM, TITLE, CRYST1, ENDMDL, and END.
/// Reading stops at the first ENDMDL or END, so only the first model of a
/// multi-model file is read.
/// - Coordinates are converted from angstroms to nanometers.
/// - A value in the B-factor column is stored as the atom's B-factor.
pub fn read_pdb(filename: impl AsRef<Path>) -> Result<System, ParsePdbError> {
    let file = match File::open(filename.as_ref()) {
        Ok(x) => x,
        Err(_) => return Err(ParsePdbError::FileNotFound(Box::from(filename.as_ref()))),
    };

    let buffer = BufReader::new(file);

    let mut title = "Unknown".to_string();
    let mut simulation_box = None;
    let mut atoms: Vec<Atom> = Vec::new();

    for raw_line in buffer.lines() {
        let line = match raw_line {
            Ok(x) => x,
            Err(_) => return Err(ParsePdbError::FileNotFound(Box::from(filename.as_ref()))),
        };

        if line.starts_with("ATOM") || line.starts_with("HETATM") {
            atoms.push(line_as_atom(&line)?);
        } else if line.starts_with("TITLE") {
            title = line[5..].trim().to_string();
        } else if line.starts_with("CRYST1") {
            let sbox = line_as_box(&line)?;
            if !sbox.is_zero() {
                simulation_box = Some(sbox);
            }
        } else if line.starts_with("ENDMDL") || line.starts_with("END") {
            break;
        }
    }

    if atoms.is_empty() {
        return Err(ParsePdbError::NoAtoms(Box::from(filename.as_ref())));
    }

    Ok(System::new(&title, atoms, simulation_box))
}

/// Parse a single ATOM or HETATM line.
fn line_as_atom(line: &str) -> Result<Atom, ParsePdbError> {
    if line.len() < 54 {
        return Err(ParsePdbError::ParseAtomLineErr(line.to_string()));
    }

    // parse atom number
    let atomid = line[6..11]
        .trim()
        .parse::<usize>()
        .map_err(|_| ParsePdbError::ParseAtomLineErr(line.to_string()))?;

    // parse atom name
    let atomname = line[12..16].trim().to_string();
    if atomname.is_empty() {
        return Err(ParsePdbError::ParseAtomLineErr(line.to_string()));
    }

    // parse residue name
    let resname = line[17..21].trim().to_string();
    if resname.is_empty() {
        return Err(ParsePdbError::ParseAtomLineErr(line.to_string()));
    }

    // parse chain identifier
    let chain = line.chars().nth(21).filter(|c| !c.is_whitespace());

    // parse residue number
    let resid = line[22..26]
        .trim()
        .parse::<usize>()
        .map_err(|_| ParsePdbError::ParseAtomLineErr(line.to_string()))?;

    // parse position, converting from angstroms to nanometers
    let mut position = [0.0; 3];
    for (i, item) in position.iter_mut().enumerate() {
        let curr = 30 + i * 8;
        *item = line[curr..curr + 8]
            .trim()
            .parse::<f32>()
            .map_err(|_| ParsePdbError::ParseAtomLineErr(line.to_string()))?
            / 10.0;
    }

    let mut atom = Atom::new(resid, &resname, atomid, &atomname, position.into());

    if let Some(chain) = chain {
        atom.set_chain(chain);
    }

    // parse B-factor, if present
    if line.len() >= 66 {
        if let Ok(beta) = line[60..66].trim().parse::<f32>() {
            atom.set_beta(beta);
        }
    }

    Ok(atom)
}

/// Parse a CRYST1 line, converting from angstroms to nanometers.
/// Only orthogonal boxes (all angles 90 degrees) are supported.
fn line_as_box(line: &str) -> Result<SimBox, ParsePdbError> {
    if line.len() < 54 {
        return Err(ParsePdbError::ParseBoxLineErr(line.to_string()));
    }

    let mut lengths = [0.0f32; 3];
    for (i, item) in lengths.iter_mut().enumerate() {
        let curr = 6 + i * 9;
        *item = line[curr..curr + 9]
            .trim()
            .parse::<f32>()
            .map_err(|_| ParsePdbError::ParseBoxLineErr(line.to_string()))?
            / 10.0;
    }

    for i in 0..3 {
        let curr = 33 + i * 7;
        let angle = line[curr..curr + 7]
            .trim()
            .parse::<f32>()
            .map_err(|_| ParsePdbError::ParseBoxLineErr(line.to_string()))?;

        if angle != 90.0 {
            return Err(ParsePdbError::ParseBoxLineErr(line.to_string()));
        }
    }

    Ok(lengths.into())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
