// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of the Atom structure and its methods.

use std::io::Write;

use crate::errors::{WriteGroError, WritePdbError};
use crate::structures::{simbox::SimBox, vector3d::Vector3D};

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    residue_number: usize,
    residue_name: String,
    atom_number: usize,
    atom_name: String,
    chain: Option<char>,
    position: Vector3D,
    velocity: Option<Vector3D>,
    /// Value written into the B-factor column of pdb files.
    /// Used to carry per-residue scalar annotations for visualization.
    beta: Option<f32>,
}

impl Atom {
    /// Create new Atom structure with the specified properties.
    ///
    /// ## Notes
    /// - By default, `Atom` is constructed with no chain, no velocity and no B-factor.
    /// These can be provided using `Atom::with_chain`, `Atom::with_velocity`,
    /// and `Atom::with_beta`, respectively.
    pub fn new(
        residue_number: usize,
        residue_name: &str,
        atom_number: usize,
        atom_name: &str,
        position: Vector3D,
    ) -> Self {
        Atom {
            residue_number,
            residue_name: residue_name.to_string(),
            atom_number,
            atom_name: atom_name.to_string(),
            chain: None,
            position,
            velocity: None,
            beta: None,
        }
    }

    /// Add chain information to target atom.
    pub fn with_chain(mut self, chain: char) -> Self {
        self.set_chain(chain);
        self
    }

    /// Add velocity information to target atom.
    pub fn with_velocity(mut self, velocity: Vector3D) -> Self {
        self.set_velocity(velocity);
        self
    }

    /// Add a B-factor value to target atom.
    pub fn with_beta(mut self, beta: f32) -> Self {
        self.set_beta(beta);
        self
    }

    /// Get the number of the residue to which the atom belongs.
    pub fn get_residue_number(&self) -> usize {
        self.residue_number
    }

    /// Set the number of the residue to which the atom belongs.
    pub fn set_residue_number(&mut self, resnum: usize) {
        self.residue_number = resnum;
    }

    /// Get the name of the residue to which the atom belongs.
    pub fn get_residue_name(&self) -> &str {
        &self.residue_name
    }

    /// Set the name of the residue to which the atom belongs.
    pub fn set_residue_name(&mut self, resname: &str) {
        self.residue_name = resname.to_string();
    }

    /// Get the number of the atom.
    pub fn get_atom_number(&self) -> usize {
        self.atom_number
    }

    /// Set the number of the atom.
    pub fn set_atom_number(&mut self, atomnum: usize) {
        self.atom_number = atomnum;
    }

    /// Get the name of the atom.
    pub fn get_atom_name(&self) -> &str {
        &self.atom_name
    }

    /// Set the name of the atom.
    pub fn set_atom_name(&mut self, atomname: &str) {
        self.atom_name = atomname.to_string();
    }

    /// Get the chain the atom belongs to.
    pub fn get_chain(&self) -> Option<char> {
        self.chain
    }

    /// Set the chain of the atom.
    pub fn set_chain(&mut self, chain: char) {
        self.chain = Some(chain);
    }

    /// Get the position of the atom.
    pub fn get_position(&self) -> &Vector3D {
        &self.position
    }

    /// Set the position of the atom.
    pub fn set_position(&mut self, pos: Vector3D) {
        self.position = pos;
    }

    /// Get the velocity of the atom.
    pub fn get_velocity(&self) -> Option<&Vector3D> {
        self.velocity.as_ref()
    }

    /// Set the velocity of the atom.
    pub fn set_velocity(&mut self, vel: Vector3D) {
        self.velocity = Some(vel);
    }

    /// Remove velocity information from the atom.
    pub fn reset_velocity(&mut self) {
        self.velocity = None;
    }

    /// Check whether the atom has velocity information.
    pub fn has_velocity(&self) -> bool {
        self.velocity.is_some()
    }

    /// Get the B-factor of the atom.
    pub fn get_beta(&self) -> Option<f32> {
        self.beta
    }

    /// Set the B-factor of the atom.
    pub fn set_beta(&mut self, beta: f32) {
        self.beta = Some(beta);
    }

    /// Calculate distance between two atoms applying the minimum image convention.
    pub fn distance(&self, atom: &Atom, sbox: &SimBox) -> f32 {
        self.position.distance(&atom.position, sbox)
    }

    /// Calculate distance between two atoms ignoring periodic boundary conditions.
    pub fn distance_naive(&self, atom: &Atom) -> f32 {
        self.position.distance_naive(&atom.position)
    }

    /// Write information about the atom in gro format.
    ///
    /// ## Notes
    /// - Velocities are written only if `write_velocities == true`.
    /// Atoms with no velocity information get zero velocities.
    /// - Atom and residue numbers are wrapped at 100,000.
    pub fn write_gro(
        &self,
        stream: &mut impl Write,
        write_velocities: bool,
    ) -> Result<(), WriteGroError> {
        let format_resname = match self.get_residue_name().len() {
            0..=5 => format!("{:<5}", self.get_residue_name()),
            _ => format!(
                "{:<5}",
                self.get_residue_name().chars().take(5).collect::<String>()
            ),
        };

        let format_atomname = match self.get_atom_name().len() {
            0..=5 => format!("{:>5}", self.get_atom_name()),
            _ => format!(
                "{:>5}",
                self.get_atom_name().chars().take(5).collect::<String>()
            ),
        };

        if write_velocities {
            let velocity = self.velocity.unwrap_or_default();

            writeln!(
                stream,
                "{:>5}{}{}{:>5}{:>8.3}{:>8.3}{:>8.3}{:>8.4}{:>8.4}{:>8.4}",
                self.get_residue_number() % 100_000,
                format_resname,
                format_atomname,
                self.get_atom_number() % 100_000,
                self.position.x,
                self.position.y,
                self.position.z,
                velocity.x,
                velocity.y,
                velocity.z
            )
            .map_err(|_| WriteGroError::CouldNotWrite)?;
        } else {
            writeln!(
                stream,
                "{:>5}{}{}{:>5}{:>8.3}{:>8.3}{:>8.3}",
                self.get_residue_number() % 100_000,
                format_resname,
                format_atomname,
                self.get_atom_number() % 100_000,
                self.position.x,
                self.position.y,
                self.position.z,
            )
            .map_err(|_| WriteGroError::CouldNotWrite)?;
        }

        Ok(())
    }

    /// Write information about the atom in pdb format.
    ///
    /// ## Notes
    /// - Coordinates are converted from nanometers to angstroms.
    /// - The B-factor column carries the atom's B-factor value, or 0 if unset.
    /// - Atom numbers are wrapped at 100,000 and residue numbers at 10,000.
    pub fn write_pdb(&self, stream: &mut impl Write) -> Result<(), WritePdbError> {
        let format_resname = match self.get_residue_name().len() {
            0..=3 => format!("{:>3} ", self.get_residue_name()),
            4 => format!("{:>4}", self.get_residue_name()),
            _ => format!(
                "{:>4}",
                self.get_residue_name().chars().take(4).collect::<String>()
            ),
        };

        let format_atomname = match self.get_atom_name().len() {
            0..=3 => format!(" {:<3}", self.get_atom_name()),
            4 => format!("{:<4}", self.get_atom_name()),
            _ => format!(
                "{:<4}",
                self.get_atom_name().chars().take(4).collect::<String>()
            ),
        };

        let format_chain = self.get_chain().unwrap_or(' ');

        writeln!(
            stream,
            "ATOM  {:>5} {} {}{}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}            ",
            self.get_atom_number() % 100_000,
            format_atomname,
            format_resname,
            format_chain,
            self.get_residue_number() % 10_000,
            self.position.x * 10.0,
            self.position.y * 10.0,
            self.position.z * 10.0,
            1.0,
            self.beta.unwrap_or(0.0),
        )
        .map_err(|_| WritePdbError::CouldNotWrite)?;

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

    fn make_atom() -> Atom {
        Atom::new(45, "GLY", 123, "CA", [1.5, 2.5, 3.5].into())
            .with_chain('A')
            .with_velocity([0.1, -0.2, 0.3].into())
    }

    #[test]
    fn construction() {
        let atom = make_atom();

        assert_eq!(atom.get_residue_number(), 45);
        assert_eq!(atom.get_residue_name(), "GLY");
        assert_eq!(atom.get_atom_number(), 123);
        assert_eq!(atom.get_atom_name(), "CA");
        assert_eq!(atom.get_chain(), Some('A'));
        assert!(atom.has_velocity());
        assert_eq!(atom.get_beta(), None);

        assert_approx_eq!(f32, atom.get_position().x, 1.5);
        assert_approx_eq!(f32, atom.get_position().y, 2.5);
        assert_approx_eq!(f32, atom.get_position().z, 3.5);
    }

    #[test]
    fn distance() {
        let sbox = SimBox::from([10.0, 10.0, 10.0]);

        let atom1 = Atom::new(1, "GLY", 1, "CA", [1.0, 1.0, 1.0].into());
        let atom2 = Atom::new(2, "ALA", 2, "CA", [1.0, 1.0, 9.5].into());

        assert_approx_eq!(f32, atom1.distance_naive(&atom2), 8.5);
        assert_approx_eq!(f32, atom1.distance(&atom2, &sbox), 1.5);
    }

    #[test]
    fn write_gro_line() {
        let atom = make_atom();

        let mut line: Vec<u8> = Vec::new();
        atom.write_gro(&mut line, false).unwrap();
        assert_eq!(
            String::from_utf8(line).unwrap(),
            "   45GLY     CA  123   1.500   2.500   3.500\n"
        );

        let mut line: Vec<u8> = Vec::new();
        atom.write_gro(&mut line, true).unwrap();
        assert_eq!(
            String::from_utf8(line).unwrap(),
            "   45GLY     CA  123   1.500   2.500   3.500  0.1000 -0.2000  0.3000\n"
        );
    }

    #[test]
    fn write_pdb_line() {
        let atom = make_atom().with_beta(0.75);

        let mut line: Vec<u8> = Vec::new();
        atom.write_pdb(&mut line).unwrap();
        assert_eq!(
            String::from_utf8(line).unwrap(),
            "ATOM    123  CA  GLY A  45      15.000  25.000  35.000  1.00  0.75            \n"
        );
    }
}
