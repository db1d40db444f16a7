// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of the `System` structure and methods for constructing it
//! and accessing its properties.

use indexmap::IndexMap;
use std::path::Path;

use crate::errors::ParseFileError;
use crate::files::FileType;
use crate::io::gro_io;
use crate::io::pdb_io;
use crate::structures::{atom::Atom, group::Group, simbox::SimBox};

#[derive(Debug, Clone)]
pub struct System {
    /// Name of the molecular system.
    name: String,
    /// Vector of atoms in the system.
    atoms: Vec<Atom>,
    /// Size of the simulation box, if defined.
    simulation_box: Option<SimBox>,
    /// Groups of atoms associated with the system.
    groups: IndexMap<String, Group>,
    /// Current simulation step.
    simulation_step: u64,
    /// Current simulation time in picoseconds.
    simulation_time: f32,
}

/// ## Methods for creating `System` structures and accessing their properties.
impl System {
    /// Create new System structure with a given name from the provided
    /// vector of atoms and simulation box.
    ///
    /// ## Notes
    /// - The returned `System` structure will contain two default groups
    /// "all" and "All", each consisting of all the atoms in the system.
    pub fn new(name: &str, atoms: Vec<Atom>, simulation_box: Option<SimBox>) -> Self {
        let all = Group::from_indices((0..atoms.len()).collect());

        let mut groups = IndexMap::new();
        groups.insert("all".to_string(), all.clone());
        groups.insert("All".to_string(), all);

        System {
            name: name.to_string(),
            atoms,
            simulation_box,
            groups,
            simulation_step: 0,
            simulation_time: 0.0,
        }
    }

    /// Create a new System from a gro or pdb file.
    /// The method of parsing is selected based on the file extension.
    ///
    /// ## Example
    /// ```no_run
    /// use ensa_rs::prelude::*;
    ///
    /// let system = System::from_file("structure.gro").unwrap();
    /// ```
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, ParseFileError> {
        match FileType::from_name(&filename) {
            FileType::GRO => Ok(gro_io::read_gro(filename)?),
            FileType::PDB => Ok(pdb_io::read_pdb(filename)?),
            _ => Err(ParseFileError::UnknownExtension(Box::from(
                filename.as_ref(),
            ))),
        }
    }

    /// Get the name of the molecular system.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Set the name of the molecular system.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of atoms in the system.
    pub fn get_n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Get immutable reference to the atoms of the system.
    pub fn get_atoms_as_ref(&self) -> &[Atom] {
        &self.atoms
    }

    /// Iterate over the atoms of the system.
    pub fn atoms_iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    /// Mutably iterate over the atoms of the system.
    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        self.atoms.iter_mut()
    }

    /// Get immutable reference to the simulation box, if defined.
    pub fn get_box_as_ref(&self) -> Option<&SimBox> {
        self.simulation_box.as_ref()
    }

    /// Set the simulation box.
    pub fn set_box(&mut self, simulation_box: Option<SimBox>) {
        self.simulation_box = simulation_box;
    }

    /// Get the current simulation step.
    pub fn get_simulation_step(&self) -> u64 {
        self.simulation_step
    }

    /// Set the current simulation step.
    pub fn set_simulation_step(&mut self, step: u64) {
        self.simulation_step = step;
    }

    /// Get the current simulation time in picoseconds.
    pub fn get_simulation_time(&self) -> f32 {
        self.simulation_time
    }

    /// Set the current simulation time in picoseconds.
    pub fn set_simulation_time(&mut self, time: f32) {
        self.simulation_time = time;
    }

    /// Get immutable reference to the groups of the system.
    pub(crate) fn get_groups_as_ref(&self) -> &IndexMap<String, Group> {
        &self.groups
    }

    /// Get mutable reference to the groups of the system.
    pub(crate) fn get_groups_as_mut(&mut self) -> &mut IndexMap<String, Group> {
        &mut self.groups
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
