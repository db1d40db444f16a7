// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of methods for creating and accessing groups of atoms.

use crate::errors::GroupError;
use crate::selections::select::parse_query;
use crate::structures::{atom::Atom, group::Group};
use crate::system::general::System;

/// Check whether the provided string can be used as a group name.
/// Characters '"&|!@()<>= are not allowed. Names consisting of whitespace only
/// are also not allowed.
fn name_is_valid(string: &str) -> bool {
    if string.trim().is_empty() {
        return false;
    }

    !string
        .chars()
        .any(|c| "'\"&|!@()<>=".contains(c))
}

/// ## Methods for working with groups of atoms.
impl System {
    /// Create a group of atoms from a selection query and associate it with the system.
    ///
    /// ## Returns
    /// `Ok` if the group was created, else `GroupError`.
    ///
    /// ## Example
    /// ```no_run
    /// use ensa_rs::prelude::*;
    ///
    /// let mut system = System::from_file("structure.gro").unwrap();
    /// system.group_create("Backbone", "name N CA C and resid 43 to 65").unwrap();
    /// ```
    ///
    /// ## Notes
    /// - The group names are case-sensitive.
    /// - Overwriting an existing group is an error; the default groups
    /// "all" and "All" can thus never be redefined.
    pub fn group_create(&mut self, name: &str, query: &str) -> Result<(), GroupError> {
        if !name_is_valid(name) {
            return Err(GroupError::InvalidName(name.to_string()));
        }

        if self.group_exists(name) {
            return Err(GroupError::AlreadyExists(name.to_string()));
        }

        let select = parse_query(query)?;

        let indices = self
            .atoms_iter()
            .enumerate()
            .filter(|(_, atom)| select.matches(atom))
            .map(|(index, _)| index)
            .collect::<Vec<usize>>();

        self.get_groups_as_mut()
            .insert(name.to_string(), Group::from_indices(indices));

        Ok(())
    }

    /// Check whether a group with the provided name exists in the system.
    pub fn group_exists(&self, name: &str) -> bool {
        self.get_groups_as_ref().contains_key(name)
    }

    /// Get the number of atoms in the provided group.
    pub fn group_get_n_atoms(&self, name: &str) -> Result<usize, GroupError> {
        self.get_groups_as_ref()
            .get(name)
            .map(|group| group.get_n_atoms())
            .ok_or_else(|| GroupError::NotFound(name.to_string()))
    }

    /// Check whether the atom with the provided index is a member of the group.
    pub fn group_isin(&self, name: &str, index: usize) -> Result<bool, GroupError> {
        self.get_groups_as_ref()
            .get(name)
            .map(|group| group.isin(index))
            .ok_or_else(|| GroupError::NotFound(name.to_string()))
    }

    /// Iterate over the atoms of the provided group.
    pub fn group_iter(&self, name: &str) -> Result<impl Iterator<Item = &Atom>, GroupError> {
        let group = self
            .get_groups_as_ref()
            .get(name)
            .ok_or_else(|| GroupError::NotFound(name.to_string()))?;

        Ok(group
            .iter_indices()
            .map(|index| &self.get_atoms_as_ref()[index]))
    }

    /// Extract a copy of the atoms of the provided group.
    ///
    /// The atoms in the returned vector are renumbered starting from 1.
    pub fn group_extract(&self, name: &str) -> Result<Vec<Atom>, GroupError> {
        let atoms = self
            .group_iter(name)?
            .enumerate()
            .map(|(i, atom)| {
                let mut atom = atom.clone();
                atom.set_atom_number(i + 1);
                atom
            })
            .collect();

        Ok(atoms)
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::vector3d::Vector3D;

    fn make_system() -> System {
        let names = ["N", "CA", "C", "O"];
        let mut atoms = Vec::new();

        for residue in 1..=3 {
            for (i, name) in names.iter().enumerate() {
                atoms.push(Atom::new(
                    residue,
                    "GLY",
                    (residue - 1) * names.len() + i + 1,
                    name,
                    Vector3D::default(),
                ));
            }
        }

        System::new("Test system", atoms, None)
    }

    #[test]
    fn create_group_from_query() {
        let mut system = make_system();
        system.group_create("Calphas", "name CA").unwrap();

        assert!(system.group_exists("Calphas"));
        assert_eq!(system.group_get_n_atoms("Calphas").unwrap(), 3);

        for atom in system.group_iter("Calphas").unwrap() {
            assert_eq!(atom.get_atom_name(), "CA");
        }
    }

    #[test]
    fn create_group_with_ranges() {
        let mut system = make_system();
        system.group_create("Part", "resid 2 to 3").unwrap();

        assert_eq!(system.group_get_n_atoms("Part").unwrap(), 8);
        assert!(!system.group_isin("Part", 0).unwrap());
        assert!(system.group_isin("Part", 4).unwrap());
    }

    #[test]
    fn invalid_name_is_error() {
        let mut system = make_system();

        assert_eq!(
            system.group_create("bad|name", "name CA"),
            Err(GroupError::InvalidName("bad|name".to_string()))
        );
        assert_eq!(
            system.group_create("   ", "name CA"),
            Err(GroupError::InvalidName("   ".to_string()))
        );
    }

    #[test]
    fn duplicate_group_is_error() {
        let mut system = make_system();
        system.group_create("Calphas", "name CA").unwrap();

        assert_eq!(
            system.group_create("Calphas", "name CB"),
            Err(GroupError::AlreadyExists("Calphas".to_string()))
        );
        assert!(matches!(
            system.group_create("all", "name CA"),
            Err(GroupError::AlreadyExists(_))
        ));
    }

    #[test]
    fn invalid_query_is_error() {
        let mut system = make_system();

        assert!(matches!(
            system.group_create("Group", "resname"),
            Err(GroupError::InvalidQuery(_))
        ));
    }

    #[test]
    fn unknown_group_is_error() {
        let system = make_system();

        assert_eq!(
            system.group_get_n_atoms("Nonexistent"),
            Err(GroupError::NotFound("Nonexistent".to_string()))
        );
    }

    #[test]
    fn extract_renumbers_atoms() {
        let mut system = make_system();
        system.group_create("Calphas", "name CA").unwrap();

        let atoms = system.group_extract("Calphas").unwrap();

        assert_eq!(atoms.len(), 3);
        for (i, atom) in atoms.iter().enumerate() {
            assert_eq!(atom.get_atom_number(), i + 1);
            assert_eq!(atom.get_atom_name(), "CA");
        }
    }
}
