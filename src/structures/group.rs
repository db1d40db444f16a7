// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of the Group structure and its methods.

/// Group of atoms in a system. Holds indices of the atoms forming the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Indices of the atoms in the group. Sorted in ascending order, no duplicates.
    atom_indices: Vec<usize>,
}

impl Group {
    /// Create a new group from the provided atom indices.
    /// The indices are sorted and deduplicated.
    pub fn from_indices(mut atom_indices: Vec<usize>) -> Self {
        atom_indices.sort_unstable();
        atom_indices.dedup();

        Group { atom_indices }
    }

    /// Get the number of atoms in the group.
    pub fn get_n_atoms(&self) -> usize {
        self.atom_indices.len()
    }

    /// Check whether the group contains the atom with the provided index.
    pub fn isin(&self, index: usize) -> bool {
        self.atom_indices.binary_search(&index).is_ok()
    }

    /// Iterate over the indices of the atoms in the group.
    pub fn iter_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.atom_indices.iter().copied()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_indices() {
        let group = Group::from_indices(vec![5, 1, 3, 1, 2]);

        assert_eq!(group.get_n_atoms(), 4);
        assert_eq!(group.iter_indices().collect::<Vec<usize>>(), vec![1, 2, 3, 5]);

        assert!(group.isin(3));
        assert!(!group.isin(4));
    }
}
