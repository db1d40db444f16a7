// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of alpha-carbon distance calculations.

use crate::features::torsions::BackboneResidue;
use crate::system::general::System;

/// Minimal sequence separation of residues forming a distance pair.
/// Closer pairs carry no structural information beyond the backbone geometry.
pub(super) const MIN_SEQUENCE_SEPARATION: usize = 3;

/// Collect indices into the backbone of all residue pairs whose sequence
/// separation is at least `MIN_SEQUENCE_SEPARATION`.
pub(super) fn collect_pairs(backbone: &[BackboneResidue]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();

    for i in 0..backbone.len() {
        for j in (i + MIN_SEQUENCE_SEPARATION)..backbone.len() {
            pairs.push((i, j));
        }
    }

    pairs
}

/// Calculate the distance between the alpha carbons of a residue pair.
///
/// The minimum image convention is applied when the system has a simulation
/// box; otherwise the naive euclidean distance is used.
pub(super) fn ca_distance(
    system: &System,
    backbone: &[BackboneResidue],
    pair: (usize, usize),
) -> f64 {
    let atoms = system.get_atoms_as_ref();
    let first = &atoms[backbone[pair.0].ca];
    let second = &atoms[backbone[pair.1].ca];

    match system.get_box_as_ref() {
        Some(sbox) => first.distance(second, sbox) as f64,
        None => first.distance_naive(second) as f64,
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::torsions::collect_backbone;
    use float_cmp::assert_approx_eq;

    #[test]
    fn pairs_of_heptapeptide() {
        let system = crate::io::gro_io::read_gro("test_files/example.gro").unwrap();
        let backbone = collect_backbone(&system).unwrap();

        let pairs = collect_pairs(&backbone);

        // 7 residues with separation >= 3: (0,3) (0,4) (0,5) (0,6)
        // (1,4) (1,5) (1,6) (2,5) (2,6) (3,6)
        assert_eq!(pairs.len(), 10);
        assert_eq!(pairs[0], (0, 3));
        assert_eq!(pairs[9], (3, 6));

        for (i, j) in pairs {
            assert!(j - i >= MIN_SEQUENCE_SEPARATION);
        }
    }

    #[test]
    fn pairs_of_short_chain() {
        let system = crate::io::gro_io::read_gro("test_files/example.gro").unwrap();
        let backbone = collect_backbone(&system).unwrap();

        assert!(collect_pairs(&backbone[0..3]).is_empty());
        assert_eq!(collect_pairs(&backbone[0..4]).len(), 1);
    }

    #[test]
    fn distance_uses_minimum_image() {
        let mut system = crate::io::gro_io::read_gro("test_files/example.gro").unwrap();
        let backbone = collect_backbone(&system).unwrap();

        let with_box = ca_distance(&system, &backbone, (0, 3));

        system.set_box(None);
        let without_box = ca_distance(&system, &backbone, (0, 3));

        // atoms of the example system are far from the box boundary
        assert_approx_eq!(f64, with_box, without_box, epsilon = 1e-5);
    }
}
