// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of backbone torsion calculations.

use crate::errors::FeaturizeError;
use crate::structures::vector3d::Vector3D;
use crate::system::general::System;

/// Calculate the dihedral angle defined by four points.
///
/// ## Returns
/// The angle in radians, in the range (-π, π].
pub fn dihedral(a: &Vector3D, b: &Vector3D, c: &Vector3D, d: &Vector3D) -> f64 {
    let b1 = b.sub(a);
    let b2 = c.sub(b);
    let b3 = d.sub(c);

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);

    let m = n1.cross(&b2.to_unit());

    let x = n1.dot(&n2) as f64;
    let y = m.dot(&n2) as f64;

    y.atan2(x)
}

/// Backbone atoms of a single residue.
#[derive(Debug, Clone, Copy)]
pub(super) struct BackboneResidue {
    pub number: usize,
    pub n: usize,
    pub ca: usize,
    pub c: usize,
}

/// Collect the backbone atoms (N, CA, C) of every residue of the system.
///
/// Residues are identified by consecutive runs of the same residue number in
/// the order the atoms appear in the system.
///
/// ## Returns
/// `Vec<BackboneResidue>` if every residue has a complete backbone.
/// Otherwise `FeaturizeError::MissingBackboneAtom`.
pub(super) fn collect_backbone(system: &System) -> Result<Vec<BackboneResidue>, FeaturizeError> {
    let mut residues: Vec<(usize, Option<usize>, Option<usize>, Option<usize>)> = Vec::new();

    for (index, atom) in system.atoms_iter().enumerate() {
        let number = atom.get_residue_number();

        match residues.last_mut() {
            Some(last) if last.0 == number => (),
            _ => residues.push((number, None, None, None)),
        }

        let last = residues
            .last_mut()
            .expect("FATAL ENSA ERROR | torsions::collect_backbone | No current residue.");

        match atom.get_atom_name() {
            "N" => last.1 = Some(index),
            "CA" => last.2 = Some(index),
            "C" => last.3 = Some(index),
            _ => (),
        }
    }

    residues
        .into_iter()
        .map(|(number, n, ca, c)| {
            Ok(BackboneResidue {
                number,
                n: n.ok_or(FeaturizeError::MissingBackboneAtom(number, "N".to_string()))?,
                ca: ca.ok_or(FeaturizeError::MissingBackboneAtom(number, "CA".to_string()))?,
                c: c.ok_or(FeaturizeError::MissingBackboneAtom(number, "C".to_string()))?,
            })
        })
        .collect()
}

/// Calculate the phi angle of residue `i` of the backbone.
///
/// Defined for `i > 0` as the dihedral C(i-1), N(i), CA(i), C(i).
pub(super) fn phi(system: &System, backbone: &[BackboneResidue], i: usize) -> f64 {
    let atoms = system.get_atoms_as_ref();

    dihedral(
        atoms[backbone[i - 1].c].get_position(),
        atoms[backbone[i].n].get_position(),
        atoms[backbone[i].ca].get_position(),
        atoms[backbone[i].c].get_position(),
    )
}

/// Calculate the psi angle of residue `i` of the backbone.
///
/// Defined for `i < len - 1` as the dihedral N(i), CA(i), C(i), N(i+1).
pub(super) fn psi(system: &System, backbone: &[BackboneResidue], i: usize) -> f64 {
    let atoms = system.get_atoms_as_ref();

    dihedral(
        atoms[backbone[i].n].get_position(),
        atoms[backbone[i].ca].get_position(),
        atoms[backbone[i].c].get_position(),
        atoms[backbone[i + 1].n].get_position(),
    )
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn dihedral_planar_trans() {
        // four points in a plane, trans configuration
        let a = Vector3D::new(-1.0, 1.0, 0.0);
        let b = Vector3D::new(0.0, 0.0, 0.0);
        let c = Vector3D::new(1.0, 0.0, 0.0);
        let d = Vector3D::new(2.0, -1.0, 0.0);

        assert_approx_eq!(
            f64,
            dihedral(&a, &b, &c, &d).abs(),
            std::f64::consts::PI,
            epsilon = 1e-5
        );
    }

    #[test]
    fn dihedral_planar_cis() {
        // four points in a plane, cis configuration
        let a = Vector3D::new(-1.0, 1.0, 0.0);
        let b = Vector3D::new(0.0, 0.0, 0.0);
        let c = Vector3D::new(1.0, 0.0, 0.0);
        let d = Vector3D::new(2.0, 1.0, 0.0);

        assert_approx_eq!(f64, dihedral(&a, &b, &c, &d), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn dihedral_right_angle() {
        let a = Vector3D::new(0.0, 1.0, 0.0);
        let b = Vector3D::new(0.0, 0.0, 0.0);
        let c = Vector3D::new(1.0, 0.0, 0.0);
        let d = Vector3D::new(1.0, 0.0, 1.0);

        assert_approx_eq!(
            f64,
            dihedral(&a, &b, &c, &d).abs(),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn dihedral_sign_changes_with_mirroring() {
        let a = Vector3D::new(0.0, 1.0, 0.0);
        let b = Vector3D::new(0.0, 0.0, 0.0);
        let c = Vector3D::new(1.0, 0.0, 0.0);
        let d = Vector3D::new(1.0, 0.5, 1.0);

        let angle = dihedral(&a, &b, &c, &d);
        let mirrored = dihedral(&a, &b, &c, &Vector3D::new(1.0, 0.5, -1.0));

        assert_approx_eq!(f64, angle, -mirrored, epsilon = 1e-5);
    }

    #[test]
    fn backbone_of_example() {
        let system = crate::io::gro_io::read_gro("test_files/example.gro").unwrap();
        let backbone = collect_backbone(&system).unwrap();

        assert_eq!(backbone.len(), 7);
        assert_eq!(backbone[0].number, 1);
        assert_eq!(backbone[0].n, 0);
        assert_eq!(backbone[0].ca, 1);
        assert_eq!(backbone[0].c, 2);
        assert_eq!(backbone[6].number, 7);
        assert_eq!(backbone[6].ca, 25);
    }

    #[test]
    fn backbone_missing_atom() {
        let system = crate::io::gro_io::read_gro("test_files/example.gro").unwrap();

        let mut without_ca = system.clone();
        without_ca
            .atoms_iter_mut()
            .find(|atom| atom.get_residue_number() == 3 && atom.get_atom_name() == "CA")
            .unwrap()
            .set_atom_name("CB");

        assert!(matches!(
            collect_backbone(&without_ca),
            Err(FeaturizeError::MissingBackboneAtom(3, name)) if name == "CA"
        ));
    }
}
