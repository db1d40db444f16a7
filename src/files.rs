// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Enum capturing file types supported by `ensa_rs`.

use std::path::Path;

/// Types of files supported by `ensa_rs`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    Unknown,
    GRO,
    PDB,
    YAML,
}

impl FileType {
    /// Identify file type from the name of the file (based on file extension).
    pub fn from_name(filename: impl AsRef<Path>) -> FileType {
        let extension = match filename.as_ref().extension() {
            Some(x) => x,
            None => return FileType::Unknown,
        };

        match extension.to_str() {
            Some("gro") => FileType::GRO,
            Some("pdb") => FileType::PDB,
            Some("yaml") | Some("yml") => FileType::YAML,
            Some(_) | None => FileType::Unknown,
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name() {
        assert_eq!(FileType::from_name("structure.gro"), FileType::GRO);
        assert_eq!(FileType::from_name("traj/structure.pdb"), FileType::PDB);
        assert_eq!(FileType::from_name("layout.yaml"), FileType::YAML);
        assert_eq!(FileType::from_name("layout.yml"), FileType::YAML);
        assert_eq!(FileType::from_name("trajectory.xtc"), FileType::Unknown);
        assert_eq!(FileType::from_name("no_extension"), FileType::Unknown);
    }
}
