// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of errors that can be returned by the `ensa_rs` library.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading and parsing a gro file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseGroError {
    #[error("File `{0}` was not found or could not be read.")]
    FileNotFound(Box<Path>),
    #[error("File `{0}` ended unexpectedly.")]
    LineNotFound(Box<Path>),
    #[error("Could not parse line `{0}`.")]
    ParseLineErr(String),
    #[error("Could not parse line `{0}` as atom.")]
    ParseAtomLineErr(String),
    #[error("Could not parse line `{0}` as box dimensions.")]
    ParseBoxLineErr(String),
    #[error("Simulation box specified by line `{0}` is not orthogonal.")]
    UnsupportedBox(String),
}

/// Errors that can occur when writing a gro file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteGroError {
    #[error("File `{0}` could not be created.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write line into the output file.")]
    CouldNotWrite,
    #[error("Group `{0}` does not exist.")]
    GroupNotFound(String),
}

/// Errors that can occur when reading and parsing a pdb file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParsePdbError {
    #[error("File `{0}` was not found or could not be read.")]
    FileNotFound(Box<Path>),
    #[error("Could not parse line `{0}` as atom.")]
    ParseAtomLineErr(String),
    #[error("Could not parse line `{0}` as box dimensions.")]
    ParseBoxLineErr(String),
    #[error("File `{0}` contains no atoms.")]
    NoAtoms(Box<Path>),
}

/// Errors that can occur when writing a pdb file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WritePdbError {
    #[error("File `{0}` could not be created.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write line into the output file.")]
    CouldNotWrite,
    #[error("Group `{0}` does not exist.")]
    GroupNotFound(String),
}

/// Errors that can occur when reading a file of an unknown or unsupported type.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseFileError {
    #[error("File `{0}` has an unknown or unsupported file extension.")]
    UnknownExtension(Box<Path>),
    #[error("{0}")]
    ParseGro(#[from] ParseGroError),
    #[error("{0}")]
    ParsePdb(#[from] ParsePdbError),
}

/// Errors that can occur when working with groups of atoms.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GroupError {
    #[error("Group `{0}` does not exist.")]
    NotFound(String),
    #[error("Group `{0}` already exists.")]
    AlreadyExists(String),
    #[error("Name `{0}` can not be used as a group name.")]
    InvalidName(String),
    #[error("{0}")]
    InvalidQuery(#[from] SelectError),
}

/// Errors that can occur when parsing a selection query.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    #[error("No query provided.")]
    EmptyQuery,
    #[error("Invalid operator in query `{0}`.")]
    InvalidOperator(String),
    #[error("Missing argument in query `{0}`.")]
    MissingArgument(String),
    #[error("Unmatched parentheses in query `{0}`.")]
    InvalidParentheses(String),
    #[error("Unclosed regular expression block in query `{0}`.")]
    UnclosedRegex(String),
    #[error("Could not construct regular expression from `{0}`.")]
    InvalidRegex(String),
    #[error("Could not parse `{0}` as a number or number range.")]
    InvalidNumber(String),
    #[error("Could not parse `{0}` as a chain identifier.")]
    InvalidChainId(String),
    #[error("Unknown keyword `{0}`.")]
    UnknownKeyword(String),
}

/// Errors that can occur when reading a file with residue ranges
/// and constructing a selection expression from it.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseRangesError {
    #[error("File `{0}` was not found or could not be read.")]
    FileNotFound(Box<Path>),
    #[error("Could not parse line `{0}` as a residue range.")]
    ParseLineErr(String),
    #[error("Invalid residue range `{0} {1}`: start of the range is higher than its end.")]
    InvertedRange(usize, usize),
    #[error("File `{0}` contains no residue ranges.")]
    NoRanges(Box<Path>),
}

/// Errors that can occur when reading a trajectory file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReadTrajError {
    #[error("File `{0}` was not found or could not be read.")]
    FileNotFound(Box<Path>),
    #[error("Could not read a full frame from the trajectory file.")]
    FrameNotFound,
    #[error("Number of atoms in the trajectory frame (`{0}`) does not match the number of atoms in the system (`{1}`).")]
    AtomsNumberMismatch(usize, usize),
}

/// Errors that can occur when writing a trajectory file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteTrajError {
    #[error("File `{0}` could not be created.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write frame into the output file.")]
    CouldNotWrite,
    #[error("Group `{0}` does not exist.")]
    GroupNotFound(String),
}

/// Errors that can occur when calculating features from a trajectory.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeaturizeError {
    #[error("{0}")]
    CouldNotReadTraj(#[from] ReadTrajError),
    #[error("Residue `{0}` is missing backbone atom `{1}`.")]
    MissingBackboneAtom(usize, String),
    #[error("System contains `{0}` residues which is not enough for the requested feature type.")]
    NotEnoughResidues(usize),
    #[error("Trajectory contains no frames after frame `{0}`.")]
    NoFrames(usize),
}

/// Errors that can occur when statistically comparing two ensembles.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("Compared ensembles describe different features (`{0}` vs `{1}`).")]
    FeatureMismatch(String, String),
    #[error("Compared ensembles have different numbers of features (`{0}` vs `{1}`).")]
    ShapeMismatch(usize, usize),
    #[error("Ensemble contains no frames.")]
    EmptyEnsemble,
    #[error("Bin width `{0}` is not positive.")]
    InvalidBinWidth(String),
}

/// Errors that can occur when performing principal component analysis.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PcaError {
    #[error("Data matrix has no features.")]
    NoFeatures,
    #[error("Data matrix contains `{0}` frames; at least 2 are required.")]
    NotEnoughFrames(usize),
    #[error("Component `{0}` does not exist; the analysis only has `{1}` components.")]
    ComponentOutOfRange(usize, usize),
    #[error("Data matrix has `{0}` features but the analysis was performed for `{1}` features.")]
    ShapeMismatch(usize, usize),
    #[error("{0}")]
    CouldNotReadTraj(#[from] ReadTrajError),
    #[error("{0}")]
    CouldNotWriteTraj(#[from] WriteTrajError),
    #[error("Trajectory contains `{0}` usable frames but the data matrix describes `{1}` frames.")]
    FrameCountMismatch(usize, usize),
}

/// Errors that can occur when clustering conformations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClusterError {
    #[error("Can not cluster into `0` clusters.")]
    ZeroClusters,
    #[error("Requested `{0}` clusters but the data only contains `{1}` frames.")]
    TooManyClusters(usize, usize),
    #[error("Data matrix contains no frames.")]
    EmptyData,
    #[error("Clustered ensembles have different numbers of features (`{0}` vs `{1}`).")]
    ShapeMismatch(usize, usize),
    #[error("{0}")]
    CouldNotReadTraj(#[from] ReadTrajError),
    #[error("{0}")]
    CouldNotWriteTraj(#[from] WriteTrajError),
}

/// Errors that can occur when writing csv or xvg output files.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteTableError {
    #[error("File `{0}` could not be created.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write line into the output file.")]
    CouldNotWrite,
    #[error("Row has `{0}` fields but the header describes `{1}` fields.")]
    InconsistentRow(usize, usize),
}

/// Errors that can occur when preparing the output directory layout.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File `{0}` was not found or could not be read.")]
    FileNotFound(Box<Path>),
    #[error("Could not parse file `{0}` as an output layout: {1}.")]
    CouldNotParse(Box<Path>, String),
    #[error("Directory `{0}` could not be created.")]
    CouldNotCreateDir(Box<Path>),
}

/// Errors that can occur when extracting selected atoms from trajectories.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{0}")]
    CouldNotReadStructure(#[from] ParseFileError),
    #[error("{0}")]
    InvalidSelection(#[from] GroupError),
    #[error("{0}")]
    CouldNotParseRanges(#[from] ParseRangesError),
    #[error("{0}")]
    CouldNotWriteStructure(#[from] WriteGroError),
    #[error("{0}")]
    CouldNotReadTraj(#[from] ReadTrajError),
    #[error("{0}")]
    CouldNotWriteTraj(#[from] WriteTrajError),
    #[error("Selection `{0}` selects no atoms.")]
    EmptySelection(String),
    #[error("Selections for the combined extraction select different numbers of atoms (`{0}` vs `{1}`).")]
    AtomCountMismatch(usize, usize),
    #[error("Provided `{0}` structure files but `{1}` trajectory files.")]
    InputLengthMismatch(usize, usize),
}
