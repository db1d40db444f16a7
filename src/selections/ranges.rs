// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Construction of selection expressions from files with residue ranges.
//!
//! A residue-range file is a plain-text file with one inclusive residue range
//! per line, written as two whitespace-separated integers:
//!
//! ```text
//! 43 65
//! 70 100
//! ```
//!
//! Combined with a base selection, such a file yields a single selection
//! expression, e.g. `chain P and (resid 43 to 65 or resid 70 to 100)`,
//! which can then be passed to [`System::group_create`](crate::system::general::System::group_create)
//! or to the extraction functions.

use std::fs::read_to_string;
use std::path::Path;

use crate::errors::ParseRangesError;

/// Inclusive range of 1-based residue numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueRange {
    first: usize,
    last: usize,
}

impl ResidueRange {
    /// Create a new residue range. Returns an error if `first > last`.
    pub fn new(first: usize, last: usize) -> Result<Self, ParseRangesError> {
        if first > last {
            return Err(ParseRangesError::InvertedRange(first, last));
        }

        Ok(ResidueRange { first, last })
    }

    /// Get the first residue number of the range.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Get the last residue number of the range.
    pub fn last(&self) -> usize {
        self.last
    }
}

/// Read residue ranges from a file.
///
/// Each non-empty line of the file must contain exactly two whitespace-separated
/// integers, the first and the last residue of an inclusive range. Blank lines
/// are ignored. Any line that can not be parsed is an error, never a silent skip.
/// The ranges are returned in file order, without deduplication or merging.
pub fn read_ranges(filename: impl AsRef<Path>) -> Result<Vec<ResidueRange>, ParseRangesError> {
    let content = read_to_string(filename.as_ref())
        .map_err(|_| ParseRangesError::FileNotFound(Box::from(filename.as_ref())))?;

    let mut ranges = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }

        ranges.push(line_as_range(line)?);
    }

    if ranges.is_empty() {
        return Err(ParseRangesError::NoRanges(Box::from(filename.as_ref())));
    }

    Ok(ranges)
}

/// Parse a single line as a residue range.
fn line_as_range(line: &str) -> Result<ResidueRange, ParseRangesError> {
    let mut split = line.split_whitespace();

    let first = split
        .next()
        .and_then(|word| word.parse::<usize>().ok())
        .ok_or_else(|| ParseRangesError::ParseLineErr(line.trim().to_string()))?;

    let last = split
        .next()
        .and_then(|word| word.parse::<usize>().ok())
        .ok_or_else(|| ParseRangesError::ParseLineErr(line.trim().to_string()))?;

    if split.next().is_some() {
        return Err(ParseRangesError::ParseLineErr(line.trim().to_string()));
    }

    ResidueRange::new(first, last)
}

/// Construct a selection expression from a base selection and residue ranges.
///
/// The result has the form `<base> and (resid f1 to l1 or resid f2 to l2 or ...)`
/// with the ranges emitted in the order they are provided. If the trimmed base
/// already ends with the word `and`, no second `and` is inserted.
pub fn build_selection(base: &str, ranges: &[ResidueRange]) -> String {
    let clauses = ranges
        .iter()
        .map(|range| format!("resid {} to {}", range.first(), range.last()))
        .collect::<Vec<String>>()
        .join(" or ");

    let base = base.trim();

    if base.is_empty() {
        format!("({})", clauses)
    } else if base == "and" || base.ends_with(" and") {
        format!("{} ({})", base, clauses)
    } else {
        format!("{} and ({})", base, clauses)
    }
}

/// Read residue ranges from a file and construct a selection expression from
/// them and the provided base selection.
///
/// This is a pure function of the file contents and the base string; calling
/// it twice with the same inputs yields an identical expression.
///
/// ## Example
/// ```no_run
/// use ensa_rs::selections::ranges::load_selection;
///
/// // with `ranges.txt` containing the lines "43 65" and "70 100":
/// let selection = load_selection("ranges.txt", "chain P").unwrap();
/// assert_eq!(selection, "chain P and (resid 43 to 65 or resid 70 to 100)");
/// ```
pub fn load_selection(
    filename: impl AsRef<Path>,
    base: &str,
) -> Result<String, ParseRangesError> {
    let ranges = read_ranges(filename)?;
    Ok(build_selection(base, &ranges))
}

/******************************/
/*         UNIT TESTS         */
/******************************/
