// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of functions for writing csv tables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::WriteTableError;

/// Write a csv table with the given header and rows.
///
/// ## Returns
/// `Ok` if writing has been successful. Otherwise `WriteTableError`.
///
/// ## Notes
/// - Every row must have the same number of fields as the header.
pub fn write_csv(
    filename: impl AsRef<Path>,
    header: &[String],
    rows: &[Vec<String>],
) -> Result<(), WriteTableError> {
    let output = File::create(&filename)
        .map_err(|_| WriteTableError::CouldNotCreate(Box::from(filename.as_ref())))?;

    let mut writer = BufWriter::new(output);

    writeln!(writer, "{}", header.join(",")).map_err(|_| WriteTableError::CouldNotWrite)?;

    for row in rows {
        if row.len() != header.len() {
            return Err(WriteTableError::InconsistentRow(row.len(), header.len()));
        }

        writeln!(writer, "{}", row.join(",")).map_err(|_| WriteTableError::CouldNotWrite)?;
    }

    writer.flush().map_err(|_| WriteTableError::CouldNotWrite)?;

    Ok(())
}

/// Write a matrix of values as a csv table with row and column labels.
///
/// The first column of the table contains the row labels.
pub fn write_csv_matrix(
    filename: impl AsRef<Path>,
    labels: &[String],
    matrix: &[Vec<f64>],
) -> Result<(), WriteTableError> {
    let mut header = Vec::with_capacity(labels.len() + 1);
    header.push(String::new());
    header.extend_from_slice(labels);

    let rows: Vec<Vec<String>> = labels
        .iter()
        .zip(matrix.iter())
        .map(|(label, row)| {
            let mut fields = Vec::with_capacity(row.len() + 1);
            fields.push(label.clone());
            fields.extend(row.iter().map(|x| format!("{:.6}", x)));
            fields
        })
        .collect();

    write_csv(filename, &header, &rows)
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::NamedTempFile;

    #[test]
    fn write_simple_table() {
        let output = NamedTempFile::new().unwrap();

        let header = vec!["feature".to_string(), "value".to_string()];
        let rows = vec![
            vec!["PHI 2".to_string(), "0.125000".to_string()],
            vec!["PSI 2".to_string(), "0.250000".to_string()],
        ];

        write_csv(output.path(), &header, &rows).unwrap();

        let mut content = String::new();
        File::open(output.path())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        assert_eq!(
            content,
            "feature,value\nPHI 2,0.125000\nPSI 2,0.250000\n"
        );
    }

    #[test]
    fn inconsistent_row() {
        let output = NamedTempFile::new().unwrap();

        let header = vec!["feature".to_string(), "value".to_string()];
        let rows = vec![vec!["PHI 2".to_string()]];

        assert!(matches!(
            write_csv(output.path(), &header, &rows),
            Err(WriteTableError::InconsistentRow(1, 2))
        ));
    }

    #[test]
    fn write_matrix() {
        let output = NamedTempFile::new().unwrap();

        let labels = vec!["A".to_string(), "B".to_string()];
        let matrix = vec![vec![0.0, 1.5], vec![1.5, 0.0]];

        write_csv_matrix(output.path(), &labels, &matrix).unwrap();

        let mut content = String::new();
        File::open(output.path())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        assert_eq!(
            content,
            ",A,B\nA,0.000000,1.500000\nB,1.500000,0.000000\n"
        );
    }
}
