// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of functions for writing xvg plot files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::WriteTableError;

/// A single data series of an xvg plot.
#[derive(Debug, Clone)]
pub struct XvgSeries {
    legend: String,
    points: Vec<(f64, f64)>,
}

impl XvgSeries {
    /// Create a new data series with the given legend.
    pub fn new(legend: &str, points: Vec<(f64, f64)>) -> Self {
        XvgSeries {
            legend: legend.to_string(),
            points,
        }
    }
}

/// Write an xvg plot file readable by Grace and `gmx xvg` tooling.
///
/// Series are written one after another, separated by `&` markers.
///
/// ## Returns
/// `Ok` if writing has been successful. Otherwise `WriteTableError`.
pub fn write_xvg(
    filename: impl AsRef<Path>,
    title: &str,
    xaxis: &str,
    yaxis: &str,
    series: &[XvgSeries],
) -> Result<(), WriteTableError> {
    let output = File::create(&filename)
        .map_err(|_| WriteTableError::CouldNotCreate(Box::from(filename.as_ref())))?;

    let mut writer = BufWriter::new(output);

    write_header(&mut writer, title, xaxis, yaxis, series)
        .map_err(|_| WriteTableError::CouldNotWrite)?;

    for (s, serie) in series.iter().enumerate() {
        if s != 0 {
            writeln!(writer, "&").map_err(|_| WriteTableError::CouldNotWrite)?;
        }

        for (x, y) in &serie.points {
            writeln!(writer, "{:>12.6} {:>12.6}", x, y)
                .map_err(|_| WriteTableError::CouldNotWrite)?;
        }
    }

    writer.flush().map_err(|_| WriteTableError::CouldNotWrite)?;

    Ok(())
}

fn write_header(
    writer: &mut impl Write,
    title: &str,
    xaxis: &str,
    yaxis: &str,
    series: &[XvgSeries],
) -> Result<(), std::io::Error> {
    writeln!(writer, "@    title \"{}\"", title)?;
    writeln!(writer, "@    xaxis label \"{}\"", xaxis)?;
    writeln!(writer, "@    yaxis label \"{}\"", yaxis)?;
    writeln!(writer, "@TYPE xy")?;

    for (s, serie) in series.iter().enumerate() {
        writeln!(writer, "@ s{} legend \"{}\"", s, serie.legend)?;
    }

    Ok(())
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
    fn write_single_series() {
        let output = NamedTempFile::new().unwrap();

        let series = vec![XvgSeries::new(
            "divergence",
            vec![(1.0, 0.25), (2.0, 0.5)],
        )];

        write_xvg(
            output.path(),
            "Relative entropy",
            "residue",
            "JS distance",
            &series,
        )
        .unwrap();

        let mut content = String::new();
        File::open(output.path())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let expected = "@    title \"Relative entropy\"\n\
@    xaxis label \"residue\"\n\
@    yaxis label \"JS distance\"\n\
@TYPE xy\n\
@ s0 legend \"divergence\"\n\
\x20\x20\x20\x201.000000     0.250000\n\
\x20\x20\x20\x202.000000     0.500000\n";

        assert_eq!(content, expected);
    }

    #[test]
    fn write_multiple_series() {
        let output = NamedTempFile::new().unwrap();

        let series = vec![
            XvgSeries::new("first", vec![(0.0, 1.0)]),
            XvgSeries::new("second", vec![(0.0, 2.0)]),
        ];

        write_xvg(output.path(), "Eigenvalues", "component", "value", &series).unwrap();

        let mut content = String::new();
        File::open(output.path())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        assert!(content.contains("@ s0 legend \"first\""));
        assert!(content.contains("@ s1 legend \"second\""));
        assert_eq!(content.matches('&').count(), 1);
    }
}
