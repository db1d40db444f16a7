// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of parser for atom and residue numbers.

use crate::errors::SelectError;

/// Parse words following a `resid` or `serial` keyword into inclusive number ranges.
///
/// Supported forms are a single number (`45`), a dash range (`45-60`),
/// and a `to` range (`45 to 60`). Multiple ranges can be freely combined.
pub(super) fn parse_numbers(words: &[String]) -> Result<Vec<(usize, usize)>, SelectError> {
    if words.is_empty() {
        return Err(SelectError::MissingArgument(String::new()));
    }

    // normalize dash ranges into `to` ranges so that a single pass suffices
    let mut tokens: Vec<String> = Vec::new();
    for word in words {
        if let Some((start, end)) = word.split_once('-') {
            if start.is_empty() || end.is_empty() {
                return Err(SelectError::InvalidNumber(word.to_string()));
            }

            tokens.push(start.to_string());
            tokens.push("to".to_string());
            tokens.push(end.to_string());
        } else {
            tokens.push(word.to_string());
        }
    }

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let start = parse_single(&tokens[i])?;

        if tokens.get(i + 1).map(|t| t.as_str()) == Some("to") {
            let end_token = tokens
                .get(i + 2)
                .ok_or_else(|| SelectError::InvalidNumber(tokens[i + 1].clone()))?;
            let end = parse_single(end_token)?;

            if start > end {
                return Err(SelectError::InvalidNumber(format!("{} to {}", start, end)));
            }

            ranges.push((start, end));
            i += 3;
        } else {
            ranges.push((start, start));
            i += 1;
        }
    }

    Ok(ranges)
}

fn parse_single(token: &str) -> Result<usize, SelectError> {
    token
        .parse::<usize>()
        .map_err(|_| SelectError::InvalidNumber(token.to_string()))
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;

    fn words(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_numbers() {
        let ranges = parse_numbers(&words(&["4", "17", "9"])).unwrap();
        assert_eq!(ranges, vec![(4, 4), (17, 17), (9, 9)]);
    }

    #[test]
    fn to_ranges() {
        let ranges = parse_numbers(&words(&["4", "to", "17"])).unwrap();
        assert_eq!(ranges, vec![(4, 17)]);
    }

    #[test]
    fn dash_ranges() {
        let ranges = parse_numbers(&words(&["4-17", "20-22"])).unwrap();
        assert_eq!(ranges, vec![(4, 17), (20, 22)]);
    }

    #[test]
    fn mixed() {
        let ranges = parse_numbers(&words(&["1", "4-17", "33", "to", "35", "40"])).unwrap();
        assert_eq!(ranges, vec![(1, 1), (4, 17), (33, 35), (40, 40)]);
    }

    #[test]
    fn inverted_range_is_error() {
        assert!(matches!(
            parse_numbers(&words(&["17", "to", "4"])),
            Err(SelectError::InvalidNumber(_))
        ));
    }

    #[test]
    fn not_a_number() {
        assert!(matches!(
            parse_numbers(&words(&["four"])),
            Err(SelectError::InvalidNumber(_))
        ));
    }

    #[test]
    fn empty_is_error() {
        assert!(matches!(
            parse_numbers(&[]),
            Err(SelectError::MissingArgument(_))
        ));
    }

    #[test]
    fn incomplete_dash() {
        assert!(matches!(
            parse_numbers(&words(&["4-"])),
            Err(SelectError::InvalidNumber(_))
        ));
    }
}
