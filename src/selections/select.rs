// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of the selection language used to pick atoms from a system.
//!
//! The language is a compact VMD-like query language. Atoms can be selected
//! by residue name (`resname`), atom name (`name`), residue number (`resid`),
//! atom number (`serial`), or chain identifier (`chain`), and the individual
//! clauses can be combined using `and` (`&&`), `or` (`||`), `not` (`!`),
//! and parentheses. Atom and residue names can also be specified as regular
//! expressions enclosed in an `r'...'` block.

use regex::Regex;

use crate::errors::SelectError;
use crate::selections::numbers::parse_numbers;
use crate::structures::atom::Atom;

/// Atom or residue name requested by a selection query.
#[derive(Debug, Clone)]
pub enum Name {
    /// Name matching a string exactly.
    Plain(String),
    /// Name matching a regular expression.
    Pattern(Box<Regex>),
}

impl Name {
    /// Check whether the provided string matches this name.
    fn matches(&self, string: &str) -> bool {
        match self {
            Name::Plain(name) => name == string,
            Name::Pattern(regex) => regex.is_match(string),
        }
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Name::Plain(a), Name::Plain(b)) => a == b,
            (Name::Pattern(a), Name::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Parsed representation of a selection query.
#[derive(Debug, PartialEq)]
pub enum Select {
    All,
    ResidueName(Vec<Name>),
    AtomName(Vec<Name>),
    ResidueNumber(Vec<(usize, usize)>),
    AtomNumber(Vec<(usize, usize)>),
    Chain(Vec<char>),
    And(Box<Select>, Box<Select>),
    Or(Box<Select>, Box<Select>),
    Not(Box<Select>),
}

impl Select {
    /// Check whether the provided atom matches the selection.
    pub fn matches(&self, atom: &Atom) -> bool {
        match self {
            Select::All => true,
            Select::ResidueName(names) => names
                .iter()
                .any(|name| name.matches(atom.get_residue_name())),
            Select::AtomName(names) => {
                names.iter().any(|name| name.matches(atom.get_atom_name()))
            }
            Select::ResidueNumber(ranges) => ranges
                .iter()
                .any(|&(start, end)| {
                    atom.get_residue_number() >= start && atom.get_residue_number() <= end
                }),
            Select::AtomNumber(ranges) => ranges
                .iter()
                .any(|&(start, end)| {
                    atom.get_atom_number() >= start && atom.get_atom_number() <= end
                }),
            Select::Chain(chains) => match atom.get_chain() {
                Some(chain) => chains.contains(&chain),
                None => false,
            },
            Select::And(left, right) => left.matches(atom) && right.matches(atom),
            Select::Or(left, right) => left.matches(atom) || right.matches(atom),
            Select::Not(operand) => !operand.matches(atom),
        }
    }
}

/// Token of a selection query.
#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Not,
    Word(String),
    Regex(String),
}

/// Parse a selection query into a `Select` tree.
///
/// ## Example
/// ```
/// use ensa_rs::selections::select::parse_query;
///
/// let select = parse_query("resname POPC and not resid 43 to 65").unwrap();
/// ```
pub fn parse_query(query: &str) -> Result<Select, SelectError> {
    if query.trim().is_empty() {
        return Err(SelectError::EmptyQuery);
    }

    let tokens = tokenize(query).map_err(|e| contextualize(e, query))?;

    let mut parser = Parser { tokens, position: 0 };
    let select = parser.parse_or().map_err(|e| contextualize(e, query))?;

    if parser.position != parser.tokens.len() {
        return Err(SelectError::InvalidParentheses(query.to_string()));
    }

    Ok(select)
}

/// Fill the full query into an error raised for a fragment of it.
fn contextualize(error: SelectError, query: &str) -> SelectError {
    match error {
        SelectError::InvalidOperator(_) => SelectError::InvalidOperator(query.to_string()),
        SelectError::MissingArgument(_) => SelectError::MissingArgument(query.to_string()),
        SelectError::InvalidParentheses(_) => SelectError::InvalidParentheses(query.to_string()),
        SelectError::UnclosedRegex(_) => SelectError::UnclosedRegex(query.to_string()),
        other => other,
    }
}

/// Split a query into tokens. Operators and parentheses do not have to be
/// separated by whitespace from the rest of the query.
fn tokenize(query: &str) -> Result<Vec<Token>, SelectError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut word = String::new();
    let mut chars = query.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' if word == "r" => {
                // regular expression block
                word.clear();
                let mut pattern = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(x) => pattern.push(x),
                        None => return Err(SelectError::UnclosedRegex(String::new())),
                    }
                }
                tokens.push(Token::Regex(pattern));
            }
            '(' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(Token::Open);
            }
            ')' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(Token::Close);
            }
            '!' => {
                flush_word(&mut word, &mut tokens);
                tokens.push(Token::Not);
            }
            '&' | '|' => {
                flush_word(&mut word, &mut tokens);
                if chars.peek() != Some(&c) {
                    return Err(SelectError::InvalidOperator(String::new()));
                }
                chars.next();
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if c.is_whitespace() => flush_word(&mut word, &mut tokens),
            c => word.push(c),
        }
    }

    flush_word(&mut word, &mut tokens);
    Ok(tokens)
}

/// Convert the accumulated word into a token, translating word operators.
fn flush_word(word: &mut String, tokens: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }

    match word.as_str() {
        "and" => tokens.push(Token::And),
        "or" => tokens.push(Token::Or),
        "not" => tokens.push(Token::Not),
        _ => tokens.push(Token::Word(std::mem::take(word))),
    }

    word.clear();
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<&Token> {
        let position = self.position;
        if position < self.tokens.len() {
            self.position += 1;
            self.tokens.get(position)
        } else {
            None
        }
    }

    /// `or_expr := and_expr (OR and_expr)*`
    fn parse_or(&mut self) -> Result<Select, SelectError> {
        let mut tree = self.parse_and()?;

        while self.peek() == Some(&Token::Or) {
            self.next();
            let right = self.parse_and()?;
            tree = Select::Or(Box::new(tree), Box::new(right));
        }

        Ok(tree)
    }

    /// `and_expr := unary (AND unary)*`
    fn parse_and(&mut self) -> Result<Select, SelectError> {
        let mut tree = self.parse_unary()?;

        while self.peek() == Some(&Token::And) {
            self.next();
            let right = self.parse_unary()?;
            tree = Select::And(Box::new(tree), Box::new(right));
        }

        Ok(tree)
    }

    /// `unary := NOT unary | primary`
    fn parse_unary(&mut self) -> Result<Select, SelectError> {
        if self.peek() == Some(&Token::Not) {
            self.next();
            let operand = self.parse_unary()?;
            return Ok(Select::Not(Box::new(operand)));
        }

        self.parse_primary()
    }

    /// `primary := '(' or_expr ')' | clause`
    fn parse_primary(&mut self) -> Result<Select, SelectError> {
        match self.peek() {
            Some(Token::Open) => {
                self.next();
                let tree = self.parse_or()?;
                match self.next() {
                    Some(Token::Close) => Ok(tree),
                    _ => Err(SelectError::InvalidParentheses(String::new())),
                }
            }
            Some(Token::Word(_)) => self.parse_clause(),
            Some(_) => Err(SelectError::MissingArgument(String::new())),
            None => Err(SelectError::MissingArgument(String::new())),
        }
    }

    /// `clause := keyword args`
    fn parse_clause(&mut self) -> Result<Select, SelectError> {
        let keyword = match self.next() {
            Some(Token::Word(word)) => word.clone(),
            _ => return Err(SelectError::MissingArgument(String::new())),
        };

        match keyword.as_str() {
            "all" => Ok(Select::All),
            "resname" => Ok(Select::ResidueName(self.collect_names()?)),
            "name" => Ok(Select::AtomName(self.collect_names()?)),
            "resid" => Ok(Select::ResidueNumber(parse_numbers(&self.collect_words())?)),
            "serial" => Ok(Select::AtomNumber(parse_numbers(&self.collect_words())?)),
            "chain" => Ok(Select::Chain(self.collect_chains()?)),
            _ => Err(SelectError::UnknownKeyword(keyword)),
        }
    }

    /// Collect plain words until the next operator, parenthesis, or end of query.
    fn collect_words(&mut self) -> Vec<String> {
        let mut words = Vec::new();

        while let Some(Token::Word(word)) = self.peek() {
            words.push(word.clone());
            self.next();
        }

        words
    }

    /// Collect names (plain words or regular expressions) until the next
    /// operator, parenthesis, or end of query.
    fn collect_names(&mut self) -> Result<Vec<Name>, SelectError> {
        let mut names = Vec::new();

        loop {
            match self.peek() {
                Some(Token::Word(word)) => {
                    names.push(Name::Plain(word.clone()));
                    self.next();
                }
                Some(Token::Regex(pattern)) => {
                    let regex = Regex::new(pattern)
                        .map_err(|_| SelectError::InvalidRegex(pattern.clone()))?;
                    names.push(Name::Pattern(Box::new(regex)));
                    self.next();
                }
                _ => break,
            }
        }

        if names.is_empty() {
            return Err(SelectError::MissingArgument(String::new()));
        }

        Ok(names)
    }

    /// Collect single-character chain identifiers.
    fn collect_chains(&mut self) -> Result<Vec<char>, SelectError> {
        let words = self.collect_words();

        if words.is_empty() {
            return Err(SelectError::MissingArgument(String::new()));
        }

        words
            .into_iter()
            .map(|word| {
                let mut chars = word.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(SelectError::InvalidChainId(word)),
                }
            })
            .collect()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::vector3d::Vector3D;

    fn atom(resid: usize, resname: &str, serial: usize, name: &str, chain: char) -> Atom {
        Atom::new(resid, resname, serial, name, Vector3D::default()).with_chain(chain)
    }

    #[test]
    fn parse_simple_clause() {
        let select = parse_query("resname POPC POPE").unwrap();
        assert_eq!(
            select,
            Select::ResidueName(vec![
                Name::Plain("POPC".to_string()),
                Name::Plain("POPE".to_string())
            ])
        );
    }

    #[test]
    fn parse_resid_ranges() {
        let select = parse_query("resid 43 to 65 70-100").unwrap();
        assert_eq!(select, Select::ResidueNumber(vec![(43, 65), (70, 100)]));
    }

    #[test]
    fn parse_operators() {
        let select = parse_query("resname POPC and not resid 5").unwrap();
        assert_eq!(
            select,
            Select::And(
                Box::new(Select::ResidueName(vec![Name::Plain("POPC".to_string())])),
                Box::new(Select::Not(Box::new(Select::ResidueNumber(vec![(5, 5)]))))
            )
        );
    }

    #[test]
    fn parse_symbolic_operators() {
        let with_words = parse_query("name CA or name CB and not resid 5").unwrap();
        let with_symbols = parse_query("name CA||name CB&&!resid 5").unwrap();
        assert_eq!(with_words, with_symbols);
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let select = parse_query("name CA or name CB and resid 5").unwrap();
        assert_eq!(
            select,
            Select::Or(
                Box::new(Select::AtomName(vec![Name::Plain("CA".to_string())])),
                Box::new(Select::And(
                    Box::new(Select::AtomName(vec![Name::Plain("CB".to_string())])),
                    Box::new(Select::ResidueNumber(vec![(5, 5)]))
                ))
            )
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let select = parse_query("(name CA or name CB) and resid 5").unwrap();
        assert_eq!(
            select,
            Select::And(
                Box::new(Select::Or(
                    Box::new(Select::AtomName(vec![Name::Plain("CA".to_string())])),
                    Box::new(Select::AtomName(vec![Name::Plain("CB".to_string())]))
                )),
                Box::new(Select::ResidueNumber(vec![(5, 5)]))
            )
        );
    }

    #[test]
    fn regex_names() {
        let select = parse_query("name r'^[0-9]?H.*'").unwrap();

        let hydrogen = atom(1, "ALA", 1, "HA", 'A');
        let carbon = atom(1, "ALA", 2, "CA", 'A');

        assert!(select.matches(&hydrogen));
        assert!(!select.matches(&carbon));
    }

    #[test]
    fn matches_composite_query() {
        let select = parse_query("chain A and (resid 1 to 2 or name CB) and not resname LYS").unwrap();

        assert!(select.matches(&atom(1, "ALA", 1, "CA", 'A')));
        assert!(select.matches(&atom(7, "GLY", 9, "CB", 'A')));
        assert!(!select.matches(&atom(1, "LYS", 1, "CA", 'A')));
        assert!(!select.matches(&atom(1, "ALA", 1, "CA", 'B')));
        assert!(!select.matches(&atom(5, "ALA", 4, "CA", 'A')));
    }

    #[test]
    fn matches_all() {
        let select = parse_query("all").unwrap();
        assert!(select.matches(&atom(1, "ALA", 1, "CA", 'A')));
    }

    #[test]
    fn matches_serial() {
        let select = parse_query("serial 2 to 3").unwrap();
        assert!(!select.matches(&atom(1, "ALA", 1, "CA", 'A')));
        assert!(select.matches(&atom(1, "ALA", 2, "CB", 'A')));
        assert!(select.matches(&atom(1, "ALA", 3, "CG", 'A')));
        assert!(!select.matches(&atom(1, "ALA", 4, "CD", 'A')));
    }

    #[test]
    fn chain_without_id_is_error() {
        assert!(matches!(
            parse_query("chain AB"),
            Err(SelectError::InvalidChainId(_))
        ));
    }

    #[test]
    fn empty_query_is_error() {
        assert_eq!(parse_query("   "), Err(SelectError::EmptyQuery));
    }

    #[test]
    fn unbalanced_parentheses_are_error() {
        assert!(matches!(
            parse_query("(name CA or name CB and resid 5"),
            Err(SelectError::InvalidParentheses(_))
        ));
        assert!(matches!(
            parse_query("name CA) or name CB"),
            Err(SelectError::InvalidParentheses(_))
        ));
    }

    #[test]
    fn missing_argument_is_error() {
        assert!(matches!(
            parse_query("resname"),
            Err(SelectError::MissingArgument(_))
        ));
        assert!(matches!(
            parse_query("name CA and"),
            Err(SelectError::MissingArgument(_))
        ));
    }

    #[test]
    fn single_ampersand_is_error() {
        assert!(matches!(
            parse_query("name CA & name CB"),
            Err(SelectError::InvalidOperator(_))
        ));
    }

    #[test]
    fn unclosed_regex_is_error() {
        assert!(matches!(
            parse_query("name r'^H.*"),
            Err(SelectError::UnclosedRegex(_))
        ));
    }

    #[test]
    fn unknown_keyword_is_error() {
        assert!(matches!(
            parse_query("segid P229"),
            Err(SelectError::UnknownKeyword(_))
        ));
    }
}
