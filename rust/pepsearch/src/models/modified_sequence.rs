use super::modification::{
    Modification,
    ModificationType,
};
use super::site::Site;
use crate::errors::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Fixed,
    Variable,
}

/// A rendered modified sequence split back into residues and placements.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSequence<'a> {
    pub base_sequence: String,
    pub modifications: Vec<(Site, Placement, &'a Modification)>,
}

fn parse_error(text: &str, msg: &str) -> SearchError {
    SearchError::ParseError {
        msg: format!("{} in modified sequence '{}'", msg, text),
    }
}

/// Parses the `[fixed]` / `(variable)` notation produced by displaying a
/// polymer.
///
/// `lookup` resolves a tag's description to its modification; the
/// modification's type decides whether a tag next to a terminal residue
/// belongs to the residue or to the terminus.
pub fn parse_modified_sequence<'a, F>(text: &str, mut lookup: F) -> Result<ParsedSequence<'a>, SearchError>
where
    F: FnMut(&str) -> Option<&'a Modification>,
{
    let mut base_sequence = String::with_capacity(text.len());
    let mut modifications = Vec::new();
    // Residue count at which the first C-terminal tag was read.
    let mut c_terminal_at: Option<usize> = None;

    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        let (close, placement) = match c {
            '[' => (']', Placement::Fixed),
            '(' => (')', Placement::Variable),
            c if c.is_ascii_uppercase() => {
                if c_terminal_at.is_some() {
                    return Err(parse_error(text, "residue after a C-terminal modification"));
                }
                base_sequence.push(c);
                rest = &rest[1..];
                continue;
            }
            other => {
                return Err(parse_error(text, &format!("unexpected character '{}'", other)));
            }
        };

        let end = rest
            .find(close)
            .ok_or_else(|| parse_error(text, "unclosed modification tag"))?;
        let description = &rest[1..end];
        rest = &rest[end + 1..];
        let modification = lookup(description).ok_or_else(|| {
            parse_error(text, &format!("unknown modification '{}'", description))
        })?;

        let residues = base_sequence.len();
        let site = match modification.kind {
            ModificationType::ProteinNTerminus | ModificationType::PeptideNTerminus
                if residues > 0 =>
            {
                return Err(parse_error(text, "N-terminal modification after a residue"));
            }
            ModificationType::ProteinNTerminus => Site::ProteinNTerm,
            ModificationType::PeptideNTerminus => Site::PeptideNTerm,
            ModificationType::Residue if residues == 0 => {
                return Err(parse_error(text, "residue modification before any residue"));
            }
            ModificationType::Residue => Site::Residue(residues - 1),
            ModificationType::PeptideCTerminus => {
                c_terminal_at.get_or_insert(residues);
                Site::PeptideCTerm
            }
            ModificationType::ProteinCTerminus => {
                c_terminal_at.get_or_insert(residues);
                Site::ProteinCTerm
            }
        };
        modifications.push((site, placement, modification));
    }

    if base_sequence.is_empty() {
        return Err(parse_error(text, "no residues"));
    }
    Ok(ParsedSequence {
        base_sequence,
        modifications,
    })
}
