//! User-facing references to items and properties.
//!
//! Listings number names from 1 in sorted order, so a reference is either
//! that number or the name itself. Numbers can be given as ranges (`3-5`).
//! Names match case-insensitively and are resolved to their canonical
//! spelling before reaching the engine.

use crate::error::{AlchemyError, Result};
use crate::model::normalize_name;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// 1-based position in a sorted listing
    Index(usize),
    Name(String),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Index(i) => write!(f, "{}", i),
            ItemRef::Name(n) => write!(f, "\"{}\"", n),
        }
    }
}

impl FromStr for ItemRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Empty reference".to_string());
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return match trimmed.parse() {
                Ok(0) | Err(_) => Err(format!("Invalid index: {}", trimmed)),
                Ok(n) => Ok(ItemRef::Index(n)),
            };
        }
        Ok(ItemRef::Name(normalize_name(trimmed)))
    }
}

/// Parses one argument, expanding numeric ranges.
///
/// "3-5" expands to 3, 4, 5. An argument with a dash whose sides are not
/// both numbers is a name ("Wisp-Stalk Caps").
pub fn parse_ref_or_range(s: &str) -> std::result::Result<Vec<ItemRef>, String> {
    if let Some((start, end)) = s.trim().split_once('-') {
        if let (Ok(ItemRef::Index(a)), Ok(ItemRef::Index(b))) =
            (start.parse::<ItemRef>(), end.parse::<ItemRef>())
        {
            if a > b {
                return Err(format!(
                    "Invalid range: start ({}) must be <= end ({})",
                    a, b
                ));
            }
            return Ok((a..=b).map(ItemRef::Index).collect());
        }
    }
    s.parse().map(|r| vec![r])
}

/// Parses every argument, failing on the first bad one.
pub fn parse_refs<I, S>(args: I) -> std::result::Result<Vec<ItemRef>, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut refs = Vec::new();
    for arg in args {
        refs.extend(parse_ref_or_range(arg.as_ref())?);
    }
    Ok(refs)
}

/// Resolves references against a sorted name listing. `kind` names the
/// listing in error messages ("item", "property").
pub fn resolve(names: &[String], refs: &[ItemRef], kind: &str) -> Result<Vec<String>> {
    refs.iter()
        .map(|r| match r {
            ItemRef::Index(i) => i
                .checked_sub(1)
                .and_then(|pos| names.get(pos))
                .cloned()
                .ok_or_else(|| AlchemyError::Api(format!("No {} at index {}", kind, i))),
            ItemRef::Name(name) => names
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(name))
                .cloned()
                .ok_or_else(|| AlchemyError::Api(format!("Unknown {}: {}", kind, name))),
        })
        .collect()
}
