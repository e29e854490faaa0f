//! Naming policies applied to generated identifiers.
//!
//! A [`Capitalizer`] is built once from validated configuration, either
//! directly or by parsing the `name[:argument]` convention (`none`, `first`,
//! `word`, `word:3`). The pipeline only ever calls [`Capitalizer::capitalize`].

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Capitalizer {
    /// Leave names untouched.
    #[default]
    None,
    /// Uppercase the first character only.
    FirstCharacter,
    /// Uppercase the first letter of every n-th word, starting with the first.
    WordGroups(NonZeroUsize),
}

impl Capitalizer {
    /// Word capitalizer with the given group size; non-positive sizes are rejected.
    pub fn word_groups(group_size: i64) -> Result<Self, TransformError> {
        usize::try_from(group_size)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self::WordGroups)
            .ok_or_else(|| {
                TransformError::invalid_option(
                    "capitalizer",
                    format!("word group size must be a positive integer, got {group_size}"),
                )
            })
    }

    pub fn capitalize(&self, name: &str) -> String {
        match self {
            Self::None => name.to_string(),
            Self::FirstCharacter => capitalize_first(name),
            Self::WordGroups(group) => capitalize_word_groups(name, group.get()),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::None)
    }
}

fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A word starts at a letter that follows a non-letter (or the start of the
/// name), or at an uppercase letter that follows a lowercase one.
fn capitalize_word_groups(name: &str, group: usize) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev: Option<char> = None;
    let mut word_index = 0usize;

    for c in name.chars() {
        let starts_word = c.is_alphabetic()
            && match prev {
                None => true,
                Some(p) => !p.is_alphabetic() || (p.is_lowercase() && c.is_uppercase()),
            };

        if starts_word {
            if word_index % group == 0 {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            word_index += 1;
        } else {
            out.push(c);
        }
        prev = Some(c);
    }

    out
}

impl FromStr for Capitalizer {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, argument) = match s.split_once(':') {
            Some((name, argument)) => (name, Some(argument)),
            None => (s, None),
        };

        match name.trim().to_ascii_lowercase().as_str() {
            "" | "first" | "first-char" | "first-character" => Ok(Self::FirstCharacter),
            "none" => Ok(Self::None),
            "word" => match argument.map(str::trim).filter(|a| !a.is_empty()) {
                Some(argument) => {
                    let size = argument.parse::<i64>().map_err(|_| {
                        TransformError::invalid_option(
                            "capitalizer",
                            format!("word group size `{argument}` is not an integer"),
                        )
                    })?;
                    Self::word_groups(size)
                }
                None => Ok(Self::WordGroups(NonZeroUsize::MIN)),
            },
            other => Err(TransformError::invalid_option(
                "capitalizer",
                format!("there is no capitalizer named `{other}`"),
            )),
        }
    }
}

impl TryFrom<String> for Capitalizer {
    type Error = TransformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Capitalizer> for String {
    fn from(value: Capitalizer) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Capitalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::FirstCharacter => f.write_str("first-character"),
            Self::WordGroups(group) if group.get() == 1 => f.write_str("word"),
            Self::WordGroups(group) => write!(f, "word:{group}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(n: i64) -> Capitalizer {
        Capitalizer::word_groups(n).unwrap()
    }

    #[test]
    fn test_none_is_identity() {
        assert_eq!(Capitalizer::None.capitalize("fooBar"), "fooBar");
    }

    #[test]
    fn test_first_character() {
        let c = Capitalizer::FirstCharacter;
        assert_eq!(c.capitalize("orderLine"), "OrderLine");
        assert_eq!(c.capitalize("order_line"), "Order_line");
        assert_eq!(c.capitalize(""), "");
        assert_eq!(c.capitalize("éclair"), "Éclair");
    }

    #[test]
    fn test_word_groups_of_one() {
        assert_eq!(word(1).capitalize("order_line-item"), "Order_Line-Item");
        assert_eq!(word(1).capitalize("shipTo"), "ShipTo");
        assert_eq!(word(1).capitalize("v2name"), "V2Name");
    }

    #[test]
    fn test_word_groups_of_two() {
        assert_eq!(
            word(2).capitalize("first_second_third_fourth"),
            "First_second_Third_fourth"
        );
    }

    #[test]
    fn test_word_groups_leave_separators() {
        assert_eq!(word(1).capitalize("__a..b  c"), "__A..B  C");
        assert_eq!(word(1).capitalize(""), "");
    }

    #[test]
    fn test_non_positive_group_size_rejected() {
        for size in [0, -3] {
            let err = Capitalizer::word_groups(size).unwrap_err();
            assert!(matches!(
                err,
                TransformError::ConfigurationOrSchemaMismatch { .. }
            ));
        }
        assert!("word:0".parse::<Capitalizer>().is_err());
        assert!("word:x".parse::<Capitalizer>().is_err());
    }

    #[test]
    fn test_parse_convention() {
        assert_eq!("none".parse::<Capitalizer>().unwrap(), Capitalizer::None);
        assert_eq!("First".parse::<Capitalizer>().unwrap(), Capitalizer::FirstCharacter);
        assert_eq!("first-char".parse::<Capitalizer>().unwrap(), Capitalizer::FirstCharacter);
        assert_eq!("word".parse::<Capitalizer>().unwrap(), word(1));
        assert_eq!("word:3".parse::<Capitalizer>().unwrap(), word(3));
        assert!("shout".parse::<Capitalizer>().is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&word(3)).unwrap();
        assert_eq!(json, "\"word:3\"");
        let back: Capitalizer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, word(3));
        assert!(serde_json::from_str::<Capitalizer>("\"word:-1\"").is_err());
    }
}
