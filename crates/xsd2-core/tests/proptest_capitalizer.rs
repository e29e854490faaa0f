//! Property-based tests for the capitalizers.
//!
//! Invariants:
//! - `FirstCharacter` is idempotent and only touches the first character.
//! - `WordGroups(1)` over `_`-separated lowercase words equals applying
//!   `FirstCharacter` to each word.
//! - No capitalizer changes the length of an ASCII name.

use proptest::prelude::*;
use xsd2_core::Capitalizer;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Identifier-like names, mixed case, digits and separators.
fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_.-]{0,20}"
}

/// Lowercase words joined by `_`.
fn arb_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 1..5)
}

fn arb_capitalizer() -> impl Strategy<Value = Capitalizer> {
    prop_oneof![
        Just(Capitalizer::None),
        Just(Capitalizer::FirstCharacter),
        (1i64..5).prop_map(|n| Capitalizer::word_groups(n).unwrap()),
    ]
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, ..Default::default() })]

    #[test]
    fn first_character_is_idempotent(name in arb_name()) {
        let once = Capitalizer::FirstCharacter.capitalize(&name);
        let twice = Capitalizer::FirstCharacter.capitalize(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(&once[1..], &name[1..]);
    }

    #[test]
    fn word_groups_of_one_capitalize_every_word(words in arb_words()) {
        let name = words.join("_");
        let expected = words
            .iter()
            .map(|w| Capitalizer::FirstCharacter.capitalize(w))
            .collect::<Vec<_>>()
            .join("_");
        let word = Capitalizer::word_groups(1).unwrap();
        prop_assert_eq!(word.capitalize(&name), expected);
    }

    #[test]
    fn capitalizers_preserve_ascii_length(name in arb_name(), capitalizer in arb_capitalizer()) {
        prop_assert_eq!(capitalizer.capitalize(&name).len(), name.len());
    }

    #[test]
    fn string_form_parses_back(capitalizer in arb_capitalizer()) {
        let parsed: Capitalizer = capitalizer.to_string().parse().unwrap();
        prop_assert_eq!(parsed, capitalizer);
    }
}
