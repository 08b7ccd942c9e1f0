//! Property-based tests for identifier rendering.
//!
//! Any UID a reader can produce (4-10 bytes) must render as exactly two
//! uppercase hex digits per byte and decode back to the same bytes.

use proptest::prelude::*;
use votekiosk_core::{Event, Identifier};

/// Decode a rendered identifier byte by byte, independent of `Identifier::from_hex`.
fn parse_back(rendered: &str) -> Vec<u8> {
    rendered
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).expect("rendering is ASCII");
            u8::from_str_radix(pair, 16).expect("rendering is hex")
        })
        .collect()
}

/// Strategy for generating valid UIDs (4-10 bytes).
fn valid_uid() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 4..=10)
}

proptest! {
    /// Property: rendering is 2 x len uppercase hex characters.
    #[test]
    fn prop_render_length_and_alphabet(uid in valid_uid()) {
        let id = Identifier::new(uid.clone()).unwrap();
        let rendered = id.to_hex();

        prop_assert_eq!(rendered.len(), uid.len() * 2);
        prop_assert!(rendered.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    /// Property: every byte survives render then parse-back.
    #[test]
    fn prop_render_roundtrip(uid in valid_uid()) {
        let id = Identifier::new(uid.clone()).unwrap();
        prop_assert_eq!(parse_back(&id.to_hex()), uid.clone());
        prop_assert_eq!(Identifier::from_hex(&id.to_hex()).unwrap(), id);
    }

    /// Property: the CHECK event carries the rendering verbatim and never a newline.
    #[test]
    fn prop_check_event_is_single_line(uid in valid_uid()) {
        let id = Identifier::new(uid).unwrap();
        let line = Event::Check(id.clone()).to_string();

        prop_assert_eq!(line.clone(), format!("CHECK:{}", id.to_hex()));
        prop_assert!(!line.contains('\n'));
    }

    /// Property: lengths outside 4-10 are always rejected.
    #[test]
    fn prop_invalid_lengths_rejected(
        uid in prop_oneof![
            prop::collection::vec(any::<u8>(), 0..4),
            prop::collection::vec(any::<u8>(), 11..32),
        ]
    ) {
        prop_assert!(Identifier::new(uid).is_err());
    }
}
