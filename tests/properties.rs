// Property tests for the comparison and diff primitives.
// Requires: proptest in [dev-dependencies]

use proptest::prelude::*;

use ctest::diff::{self, DiffUnit};
use ctest::scalar::{self, IntoScalar};
use ctest::{expect_eqm, expect_nem, expect_str, OutputBuffer, Session, SessionConfig, SharedOutput};

fn session() -> (Session, OutputBuffer) {
    let mut session = Session::new(SessionConfig::default().with_print(false));
    let out = OutputBuffer::new();
    session.set_sink(SharedOutput::new(out.clone()));
    (session, out)
}

// Every (a, b, mask) byte triple. `expect_eqm!`/`expect_nem!` decide
// through `masked_eq`.
#[test]
fn masked_eq_exhaustive_for_bytes() {
    for a in 0..=u8::MAX {
        for b in 0..=u8::MAX {
            for mask in 0..=u8::MAX {
                let expected = (a ^ b) & mask == 0;
                let got = scalar::masked_eq(a.into_scalar(), b.into_scalar(), mask.into());
                assert_eq!(got, expected, "a={a:#04x} b={b:#04x} mask={mask:#04x}");
            }
        }
    }
}

#[test]
fn escapes_are_literal() {
    assert_eq!(b'\n'.escape(), Some("\\n"));
    assert_eq!(b'\r'.escape(), Some("\\r"));
    assert_eq!(b'\t'.escape(), Some("\\t"));
    assert_eq!(0x1Bu8.escape(), Some("\\033"));
    assert_eq!(b'a'.escape(), None);
    assert_eq!('\u{1b}'.escape(), Some("\\033"));

    let line = diff::escape_line(b"\r\t\x1ba", 3);
    assert_eq!(line.text, "\\r\\t\\033a");
    assert_eq!(line.growth, 1 + 1 + 3);
}

proptest! {
    #[test]
    fn masked_u16_matches_xor(a in any::<u16>(), b in any::<u16>(), mask in any::<u16>()) {
        let (mut s, _out) = session();
        let mut t = s.start("test_masked");
        prop_assert_eq!(expect_eqm!(t, a, b, mask), (a ^ b) & mask == 0);
        prop_assert_eq!(expect_nem!(t, a, b, mask), (a ^ b) & mask != 0);
        let _ = t.end();
    }

    #[test]
    fn masked_u8_assertions_match_xor(a in any::<u8>(), b in any::<u8>(), mask in any::<u8>()) {
        let (mut s, _out) = session();
        let mut t = s.start("test_masked");
        prop_assert_eq!(expect_eqm!(t, a, b, mask), (a ^ b) & mask == 0);
        prop_assert_eq!(expect_nem!(t, a, b, mask), (a ^ b) & mask != 0);
        let _ = t.end();
    }

    #[test]
    fn masked_u32_matches_xor(a in any::<u32>(), b in any::<u32>(), mask in any::<u32>()) {
        let (mut s, _out) = session();
        let mut t = s.start("test_masked");
        prop_assert_eq!(expect_eqm!(t, a, b, mask), (a ^ b) & mask == 0);
        let _ = t.end();
    }

    #[test]
    fn masked_u64_matches_xor(a in any::<u64>(), b in any::<u64>(), mask in any::<u64>()) {
        let (mut s, _out) = session();
        let mut t = s.start("test_masked");
        prop_assert_eq!(expect_eqm!(t, a, b, mask), (a ^ b) & mask == 0);
        let _ = t.end();
    }

    #[test]
    fn equal_masked_operands_always_match(a in any::<u64>(), mask in any::<u64>()) {
        prop_assert!(scalar::masked_eq(a.into_scalar(), a.into_scalar(), mask));
    }

    #[test]
    fn self_comparison_is_silent(text in ".*") {
        let (mut s, out) = session();
        let mut t = s.start("test_self");
        prop_assert!(expect_str!(t, text, text));
        prop_assert!(t.passed());
        drop(t);
        prop_assert!(out.is_empty());
    }

    #[test]
    fn equal_sequences_diverge_at_length(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let d = diff::locate(&bytes, &bytes);
        prop_assert_eq!(d.index, bytes.len());
    }

    #[test]
    fn prefix_diverges_at_shorter_length(
        bytes in proptest::collection::vec(any::<u8>(), 1..64),
        cut in any::<prop::sample::Index>(),
    ) {
        let n = cut.index(bytes.len());
        let d = diff::locate(&bytes[..n], &bytes);
        prop_assert_eq!(d.index, n);
        prop_assert!(!diff::seq_eq(Some(&bytes[..n]), Some(&bytes[..])));
    }
}
