//! Scalar rendering and comparison.
//!
//! Operands are tagged with their byte width, which also selects how they are
//! shown in a failure line: a single `0`/`1` for bits, eight binary digits
//! for bytes, zero-padded upper-case hex for 2, 4 and 8 byte values.

use std::fmt;

use crate::error::HarnessError;

// ============================================================================
// SCALAR VALUES
// ============================================================================

/// A comparison operand together with its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Bit(bool),
    Byte(u8),
    Short(u16),
    Int(u32),
    Long(u64),
}

impl Scalar {
    /// Declared width in bytes; 0 for a bit.
    pub fn width(self) -> usize {
        match self {
            Scalar::Bit(_) => 0,
            Scalar::Byte(_) => 1,
            Scalar::Short(_) => 2,
            Scalar::Int(_) => 4,
            Scalar::Long(_) => 8,
        }
    }

    pub fn bits(self) -> u64 {
        match self {
            Scalar::Bit(b) => b as u64,
            Scalar::Byte(v) => v as u64,
            Scalar::Short(v) => v as u64,
            Scalar::Int(v) => v as u64,
            Scalar::Long(v) => v,
        }
    }

    /// Interprets `bits` at a declared width. Widths other than 0, 1, 2, 4
    /// and 8 are rejected rather than guessed at.
    pub fn from_raw(width: usize, bits: u64) -> Result<Scalar, HarnessError> {
        match width {
            0 => Ok(Scalar::Bit(bits != 0)),
            1 => Ok(Scalar::Byte(bits as u8)),
            2 => Ok(Scalar::Short(bits as u16)),
            4 => Ok(Scalar::Int(bits as u32)),
            8 => Ok(Scalar::Long(bits)),
            width => Err(HarnessError::UnsupportedWidth { width }),
        }
    }

    /// Re-tags the value at a wider width, zero-extending.
    fn widen(self, width: usize) -> Scalar {
        match width {
            w if w <= self.width() => self,
            1 => Scalar::Byte(self.bits() as u8),
            2 => Scalar::Short(self.bits() as u16),
            4 => Scalar::Int(self.bits() as u32),
            _ => Scalar::Long(self.bits()),
        }
    }

    pub fn render(self) -> String {
        match self {
            Scalar::Bit(b) => (if b { "1" } else { "0" }).to_string(),
            Scalar::Byte(v) => byte_to_bin(v),
            Scalar::Short(v) => format!("{v:04X}"),
            Scalar::Int(v) => format!("{v:08X}"),
            Scalar::Long(v) => format!("{v:016X}"),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Eight binary digits, most significant bit first.
pub fn byte_to_bin(byte: u8) -> String {
    format!("{byte:08b}")
}

/// Conversion from a typed value into a width-tagged operand.
pub trait IntoScalar {
    fn into_scalar(self) -> Scalar;
}

macro_rules! impl_into_scalar {
    ($variant:ident => $repr:ty : $($ty:ty),+) => {
        $(
            impl IntoScalar for $ty {
                fn into_scalar(self) -> Scalar {
                    Scalar::$variant(self as $repr)
                }
            }
        )+
    };
}

impl_into_scalar!(Byte => u8: u8, i8);
impl_into_scalar!(Short => u16: u16, i16);
impl_into_scalar!(Int => u32: u32, i32, char);
impl_into_scalar!(Long => u64: u64, i64, usize, isize);

impl IntoScalar for bool {
    fn into_scalar(self) -> Scalar {
        Scalar::Bit(self)
    }
}

impl IntoScalar for Scalar {
    fn into_scalar(self) -> Scalar {
        self
    }
}

impl<T: IntoScalar + Copy> IntoScalar for &T {
    fn into_scalar(self) -> Scalar {
        (*self).into_scalar()
    }
}

/// An operand whose width was declared at runtime and may be unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawScalar {
    pub width: usize,
    pub bits: u64,
}

impl RawScalar {
    pub fn new(width: usize, bits: u64) -> Self {
        Self { width, bits }
    }

    /// The value at its own declared width.
    pub fn scalar(self) -> Result<Scalar, HarnessError> {
        Scalar::from_raw(self.width, self.bits)
    }
}

// ============================================================================
// RELATIONS
// ============================================================================

/// The comparison an assertion expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Eq => "==",
            Relation::Ne => "!=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
            Relation::Lt => "<",
            Relation::Le => "<=",
        }
    }

    pub fn holds<T: PartialOrd + ?Sized>(self, act: &T, exp: &T) -> bool {
        match self {
            Relation::Eq => act == exp,
            Relation::Ne => act != exp,
            Relation::Gt => act > exp,
            Relation::Ge => act >= exp,
            Relation::Lt => act < exp,
            Relation::Le => act <= exp,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(a ^ b) & mask == 0`.
pub fn masked_eq(act: Scalar, exp: Scalar, mask: u64) -> bool {
    (act.bits() ^ exp.bits()) & mask == 0
}

// ============================================================================
// DESCRIPTIONS
// ============================================================================

/// Both operands rendered at the wider of the two widths.
fn render_pair(act: Scalar, exp: Scalar) -> (Scalar, Scalar) {
    let width = act.width().max(exp.width());
    (act.widen(width), exp.widen(width))
}

/// `<act-expr> <rel> <exp-expr> (<act> <rel> <exp>)`
pub fn describe(act_expr: &str, rel: Relation, exp_expr: &str, act: Scalar, exp: Scalar) -> String {
    let (a, b) = render_pair(act, exp);
    format!("{act_expr} {rel} {exp_expr} ({a} {rel} {b})")
}

/// Like [`describe`], for operands with runtime widths. An unsupported width
/// replaces the rendered values with an explicit diagnostic naming the
/// actual operand's width, or the expected one's when only that is bad.
pub fn describe_raw(
    act_expr: &str,
    rel: Relation,
    exp_expr: &str,
    act: RawScalar,
    exp: RawScalar,
) -> String {
    match (act.scalar(), exp.scalar()) {
        (Ok(a), Ok(b)) => describe(act_expr, rel, exp_expr, a, b),
        (Err(err), _) | (_, Err(err)) => format!("{act_expr} {rel} {exp_expr} ({err})"),
    }
}

/// [`describe`] followed by ` & <mask>`. The mask is always shown as the
/// eight binary digits of its low byte.
pub fn describe_masked(
    act_expr: &str,
    rel: Relation,
    exp_expr: &str,
    act: Scalar,
    exp: Scalar,
    mask: u64,
) -> String {
    format!(
        "{} & {}",
        describe(act_expr, rel, exp_expr, act, exp),
        byte_to_bin(mask as u8)
    )
}

#[cfg(test)]
mod scalar_tests {
    use super::*;

    fn raw(width: usize, act: u64, exp: u64) -> String {
        describe_raw("a", Relation::Eq, "b", RawScalar::new(width, act), RawScalar::new(width, exp))
    }

    #[test]
    fn renders_each_width() {
        assert_eq!(raw(0, 0, 1), "a == b (0 == 1)");
        assert_eq!(raw(1, u8::MIN as u64, u8::MAX as u64), "a == b (00000000 == 11111111)");
        assert_eq!(raw(2, 0, u16::MAX as u64), "a == b (0000 == FFFF)");
        assert_eq!(raw(4, 0, u32::MAX as u64), "a == b (00000000 == FFFFFFFF)");
        assert_eq!(raw(8, 0, u64::MAX), "a == b (0000000000000000 == FFFFFFFFFFFFFFFF)");
    }

    #[test]
    fn unsupported_width_is_reported_not_interpreted() {
        assert_eq!(raw(3, 0, 0), "a == b (Unsupported type of size: 3)");
        assert_eq!(raw(7, 1, 2), "a == b (Unsupported type of size: 7)");

        let mixed = |act: RawScalar, exp: RawScalar| describe_raw("a", Relation::Eq, "b", act, exp);
        assert_eq!(
            mixed(RawScalar::new(3, 0), RawScalar::new(8, 0)),
            "a == b (Unsupported type of size: 3)"
        );
        assert_eq!(
            mixed(RawScalar::new(3, 0), RawScalar::new(5, 0)),
            "a == b (Unsupported type of size: 3)"
        );
        assert_eq!(
            mixed(RawScalar::new(2, 1), RawScalar::new(6, 1)),
            "a == b (Unsupported type of size: 6)"
        );
        assert_eq!(
            mixed(RawScalar::new(1, 0x1FF), RawScalar::new(2, 0xFF)),
            "a == b (00FF == 00FF)"
        );
        assert!(Scalar::from_raw(16, 0).is_err());
    }

    #[test]
    fn mixed_widths_render_at_the_wider_one() {
        let line = describe("x", Relation::Ne, "y", 5u8.into_scalar(), 5u32.into_scalar());
        assert_eq!(line, "x != y (00000005 != 00000005)");
    }

    #[test]
    fn signed_values_keep_their_bit_pattern() {
        assert_eq!((-1i32).into_scalar().render(), "FFFFFFFF");
        assert_eq!((-1i8).into_scalar().render(), "11111111");
        assert_eq!(true.into_scalar().render(), "1");
        assert_eq!('A'.into_scalar(), Scalar::Int(65));
    }

    #[test]
    fn masked_line_shows_mask() {
        let line = describe_masked("a", Relation::Eq, "b", Scalar::Bit(false), Scalar::Bit(true), 0);
        assert_eq!(line, "a == b (0 == 1) & 00000000");

        let line = describe_masked("a", Relation::Eq, "b", Scalar::Byte(0x0F), Scalar::Byte(0x1F), 0x10);
        assert_eq!(line, "a == b (00001111 == 00011111) & 00010000");

        let line = describe_masked("a", Relation::Eq, "b", Scalar::Short(1), Scalar::Short(3), 0x02);
        assert_eq!(line, "a == b (0001 == 0003) & 00000010");

        let line = describe_masked("a", Relation::Ne, "b", Scalar::Long(1), Scalar::Long(1), 0x0101);
        assert_eq!(line, "a != b (0000000000000001 != 0000000000000001) & 00000001");
    }

    #[test]
    fn masked_eq_ignores_unmasked_bits() {
        assert!(masked_eq(Scalar::Byte(0b1010), Scalar::Byte(0b0010), 0b0111));
        assert!(!masked_eq(Scalar::Byte(0b1010), Scalar::Byte(0b0010), 0b1000));
        assert!(masked_eq(Scalar::Long(u64::MAX), Scalar::Long(0), 0));
    }

    #[test]
    fn relations_hold() {
        assert!(Relation::Gt.holds(&2, &1));
        assert!(!Relation::Gt.holds(&1, &1));
        assert!(Relation::Ge.holds(&1, &1));
        assert!(Relation::Lt.holds("a", "b"));
        assert!(Relation::Le.holds(&1.0, &1.0));
        assert!(Relation::Ne.holds(&true, &false));
        assert_eq!(Relation::Ge.to_string(), ">=");
    }
}
