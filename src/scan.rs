//! Formatted extraction for `expect_fmt`.
//!
//! The harness only needs to know how many fields of a scanf-style format an
//! input string satisfies. [`FormatScanner`] implements the common subset:
//! `%d %i %u %x %X %o %f %c %s %%`, field widths, `*` suppression and ignored
//! length modifiers. A whitespace directive matches any run of whitespace
//! and other literal characters must match exactly. Scanning stops at the
//! first mismatch; the fields extracted up to that point are returned.

use crate::error::HarnessError;

/// One extracted field.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanValue {
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(String),
    Str(String),
}

/// Scan capability consumed by the session.
pub trait Scanner {
    fn scan(&self, input: &str, fmt: &str) -> Result<Vec<ScanValue>, HarnessError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FormatScanner;

impl Scanner for FormatScanner {
    fn scan(&self, input: &str, fmt: &str) -> Result<Vec<ScanValue>, HarnessError> {
        Scan::new(input, fmt).run()
    }
}

struct Scan<'a> {
    fmt_src: &'a str,
    fmt: Vec<char>,
    input: Vec<char>,
    fi: usize,
    ii: usize,
}

impl<'a> Scan<'a> {
    fn new(input: &str, fmt: &'a str) -> Self {
        Self {
            fmt_src: fmt,
            fmt: fmt.chars().collect(),
            input: input.chars().collect(),
            fi: 0,
            ii: 0,
        }
    }

    fn malformed(&self) -> HarnessError {
        HarnessError::ScanFormat {
            fmt: self.fmt_src.to_string(),
            position: self.fmt[..self.fi.min(self.fmt.len())]
                .iter()
                .map(|c| c.len_utf8())
                .sum(),
        }
    }

    fn skip_input_whitespace(&mut self) {
        while self.input.get(self.ii).is_some_and(|c| c.is_whitespace()) {
            self.ii += 1;
        }
    }

    fn run(mut self) -> Result<Vec<ScanValue>, HarnessError> {
        let mut values = Vec::new();

        while let Some(&c) = self.fmt.get(self.fi) {
            if c.is_whitespace() {
                while self.fmt.get(self.fi).is_some_and(|c| c.is_whitespace()) {
                    self.fi += 1;
                }
                self.skip_input_whitespace();
                continue;
            }

            if c != '%' {
                if self.input.get(self.ii) != Some(&c) {
                    break;
                }
                self.fi += 1;
                self.ii += 1;
                continue;
            }

            self.fi += 1;
            if self.fmt.get(self.fi) == Some(&'%') {
                self.fi += 1;
                self.skip_input_whitespace();
                if self.input.get(self.ii) != Some(&'%') {
                    break;
                }
                self.ii += 1;
                continue;
            }

            let spec = self.conversion()?;
            if spec.conv != 'c' {
                self.skip_input_whitespace();
            }
            if self.ii >= self.input.len() {
                break;
            }
            match self.field(&spec) {
                Some(value) if !spec.suppress => values.push(value),
                Some(_) => {}
                None => break,
            }
        }

        Ok(values)
    }

    /// Parses `[*][width][length]conv` after a `%`.
    fn conversion(&mut self) -> Result<Conversion, HarnessError> {
        let suppress = self.fmt.get(self.fi) == Some(&'*');
        if suppress {
            self.fi += 1;
        }

        let mut width = None;
        while let Some(d) = self.fmt.get(self.fi).and_then(|c| c.to_digit(10)) {
            width = Some(width.unwrap_or(0) * 10 + d as usize);
            self.fi += 1;
        }
        if width == Some(0) {
            return Err(self.malformed());
        }

        while self
            .fmt
            .get(self.fi)
            .is_some_and(|c| matches!(c, 'h' | 'l' | 'L' | 'z' | 'j' | 't'))
        {
            self.fi += 1;
        }

        match self.fmt.get(self.fi) {
            Some(&conv) if "diuxXofcs".contains(conv) => {
                self.fi += 1;
                Ok(Conversion {
                    conv,
                    width,
                    suppress,
                })
            }
            _ => Err(self.malformed()),
        }
    }

    /// Consumes up to `limit` input chars accepted by `accept`.
    fn take_while(&mut self, limit: usize, accept: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while taken.chars().count() < limit {
            match self.input.get(self.ii) {
                Some(&c) if accept(c) => {
                    taken.push(c);
                    self.ii += 1;
                }
                _ => break,
            }
        }
        taken
    }

    fn field(&mut self, spec: &Conversion) -> Option<ScanValue> {
        let limit = spec.width.unwrap_or(usize::MAX);
        match spec.conv {
            'c' => {
                let count = spec.width.unwrap_or(1);
                if self.input.len() - self.ii < count {
                    return None;
                }
                let taken: String = self.input[self.ii..self.ii + count].iter().collect();
                self.ii += count;
                Some(ScanValue::Char(taken))
            }
            's' => {
                let taken = self.take_while(limit, |c| !c.is_whitespace());
                (!taken.is_empty()).then_some(ScanValue::Str(taken))
            }
            'f' => self.float(limit),
            conv => self.integer(conv, limit),
        }
    }

    fn integer(&mut self, conv: char, limit: usize) -> Option<ScanValue> {
        let start = self.ii;
        let mut budget = limit;
        let negative = match self.input.get(self.ii) {
            Some(&sign @ ('+' | '-')) if budget > 1 => {
                self.ii += 1;
                budget -= 1;
                sign == '-'
            }
            _ => false,
        };

        let radix = match conv {
            'x' | 'X' => 16,
            'o' => 8,
            'i' => self.detect_radix(&mut budget),
            _ => 10,
        };
        let digits = self.take_while(budget, |c| c.is_digit(radix));
        if digits.is_empty() {
            self.ii = start;
            return None;
        }

        let magnitude = u64::from_str_radix(&digits, radix).ok()?;
        match conv {
            'd' | 'i' => {
                let value = i64::try_from(magnitude).ok()?;
                Some(ScanValue::Int(if negative { -value } else { value }))
            }
            _ => Some(ScanValue::Uint(if negative {
                magnitude.wrapping_neg()
            } else {
                magnitude
            })),
        }
    }

    /// `%i` base detection: `0x` hex, leading `0` octal, decimal otherwise.
    fn detect_radix(&mut self, budget: &mut usize) -> u32 {
        let next = |offset: usize| self.input.get(self.ii + offset).copied();
        match (next(0), next(1), next(2)) {
            (Some('0'), Some('x' | 'X'), Some(c)) if *budget > 2 && c.is_ascii_hexdigit() => {
                self.ii += 2;
                *budget -= 2;
                16
            }
            (Some('0'), _, _) => 8,
            _ => 10,
        }
    }

    fn float(&mut self, limit: usize) -> Option<ScanValue> {
        let start = self.ii;
        let mut text = self.take_while(1, |c| c == '+' || c == '-');
        let remaining = |text: &String| limit.saturating_sub(text.chars().count());

        let whole = self.take_while(remaining(&text), |c| c.is_ascii_digit());
        text.push_str(&whole);
        let mut fraction = String::new();
        if remaining(&text) > 0 && self.input.get(self.ii) == Some(&'.') {
            self.ii += 1;
            text.push('.');
            fraction = self.take_while(remaining(&text), |c| c.is_ascii_digit());
            text.push_str(&fraction);
        }
        if whole.is_empty() && fraction.is_empty() {
            self.ii = start;
            return None;
        }

        if remaining(&text) > 1 && matches!(self.input.get(self.ii), Some('e' | 'E')) {
            let mark = self.ii;
            let mut exponent = String::from("e");
            self.ii += 1;
            exponent.push_str(&self.take_while(1, |c| c == '+' || c == '-'));
            let digits = self.take_while(remaining(&text).saturating_sub(exponent.len()), |c| {
                c.is_ascii_digit()
            });
            if digits.is_empty() {
                self.ii = mark;
            } else {
                text.push_str(&exponent);
                text.push_str(&digits);
            }
        }

        text.parse().ok().map(ScanValue::Float)
    }
}

struct Conversion {
    conv: char,
    width: Option<usize>,
    suppress: bool,
}

#[cfg(test)]
mod scan_tests {
    use super::*;

    fn scan(input: &str, fmt: &str) -> Vec<ScanValue> {
        FormatScanner.scan(input, fmt).unwrap()
    }

    #[test]
    fn width_limited_unsigned() {
        assert_eq!(scan("123", "%3u"), vec![ScanValue::Uint(123)]);
        assert_eq!(scan("12345", "%3u"), vec![ScanValue::Uint(123)]);
        assert!(scan("aaa", "%3u").is_empty());
    }

    #[test]
    fn literals_and_whitespace() {
        assert_eq!(
            scan("x = -42,  0x1f", "x = %d, %i"),
            vec![ScanValue::Int(-42), ScanValue::Int(31)]
        );
        assert_eq!(scan("a:b", "a-%s"), vec![]);
        assert_eq!(scan("100%", "%d%%"), vec![ScanValue::Int(100)]);
    }

    #[test]
    fn stops_at_first_mismatch() {
        assert_eq!(
            scan("7 apples", "%d %d"),
            vec![ScanValue::Int(7)]
        );
    }

    #[test]
    fn suppressed_fields_are_not_counted() {
        assert_eq!(scan("1 2 3", "%*d %d %*d"), vec![ScanValue::Int(2)]);
    }

    #[test]
    fn strings_chars_and_radixes() {
        assert_eq!(
            scan("  hello world", "%s%c%2c"),
            vec![
                ScanValue::Str("hello".into()),
                ScanValue::Char(" ".into()),
                ScanValue::Char("wo".into()),
            ]
        );
        assert_eq!(scan("ff 17", "%x %o"), vec![ScanValue::Uint(255), ScanValue::Uint(15)]);
        assert_eq!(scan("017", "%i"), vec![ScanValue::Int(15)]);
        assert_eq!(scan("abcdef", "%3s"), vec![ScanValue::Str("abc".into())]);
    }

    #[test]
    fn floats() {
        assert_eq!(scan("3.5e2", "%f"), vec![ScanValue::Float(350.0)]);
        assert_eq!(scan("-0.25x", "%lf"), vec![ScanValue::Float(-0.25)]);
        assert_eq!(scan("1.5", "%2f"), vec![ScanValue::Float(1.0)]);
        assert!(scan(".", "%f").is_empty());
    }

    #[test]
    fn malformed_formats_are_errors() {
        let err = FormatScanner.scan("1", "%q").unwrap_err();
        assert!(matches!(err, HarnessError::ScanFormat { position: 1, .. }));
        assert!(FormatScanner.scan("1", "%").is_err());
        assert!(FormatScanner.scan("1", "%0d").is_err());
    }
}
