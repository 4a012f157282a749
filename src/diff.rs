//! First-divergence location for text sequences.
//!
//! Given an actual and an expected sequence (bytes or wide characters), find
//! the first index where they differ, the line and column of that index, and
//! the extent of each side's line containing it. Line tracking follows the
//! expected sequence's line breaks. The rendered lines escape control
//! characters, and the caret offset compensates for the extra width those
//! escapes add before the divergence column.

// ============================================================================
// UNITS
// ============================================================================

/// Element type of a diffable sequence.
pub trait DiffUnit: Copy + Eq {
    const NEWLINE: Self;
    /// Wide units label their lines `exp(N): ` instead of `exp:N: `.
    const WIDE: bool;

    /// Literal escape shown in place of a control character.
    fn escape(self) -> Option<&'static str>;

    /// Renders a run of units that need no escaping.
    fn render(units: &[Self]) -> String;
}

fn escape_code(code: u32) -> Option<&'static str> {
    match code {
        0x0A => Some("\\n"),
        0x0D => Some("\\r"),
        0x09 => Some("\\t"),
        0x1B => Some("\\033"),
        _ => None,
    }
}

impl DiffUnit for u8 {
    const NEWLINE: Self = b'\n';
    const WIDE: bool = false;

    fn escape(self) -> Option<&'static str> {
        escape_code(self as u32)
    }

    fn render(units: &[Self]) -> String {
        String::from_utf8_lossy(units).into_owned()
    }
}

impl DiffUnit for char {
    const NEWLINE: Self = '\n';
    const WIDE: bool = true;

    fn escape(self) -> Option<&'static str> {
        escape_code(self as u32)
    }

    fn render(units: &[Self]) -> String {
        units.iter().collect()
    }
}

// ============================================================================
// EQUALITY RULES
// ============================================================================

/// Both absent is equal, one absent is unequal, otherwise length and content.
pub fn seq_eq<T: Eq>(act: Option<&[T]>, exp: Option<&[T]>) -> bool {
    match (act, exp) {
        (None, None) => true,
        (Some(a), Some(e)) => a == e,
        _ => false,
    }
}

/// Compares the first `n` units. Fails outright unless the expected side is
/// exactly `n` long; the actual side is only required to hold `n` matching
/// units.
pub fn seqn_eq<T: Eq>(act: Option<&[T]>, exp: Option<&[T]>, n: usize) -> bool {
    if exp.map_or(0, <[T]>::len) != n {
        return false;
    }
    match (act, exp) {
        (None, None) => true,
        (Some(a), Some(e)) => a.get(..n) == Some(e),
        _ => false,
    }
}

pub fn str_eq(act: Option<&str>, exp: Option<&str>) -> bool {
    seq_eq(act.map(str::as_bytes), exp.map(str::as_bytes))
}

pub fn strn_eq(act: Option<&str>, exp: Option<&str>, n: usize) -> bool {
    seqn_eq(act.map(str::as_bytes), exp.map(str::as_bytes), n)
}

pub fn wstr_eq(act: Option<&[char]>, exp: Option<&[char]>) -> bool {
    seq_eq(act, exp)
}

pub fn wstrn_eq(act: Option<&[char]>, exp: Option<&[char]>, n: usize) -> bool {
    seqn_eq(act, exp, n)
}

// ============================================================================
// LOCATOR
// ============================================================================

/// Where two sequences first differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    /// First differing index, or the common length when there is none.
    pub index: usize,
    /// Newlines of the expected side passed before `index`.
    pub line: usize,
    pub column: usize,
    /// Start of the divergent line, shared by both sides.
    pub line_start: usize,
    /// End (exclusive, newline included) of the expected side's divergent line.
    pub exp_end: usize,
    /// End (exclusive, newline included) of the actual side's divergent line.
    pub act_end: usize,
}

/// Scans both sequences up to the longer length. Positions past a
/// sequence's end compare as a terminator distinct from every real unit.
pub fn locate<T: DiffUnit>(act: &[T], exp: &[T]) -> Divergence {
    let len = act.len().max(exp.len());
    let mut line = 0;
    let mut column = 0;
    let mut line_start = 0;
    let mut index = None;
    let mut exp_end = None;
    let mut act_end = None;

    for i in 0..len {
        let e = exp.get(i).copied();
        let a = act.get(i).copied();

        if index.is_none() && a != e {
            index = Some(i);
        }

        if index.is_none() {
            if e == Some(T::NEWLINE) {
                line += 1;
                column = 0;
                line_start = i + 1;
            } else {
                column += 1;
            }
            continue;
        }

        if exp_end.is_none() && e == Some(T::NEWLINE) {
            exp_end = Some(i + 1);
        }
        if act_end.is_none() && a == Some(T::NEWLINE) {
            act_end = Some(i + 1);
        }
        if exp_end.is_some() && act_end.is_some() {
            break;
        }
    }

    let divergence = Divergence {
        index: index.unwrap_or(len),
        line,
        column,
        line_start,
        exp_end: exp_end.unwrap_or(exp.len()),
        act_end: act_end.unwrap_or(act.len()),
    };
    tracing::trace!(
        index = divergence.index,
        line = divergence.line,
        column = divergence.column,
        "divergence located"
    );
    divergence
}

// ============================================================================
// RENDERING
// ============================================================================

/// A line with its control characters escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedLine {
    pub text: String,
    /// Extra rendered characters contributed by escapes up to and
    /// including the divergence column.
    pub growth: usize,
}

pub fn escape_line<T: DiffUnit>(line: &[T], column: usize) -> EscapedLine {
    let mut text = String::new();
    let mut growth = 0;
    let mut run = 0;

    for (i, unit) in line.iter().enumerate() {
        if let Some(escaped) = unit.escape() {
            text.push_str(&T::render(&line[run..i]));
            text.push_str(escaped);
            run = i + 1;
            if i <= column {
                growth += escaped.len() - 1;
            }
        }
    }
    text.push_str(&T::render(&line[run..]));

    EscapedLine { text, growth }
}

/// Everything needed to print an `exp`/`act`/caret triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub divergence: Divergence,
    pub exp: EscapedLine,
    pub act: EscapedLine,
    pub wide: bool,
}

impl DiffReport {
    pub fn new<T: DiffUnit>(act: &[T], exp: &[T]) -> Self {
        let divergence = locate(act, exp);
        let Divergence {
            column,
            line_start,
            exp_end,
            act_end,
            ..
        } = divergence;

        Self {
            divergence,
            exp: escape_line(&exp[line_start..exp_end], column),
            act: escape_line(&act[line_start..act_end], column),
            wide: T::WIDE,
        }
    }

    /// `exp:<line>: ` for bytes, `exp(<line>): ` for wide units.
    pub fn header(&self, label: &str) -> String {
        let line = self.divergence.line;
        if self.wide {
            format!("{label}({line}): ")
        } else {
            format!("{label}:{line}: ")
        }
    }

    /// Spaces before the caret on the line under `exp`/`act`. An escape at
    /// the divergence column counts, so the caret lands on the first
    /// rendered character where the lines differ.
    pub fn caret_offset(&self) -> usize {
        self.header("act").len() + self.exp.growth.min(self.act.growth) + self.divergence.column
    }
}
