//! Assertion macros.
//!
//! Thin sugar over the [`TestCase`](crate::TestCase) methods: each macro
//! records the call site and the source text of its operands, so failure
//! lines read `file.rs:12: len == 3 (...)`. The first argument is the test
//! case, e.g. `expect_eq!(t, v.len(), 3)`.

/// The current `file:line` as a [`Site`](crate::Site).
#[macro_export]
macro_rules! site {
    () => {
        $crate::Site::new(file!(), line!())
    };
}

/// Boolean check; the failure line is the condition's source text.
#[macro_export]
macro_rules! expect {
    ($t:expr, $cond:expr) => {
        $t.expect($crate::site!(), $cond, stringify!($cond))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __expect_cmp {
    ($t:expr, $rel:ident, $act:expr, $exp:expr) => {
        $t.expect_cmp(
            $crate::site!(),
            $crate::Relation::$rel,
            $crate::Operand::new(stringify!($act), $act),
            $crate::Operand::new(stringify!($exp), $exp),
        )
    };
}

#[macro_export]
macro_rules! expect_eq {
    ($t:expr, $act:expr, $exp:expr) => {
        $crate::__expect_cmp!($t, Eq, $act, $exp)
    };
}

#[macro_export]
macro_rules! expect_ne {
    ($t:expr, $act:expr, $exp:expr) => {
        $crate::__expect_cmp!($t, Ne, $act, $exp)
    };
}

#[macro_export]
macro_rules! expect_gt {
    ($t:expr, $act:expr, $exp:expr) => {
        $crate::__expect_cmp!($t, Gt, $act, $exp)
    };
}

#[macro_export]
macro_rules! expect_ge {
    ($t:expr, $act:expr, $exp:expr) => {
        $crate::__expect_cmp!($t, Ge, $act, $exp)
    };
}

#[macro_export]
macro_rules! expect_lt {
    ($t:expr, $act:expr, $exp:expr) => {
        $crate::__expect_cmp!($t, Lt, $act, $exp)
    };
}

#[macro_export]
macro_rules! expect_le {
    ($t:expr, $act:expr, $exp:expr) => {
        $crate::__expect_cmp!($t, Le, $act, $exp)
    };
}

/// Masked equality: holds iff `(act ^ exp) & mask == 0`.
#[macro_export]
macro_rules! expect_eqm {
    ($t:expr, $act:expr, $exp:expr, $mask:expr) => {
        $t.expect_masked(
            $crate::site!(),
            $crate::Relation::Eq,
            $crate::Operand::new(stringify!($act), $act),
            $crate::Operand::new(stringify!($exp), $exp),
            ($mask) as u64,
        )
    };
}

/// Masked inequality: holds iff `(act ^ exp) & mask != 0`.
#[macro_export]
macro_rules! expect_nem {
    ($t:expr, $act:expr, $exp:expr, $mask:expr) => {
        $t.expect_masked(
            $crate::site!(),
            $crate::Relation::Ne,
            $crate::Operand::new(stringify!($act), $act),
            $crate::Operand::new(stringify!($exp), $exp),
            ($mask) as u64,
        )
    };
}

/// String equality for anything that borrows as `str`.
#[macro_export]
macro_rules! expect_str {
    ($t:expr, $act:expr, $exp:expr) => {
        $t.expect_str(
            $crate::site!(),
            ::core::option::Option::Some(::core::convert::AsRef::<str>::as_ref(&$act)),
            ::core::option::Option::Some(::core::convert::AsRef::<str>::as_ref(&$exp)),
        )
    };
}

#[macro_export]
macro_rules! expect_strn {
    ($t:expr, $act:expr, $exp:expr, $n:expr) => {
        $t.expect_strn(
            $crate::site!(),
            ::core::option::Option::Some(::core::convert::AsRef::<str>::as_ref(&$act)),
            ::core::option::Option::Some(::core::convert::AsRef::<str>::as_ref(&$exp)),
            $n,
        )
    };
}

/// Wide string equality for anything that borrows as `[char]`.
#[macro_export]
macro_rules! expect_wstr {
    ($t:expr, $act:expr, $exp:expr) => {
        $t.expect_wstr(
            $crate::site!(),
            ::core::option::Option::Some(::core::convert::AsRef::<[char]>::as_ref(&$act)),
            ::core::option::Option::Some(::core::convert::AsRef::<[char]>::as_ref(&$exp)),
        )
    };
}

#[macro_export]
macro_rules! expect_wstrn {
    ($t:expr, $act:expr, $exp:expr, $n:expr) => {
        $t.expect_wstrn(
            $crate::site!(),
            ::core::option::Option::Some(::core::convert::AsRef::<[char]>::as_ref(&$act)),
            ::core::option::Option::Some(::core::convert::AsRef::<[char]>::as_ref(&$exp)),
            $n,
        )
    };
}

/// Scans `input` with `fmt` and expects `count` fields; yields the fields.
#[macro_export]
macro_rules! expect_fmt {
    ($t:expr, $input:expr, $count:expr, $fmt:expr) => {
        $t.expect_fmt(
            $crate::site!(),
            ::core::convert::AsRef::<str>::as_ref(&$input),
            $count,
            $fmt,
        )
    };
}

/// Unconditional failure with a formatted message.
#[macro_export]
macro_rules! expect_fail {
    ($t:expr, $($arg:tt)+) => {
        $t.fail(format_args!($($arg)+))
    };
}

/// Captured output: `print` receives the scratch buffer.
#[macro_export]
macro_rules! expect_output {
    ($t:expr, $expected:expr, $print:expr) => {
        $t.expect_output($crate::site!(), $expected, $print)
    };
}
