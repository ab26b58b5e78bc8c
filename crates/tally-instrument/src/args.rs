//! Rendering of call arguments for the `:inputs` history.
//!
//! Arguments are rendered as a parenthesized tuple of literal-style values:
//! `('a',)`, `(b'\x00\xff',)`, `(1, 2.5)`. Single-element tuples carry a
//! trailing comma, strings are single-quoted and byte strings get a `b`
//! prefix. Inspection tooling reads these strings back verbatim, so the
//! format must stay stable.

use std::fmt::Write;

/// A single argument value with a literal-style rendering.
pub trait ArgRepr {
    fn repr(&self) -> String;
}

/// The full argument list of an instrumented call.
pub trait CallArgs {
    fn render(&self) -> String;
}

/// Quote `text` with single quotes, escaping backslashes, quotes and
/// control characters.
pub fn quote_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Render `bytes` as a `b'...'` literal. Printable ASCII is kept, everything
/// else is hex-escaped.
pub fn quote_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push_str("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push('\'');
    out
}

impl ArgRepr for str {
    fn repr(&self) -> String {
        quote_text(self)
    }
}

impl ArgRepr for String {
    fn repr(&self) -> String {
        quote_text(self)
    }
}

impl ArgRepr for [u8] {
    fn repr(&self) -> String {
        quote_bytes(self)
    }
}

impl ArgRepr for Vec<u8> {
    fn repr(&self) -> String {
        quote_bytes(self)
    }
}

impl ArgRepr for f64 {
    fn repr(&self) -> String {
        format!("{self:?}")
    }
}

impl ArgRepr for bool {
    fn repr(&self) -> String {
        let text = if *self { "True" } else { "False" };
        text.to_string()
    }
}

impl<T: ArgRepr + ?Sized> ArgRepr for &T {
    fn repr(&self) -> String {
        (**self).repr()
    }
}

impl<T: ArgRepr> ArgRepr for Option<T> {
    fn repr(&self) -> String {
        match self {
            Some(value) => value.repr(),
            None => "None".to_string(),
        }
    }
}

macro_rules! int_repr {
    ($($t:ty),*) => {
        $(impl ArgRepr for $t {
            fn repr(&self) -> String {
                self.to_string()
            }
        })*
    };
}

int_repr!(i32, i64, u32, u64, usize);

impl CallArgs for () {
    fn render(&self) -> String {
        "()".to_string()
    }
}

impl<A: ArgRepr> CallArgs for (A,) {
    fn render(&self) -> String {
        format!("({},)", self.0.repr())
    }
}

macro_rules! tuple_args {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: ArgRepr),+> CallArgs for ($($name,)+) {
            fn render(&self) -> String {
                let parts = [$(self.$idx.repr()),+];
                format!("({})", parts.join(", "))
            }
        }
    };
}

tuple_args!(A: 0, B: 1);
tuple_args!(A: 0, B: 1, C: 2);
tuple_args!(A: 0, B: 1, C: 2, D: 3);
