//! Key templates
//!
//! A template is resolved once per operation. Resolution is pure: the same
//! template and arguments always give the same bytes, and a malformed
//! template never yields a partial key.
//!
//! | Verb | Accepts                 | Output                        |
//! |------|-------------------------|-------------------------------|
//! | `%s` | strings, bytes, numbers | raw bytes / decimal digits    |
//! | `%d` | numbers                 | decimal digits                |
//! | `%x` | strings, bytes, numbers | lowercase hex                 |
//! | `%%` | -                       | a literal `%`                 |

use std::fmt::Write as _;

use crate::error::{Result, StoreError};

/// A single template substitution value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyArg<'a> {
    Str(&'a str),
    Bytes(&'a [u8]),
    Int(i64),
    UInt(u64),
}

impl KeyArg<'_> {
    fn kind(&self) -> &'static str {
        match self {
            KeyArg::Str(_) => "string",
            KeyArg::Bytes(_) => "bytes",
            KeyArg::Int(_) | KeyArg::UInt(_) => "integer",
        }
    }

    fn write_plain(&self, out: &mut Vec<u8>) {
        match self {
            KeyArg::Str(s) => out.extend_from_slice(s.as_bytes()),
            KeyArg::Bytes(b) => out.extend_from_slice(b),
            KeyArg::Int(n) => out.extend_from_slice(n.to_string().as_bytes()),
            KeyArg::UInt(n) => out.extend_from_slice(n.to_string().as_bytes()),
        }
    }

    fn write_hex(&self, out: &mut Vec<u8>) {
        let mut hex = String::new();
        match self {
            KeyArg::Str(s) => s.bytes().for_each(|b| {
                let _ = write!(hex, "{:02x}", b);
            }),
            KeyArg::Bytes(bytes) => bytes.iter().for_each(|b| {
                let _ = write!(hex, "{:02x}", b);
            }),
            KeyArg::Int(n) => {
                let _ = write!(hex, "{:x}", n);
            }
            KeyArg::UInt(n) => {
                let _ = write!(hex, "{:x}", n);
            }
        }
        out.extend_from_slice(hex.as_bytes());
    }
}

impl<'a> From<&'a str> for KeyArg<'a> {
    fn from(s: &'a str) -> Self {
        KeyArg::Str(s)
    }
}

impl<'a> From<&'a String> for KeyArg<'a> {
    fn from(s: &'a String) -> Self {
        KeyArg::Str(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for KeyArg<'a> {
    fn from(b: &'a [u8]) -> Self {
        KeyArg::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for KeyArg<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        KeyArg::Bytes(b.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for KeyArg<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        KeyArg::Bytes(b.as_slice())
    }
}

macro_rules! int_key_arg {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for KeyArg<'_> {
                fn from(n: $t) -> Self {
                    KeyArg::$variant(n as $wide)
                }
            }
        )*
    };
}

int_key_arg!(Int as i64: i8, i16, i32, i64, isize);
int_key_arg!(UInt as u64: u8, u16, u32, u64, usize);

/// Resolve `template` against `args` into a raw key
pub fn format_key(template: &str, args: &[KeyArg<'_>]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(template.len() + 16);
    let mut args_iter = args.iter();
    let mut used = 0usize;
    let mut chars = template.char_indices();

    while let Some((pos, c)) = chars.next() {
        if c != '%' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let verb = match chars.next() {
            Some((_, verb)) => verb,
            None => {
                return Err(StoreError::Template(format!(
                    "{:?}: dangling '%' at offset {}",
                    template, pos
                )))
            }
        };
        if verb == '%' {
            out.push(b'%');
            continue;
        }

        let arg = args_iter.next().ok_or_else(|| {
            StoreError::Template(format!(
                "{:?}: missing argument for %{} at offset {}",
                template, verb, pos
            ))
        })?;
        used += 1;

        match verb {
            's' => arg.write_plain(&mut out),
            'x' => arg.write_hex(&mut out),
            'd' => match arg {
                KeyArg::Int(_) | KeyArg::UInt(_) => arg.write_plain(&mut out),
                other => {
                    return Err(StoreError::Template(format!(
                        "{:?}: %d expects an integer, got {}",
                        template,
                        other.kind()
                    )))
                }
            },
            other => {
                return Err(StoreError::Template(format!(
                    "{:?}: unknown verb %{}",
                    template, other
                )))
            }
        }
    }

    if used != args.len() {
        return Err(StoreError::Template(format!(
            "{:?}: {} argument(s) supplied, {} used",
            template,
            args.len(),
            used
        )));
    }

    Ok(out)
}
