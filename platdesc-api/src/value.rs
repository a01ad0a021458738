//! The small set of scalar value kinds that can flow from a
//! description's syntax into host constructors and property setters.
//!
//! References and inline object values are resolved to [`ObjectHandle`]s
//! by the driver before a value ever reaches the host, so they are not
//! members of this enum; see `platdesc_driver::ast::Value` for the full
//! AST-level value, which wraps a `SimpleValue` alongside
//! `Reference`/`Object` variants and a source position.

use crate::ObjectHandle;
use std::fmt;

/// A number literal as written in a description. Keeps both the
/// original text and the two numeric forms a target type might want,
/// so a single literal can satisfy an `i32` parameter in one entry and
/// an `f64` parameter in another without re-lexing.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    text: String,
    as_i64: Option<i64>,
    as_f64: Option<f64>,
}

impl NumberLiteral {
    /// Parses a decimal or `0x`-prefixed hexadecimal integer, or a
    /// floating point literal, the way the lexer recognizes them.
    pub fn parse(text: &str) -> Option<NumberLiteral> {
        let trimmed = text.trim();
        let (neg, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        if let Some(hex) = body
            .strip_prefix("0x")
            .or_else(|| body.strip_prefix("0X"))
        {
            return i64::from_str_radix(hex, 16).ok().map(|v| {
                let v = if neg { -v } else { v };
                NumberLiteral {
                    text: trimmed.to_string(),
                    as_i64: Some(v),
                    as_f64: Some(v as f64),
                }
            });
        }

        if let Ok(v) = trimmed.parse::<i64>() {
            return Some(NumberLiteral {
                text: trimmed.to_string(),
                as_i64: Some(v),
                as_f64: Some(v as f64),
            });
        }

        if let Ok(v) = trimmed.parse::<f64>() {
            return Some(NumberLiteral {
                text: trimmed.to_string(),
                as_i64: None,
                as_f64: Some(v),
            });
        }

        None
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_i64
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_f64
    }

    pub fn is_integral(&self) -> bool {
        self.as_i64.is_some()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Tries to fit this literal into the named integral/float Rust
    /// type, the way the constructor resolver needs to for
    /// `numerical-value -> any numeric type or nullable numeric`
    /// conversions.
    pub fn fits(&self, target: NumberKind) -> bool {
        match target {
            NumberKind::I8 => self.as_i64.is_some_and(|v| i8::try_from(v).is_ok()),
            NumberKind::U8 => self.as_i64.is_some_and(|v| u8::try_from(v).is_ok()),
            NumberKind::I16 => self.as_i64.is_some_and(|v| i16::try_from(v).is_ok()),
            NumberKind::U16 => self.as_i64.is_some_and(|v| u16::try_from(v).is_ok()),
            NumberKind::I32 => self.as_i64.is_some_and(|v| i32::try_from(v).is_ok()),
            NumberKind::U32 => self.as_i64.is_some_and(|v| u32::try_from(v).is_ok()),
            NumberKind::I64 => self.as_i64.is_some(),
            NumberKind::U64 => self.as_i64.is_some_and(|v| v >= 0),
            NumberKind::F32 | NumberKind::F64 => self.as_f64.is_some(),
        }
    }
}

impl fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// The concrete numeric Rust types a constructor/property parameter
/// can declare; used only to drive `NumberLiteral::fits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

/// `[Namespace.]TypeName.Member`, stored tail-first (member first, then
/// the enclosing type, then each namespace segment outward) so that
/// comparison against a target enum's namespace can walk both from the
/// member outward and stop at the first mismatch, per the spec's
/// enum-mismatch diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumLiteral {
    /// `[member, type, namespace..., outermost]`
    reversed_path: Vec<String>,
}

impl EnumLiteral {
    pub fn new(dotted: &str) -> EnumLiteral {
        let mut segments: Vec<String> =
            dotted.split('.').map(str::to_string).collect();
        segments.reverse();
        EnumLiteral {
            reversed_path: segments,
        }
    }

    pub fn member(&self) -> &str {
        self.reversed_path.first().map(String::as_str).unwrap_or("")
    }

    pub fn reversed_path(&self) -> &[String] {
        &self.reversed_path
    }
}

impl fmt::Display for EnumLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forward: Vec<&str> =
            self.reversed_path.iter().rev().map(String::as_str).collect();
        write!(f, "{}", forward.join("."))
    }
}

/// A scalar value ready to be handed to a host constructor parameter
/// or property setter. See the module docs for why references and
/// object-values are not represented here.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleValue {
    String(String),
    Bool(bool),
    Number(NumberLiteral),
    /// `<a, b>`
    Range(i64, i64),
    Enum(EnumLiteral),
    /// The literal `none` used as a simple value (as opposed to a
    /// cancelling attribute value, which the driver handles before a
    /// value ever reaches this type).
    Empty,
}

impl fmt::Display for SimpleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleValue::String(v) => write!(f, "{:?}", v),
            SimpleValue::Bool(v) => write!(f, "{}", v),
            SimpleValue::Number(v) => write!(f, "{}", v),
            SimpleValue::Range(a, b) => write!(f, "<{}, {}>", a, b),
            SimpleValue::Enum(v) => write!(f, "{}", v),
            SimpleValue::Empty => write!(f, "none"),
        }
    }
}

/// What ultimately gets handed to a host constructor or setter: either
/// a scalar, or a handle to an already-built (or deferred, see the
/// builder) object.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Simple(SimpleValue),
    Object(ObjectHandle),
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Simple(v) => write!(f, "{}", v),
            HostValue::Object(h) => write!(f, "{:?}", h),
        }
    }
}
