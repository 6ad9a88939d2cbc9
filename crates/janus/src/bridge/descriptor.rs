//! JVM type and method descriptors (JVMS §4.3).
//!
//! Descriptors are the overload discriminator in declaration keys. The
//! bridge validates them and uses their shape to recognize getters and
//! setters.

use std::fmt;

use thiserror::Error;

/// A field type: `I`, `Ljava/lang/String;`, `[[J`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// One of `BCDFIJSZ`
    Base(char),
    /// Internal class name, e.g. `java/lang/String`
    Object(String),
    /// Array of the inner type
    Array(Box<FieldType>),
}

/// A method descriptor `(params)ret`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    /// Parameter types in order
    pub params: Vec<FieldType>,
    /// Return type; `None` for `V`
    pub ret: Option<FieldType>,
}

/// A descriptor that does not follow the JVM grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed descriptor {input:?} at byte {position}: {reason}")]
pub struct DescriptorError {
    /// The rejected descriptor
    pub input: String,
    /// Byte offset of the problem
    pub position: usize,
    /// What was expected
    pub reason: &'static str,
}

struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn fail(&self, reason: &'static str) -> DescriptorError {
        DescriptorError {
            input: self.input.to_string(),
            position: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn field_type(&mut self) -> Result<FieldType, DescriptorError> {
        match self.peek() {
            Some(b @ (b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z')) => {
                self.pos += 1;
                Ok(FieldType::Base(char::from(b)))
            }
            Some(b'L') => {
                let start = self.pos + 1;
                let len = self.bytes[start..]
                    .iter()
                    .position(|&b| b == b';')
                    .ok_or_else(|| self.fail("unterminated class name"))?;
                if len == 0 {
                    return Err(self.fail("empty class name"));
                }
                self.pos = start + len + 1;
                Ok(FieldType::Object(self.input[start..start + len].to_string()))
            }
            Some(b'[') => {
                self.pos += 1;
                Ok(FieldType::Array(Box::new(self.field_type()?)))
            }
            Some(_) => Err(self.fail("expected a field type")),
            None => Err(self.fail("unexpected end")),
        }
    }

    fn finish(&self) -> Result<(), DescriptorError> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(self.fail("trailing characters"))
        }
    }
}

/// Parse a field descriptor.
///
/// # Errors
///
/// Returns `DescriptorError` if `input` is not exactly one field type.
pub fn parse_field(input: &str) -> Result<FieldType, DescriptorError> {
    let mut cursor = Cursor::new(input);
    let ty = cursor.field_type()?;
    cursor.finish()?;
    Ok(ty)
}

/// Parse a method descriptor.
///
/// # Errors
///
/// Returns `DescriptorError` if `input` does not match `(FieldType*)ReturnType`.
pub fn parse_method(input: &str) -> Result<MethodDescriptor, DescriptorError> {
    let mut cursor = Cursor::new(input);
    if cursor.peek() != Some(b'(') {
        return Err(cursor.fail("expected '('"));
    }
    cursor.pos += 1;

    let mut params = Vec::new();
    while cursor.peek() != Some(b')') {
        if cursor.peek().is_none() {
            return Err(cursor.fail("unterminated parameter list"));
        }
        params.push(cursor.field_type()?);
    }
    cursor.pos += 1;

    let ret = if cursor.peek() == Some(b'V') {
        cursor.pos += 1;
        None
    } else {
        Some(cursor.field_type()?)
    };
    cursor.finish()?;

    Ok(MethodDescriptor { params, ret })
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(c) => write!(f, "{c}"),
            Self::Object(name) => write!(f, "L{name};"),
            Self::Array(inner) => write!(f, "[{inner}"),
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        match &self.ret {
            Some(ret) => write!(f, "{ret}"),
            None => f.write_str("V"),
        }
    }
}

impl MethodDescriptor {
    /// Descriptor of a getter returning `ty`.
    #[must_use]
    pub fn getter(ty: FieldType) -> Self {
        Self {
            params: Vec::new(),
            ret: Some(ty),
        }
    }

    /// Descriptor of a setter taking `ty`.
    #[must_use]
    pub fn setter(ty: FieldType) -> Self {
        Self {
            params: vec![ty],
            ret: None,
        }
    }

    /// No parameters and a non-void result.
    #[must_use]
    pub fn is_getter_shaped(&self) -> bool {
        self.params.is_empty() && self.ret.is_some()
    }

    /// One parameter and a void result.
    #[must_use]
    pub fn is_setter_shaped(&self) -> bool {
        self.params.len() == 1 && self.ret.is_none()
    }

    /// Whether the result is `boolean`.
    #[must_use]
    pub fn returns_boolean(&self) -> bool {
        self.ret == Some(FieldType::Base('Z'))
    }
}
