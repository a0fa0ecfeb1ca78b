//! Type references as they appear in signatures, attributes and instruction operands.
//!
//! References are written with a compact IL-flavoured syntax so that metadata
//! dumps stay readable:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `App.Core.Order` | named type |
//! | `App.Core.Order/Line` | nested type `Line` declared in `Order` |
//! | `valuetype System.Int32` | named value type |
//! | ``System.Collections.Generic.List`1<App.Core.Order>`` | generic instantiation |
//! | `App.Core.Order[]`, `App.Core.Order[,]` | arrays (rank 1, rank 2) |
//! | `System.Byte*`, `App.Core.Order&` | pointer, by-reference |
//! | `!T`, `!!T` | unbound type / method generic parameter |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between a declaring type and its nested type.
pub const NESTED_SEPARATOR: char = '/';

/// A namespace-qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeName {
    /// Namespace (empty for the global namespace).
    pub namespace: String,
    /// Type name, including declaring types for nested types (`Outer/Inner`).
    pub name: String,
    /// Whether the named type is a value type.
    pub value_type: bool,
}

impl TypeName {
    /// Creates a reference-type name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            value_type: false,
        }
    }

    /// Splits a full name into namespace and name.
    ///
    /// The namespace ends at the last `.` before the first nested separator.
    #[must_use]
    pub fn from_full_name(full_name: &str) -> Self {
        let outer_end = full_name.find(NESTED_SEPARATOR).unwrap_or(full_name.len());
        match full_name[..outer_end].rfind('.') {
            Some(dot) => Self::new(&full_name[..dot], &full_name[dot + 1..]),
            None => Self::new("", full_name),
        }
    }

    /// Marks this name as a value type.
    #[must_use]
    pub fn value_type(mut self) -> Self {
        self.value_type = true;
        self
    }

    /// Returns `Namespace.Name`, or just `Name` in the global namespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Returns the innermost simple name (`Inner` for `Outer/Inner`).
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(NESTED_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }

    /// Whether this names a nested type.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.name.contains(NESTED_SEPARATOR)
    }

    /// Whether the simple name is one the compiler synthesises (`<>c`, `<Run>d__4`).
    #[must_use]
    pub fn has_synthetic_name(&self) -> bool {
        self.simple_name().starts_with('<')
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value_type {
            write!(f, "valuetype ")?;
        }
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

/// A reference to a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A plain named type.
    Named(TypeName),
    /// An array of the element type.
    Array {
        /// Element type.
        element: Box<TypeRef>,
        /// Number of dimensions.
        rank: u32,
    },
    /// An unmanaged pointer to the element type.
    Pointer(Box<TypeRef>),
    /// A managed by-reference to the element type.
    ByRef(Box<TypeRef>),
    /// A generic instantiation.
    Generic {
        /// The open generic definition (``List`1``).
        definition: TypeName,
        /// Instantiation arguments, in order.
        arguments: Vec<TypeRef>,
    },
    /// An unbound generic parameter.
    GenericParameter {
        /// Parameter name.
        name: String,
        /// `true` for method-level parameters (`!!T`).
        method: bool,
    },
}

impl TypeRef {
    /// Creates a named reference from a full name such as `App.Core.Order`.
    #[must_use]
    pub fn named(full_name: &str) -> Self {
        Self::Named(TypeName::from_full_name(full_name))
    }

    /// Parses the reference syntax described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or malformed.
    pub fn parse(input: &str) -> Result<Self, TypeRefParseError> {
        let mut parser = Parser { input, pos: 0 };
        let parsed = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos < input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(parsed)
    }

    /// Returns the name this reference points at once wrappers are removed.
    ///
    /// Generic instantiations yield their open definition; generic parameters
    /// yield `None`.
    #[must_use]
    pub fn element_name(&self) -> Option<&TypeName> {
        match self {
            Self::Named(name) | Self::Generic { definition: name, .. } => Some(name),
            Self::Array { element, .. } | Self::Pointer(element) | Self::ByRef(element) => {
                element.element_name()
            }
            Self::GenericParameter { .. } => None,
        }
    }

    /// Full name of the element type, if there is one.
    #[must_use]
    pub fn element_full_name(&self) -> Option<String> {
        self.element_name().map(TypeName::full_name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                write!(f, "{element}[{commas}]")
            }
            Self::Pointer(element) => write!(f, "{element}*"),
            Self::ByRef(element) => write!(f, "{element}&"),
            Self::Generic {
                definition,
                arguments,
            } => {
                write!(f, "{definition}<")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            Self::GenericParameter { name, method } => {
                let bangs = if *method { "!!" } else { "!" };
                write!(f, "{bangs}{name}")
            }
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

impl std::str::FromStr for TypeRef {
    type Err = TypeRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error parsing the type reference syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type reference `{input}` at offset {offset}: {reason}")]
pub struct TypeRefParseError {
    /// The complete input.
    pub input: String,
    /// Byte offset where parsing stopped.
    pub offset: usize,
    /// What was wrong.
    pub reason: &'static str,
}

const VALUE_TYPE_KEYWORD: &str = "valuetype";
const NAME_TERMINATORS: &[char] = &['<', '>', ',', '[', ']', '*', '&', '!'];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn error(&self, reason: &'static str) -> TypeRefParseError {
        TypeRefParseError {
            input: self.input.to_string(),
            offset: self.pos,
            reason,
        }
    }

    fn eat_value_type_keyword(&mut self) -> bool {
        let rest = self.rest();
        let is_keyword = rest
            .strip_prefix(VALUE_TYPE_KEYWORD)
            .and_then(|after| after.chars().next())
            .is_some_and(char::is_whitespace);
        if is_keyword {
            self.pos += VALUE_TYPE_KEYWORD.len();
            self.skip_whitespace();
        }
        is_keyword
    }

    /// Reads a dotted name. A `<` opening a segment belongs to a synthesised
    /// name (`<>c`, `<Run>d__4`) and is read through its closing `>`.
    fn name(&mut self) -> Result<&str, TypeRefParseError> {
        let rest = self.rest();
        let mut end = rest.len();
        let mut segment_start = true;
        let mut chars = rest.char_indices();
        while let Some((i, c)) = chars.next() {
            if c == '<' && segment_start {
                if !chars.by_ref().any(|(_, c)| c == '>') {
                    return Err(self.error("unterminated synthesised name"));
                }
                segment_start = false;
                continue;
            }
            if c.is_whitespace() || NAME_TERMINATORS.contains(&c) {
                end = i;
                break;
            }
            segment_start = c == '.' || c == NESTED_SEPARATOR;
        }
        if end == 0 {
            return Err(self.error("expected a type name"));
        }
        let start = self.pos;
        self.pos += end;
        Ok(&self.input[start..self.pos])
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeRefParseError> {
        self.skip_whitespace();
        let value_type = self.eat_value_type_keyword();

        let mut parsed = if self.eat('!') {
            let method = self.eat('!');
            let name = self.name()?.to_string();
            TypeRef::GenericParameter { name, method }
        } else {
            let mut name = TypeName::from_full_name(self.name()?);
            name.value_type = value_type;
            self.skip_whitespace();
            if self.eat('<') {
                let arguments = self.parse_arguments()?;
                TypeRef::Generic {
                    definition: name,
                    arguments,
                }
            } else {
                TypeRef::Named(name)
            }
        };

        loop {
            self.skip_whitespace();
            if self.eat('[') {
                let mut rank = 1;
                while self.eat(',') {
                    rank += 1;
                }
                if !self.eat(']') {
                    return Err(self.error("unterminated array rank"));
                }
                parsed = TypeRef::Array {
                    element: Box::new(parsed),
                    rank,
                };
            } else if self.eat('*') {
                parsed = TypeRef::Pointer(Box::new(parsed));
            } else if self.eat('&') {
                parsed = TypeRef::ByRef(Box::new(parsed));
            } else {
                return Ok(parsed);
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<TypeRef>, TypeRefParseError> {
        let mut arguments = vec![self.parse_type()?];
        loop {
            self.skip_whitespace();
            if self.eat(',') {
                arguments.push(self.parse_type()?);
            } else if self.eat('>') {
                return Ok(arguments);
            } else {
                return Err(self.error("expected `,` or `>` in generic argument list"));
            }
        }
    }
}
