//! JSON text implementation of [TokenReader] and [TokenWriter].
//!
//! Tokenizing and escaping are delegated to `serde_json`. The reader flattens the parsed
//! document into a token list once and then walks it with a cursor, which keeps the
//! reader free of self-referential borrows and makes skipping unread children O(1).

use super::{Scalar, TokenReader, TokenWriter, ValueType};
use crate::Error;
use serde_json::Value as Json;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array => f.write_str("array"),
            Self::Object => f.write_str("object"),
        }
    }
}

#[derive(Debug)]
enum Token {
    Begin(Container),
    End(Container),
    Name(String),
    Scalar { kind: ValueType, text: String },
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Begin(container) => container.to_string(),
            Self::End(container) => format!("end of {container}"),
            Self::Name(name) => format!("field name {name:?}"),
            Self::Scalar { kind, .. } => kind.to_string(),
        }
    }
}

struct Frame {
    container: Container,
    begin: usize,
    name: Option<usize>,
}

/// Reads tokens from a JSON document.
///
/// The root value is current right after construction.
pub struct JsonReader {
    tokens: Vec<Token>,
    /// For every token, the index just past the value it starts.
    ends: Vec<usize>,
    frames: Vec<Frame>,
    current: Option<usize>,
    cursor: usize,
    name: Option<usize>,
}

impl JsonReader {
    /// Parses `text` and positions the reader on the root value.
    pub fn new(text: &str) -> Result<Self, Error> {
        let root: Json =
            serde_json::from_str(text).map_err(|err| Error::MalformedStream(err.to_string()))?;
        let mut reader = Self {
            tokens: Vec::new(),
            ends: Vec::new(),
            frames: Vec::new(),
            current: Some(0),
            cursor: 0,
            name: None,
        };
        reader.flatten(root);
        reader.cursor = reader.ends[0];
        Ok(reader)
    }

    fn push(&mut self, token: Token) -> usize {
        let index = self.tokens.len();
        self.tokens.push(token);
        self.ends.push(index + 1);
        index
    }

    fn flatten(&mut self, value: Json) {
        let scalar = |kind, text: String| Token::Scalar { kind, text };
        match value {
            Json::Null => {
                self.push(scalar(ValueType::Null, "null".to_string()));
            }
            Json::Bool(b) => {
                self.push(scalar(ValueType::Boolean, b.to_string()));
            }
            Json::Number(n) => {
                // Integers beyond i64 read as doubles
                let kind = if n.is_i64() {
                    ValueType::Integer
                } else {
                    ValueType::Double
                };
                self.push(scalar(kind, n.to_string()));
            }
            Json::String(s) => {
                self.push(scalar(ValueType::String, s));
            }
            Json::Array(items) => {
                let begin = self.push(Token::Begin(Container::Array));
                for item in items {
                    self.flatten(item);
                }
                self.push(Token::End(Container::Array));
                self.ends[begin] = self.tokens.len();
            }
            Json::Object(fields) => {
                let begin = self.push(Token::Begin(Container::Object));
                for (name, value) in fields {
                    self.push(Token::Name(name));
                    self.flatten(value);
                }
                self.push(Token::End(Container::Object));
                self.ends[begin] = self.tokens.len();
            }
        }
    }

    fn current(&self) -> Result<&Token, Error> {
        self.current
            .map(|index| &self.tokens[index])
            .ok_or_else(|| Error::MalformedStream("no current value, call next first".into()))
    }

    fn scalar(&self) -> Result<(ValueType, &str), Error> {
        match self.current()? {
            Token::Scalar { kind, text } => Ok((*kind, text.as_str())),
            token => Err(Error::MalformedStream(format!(
                "expected a scalar, found {}",
                token.describe()
            ))),
        }
    }

    fn enter(&mut self, container: Container) -> Result<(), Error> {
        let begin = self
            .current
            .ok_or_else(|| Error::MalformedStream(format!("no current {container} to enter")))?;
        match &self.tokens[begin] {
            Token::Begin(found) if *found == container => {}
            token => {
                return Err(Error::MalformedStream(format!(
                    "expected {container}, found {}",
                    token.describe()
                )))
            }
        }
        self.frames.push(Frame {
            container,
            begin,
            name: self.name.take(),
        });
        self.cursor = begin + 1;
        self.current = None;
        Ok(())
    }

    fn leave(&mut self, container: Container) -> Result<(), Error> {
        let frame = self.frames.pop().ok_or_else(|| {
            Error::MalformedStream(format!("cannot end {container} outside of a container"))
        })?;
        if frame.container != container {
            let found = frame.container;
            self.frames.push(frame);
            return Err(Error::MalformedStream(format!(
                "cannot end {container} inside {found}"
            )));
        }

        // Skip whatever the caller left unread
        self.cursor = self.ends[frame.begin];
        self.current = Some(frame.begin);
        self.name = frame.name;
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(kind: ValueType, text: &str) -> Result<T, Error> {
    text.parse().map_err(|_| Error::NumberFormat {
        text: text.to_string(),
        kind,
    })
}

impl TokenReader for JsonReader {
    fn begin_array(&mut self) -> Result<(), Error> {
        self.enter(Container::Array)
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.leave(Container::Array)
    }

    fn begin_object(&mut self) -> Result<(), Error> {
        self.enter(Container::Object)
    }

    fn end_object(&mut self) -> Result<(), Error> {
        self.leave(Container::Object)
    }

    fn has_next(&self) -> bool {
        match self.frames.last() {
            // The container's closing token sits just before its end
            Some(frame) => self.cursor + 1 < self.ends[frame.begin],
            None => false,
        }
    }

    fn next(&mut self) -> Result<ValueType, Error> {
        let container = match self.frames.last() {
            Some(frame) => frame.container,
            None => {
                return Err(Error::MalformedStream(
                    "next called outside of a container".into(),
                ))
            }
        };
        if !self.has_next() {
            return Err(Error::MalformedStream(format!(
                "no more elements in {container}"
            )));
        }
        if container == Container::Object {
            match &self.tokens[self.cursor] {
                Token::Name(_) => {
                    self.name = Some(self.cursor);
                    self.cursor += 1;
                }
                token => {
                    return Err(Error::MalformedStream(format!(
                        "expected field name, found {}",
                        token.describe()
                    )))
                }
            }
        }
        self.current = Some(self.cursor);
        self.cursor = self.ends[self.cursor];
        self.value_type()
    }

    fn name(&self) -> Result<&str, Error> {
        match self.name.map(|index| &self.tokens[index]) {
            Some(Token::Name(name)) => Ok(name),
            _ => Err(Error::MalformedStream("no current field name".into())),
        }
    }

    fn value_type(&self) -> Result<ValueType, Error> {
        match self.current()? {
            Token::Begin(Container::Array) => Ok(ValueType::Array),
            Token::Begin(Container::Object) => Ok(ValueType::Object),
            Token::Scalar { kind, .. } => Ok(*kind),
            token => Err(Error::MalformedStream(format!(
                "expected a value, found {}",
                token.describe()
            ))),
        }
    }

    fn value_as_string(&self) -> Result<String, Error> {
        match self.scalar()? {
            (ValueType::Null, _) => Err(Error::MalformedStream(
                "expected a string, found NULL".into(),
            )),
            (_, text) => Ok(text.to_string()),
        }
    }

    fn value_as_int(&self) -> Result<i32, Error> {
        let (kind, text) = self.scalar()?;
        match kind {
            ValueType::Integer | ValueType::String => parse_number(kind, text),
            _ => Err(Error::NumberFormat {
                text: text.to_string(),
                kind,
            }),
        }
    }

    fn value_as_long(&self) -> Result<i64, Error> {
        let (kind, text) = self.scalar()?;
        match kind {
            ValueType::Integer | ValueType::String => parse_number(kind, text),
            _ => Err(Error::NumberFormat {
                text: text.to_string(),
                kind,
            }),
        }
    }

    fn value_as_double(&self) -> Result<f64, Error> {
        let (kind, text) = self.scalar()?;
        match kind {
            ValueType::Integer | ValueType::Double | ValueType::String => {
                parse_number(kind, text)
            }
            _ => Err(Error::NumberFormat {
                text: text.to_string(),
                kind,
            }),
        }
    }

    fn value_as_boolean(&self) -> Result<bool, Error> {
        let (kind, text) = self.scalar()?;
        match kind {
            ValueType::Boolean | ValueType::String => text
                .parse()
                .map_err(|_| Error::InvalidBool(text.to_string())),
            _ => Err(Error::InvalidBool(text.to_string())),
        }
    }
}

struct Scope {
    container: Container,
    first: bool,
    named: bool,
}

/// Writes compact JSON text.
#[derive(Default)]
pub struct JsonWriter {
    out: String,
    scopes: Vec<Scope>,
    root: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the document, failing if a container is still open or nothing was written.
    pub fn finish(self) -> Result<String, Error> {
        if let Some(scope) = self.scopes.last() {
            return Err(Error::MalformedStream(format!(
                "unclosed {}",
                scope.container
            )));
        }
        if !self.root {
            return Err(Error::MalformedStream("no value written".into()));
        }
        Ok(self.out)
    }

    fn before_value(&mut self) -> Result<(), Error> {
        match self.scopes.last_mut() {
            None if self.root => {
                return Err(Error::MalformedStream("more than one root value".into()))
            }
            None => self.root = true,
            Some(scope) if scope.container == Container::Array => {
                if !scope.first {
                    self.out.push(',');
                }
                scope.first = false;
            }
            Some(scope) => {
                if !scope.named {
                    return Err(Error::MalformedStream(
                        "object value written without a field name".into(),
                    ));
                }
                scope.named = false;
            }
        }
        Ok(())
    }

    fn open(&mut self, container: Container) -> Result<(), Error> {
        self.before_value()?;
        self.out.push(match container {
            Container::Array => '[',
            Container::Object => '{',
        });
        self.scopes.push(Scope {
            container,
            first: true,
            named: false,
        });
        Ok(())
    }

    fn close(&mut self, container: Container) -> Result<(), Error> {
        match self.scopes.pop() {
            Some(scope) if scope.container == container && !scope.named => {}
            Some(scope) if scope.named => {
                return Err(Error::MalformedStream(
                    "field name written without a value".into(),
                ))
            }
            _ => {
                return Err(Error::MalformedStream(format!(
                    "unbalanced end of {container}"
                )))
            }
        }
        self.out.push(match container {
            Container::Array => ']',
            Container::Object => '}',
        });
        Ok(())
    }

    fn push_string(&mut self, text: &str) -> Result<(), Error> {
        let escaped =
            serde_json::to_string(text).map_err(|err| Error::MalformedStream(err.to_string()))?;
        self.out.push_str(&escaped);
        Ok(())
    }
}

impl TokenWriter for JsonWriter {
    fn begin_array(&mut self) -> Result<(), Error> {
        self.open(Container::Array)
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.close(Container::Array)
    }

    fn begin_object(&mut self) -> Result<(), Error> {
        self.open(Container::Object)
    }

    fn end_object(&mut self) -> Result<(), Error> {
        self.close(Container::Object)
    }

    fn write_name(&mut self, name: &str) -> Result<(), Error> {
        match self.scopes.last_mut() {
            Some(scope) if scope.container == Container::Object && !scope.named => {
                if !scope.first {
                    self.out.push(',');
                }
                scope.first = false;
                scope.named = true;
            }
            _ => {
                return Err(Error::MalformedStream(format!(
                    "field name {name:?} written outside of an object"
                )))
            }
        }
        self.push_string(name)?;
        self.out.push(':');
        Ok(())
    }

    fn write_value(&mut self, value: Scalar<'_>) -> Result<(), Error> {
        // Validate before emitting anything
        let number = match value {
            Scalar::Double(d) => Some(serde_json::Number::from_f64(d).ok_or_else(|| {
                Error::MalformedStream(format!("cannot write non-finite number {d}"))
            })?),
            _ => None,
        };
        self.before_value()?;
        match value {
            Scalar::Bool(b) => self.out.push_str(if b { "true" } else { "false" }),
            Scalar::Integer(i) => self.out.push_str(&i.to_string()),
            Scalar::Double(_) => {
                if let Some(number) = number {
                    self.out.push_str(&number.to_string());
                }
            }
            Scalar::Text(text) => self.push_string(text)?,
        }
        Ok(())
    }

    fn write_null(&mut self) -> Result<(), Error> {
        self.before_value()?;
        self.out.push_str("null");
        Ok(())
    }
}
