//! Property paths such as `greeting`, `user.name` or `items[2].name`.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `.name` (or the leading identifier)
    Key(Rc<str>),
    /// `[2]`
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A parsed property path. Always starts with an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    head: Rc<str>,
    segments: Vec<Segment>,
}

impl Path {
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = PathParser {
            source,
            chars: source.trim().char_indices().peekable(),
        };
        parser.parse()
    }

    /// All segments, starting with the leading identifier.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The leading identifier and the segments after it.
    pub fn split_first(&self) -> (&str, &[Segment]) {
        (&self.head, &self.segments[1..])
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.head)?;
        for segment in &self.segments[1..] {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

struct PathParser<'a, I: Iterator<Item = (usize, char)>> {
    source: &'a str,
    chars: std::iter::Peekable<I>,
}

impl<'a, I: Iterator<Item = (usize, char)>> PathParser<'a, I> {
    fn error(&self, reason: impl Into<String>) -> Error {
        Error::malformed(self.source, reason)
    }

    fn parse(&mut self) -> Result<Path> {
        let head: Rc<str> = self.identifier()?.into();
        let mut segments = vec![Segment::Key(head.clone())];

        while let Some((_, c)) = self.chars.next() {
            match c {
                '.' => segments.push(Segment::Key(self.identifier()?.into())),
                '[' => {
                    let index = self.index()?;
                    match self.chars.next() {
                        Some((_, ']')) => segments.push(Segment::Index(index)),
                        _ => return Err(self.error("expected `]`")),
                    }
                }
                other => return Err(self.error(format!("unexpected `{other}`"))),
            }
        }

        Ok(Path { head, segments })
    }

    fn identifier(&mut self) -> Result<String> {
        let mut ident = String::new();
        match self.chars.next() {
            Some((_, c)) if is_ident_start(c) => ident.push(c),
            Some((_, c)) => return Err(self.error(format!("expected identifier, found `{c}`"))),
            None => return Err(self.error("expected identifier")),
        }
        while let Some(&(_, c)) = self.chars.peek() {
            if !is_ident_continue(c) {
                break;
            }
            ident.push(c);
            self.chars.next();
        }
        Ok(ident)
    }

    fn index(&mut self) -> Result<usize> {
        let mut digits = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.chars.next();
        }
        digits
            .parse()
            .map_err(|_| self.error("expected an array index"))
    }
}
