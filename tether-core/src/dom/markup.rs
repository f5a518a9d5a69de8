//! Markup parsing into static template trees.
//!
//! A small, forgiving HTML parser: enough to read templates, not a conforming
//! HTML5 tree builder. Stray end tags are ignored and open elements close at
//! end of input. Content of `script`, `style` and `textarea` is raw text.

use crate::error::{Error, Result};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// A static node description: what the renderer compiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    Element(ElementTemplate),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTemplate {
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<TemplateNode>,
}

impl ElementTemplate {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute {
            name: name.to_ascii_lowercase(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_child(TemplateNode::Text(text.to_string()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }
}

/// Parse markup into a list of top-level template nodes.
pub fn parse_markup(source: &str) -> Result<Vec<TemplateNode>> {
    MarkupParser::new(source).parse()
}

struct MarkupParser<'a> {
    source: &'a str,
    pos: usize,
    open: Vec<ElementTemplate>,
    roots: Vec<TemplateNode>,
}

impl<'a> MarkupParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            open: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Vec<TemplateNode>> {
        while self.pos < self.source.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.skip_comment()?;
            } else if rest.starts_with("</") && starts_tag_name(&rest[2..]) {
                self.end_tag()?;
            } else if rest.starts_with("<!") {
                // Doctype and other declarations.
                self.skip_past('>')?;
            } else if rest.starts_with('<') && starts_tag_name(&rest[1..]) {
                self.start_tag()?;
            } else {
                self.text();
            }
        }
        while !self.open.is_empty() {
            self.close_innermost();
        }
        Ok(self.roots)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Markup {
            position: self.pos,
            message: message.into(),
        }
    }

    fn push_node(&mut self, node: TemplateNode) {
        let siblings = match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        if let (TemplateNode::Text(text), Some(TemplateNode::Text(previous))) =
            (&node, siblings.last_mut())
        {
            previous.push_str(text);
            return;
        }
        siblings.push(node);
    }

    fn close_innermost(&mut self) {
        if let Some(element) = self.open.pop() {
            self.push_node(TemplateNode::Element(element));
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        match self.rest()[4..].find("-->") {
            Some(end) => {
                self.pos += 4 + end + 3;
                Ok(())
            }
            None => Err(self.error("unterminated comment")),
        }
    }

    fn skip_past(&mut self, c: char) -> Result<()> {
        match self.rest().find(c) {
            Some(end) => {
                self.pos += end + c.len_utf8();
                Ok(())
            }
            None => Err(self.error(format!("expected `{c}`"))),
        }
    }

    fn text(&mut self) {
        // A `<` that does not open a tag is literal text.
        let rest = self.rest();
        let first = rest.chars().next().map_or(0, char::len_utf8);
        let end = rest[first..]
            .find('<')
            .map(|i| i + first)
            .unwrap_or(rest.len());
        let text = decode_entities(&rest[..end]);
        self.pos += end;
        self.push_node(TemplateNode::Text(text));
    }

    fn tag_name(&mut self) -> String {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'))
            .unwrap_or(rest.len());
        self.pos += end;
        rest[..end].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn end_tag(&mut self) -> Result<()> {
        self.pos += 2;
        let name = self.tag_name();
        self.skip_past('>')?;

        if let Some(depth) = self.open.iter().rposition(|e| e.tag_name == name) {
            while self.open.len() > depth {
                self.close_innermost();
            }
        }
        Ok(())
    }

    fn start_tag(&mut self) -> Result<()> {
        self.pos += 1;
        let mut element = ElementTemplate::new(&self.tag_name());

        let self_closing = loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error(format!("unterminated `<{}>` tag", element.tag_name)));
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                break true;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break false;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            element.attributes.push(self.attribute()?);
        };

        let void = VOID_ELEMENTS.contains(&element.tag_name.as_str());
        if self_closing || void {
            self.push_node(TemplateNode::Element(element));
        } else if RAW_TEXT_ELEMENTS.contains(&element.tag_name.as_str()) {
            let text = self.raw_text(&element.tag_name);
            if !text.is_empty() {
                element.children.push(TemplateNode::Text(text));
            }
            self.push_node(TemplateNode::Element(element));
        } else {
            self.open.push(element);
        }
        Ok(())
    }

    fn attribute(&mut self) -> Result<Attribute> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected an attribute name"));
        }
        let name = rest[..end].to_ascii_lowercase();
        self.pos += end;

        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            return Ok(Attribute {
                name,
                value: String::new(),
            });
        }
        self.pos += 1;
        self.skip_whitespace();

        let rest = self.rest();
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let close = rest[1..]
                    .find(quote)
                    .ok_or_else(|| self.error(format!("unterminated value for `{name}`")))?;
                self.pos += close + 2;
                &rest[1..close + 1]
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                &rest[..end]
            }
        };
        Ok(Attribute {
            name,
            value: decode_entities(value),
        })
    }

    fn raw_text(&mut self, tag_name: &str) -> String {
        let rest = self.rest();
        let closing = format!("</{tag_name}");
        let end = rest
            .to_ascii_lowercase()
            .find(&closing)
            .unwrap_or(rest.len());
        self.pos += end;
        if end < rest.len() {
            // Consume the end tag; a missing `>` just runs to the end.
            let after = self.rest();
            self.pos += after.find('>').map(|i| i + 1).unwrap_or(after.len());
        }
        rest[..end].to_string()
    }
}

fn starts_tag_name(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_alphabetic())
}

/// Decode the basic named entities and numeric references. Anything
/// unrecognised is kept verbatim.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
