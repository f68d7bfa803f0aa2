//! Tokenizer and tree builder for Mustache source text

use std::mem;

use super::SyntaxError;

const DEFAULT_OPEN: &str = "{{";
const DEFAULT_CLOSE: &str = "}}";

/// Compiled template tree
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    /// Literal text, never containing a newline
    Text(String),
    /// A template newline; `last` lines do not receive partial indentation
    Newline { last: bool },
    /// `{{name}}` (escaped) or `{{{name}}}` / `{{& name}}`
    Variable { name: String, escape: bool },
    /// `{{#name}}` or `{{^name}}` block
    Section {
        name: String,
        inverted: bool,
        nodes: Vec<Node>,
        /// Character offset of the section body in the source
        start: usize,
        /// Character offset of the closing tag in the source
        end: usize,
        /// Delimiters in effect at the opening tag, e.g. `{{ }}`
        delimiters: String,
    },
    /// `{{> name}}`
    Partial { name: String, indent: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Escaped,
    Unescaped,
    Section,
    Inverted,
    Close,
    Partial,
    Comment,
    Delimiter,
}

impl TagKind {
    /// Classify a tag by its first character, returning the sigil length
    fn from_sigil(sigil: Option<char>) -> (Self, usize) {
        match sigil {
            Some('#') => (Self::Section, 1),
            Some('^') => (Self::Inverted, 1),
            Some('/') => (Self::Close, 1),
            Some('>') => (Self::Partial, 1),
            Some('!') => (Self::Comment, 1),
            Some('=') => (Self::Delimiter, 1),
            Some('{') | Some('&') => (Self::Unescaped, 1),
            _ => (Self::Escaped, 0),
        }
    }

    fn can_stand_alone(self) -> bool {
        !matches!(self, Self::Escaped | Self::Unescaped)
    }
}

#[derive(Debug)]
struct Tag {
    kind: TagKind,
    name: String,
    line: usize,
    /// Byte offset of the opening delimiter
    start: usize,
    /// Byte offset just past the closing delimiter
    end: usize,
    delimiters: String,
    indent: String,
}

#[derive(Debug)]
enum Token {
    Text(String),
    Newline,
    Tag(Tag),
}

pub(crate) fn parse(source: &str) -> Result<Vec<Node>, SyntaxError> {
    let tokens = tokenize(source)?;
    let tokens = strip_standalone(tokens);
    build(tokens, source)
}

fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut open = DEFAULT_OPEN.to_string();
    let mut close = DEFAULT_CLOSE.to_string();
    let mut line = 1;
    let mut pos = 0;

    while pos < source.len() {
        let Some(offset) = source[pos..].find(open.as_str()) else {
            push_text(&mut tokens, &source[pos..]);
            break;
        };
        let start = pos + offset;
        line += push_text(&mut tokens, &source[pos..start]);

        let body_start = start + open.len();
        let (kind, sigil_len) = TagKind::from_sigil(source[body_start..].chars().next());
        let closer = match (kind, source[body_start..].starts_with('{')) {
            (TagKind::Unescaped, true) => format!("}}{close}"),
            (TagKind::Delimiter, _) => format!("={close}"),
            _ => close.clone(),
        };

        let name_start = body_start + sigil_len;
        let Some(close_offset) = source[name_start..].find(closer.as_str()) else {
            return Err(SyntaxError::new(
                line,
                format!("unclosed tag, expected '{closer}'"),
            ));
        };
        let name_end = name_start + close_offset;
        let content = &source[name_start..name_end];
        let name = content.trim().to_string();
        let tag_line = line;
        line += content.matches('\n').count();

        let mut next_delimiters = None;
        match kind {
            TagKind::Comment => {}
            TagKind::Delimiter => {
                next_delimiters = Some(parse_delimiters(&name).ok_or_else(|| {
                    SyntaxError::new(tag_line, format!("invalid delimiter declaration '{name}'"))
                })?);
            }
            _ if name.is_empty() => return Err(SyntaxError::new(tag_line, "empty tag name")),
            _ => {}
        }

        let end = name_end + closer.len();
        tokens.push(Token::Tag(Tag {
            kind,
            name,
            line: tag_line,
            start,
            end,
            delimiters: format!("{open} {close}"),
            indent: String::new(),
        }));

        if let Some((new_open, new_close)) = next_delimiters {
            open = new_open;
            close = new_close;
        }
        pos = end;
    }

    Ok(tokens)
}

/// Push text as Text/Newline tokens, returning the number of newlines
fn push_text(tokens: &mut Vec<Token>, text: &str) -> usize {
    let mut newlines = 0;
    for (i, piece) in text.split('\n').enumerate() {
        if i > 0 {
            tokens.push(Token::Newline);
            newlines += 1;
        }
        if !piece.is_empty() {
            tokens.push(Token::Text(piece.to_string()));
        }
    }
    newlines
}

fn parse_delimiters(declaration: &str) -> Option<(String, String)> {
    let mut parts = declaration.split_whitespace();
    let (open, close) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || open.contains('=') || close.contains('=') {
        return None;
    }
    Some((open.to_string(), close.to_string()))
}

/// Remove lines that hold nothing but whitespace and a single block tag.
fn strip_standalone(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut line = Vec::new();

    for token in tokens {
        let ends_line = matches!(token, Token::Newline);
        line.push(token);
        if ends_line {
            flush_line(&mut line, &mut out);
        }
    }
    flush_line(&mut line, &mut out);

    out
}

fn flush_line(line: &mut Vec<Token>, out: &mut Vec<Token>) {
    let Some(tag_index) = standalone_tag(line) else {
        out.append(line);
        return;
    };

    let indent: String = line[..tag_index]
        .iter()
        .filter_map(|token| match token {
            Token::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();

    for (i, token) in line.drain(..).enumerate() {
        if i != tag_index {
            continue;
        }
        if let Token::Tag(mut tag) = token {
            if tag.kind == TagKind::Partial {
                tag.indent = indent.clone();
            }
            out.push(Token::Tag(tag));
        }
    }
}

fn standalone_tag(line: &[Token]) -> Option<usize> {
    let mut found = None;
    for (i, token) in line.iter().enumerate() {
        match token {
            Token::Newline => {}
            Token::Text(text) if text.chars().all(char::is_whitespace) => {}
            Token::Tag(tag) if tag.kind.can_stand_alone() && found.is_none() => found = Some(i),
            _ => return None,
        }
    }
    found
}

struct OpenSection {
    name: String,
    inverted: bool,
    line: usize,
    body_start: usize,
    delimiters: String,
    outer: Vec<Node>,
}

fn build(tokens: Vec<Token>, source: &str) -> Result<Vec<Node>, SyntaxError> {
    let mut stack: Vec<OpenSection> = Vec::new();
    let mut nodes = Vec::new();
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        match token {
            Token::Text(text) => nodes.push(Node::Text(text)),
            Token::Newline => {
                let last = matches!(tokens.peek(), None | Some(Token::Newline));
                nodes.push(Node::Newline { last });
            }
            Token::Tag(tag) => match tag.kind {
                TagKind::Escaped | TagKind::Unescaped => nodes.push(Node::Variable {
                    name: tag.name,
                    escape: tag.kind == TagKind::Escaped,
                }),
                TagKind::Section | TagKind::Inverted => stack.push(OpenSection {
                    name: tag.name,
                    inverted: tag.kind == TagKind::Inverted,
                    line: tag.line,
                    body_start: tag.end,
                    delimiters: tag.delimiters,
                    outer: mem::take(&mut nodes),
                }),
                TagKind::Close => {
                    let open = stack.pop().ok_or_else(|| {
                        SyntaxError::new(
                            tag.line,
                            format!("closing tag '{}' has no open section", tag.name),
                        )
                    })?;
                    if open.name != tag.name {
                        return Err(SyntaxError::new(
                            tag.line,
                            format!("section '{}' closed by '{}'", open.name, tag.name),
                        ));
                    }
                    let body = mem::replace(&mut nodes, open.outer);
                    nodes.push(Node::Section {
                        name: open.name,
                        inverted: open.inverted,
                        nodes: body,
                        start: char_offset(source, open.body_start),
                        end: char_offset(source, tag.start),
                        delimiters: open.delimiters,
                    });
                }
                TagKind::Partial => nodes.push(Node::Partial {
                    name: tag.name,
                    indent: tag.indent,
                }),
                TagKind::Comment | TagKind::Delimiter => {}
            },
        }
    }

    if let Some(open) = stack.pop() {
        return Err(SyntaxError::new(
            open.line,
            format!("unclosed section '{}'", open.name),
        ));
    }

    Ok(nodes)
}

fn char_offset(source: &str, byte_offset: usize) -> usize {
    source[..byte_offset].chars().count()
}
