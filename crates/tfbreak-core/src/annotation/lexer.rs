//! Comment and top-level block extraction.
//!
//! This is not a configuration-language parser. It walks a source file once,
//! tracking strings, templates, heredocs and bracket nesting just well enough
//! to report every comment and the line extent of every top-level block.

use crate::errors::{Result, TfbreakError};

/// A comment body without its marker (`#`, `//`, `/* */`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub line: usize,
    pub text: String,
}

/// Line extent of a top-level block such as `resource "aws_s3_bucket" "logs" { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockExtent {
    pub block_type: String,
    pub labels: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
}

/// Everything the annotation subsystem needs from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceScan {
    pub comments: Vec<Comment>,
    /// Sorted by start line
    pub blocks: Vec<BlockExtent>,
}

/// Scan `source`. `file` is only used in error messages.
///
/// # Errors
///
/// Returns `SourceStructure` for an unterminated string, comment or heredoc,
/// or for unbalanced brackets.
pub fn scan(file: &str, source: &str) -> Result<SourceScan> {
    Lexer::new(file, source).run()
}

/// Header of a top-level statement seen so far.
struct Pending {
    block_type: String,
    labels: Vec<String>,
    start_line: usize,
    is_attribute: bool,
}

struct Frame {
    open: char,
    line: usize,
    block: Option<Pending>,
}

struct Lexer<'a> {
    file: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    stack: Vec<Frame>,
    pending: Option<Pending>,
    out: SourceScan,
}

impl<'a> Lexer<'a> {
    fn new(file: &'a str, source: &str) -> Self {
        Self {
            file,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            stack: Vec::new(),
            pending: None,
            out: SourceScan::default(),
        }
    }

    fn error(&self, line: usize, reason: impl Into<String>) -> TfbreakError {
        TfbreakError::SourceStructure {
            file: self.file.to_string(),
            line,
            reason: reason.into(),
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Consume one char, tracking line numbers
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn at_top(&self) -> bool {
        self.stack.is_empty()
    }

    fn run(mut self) -> Result<SourceScan> {
        while let Some(c) = self.peek_at(0) {
            match c {
                '\n' => {
                    self.bump();
                    if self.at_top() {
                        // Block headers and attributes end at the line break
                        self.pending = None;
                    }
                }
                '#' => {
                    self.bump();
                    self.line_comment();
                }
                '/' if self.peek_at(1) == Some('/') => {
                    self.pos += 2;
                    self.line_comment();
                }
                '/' if self.peek_at(1) == Some('*') => self.block_comment()?,
                '"' => {
                    let start = self.line;
                    let value = self.string()?;
                    self.label(value, start);
                }
                '<' if self.peek_at(1) == Some('<') => self.heredoc()?,
                '{' | '(' | '[' => self.open(c),
                '}' | ')' | ']' => self.close(c)?,
                '=' => {
                    self.bump();
                    if self.at_top() {
                        if let Some(p) = self.pending.as_mut() {
                            p.is_attribute = true;
                        }
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let start = self.line;
                    let word = self.identifier();
                    if self.at_top() {
                        match self.pending.as_mut() {
                            None => {
                                self.pending = Some(Pending {
                                    block_type: word,
                                    labels: Vec::new(),
                                    start_line: start,
                                    is_attribute: false,
                                });
                            }
                            Some(p) if !p.is_attribute => p.labels.push(word),
                            Some(_) => {}
                        }
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }

        if let Some(frame) = self.stack.last() {
            return Err(self.error(frame.line, format!("unclosed '{}'", frame.open)));
        }
        self.out.blocks.sort_by_key(|b| b.start_line);
        Ok(self.out)
    }

    fn label(&mut self, value: String, line: usize) {
        if !self.at_top() {
            return;
        }
        if let Some(p) = self.pending.as_mut() {
            if !p.is_attribute && p.start_line == line {
                p.labels.push(value);
            }
        }
    }

    fn identifier(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek_at(0) {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        word
    }

    fn line_comment(&mut self) {
        let line = self.line;
        let mut text = String::new();
        while let Some(c) = self.peek_at(0) {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        let text = text.trim_end_matches('\r').to_string();
        self.out.comments.push(Comment { line, text });
    }

    fn block_comment(&mut self) -> Result<()> {
        let line = self.line;
        self.pos += 2;
        let mut text = String::new();
        loop {
            match self.peek_at(0) {
                None => return Err(self.error(line, "unterminated block comment")),
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.pos += 2;
                    break;
                }
                Some(_) => {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
            }
        }
        self.out.comments.push(Comment { line, text });
        Ok(())
    }

    /// Consume a quoted string starting at `"` and return its literal text.
    fn string(&mut self) -> Result<String> {
        let line = self.line;
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek_at(0) {
                None | Some('\n') => return Err(self.error(line, "unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek_at(0) {
                        None | Some('\n') => {
                            return Err(self.error(line, "unterminated string"))
                        }
                        Some(c) => {
                            value.push(c);
                            self.pos += 1;
                        }
                    }
                }
                Some('"') => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some(c @ ('$' | '%')) if self.peek_at(1) == Some(c) => {
                    // `$${` and `%%{` are literal
                    value.push(c);
                    self.pos += 2;
                }
                Some('$' | '%') if self.peek_at(1) == Some('{') => {
                    self.pos += 2;
                    self.template(line)?;
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// Consume a `${ ... }` or `%{ ... }` body up to its closing brace.
    fn template(&mut self, string_line: usize) -> Result<()> {
        let mut depth = 1usize;
        loop {
            match self.peek_at(0) {
                None => return Err(self.error(string_line, "unterminated template")),
                Some('"') => {
                    self.string()?;
                }
                Some('{') => {
                    depth += 1;
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// `<<EOF` or `<<-EOF`, closed by a line whose trimmed text is the marker.
    fn heredoc(&mut self) -> Result<()> {
        let line = self.line;
        let mut offset = 2;
        if self.peek_at(offset) == Some('-') {
            offset += 1;
        }
        let mut marker = String::new();
        while let Some(c) = self.peek_at(offset) {
            if c.is_ascii_alphanumeric() || c == '_' {
                marker.push(c);
                offset += 1;
            } else {
                break;
            }
        }
        if marker.is_empty() {
            self.pos += 2;
            return Ok(());
        }
        self.pos += offset;

        // Skip the rest of the opening line
        while let Some(c) = self.peek_at(0) {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }

        loop {
            if self.bump().is_none() {
                return Err(self.error(line, format!("unterminated heredoc '{}'", marker)));
            }
            let mut body = String::new();
            while let Some(c) = self.peek_at(0) {
                if c == '\n' {
                    break;
                }
                body.push(c);
                self.pos += 1;
            }
            if body.trim() == marker {
                return Ok(());
            }
            if self.peek_at(0).is_none() {
                return Err(self.error(line, format!("unterminated heredoc '{}'", marker)));
            }
        }
    }

    fn open(&mut self, c: char) {
        let line = self.line;
        self.bump();
        let block = if c == '{' && self.at_top() {
            self.pending.take().filter(|p| !p.is_attribute)
        } else {
            None
        };
        self.stack.push(Frame {
            open: c,
            line,
            block,
        });
    }

    fn close(&mut self, c: char) -> Result<()> {
        let line = self.line;
        let expected = match c {
            '}' => '{',
            ')' => '(',
            _ => '[',
        };
        let Some(frame) = self.stack.pop() else {
            return Err(self.error(line, format!("unexpected '{}'", c)));
        };
        if frame.open != expected {
            return Err(self.error(
                line,
                format!("'{}' closes '{}' opened on line {}", c, frame.open, frame.line),
            ));
        }
        self.bump();
        if let Some(header) = frame.block {
            self.out.blocks.push(BlockExtent {
                block_type: header.block_type,
                labels: header.labels,
                start_line: header.start_line,
                end_line: line,
            });
        }
        Ok(())
    }
}
