//! Template lexing: split the source into text and action items, and
//! tokenize the content of each action.

use super::error::{Result, TemplateError};
use memchr::memmem;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const LEFT_COMMENT: &str = "/*";
const RIGHT_COMMENT: &str = "*/";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// `.`
    Dot,
    /// `.A.B` as its segments
    Field(Vec<String>),
    /// Function name or keyword
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
    LParen,
    RParen,
    Pipe,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Item {
    Text(String),
    Action { line: usize, tokens: Vec<Token> },
}

/// Split `src` into text runs and tokenized actions.
///
/// Trim markers (`{{- ` and ` -}}`) are applied here: they remove the
/// whitespace of the neighbouring text. Comments produce no item.
pub(crate) fn lex(src: &str) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    let mut trim_next_text = false;

    while pos < src.len() {
        let Some(found) = memmem::find(&src.as_bytes()[pos..], LEFT_DELIM.as_bytes()) else {
            push_text(&mut items, &src[pos..], trim_next_text, false);
            break;
        };
        let open = pos + found;
        let content_start = open + LEFT_DELIM.len();
        let trim_left = has_left_trim_marker(&src[content_start..]);

        push_text(&mut items, &src[pos..open], trim_next_text, trim_left);
        line += count_lines(&src[pos..open]);

        let action_start = if trim_left { content_start + 1 } else { content_start };
        let action_line = line;
        let mut lexer = ActionLexer::new(src, action_start, line);

        let trim_right = if lexer.at_comment() {
            lexer.skip_comment()?
        } else {
            let tokens = lexer.tokens()?;
            items.push(Item::Action {
                line: action_line,
                tokens,
            });
            lexer.trim_right
        };

        line = lexer.line;
        pos = lexer.pos;
        trim_next_text = trim_right;
    }

    Ok(items)
}

fn push_text(items: &mut Vec<Item>, text: &str, trim_start: bool, trim_end: bool) {
    let mut text = text;
    if trim_start {
        text = text.trim_start();
    }
    if trim_end {
        text = text.trim_end();
    }
    if !text.is_empty() {
        items.push(Item::Text(text.to_string()));
    }
}

/// `{{- ` requires whitespace after the dash; `{{-3}}` is a negative number.
fn has_left_trim_marker(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_whitespace)
}

#[inline]
fn count_lines(s: &str) -> usize {
    memchr::memchr_iter(b'\n', s.as_bytes()).count()
}

struct ActionLexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    trim_right: bool,
}

impl<'a> ActionLexer<'a> {
    fn new(src: &'a str, pos: usize, line: usize) -> Self {
        Self {
            src,
            pos,
            line,
            trim_right: false,
        }
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::parse(self.line, message)
    }

    /// Skip whitespace, reporting whether any was skipped.
    fn skip_space(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn at_comment(&self) -> bool {
        self.rest().trim_start().starts_with(LEFT_COMMENT)
    }

    /// Consume `/* ... */` and the closing delimiter; returns the right trim flag.
    fn skip_comment(&mut self) -> Result<bool> {
        self.skip_space();
        self.pos += LEFT_COMMENT.len();
        let Some(end) = memmem::find(self.rest().as_bytes(), RIGHT_COMMENT.as_bytes()) else {
            return Err(self.error("unclosed comment"));
        };
        self.line += count_lines(&self.rest()[..end]);
        self.pos += end + RIGHT_COMMENT.len();

        let spaced = self.skip_space();
        if spaced && self.rest().starts_with("-}}") {
            self.pos += 3;
            return Ok(true);
        }
        if self.rest().starts_with(RIGHT_DELIM) {
            self.pos += RIGHT_DELIM.len();
            return Ok(false);
        }
        Err(self.error("comment ends before closing delimiter"))
    }

    /// Tokenize up to and including the closing delimiter.
    fn tokens(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let spaced = self.skip_space();
            let rest = self.rest();

            if spaced && rest.starts_with("-}}") {
                self.pos += 3;
                self.trim_right = true;
                return Ok(tokens);
            }
            if rest.starts_with(RIGHT_DELIM) {
                self.pos += RIGHT_DELIM.len();
                return Ok(tokens);
            }

            let Some(c) = self.peek() else {
                return Err(self.error("unclosed action"));
            };

            let token = match c {
                '|' => {
                    self.bump();
                    Token::Pipe
                },
                '(' => {
                    self.bump();
                    Token::LParen
                },
                ')' => {
                    self.bump();
                    Token::RParen
                },
                '"' => self.quoted()?,
                '`' => self.raw_quoted()?,
                '.' => self.field_or_dot()?,
                '$' => return Err(self.error("variables are not supported")),
                c if c.is_ascii_digit() => self.number()?,
                '-' | '+' if rest[1..].starts_with(|d: char| d.is_ascii_digit()) => self.number()?,
                c if is_ident_start(c) => self.identifier(),
                other => return Err(self.error(format!("unexpected {other:?} in action"))),
            };
            tokens.push(token);
        }
    }

    fn quoted(&mut self) -> Result<Token> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated quoted string")),
                Some('"') => return Ok(Token::Str(value)),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('\'') => value.push('\''),
                    Some(other) => return Err(self.error(format!("unknown escape sequence \\{other}"))),
                    None => return Err(self.error("unterminated quoted string")),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn raw_quoted(&mut self) -> Result<Token> {
        self.bump();
        let Some(end) = self.rest().find('`') else {
            return Err(self.error("unterminated raw quoted string"));
        };
        let value = self.rest()[..end].to_string();
        for _ in 0..=value.chars().count() {
            self.bump();
        }
        Ok(Token::Str(value))
    }

    fn field_or_dot(&mut self) -> Result<Token> {
        if self.rest()[1..].starts_with(|c: char| c.is_ascii_digit()) {
            return self.number();
        }
        let mut segments = Vec::new();
        while self.peek() == Some('.') && self.rest()[1..].starts_with(is_ident_start) {
            self.bump();
            segments.push(self.word());
        }
        if segments.is_empty() {
            self.bump();
            return Ok(Token::Dot);
        }
        Ok(Token::Field(segments))
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn identifier(&mut self) -> Token {
        let word = self.word();
        match word.as_str() {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            "nil" => Token::Nil,
            _ => Token::Ident(word),
        }
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {},
                '.' | 'e' | 'E' => is_float = true,
                '-' | '+' if matches!(self.src[..self.pos].chars().last(), Some('e' | 'E')) => {},
                _ => break,
            }
            self.bump();
        }
        let literal: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();
        if is_float {
            literal
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(format!("bad number syntax: {literal:?}")))
        } else {
            literal
                .parse::<i64>()
                .map(Token::Int)
                .map_err(|_| self.error(format!("bad number syntax: {literal:?}")))
        }
    }
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[inline]
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
