//! Template parsing into a node tree.
//!
//! Supported grammar (Go text/template subset):
//!
//! ```text
//! list     := (text | action | if | range | with)*
//! action   := "{{" pipeline "}}"
//! if       := "{{if" pipeline "}}" list ("{{else if" pipeline "}}" list)* ("{{else}}" list)? "{{end}}"
//! range    := "{{range" pipeline "}}" list ("{{else}}" list)? "{{end}}"
//! with     := "{{with" pipeline "}}" list ("{{else}}" list)? "{{end}}"
//! pipeline := command ("|" command)*
//! command  := operand+
//! operand  := "." | field | ident | literal | "(" pipeline ")"
//! ```

use super::error::{Result, TemplateError};
use super::funcs::{FuncMap, is_builtin};
use super::lexer::{Item, Token};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Action(Pipeline),
    If(Branch),
    Range(Branch),
    With(Branch),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Branch {
    pub pipe: Pipeline,
    pub body: Vec<Node>,
    pub otherwise: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pipeline {
    pub line: usize,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Command {
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Dot,
    Field(Vec<String>),
    /// Function name; the remaining operands of the command are its arguments
    Call(String),
    Literal(Value),
    Sub(Pipeline),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchKind {
    If,
    Range,
    With,
}

impl BranchKind {
    fn keyword(self) -> &'static str {
        match self {
            BranchKind::If => "if",
            BranchKind::Range => "range",
            BranchKind::With => "with",
        }
    }
}

/// How a nested list ended.
enum Terminator {
    End,
    Else { line: usize, tokens: Vec<Token> },
}

/// Go constructs this engine does not implement.
const UNSUPPORTED_KEYWORDS: &[&str] = &["block", "break", "continue", "define", "template"];

/// Parse lexed items into a node tree, resolving function names against
/// `funcs` and the built-ins.
pub(crate) fn parse(items: Vec<Item>, funcs: &FuncMap) -> Result<Vec<Node>> {
    let mut parser = Parser {
        items: items.into_iter(),
        funcs,
    };
    let (nodes, terminator) = parser.list()?;
    match terminator {
        None => Ok(nodes),
        Some((line, Terminator::End)) => Err(TemplateError::parse(line, "unexpected {{end}}")),
        Some((line, Terminator::Else { .. })) => Err(TemplateError::parse(line, "unexpected {{else}}")),
    }
}

struct Parser<'f> {
    items: std::vec::IntoIter<Item>,
    funcs: &'f FuncMap,
}

impl Parser<'_> {
    /// Parse nodes until `{{end}}`, `{{else}}` or the end of input.
    fn list(&mut self) -> Result<(Vec<Node>, Option<(usize, Terminator)>)> {
        let mut nodes = Vec::new();

        while let Some(item) = self.items.next() {
            let (line, mut tokens) = match item {
                Item::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                },
                Item::Action { line, tokens } => (line, tokens),
            };

            let keyword = match tokens.first() {
                Some(Token::Ident(name)) => Some(name.clone()),
                None => return Err(TemplateError::parse(line, "missing value for command")),
                _ => None,
            };

            match keyword.as_deref() {
                Some("end") => {
                    if tokens.len() > 1 {
                        return Err(TemplateError::parse(line, "unexpected tokens after end"));
                    }
                    return Ok((nodes, Some((line, Terminator::End))));
                },
                Some("else") => {
                    tokens.remove(0);
                    return Ok((nodes, Some((line, Terminator::Else { line, tokens }))));
                },
                Some("if") => nodes.push(self.branch(BranchKind::If, line, tokens.split_off(1))?),
                Some("range") => nodes.push(self.branch(BranchKind::Range, line, tokens.split_off(1))?),
                Some("with") => nodes.push(self.branch(BranchKind::With, line, tokens.split_off(1))?),
                Some(name) if UNSUPPORTED_KEYWORDS.contains(&name) => {
                    return Err(TemplateError::parse(line, format!("unsupported action {{{{{name}}}}}")));
                },
                _ => nodes.push(Node::Action(self.pipeline(line, &tokens)?)),
            }
        }

        Ok((nodes, None))
    }

    fn branch(&mut self, kind: BranchKind, line: usize, tokens: Vec<Token>) -> Result<Node> {
        if tokens.is_empty() {
            return Err(TemplateError::parse(
                line,
                format!("missing value for {}", kind.keyword()),
            ));
        }
        let pipe = self.pipeline(line, &tokens)?;
        let (body, terminator) = self.list()?;

        let otherwise = match terminator {
            None => {
                return Err(TemplateError::parse(
                    line,
                    format!("unexpected EOF: missing {{{{end}}}} for {{{{{}}}}}", kind.keyword()),
                ));
            },
            Some((_, Terminator::End)) => Vec::new(),
            Some((_, Terminator::Else { line: else_line, mut tokens })) => {
                if tokens.is_empty() {
                    let (otherwise, terminator) = self.list()?;
                    match terminator {
                        Some((_, Terminator::End)) => otherwise,
                        Some((extra, Terminator::Else { .. })) => {
                            return Err(TemplateError::parse(extra, "expected end; found else"));
                        },
                        None => {
                            return Err(TemplateError::parse(
                                else_line,
                                format!("unexpected EOF: missing {{{{end}}}} for {{{{{}}}}}", kind.keyword()),
                            ));
                        },
                    }
                } else if kind == BranchKind::If && tokens.first() == Some(&Token::Ident("if".into())) {
                    // `else if` shares the enclosing `end`
                    vec![self.branch(BranchKind::If, else_line, tokens.split_off(1))?]
                } else {
                    return Err(TemplateError::parse(else_line, "unexpected tokens after else"));
                }
            },
        };

        let branch = Branch {
            pipe,
            body,
            otherwise,
        };
        Ok(match kind {
            BranchKind::If => Node::If(branch),
            BranchKind::Range => Node::Range(branch),
            BranchKind::With => Node::With(branch),
        })
    }

    fn pipeline(&self, line: usize, tokens: &[Token]) -> Result<Pipeline> {
        let mut commands = Vec::new();
        let mut start = 0;
        let mut depth = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| TemplateError::parse(line, "unexpected right paren"))?;
                },
                Token::Pipe if depth == 0 => {
                    commands.push(self.command(line, &tokens[start..i])?);
                    start = i + 1;
                },
                _ => {},
            }
        }
        if depth != 0 {
            return Err(TemplateError::parse(line, "unclosed left paren"));
        }
        commands.push(self.command(line, &tokens[start..])?);

        Ok(Pipeline { line, commands })
    }

    fn command(&self, line: usize, tokens: &[Token]) -> Result<Command> {
        if tokens.is_empty() {
            return Err(TemplateError::parse(line, "missing command"));
        }

        let mut operands = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let operand = match &tokens[i] {
                Token::Dot => Operand::Dot,
                Token::Field(path) => Operand::Field(path.clone()),
                Token::Str(s) => Operand::Literal(Value::String(s.clone())),
                Token::Int(n) => Operand::Literal(Value::from(*n)),
                Token::Float(f) => Operand::Literal(Value::from(*f)),
                Token::Bool(b) => Operand::Literal(Value::Bool(*b)),
                Token::Nil => Operand::Literal(Value::Null),
                Token::Ident(name) => {
                    if !is_builtin(name) && !self.funcs.contains(name) {
                        return Err(TemplateError::parse(line, format!("function {name:?} not defined")));
                    }
                    Operand::Call(name.clone())
                },
                Token::LParen => {
                    let close = matching_paren(tokens, i)
                        .ok_or_else(|| TemplateError::parse(line, "unclosed left paren"))?;
                    let inner = self.pipeline(line, &tokens[i + 1..close])?;
                    i = close;
                    Operand::Sub(inner)
                },
                Token::RParen => return Err(TemplateError::parse(line, "unexpected right paren")),
                Token::Pipe => return Err(TemplateError::parse(line, "missing command")),
            };
            operands.push(operand);
            i += 1;
        }

        Ok(Command { operands })
    }
}

fn matching_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            },
            _ => {},
        }
    }
    None
}
