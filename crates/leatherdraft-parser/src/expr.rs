//! Arithmetic expression syntax.
//!
//! The grammar is a closed subset: numeric literals, names, one level of dotted attribute
//! access, `+ - * / **`, unary minus and calls to `abs`, `min`, `max` and `round`. Anything
//! else is rejected while parsing, so the evaluator only ever sees the variants below.

use crate::error::{EvalError, EvalErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abs,
    Min,
    Max,
    Round,
}

impl Builtin {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "abs" => Some(Builtin::Abs),
            "min" => Some(Builtin::Min),
            "max" => Some(Builtin::Max),
            "round" => Some(Builtin::Round),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Round => "round",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Name(String),
    Attribute {
        base: String,
        attr: String,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Builtin,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Parse `src` into an expression tree.
    pub fn parse(src: &str) -> Result<Expr, EvalError> {
        let tokens = tokenize(src).map_err(|kind| EvalError::new(src, kind))?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            end: src.len(),
            depth: 0,
        };
        let expr = parser
            .parse_complete()
            .map_err(|kind| EvalError::new(src, kind))?;
        Ok(expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    LParen,
    RParen,
    Comma,
    Dot,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Number(n) => format!("number {n}"),
            Tok::Ident(s) => format!("name \"{s}\""),
            Tok::Plus => "\"+\"".into(),
            Tok::Minus => "\"-\"".into(),
            Tok::Star => "\"*\"".into(),
            Tok::StarStar => "\"**\"".into(),
            Tok::Slash => "\"/\"".into(),
            Tok::LParen => "\"(\"".into(),
            Tok::RParen => "\")\"".into(),
            Tok::Comma => "\",\"".into(),
            Tok::Dot => "\".\"".into(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn syntax(offset: usize, message: impl Into<String>) -> EvalErrorKind {
    EvalErrorKind::Syntax {
        offset,
        message: message.into(),
    }
}

fn tokenize(src: &str) -> Result<Vec<(usize, Tok)>, EvalErrorKind> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, c)| c);

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            let mut seen_dot = false;
            let mut seen_exp = false;
            while i < chars.len() {
                let ch = chars[i].1;
                if ch.is_ascii_digit() || ch == '_' {
                    i += 1;
                } else if ch == '.' && !seen_dot && !seen_exp {
                    seen_dot = true;
                    i += 1;
                } else if (ch == 'e' || ch == 'E') && !seen_exp {
                    seen_exp = true;
                    i += 1;
                    if matches!(chars.get(i), Some(&(_, '+' | '-'))) {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let end = chars.get(i).map_or(src.len(), |&(o, _)| o);
            let text = &src[offset..end];
            if text.ends_with('_') || text.contains("__") {
                return Err(syntax(offset, format!("malformed number \"{text}\"")));
            }
            let value = text
                .replace('_', "")
                .parse::<f64>()
                .map_err(|_| syntax(offset, format!("malformed number \"{text}\"")))?;
            if chars.get(i).is_some_and(|&(_, ch)| is_ident_start(ch)) {
                return Err(syntax(
                    chars[i].0,
                    format!("unexpected character after number \"{text}\""),
                ));
            }
            out.push((offset, Tok::Number(value)));
            continue;
        }

        if is_ident_start(c) {
            let start = offset;
            i += 1;
            while i < chars.len() && is_ident_continue(chars[i].1) {
                i += 1;
            }
            let end = chars.get(i).map_or(src.len(), |&(o, _)| o);
            out.push((start, Tok::Ident(src[start..end].to_string())));
            continue;
        }

        let tok = match c {
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' if next == Some('*') => {
                i += 1;
                Tok::StarStar
            }
            '*' => Tok::Star,
            '/' if next == Some('/') => {
                return Err(EvalErrorKind::ForbiddenOperator { op: "//".into() });
            }
            '/' => Tok::Slash,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            ',' => Tok::Comma,
            '.' => Tok::Dot,
            '%' | '<' | '>' | '=' | '!' | '&' | '|' | '^' | '~' | '@' => {
                let mut op = c.to_string();
                if let Some(n) = next.filter(|n| matches!(*n, '=' | '<' | '>' | '&' | '|')) {
                    op.push(n);
                }
                return Err(EvalErrorKind::ForbiddenOperator { op });
            }
            '"' | '\'' => return Err(syntax(offset, "string literals are not allowed")),
            '[' | ']' | '{' | '}' => {
                return Err(syntax(offset, "collection literals are not allowed"))
            }
            other => return Err(syntax(offset, format!("unexpected character '{other}'"))),
        };
        out.push((offset, tok));
        i += 1;
    }

    Ok(out)
}

/// Deepest nesting of parentheses, signs and exponents a single expression may use.
pub const MAX_NESTING: usize = 100;

struct Parser<'a> {
    tokens: &'a [(usize, Tok)],
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(o, _)| *o)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        tok
    }

    fn expect(&mut self, want: &Tok) -> Result<(), EvalErrorKind> {
        match self.peek() {
            Some(t) if t == want => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(syntax(
                self.offset(),
                format!("expected {}, found {}", want.describe(), t.describe()),
            )),
            None => Err(syntax(
                self.end,
                format!("expected {}, found end of input", want.describe()),
            )),
        }
    }

    fn parse_complete(&mut self) -> Result<Expr, EvalErrorKind> {
        if self.tokens.is_empty() {
            return Err(syntax(0, "empty expression"));
        }
        let expr = self.parse_additive()?;
        if let Some(t) = self.peek() {
            return Err(syntax(
                self.offset(),
                format!("unexpected {}", t.describe()),
            ));
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalErrorKind> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Plus) => BinaryOp::Add,
                Some(Tok::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Expr, EvalErrorKind> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Star) => BinaryOp::Mul,
                Some(Tok::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    // Every nested sub-expression passes through here, so this is where depth is counted.
    fn parse_unary(&mut self) -> Result<Expr, EvalErrorKind> {
        if self.depth >= MAX_NESTING {
            return Err(syntax(
                self.offset(),
                format!("expression nests deeper than {MAX_NESTING} levels"),
            ));
        }
        self.depth += 1;
        let expr = self.parse_signed();
        self.depth -= 1;
        expr
    }

    fn parse_signed(&mut self) -> Result<Expr, EvalErrorKind> {
        match self.peek() {
            Some(Tok::Minus) => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            Some(Tok::Plus) => Err(EvalErrorKind::ForbiddenOperator {
                op: "unary +".into(),
            }),
            _ => self.parse_power(),
        }
    }

    // `**` binds tighter than a unary minus on its left and is right-associative.
    fn parse_power(&mut self) -> Result<Expr, EvalErrorKind> {
        let base = self.parse_primary()?;
        if matches!(self.peek(), Some(Tok::StarStar)) {
            self.pos += 1;
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalErrorKind> {
        let offset = self.offset();
        let Some(tok) = self.bump() else {
            return Err(syntax(self.end, "unexpected end of input"));
        };
        let expr = match tok {
            Tok::Number(n) => Expr::Literal(n),
            Tok::LParen => {
                let inner = self.parse_additive()?;
                self.expect(&Tok::RParen)?;
                inner
            }
            Tok::Ident(name) => match self.peek() {
                Some(Tok::LParen) => {
                    let func = Builtin::from_name(&name)
                        .ok_or(EvalErrorKind::ForbiddenCall { name })?;
                    self.pos += 1;
                    let args = self.parse_args()?;
                    Expr::Call { func, args }
                }
                Some(Tok::Dot) => {
                    self.pos += 1;
                    let attr_offset = self.offset();
                    let attr = match self.bump() {
                        Some(Tok::Ident(attr)) => attr,
                        _ => return Err(syntax(attr_offset, "expected attribute name after \".\"")),
                    };
                    if matches!(self.peek(), Some(Tok::LParen)) {
                        return Err(EvalErrorKind::ForbiddenCall {
                            name: format!("{name}.{attr}"),
                        });
                    }
                    Expr::Attribute { base: name, attr }
                }
                _ => Expr::Name(name),
            },
            other => {
                return Err(syntax(offset, format!("unexpected {}", other.describe())));
            }
        };

        match self.peek() {
            Some(Tok::Dot) => Err(syntax(
                self.offset(),
                "only one level of attribute access is allowed",
            )),
            Some(Tok::LParen) => Err(EvalErrorKind::ForbiddenCall {
                name: "<expression>".into(),
            }),
            _ => Ok(expr),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, EvalErrorKind> {
        let mut args = Vec::new();
        if matches!(self.peek(), Some(Tok::RParen)) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_additive()?);
            match self.peek() {
                Some(Tok::Comma) => {
                    self.pos += 1;
                }
                _ => {
                    self.expect(&Tok::RParen)?;
                    return Ok(args);
                }
            }
        }
    }
}
