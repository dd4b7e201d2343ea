//! Arithmetic evaluator for the `calcular` command.
//!
//! Portuguese operator words are rewritten to symbols, then the result is
//! tokenized against a fixed alphabet and evaluated by a small
//! recursive-descent parser. Nothing is ever executed dynamically.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary (('**' | '^') unary)?
//! primary := number | 'pi' | func '(' expr ')' | '(' expr ')'
//! func    := sqrt | sin | cos | tan | log | abs
//! ```
//!
//! Unclosed parentheses are closed at end of input, so
//! `raiz quadrada de 16` (→ `sqrt( 16`) evaluates to 4.

use std::f64::consts::PI;

/// Word → symbol rewrites, applied in order. Longer phrases that contain a
/// shorter one ("cosseno de" ⊃ "seno de") come first.
const WORD_OPERATORS: &[(&str, &str)] = &[
    ("raiz quadrada de", "sqrt("),
    ("porcentagem de", "*0.01*"),
    ("porcento de", "*0.01*"),
    ("cosseno de", "cos("),
    ("seno de", "sin("),
    ("tangente de", "tan("),
    ("logaritmo de", "log("),
    ("absoluto de", "abs("),
    ("multiplicado por", "*"),
    ("dividido por", "/"),
    ("elevado a", "**"),
    ("potência", "**"),
    ("potencia", "**"),
    ("adiciona", "+"),
    ("mais", "+"),
    ("soma", "+"),
    ("subtrai", "-"),
    ("menos", "-"),
    ("multiplicar", "*"),
    ("vezes", "*"),
    ("divide", "/"),
];

/// Nesting limit for parentheses, signs and exponents.
const MAX_DEPTH: usize = 128;

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    /// A character outside the allowed alphabet.
    #[error("invalid character: {0:?}")]
    InvalidCharacter(char),
    /// A name that is neither a whitelisted function nor `pi`.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// Malformed expression.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// Division by zero, square root of a negative, overflow.
    #[error("result is not a finite number")]
    NonFinite,
}

/// A successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    /// The symbolic expression that was evaluated.
    pub expression: String,
    /// The numeric result.
    pub value: f64,
}

impl Calculation {
    /// Integers print bare; anything else with 4 decimal places.
    pub fn formatted(&self) -> String {
        format_number(self.value)
    }
}

/// Rewrite operator words and evaluate.
///
/// # Errors
///
/// Returns a [`CalcError`] for anything outside the grammar or a
/// non-finite result.
pub fn calculate(input: &str) -> Result<Calculation, CalcError> {
    let expression = substitute_words(input);
    let value = evaluate(&expression)?;
    Ok(Calculation { expression, value })
}

/// Replace Portuguese operator words with symbols.
pub fn substitute_words(input: &str) -> String {
    let mut text = input.trim().to_lowercase();
    for (word, symbol) in WORD_OPERATORS {
        text = text.replace(word, symbol);
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Evaluate a symbolic expression.
///
/// # Errors
///
/// See [`calculate`].
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens = close_parens(tokenize(expression)?)?;
    if tokens.is_empty() {
        return Err(CalcError::Syntax("empty expression".into()));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(tok) = parser.peek() {
        return Err(CalcError::Syntax(format!("unexpected {tok:?}")));
    }
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}

/// Integers print bare; anything else with 4 decimal places.
pub fn format_number(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Func(Func),
    Pi,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Func {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Log,
    Abs,
}

impl Func {
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Log => x.ln(),
            Self::Abs => x.abs(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' | ',' => {
                let start = i;
                let mut seen_separator = false;
                while i < chars.len() {
                    match chars[i] {
                        '0'..='9' => i += 1,
                        '.' | ',' if !seen_separator => {
                            seen_separator = true;
                            i += 1;
                        }
                        _ => break,
                    }
                }
                let literal: String = chars[start..i]
                    .iter()
                    .map(|&ch| if ch == ',' { '.' } else { ch })
                    .collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| CalcError::Syntax(format!("bad number {literal:?}")))?;
                tokens.push(Token::Num(value));
            }
            'a'..='z' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_lowercase() {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                tokens.push(match name.as_str() {
                    "pi" => Token::Pi,
                    "sqrt" => Token::Func(Func::Sqrt),
                    "sin" => Token::Func(Func::Sin),
                    "cos" => Token::Func(Func::Cos),
                    "tan" => Token::Func(Func::Tan),
                    "log" => Token::Func(Func::Log),
                    "abs" => Token::Func(Func::Abs),
                    _ => return Err(CalcError::UnknownFunction(name)),
                });
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            _ => {
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '^' => Token::Pow,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    other => return Err(CalcError::InvalidCharacter(other)),
                });
                i += 1;
            }
        }
    }
    Ok(tokens)
}

fn close_parens(mut tokens: Vec<Token>) -> Result<Vec<Token>, CalcError> {
    let mut depth: usize = 0;
    for tok in &tokens {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CalcError::Syntax("unbalanced ')'".into()))?;
            }
            _ => {}
        }
    }
    tokens.extend(std::iter::repeat_n(Token::RParen, depth));
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                value += self.term()?;
            } else if self.eat(&Token::Minus) {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                value *= self.unary()?;
            } else if self.eat(&Token::Slash) {
                value /= self.unary()?;
            } else if self.eat(&Token::Percent) {
                value %= self.unary()?;
            } else {
                return Ok(value);
            }
        }
    }

    // Every recursive path passes through here.
    fn unary(&mut self) -> Result<f64, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::Syntax("expression too deep".into()));
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, CalcError> {
        if self.eat(&Token::Minus) {
            return Ok(-self.unary()?);
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.eat(&Token::Pow) {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Pi) => Ok(PI),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect_close()?;
                Ok(value)
            }
            Some(Token::Func(func)) => {
                if !self.eat(&Token::LParen) {
                    return Err(CalcError::Syntax("expected '(' after function".into()));
                }
                let arg = self.expr()?;
                self.expect_close()?;
                Ok(func.apply(arg))
            }
            Some(tok) => Err(CalcError::Syntax(format!("unexpected {tok:?}"))),
            None => Err(CalcError::Syntax("unexpected end of expression".into())),
        }
    }

    fn expect_close(&mut self) -> Result<(), CalcError> {
        if self.eat(&Token::RParen) {
            Ok(())
        } else {
            Err(CalcError::Syntax("expected ')'".into()))
        }
    }
}
