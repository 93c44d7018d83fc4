use std::fmt::Display;
use std::ops::Deref;

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("empty equation")]
#[diagnostic(help("supply an equation such as `1 * X^2 - 4 = 0`"))]
pub struct EmptyEquationError;

#[derive(Error, Debug, Diagnostic)]
#[error("syntax error: unexpected token: {word}")]
#[diagnostic(help("remove or correct the token: `{word}`"))]
pub struct UnknownTokenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this token")]
    bad_bit: SourceSpan,

    pub word: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A single letter, the candidate variable of a term.
    Char,
    Integer,
    Decimal,
    /// `^`
    Pow,
    Plus,
    Minus,
    Mul,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub word: &'de str,
    pub kind: TokenKind,
    /// Byte offset of `word` in the original equation.
    pub offset: usize,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = self.word;
        match self.kind {
            TokenKind::Char => write!(f, "CHAR {word}"),
            TokenKind::Integer => write!(f, "INTEGER {word}"),
            TokenKind::Decimal => write!(f, "DECIMAL {word}"),
            TokenKind::Pow => write!(f, "POW {word}"),
            TokenKind::Plus => write!(f, "PLUS {word}"),
            TokenKind::Minus => write!(f, "MINUS {word}"),
            TokenKind::Mul => write!(f, "MUL {word}"),
            TokenKind::Equal => write!(f, "EQUAL {word}"),
        }
    }
}

/// The classified tokens of one equation, in input order, together with the
/// original text so later stages can attach labeled spans to diagnostics.
#[derive(Debug)]
pub struct TokenStream<'de> {
    whole: &'de str,
    tokens: Vec<Token<'de>>,
}

impl<'de> TokenStream<'de> {
    pub fn whole(&self) -> &'de str {
        self.whole
    }
}

impl<'de> Deref for TokenStream<'de> {
    type Target = [Token<'de>];

    fn deref(&self) -> &Self::Target {
        &self.tokens
    }
}

/// Splits `equation` into classified tokens.
///
/// Splitting keeps each operator character (`= * + - ^`) as its own token,
/// then separates a numeric prefix from a letter suffix inside words such as
/// `2X`. Classification is total: the first word that is neither an operator,
/// a single letter, an integer, nor a decimal fails the whole tokenization.
pub fn tokenize(equation: &str) -> Result<TokenStream<'_>, Error> {
    let words = split_equation(equation);
    if words.is_empty() {
        return Err(EmptyEquationError.into());
    }

    let mut tokens = Vec::with_capacity(words.len());
    for (offset, word) in words {
        let Some(kind) = classify(word) else {
            return Err(UnknownTokenError {
                src: NamedSource::new("<equation>", equation.to_string()),
                bad_bit: SourceSpan::from(offset..offset + word.len()),
                word: word.to_string(),
            }
            .into());
        };
        tokens.push(Token { word, kind, offset });
    }

    Ok(TokenStream {
        whole: equation,
        tokens,
    })
}

fn split_equation<'a>(equation: &'a str) -> Vec<(usize, &'a str)> {
    let mut words = Vec::new();
    let mut start = None;

    let flush = |words: &mut Vec<(usize, &'a str)>, start: &mut Option<usize>, end: usize| {
        if let Some(begin) = start.take() {
            words.push((begin, &equation[begin..end]));
        }
    };

    for (at, c) in equation.char_indices() {
        match c {
            _ if c.is_whitespace() => flush(&mut words, &mut start, at),
            '=' | '*' | '+' | '-' | '^' => {
                flush(&mut words, &mut start, at);
                words.push((at, &equation[at..at + c.len_utf8()]));
            }
            _ => {
                start.get_or_insert(at);
            }
        }
    }
    flush(&mut words, &mut start, equation.len());

    let mut split = Vec::with_capacity(words.len());
    for (offset, word) in words {
        match split_coef_and_base(word) {
            Some((coef, base)) => {
                split.push((offset, coef));
                split.push((offset + coef.len(), base));
            }
            None => split.push((offset, word)),
        }
    }
    split
}

/// `"2X"` -> `("2", "X")`, `"1.02xyz"` -> `("1.02", "xyz")`. The split only
/// happens when the numeric prefix is already a well-formed integer or
/// decimal, so `"12.3.X"` stays whole and fails classification as one word.
fn split_coef_and_base(word: &str) -> Option<(&str, &str)> {
    if !word.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let at = word.find(|c: char| c.is_ascii_alphabetic())?;
    let (coef, base) = word.split_at(at);
    (is_integer(coef) || is_decimal(coef)).then_some((coef, base))
}

fn classify(word: &str) -> Option<TokenKind> {
    match word {
        "=" => Some(TokenKind::Equal),
        "*" => Some(TokenKind::Mul),
        "+" => Some(TokenKind::Plus),
        "-" => Some(TokenKind::Minus),
        "^" => Some(TokenKind::Pow),
        _ if is_char(word) => Some(TokenKind::Char),
        _ if is_integer(word) => Some(TokenKind::Integer),
        _ if is_decimal(word) => Some(TokenKind::Decimal),
        _ => None,
    }
}

fn is_char(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), None) if c.is_ascii_alphabetic()
    )
}

// Length-unbounded on purpose: "00123" and a 47-digit run are both integers
// here, range checking belongs to the parser.
fn is_integer(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(word: &str) -> bool {
    match word.split_once('.') {
        Some((int, frac)) => is_integer(int) && is_integer(frac),
        None => false,
    }
}
