use std::collections::BTreeMap;
use std::fmt::Display;

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

use crate::lex::{Token, TokenKind, TokenStream};
use crate::math;

#[derive(Error, Debug, Diagnostic)]
#[error("invalid equation")]
#[diagnostic(help("the equation ended before it was complete"))]
pub struct IncompleteEquationError {
    #[source_code]
    src: NamedSource<String>,

    #[label("expected more input here")]
    bad_bit: SourceSpan,
}

#[derive(Error, Debug, Diagnostic)]
#[error("syntax error: unexpected token near: {word}")]
#[diagnostic(help("the grammar is `term ((+|-) term)* = term ((+|-) term)*`"))]
pub struct UnexpectedTokenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("near this token")]
    bad_bit: SourceSpan,

    pub word: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("calculation error: coefficient is {fault} at degree {degree}")]
#[diagnostic(help("the accumulated coefficient left the finite f64 range"))]
pub struct CoefficientRangeError {
    pub degree: i32,
    pub fault: &'static str,
}

/// One signed monomial, alive only while its tokens are being consumed.
struct Term {
    coefficient: f64,
    base: Option<Base>,
    degree: i32,
}

struct Base {
    letter: char,
    /// Index of the base token, cited when the letter conflicts with the
    /// variable bound earlier in the equation.
    at: usize,
}

/// The equation moved entirely to the left-hand side: degree -> coefficient,
/// canonicalized so the highest nonzero coefficient is strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    terms: BTreeMap<i32, f64>,
    variable: Option<char>,
}

impl Polynomial {
    /// Highest degree present; 0 for the all-zero polynomial.
    pub fn degree(&self) -> i32 {
        self.terms.keys().next_back().copied().unwrap_or(0)
    }

    pub fn min_degree(&self) -> i32 {
        self.terms.keys().next().copied().unwrap_or(0)
    }

    pub fn coefficient(&self, degree: i32) -> f64 {
        self.terms.get(&degree).copied().unwrap_or(0.0)
    }

    /// The nonzero `(degree, coefficient)` pairs in ascending degree order.
    pub fn terms(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.terms
            .iter()
            .map(|(&degree, &coefficient)| (degree, coefficient))
            .filter(|&(_, coefficient)| coefficient != 0.0)
    }

    pub fn reduced_form(&self) -> String {
        self.to_string()
    }

    #[cfg(test)]
    pub(crate) fn from_terms<I>(terms: I, variable: Option<char>) -> Self
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        Polynomial {
            terms: terms.into_iter().collect(),
            variable,
        }
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variable = self.variable.unwrap_or('X');
        let mut rendered = false;
        for (&degree, &coefficient) in self.terms.iter().rev() {
            if coefficient == 0.0 {
                continue;
            }
            if rendered {
                f.write_str(if coefficient < 0.0 { " - " } else { " + " })?;
            } else if coefficient < 0.0 {
                // only reachable on an unreduced polynomial
                f.write_str("-")?;
            }
            let magnitude = coefficient.abs();
            match degree {
                0 => write!(f, "{magnitude}")?,
                1 => write!(f, "{magnitude} * {variable}")?,
                _ => write!(f, "{magnitude} * {variable}^{degree}")?,
            }
            rendered = true;
        }
        if !rendered {
            f.write_str("0")?;
        }
        f.write_str(" = 0")
    }
}

/// Consumes the whole token stream as `expression = expression` and returns
/// the accumulated, validated, reduced polynomial.
pub fn parse_equation(tokens: &TokenStream<'_>) -> Result<Polynomial, Error> {
    Parser::new(tokens).run()
}

enum State {
    ParsingLhs,
    ExpectEquals,
    ParsingRhs,
    Done,
}

struct Parser<'t, 'de> {
    tokens: &'t TokenStream<'de>,
    polynomial: BTreeMap<i32, f64>,
    variable: Option<char>,
}

impl<'t, 'de> Parser<'t, 'de> {
    fn new(tokens: &'t TokenStream<'de>) -> Self {
        Parser {
            tokens,
            polynomial: BTreeMap::new(),
            variable: None,
        }
    }

    fn run(mut self) -> Result<Polynomial, Error> {
        let mut state = State::ParsingLhs;
        let mut at = 0;
        loop {
            (state, at) = match state {
                State::ParsingLhs => {
                    let at = self
                        .parse_expression(at, true)
                        .map_err(|bad| self.error_at(bad))?;
                    (State::ExpectEquals, at)
                }
                State::ExpectEquals => {
                    let at = self
                        .expect(at, TokenKind::Equal)
                        .map_err(|bad| self.error_at(bad))?;
                    (State::ParsingRhs, at)
                }
                State::ParsingRhs => {
                    let at = self
                        .parse_expression(at, false)
                        .map_err(|bad| self.error_at(bad))?;
                    (State::Done, at)
                }
                State::Done => break,
            };
        }
        if at < self.tokens.len() {
            return Err(self.error_at(at));
        }
        self.validate()?;
        Ok(self.reduce())
    }

    /// Consumes terms until `=` or the end of the stream. At least one term
    /// is required. Failures carry the position to cite.
    fn parse_expression(&mut self, mut at: usize, is_lhs: bool) -> Result<usize, usize> {
        let start = at;
        while self
            .peek(at)
            .is_some_and(|token| token.kind != TokenKind::Equal)
        {
            let (term, next) = self.parse_term(at)?;
            self.accumulate(term, is_lhs)?;
            at = next;
        }
        if at == start {
            return Err(at);
        }
        Ok(at)
    }

    /// `term := [sign] [coefficient ['*']] [base ['^' exponent]]`, with at
    /// least a coefficient or a base present. Every rejection cites the
    /// term's first token.
    fn parse_term(&self, start: usize) -> Result<(Term, usize), usize> {
        let mut at = start;
        let mut sign = 1.0;
        match self.peek(at).map(|token| token.kind) {
            Some(TokenKind::Plus) => at += 1,
            Some(TokenKind::Minus) => {
                sign = -1.0;
                at += 1;
            }
            _ => {}
        }

        let mut coefficient = None;
        if let Some(token) = self.peek(at) {
            if matches!(token.kind, TokenKind::Integer | TokenKind::Decimal) {
                coefficient = Some(parse_coefficient(token.word).ok_or(start)?);
                at += 1;
                // an explicit `*` must be followed by a base letter
                if self.peek(at).is_some_and(|token| token.kind == TokenKind::Mul) {
                    at += 1;
                    if !self.peek(at).is_some_and(|token| token.kind == TokenKind::Char) {
                        return Err(start);
                    }
                }
            }
        }

        let mut base = None;
        let mut degree = 0;
        if let Some(token) = self.peek(at) {
            if token.kind == TokenKind::Char {
                base = token.word.chars().next().map(|letter| Base { letter, at });
                at += 1;
                degree = 1;
                if self.peek(at).is_some_and(|token| token.kind == TokenKind::Pow) {
                    at += 1;
                    let exponent = self
                        .peek(at)
                        .filter(|token| token.kind == TokenKind::Integer)
                        .ok_or(start)?;
                    degree = exponent.word.parse().map_err(|_| start)?;
                    at += 1;
                }
            }
        }

        if coefficient.is_none() && base.is_none() {
            // empty term, or a sign with nothing behind it
            return Err(start);
        }

        Ok((
            Term {
                coefficient: sign * coefficient.unwrap_or(1.0),
                base,
                degree,
            },
            at,
        ))
    }

    /// Binds the equation's variable on the first degree >= 1 term and folds
    /// the term into the polynomial, negated on the right-hand side.
    fn accumulate(&mut self, term: Term, is_lhs: bool) -> Result<(), usize> {
        if let Some(base) = &term.base {
            match self.variable {
                Some(bound) if bound != base.letter => return Err(base.at),
                Some(_) => {}
                None => {
                    if term.degree >= 1 {
                        self.variable = Some(base.letter);
                    }
                }
            }
        }
        let side = if is_lhs { 1.0 } else { -1.0 };
        *self.polynomial.entry(term.degree).or_insert(0.0) += term.coefficient * side;
        Ok(())
    }

    fn expect(&self, at: usize, kind: TokenKind) -> Result<usize, usize> {
        match self.peek(at) {
            Some(token) if token.kind == kind => Ok(at + 1),
            _ => Err(at),
        }
    }

    fn peek(&self, at: usize) -> Option<&Token<'de>> {
        self.tokens.get(at)
    }

    fn error_at(&self, at: usize) -> Error {
        let whole = self.tokens.whole();
        let src = NamedSource::new("<equation>", whole.to_string());
        match self.tokens.get(at) {
            Some(token) => UnexpectedTokenError {
                src,
                bad_bit: SourceSpan::from(token.offset..token.offset + token.word.len()),
                word: token.word.to_string(),
            }
            .into(),
            None => IncompleteEquationError {
                src,
                bad_bit: SourceSpan::from(whole.len()..whole.len()),
            }
            .into(),
        }
    }

    /// Scans the accumulated coefficients in ascending degree order and
    /// rejects the first non-finite one. NaN cannot arise from summing
    /// finite coefficients, the check is kept symmetric anyway.
    fn validate(&self) -> Result<(), Error> {
        for (&degree, &coefficient) in &self.polynomial {
            if coefficient.is_infinite() {
                return Err(CoefficientRangeError {
                    degree,
                    fault: "infinity",
                }
                .into());
            }
            if coefficient.is_nan() {
                return Err(CoefficientRangeError {
                    degree,
                    fault: "nan",
                }
                .into());
            }
        }
        Ok(())
    }

    /// Drops exact-zero entries (keeping `{0: 0.0}` if everything cancelled)
    /// and flips every sign when the leading coefficient is negative.
    fn reduce(mut self) -> Polynomial {
        self.polynomial.retain(|_, coefficient| *coefficient != 0.0);
        if self.polynomial.is_empty() {
            self.polynomial.insert(0, 0.0);
        }
        let leading = self.polynomial.values().next_back().copied().unwrap_or(0.0);
        if leading < 0.0 {
            for coefficient in self.polynomial.values_mut() {
                *coefficient = math::normalize_zero(-*coefficient);
            }
        }
        Polynomial {
            terms: self.polynomial,
            variable: self.variable,
        }
    }
}

/// The token's lexical value is always non-negative; the sign lives on the
/// term. Values that overflow to infinity or underflow to a subnormal are
/// rejected, matching what `strtod`-based parsing accepted upstream.
fn parse_coefficient(word: &str) -> Option<f64> {
    let value: f64 = word.parse().ok()?;
    (value == 0.0 || value.is_normal()).then_some(value)
}
