//! A solver for single-variable polynomial equations of degree two or less.
//!
//! The pipeline is `lex` (split and tag the raw text), `parse` (grammar,
//! accumulation into a reduced polynomial), `solve` (classify and extract
//! the roots). [`calc_equation`] drives all three and writes the report.

pub mod lex;
pub mod math;
pub mod parse;
pub mod solve;

use std::io::Write;

pub use lex::{TokenStream, tokenize};
pub use parse::{Polynomial, parse_equation};
pub use solve::{Outcome, Solution, SolutionType, solve};

/// Whether the equation produced at least one root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl From<Status> for std::process::ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => std::process::ExitCode::SUCCESS,
            Status::Failure => std::process::ExitCode::FAILURE,
        }
    }
}

/// Configures a run of the pipeline. The default prints only the report;
/// [`Computor::verbose`] adds the token stream and the solution class on
/// the error sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct Computor {
    verbose: bool,
}

impl Computor {
    pub fn new() -> Self {
        Computor::default()
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Runs the whole pipeline on `equation`, writing the report to `out`
    /// and diagnostics to `err`. Only sink failures surface as `Err`; a bad
    /// equation is reported on `err` and returned as [`Status::Failure`].
    pub fn calc_equation(
        &self,
        equation: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> std::io::Result<Status> {
        let tokens = match tokenize(equation) {
            Ok(tokens) => tokens,
            Err(report) => {
                writeln!(err, "[Error] {report}")?;
                return Ok(Status::Failure);
            }
        };
        if self.verbose {
            for token in tokens.iter() {
                writeln!(err, "{token}")?;
            }
        }

        let polynomial = match parse_equation(&tokens) {
            Ok(polynomial) => polynomial,
            Err(report) => {
                writeln!(err, "[Error] {report}")?;
                return Ok(Status::Failure);
            }
        };
        writeln!(out, "Reduced form     : {polynomial}")?;
        writeln!(out, "Polynomial degree: {}", polynomial.degree())?;

        let outcome = solve(&polynomial);
        if self.verbose {
            writeln!(err, "solution type: {:?}", outcome.kind)?;
        }
        writeln!(out, "{}", outcome.kind.banner())?;
        for solution in &outcome.solutions {
            writeln!(out, "{}", outcome.display(solution))?;
        }

        Ok(if outcome.solutions.is_empty() {
            Status::Failure
        } else {
            Status::Success
        })
    }
}

/// [`Computor::calc_equation`] with the default configuration.
pub fn calc_equation(
    equation: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> std::io::Result<Status> {
    Computor::new().calc_equation(equation, out, err)
}
