use std::io::{stderr, stdout};
use std::process::ExitCode;

use clap::Parser;
use computor::Computor;
use miette::IntoDiagnostic;

#[derive(Parser, Debug)]
#[command(about = "Solves a single-variable polynomial equation of degree two or less")]
struct Args {
    /// The equation, e.g. "5 * X^0 + 4 * X^1 - 9.3 * X^2 = 1 * X^0"
    equation: String,

    /// Also print the token stream and the solution class on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> miette::Result<ExitCode> {
    let args = Args::parse();

    let status = Computor::new()
        .verbose(args.verbose)
        .calc_equation(&args.equation, &mut stdout().lock(), &mut stderr().lock())
        .into_diagnostic()?;

    Ok(status.into())
}
