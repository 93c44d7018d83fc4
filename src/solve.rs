use std::fmt::Display;

use crate::math;
use crate::parse::Polynomial;

/// Degrees outside `MIN_DEGREE..=MAX_DEGREE` are reported, not solved.
pub const MIN_DEGREE: i32 = 0;
pub const MAX_DEGREE: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EquationType {
    Quadratic,
    Linear,
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionType {
    TwoRealQuadratic,
    TwoComplexQuadratic,
    OneRealQuadratic,
    OneRealLinear,
    Indeterminate,
    NoSolution,
    NoSolutionDegreeTooHigh,
    NoSolutionDegreeTooLow,
    CalculationError,
}

impl SolutionType {
    /// The line announcing the solutions, printed before them.
    pub fn banner(&self) -> &'static str {
        match self {
            SolutionType::TwoRealQuadratic => "Discriminant is positive, the two solutions are:",
            SolutionType::TwoComplexQuadratic => {
                "Discriminant is negative, the two solutions are:"
            }
            SolutionType::OneRealQuadratic => "Discriminant is zero, the solution is:",
            SolutionType::OneRealLinear => "The solution is:",
            SolutionType::Indeterminate => "The equation is indeterminate, infinite solutions.",
            SolutionType::NoSolution => "I can't solve.",
            SolutionType::NoSolutionDegreeTooHigh => {
                "The polynomial degree is strictly greater than 2, I can't solve."
            }
            SolutionType::NoSolutionDegreeTooLow => {
                "The polynomial degree is strictly less than 0, I can't solve."
            }
            SolutionType::CalculationError => "Calculation error occurred, I can't solve.",
        }
    }
}

/// A root; `im` stays 0 except in the negative-discriminant case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub re: f64,
    pub im: f64,
}

impl Solution {
    fn real(re: f64) -> Self {
        Solution { re, im: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub kind: SolutionType,
    pub solutions: Vec<Solution>,
}

impl Outcome {
    fn empty(kind: SolutionType) -> Self {
        Outcome {
            kind,
            solutions: Vec::new(),
        }
    }

    /// Renders one solution line the way the driver prints it.
    pub fn display<'a>(&self, solution: &'a Solution) -> DisplaySolution<'a> {
        DisplaySolution {
            solution,
            kind: self.kind,
        }
    }
}

pub struct DisplaySolution<'a> {
    solution: &'a Solution,
    kind: SolutionType,
}

impl Display for DisplaySolution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // positive reals keep a leading space so columns of roots line up
        if self.solution.re > 0.0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", self.solution.re)?;
        if self.kind == SolutionType::TwoComplexQuadratic {
            if self.solution.im > 0.0 {
                f.write_str("+")?;
            }
            write!(f, "{}i", self.solution.im)?;
        }
        Ok(())
    }
}

/// Solves the reduced polynomial. Degrees outside the supported range and a
/// non-finite discriminant yield an `Outcome` with no solutions.
pub fn solve(polynomial: &Polynomial) -> Outcome {
    if polynomial.min_degree() < MIN_DEGREE {
        return Outcome::empty(SolutionType::NoSolutionDegreeTooLow);
    }
    if polynomial.degree() > MAX_DEGREE {
        return Outcome::empty(SolutionType::NoSolutionDegreeTooHigh);
    }
    let a = polynomial.coefficient(2);
    let b = polynomial.coefficient(1);
    let c = polynomial.coefficient(0);
    match equation_type(a, b) {
        EquationType::Quadratic => solve_quadratic(a, b, c),
        EquationType::Linear => Outcome {
            kind: SolutionType::OneRealLinear,
            solutions: vec![Solution::real(math::normalize_zero(-c / b))],
        },
        EquationType::Constant if c == 0.0 => Outcome::empty(SolutionType::Indeterminate),
        EquationType::Constant => Outcome::empty(SolutionType::NoSolution),
    }
}

fn equation_type(a: f64, b: f64) -> EquationType {
    if a != 0.0 {
        EquationType::Quadratic
    } else if b != 0.0 {
        EquationType::Linear
    } else {
        EquationType::Constant
    }
}

fn solve_quadratic(a: f64, b: f64, c: f64) -> Outcome {
    let discriminant = b * b - 4.0 * a * c;
    if !discriminant.is_finite() {
        return Outcome::empty(SolutionType::CalculationError);
    }
    if discriminant < 0.0 {
        let re = math::normalize_zero(-b / 2.0 / a);
        let im = math::normalize_zero(math::sqrt(-discriminant) / 2.0 / a);
        return Outcome {
            kind: SolutionType::TwoComplexQuadratic,
            solutions: vec![Solution { re, im }, Solution { re, im: -im }],
        };
    }
    if discriminant == 0.0 {
        return Outcome {
            kind: SolutionType::OneRealQuadratic,
            solutions: vec![Solution::real(math::normalize_zero(-b / 2.0 / a))],
        };
    }
    let root = math::sqrt(discriminant);
    Outcome {
        kind: SolutionType::TwoRealQuadratic,
        solutions: vec![
            Solution::real(math::normalize_zero((-b + root) / 2.0 / a)),
            Solution::real(math::normalize_zero((-b - root) / 2.0 / a)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::tokenize;
    use crate::parse::parse_equation;

    fn solve_str(equation: &str) -> Outcome {
        let tokens = tokenize(equation).expect("equation should tokenize");
        let polynomial = parse_equation(&tokens).expect("equation should parse");
        solve(&polynomial)
    }

    fn roots(outcome: &Outcome) -> Vec<f64> {
        outcome.solutions.iter().map(|s| s.re).collect()
    }

    #[test]
    fn positive_discriminant_gives_two_real_roots_larger_first() {
        let outcome = solve_str("2X^2 + 3X - 5 = 0");
        assert_eq!(outcome.kind, SolutionType::TwoRealQuadratic);
        assert_eq!(roots(&outcome), vec![1.0, -2.5]);

        let outcome = solve_str("x^2 + 5x - 36-5x = 0");
        assert_eq!(roots(&outcome), vec![6.0, -6.0]);
    }

    #[test]
    fn zero_discriminant_gives_one_real_root() {
        let outcome = solve_str("4X^2 - 4X + 1 = 0");
        assert_eq!(outcome.kind, SolutionType::OneRealQuadratic);
        assert_eq!(roots(&outcome), vec![0.5]);

        let outcome = solve_str("X^2 - 6X + 9 = 0");
        assert_eq!(roots(&outcome), vec![3.0]);

        let outcome = solve_str("X^2 = 0");
        assert_eq!(roots(&outcome), vec![0.0]);
        assert!(outcome.solutions[0].re.is_sign_positive(), "no -0 in output");
    }

    #[test]
    fn negative_discriminant_gives_a_conjugate_pair() {
        let outcome = solve_str("X^2 + 2X + 5 = 0");
        assert_eq!(outcome.kind, SolutionType::TwoComplexQuadratic);
        assert_eq!(
            outcome.solutions,
            vec![Solution { re: -1.0, im: 2.0 }, Solution { re: -1.0, im: -2.0 }]
        );

        let outcome = solve_str("X^2 + 4 = 0");
        assert_eq!(
            outcome.solutions,
            vec![Solution { re: 0.0, im: 2.0 }, Solution { re: 0.0, im: -2.0 }]
        );
        assert!(outcome.solutions[0].re.is_sign_positive(), "no -0 in output");
    }

    #[test]
    fn linear_equations_have_one_root() {
        let outcome = solve_str("X = 1");
        assert_eq!(outcome.kind, SolutionType::OneRealLinear);
        assert_eq!(roots(&outcome), vec![1.0]);

        let outcome = solve_str("5 * X^0 + 4 * X^1 = 4 * X^0");
        assert_eq!(roots(&outcome), vec![-0.25]);

        let outcome = solve_str("X = 0");
        assert_eq!(roots(&outcome), vec![0.0]);
        assert!(outcome.solutions[0].re.is_sign_positive(), "no -0 in output");
    }

    #[test]
    fn constant_equations_are_indeterminate_or_unsolvable() {
        let outcome = solve_str("1 = 1");
        assert_eq!(outcome.kind, SolutionType::Indeterminate);
        assert!(outcome.solutions.is_empty());

        let outcome = solve_str("1 = 0");
        assert_eq!(outcome.kind, SolutionType::NoSolution);
        assert!(outcome.solutions.is_empty());

        let outcome = solve_str("2 = 1");
        assert_eq!(outcome.kind, SolutionType::NoSolution);
    }

    #[test]
    fn degree_above_two_is_reported_not_solved() {
        let outcome = solve_str("X^3 = 0");
        assert_eq!(outcome.kind, SolutionType::NoSolutionDegreeTooHigh);
        assert!(outcome.solutions.is_empty());

        let outcome = solve_str("8 * X^0 - 6 * X^1 + 0 * X^2 - 5.6 * X^3 = 3 * X^0");
        assert_eq!(outcome.kind, SolutionType::NoSolutionDegreeTooHigh);
    }

    #[test]
    fn negative_degree_is_reported_not_solved() {
        let polynomial = Polynomial::from_terms([(-1, 1.0), (0, -2.0)], Some('X'));
        let outcome = solve(&polynomial);
        assert_eq!(outcome.kind, SolutionType::NoSolutionDegreeTooLow);
        assert!(outcome.solutions.is_empty());
    }

    #[test]
    fn overflowing_discriminant_is_a_calculation_error() {
        let polynomial = Polynomial::from_terms([(0, -1e308), (2, 1e308)], Some('X'));
        let outcome = solve(&polynomial);
        assert_eq!(outcome.kind, SolutionType::CalculationError);
        assert!(outcome.solutions.is_empty());
    }

    #[test]
    fn solution_lines_render_with_alignment_and_imaginary_part() {
        let outcome = solve_str("X^2 + 2X + 5 = 0");
        let lines: Vec<String> = outcome
            .solutions
            .iter()
            .map(|s| outcome.display(s).to_string())
            .collect();
        assert_eq!(lines, vec!["-1+2i", "-1-2i"]);

        let outcome = solve_str("2X^2 + 3X - 5 = 0");
        let lines: Vec<String> = outcome
            .solutions
            .iter()
            .map(|s| outcome.display(s).to_string())
            .collect();
        assert_eq!(lines, vec![" 1", "-2.5"]);

        let outcome = solve_str("X = 0");
        assert_eq!(outcome.display(&outcome.solutions[0]).to_string(), "0");
    }
}
