use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// Shown in place of a number after a failed evaluation
pub const ERROR_MARKER: &str = "Error";

/// Entered by the π button
pub const PI_INPUT: &str = "3.14159265359";

const ROUNDING_SCALE: f64 = 1e10;
const MAX_EXACT_INTEGER: f64 = 1e15;
const MAX_FACTORIAL: f64 = 170.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" | "−" => Some(Operator::Subtract),
            "*" | "×" | "x" => Some(Operator::Multiply),
            "/" | "÷" => Some(Operator::Divide),
            "^" => Some(Operator::Power),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
            Operator::Power => "^",
        }
    }

    pub fn apply(&self, lhs: f64, rhs: f64) -> Result<f64, CalculationError> {
        let result = match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => {
                if rhs == 0.0 {
                    return Err(CalculationError::DivideByZero);
                }
                lhs / rhs
            }
            Operator::Power => lhs.powf(rhs),
        };
        finite(result)
    }
}

/// Unary functions of the scientific keypad, applied to the display value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScientificFunction {
    SquareRoot,
    Sine,
    Cosine,
    Tangent,
    NaturalLog,
    Log10,
    Factorial,
    Square,
}

impl ScientificFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sqrt" | "√" => Some(ScientificFunction::SquareRoot),
            "sin" => Some(ScientificFunction::Sine),
            "cos" => Some(ScientificFunction::Cosine),
            "tan" => Some(ScientificFunction::Tangent),
            "ln" => Some(ScientificFunction::NaturalLog),
            "log" => Some(ScientificFunction::Log10),
            "!" | "fact" => Some(ScientificFunction::Factorial),
            "sq" | "x²" => Some(ScientificFunction::Square),
            _ => None,
        }
    }

    pub fn apply(&self, x: f64) -> Result<f64, CalculationError> {
        let result = match self {
            ScientificFunction::SquareRoot => {
                if x < 0.0 {
                    return Err(CalculationError::NegativeSquareRoot);
                }
                x.sqrt()
            }
            ScientificFunction::Sine => x.sin(),
            ScientificFunction::Cosine => x.cos(),
            ScientificFunction::Tangent => x.tan(),
            ScientificFunction::NaturalLog | ScientificFunction::Log10 => {
                if x <= 0.0 {
                    return Err(CalculationError::NonPositiveLogarithm);
                }
                if *self == ScientificFunction::NaturalLog {
                    x.ln()
                } else {
                    x.log10()
                }
            }
            ScientificFunction::Factorial => {
                if x < 0.0 || x.fract() != 0.0 {
                    return Err(CalculationError::InvalidFactorial);
                }
                if x > MAX_FACTORIAL {
                    return Err(CalculationError::NonFinite);
                }
                (1..=x as u32).fold(1.0, |acc, n| acc * n as f64)
            }
            ScientificFunction::Square => x * x,
        };
        finite(result)
    }
}

fn finite(value: f64) -> Result<f64, CalculationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalculationError::NonFinite)
    }
}

/// A single button press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Digit(u8),
    Decimal,
    Operator(Operator),
    Equals,
    Clear,
    Function(ScientificFunction),
    Pi,
}

impl Input {
    /// Parse a button label such as `7`, `.`, `×`, `=`, `c` or `sqrt`
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.len() == 1 {
            if let Some(d) = token.chars().next().and_then(|c| c.to_digit(10)) {
                return Some(Input::Digit(d as u8));
            }
        }

        match token {
            "." => Some(Input::Decimal),
            "=" => Some(Input::Equals),
            "c" | "C" | "AC" | "clear" => Some(Input::Clear),
            "pi" | "π" => Some(Input::Pi),
            _ => Operator::from_symbol(token)
                .map(Input::Operator)
                .or_else(|| ScientificFunction::from_name(token).map(Input::Function)),
        }
    }
}

/// Per-session calculator state; never persisted
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorState {
    pub display_value: String,
    pub pending_operand: Option<f64>,
    pub pending_operator: Option<Operator>,
    pub awaiting_new_operand: bool,
    /// Display holds the result of the last `=`
    pub final_answer: bool,
}

impl Default for CalculatorState {
    fn default() -> Self {
        CalculatorState {
            display_value: "0".to_string(),
            pending_operand: None,
            pending_operator: None,
            awaiting_new_operand: false,
            final_answer: false,
        }
    }
}

impl CalculatorState {
    pub fn is_error(&self) -> bool {
        self.display_value == ERROR_MARKER
    }

    pub fn display_number(&self) -> Option<f64> {
        self.display_value.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Pending expression as typed so far, e.g. `5 + 3 = 8`
    ///
    /// Returns `None` when nothing is pending.
    pub fn expression_preview(&self) -> Option<String> {
        let lhs = self.pending_operand?;
        let mut preview = format_number(lhs);

        let Some(operator) = self.pending_operator else {
            return Some(preview);
        };
        preview.push(' ');
        preview.push_str(operator.symbol());

        if !self.awaiting_new_operand {
            preview.push(' ');
            preview.push_str(&self.display_value);
            if let Some(result) = self.display_number().and_then(|rhs| operator.apply(lhs, rhs).ok()) {
                preview.push_str(" = ");
                preview.push_str(&format_number(result));
            }
        }

        Some(preview)
    }

    fn with_error(&self) -> Self {
        CalculatorState {
            display_value: ERROR_MARKER.to_string(),
            pending_operand: None,
            pending_operator: None,
            awaiting_new_operand: true,
            final_answer: false,
        }
    }
}

/// A finished `=` evaluation, ready to be stored as history
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedCalculation {
    pub expression: String,
    pub result: f64,
}

/// Outcome of one button press
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: CalculatorState,
    pub completed: Option<CompletedCalculation>,
    pub error: Option<CalculationError>,
}

impl Transition {
    fn to(state: CalculatorState) -> Self {
        Transition {
            state,
            completed: None,
            error: None,
        }
    }

    fn failed(state: &CalculatorState, error: CalculationError) -> Self {
        Transition {
            state: state.with_error(),
            completed: None,
            error: Some(error),
        }
    }
}

/// Format a value the way the display shows it
///
/// Integral values drop the fractional part (`8`, not `8.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn round_display(value: f64) -> f64 {
    if value.abs() >= MAX_EXACT_INTEGER {
        return value;
    }
    (value * ROUNDING_SCALE).round() / ROUNDING_SCALE
}

/// Apply one button press to `state`
///
/// Pure: the previous state is left untouched and no history is written.
/// A completed `=` is handed back in [`Transition::completed`].
pub fn apply_input(state: &CalculatorState, input: Input) -> Transition {
    match input {
        Input::Digit(d) => {
            if d > 9 {
                return Transition {
                    state: state.clone(),
                    completed: None,
                    error: Some(CalculationError::InvalidInput),
                };
            }
            let digit = char::from(b'0' + d);
            let mut next = state.clone();
            if state.awaiting_new_operand || state.display_value == "0" {
                next.display_value = digit.to_string();
            } else {
                next.display_value.push(digit);
            }
            next.awaiting_new_operand = false;
            next.final_answer = false;
            Transition::to(next)
        }
        Input::Decimal => {
            let mut next = state.clone();
            if state.awaiting_new_operand {
                next.display_value = "0.".to_string();
            } else if !state.display_value.contains('.') {
                next.display_value.push('.');
            }
            next.awaiting_new_operand = false;
            next.final_answer = false;
            Transition::to(next)
        }
        Input::Pi => {
            let mut next = state.clone();
            next.display_value = PI_INPUT.to_string();
            next.awaiting_new_operand = false;
            next.final_answer = false;
            Transition::to(next)
        }
        Input::Clear => Transition::to(CalculatorState::default()),
        Input::Operator(operator) => {
            let Some(current) = state.display_number() else {
                return Transition::to(state.clone());
            };

            let mut next = state.clone();
            match (state.pending_operand, state.pending_operator) {
                (Some(lhs), Some(pending)) => match pending.apply(lhs, current) {
                    Ok(result) => {
                        next.display_value = format_number(result);
                        next.pending_operand = Some(result);
                    }
                    Err(e) => return Transition::failed(state, e),
                },
                _ => next.pending_operand = Some(current),
            }
            next.pending_operator = Some(operator);
            next.awaiting_new_operand = true;
            next.final_answer = false;
            Transition::to(next)
        }
        Input::Equals => {
            let (Some(lhs), Some(operator), Some(rhs)) = (
                state.pending_operand,
                state.pending_operator,
                state.display_number(),
            ) else {
                return Transition::to(state.clone());
            };

            match operator.apply(lhs, rhs) {
                Ok(result) => {
                    let completed = CompletedCalculation {
                        expression: format!(
                            "{} {} {}",
                            format_number(lhs),
                            operator.symbol(),
                            format_number(rhs)
                        ),
                        result,
                    };
                    Transition {
                        state: CalculatorState {
                            display_value: format_number(result),
                            pending_operand: None,
                            pending_operator: None,
                            awaiting_new_operand: true,
                            final_answer: true,
                        },
                        completed: Some(completed),
                        error: None,
                    }
                }
                Err(e) => Transition::failed(state, e),
            }
        }
        Input::Function(function) => {
            let Some(current) = state.display_number() else {
                return Transition::to(state.clone());
            };

            match function.apply(current) {
                Ok(result) => {
                    let mut next = state.clone();
                    next.display_value = format_number(round_display(result));
                    next.awaiting_new_operand = true;
                    next.final_answer = false;
                    Transition::to(next)
                }
                Err(e) => Transition::failed(state, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_all(tokens: &[&str]) -> (CalculatorState, Vec<CompletedCalculation>) {
        let mut state = CalculatorState::default();
        let mut completed = Vec::new();
        for token in tokens {
            let input = Input::parse(token).unwrap();
            let transition = apply_input(&state, input);
            completed.extend(transition.completed);
            state = transition.state;
        }
        (state, completed)
    }

    #[test]
    fn parse_labels() {
        assert_eq!(Input::parse("7"), Some(Input::Digit(7)));
        assert_eq!(Input::parse("÷"), Some(Input::Operator(Operator::Divide)));
        assert_eq!(Input::parse("−"), Some(Input::Operator(Operator::Subtract)));
        assert_eq!(
            Input::parse("sqrt"),
            Some(Input::Function(ScientificFunction::SquareRoot))
        );
        assert_eq!(Input::parse("C"), Some(Input::Clear));
        assert_eq!(Input::parse("12"), None);
        assert_eq!(Input::parse("?"), None);
    }

    #[test]
    fn format_number_integral_and_fractional() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn leading_zero_is_replaced() {
        let (state, _) = press_all(&["0", "0", "7"]);
        assert_eq!(state.display_value, "7");
    }

    #[test]
    fn second_decimal_point_ignored() {
        let (state, _) = press_all(&["1", ".", "5", ".", "2"]);
        assert_eq!(state.display_value, "1.52");
    }

    #[test]
    fn decimal_after_operator_starts_zero_point() {
        let (state, completed) = press_all(&["1", "+", ".", "5", "="]);
        assert_eq!(state.display_value, "1.5");
        assert_eq!(completed[0].expression, "1 + 0.5");
    }

    #[test]
    fn equals_without_operator_is_noop() {
        let (state, completed) = press_all(&["4", "2", "="]);
        assert_eq!(state.display_value, "42");
        assert!(completed.is_empty());
    }

    #[test]
    fn power_operator() {
        let (state, completed) = press_all(&["2", "^", "1", "0", "="]);
        assert_eq!(state.display_value, "1024");
        assert_eq!(completed[0].expression, "2 ^ 10");
    }

    #[test]
    fn scientific_functions_round_and_await() {
        let (state, _) = press_all(&["9", "sqrt"]);
        assert_eq!(state.display_value, "3");
        assert!(state.awaiting_new_operand);

        let (state, _) = press_all(&["5", "!"]);
        assert_eq!(state.display_value, "120");

        let (state, _) = press_all(&["0", "sin"]);
        assert_eq!(state.display_value, "0");

        let (state, _) = press_all(&["2", "ln"]);
        assert_eq!(state.display_value, "0.6931471806");
    }

    #[test]
    fn scientific_domain_errors() {
        assert_eq!(
            ScientificFunction::SquareRoot.apply(-4.0),
            Err(CalculationError::NegativeSquareRoot)
        );
        assert_eq!(
            ScientificFunction::Log10.apply(0.0),
            Err(CalculationError::NonPositiveLogarithm)
        );
        assert_eq!(
            ScientificFunction::Factorial.apply(2.5),
            Err(CalculationError::InvalidFactorial)
        );
        assert_eq!(
            ScientificFunction::Factorial.apply(171.0),
            Err(CalculationError::NonFinite)
        );
    }

    #[test]
    fn function_on_second_operand_feeds_equals() {
        let (state, completed) = press_all(&["5", "+", "9", "sqrt", "="]);
        assert_eq!(state.display_value, "8");
        assert_eq!(completed[0].expression, "5 + 3");
    }

    #[test]
    fn pi_replaces_operand() {
        let (state, _) = press_all(&["1", "2", "pi"]);
        assert_eq!(state.display_value, PI_INPUT);
        let (state, _) = press_all(&["2", "×", "pi", "="]);
        assert_eq!(state.display_value, "6.28318530718");
    }

    #[test]
    fn pi_counts_as_typed_operand() {
        let (state, _) = press_all(&["2", "+", "pi"]);
        assert!(!state.awaiting_new_operand);
        let preview = state.expression_preview().unwrap();
        assert!(preview.starts_with("2 + 3.14159265359 = 5.14159"));

        let (state, _) = press_all(&["pi", "."]);
        assert_eq!(state.display_value, PI_INPUT);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut state = CalculatorState::default();
        state.display_value = "1e308".to_string();
        let transition = apply_input(&state, Input::Operator(Operator::Multiply));
        let transition = apply_input(&transition.state, Input::Digit(9));
        let transition = apply_input(&transition.state, Input::Equals);

        assert_eq!(transition.error, Some(CalculationError::NonFinite));
        assert!(transition.state.is_error());
        assert!(transition.completed.is_none());
    }

    #[test]
    fn operator_on_error_display_is_ignored() {
        let (state, _) = press_all(&["8", "÷", "0", "="]);
        let transition = apply_input(&state, Input::Operator(Operator::Add));
        assert_eq!(transition.state, state);
        assert!(transition.error.is_none());
    }

    #[test]
    fn preview_tracks_pending_expression() {
        let (state, _) = press_all(&["5", "+"]);
        assert_eq!(state.expression_preview().as_deref(), Some("5 +"));

        let (state, _) = press_all(&["5", "+", "3"]);
        assert_eq!(state.expression_preview().as_deref(), Some("5 + 3 = 8"));

        let (state, _) = press_all(&["8", "÷", "0"]);
        assert_eq!(state.expression_preview().as_deref(), Some("8 ÷ 0"));

        assert_eq!(CalculatorState::default().expression_preview(), None);
    }

    #[test]
    fn final_answer_flag() {
        let (state, _) = press_all(&["2", "+", "2", "="]);
        assert!(state.final_answer);
        let (state, _) = press_all(&["2", "+", "2", "=", "1"]);
        assert!(!state.final_answer);
        assert_eq!(state.display_value, "1");
    }

    #[test]
    fn invalid_digit_is_rejected() {
        let state = CalculatorState::default();
        let transition = apply_input(&state, Input::Digit(12));
        assert_eq!(transition.state, state);
        assert_eq!(transition.error, Some(CalculationError::InvalidInput));
    }
}
