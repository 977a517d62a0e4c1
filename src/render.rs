//! Text projection of a session for the terminal front end.
//!
//! Rendering never changes state; every function takes a snapshot and
//! returns the lines to print.

use crate::calculator::CalculatorState;
use crate::history::HistoryRecord;
use crate::session::{Notice, SessionState, View};

const DISPLAY_WIDTH: usize = 28;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const EMPTY_HISTORY: &str = "No calculations yet. Start calculating to see your history!";

pub fn render(state: &SessionState) -> String {
    let mut out = String::new();

    match state.active_view {
        View::Login => {
            out.push_str("== Login ==\n");
            out.push_str("login <username> <password>\n");
            out.push_str("Don't have an account? view signup\n");
        }
        View::Signup => {
            out.push_str("== Sign Up ==\n");
            out.push_str("signup <username> <password> <confirm>\n");
            out.push_str("Already have an account? view login\n");
        }
        View::Calculator => {
            let user = state.current_user.as_deref().unwrap_or_default();
            out.push_str(&format!("== {} ==\n", user));
            out.push_str(&render_calculator(&state.calculator));
            out.push('\n');
            out.push_str(&render_history(&state.history));
        }
    }

    if let Some(notice) = &state.notice {
        out.push_str(&render_notice(notice));
    }

    out
}

/// Display box: expression preview over the current value
pub fn render_calculator(calculator: &CalculatorState) -> String {
    let preview = calculator.expression_preview().unwrap_or_default();
    let value = if calculator.final_answer {
        format!("[{}]", calculator.display_value)
    } else {
        calculator.display_value.clone()
    };

    let border = "-".repeat(DISPLAY_WIDTH + 4);
    let mut out = String::new();
    out.push_str(&format!("+{}+\n", border));
    out.push_str(&format!("|  {:>width$}  |\n", preview, width = DISPLAY_WIDTH));
    out.push_str(&format!("|  {:>width$}  |\n", value, width = DISPLAY_WIDTH));
    out.push_str(&format!("+{}+\n", border));
    out
}

pub fn render_history(history: &[HistoryRecord]) -> String {
    let mut out = String::from("Calculation History\n");
    if history.is_empty() {
        out.push_str(&format!("  {}\n", EMPTY_HISTORY));
        return out;
    }

    for record in history {
        out.push_str(&format!(
            "  {}  ({})\n",
            record.format_line(),
            record.timestamp.format(TIMESTAMP_FORMAT)
        ));
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(message) => format!("ok: {}\n", message),
        Notice::Error(message) => format!("error: {}\n", message),
    }
}
