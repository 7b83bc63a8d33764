//! Calculator entry state.

use calculator_sdk::BinaryOp;

use crate::format::{ERROR_SENTINEL, format_number, parse_display};

/// Everything the keypad shows plus the operands it is holding.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryState {
    /// Value being entered or last computed; parses to a number or is `"Error"`.
    pub display: String,
    /// Trace of the pending or completed expression, e.g. `"5 +"` or `"5 + 3 ="`.
    pub operation_label: String,
    /// Left operand of a pending binary operation.
    pub previous_value: Option<f64>,
    pub pending_operator: Option<BinaryOp>,
    /// Next digit starts a fresh number.
    pub is_new_input: bool,
    /// Most recently completed computation.
    pub last_answer: f64,
    /// Exact value behind `display` when it was set from a number rather than typed.
    exact: Option<f64>,
}

impl Default for EntryState {
    fn default() -> Self {
        Self {
            display: "0".to_owned(),
            operation_label: String::new(),
            previous_value: None,
            pending_operator: None,
            is_new_input: true,
            last_answer: 0.0,
            exact: None,
        }
    }
}

/// Coarse state of the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    OperandEntered,
    OperatorPending,
    Error,
}

impl EntryState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.is_error() {
            Phase::Error
        } else if self.pending_operator.is_some() {
            Phase::OperatorPending
        } else if self.is_new_input
            && self.previous_value.is_none()
            && self.operation_label.is_empty()
            && self.display == "0"
        {
            Phase::Idle
        } else {
            Phase::OperandEntered
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.display == ERROR_SENTINEL
    }

    /// Numeric value of the display; `None` in the error state.
    #[must_use]
    pub fn current_value(&self) -> Option<f64> {
        self.exact.or_else(|| parse_display(&self.display))
    }

    /// Show a computed value; keeps full precision behind the rounded text.
    pub(crate) fn show_value(&mut self, value: f64) {
        self.display = format_number(value);
        self.exact = Some(value);
    }

    /// Replace the display with typed text.
    pub(crate) fn show_text(&mut self, text: String) {
        self.display = text;
        self.exact = None;
    }

    /// Flip the sign of the display; `false` when there is nothing to flip.
    pub(crate) fn negate(&mut self) -> bool {
        let Some(value) = self.current_value() else {
            return false;
        };
        if value == 0.0 || value.is_nan() {
            return false;
        }
        if let Some(exact) = self.exact {
            self.show_value(-exact);
        } else {
            let text = self
                .display
                .strip_prefix('-')
                .map_or_else(|| format!("-{}", self.display), str::to_owned);
            self.show_text(text);
        }
        true
    }

    /// Enter the error state; the held operands are dropped.
    pub(crate) fn show_error(&mut self, label: String) {
        self.show_text(ERROR_SENTINEL.to_owned());
        self.operation_label = label;
        self.previous_value = None;
        self.pending_operator = None;
        self.is_new_input = true;
    }
}
