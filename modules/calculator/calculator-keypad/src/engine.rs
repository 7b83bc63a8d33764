//! The calculator interaction engine.
//!
//! [`Engine`] is a synchronous state machine. It never performs I/O: an input
//! that needs the operation service returns [`Step::Request`] carrying a
//! [`Ticket`], and the caller reports the outcome back through
//! [`Engine::resolve`]. At most one request is in flight; `Clear` abandons it
//! and a late answer for an abandoned ticket is discarded.

use calculator_sdk::{AngleUnit, BinaryOp, CalculatorError, UnaryFn};
use tracing::debug;

use crate::entry::{EntryState, Phase};
use crate::format::{format_number, parse_display};
use crate::input::Input;

/// Digits allowed in a typed number.
pub const MAX_DIGITS: usize = 16;

/// Identifies one service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Service call the caller must perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Binary { op: BinaryOp, a: f64, b: f64 },
    Unary {
        function: UnaryFn,
        x: f64,
        unit: AngleUnit,
    },
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    pub ticket: Ticket,
    pub call: Call,
}

/// What an input did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// State changed locally.
    Applied,
    /// No effect.
    Ignored,
    /// A finalize input arrived while a request was in flight.
    Busy,
    /// Perform `call` and hand the outcome to [`Engine::resolve`].
    Request(Request),
}

/// What a service outcome did.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Completed(f64),
    Failed(CalculatorError),
    /// The ticket was abandoned; state untouched.
    Stale,
}

/// How to apply the result of the in-flight request.
#[derive(Debug, Clone, Copy)]
enum Continuation {
    /// Operator press that first resolves the pending operation.
    Chain {
        next: BinaryOp,
        a: f64,
        op: BinaryOp,
        b: f64,
    },
    Equals {
        a: f64,
        op: BinaryOp,
        b: f64,
    },
    Unary {
        function: UnaryFn,
        x: f64,
    },
    Random,
}

impl Continuation {
    fn label(self) -> String {
        match self {
            Self::Chain { a, op, b, .. } | Self::Equals { a, op, b } => format!(
                "{} {} {} =",
                format_number(a),
                op.symbol(),
                format_number(b)
            ),
            Self::Unary { function, x } => format!("{}({}) =", function.label(), format_number(x)),
            Self::Random => "rnd =".to_owned(),
        }
    }
}

#[derive(Debug)]
struct InFlight {
    ticket: Ticket,
    then: Continuation,
}

#[derive(Debug, Default)]
pub struct Engine {
    entry: EntryState,
    unit: AngleUnit,
    in_flight: Option<InFlight>,
    issued: u64,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_angle_unit(unit: AngleUnit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn entry(&self) -> &EntryState {
        &self.entry
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.entry.phase()
    }

    #[must_use]
    pub fn angle_unit(&self) -> AngleUnit {
        self.unit
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn apply(&mut self, input: Input) -> Step {
        match input {
            Input::Clear => self.clear(),
            Input::SetAngleUnit(unit) => {
                self.unit = unit;
                Step::Applied
            }
            Input::ToggleAngleUnit => {
                self.unit = self.unit.toggled();
                Step::Applied
            }
            _ if self.in_flight.is_some() => {
                if input.is_finalize() {
                    debug!(?input, "request in flight, input rejected");
                    Step::Busy
                } else {
                    debug!(?input, "request in flight, input ignored");
                    Step::Ignored
                }
            }
            Input::Digit(d) => self.digit(d),
            Input::Decimal => self.decimal(),
            Input::Delete => self.delete(),
            Input::Operator(op) => self.operator(op),
            Input::Equals => self.equals(),
            Input::Scientific(function) => self.scientific(function),
            Input::Random => self.issue(Call::Random, Continuation::Random),
            Input::Constant(c) => {
                self.entry.show_value(c.value());
                self.entry.is_new_input = true;
                Step::Applied
            }
            Input::RecallAnswer => {
                self.entry.show_value(self.entry.last_answer);
                // Exponent and non-finite text cannot be extended digit by digit.
                self.entry.is_new_input = !is_plain_decimal(&self.entry.display);
                Step::Applied
            }
            Input::Negate => {
                if self.entry.negate() {
                    Step::Applied
                } else {
                    Step::Ignored
                }
            }
            Input::Percent => self.percent(),
        }
    }

    /// Apply the outcome of the request identified by `ticket`.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<f64, CalculatorError>,
    ) -> Resolution {
        let then = match self.in_flight.take() {
            Some(flight) if flight.ticket == ticket => flight.then,
            other => {
                self.in_flight = other;
                debug!(?ticket, "discarding response for abandoned request");
                return Resolution::Stale;
            }
        };

        match outcome {
            Ok(result) => {
                self.complete(then, result);
                Resolution::Completed(result)
            }
            Err(err) => {
                debug!(error = %err, "evaluation failed");
                self.entry.show_error(then.label());
                Resolution::Failed(err)
            }
        }
    }

    fn clear(&mut self) -> Step {
        if let Some(flight) = self.in_flight.take() {
            debug!(ticket = ?flight.ticket, "clear abandons in-flight request");
        }
        self.entry = EntryState::default();
        Step::Applied
    }

    fn digit(&mut self, d: u8) -> Step {
        if d > 9 {
            return Step::Ignored;
        }
        let entry = &mut self.entry;
        if entry.is_new_input {
            entry.show_text(d.to_string());
            entry.is_new_input = false;
            return Step::Applied;
        }

        let next = if entry.display == "0" {
            d.to_string()
        } else {
            format!("{}{d}", entry.display)
        };
        let digits = next.chars().filter(char::is_ascii_digit).count();
        if digits > MAX_DIGITS || !parse_display(&next).is_some_and(f64::is_finite) {
            return Step::Ignored;
        }
        entry.show_text(next);
        Step::Applied
    }

    fn decimal(&mut self) -> Step {
        let entry = &mut self.entry;
        if entry.is_new_input {
            entry.show_text("0.".to_owned());
            entry.is_new_input = false;
            return Step::Applied;
        }

        let next = format!("{}.", entry.display);
        if entry.display.contains(['.', 'e', 'E']) || parse_display(&next).is_none() {
            return Step::Ignored;
        }
        entry.show_text(next);
        Step::Applied
    }

    fn delete(&mut self) -> Step {
        let entry = &mut self.entry;
        if entry.is_new_input {
            return Step::Ignored;
        }

        let mut text = entry.display.clone();
        text.pop();
        while !text.is_empty() && parse_display(&text).is_none() {
            text.pop();
        }
        if text.is_empty() {
            entry.show_text("0".to_owned());
            entry.is_new_input = true;
        } else {
            entry.show_text(text);
        }
        Step::Applied
    }

    fn operator(&mut self, op: BinaryOp) -> Step {
        let Some(current) = self.operand() else {
            return Step::Ignored;
        };

        let entry = &mut self.entry;
        if let (Some(pending), Some(a), false) =
            (entry.pending_operator, entry.previous_value, entry.is_new_input)
        {
            let then = Continuation::Chain {
                next: op,
                a,
                op: pending,
                b: current,
            };
            return self.issue(Call::Binary { op: pending, a, b: current }, then);
        }

        entry.previous_value = Some(current);
        entry.pending_operator = Some(op);
        entry.operation_label = format!("{} {}", format_number(current), op.symbol());
        entry.is_new_input = true;
        Step::Applied
    }

    fn equals(&mut self) -> Step {
        let Some(b) = self.operand() else {
            return Step::Ignored;
        };
        let entry = &self.entry;
        match (entry.pending_operator, entry.previous_value) {
            (Some(op), Some(a)) if !entry.is_new_input => {
                self.issue(Call::Binary { op, a, b }, Continuation::Equals { a, op, b })
            }
            _ => Step::Ignored,
        }
    }

    fn scientific(&mut self, function: UnaryFn) -> Step {
        let Some(x) = self.operand() else {
            return Step::Ignored;
        };
        let call = Call::Unary {
            function,
            x,
            unit: self.unit,
        };
        self.issue(call, Continuation::Unary { function, x })
    }

    fn percent(&mut self) -> Step {
        let Some(value) = self.operand() else {
            return Step::Ignored;
        };
        self.entry.show_value(value / 100.0);
        Step::Applied
    }

    /// Display value usable as an operand; `None` in the error state.
    fn operand(&self) -> Option<f64> {
        if self.entry.is_error() {
            return None;
        }
        self.entry.current_value()
    }

    fn issue(&mut self, call: Call, then: Continuation) -> Step {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.in_flight = Some(InFlight { ticket, then });
        Step::Request(Request { ticket, call })
    }

    fn complete(&mut self, then: Continuation, result: f64) {
        let label = match then {
            Continuation::Chain { next, .. } => format!("{} {}", format_number(result), next.symbol()),
            other => other.label(),
        };

        let entry = &mut self.entry;
        entry.show_value(result);
        entry.operation_label = label;
        entry.last_answer = result;
        entry.is_new_input = true;
        match then {
            Continuation::Chain { next, .. } => {
                entry.previous_value = Some(result);
                entry.pending_operator = Some(next);
            }
            Continuation::Equals { .. } => {
                entry.previous_value = None;
                entry.pending_operator = None;
            }
            Continuation::Unary { .. } | Continuation::Random => {}
        }
    }
}

/// Display text made only of a sign, digits and a decimal point.
fn is_plain_decimal(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
}

#[cfg(test)]
#[path = "engine_tests.rs"]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests;
