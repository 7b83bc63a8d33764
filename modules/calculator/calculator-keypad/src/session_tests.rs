#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use calculator_sdk::{BinaryOp, Operation, UnaryFn};
use chrono::Utc;
use tokio::sync::Notify;

use super::*;
use crate::input::parse_line;

/// In-process calculator with optional gating and latency.
#[derive(Default)]
struct FakeCalculator {
    gate: Option<Arc<Notify>>,
    latency: Option<Duration>,
    history: Mutex<Vec<HistoryEntry>>,
    /// Per-call delays for `get_history`, applied after the snapshot is taken.
    history_delays: Mutex<VecDeque<Duration>>,
}

impl FakeCalculator {
    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    fn slow(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn record(&self, operation: Operation, operands: Vec<f64>, result: f64) -> f64 {
        self.history.lock().unwrap().push(HistoryEntry {
            operation,
            operands,
            result,
            unit: None,
            recorded_at: Utc::now(),
        });
        result
    }
}

#[async_trait]
impl CalculatorClient for FakeCalculator {
    async fn evaluate_binary(&self, op: BinaryOp, a: f64, b: f64) -> Result<f64, CalculatorError> {
        self.wait().await;
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide if b == 0.0 => return Err(CalculatorError::DivisionByZero),
            BinaryOp::Divide => a / b,
            BinaryOp::Power => a.powf(b),
        };
        Ok(self.record(op.into(), vec![a, b], result))
    }

    async fn evaluate_unary(
        &self,
        function: UnaryFn,
        x: f64,
        _unit: AngleUnit,
    ) -> Result<f64, CalculatorError> {
        self.wait().await;
        match function {
            UnaryFn::Sqrt if x < 0.0 => Err(CalculatorError::out_of_domain("sqrt", x)),
            UnaryFn::Sqrt => Ok(self.record(function.into(), vec![x], x.sqrt())),
            other => Err(CalculatorError::internal(format!(
                "{} is not scripted",
                other.name()
            ))),
        }
    }

    async fn random(&self) -> Result<f64, CalculatorError> {
        self.wait().await;
        Ok(self.record(Operation::Random, Vec::new(), 0.5))
    }

    async fn get_history(&self) -> Result<Vec<HistoryEntry>, CalculatorError> {
        let history = self.history.lock().unwrap().clone();
        let delay = self.history_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(history)
    }

    async fn clear_history(&self) -> Result<(), CalculatorError> {
        self.history.lock().unwrap().clear();
        Ok(())
    }
}

async fn press_all(handle: &SessionHandle, keys: &str) -> Vec<Step> {
    let mut steps = Vec::new();
    for input in parse_line(keys).unwrap() {
        steps.push(handle.press(input).await.unwrap());
    }
    steps
}

/// Press `keys` one at a time, waiting for each evaluation to finish.
async fn type_and_settle(handle: &SessionHandle, keys: &str) -> Snapshot {
    for input in parse_line(keys).unwrap() {
        handle.press(input).await.unwrap();
        handle.settled().await.unwrap();
    }
    handle.settled().await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn evaluates_through_the_client() {
    let client = Arc::new(FakeCalculator::default());
    let handle = Session::spawn(client, SessionConfig::default());

    let snapshot = type_and_settle(&handle, "5+3=").await;
    assert_eq!(snapshot.entry.display, "8");
    assert_eq!(snapshot.entry.operation_label, "5 + 3 =");
    assert_eq!(snapshot.last_error, None);
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].operation, Operation::Binary(BinaryOp::Add));
    assert_eq!(snapshot.history[0].result, 8.0);
}

#[tokio::test(start_paused = true)]
async fn chained_operators_accumulate_history() {
    let client = Arc::new(FakeCalculator::default());
    let handle = Session::spawn(client, SessionConfig::default());

    let snapshot = type_and_settle(&handle, "5+3+2= 9 sqrt").await;
    assert_eq!(snapshot.entry.display, "3");
    assert_eq!(snapshot.entry.operation_label, "sqrt(9) =");
    assert_eq!(snapshot.history.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn finalize_inputs_wait_for_the_answer() {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(FakeCalculator::gated(Arc::clone(&gate)));
    let handle = Session::spawn(client, SessionConfig::default());

    let steps = press_all(&handle, "5+3=").await;
    assert!(matches!(steps.last(), Some(Step::Request(_))));
    assert!(handle.snapshot().busy);
    assert_eq!(press_all(&handle, "= 7").await, vec![Step::Busy, Step::Ignored]);

    gate.notify_one();
    let snapshot = handle.settled().await.unwrap();
    assert_eq!(snapshot.entry.display, "8");
    assert!(!snapshot.busy);
}

#[tokio::test(start_paused = true)]
async fn clear_discards_a_late_answer() {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(FakeCalculator::gated(Arc::clone(&gate)));
    let handle = Session::spawn(Arc::clone(&client), SessionConfig::default());
    handle.settled().await.unwrap();

    press_all(&handle, "5+3= C").await;
    assert!(!handle.snapshot().busy);

    gate.notify_one();
    // Paused time only advances once every task is idle.
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(client.history.lock().unwrap().len(), 1);
    let snapshot = handle.settled().await.unwrap();
    assert_eq!(snapshot.entry, EntryState::default());
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.history.is_empty());
}

#[tokio::test(start_paused = true)]
async fn failures_are_reported_until_cleared() {
    let client = Arc::new(FakeCalculator::default());
    let handle = Session::spawn(client, SessionConfig::default());

    let snapshot = type_and_settle(&handle, "5/0=").await;
    assert_eq!(snapshot.entry.display, "Error");
    assert_eq!(snapshot.phase, Phase::Error);
    assert_eq!(snapshot.last_error, Some(CalculatorError::DivisionByZero));
    assert!(snapshot.history.is_empty());

    let snapshot = type_and_settle(&handle, "C").await;
    assert_eq!(snapshot.last_error, None);
    assert_eq!(snapshot.phase, Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn slow_service_times_out() {
    let client = Arc::new(FakeCalculator::slow(Duration::from_secs(60)));
    let config = SessionConfig {
        request_timeout: Duration::from_secs(5),
        ..SessionConfig::default()
    };
    let handle = Session::spawn(client, config);

    let snapshot = type_and_settle(&handle, "rnd").await;
    assert_eq!(
        snapshot.last_error,
        Some(CalculatorError::Timeout(Duration::from_secs(5)))
    );
    assert_eq!(snapshot.entry.display, "Error");
    assert_eq!(snapshot.entry.operation_label, "rnd =");
}

#[tokio::test(start_paused = true)]
async fn angle_unit_comes_from_config() {
    let client = Arc::new(FakeCalculator::default());
    let config = SessionConfig {
        angle_unit: AngleUnit::Rad,
        ..SessionConfig::default()
    };
    let handle = Session::spawn(client, config);
    assert_eq!(handle.snapshot().angle_unit, AngleUnit::Rad);

    let snapshot = type_and_settle(&handle, "drg").await;
    assert_eq!(snapshot.angle_unit, AngleUnit::Deg);
}

#[tokio::test(start_paused = true)]
async fn history_can_be_cleared() {
    let client = Arc::new(FakeCalculator::default());
    let handle = Session::spawn(Arc::clone(&client), SessionConfig::default());

    let snapshot = type_and_settle(&handle, "2^3= rnd").await;
    assert_eq!(snapshot.history.len(), 2);

    handle.clear_history().await.unwrap();
    let snapshot = handle.settled().await.unwrap();
    assert!(snapshot.history.is_empty());
    assert!(client.history.lock().unwrap().is_empty());
    // The display is untouched.
    assert_eq!(snapshot.entry.display, "0.5");
}

#[tokio::test(start_paused = true)]
async fn history_refresh_picks_up_external_changes() {
    let client = Arc::new(FakeCalculator::default());
    let handle = Session::spawn(Arc::clone(&client), SessionConfig::default());
    handle.settled().await.unwrap();

    client.record(Operation::Random, Vec::new(), 0.75);
    handle.refresh_history().await.unwrap();
    let snapshot = handle.settled().await.unwrap();
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].result, 0.75);
}

#[tokio::test(start_paused = true)]
async fn late_history_reply_does_not_replace_newer_history() {
    let client = Arc::new(FakeCalculator::default());
    let handle = Session::spawn(Arc::clone(&client), SessionConfig::default());
    handle.settled().await.unwrap();

    // The refresh after the first result answers last.
    client
        .history_delays
        .lock()
        .unwrap()
        .push_back(Duration::from_millis(100));
    press_all(&handle, "5+3=").await;
    handle.subscribe().wait_for(|s| !s.busy).await.unwrap();
    press_all(&handle, "2*2=").await;

    let snapshot = handle.settled().await.unwrap();
    assert_eq!(client.history.lock().unwrap().len(), 2);
    assert_eq!(snapshot.history.len(), 2);
    assert_eq!(snapshot.entry.display, "4");
}

#[tokio::test(start_paused = true)]
async fn refresh_started_before_clear_does_not_restore_entries() {
    let client = Arc::new(FakeCalculator::default());
    let handle = Session::spawn(Arc::clone(&client), SessionConfig::default());
    assert_eq!(type_and_settle(&handle, "2^3=").await.history.len(), 1);

    client
        .history_delays
        .lock()
        .unwrap()
        .push_back(Duration::from_millis(100));
    handle.refresh_history().await.unwrap();
    handle.clear_history().await.unwrap();

    let snapshot = handle.settled().await.unwrap();
    assert!(snapshot.history.is_empty());
}
