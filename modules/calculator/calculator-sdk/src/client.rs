//! REST implementation of [`CalculatorClient`].

use std::time::Duration;

use async_trait::async_trait;
use calc_errors::{Problem, catalog};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::api::CalculatorClient;
use crate::errors::CalculatorError;
use crate::models::{AngleUnit, BinaryOp, HistoryEntry, UnaryFn};
use crate::wire;

const API_PREFIX: &str = "calculator/v1/";

#[derive(Deserialize)]
struct ResultBody {
    #[serde(with = "wire::number")]
    result: f64,
}

/// Talks to a running calculator server over HTTP.
#[derive(Debug, Clone)]
pub struct RestCalculatorClient {
    base: Url,
    http: reqwest::Client,
    timeout: Duration,
}

impl RestCalculatorClient {
    /// Create a client for the server at `base_url`.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an unparsable base URL and `Internal` if the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CalculatorError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| CalculatorError::invalid_input(format!("bad server url: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CalculatorError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base,
            http,
            timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, CalculatorError> {
        self.base
            .join(API_PREFIX)
            .and_then(|api| api.join(path))
            .map_err(|e| CalculatorError::internal(format!("bad endpoint '{path}': {e}")))
    }

    fn transport_error(&self, err: &reqwest::Error) -> CalculatorError {
        if err.is_timeout() {
            CalculatorError::Timeout(self.timeout)
        } else {
            CalculatorError::Transport(err.to_string())
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        subject: (&str, f64),
    ) -> Result<reqwest::Response, CalculatorError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let err = match serde_json::from_slice::<Problem>(&body) {
            Ok(problem) => error_from_problem(problem, subject),
            Err(_) => CalculatorError::Transport(format!("unexpected status {status}")),
        };
        debug!(%status, error = %err, "calculator request failed");
        Err(err)
    }

    async fn fetch_result(
        &self,
        request: reqwest::RequestBuilder,
        subject: (&str, f64),
    ) -> Result<f64, CalculatorError> {
        let response = self.send(request, subject).await?;
        let body: ResultBody = response
            .json()
            .await
            .map_err(|e| CalculatorError::Transport(format!("malformed result: {e}")))?;
        Ok(body.result)
    }
}

/// Map a problem document back to the error kind the server started from.
///
/// `subject` names the function and operand of the call, which the problem
/// only carries as free text.
fn error_from_problem(problem: Problem, subject: (&str, f64)) -> CalculatorError {
    let code = problem.code.as_str();
    if code == catalog::INVALID_INPUT.code {
        CalculatorError::InvalidInput {
            message: problem.detail,
        }
    } else if code == catalog::DIVISION_BY_ZERO.code {
        CalculatorError::DivisionByZero
    } else if code == catalog::OUT_OF_DOMAIN.code {
        CalculatorError::out_of_domain(subject.0, subject.1)
    } else if code == catalog::UNKNOWN_OPERATION.code {
        CalculatorError::UnknownOperation {
            name: subject.0.to_owned(),
        }
    } else {
        CalculatorError::Internal(problem.detail)
    }
}

#[async_trait]
impl CalculatorClient for RestCalculatorClient {
    #[instrument(skip(self), fields(op = %op))]
    async fn evaluate_binary(&self, op: BinaryOp, a: f64, b: f64) -> Result<f64, CalculatorError> {
        let url = self.endpoint(&format!("binary/{}", op.name()))?;
        let request = self
            .http
            .get(url)
            .query(&[("a", wire::to_text(a)), ("b", wire::to_text(b))]);
        self.fetch_result(request, (op.name(), b)).await
    }

    #[instrument(skip(self), fields(function = %function, unit = %unit))]
    async fn evaluate_unary(
        &self,
        function: UnaryFn,
        x: f64,
        unit: AngleUnit,
    ) -> Result<f64, CalculatorError> {
        let url = self.endpoint(&format!("unary/{}/{}", function.name(), wire::to_text(x)))?;
        let mut request = self.http.get(url);
        if function.uses_angle_unit() {
            request = request.query(&[("unit", unit.as_str())]);
        }
        self.fetch_result(request, (function.name(), x)).await
    }

    #[instrument(skip(self))]
    async fn random(&self) -> Result<f64, CalculatorError> {
        let request = self.http.get(self.endpoint("random")?);
        self.fetch_result(request, ("random", f64::NAN)).await
    }

    #[instrument(skip(self))]
    async fn get_history(&self) -> Result<Vec<HistoryEntry>, CalculatorError> {
        let request = self.http.get(self.endpoint("history")?);
        self.send(request, ("history", f64::NAN))
            .await?
            .json()
            .await
            .map_err(|e| CalculatorError::Transport(format!("malformed history: {e}")))
    }

    #[instrument(skip(self))]
    async fn clear_history(&self) -> Result<(), CalculatorError> {
        let request = self.http.delete(self.endpoint("history")?);
        self.send(request, ("history", f64::NAN)).await?;
        Ok(())
    }
}
