use calc_errors::{Problem, catalog};

use crate::domain::error::DomainError;

/// Handler result: success payload or an RFC 9457 problem.
pub type ApiResult<T> = Result<T, Problem>;

/// Map domain error to RFC 9457 Problem using the calculator error catalog
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    if e.is_user_error() {
        tracing::debug!(error = %e, instance, "request rejected");
    } else {
        tracing::error!(error = %e, instance, "request failed");
    }

    match e {
        DomainError::InvalidInput { message } => {
            catalog::INVALID_INPUT.with_context(message.clone(), instance, trace_id)
        }
        DomainError::DivisionByZero => {
            catalog::DIVISION_BY_ZERO.with_context("Cannot divide by zero", instance, trace_id)
        }
        DomainError::OutOfDomain {
            function,
            operand,
            reason,
        } => catalog::OUT_OF_DOMAIN.with_context(
            format!("{function}({operand}): {reason}"),
            instance,
            trace_id,
        ),
        DomainError::UnknownOperation { name } => catalog::UNKNOWN_OPERATION.with_context(
            format!("Unknown operation '{name}'"),
            instance,
            trace_id,
        ),
        DomainError::Storage(_) => {
            catalog::INTERNAL.with_context("An internal error occurred", instance, trace_id)
        }
    }
}

/// Implement From<DomainError> for Problem so `?` works in handlers
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn each_domain_error_has_a_catalog_entry() {
        let cases = [
            (
                DomainError::invalid_input("operand 'a' is not a number: 'x'"),
                StatusCode::BAD_REQUEST,
                "CALC_INVALID_INPUT",
            ),
            (
                DomainError::DivisionByZero,
                StatusCode::BAD_REQUEST,
                "CALC_DIVISION_BY_ZERO",
            ),
            (
                DomainError::out_of_domain("sqrt", -1.0, "requires x >= 0"),
                StatusCode::BAD_REQUEST,
                "CALC_OUT_OF_DOMAIN",
            ),
            (
                DomainError::UnknownOperation {
                    name: "modulo".to_owned(),
                },
                StatusCode::NOT_FOUND,
                "CALC_UNKNOWN_OPERATION",
            ),
            (
                DomainError::Storage(anyhow::anyhow!("lock poisoned")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "CALC_INTERNAL",
            ),
        ];

        for (err, status, code) in cases {
            let problem = domain_error_to_problem(&err, "/calculator/v1/test");
            assert_eq!(problem.status_code(), status);
            assert_eq!(problem.code, code);
            assert_eq!(problem.instance, "/calculator/v1/test");
        }
    }

    #[test]
    fn storage_details_are_not_leaked() {
        let err = DomainError::Storage(anyhow::anyhow!("secret path /var/lib/x"));
        let problem = domain_error_to_problem(&err, "/");
        assert!(!problem.detail.contains("secret"));
    }

    #[test]
    fn out_of_domain_detail_names_function_and_operand() {
        let err = DomainError::out_of_domain("log10", 0.0, "requires x > 0");
        let problem: Problem = err.into();
        assert_eq!(problem.detail, "log10(0): requires x > 0");
    }
}
