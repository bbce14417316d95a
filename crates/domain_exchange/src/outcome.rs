//! Response disposition mapping
//!
//! Maps whatever the clearinghouse answered into the fixed local status
//! set. The mapping is total: a response that fits no known shape becomes
//! an error disposition rather than a parse failure, so a poll always
//! leaves the record in a known status.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use domain_coverage::EligibilityOutcome;

use crate::bundle::MessageBundle;

/// What a claim response resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimDisposition {
    /// Accepted, adjudication still pending
    Queued,
    /// Adjudicated in the provider's favor
    Approved { note: Option<String> },
    /// Adjudicated against the provider
    Denied { reason: Option<String> },
    /// The exchange failed
    Error { message: String },
}

/// What a prior-authorization response resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDisposition {
    /// Accepted, decision still pending
    Queued,
    /// Approved, possibly below the requested amount
    Approved {
        auth_number: Option<String>,
        approved_amount: Option<Decimal>,
        expiry_date: Option<NaiveDate>,
    },
    /// Denied
    Denied { reason: Option<String> },
    /// The exchange failed
    Error { message: String },
}

/// Maps a response bundle to a claim disposition
pub fn claim_disposition(response: &MessageBundle) -> ClaimDisposition {
    if let Some(outcome) = response.operation_outcome() {
        return ClaimDisposition::Error {
            message: outcome.error_text(),
        };
    }

    let Some(resp) = response.claim_response() else {
        return ClaimDisposition::Error {
            message: "response contained no ClaimResponse".to_string(),
        };
    };

    match resp.outcome.as_str() {
        "queued" => ClaimDisposition::Queued,
        "complete" => match resp.decision.as_deref() {
            Some("approved") | Some("partial") => ClaimDisposition::Approved {
                note: resp.disposition.clone(),
            },
            Some("denied") => ClaimDisposition::Denied {
                reason: resp.disposition.clone(),
            },
            other => ClaimDisposition::Error {
                message: format!(
                    "complete response carried unknown decision: {}",
                    other.unwrap_or("<none>")
                ),
            },
        },
        "error" => ClaimDisposition::Error {
            message: resp
                .disposition
                .clone()
                .unwrap_or_else(|| "clearinghouse reported an error".to_string()),
        },
        other => ClaimDisposition::Error {
            message: format!("unknown response outcome: {}", other),
        },
    }
}

/// Maps a response bundle to a prior-authorization disposition
pub fn auth_disposition(response: &MessageBundle) -> AuthDisposition {
    if let Some(outcome) = response.operation_outcome() {
        return AuthDisposition::Error {
            message: outcome.error_text(),
        };
    }

    let Some(resp) = response.claim_response() else {
        return AuthDisposition::Error {
            message: "response contained no ClaimResponse".to_string(),
        };
    };

    match resp.outcome.as_str() {
        "queued" => AuthDisposition::Queued,
        "complete" => match resp.decision.as_deref() {
            Some("approved") | Some("partial") => AuthDisposition::Approved {
                auth_number: resp.pre_auth_ref.clone(),
                approved_amount: resp.approved_amount,
                expiry_date: resp.pre_auth_period_end,
            },
            Some("denied") => AuthDisposition::Denied {
                reason: resp.disposition.clone(),
            },
            other => AuthDisposition::Error {
                message: format!(
                    "complete response carried unknown decision: {}",
                    other.unwrap_or("<none>")
                ),
            },
        },
        "error" => AuthDisposition::Error {
            message: resp
                .disposition
                .clone()
                .unwrap_or_else(|| "clearinghouse reported an error".to_string()),
        },
        other => AuthDisposition::Error {
            message: format!("unknown response outcome: {}", other),
        },
    }
}

/// Extracts the eligibility outcome from a response bundle
pub fn eligibility_outcome(response: &MessageBundle) -> Result<EligibilityOutcome, String> {
    if let Some(outcome) = response.operation_outcome() {
        return Err(outcome.error_text());
    }

    let resp = response
        .eligibility_response()
        .ok_or_else(|| "response contained no CoverageEligibilityResponse".to_string())?;

    Ok(EligibilityOutcome {
        eligible: resp.inforce,
        site_eligibility: resp.site_eligibility.clone(),
        benefit_notes: resp.benefit_notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{
        ClaimResponseResource, MessageBundle, OperationOutcomeResource, OutcomeIssue, Resource,
    };

    fn response_with(outcome: &str, decision: Option<&str>) -> MessageBundle {
        let mut bundle = MessageBundle::message();
        bundle.push(Resource::ClaimResponse(ClaimResponseResource {
            request_identifier: Some("CLM-1".to_string()),
            outcome: outcome.to_string(),
            decision: decision.map(|d| d.to_string()),
            disposition: Some("per policy".to_string()),
            pre_auth_ref: None,
            pre_auth_period_end: None,
            approved_amount: None,
        }));
        bundle
    }

    #[test]
    fn test_queued_outcome() {
        assert_eq!(
            claim_disposition(&response_with("queued", None)),
            ClaimDisposition::Queued
        );
    }

    #[test]
    fn test_complete_approved() {
        let disposition = claim_disposition(&response_with("complete", Some("approved")));
        assert!(matches!(disposition, ClaimDisposition::Approved { .. }));
    }

    #[test]
    fn test_complete_denied_carries_reason() {
        let disposition = claim_disposition(&response_with("complete", Some("denied")));
        match disposition {
            ClaimDisposition::Denied { reason } => {
                assert_eq!(reason.as_deref(), Some("per policy"));
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[test]
    fn test_operation_outcome_wins_over_claim_response() {
        let mut bundle = response_with("complete", Some("approved"));
        bundle.push(Resource::OperationOutcome(OperationOutcomeResource {
            issue: vec![OutcomeIssue {
                severity: "error".to_string(),
                details: "schema validation failed".to_string(),
            }],
        }));

        let disposition = claim_disposition(&bundle);
        assert!(matches!(disposition, ClaimDisposition::Error { .. }));
    }

    #[test]
    fn test_unknown_shapes_become_error_not_panic() {
        let empty = MessageBundle::message();
        assert!(matches!(
            claim_disposition(&empty),
            ClaimDisposition::Error { .. }
        ));

        let unknown = response_with("processing", None);
        assert!(matches!(
            claim_disposition(&unknown),
            ClaimDisposition::Error { .. }
        ));
    }
}
