//! Payment gateway seam. The simulator is pure (no I/O) so the booking
//! engine never has to compensate for gateway failures mid-transaction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PAYMENT_METHOD_CARD: &str = "CARD";

pub const ERROR_CARD_DECLINED: &str = "card_declined";
pub const ERROR_NETWORK: &str = "network_error";
pub const ERROR_INVALID_AMOUNT: &str = "invalid_amount";

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub user_id: Uuid,
    /// Minor units; must be positive.
    pub amount: i64,
    pub currency: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeOutcome {
    pub success: bool,
    pub provider_ref: Option<String>,
    pub error_type: Option<String>,
    pub raw_response: serde_json::Value,
}

impl ChargeOutcome {
    fn declined(error_type: &str, token: &str) -> Self {
        ChargeOutcome {
            success: false,
            provider_ref: None,
            error_type: Some(error_type.to_string()),
            raw_response: serde_json::json!({
                "status": "declined",
                "reason": error_type,
                "token": token,
            }),
        }
    }
}

pub trait PaymentGateway: Send + Sync {
    fn charge(&self, request: &ChargeRequest) -> ChargeOutcome;
}

/// Deterministic pseudo-gateway. The token prefix selects the outcome, which
/// makes every payment path reproducible in tests and demos.
#[derive(Debug, Default, Clone, Copy)]
pub struct CardSimulator;

impl PaymentGateway for CardSimulator {
    fn charge(&self, request: &ChargeRequest) -> ChargeOutcome {
        if request.token.starts_with("tok_fail_") {
            return ChargeOutcome::declined(ERROR_CARD_DECLINED, &request.token);
        }
        if request.token.starts_with("tok_net_") {
            return ChargeOutcome::declined(ERROR_NETWORK, &request.token);
        }
        if request.amount <= 0 {
            return ChargeOutcome::declined(ERROR_INVALID_AMOUNT, &request.token);
        }

        let provider_ref = format!("sim_ch_{}", Uuid::new_v4().simple());
        ChargeOutcome {
            success: true,
            provider_ref: Some(provider_ref),
            error_type: None,
            raw_response: serde_json::json!({
                "status": "approved",
                "ts": Utc::now().to_rfc3339(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(token: &str, amount: i64) -> ChargeRequest {
        ChargeRequest {
            user_id: Uuid::new_v4(),
            amount,
            currency: "USD".into(),
            token: token.into(),
        }
    }

    #[test]
    fn ok_token_approves_with_reference() {
        let outcome = CardSimulator.charge(&request("tok_ok", 12_500));
        assert!(outcome.success);
        assert!(outcome.provider_ref.unwrap().starts_with("sim_ch_"));
        assert_eq!(outcome.raw_response["status"], "approved");
    }

    #[test]
    fn fail_prefix_declines() {
        let outcome = CardSimulator.charge(&request("tok_fail_visa", 12_500));
        assert!(!outcome.success);
        assert_eq!(outcome.error_type.as_deref(), Some(ERROR_CARD_DECLINED));
        assert!(outcome.provider_ref.is_none());
    }

    #[test]
    fn net_prefix_simulates_gateway_outage() {
        let outcome = CardSimulator.charge(&request("tok_net_timeout", 12_500));
        assert!(!outcome.success);
        assert_eq!(outcome.error_type.as_deref(), Some(ERROR_NETWORK));
    }

    #[test]
    fn non_positive_amounts_never_charge() {
        for amount in [0, -1, -10_000] {
            let outcome = CardSimulator.charge(&request("tok_ok", amount));
            assert!(!outcome.success);
            assert_eq!(outcome.error_type.as_deref(), Some(ERROR_INVALID_AMOUNT));
        }
    }

    #[test]
    fn fail_prefix_wins_over_amount_check() {
        let outcome = CardSimulator.charge(&request("tok_fail_x", -5));
        assert_eq!(outcome.error_type.as_deref(), Some(ERROR_CARD_DECLINED));
    }
}
