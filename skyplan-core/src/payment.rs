use serde::{Deserialize, Serialize};

/// Body sent to the payment-create endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRedirectRequest {
    pub order_info: String,
    pub amount: u64,
    pub txn_ref: String,
}

impl PaymentRedirectRequest {
    /// `txn_ref` is `{code}_{unix millis}`.
    pub fn for_booking(code: &str, amount: u64, origin: &str, destination: &str, unix_millis: i64) -> Self {
        Self {
            order_info: format!(
                "Ve may bay {}-{}",
                origin.trim().to_uppercase(),
                destination.trim().to_uppercase()
            ),
            amount,
            txn_ref: format!("{}_{}", code, unix_millis),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRedirect {
    #[serde(alias = "paymentUrl")]
    pub payment_url: String,
    #[serde(default, alias = "txnRef")]
    pub txn_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_request_shape() {
        let req = PaymentRedirectRequest::for_booking("SP202512345", 1_470_000, "han", "SGN", 1_735_000_000_000);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["orderInfo"], "Ve may bay HAN-SGN");
        assert_eq!(value["amount"], 1_470_000);
        assert_eq!(value["txnRef"], "SP202512345_1735000000000");
    }
}
