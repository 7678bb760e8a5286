use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use skyplan_core::{
    BackendError, BookingBackend, BookingEnvelope, BookingStatus, CreateBookingRequest, PaymentRedirect,
    PaymentRedirectRequest,
};
use std::time::Duration;
use tracing::debug;

/// JSON-over-HTTP client for the booking backend.
#[derive(Clone)]
pub struct HttpBookingBackend {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PaymentEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "paymentUrl")]
    payment_url: Option<String>,
    #[serde(default, rename = "txnRef")]
    txn_ref: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::Unreachable(err.to_string())
}

impl HttpBookingBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(req: RequestBuilder, auth: Option<&str>) -> RequestBuilder {
        match auth {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn read_envelope(resp: Response, code: &str) -> Result<BookingEnvelope, BackendError> {
        let status = resp.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(BackendError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(BackendError::NotFound(code.to_string())),
            _ => {}
        }
        let body = resp.text().await.map_err(transport)?;
        let envelope: BookingEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(BackendError::Decode(e.to_string())),
            Err(_) => {
                return Err(BackendError::Rejected {
                    status: status.as_u16(),
                    message: body,
                })
            }
        };
        if !status.is_success() || !envelope.success {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: envelope.message.unwrap_or_default(),
            });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
        auth: Option<&str>,
    ) -> Result<BookingEnvelope, BackendError> {
        debug!("POST /api/bookings/create outbound={}", request.outbound_flight_id);
        let req = self.client.post(self.url("/api/bookings/create")).json(request);
        let resp = Self::authorize(req, auth).send().await.map_err(transport)?;
        Self::read_envelope(resp, "").await
    }

    async fn booking_status(&self, code: &str, auth: Option<&str>) -> Result<BookingStatus, BackendError> {
        let req = self.client.get(self.url(&format!("/api/bookings/status/{}", code)));
        let resp = Self::authorize(req, auth).send().await.map_err(transport)?;
        let envelope = Self::read_envelope(resp, code).await?;
        envelope
            .booking
            .map(|b| b.status)
            .ok_or_else(|| BackendError::Decode("status response without booking".into()))
    }

    async fn cancel_booking(&self, code: &str, auth: Option<&str>) -> Result<BookingEnvelope, BackendError> {
        let req = self.client.patch(self.url(&format!("/api/bookings/{}/cancel", code)));
        let resp = Self::authorize(req, auth).send().await.map_err(transport)?;
        Self::read_envelope(resp, code).await
    }

    async fn create_payment_url(&self, request: &PaymentRedirectRequest) -> Result<PaymentRedirect, BackendError> {
        let resp = self
            .client
            .post(self.url("/api/payment/vnpay/create"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        let envelope: PaymentEnvelope = resp
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        match envelope.payment_url {
            Some(payment_url) if status.is_success() && envelope.success => Ok(PaymentRedirect {
                payment_url,
                txn_ref: envelope.txn_ref.or_else(|| Some(request.txn_ref.clone())),
            }),
            _ => Err(BackendError::Rejected {
                status: status.as_u16(),
                message: envelope.error.unwrap_or_else(|| "payment url not issued".into()),
            }),
        }
    }
}
