use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use skyplan_core::{BookingIdentifier, Provenance};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierState {
    Unresolved,
    ServerIssued,
    ClientSynthesized,
}

impl IdentifierState {
    pub fn of(identifier: Option<&BookingIdentifier>) -> Self {
        match identifier.map(|id| id.provenance) {
            None => IdentifierState::Unresolved,
            Some(Provenance::ServerIssued) => IdentifierState::ServerIssued,
            Some(Provenance::ClientSynthesized) => IdentifierState::ClientSynthesized,
        }
    }
}

/// `{prefix}{year}{last five digits of the unix millis}`, e.g. `SP202512345`.
pub fn synthesize_code(prefix: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}{}{:05}",
        prefix,
        now.year(),
        now.timestamp_millis().rem_euclid(100_000)
    )
}

pub struct IdentifierResolver {
    prefix: String,
}

impl IdentifierResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn synthesize(&self, now: DateTime<Utc>) -> BookingIdentifier {
        let code = synthesize_code(&self.prefix, now);
        info!("synthesized provisional booking code {}", code);
        BookingIdentifier::client_synthesized(code, now)
    }

    /// Applies a server-issued code to the current identifier. Returns the
    /// identifier to store, or `None` when the current one is already
    /// authoritative and must be kept.
    pub fn reconcile(
        &self,
        current: Option<&BookingIdentifier>,
        server_code: &str,
        now: DateTime<Utc>,
    ) -> Option<BookingIdentifier> {
        let server_code = server_code.trim();
        if server_code.is_empty() {
            return None;
        }
        match current {
            Some(existing) if existing.is_authoritative() => None,
            Some(existing) => {
                info!("booking {} confirmed by backend as {}", existing.code, server_code);
                Some(BookingIdentifier::server_issued(server_code, now))
            }
            None => {
                info!("booking confirmed by backend as {}", server_code);
                Some(BookingIdentifier::server_issued(server_code, now))
            }
        }
    }
}

impl Default for IdentifierResolver {
    fn default() -> Self {
        Self::new("SP")
    }
}
