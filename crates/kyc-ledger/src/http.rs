//! # HTTP Ledger Gateway Client
//!
//! Reads contract state from, and submits circuit calls through, a ledger
//! gateway.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/contracts/{address}/state` | Current public fields (404: no state) |
//! | POST   | `/contracts/{address}/calls` | Submit a circuit call and await finalization |
//!
//! State reads retry on transport errors. Circuit calls overwrite whole
//! maps and are sent exactly once; a timed-out call surfaces as an error
//! and the caller decides whether to re-read and resubmit.

use std::time::Duration;

use async_trait::async_trait;

use crate::circuit::{LedgerMutation, MutationReceipt};
use crate::config::{ConfigError, LedgerClientConfig};
use crate::error::LedgerError;
use crate::fields::RawLedgerFields;
use crate::retry::retry_send;
use crate::source::{LedgerMutator, LedgerReader};

/// Gateway-backed [`LedgerReader`] and [`LedgerMutator`].
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    http: reqwest::Client,
    contract_url: String,
}

impl HttpLedgerClient {
    pub fn new(config: LedgerClientConfig) -> Result<Self, LedgerError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ConfigError::InvalidToken)?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LedgerError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            contract_url: config.contract_url(),
        })
    }
}

#[async_trait]
impl LedgerReader for HttpLedgerClient {
    async fn fetch_raw_fields(&self) -> Result<Option<RawLedgerFields>, LedgerError> {
        let endpoint = "GET /contracts/{address}/state";
        let url = format!("{}/state", self.contract_url);

        let resp = retry_send(endpoint, || self.http.get(&url).send())
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Gateway {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| LedgerError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })
    }
}

#[async_trait]
impl LedgerMutator for HttpLedgerClient {
    async fn submit_update(&self, mutation: LedgerMutation) -> Result<MutationReceipt, LedgerError> {
        let endpoint = "POST /contracts/{address}/calls";
        let url = format!("{}/calls", self.contract_url);

        let resp = self
            .http
            .post(&url)
            .json(&mutation)
            .send()
            .await
            .map_err(|e| LedgerError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerError::Gateway {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let receipt: MutationReceipt =
            resp.json().await.map_err(|e| LedgerError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !receipt.succeeded() {
            return Err(LedgerError::TransactionFailed {
                circuit: mutation.circuit.as_str().to_string(),
                transaction_id: receipt.transaction_id,
                status: receipt.status,
            });
        }
        Ok(receipt)
    }
}
