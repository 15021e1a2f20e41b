//! Soroban RPC client: polls `getEvents` and decodes launch pool events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, PoolEvent, PoolSchedule, PoolTerms};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// XDR-encoded topic list
    pub topic: Vec<String>,
    /// XDR-encoded event value / data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// One page of `getEvents` output.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// Doubling retry delay capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    /// Sleep for the current delay, then double it.
    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

/// Fetch a page of the pool's events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`      : optional opaque pagination cursor from a previous response.
/// * `limit`       : maximum number of events to return.
///
/// Transport errors, rate limits and soft RPC errors are retried with
/// back-off; malformed requests fail immediately.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.secs);
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs, err.code, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

/// Invalid request / unknown method; retrying cannot help.
fn is_hard_error(code: i64) -> bool {
    code == -32600 || code == -32601
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`PoolEvent`] structs.
///
/// Events from failed contract calls are dropped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<PoolEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<PoolEvent> {
    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let actor = raw.topic.get(1).map(|t| extract_scalar(t));
    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}-{}-{}-{}",
            raw.tx_hash.as_deref().unwrap_or("-"),
            kind.as_str(),
            actor.as_deref().unwrap_or("-")
        )
    });

    Some(PoolEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        actor,
        status: extract_status(&raw.value),
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
        ..decode_data(&raw.value, kind)
    })
}

/// Pull apart the JSON `value` blob that Soroban returns for event data.
/// The XDR is decoded by the RPC into a `{"type":…, …}` JSON object.
///
/// Only the payload fields are filled in; identity fields stay default.
fn decode_data(value: &Value, kind: EventKind) -> PoolEvent {
    match kind {
        EventKind::PoolCreated => PoolEvent {
            payment_asset: extract_field(value, &["payment_asset"]),
            offering_asset: extract_field(value, &["offering_asset"]),
            terms: value.get("params").and_then(decode_terms),
            ..Default::default()
        },
        EventKind::ParametersUpdated => PoolEvent {
            terms: value.get("params").and_then(decode_terms),
            offering_deposited: extract_bool(value, "offering_deposited"),
            ..Default::default()
        },
        EventKind::OfferingDeposited => PoolEvent {
            amount: extract_field(value, &["amount"]),
            total: extract_field(value, &["total_deposited"]),
            offering_deposited: extract_bool(value, "offering_deposited"),
            ..Default::default()
        },
        EventKind::PoolActivated | EventKind::ScheduleUpdated => PoolEvent {
            schedule: value.get("schedule").and_then(decode_schedule),
            ..Default::default()
        },
        EventKind::TokensPurchased => PoolEvent {
            amount: extract_field(value, &["amount"]),
            contribution: extract_field(value, &["contribution"]),
            entitlement: extract_field(value, &["entitlement"]),
            total: extract_field(value, &["total_raised"]),
            ..Default::default()
        },
        EventKind::PoolFinalized | EventKind::RefundEnabled | EventKind::PoolCancelled => {
            PoolEvent {
                total: extract_field(value, &["total_raised"]),
                ..Default::default()
            }
        }
        EventKind::TokensClaimed => PoolEvent {
            amount: extract_field(value, &["amount"]),
            total: extract_field(value, &["total_distributed"]),
            ..Default::default()
        },
        EventKind::RefundClaimed => PoolEvent {
            amount: extract_field(value, &["amount"]),
            total: extract_field(value, &["total_refunded"]),
            ..Default::default()
        },
        EventKind::FundsWithdrawn | EventKind::UnsoldWithdrawn => PoolEvent {
            amount: extract_field(value, &["amount"]),
            ..Default::default()
        },
        EventKind::OwnershipTransferred => PoolEvent {
            new_owner: extract_field(value, &["new_owner"])
                .or_else(|| find_nested(value, "new_owner")),
            ..Default::default()
        },
        EventKind::Unknown => PoolEvent::default(),
    }
}

/// The contract's `PoolParams`; all five fields or nothing.
fn decode_terms(params: &Value) -> Option<PoolTerms> {
    Some(PoolTerms {
        rate: extract_field(params, &["rate"])?,
        soft_cap: extract_field(params, &["soft_cap"])?,
        hard_cap: extract_field(params, &["hard_cap"])?,
        min_contribution: extract_field(params, &["min_contribution"])?,
        max_contribution: extract_field(params, &["max_contribution"])?,
    })
}

/// The contract's `Schedule`; all three timestamps or nothing.
fn decode_schedule(schedule: &Value) -> Option<PoolSchedule> {
    let time = |key: &str| extract_field(schedule, &[key])?.parse::<i64>().ok();
    Some(PoolSchedule {
        start_time: time("start_time")?,
        end_time: time("end_time")?,
        refund_end_time: time("refund_end_time")?,
    })
}

fn extract_bool(value: &Value, key: &str) -> Option<bool> {
    match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(key) {
            let s = match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => v.as_str().map(String::from),
            };
            if s.is_some() {
                return s;
            }
        }
    }
    None
}

/// Every pool event carries the resulting status as a `u32`.
fn extract_status(value: &Value) -> Option<i64> {
    match value.get("status")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn find_nested(value: &Value, key: &str) -> Option<String> {
    if let Value::Object(map) = value {
        for (k, v) in map {
            if k == key {
                return v.as_str().map(String::from);
            }
            if let Some(found) = find_nested(v, key) {
                return Some(found);
            }
        }
    }
    None
}

/// Extract a Soroban Symbol from the XDR-decoded topic string.
/// The RPC may return `{"type":"symbol","value":"purchase"}` or just the raw string.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    // Fallback: treat the raw string as the symbol
    raw.to_string()
}

/// Extract an address or number from a topic entry that might be a JSON object or a raw string.
fn extract_scalar(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(n) = v.get("value").and_then(|x| x.as_u64()) {
            return n.to_string();
        }
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    raw.to_string()
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
