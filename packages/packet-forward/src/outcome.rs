use std::time::Duration;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Env, Event};

use crate::errors::ForwardResult;
use crate::forward::dispatch;
use crate::keys::PacketKey;
use crate::refund::{refund, RefundRequest, RefundResponse};
use crate::state::{may_load_in_flight, remove_in_flight};
use crate::traits::ForwardDeps;

pub const OUTCOME_EVENT: &str = "packet_forward_outcome";
pub const REFUND_FAILED_EVENT: &str = "packet_refund_failed";

/// Final state of an outbound packet as reported by the transport.
#[cw_serde]
pub enum PacketOutcome {
    /// Acknowledged with a success acknowledgement
    Success,
    /// Timed out before it was received
    Timeout,
    /// Acknowledged with an error acknowledgement
    Error { reason: String },
}

impl PacketOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            PacketOutcome::Success => "success",
            PacketOutcome::Timeout => "timeout",
            PacketOutcome::Error { .. } => "error",
        }
    }
}

/// What the forwarding layer did in response to an outcome.
#[cw_serde]
pub enum Resolution {
    /// No packet is tracked under the key. Nothing happened.
    Untracked,
    /// The forward arrived. The packet is no longer tracked.
    Completed,
    /// The transfer was sent again and is now tracked under `key`.
    Retried { key: PacketKey, retries_remaining: u32 },
    /// Retries are exhausted and the funds were sent back to the original sender.
    Refunded { key: PacketKey },
    /// Retries are exhausted and sending the funds back failed. The packet is
    /// no longer tracked and the funds stay in escrow.
    RefundFailed { reason: String },
}

impl Resolution {
    fn as_str(&self) -> &'static str {
        match self {
            Resolution::Untracked => "untracked",
            Resolution::Completed => "completed",
            Resolution::Retried { .. } => "retried",
            Resolution::Refunded { .. } => "refunded",
            Resolution::RefundFailed { .. } => "refund_failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OutcomeResponse {
    pub resolution: Resolution,
    pub events: Vec<Event>,
}

/// Resolves the outcome of the outbound packet `key`.
///
/// * Success: the packet is forgotten.
/// * Timeout or error with retries left: the same net amount is sent again
///   to the same receiver with a fresh deadline and one retry less. The old
///   entry is only removed once the new send succeeded.
/// * Timeout or error without retries: the net amount is refunded to the
///   original sender over the inbound channel and the packet is forgotten,
///   whether or not the refund could be sent.
///
/// Outcomes for keys that are not tracked (never forwarded here or already
/// resolved) are ignored, which makes duplicate deliveries harmless.
pub fn handle_outcome(
    mut deps: ForwardDeps,
    env: &Env,
    refund_timeout: Duration,
    key: &PacketKey,
    outcome: PacketOutcome,
) -> ForwardResult<OutcomeResponse> {
    let Some(packet) = may_load_in_flight(deps.storage, key)? else {
        return Ok(respond(key, &outcome, Resolution::Untracked, vec![]));
    };

    let mut events = vec![];
    let resolution = match &outcome {
        PacketOutcome::Success => {
            remove_in_flight(deps.storage, key);
            Resolution::Completed
        }
        PacketOutcome::Timeout | PacketOutcome::Error { .. }
            if packet.retries_remaining > 0 =>
        {
            let mut next = packet;
            next.retries_remaining -= 1;
            let (new_key, next) = dispatch(deps.branch(), env, next)?;
            if new_key != *key {
                remove_in_flight(deps.storage, key);
            }
            deps.api.debug(&format!(
                "packet-forward: retrying {key} as {new_key}, {} retries left",
                next.retries_remaining
            ));
            Resolution::Retried {
                key: new_key,
                retries_remaining: next.retries_remaining,
            }
        }
        PacketOutcome::Timeout | PacketOutcome::Error { .. } => {
            let request = RefundRequest {
                original_sender: packet.original_sender,
                refund_channel: packet.refund_channel,
                refund_port: packet.refund_port,
                amount: packet.amount,
            };
            let result = refund(deps.branch(), env, refund_timeout, request.clone());
            // a refund is attempted once, the entry goes away either way
            remove_in_flight(deps.storage, key);
            match result {
                Ok(RefundResponse {
                    key: refund_key,
                    events: refund_events,
                }) => {
                    events.extend(refund_events);
                    Resolution::Refunded { key: refund_key }
                }
                Err(err) => {
                    deps.api
                        .debug(&format!("packet-forward: refund of {key} failed: {err}"));
                    events.push(
                        Event::new(REFUND_FAILED_EVENT)
                            .add_attribute("packet_key", key.to_string())
                            .add_attribute("receiver", request.original_sender)
                            .add_attribute("amount", request.amount.to_string())
                            .add_attribute("refund_channel", request.refund_channel)
                            .add_attribute("error", err.to_string()),
                    );
                    Resolution::RefundFailed {
                        reason: err.to_string(),
                    }
                }
            }
        }
    };

    Ok(respond(key, &outcome, resolution, events))
}

/// Prepends the outcome event to the events of the resolution.
fn respond(
    key: &PacketKey,
    outcome: &PacketOutcome,
    resolution: Resolution,
    mut events: Vec<Event>,
) -> OutcomeResponse {
    let mut event = Event::new(OUTCOME_EVENT)
        .add_attribute("packet_key", key.to_string())
        .add_attribute("outcome", outcome.as_str())
        .add_attribute("resolution", resolution.as_str());
    if let PacketOutcome::Error { reason } = outcome {
        event = event.add_attribute("ack_error", reason);
    }
    match &resolution {
        Resolution::Retried {
            key,
            retries_remaining,
        } => {
            event = event
                .add_attribute("new_packet_key", key.to_string())
                .add_attribute("retries_remaining", retries_remaining.to_string());
        }
        Resolution::Refunded { key } => {
            event = event.add_attribute("refund_packet_key", key.to_string());
        }
        Resolution::RefundFailed { reason } => {
            event = event.add_attribute("refund_error", reason);
        }
        Resolution::Untracked | Resolution::Completed => {}
    }
    events.insert(0, event);
    OutcomeResponse { resolution, events }
}
