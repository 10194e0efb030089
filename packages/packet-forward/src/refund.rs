use std::time::Duration;

use cosmwasm_std::{Coin, Env, Event};

use crate::errors::{ForwardError, ForwardResult};
use crate::forward::{deadline, duration_nanos};
use crate::keys::PacketKey;
use crate::traits::{ForwardDeps, TransferRequest};

pub const REFUND_EVENT: &str = "packet_refund";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefundRequest {
    pub original_sender: String,
    pub refund_channel: String,
    pub refund_port: String,
    pub amount: Coin,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RefundResponse {
    /// Key of the refund packet
    pub key: PacketKey,
    pub events: Vec<Event>,
}

/// Sends `amount` from the module escrow back over the channel the original
/// transfer came in on, to its original sender.
///
/// Refund packets are not tracked: whatever happens to them is up to the
/// transport.
pub fn refund(
    deps: ForwardDeps,
    env: &Env,
    refund_timeout: Duration,
    request: RefundRequest,
) -> ForwardResult<RefundResponse> {
    let timeout = deadline(env.block.time, duration_nanos(refund_timeout))?;
    let transfer = TransferRequest {
        sender: env.contract.address.clone(),
        source_port: request.refund_port.clone(),
        source_channel: request.refund_channel.clone(),
        receiver: request.original_sender.clone(),
        amount: request.amount.clone(),
        timeout,
        memo: None,
    };
    let key = deps
        .transfer
        .send(transfer)
        .map_err(|e| ForwardError::dispatch(&request.refund_port, &request.refund_channel, e))?;

    let event = Event::new(REFUND_EVENT)
        .add_attribute("refund_packet_key", key.to_string())
        .add_attribute("receiver", request.original_sender)
        .add_attribute("amount", request.amount.to_string())
        .add_attribute("refund_channel", request.refund_channel)
        .add_attribute("refund_port", request.refund_port)
        .add_attribute("timeout", timeout.nanos().to_string());
    Ok(RefundResponse {
        key,
        events: vec![event],
    })
}
