use std::time::Duration;

use cosmwasm_std::{Coin, Env, Event, StdError, StdResult, Timestamp, Uint64};

use crate::errors::{ForwardError, ForwardResult};
use crate::fee::compute_fee;
use crate::keys::{validate_identifier, PacketKey};
use crate::params::load_params;
use crate::state::{save_in_flight, InFlightPacket};
use crate::traits::{ForwardDeps, TransferRequest};

pub const FORWARD_EVENT: &str = "packet_forward";

/// Instructions for sending a received transfer one hop further.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardRequest {
    /// Sender of the inbound transfer, refunded if the forward fails for good
    pub original_sender: String,
    /// Channel and port the inbound transfer arrived on
    pub refund_channel: String,
    pub refund_port: String,
    /// Channel and port to forward on
    pub forward_channel: String,
    pub forward_port: String,
    pub receiver: String,
    /// The full received amount. The fee is taken from this.
    pub amount: Coin,
    pub retries: u32,
    pub timeout: Duration,
    pub memo: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForwardResponse {
    pub key: PacketKey,
    pub fee: Coin,
    pub forwarded: Coin,
    pub events: Vec<Event>,
}

/// Charges the forwarding fee on `request.amount`, sends the remainder out on
/// the forward channel and starts tracking the outbound packet.
///
/// Nothing is stored unless the send succeeded. A failing fee payment is
/// returned as [`ForwardError::FeeCollection`], a failing send as
/// [`ForwardError::Dispatch`]. Either way the host is expected to revert its
/// transaction.
pub fn forward(
    mut deps: ForwardDeps,
    env: &Env,
    request: ForwardRequest,
) -> ForwardResult<ForwardResponse> {
    validate_identifier("channel", &request.refund_channel)?;
    validate_identifier("port", &request.refund_port)?;
    validate_identifier("channel", &request.forward_channel)?;
    validate_identifier("port", &request.forward_port)?;

    let params = load_params(deps.storage)?;
    let denom = request.amount.denom.as_str();
    let split = compute_fee(request.amount.amount, params.fee_percentage)?;
    if split.net.is_zero() {
        return Err(ForwardError::ZeroAmount {
            denom: denom.to_string(),
        });
    }

    let fee = split.fee_coin(denom);
    if !fee.amount.is_zero() {
        deps.fees
            .fund_community_pool(&env.contract.address, &fee)
            .map_err(|source| ForwardError::FeeCollection {
                fee: fee.clone(),
                source,
            })?;
    }

    let packet = InFlightPacket {
        original_sender: request.original_sender,
        refund_channel: request.refund_channel,
        refund_port: request.refund_port,
        forward_channel: request.forward_channel,
        forward_port: request.forward_port,
        receiver: request.receiver,
        amount: split.net_coin(denom),
        memo: request.memo,
        retries_remaining: request.retries,
        timeout: env.block.time,
        forward_timeout: Uint64::new(duration_nanos(request.timeout)),
    };
    let (key, packet) = dispatch(deps.branch(), env, packet)?;

    let event = Event::new(FORWARD_EVENT)
        .add_attribute("packet_key", key.to_string())
        .add_attribute("original_sender", &packet.original_sender)
        .add_attribute("refund_channel", &packet.refund_channel)
        .add_attribute("forward_channel", &packet.forward_channel)
        .add_attribute("receiver", &packet.receiver)
        .add_attribute("amount", packet.amount.to_string())
        .add_attribute("fee", fee.to_string())
        .add_attribute("retries_remaining", packet.retries_remaining.to_string())
        .add_attribute("timeout", packet.timeout.nanos().to_string());

    Ok(ForwardResponse {
        key,
        fee,
        forwarded: packet.amount,
        events: vec![event],
    })
}

/// Sends `packet.amount` to `packet.receiver` with a fresh deadline and stores
/// the packet under the key of the new outbound packet.
///
/// Shared by first forwards and retries. No fee is charged here.
pub(crate) fn dispatch(
    deps: ForwardDeps,
    env: &Env,
    mut packet: InFlightPacket,
) -> ForwardResult<(PacketKey, InFlightPacket)> {
    packet.timeout = deadline(env.block.time, packet.forward_timeout.u64())?;

    let request = TransferRequest {
        sender: env.contract.address.clone(),
        source_port: packet.forward_port.clone(),
        source_channel: packet.forward_channel.clone(),
        receiver: packet.receiver.clone(),
        amount: packet.amount.clone(),
        timeout: packet.timeout,
        memo: packet.memo.clone(),
    };
    let key = deps
        .transfer
        .send(request)
        .map_err(|e| ForwardError::dispatch(&packet.forward_port, &packet.forward_channel, e))?;

    save_in_flight(deps.storage, &key, &packet)?;
    Ok((key, packet))
}

/// `now` plus a relative timeout in nanoseconds
pub(crate) fn deadline(now: Timestamp, timeout_nanos: u64) -> StdResult<Timestamp> {
    now.nanos()
        .checked_add(timeout_nanos)
        .map(Timestamp::from_nanos)
        .ok_or_else(|| StdError::generic_err("timeout exceeds the representable time range"))
}

pub(crate) fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
