use cosmwasm_schema::cw_serde;
use cosmwasm_std::storage_keys::{namespace_with_key, to_length_prefixed};
use cosmwasm_std::{
    from_json, to_json_vec, Coin, Order, StdError, StdResult, Storage, Timestamp, Uint64,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{ForwardError, ForwardResult};
use crate::keys::{validate_identifier, PacketKey};

pub const PREFIX_IN_FLIGHT: &[u8] = b"in_flight";

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

/// Everything needed to retry or refund one forwarded transfer.
#[cw_serde]
pub struct InFlightPacket {
    /// Sender of the inbound transfer on the previous chain. Refunds go here.
    /// Never validated locally, it is an address of another chain.
    pub original_sender: String,
    /// Channel the inbound transfer arrived on
    pub refund_channel: String,
    pub refund_port: String,
    /// Channel and port the outbound transfer was sent on
    pub forward_channel: String,
    pub forward_port: String,
    /// Receiver of the outbound transfer on the next chain
    pub receiver: String,
    /// The net amount that was forwarded, after fees
    pub amount: Coin,
    /// Memo of the outbound transfer, if any
    pub memo: Option<String>,
    /// How many more times a failed delivery is re-sent before refunding
    pub retries_remaining: u32,
    /// Deadline of the outbound packet currently in flight
    pub timeout: Timestamp,
    /// Relative timeout in nanoseconds, used to compute the deadline of a retry
    pub forward_timeout: Uint64,
}

impl InFlightPacket {
    /// Checks the routes retries and refunds are sent on and the amount they send.
    pub fn validate(&self) -> ForwardResult<()> {
        validate_identifier("channel", &self.refund_channel)?;
        validate_identifier("port", &self.refund_port)?;
        validate_identifier("channel", &self.forward_channel)?;
        validate_identifier("port", &self.forward_port)?;
        if self.amount.amount.is_zero() {
            return Err(ForwardError::ZeroAmount {
                denom: self.amount.denom.clone(),
            });
        }
        Ok(())
    }
}

/// A stored packet together with its key, as used in listings and genesis.
#[cw_serde]
pub struct InFlightEntry {
    pub key: PacketKey,
    pub packet: InFlightPacket,
}

fn in_flight_key(key: &PacketKey) -> Vec<u8> {
    namespace_with_key(&[PREFIX_IN_FLIGHT], &key.to_bytes())
}

pub fn save_in_flight(
    storage: &mut dyn Storage,
    key: &PacketKey,
    packet: &InFlightPacket,
) -> ForwardResult<()> {
    key.validate()?;
    packet.validate()?;
    storage.set(&in_flight_key(key), &to_json_vec(packet)?);
    Ok(())
}

/// Returns `NotFound` when no packet is stored under `key`.
pub fn load_in_flight(storage: &dyn Storage, key: &PacketKey) -> StdResult<InFlightPacket> {
    may_load_in_flight(storage, key)?
        .ok_or_else(|| StdError::not_found(format!("InFlightPacket {key}")))
}

pub fn may_load_in_flight(
    storage: &dyn Storage,
    key: &PacketKey,
) -> StdResult<Option<InFlightPacket>> {
    storage
        .get(&in_flight_key(key))
        .map(from_json)
        .transpose()
}

pub fn remove_in_flight(storage: &mut dyn Storage, key: &PacketKey) {
    storage.remove(&in_flight_key(key));
}

/// Iterates over all stored packets in key order.
///
/// The iterator borrows the storage and is restartable by calling this again.
pub fn range_in_flight<'a>(
    storage: &'a dyn Storage,
    start_after: Option<&PacketKey>,
) -> impl Iterator<Item = StdResult<(PacketKey, InFlightPacket)>> + 'a {
    let prefix = to_length_prefixed(PREFIX_IN_FLIGHT);
    let start = match start_after {
        // the smallest key after `k` is `k` with a zero byte appended
        Some(k) => {
            let mut start = in_flight_key(k);
            start.push(0);
            start
        }
        None => prefix.clone(),
    };
    let end = namespace_upper_bound(&prefix);
    storage
        .range(Some(&start), Some(&end), Order::Ascending)
        .map(move |(raw_key, value)| {
            let key = PacketKey::from_bytes(&raw_key[prefix.len()..])?;
            let packet: InFlightPacket = from_json(value)?;
            Ok((key, packet))
        })
}

/// Lists up to `limit` packets (default 10, at most 30) following `start_after`.
pub fn list_in_flight(
    storage: &dyn Storage,
    start_after: Option<&PacketKey>,
    limit: Option<u32>,
) -> StdResult<Vec<InFlightEntry>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    range_in_flight(storage, start_after)
        .take(limit)
        .map(|item| item.map(|(key, packet)| InFlightEntry { key, packet }))
        .collect()
}

/// Removes every stored packet. Returns how many were removed.
pub fn clear_in_flight(storage: &mut dyn Storage) -> StdResult<usize> {
    let keys = range_in_flight(storage, None)
        .map(|item| item.map(|(key, _)| key))
        .collect::<StdResult<Vec<_>>>()?;
    for key in &keys {
        remove_in_flight(storage, key);
    }
    Ok(keys.len())
}

/// Returns a new vec of same length and last byte incremented by one.
/// Trailing 255 bytes are zeroed and the carry moves up the chain.
fn namespace_upper_bound(input: &[u8]) -> Vec<u8> {
    let mut copy = input.to_vec();
    for byte in copy.iter_mut().rev() {
        if *byte == 255 {
            *byte = 0;
        } else {
            *byte += 1;
            break;
        }
    }
    copy
}

pub(crate) fn may_load_item<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &[u8],
) -> StdResult<Option<T>> {
    storage
        .get(&to_length_prefixed(key))
        .map(from_json)
        .transpose()
}

pub(crate) fn save_item<T: Serialize>(
    storage: &mut dyn Storage,
    key: &[u8],
    item: &T,
) -> StdResult<()> {
    storage.set(&to_length_prefixed(key), &to_json_vec(item)?);
    Ok(())
}
