use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Api, Coin, StdResult, Storage, Timestamp};

use crate::keys::PacketKey;

/// An ICS-20 style transfer leaving this chain.
#[cw_serde]
pub struct TransferRequest {
    /// Account the tokens are taken from, the module escrow
    pub sender: Addr,
    pub source_port: String,
    pub source_channel: String,
    /// Receiver on the counterparty chain
    pub receiver: String,
    pub amount: Coin,
    /// Absolute deadline after which the transport times the packet out
    pub timeout: Timestamp,
    pub memo: Option<String>,
}

/// Sends tokens over a channel.
///
/// On success the transfer is committed to the transport and the key of the
/// packet that carries it is returned. A failing send (e.g. insufficient funds
/// or a closed channel) must not have moved any tokens.
pub trait TransferExecutor {
    fn send(&mut self, request: TransferRequest) -> StdResult<PacketKey>;
}

/// Receives forwarding fees.
pub trait FeeCollector {
    fn fund_community_pool(&mut self, depositor: &Addr, amount: &Coin) -> StdResult<()>;
}

/// Holds all external dependencies of the forwarding layer.
///
/// Follows the shape of `cosmwasm_std::DepsMut`: references that live as
/// long as the host transaction.
pub struct ForwardDeps<'a> {
    pub storage: &'a mut dyn Storage,
    pub api: &'a dyn Api,
    pub transfer: &'a mut dyn TransferExecutor,
    pub fees: &'a mut dyn FeeCollector,
}

impl ForwardDeps<'_> {
    /// Reborrows the dependencies so they can be handed to a nested call
    /// and used again afterwards.
    pub fn branch(&'_ mut self) -> ForwardDeps<'_> {
        ForwardDeps {
            storage: self.storage,
            api: self.api,
            transfer: self.transfer,
            fees: self.fees,
        }
    }
}
