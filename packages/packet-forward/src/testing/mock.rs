use std::collections::{BTreeMap, BTreeSet};

use cosmwasm_std::testing::{mock_env, MockApi, MockStorage};
use cosmwasm_std::{Addr, Coin, StdError, StdResult, Uint128};

use crate::keys::PacketKey;
use crate::traits::{FeeCollector, ForwardDeps, TransferExecutor, TransferRequest};

/// Denom the mock escrow is funded with
pub const ESCROW_DENOM: &str = "uatom";
/// Balance of the mock escrow (the `mock_env()` contract address)
pub const ESCROW_BALANCE: u128 = 1_000_000;

/// All external dependencies, owned. Use `as_mut` to pass them to the
/// functions of this crate.
pub struct OwnedForwardDeps {
    pub storage: MockStorage,
    pub api: MockApi,
    pub transfer: MockTransfer,
    pub fees: MockFeeCollector,
}

impl OwnedForwardDeps {
    pub fn as_mut(&mut self) -> ForwardDeps<'_> {
        ForwardDeps {
            storage: &mut self.storage,
            api: &self.api,
            transfer: &mut self.transfer,
            fees: &mut self.fees,
        }
    }
}

/// Creates mocks with an empty store and a funded escrow account at the
/// contract address of `mock_env()`.
pub fn mock_forward_dependencies() -> OwnedForwardDeps {
    let mut transfer = MockTransfer::default();
    transfer.set_balance(
        &mock_env().contract.address,
        Coin::new(ESCROW_BALANCE, ESCROW_DENOM),
    );
    OwnedForwardDeps {
        storage: MockStorage::default(),
        api: MockApi::default(),
        transfer,
        fees: MockFeeCollector::default(),
    }
}

/// A transport that accepts every transfer on an open channel the sender can
/// pay for. Sequences start at 1 and count up per port and channel.
#[derive(Default)]
pub struct MockTransfer {
    balances: BTreeMap<(String, String), Uint128>,
    sequences: BTreeMap<(String, String), u64>,
    closed_channels: BTreeSet<String>,
    /// Every accepted transfer, in order
    pub sent: Vec<(PacketKey, TransferRequest)>,
}

impl MockTransfer {
    pub fn set_balance(&mut self, address: &Addr, amount: Coin) {
        self.balances
            .insert((address.to_string(), amount.denom), amount.amount);
    }

    pub fn balance(&self, address: &Addr, denom: &str) -> Uint128 {
        self.balances
            .get(&(address.to_string(), denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Makes every following send on `channel_id` fail
    pub fn close_channel(&mut self, channel_id: &str) {
        self.closed_channels.insert(channel_id.to_string());
    }

    pub fn reopen_channel(&mut self, channel_id: &str) {
        self.closed_channels.remove(channel_id);
    }
}

impl TransferExecutor for MockTransfer {
    fn send(&mut self, request: TransferRequest) -> StdResult<PacketKey> {
        if self.closed_channels.contains(&request.source_channel) {
            return Err(StdError::generic_err(format!(
                "channel {} is closed",
                request.source_channel
            )));
        }

        let balance_key = (request.sender.to_string(), request.amount.denom.clone());
        let balance = self.balances.get(&balance_key).copied().unwrap_or_default();
        let remaining = balance.checked_sub(request.amount.amount).map_err(|_| {
            StdError::generic_err(format!(
                "insufficient funds: {balance}{} < {}",
                request.amount.denom, request.amount
            ))
        })?;
        self.balances.insert(balance_key, remaining);

        let sequence = self
            .sequences
            .entry((request.source_port.clone(), request.source_channel.clone()))
            .or_insert(0);
        *sequence += 1;
        let key = PacketKey::new(
            request.source_channel.clone(),
            request.source_port.clone(),
            *sequence,
        );
        self.sent.push((key.clone(), request));
        Ok(key)
    }
}

/// Collects fees in memory, or fails every deposit after `fail_with`.
#[derive(Default)]
pub struct MockFeeCollector {
    /// Every deposit, in order
    pub pool: Vec<Coin>,
    error: Option<String>,
}

impl MockFeeCollector {
    pub fn fail_with(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }
}

impl FeeCollector for MockFeeCollector {
    fn fund_community_pool(&mut self, _depositor: &Addr, amount: &Coin) -> StdResult<()> {
        if let Some(msg) = &self.error {
            return Err(StdError::generic_err(msg.clone()));
        }
        self.pool.push(amount.clone());
        Ok(())
    }
}
