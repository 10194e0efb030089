use std::time::Duration;

use cosmwasm_std::{Coin, Env, StdAck};

use crate::errors::ForwardResult;
use crate::forward::{forward, ForwardRequest, ForwardResponse};
use crate::keys::PacketKey;
use crate::metadata::parse_forward_metadata;
use crate::outcome::{handle_outcome, OutcomeResponse, PacketOutcome};
use crate::traits::ForwardDeps;

pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_REFUND_TIMEOUT: Duration = Duration::from_secs(28 * 24 * 60 * 60);

/// Node level settings of the forwarding middleware
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForwardConfig {
    /// Retries for forwards whose memo does not ask for a specific number
    pub retries_on_timeout: u32,
    /// Timeout of forwarded packets whose memo does not set one
    pub forward_timeout: Duration,
    /// Timeout of refund packets
    pub refund_timeout: Duration,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        ForwardConfig {
            retries_on_timeout: 0,
            forward_timeout: DEFAULT_FORWARD_TIMEOUT,
            refund_timeout: DEFAULT_REFUND_TIMEOUT,
        }
    }
}

/// A transfer that arrived on this chain and was credited to the module escrow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedTransfer {
    /// Sender on the previous chain
    pub sender: String,
    /// Our end of the channel the transfer arrived on
    pub dest_channel: String,
    pub dest_port: String,
    /// Received amount in the local denom
    pub amount: Coin,
    pub memo: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RecvResponse {
    /// The memo holds no forwarding instructions, the transfer is delivered
    /// normally.
    PassThrough,
    Forwarded(ForwardResponse),
}

/// Glue between the transport callbacks of a host chain and the forwarding
/// state machine.
#[derive(Clone, Debug, Default)]
pub struct ForwardMiddleware {
    config: ForwardConfig,
}

impl ForwardMiddleware {
    pub fn new(config: ForwardConfig) -> Self {
        ForwardMiddleware { config }
    }

    pub fn config(&self) -> &ForwardConfig {
        &self.config
    }

    /// Forwards `transfer` if its memo asks for it.
    pub fn on_recv_packet(
        &self,
        deps: ForwardDeps,
        env: &Env,
        transfer: ReceivedTransfer,
    ) -> ForwardResult<RecvResponse> {
        let Some(metadata) = parse_forward_metadata(transfer.memo.as_deref())? else {
            return Ok(RecvResponse::PassThrough);
        };
        let request = ForwardRequest {
            original_sender: transfer.sender,
            refund_channel: transfer.dest_channel,
            refund_port: transfer.dest_port,
            forward_channel: metadata.channel.clone(),
            forward_port: metadata.port.clone(),
            receiver: metadata.receiver.clone(),
            amount: transfer.amount,
            retries: metadata.retries.unwrap_or(self.config.retries_on_timeout),
            timeout: metadata
                .timeout
                .map(Duration::from_nanos)
                .unwrap_or(self.config.forward_timeout),
            memo: metadata.next_memo(),
        };
        forward(deps, env, request).map(RecvResponse::Forwarded)
    }

    pub fn on_acknowledgement(
        &self,
        deps: ForwardDeps,
        env: &Env,
        key: &PacketKey,
        ack: &StdAck,
    ) -> ForwardResult<OutcomeResponse> {
        let outcome = match ack {
            StdAck::Success(_) => PacketOutcome::Success,
            StdAck::Error(reason) => PacketOutcome::Error {
                reason: reason.clone(),
            },
        };
        handle_outcome(deps, env, self.config.refund_timeout, key, outcome)
    }

    pub fn on_timeout(
        &self,
        deps: ForwardDeps,
        env: &Env,
        key: &PacketKey,
    ) -> ForwardResult<OutcomeResponse> {
        handle_outcome(
            deps,
            env,
            self.config.refund_timeout,
            key,
            PacketOutcome::Timeout,
        )
    }
}
