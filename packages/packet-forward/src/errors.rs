use cosmwasm_std::{Coin, Decimal, StdError};
use thiserror::Error;

use crate::keys::PacketKey;

/// Errors surfaced to the host transaction that invoked the forwarding layer.
///
/// Unknown-key notifications, exhausted retries and failed refunds are not
/// errors: they resolve inside the state machine (see [`crate::Resolution`]).
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("{0}")]
    /// this is needed so we can use `load_in_flight(...)?` and have it auto-converted
    Std(#[from] StdError),

    #[error("Fee percentage must be in [0, 1), got {value}")]
    InvalidFeePercentage { value: Decimal },

    #[error("Cannot dispatch transfer on {port}/{channel}: {source}")]
    Dispatch {
        port: String,
        channel: String,
        #[source]
        source: StdError,
    },

    #[error("Cannot pay forwarding fee of {fee} into the community pool: {source}")]
    FeeCollection {
        fee: Coin,
        #[source]
        source: StdError,
    },

    #[error("Nothing to forward: net amount of {denom} is zero")]
    ZeroAmount { denom: String },

    #[error("Invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("Invalid forward metadata: {msg}")]
    InvalidMetadata { msg: String },

    #[error("Duplicate in-flight packet key {key}")]
    DuplicatePacketKey { key: PacketKey },
}

impl ForwardError {
    pub fn dispatch(port: impl Into<String>, channel: impl Into<String>, source: StdError) -> Self {
        ForwardError::Dispatch {
            port: port.into(),
            channel: channel.into(),
            source,
        }
    }

    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        ForwardError::InvalidMetadata { msg: msg.into() }
    }
}

pub type ForwardResult<T> = Result<T, ForwardError>;
