//! Forwarding of token transfers over several hops.
//!
//! A transfer arriving with forwarding instructions is sent on over another
//! channel, minus a governance controlled fee. The outbound packet is tracked
//! until the transport reports its outcome: successes are forgotten, timeouts
//! and error acknowledgements are retried a limited number of times and then
//! refunded to the original sender over the channel the transfer came in on.
//!
//! Everything runs synchronously inside a host transaction. The host provides
//! storage and the transport through [`ForwardDeps`] and reverts its
//! transaction when a function here returns an error.

mod errors;
mod fee;
mod forward;
mod genesis;
mod keys;
mod metadata;
mod middleware;
mod outcome;
mod params;
mod refund;
mod state;
mod traits;

pub use crate::errors::{ForwardError, ForwardResult};
pub use crate::fee::{compute_fee, FeeSplit};
pub use crate::forward::{forward, ForwardRequest, ForwardResponse, FORWARD_EVENT};
pub use crate::genesis::{export_genesis, import_genesis_json, init_genesis, GenesisState};
pub use crate::keys::{PacketKey, MAX_IDENTIFIER_LENGTH};
pub use crate::metadata::{parse_forward_metadata, ForwardMetadata};
pub use crate::middleware::{
    ForwardConfig, ForwardMiddleware, ReceivedTransfer, RecvResponse, DEFAULT_FORWARD_TIMEOUT,
    DEFAULT_REFUND_TIMEOUT,
};
pub use crate::outcome::{
    handle_outcome, OutcomeResponse, PacketOutcome, Resolution, OUTCOME_EVENT, REFUND_FAILED_EVENT,
};
pub use crate::params::{load_params, set_params, Params};
pub use crate::refund::{refund, RefundRequest, RefundResponse, REFUND_EVENT};
pub use crate::state::{
    list_in_flight, load_in_flight, may_load_in_flight, range_in_flight, remove_in_flight,
    save_in_flight, InFlightEntry, InFlightPacket,
};
pub use crate::traits::{FeeCollector, ForwardDeps, TransferExecutor, TransferRequest};

// Exposed for testing only
#[cfg(not(target_arch = "wasm32"))]
pub mod testing;
