#![cfg(not(target_arch = "wasm32"))]

// Exposed for testing only
// Mock implementations of the collaborators, for unit tests of this crate and of hosts embedding it.

mod mock;

pub use mock::{
    mock_forward_dependencies, MockFeeCollector, MockTransfer, OwnedForwardDeps, ESCROW_BALANCE,
    ESCROW_DENOM,
};
