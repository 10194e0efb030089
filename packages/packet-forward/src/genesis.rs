use std::collections::BTreeSet;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{from_json, StdResult, Storage};

use crate::errors::{ForwardError, ForwardResult};
use crate::params::{load_params, set_params, Params};
use crate::state::{clear_in_flight, range_in_flight, save_in_flight, InFlightEntry};

/// Snapshot of everything the forwarding layer stores.
#[cw_serde]
#[derive(Default)]
pub struct GenesisState {
    pub params: Params,
    pub in_flight_packets: Vec<InFlightEntry>,
}

impl GenesisState {
    pub fn validate(&self) -> ForwardResult<()> {
        self.params.validate()?;
        let mut seen = BTreeSet::new();
        for entry in &self.in_flight_packets {
            entry.key.validate()?;
            entry.packet.validate()?;
            if !seen.insert(&entry.key) {
                return Err(ForwardError::DuplicatePacketKey {
                    key: entry.key.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Exports params and every tracked packet, in storage key order.
pub fn export_genesis(storage: &dyn Storage) -> StdResult<GenesisState> {
    let in_flight_packets = range_in_flight(storage, None)
        .map(|item| item.map(|(key, packet)| InFlightEntry { key, packet }))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(GenesisState {
        params: load_params(storage)?,
        in_flight_packets,
    })
}

/// Replaces all stored state with `state`.
///
/// The state, including every packet, is validated before anything is
/// written, so an invalid state leaves the store exactly as it was.
pub fn init_genesis(storage: &mut dyn Storage, state: &GenesisState) -> ForwardResult<()> {
    state.validate()?;
    clear_in_flight(storage)?;
    set_params(storage, &state.params)?;
    for entry in &state.in_flight_packets {
        save_in_flight(storage, &entry.key, &entry.packet)?;
    }
    Ok(())
}

/// Decodes a JSON snapshot and imports it with [`init_genesis`].
pub fn import_genesis_json(storage: &mut dyn Storage, data: &[u8]) -> ForwardResult<()> {
    let state: GenesisState = from_json(data)?;
    init_genesis(storage, &state)
}
