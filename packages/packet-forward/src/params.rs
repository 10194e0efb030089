use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Decimal, StdResult, Storage};

use crate::errors::{ForwardError, ForwardResult};
use crate::state::{may_load_item, save_item};

pub const KEY_PARAMS: &[u8] = b"params";

/// Governance controlled parameters of the forwarding layer.
#[cw_serde]
pub struct Params {
    /// Share of every forwarded amount that is paid into the community pool.
    /// Must be in `[0, 1)`.
    pub fee_percentage: Decimal,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            fee_percentage: Decimal::zero(),
        }
    }
}

impl Params {
    pub fn new(fee_percentage: Decimal) -> Self {
        Params { fee_percentage }
    }

    pub fn validate(&self) -> ForwardResult<()> {
        // Decimal is unsigned, only the upper bound needs checking
        if self.fee_percentage >= Decimal::one() {
            return Err(ForwardError::InvalidFeePercentage {
                value: self.fee_percentage,
            });
        }
        Ok(())
    }
}

/// Loads the stored params, falling back to the defaults before the first
/// [`set_params`] call.
pub fn load_params(storage: &dyn Storage) -> StdResult<Params> {
    Ok(may_load_item(storage, KEY_PARAMS)?.unwrap_or_default())
}

/// The only write path for params. Invalid params are rejected and the stored
/// value is left as it was.
pub fn set_params(storage: &mut dyn Storage, params: &Params) -> ForwardResult<()> {
    params.validate()?;
    save_item(storage, KEY_PARAMS, params)?;
    Ok(())
}
