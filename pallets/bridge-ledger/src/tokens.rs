//! Per-chain liquidity accounting.
//!
//! Counters never go negative: a debit either covers every requested class or changes
//! nothing.

use crate::{
	Config, Pallet, TokenQuantity,
	types::{Amount, BridgingRequestClaim, ChainId, TokenClass},
};
use sp_std::{collections::btree_map::BTreeMap, prelude::*};

/// Amount required per token class, duplicates merged.
pub type Requirements = BTreeMap<TokenClass, Amount>;

impl<T: Config> Pallet<T> {
	pub fn token_quantity(chain_id: ChainId, class: TokenClass) -> Amount {
		TokenQuantity::<T>::get(chain_id, class)
	}

	pub(crate) fn credit(chain_id: ChainId, class: TokenClass, amount: Amount) {
		if amount == 0 {
			return;
		}
		TokenQuantity::<T>::mutate(chain_id, class, |quantity| {
			*quantity = quantity.saturating_add(amount)
		});
	}

	pub(crate) fn try_debit(chain_id: ChainId, class: TokenClass, amount: Amount) -> bool {
		TokenQuantity::<T>::try_mutate(chain_id, class, |quantity| -> Result<(), ()> {
			*quantity = quantity.checked_sub(amount).ok_or(())?;
			Ok(())
		})
		.is_ok()
	}

	/// Debits every class or none. On shortage returns the first short class and what the
	/// chain holds of it.
	pub(crate) fn try_debit_all(
		chain_id: ChainId,
		requirements: &Requirements,
	) -> Result<(), (TokenClass, Amount)> {
		for (class, amount) in requirements {
			let available = TokenQuantity::<T>::get(chain_id, class);
			if available < *amount {
				return Err((*class, available));
			}
		}
		for (class, amount) in requirements {
			TokenQuantity::<T>::mutate(chain_id, class, |quantity| *quantity -= *amount);
		}
		Ok(())
	}

	pub(crate) fn credit_all(chain_id: ChainId, requirements: &Requirements) {
		for (class, amount) in requirements {
			Self::credit(chain_id, *class, *amount);
		}
	}

	/// Native and wrapped totals come from the claim, colored coins from its receivers.
	pub(crate) fn bridging_requirements(claim: &BridgingRequestClaim) -> Requirements {
		let mut requirements = Requirements::new();
		let mut add = |class: TokenClass, amount: Amount| {
			if amount > 0 {
				let entry = requirements.entry(class).or_insert(0);
				*entry = entry.saturating_add(amount);
			}
		};
		add(TokenClass::Native, claim.total_amount);
		add(TokenClass::Wrapped, claim.total_wrapped_amount);
		for receiver in claim.receivers.iter() {
			if let Some(colored) = &receiver.colored_coin {
				add(TokenClass::Colored(colored.coin_id), colored.amount);
			}
		}
		requirements
	}
}
