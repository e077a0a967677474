//! Capability tokens guarding the ledger's internal entry points.
//!
//! Component functions that mutate ledger state take one of these by reference. They can
//! only be minted here, after the origin check for the matching role succeeded.

use crate::{Config, Error, Pallet, Validators};
use frame_support::{ensure, traits::EnsureOrigin};
use frame_system::{ensure_signed, pallet_prelude::OriginFor};
use sp_runtime::DispatchError;

/// Proof that the caller is a member of the current validator set.
pub struct ValidatorTicket<AccountId> {
	account: AccountId,
}

impl<AccountId> ValidatorTicket<AccountId> {
	pub fn account(&self) -> &AccountId {
		&self.account
	}
}

/// Proof that the call came through `Config::AdminOrigin`.
pub struct AdminTicket {
	_private: (),
}

impl<T: Config> Pallet<T> {
	pub fn ensure_validator(
		origin: OriginFor<T>,
	) -> Result<ValidatorTicket<T::AccountId>, DispatchError> {
		let who = ensure_signed(origin)?;
		Self::ensure_is_validator(&who)?;
		Ok(ValidatorTicket { account: who })
	}

	pub fn ensure_admin(origin: OriginFor<T>) -> Result<AdminTicket, DispatchError> {
		T::AdminOrigin::ensure_origin(origin)?;
		Ok(AdminTicket { _private: () })
	}

	pub fn ensure_is_validator(who: &T::AccountId) -> Result<(), Error<T>> {
		ensure!(Validators::<T>::get().contains(who), Error::<T>::NotValidator);
		Ok(())
	}
}
