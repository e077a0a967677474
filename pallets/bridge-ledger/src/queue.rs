//! Confirmed transaction queue and the batch window of each destination chain.

use crate::{
	access::AdminTicket,
	types::*,
	AmountsRescaled, BatchWindows, Chains, Config, ConfirmedSignedBatches, ConfirmedTransactions,
	Error, Event, Pallet, ValidatorSetState, LOG_TARGET,
};
use frame_support::pallet_prelude::*;
use frame_system::pallet_prelude::BlockNumberFor;
use sp_runtime::traits::Saturating;
use sp_std::{prelude::*, vec};

/// Queue entry before a nonce is assigned.
pub(crate) struct NewTransaction {
	pub kind: TransactionKind,
	pub observed_tx_hash: TxHash,
	pub source_chain_id: ChainId,
	pub receivers: Receivers,
	pub total_amount: Amount,
	pub total_wrapped_amount: Amount,
	pub retry_counter: u32,
}

impl NewTransaction {
	fn administrative(kind: TransactionKind, chain_id: ChainId) -> Self {
		NewTransaction {
			kind,
			observed_tx_hash: TxHash::zero(),
			source_chain_id: chain_id,
			receivers: Default::default(),
			total_amount: 0,
			total_wrapped_amount: 0,
			retry_counter: 0,
		}
	}
}

impl<T: Config> Pallet<T> {
	pub fn batch_window(chain_id: ChainId) -> BatchWindow<BlockNumberFor<T>> {
		BatchWindows::<T>::get(chain_id)
	}

	pub fn confirmed_transaction(
		chain_id: ChainId,
		nonce: Nonce,
	) -> Option<ConfirmedTransaction<BlockNumberFor<T>>> {
		ConfirmedTransactions::<T>::get(chain_id, nonce)
	}

	pub(crate) fn ensure_chain_registered(chain_id: ChainId) -> Result<(), Error<T>> {
		ensure!(Chains::<T>::contains_key(chain_id), Error::<T>::ChainNotRegistered);
		Ok(())
	}

	/// Assigns the next nonce of `chain_id` and arms the batch timeout if none is running.
	pub(crate) fn append_confirmed_transaction(chain_id: ChainId, tx: NewTransaction) -> Nonce {
		let now = frame_system::Pallet::<T>::block_number();
		let nonce = BatchWindows::<T>::mutate(chain_id, |window| {
			window.last_confirmed_tx_nonce = window.last_confirmed_tx_nonce.saturating_add(1);
			if window.next_timeout_block.is_none() {
				window.next_timeout_block = Some(now.saturating_add(T::TimeoutBlocksNumber::get()));
			}
			window.last_confirmed_tx_nonce
		});

		ConfirmedTransactions::<T>::insert(
			chain_id,
			nonce,
			ConfirmedTransaction {
				nonce,
				kind: tx.kind,
				observed_tx_hash: tx.observed_tx_hash,
				source_chain_id: tx.source_chain_id,
				receivers: tx.receivers,
				total_amount: tx.total_amount,
				total_wrapped_amount: tx.total_wrapped_amount,
				retry_counter: tx.retry_counter,
				block_height: now,
			},
		);
		log::debug!(target: LOG_TARGET, "chain {} queued transaction {}", chain_id, nonce);
		nonce
	}

	/// Whether a transfer batch may be proposed for `chain_id` now.
	pub fn should_create_batch(chain_id: ChainId) -> bool {
		if !Chains::<T>::contains_key(chain_id) || ValidatorSetState::<T>::get().is_pending() {
			return false;
		}
		let window = BatchWindows::<T>::get(chain_id);
		if window.in_flight_batch.is_some() || window.unbatched_count() == 0 {
			return false;
		}
		let now = frame_system::Pallet::<T>::block_number();
		window.unbatched_count() >= T::MaxNumberOfTransactions::get() as u64 ||
			window.next_timeout_block.map_or(false, |timeout| now >= timeout)
	}

	/// Last nonce the next transfer batch may cover. Exclusive entries are never mixed with
	/// anything else.
	pub(crate) fn batch_window_end(
		chain_id: ChainId,
		window: &BatchWindow<BlockNumberFor<T>>,
	) -> Nonce {
		let start = window.last_batched_tx_nonce.saturating_add(1);
		let cap = window.last_confirmed_tx_nonce.min(
			window.last_batched_tx_nonce.saturating_add(T::MaxNumberOfTransactions::get() as u64),
		);
		let is_exclusive = |nonce: Nonce| {
			ConfirmedTransactions::<T>::get(chain_id, nonce)
				.map_or(false, |tx| tx.kind.is_exclusive())
		};

		if is_exclusive(start) {
			return start;
		}
		let mut end = start;
		while end < cap && !is_exclusive(end + 1) {
			end += 1;
		}
		end
	}

	/// The unbatched window a batch proposal must be built from.
	pub fn get_confirmed_transactions(
		chain_id: ChainId,
	) -> Result<Vec<ConfirmedTransaction<BlockNumberFor<T>>>, Error<T>> {
		Self::ensure_chain_registered(chain_id)?;
		ensure!(Self::should_create_batch(chain_id), Error::<T>::CannotCreateBatchYet);

		let window = BatchWindows::<T>::get(chain_id);
		let end = Self::batch_window_end(chain_id, &window);
		Ok((window.last_batched_tx_nonce.saturating_add(1)..=end)
			.filter_map(|nonce| ConfirmedTransactions::<T>::get(chain_id, nonce))
			.collect())
	}

	pub(crate) fn do_defund(
		_admin: &AdminTicket,
		chain_id: ChainId,
		token_class: TokenClass,
		amount: Amount,
		address: Address,
	) -> DispatchResult {
		Self::ensure_chain_registered(chain_id)?;
		ensure!(Self::try_debit(chain_id, token_class, amount), Error::<T>::DefundExceedsLiquidity);

		let mut receiver =
			Receiver { amount: 0, dest_address: address, wrapped_amount: 0, colored_coin: None };
		let (mut total_amount, mut total_wrapped_amount) = (0, 0);
		match token_class {
			TokenClass::Native => {
				receiver.amount = amount;
				total_amount = amount;
			},
			TokenClass::Wrapped => {
				receiver.wrapped_amount = amount;
				total_wrapped_amount = amount;
			},
			TokenClass::Colored(coin_id) =>
				receiver.colored_coin = Some(ColoredCoinAmount { coin_id, amount }),
		}

		Self::append_confirmed_transaction(
			chain_id,
			NewTransaction {
				receivers: BoundedVec::truncate_from(vec![receiver]),
				total_amount,
				total_wrapped_amount,
				..NewTransaction::administrative(TransactionKind::Defund { token_class }, chain_id)
			},
		);
		log::info!(
			target: LOG_TARGET,
			"chain {} defunded {} of {:?}",
			chain_id,
			amount,
			token_class
		);
		Self::deposit_event(Event::ChainDefunded { chain_id, token_class, amount });
		Ok(())
	}

	pub(crate) fn do_redistribute_tokens(
		_admin: &AdminTicket,
		chain_id: ChainId,
	) -> DispatchResult {
		Self::ensure_chain_registered(chain_id)?;
		let nonce = Self::append_confirmed_transaction(
			chain_id,
			NewTransaction::administrative(TransactionKind::Redistribution, chain_id),
		);
		Self::deposit_event(Event::RedistributionRequested { chain_id, nonce });
		Ok(())
	}

	pub(crate) fn do_stake_operation(
		_admin: &AdminTicket,
		chain_id: ChainId,
		operation: StakeOperation,
		pool_id: PoolId,
	) -> DispatchResult {
		Self::ensure_chain_registered(chain_id)?;
		let nonce = Self::append_confirmed_transaction(
			chain_id,
			NewTransaction::administrative(
				TransactionKind::StakeOperation { operation, pool_id },
				chain_id,
			),
		);
		Self::deposit_event(Event::StakeOperationRequested { chain_id, nonce, operation });
		Ok(())
	}

	/// Multiplies every amount, colored coins included, of the transactions not yet covered by
	/// a batch. Allowed once per chain, over at most `MaxRecordsPerCall` transactions.
	pub(crate) fn do_rescale_unbatched_amounts(
		_admin: &AdminTicket,
		chain_id: ChainId,
		factor: u32,
	) -> DispatchResult {
		Self::ensure_chain_registered(chain_id)?;
		ensure!(factor > 0, Error::<T>::InvalidScaleFactor);
		ensure!(!AmountsRescaled::<T>::get(chain_id), Error::<T>::AmountsAlreadyRescaled);

		let window = BatchWindows::<T>::get(chain_id);
		let in_flight_end = window
			.in_flight_batch
			.and_then(|batch_id| ConfirmedSignedBatches::<T>::get(chain_id, batch_id))
			.filter(|batch| !batch.proposal.is_consolidation)
			.map_or(0, |batch| batch.proposal.last_tx_nonce_id);
		let first = window.last_batched_tx_nonce.max(in_flight_end).saturating_add(1);
		Self::ensure_within_call_limit(
			window.last_confirmed_tx_nonce.saturating_add(1).saturating_sub(first),
		)?;

		let multiplier = Amount::from(factor);
		let mut rescaled = 0u32;
		for nonce in first..=window.last_confirmed_tx_nonce {
			ConfirmedTransactions::<T>::try_mutate_exists(chain_id, nonce, |maybe_tx| {
				let Some(tx) = maybe_tx else { return Ok(()) };
				let scale = |amount: Amount| {
					amount.checked_mul(multiplier).ok_or(Error::<T>::AmountOverflow)
				};
				tx.total_amount = scale(tx.total_amount)?;
				tx.total_wrapped_amount = scale(tx.total_wrapped_amount)?;
				let mut receivers = sp_std::mem::take(&mut tx.receivers).into_inner();
				for receiver in receivers.iter_mut() {
					receiver.amount = scale(receiver.amount)?;
					receiver.wrapped_amount = scale(receiver.wrapped_amount)?;
					if let Some(colored) = receiver.colored_coin.as_mut() {
						colored.amount = scale(colored.amount)?;
					}
				}
				tx.receivers = BoundedVec::truncate_from(receivers);
				rescaled += 1;
				Ok::<_, Error<T>>(())
			})?;
		}

		AmountsRescaled::<T>::insert(chain_id, true);
		log::info!(
			target: LOG_TARGET,
			"chain {} rescaled {} unbatched transactions by {}",
			chain_id,
			rescaled,
			factor
		);
		Self::deposit_event(Event::AmountsRescaledDone { chain_id, factor, rescaled });
		Ok(())
	}
}
