//! Bounded removal of aged vote records, confirmed signed batches and confirmed transactions.
//!
//! Every prune advances a per-category (or per-chain) watermark. Pruning the same prefix twice
//! fails with `AlreadyPruned`.

use crate::{
	access::AdminTicket,
	types::*,
	BatchSignatures, BatchWindows, Config, ConfirmedSignedBatches, ConfirmedTransactions, Error,
	Event, LastConfirmedBatchId, LastPrunedBatchId, LastPrunedTxNonce, NextUnprunedVoteIndex,
	NextVoteIndex, Pallet, PendingBatches, PendingChainKeys, ValidatorSetState, VoteIndex, Votes,
	LOG_TARGET,
};
use frame_support::pallet_prelude::*;
use frame_system::pallet_prelude::BlockNumberFor;
use sp_runtime::traits::Saturating;

impl<T: Config> Pallet<T> {
	/// Prunes the vote records of `category` indexed up to and including `up_to_index`.
	///
	/// Records that reached quorum keep their quorum mark so the same fingerprint can never
	/// be confirmed again. Governance records also drop the key material collected for an
	/// unfinished chain registration.
	pub(crate) fn do_prune_votes(
		_admin: &AdminTicket,
		category: VoteCategory,
		up_to_index: u64,
		ttl: BlockNumberFor<T>,
	) -> DispatchResult {
		ensure!(ttl >= T::MinClaimBlockAge::get(), Error::<T>::TtlBelowMinimum);
		let first = NextUnprunedVoteIndex::<T>::get(category);
		ensure!(up_to_index >= first, Error::<T>::AlreadyPruned);
		ensure!(up_to_index < NextVoteIndex::<T>::get(category), Error::<T>::InvalidPruneBoundary);
		Self::ensure_within_call_limit(up_to_index - first + 1)?;

		let (_, recorded_at) =
			VoteIndex::<T>::get(category, up_to_index).ok_or(Error::<T>::InvalidPruneBoundary)?;
		let now = frame_system::Pallet::<T>::block_number();
		ensure!(recorded_at.saturating_add(ttl) <= now, Error::<T>::PruneBoundaryTooRecent);

		if category == VoteCategory::Governance {
			ensure!(
				!ValidatorSetState::<T>::get().is_pending(),
				Error::<T>::PruneBoundaryProtected
			);
		}
		if category == VoteCategory::SignedBatches {
			for index in first..=up_to_index {
				let Some((fingerprint, _)) = VoteIndex::<T>::get(category, index) else { continue };
				if let Some(proposal) = PendingBatches::<T>::get(fingerprint) {
					let chain_id = proposal.destination_chain_id;
					let last_confirmed = LastConfirmedBatchId::<T>::get(chain_id);
					ensure!(proposal.id <= last_confirmed, Error::<T>::PruneBoundaryProtected);
				}
			}
		}

		for index in first..=up_to_index {
			let Some((fingerprint, _)) = VoteIndex::<T>::take(category, index) else { continue };
			match category {
				VoteCategory::SignedBatches => {
					let _ = BatchSignatures::<T>::clear_prefix(fingerprint, u32::MAX, None);
					PendingBatches::<T>::remove(fingerprint);
				},
				VoteCategory::Governance => {
					let _ = PendingChainKeys::<T>::clear_prefix(fingerprint, u32::MAX, None);
				},
				VoteCategory::Claims | VoteCategory::Slots => {},
			}
			Votes::<T>::mutate_exists(fingerprint, |maybe_record| {
				let confirmed = maybe_record
					.as_ref()
					.map_or(false, |record| record.quorum_reached_at.is_some());
				if !confirmed {
					*maybe_record = None;
				} else if let Some(record) = maybe_record {
					record.voters.clear();
				}
			});
		}

		NextUnprunedVoteIndex::<T>::insert(category, up_to_index.saturating_add(1));
		log::info!(target: LOG_TARGET, "{:?} votes pruned up to {}", category, up_to_index);
		Self::deposit_event(Event::VotesPruned { category, up_to: up_to_index });
		Ok(())
	}

	/// Removes confirmed signed batches up to `up_to_batch_id`, always keeping the most recent
	/// `MinNumberOfSignedBatches` and the in-flight batch. The boundary batch must have been
	/// confirmed at least `MinClaimBlockAge` blocks ago.
	pub(crate) fn do_prune_confirmed_signed_batches(
		_admin: &AdminTicket,
		chain_id: ChainId,
		up_to_batch_id: BatchId,
	) -> DispatchResult {
		Self::ensure_chain_registered(chain_id)?;
		let last_pruned = LastPrunedBatchId::<T>::get(chain_id);
		ensure!(up_to_batch_id > last_pruned, Error::<T>::AlreadyPruned);
		Self::ensure_within_call_limit(up_to_batch_id - last_pruned)?;
		ensure!(
			up_to_batch_id.saturating_add(T::MinNumberOfSignedBatches::get()) <=
				LastConfirmedBatchId::<T>::get(chain_id),
			Error::<T>::PruneBoundaryProtected
		);
		ensure!(
			BatchWindows::<T>::get(chain_id)
				.in_flight_batch
				.map_or(true, |batch_id| batch_id > up_to_batch_id),
			Error::<T>::PruneBoundaryProtected
		);
		let boundary = ConfirmedSignedBatches::<T>::get(chain_id, up_to_batch_id)
			.ok_or(Error::<T>::InvalidPruneBoundary)?;
		let now = frame_system::Pallet::<T>::block_number();
		ensure!(
			boundary.confirmed_at.saturating_add(T::MinClaimBlockAge::get()) <= now,
			Error::<T>::PruneBoundaryTooRecent
		);

		for batch_id in last_pruned.saturating_add(1)..=up_to_batch_id {
			ConfirmedSignedBatches::<T>::remove(chain_id, batch_id);
		}
		LastPrunedBatchId::<T>::insert(chain_id, up_to_batch_id);
		log::info!(
			target: LOG_TARGET,
			"chain {} confirmed signed batches pruned up to {}",
			chain_id,
			up_to_batch_id
		);
		Self::deposit_event(Event::ConfirmedSignedBatchesPruned {
			chain_id,
			up_to: up_to_batch_id,
		});
		Ok(())
	}

	/// Removes confirmed transactions up to `up_to_nonce`. Only batched transactions older than
	/// `MinClaimBlockAge` may go.
	pub(crate) fn do_prune_confirmed_transactions(
		_admin: &AdminTicket,
		chain_id: ChainId,
		up_to_nonce: Nonce,
	) -> DispatchResult {
		Self::ensure_chain_registered(chain_id)?;
		let last_pruned = LastPrunedTxNonce::<T>::get(chain_id);
		ensure!(up_to_nonce > last_pruned, Error::<T>::AlreadyPruned);
		Self::ensure_within_call_limit(up_to_nonce - last_pruned)?;
		ensure!(
			up_to_nonce <= BatchWindows::<T>::get(chain_id).last_batched_tx_nonce,
			Error::<T>::PruneBoundaryProtected
		);
		let boundary = ConfirmedTransactions::<T>::get(chain_id, up_to_nonce)
			.ok_or(Error::<T>::InvalidPruneBoundary)?;
		let now = frame_system::Pallet::<T>::block_number();
		ensure!(
			boundary.block_height.saturating_add(T::MinClaimBlockAge::get()) <= now,
			Error::<T>::PruneBoundaryTooRecent
		);

		for nonce in last_pruned.saturating_add(1)..=up_to_nonce {
			ConfirmedTransactions::<T>::remove(chain_id, nonce);
		}
		LastPrunedTxNonce::<T>::insert(chain_id, up_to_nonce);
		log::info!(
			target: LOG_TARGET,
			"chain {} confirmed transactions pruned up to {}",
			chain_id,
			up_to_nonce
		);
		Self::deposit_event(Event::ConfirmedTransactionsPruned { chain_id, up_to: up_to_nonce });
		Ok(())
	}

	/// Fails with `RangeTooLarge` when `records` exceeds `MaxRecordsPerCall`.
	pub(crate) fn ensure_within_call_limit(records: u64) -> DispatchResult {
		ensure!(records <= u64::from(T::MaxRecordsPerCall::get()), Error::<T>::RangeTooLarge);
		Ok(())
	}
}
