//! Signed batch proposals and their promotion to confirmed signed batches.

use crate::{
	access::ValidatorTicket,
	fingerprint::Fingerprinted,
	types::*,
	BatchSignatures, BatchWindows, Chains, Config, ConfirmedSignedBatches, Error, Event,
	LastConfirmedBatchId, Pallet, PendingBatches, ValidatorChainData, ValidatorSetState,
	Validators, LOG_TARGET,
};
use frame_support::pallet_prelude::*;
use frame_system::pallet_prelude::BlockNumberFor;
use sp_std::prelude::*;

impl<T: Config> Pallet<T> {
	pub fn confirmed_signed_batch(
		chain_id: ChainId,
		batch_id: BatchId,
	) -> Option<ConfirmedSignedBatch<T::AccountId, BlockNumberFor<T>>> {
		ConfirmedSignedBatches::<T>::get(chain_id, batch_id)
	}

	/// Validator expected to build the next batch of `chain_id`. Rotates with every confirmed
	/// batch; nothing enforces it.
	pub fn next_batch_proposer(chain_id: ChainId) -> Option<T::AccountId> {
		let validators = Validators::<T>::get();
		if validators.is_empty() {
			return None;
		}
		let next_id = LastConfirmedBatchId::<T>::get(chain_id).saturating_add(1);
		let slot = next_id.saturating_add(chain_id as u64) % validators.len() as u64;
		validators.get(slot as usize).cloned()
	}

	/// Records `ticket`'s signature over `proposal`.
	///
	/// A proposal that no longer matches the chain's window (wrong id, already covered
	/// range) is dropped without error.
	pub(crate) fn do_submit_signed_batch(
		ticket: &ValidatorTicket<T::AccountId>,
		proposal: BatchProposal,
		signature: BatchSignature,
	) -> DispatchResult {
		let chain_id = proposal.destination_chain_id;
		let chain = Chains::<T>::get(chain_id).ok_or(Error::<T>::ChainNotRegistered)?;
		let who = ticket.account();

		let fingerprint = proposal.fingerprint();
		if let Some(outcome) = Self::vote_skip_reason(&fingerprint, who) {
			log::debug!(target: LOG_TARGET, "batch {:?} skipped: {:?}", fingerprint, outcome);
			return Ok(());
		}

		let expected_id = LastConfirmedBatchId::<T>::get(chain_id).saturating_add(1);
		if proposal.id != expected_id {
			log::debug!(
				target: LOG_TARGET,
				"stale batch {} on chain {}, expected {}",
				proposal.id,
				chain_id,
				expected_id
			);
			return Ok(());
		}

		let window = BatchWindows::<T>::get(chain_id);
		ensure!(window.in_flight_batch.is_none(), Error::<T>::BatchAlreadyInFlight);

		if proposal.is_consolidation {
			ensure!(
				proposal.first_tx_nonce_id == 0 && proposal.last_tx_nonce_id == 0,
				Error::<T>::InvalidConsolidationRange
			);
			ensure!(
				!ValidatorSetState::<T>::get().is_pending(),
				Error::<T>::ValidatorSetUpdateInProgress
			);
		} else {
			ensure!(Self::should_create_batch(chain_id), Error::<T>::CannotCreateBatchYet);
			let window_end = Self::batch_window_end(chain_id, &window);
			if proposal.first_tx_nonce_id != window.last_batched_tx_nonce.saturating_add(1) ||
				proposal.last_tx_nonce_id < proposal.first_tx_nonce_id ||
				proposal.last_tx_nonce_id > window_end
			{
				log::debug!(
					target: LOG_TARGET,
					"batch {} range [{}, {}] does not match window of chain {}",
					proposal.id,
					proposal.first_tx_nonce_id,
					proposal.last_tx_nonce_id,
					chain_id
				);
				return Ok(());
			}
		}

		let key = ValidatorChainData::<T>::get(chain_id, who)
			.ok_or(Error::<T>::MissingValidatorKey)?;
		let message = proposal.payload_hash();
		ensure!(
			T::SignatureVerifier::verify(chain.chain_type, &key, &message, &signature),
			Error::<T>::InvalidSignature
		);

		if !PendingBatches::<T>::contains_key(fingerprint) {
			PendingBatches::<T>::insert(fingerprint, &proposal);
		}
		BatchSignatures::<T>::insert(fingerprint, who, signature);

		if Self::record_vote(VoteCategory::SignedBatches, &fingerprint, who) ==
			VoteOutcome::QuorumReached
		{
			Self::promote_batch(&fingerprint, proposal);
		}
		Ok(())
	}

	/// Moves a proposal that reached signature quorum into the confirmed set and marks it as
	/// the chain's in-flight batch.
	fn promote_batch(fingerprint: &Fingerprint, proposal: BatchProposal) {
		let now = frame_system::Pallet::<T>::block_number();
		let chain_id = proposal.destination_chain_id;
		let batch_id = proposal.id;

		let signatures: Vec<_> = BatchSignatures::<T>::drain_prefix(fingerprint).collect();
		PendingBatches::<T>::remove(fingerprint);

		BatchWindows::<T>::mutate(chain_id, |window| {
			window.in_flight_batch = Some(batch_id);
			window.current_batch_block = Some(now);
			if !proposal.is_consolidation {
				window.next_timeout_block = None;
			}
		});
		LastConfirmedBatchId::<T>::insert(chain_id, batch_id);
		ConfirmedSignedBatches::<T>::insert(
			chain_id,
			batch_id,
			ConfirmedSignedBatch {
				proposal,
				signatures,
				status: BatchStatus::Confirmed,
				confirmed_at: now,
			},
		);

		log::info!(target: LOG_TARGET, "batch {} on chain {} confirmed", batch_id, chain_id);
		Self::deposit_event(Event::SignedBatchConfirmed { chain_id, batch_id });
	}
}
