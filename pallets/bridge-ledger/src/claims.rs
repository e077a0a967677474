//! Claim voting and the confirmation action of each claim kind.

use crate::{
	access::ValidatorTicket,
	fingerprint::Fingerprinted,
	queue::NewTransaction,
	types::*,
	BatchWindows, Config, ConfirmedSignedBatches, Error, Event, Pallet, TokenQuantity, LOG_TARGET,
};
use frame_support::pallet_prelude::*;
use sp_runtime::traits::Saturating;
use sp_std::{prelude::*, vec};

impl<T: Config> Pallet<T> {
	/// Whether `claim` reached quorum. Survives pruning through the claim's tombstone.
	pub fn is_refund_executed(claim: &RefundExecutedClaim) -> bool {
		Self::is_confirmed(&claim.fingerprint())
	}

	/// Votes `ticket`'s validator on every claim in `claims`.
	///
	/// The whole submission is checked before any vote is recorded, so a malformed claim
	/// leaves no trace of its siblings.
	pub(crate) fn do_submit_claims(
		ticket: &ValidatorTicket<T::AccountId>,
		claims: Vec<Claim>,
	) -> DispatchResult {
		ensure!(
			claims.len() as u32 <= T::MaxClaimsPerSubmission::get(),
			Error::<T>::TooManyClaims
		);
		for claim in claims.iter() {
			Self::validate_claim(claim)?;
		}

		for (index, claim) in claims.iter().enumerate() {
			Self::process_claim(ticket.account(), index as u32, claim);
		}
		Ok(())
	}

	fn validate_claim(claim: &Claim) -> Result<(), Error<T>> {
		match claim {
			Claim::BridgingRequest(brc) => {
				Self::ensure_chain_registered(brc.source_chain_id)?;
				Self::ensure_chain_registered(brc.destination_chain_id)?;
				ensure!(
					brc.source_chain_id != brc.destination_chain_id,
					Error::<T>::SameSourceAndDestination
				);
				ensure!(!brc.receivers.is_empty(), Error::<T>::EmptyReceivers);
			},
			Claim::BatchExecuted(BatchExecutedClaim { chain_id, .. }) |
			Claim::BatchExecutionFailed(BatchExecutionFailedClaim { chain_id, .. }) |
			Claim::RefundExecuted(RefundExecutedClaim { chain_id, .. }) |
			Claim::HotWalletIncrement(HotWalletIncrementClaim { chain_id, .. }) =>
				Self::ensure_chain_registered(*chain_id)?,
			Claim::RefundRequest(rrc) => {
				Self::ensure_chain_registered(rrc.origin_chain_id)?;
				ensure!(rrc.refund_tx_hash.is_none(), Error::<T>::RefundTxHashNotEmpty);
			},
		}
		Ok(())
	}

	fn process_claim(voter: &T::AccountId, index: u32, claim: &Claim) {
		let fingerprint = claim.fingerprint();
		if let Some(outcome) = Self::vote_skip_reason(&fingerprint, voter) {
			log::debug!(
				target: LOG_TARGET,
				"claim {} ({:?}) skipped: {:?}",
				index,
				claim.kind(),
				outcome
			);
			return;
		}

		if let Claim::BatchExecuted(BatchExecutedClaim { chain_id, batch_nonce_id, .. }) |
		Claim::BatchExecutionFailed(BatchExecutionFailedClaim { chain_id, batch_nonce_id, .. }) =
			claim
		{
			if !Self::batch_is_open(claim.kind(), index, *chain_id, *batch_nonce_id) {
				return;
			}
		}

		if Self::record_vote(VoteCategory::Claims, &fingerprint, voter) !=
			VoteOutcome::QuorumReached
		{
			return;
		}

		if Self::confirm_claim(index, claim) {
			log::info!(target: LOG_TARGET, "{:?} claim {:?} confirmed", claim.kind(), fingerprint);
			Self::deposit_event(Event::ClaimConfirmed { kind: claim.kind(), fingerprint });
		}
	}

	/// An executed / failed claim may only vote on a signed batch still waiting for its
	/// outcome. The first outcome to reach quorum closes the batch.
	fn batch_is_open(kind: ClaimKind, index: u32, chain_id: ChainId, batch_id: BatchId) -> bool {
		match ConfirmedSignedBatches::<T>::get(chain_id, batch_id) {
			None => {
				log::debug!(
					target: LOG_TARGET,
					"claim {} references unknown batch {} on chain {}",
					index,
					batch_id,
					chain_id
				);
				false
			},
			Some(batch) if batch.status != BatchStatus::Confirmed => {
				log::warn!(
					target: LOG_TARGET,
					"claim {} for closed batch {} on chain {} ({:?})",
					index,
					batch_id,
					chain_id,
					batch.status
				);
				Self::deposit_event(Event::BatchAlreadyClosed {
					claim_kind: kind,
					index,
					chain_id,
					batch_id,
				});
				false
			},
			Some(_) => true,
		}
	}

	/// Applies a claim that just reached quorum. Returns `false` when the claim was dropped
	/// for lack of funds.
	fn confirm_claim(index: u32, claim: &Claim) -> bool {
		match claim {
			Claim::BridgingRequest(brc) => Self::confirm_bridging_request(index, brc),
			Claim::BatchExecuted(bec) => {
				Self::close_batch(bec.chain_id, bec.batch_nonce_id, BatchStatus::Executed);
				Self::deposit_event(Event::BatchExecuted {
					chain_id: bec.chain_id,
					batch_id: bec.batch_nonce_id,
				});
				true
			},
			Claim::BatchExecutionFailed(befc) => {
				Self::close_batch(befc.chain_id, befc.batch_nonce_id, BatchStatus::Failed);
				Self::deposit_event(Event::BatchExecutionFailed {
					chain_id: befc.chain_id,
					batch_id: befc.batch_nonce_id,
				});
				true
			},
			Claim::RefundRequest(rrc) => Self::confirm_refund_request(index, rrc),
			Claim::RefundExecuted(rec) => {
				Self::deposit_event(Event::RefundExecuted {
					chain_id: rec.chain_id,
					refund_tx_hash: rec.refund_tx_hash,
				});
				true
			},
			Claim::HotWalletIncrement(hwic) => {
				Self::credit(hwic.chain_id, TokenClass::Native, hwic.amount);
				Self::deposit_event(Event::HotWalletIncremented {
					chain_id: hwic.chain_id,
					amount: hwic.amount,
				});
				true
			},
		}
	}

	fn confirm_bridging_request(index: u32, brc: &BridgingRequestClaim) -> bool {
		let requirements = Self::bridging_requirements(brc);
		if let Err((class, available)) = Self::try_debit_all(brc.source_chain_id, &requirements) {
			log::warn!(
				target: LOG_TARGET,
				"bridging request {} short of {:?} on chain {}: {} available",
				index,
				class,
				brc.source_chain_id,
				available
			);
			Self::deposit_event(Event::NotEnoughFunds {
				claim_kind: ClaimKind::BridgingRequest,
				index,
				available,
			});
			return false;
		}
		Self::credit_all(brc.destination_chain_id, &requirements);

		let nonce = Self::append_confirmed_transaction(
			brc.destination_chain_id,
			NewTransaction {
				kind: TransactionKind::Bridging,
				observed_tx_hash: brc.observed_tx_hash,
				source_chain_id: brc.source_chain_id,
				receivers: brc.receivers.clone(),
				total_amount: brc.total_amount,
				total_wrapped_amount: brc.total_wrapped_amount,
				retry_counter: brc.retry_counter,
			},
		);
		Self::deposit_event(Event::TransactionConfirmed {
			chain_id: brc.destination_chain_id,
			nonce,
		});
		true
	}

	fn confirm_refund_request(index: u32, rrc: &RefundRequestClaim) -> bool {
		let chain_id = rrc.origin_chain_id;
		if rrc.should_decrement_hot_wallet &&
			!Self::try_debit(chain_id, TokenClass::Native, rrc.origin_amount)
		{
			let available = TokenQuantity::<T>::get(chain_id, TokenClass::Native);
			log::warn!(
				target: LOG_TARGET,
				"refund request {} short on chain {}: {} available",
				index,
				chain_id,
				available
			);
			Self::deposit_event(Event::NotEnoughFunds {
				claim_kind: ClaimKind::RefundRequest,
				index,
				available,
			});
			return false;
		}

		let receiver = Receiver {
			amount: rrc.origin_amount,
			dest_address: rrc.origin_sender_address.clone(),
			wrapped_amount: 0,
			colored_coin: None,
		};
		let nonce = Self::append_confirmed_transaction(
			chain_id,
			NewTransaction {
				kind: TransactionKind::Refund { output_indexes: rrc.output_indexes.clone() },
				observed_tx_hash: rrc.origin_tx_hash,
				source_chain_id: chain_id,
				receivers: BoundedVec::truncate_from(vec![receiver]),
				total_amount: rrc.origin_amount,
				total_wrapped_amount: 0,
				retry_counter: rrc.retry_counter,
			},
		);
		Self::deposit_event(Event::TransactionConfirmed { chain_id, nonce });
		true
	}

	/// Records the outcome of the in-flight batch and reopens the window.
	///
	/// An executed transfer batch moves the window past its range. A failed one leaves the
	/// range unbatched and makes it batchable again right away.
	fn close_batch(chain_id: ChainId, batch_id: BatchId, status: BatchStatus) {
		let Some(batch) = ConfirmedSignedBatches::<T>::mutate(chain_id, batch_id, |maybe_batch| {
			maybe_batch.as_mut().map(|batch| {
				batch.status = status;
				batch.proposal.clone()
			})
		}) else {
			return;
		};

		let now = frame_system::Pallet::<T>::block_number();
		BatchWindows::<T>::mutate(chain_id, |window| {
			if window.in_flight_batch == Some(batch_id) {
				window.in_flight_batch = None;
				window.current_batch_block = None;
			}
			if batch.is_consolidation {
				return;
			}
			match status {
				BatchStatus::Executed => {
					window.last_batched_tx_nonce =
						window.last_batched_tx_nonce.max(batch.last_tx_nonce_id);
					if window.unbatched_count() > 0 && window.next_timeout_block.is_none() {
						window.next_timeout_block =
							Some(now.saturating_add(T::TimeoutBlocksNumber::get()));
					}
				},
				BatchStatus::Failed => window.next_timeout_block = Some(now),
				BatchStatus::Confirmed => {},
			}
		});
		log::info!(
			target: LOG_TARGET,
			"batch {} on chain {} closed as {:?}",
			batch_id,
			chain_id,
			status
		);
	}
}
