use crate::{
	access::ValidatorTicket, fingerprint, types::*, Config, Error, Event, LastObservedBlock, Pallet,
	LOG_TARGET,
};
use frame_support::pallet_prelude::*;
use sp_std::prelude::*;

impl<T: Config> Pallet<T> {
	/// Votes on observed blocks of `chain_id`. A block that reaches quorum only becomes the
	/// chain's last observed block when its slot is strictly newer.
	pub(crate) fn do_submit_last_observed_blocks(
		ticket: &ValidatorTicket<T::AccountId>,
		chain_id: ChainId,
		blocks: Vec<ObservedBlock>,
	) -> DispatchResult {
		ensure!(
			blocks.len() as u32 <= T::MaxBlocksPerSubmission::get(),
			Error::<T>::TooManyBlocks
		);
		Self::ensure_chain_registered(chain_id)?;

		for block in blocks {
			let fingerprint = fingerprint::slot(chain_id, &block);
			if Self::record_vote(VoteCategory::Slots, &fingerprint, ticket.account()) !=
				VoteOutcome::QuorumReached
			{
				continue;
			}

			let current = LastObservedBlock::<T>::get(chain_id);
			if current.map_or(false, |current| block.slot <= current.slot) {
				log::debug!(
					target: LOG_TARGET,
					"slot {} on chain {} reached quorum but is not newer",
					block.slot,
					chain_id
				);
				continue;
			}
			LastObservedBlock::<T>::insert(chain_id, block);
			Self::deposit_event(Event::LastObservedBlockUpdated { chain_id, block });
		}
		Ok(())
	}
}
