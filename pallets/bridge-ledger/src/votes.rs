//! Vote ledger shared by claims, batch signatures, slots and governance.

use crate::{
	Config, NextVoteIndex, Pallet, Validators, VoteIndex, Votes, LOG_TARGET,
	types::{Fingerprint, VoteCategory, VoteOutcome, VoteRecord},
};
use sp_std::collections::btree_set::BTreeSet;

impl<T: Config> Pallet<T> {
	/// Strictly more than two thirds of the current validator set.
	pub fn quorum_count() -> u32 {
		let validators = Validators::<T>::decode_len().unwrap_or(0) as u32;
		validators * 2 / 3 + 1
	}

	pub fn is_confirmed(fingerprint: &Fingerprint) -> bool {
		Votes::<T>::get(fingerprint).map_or(false, |record| record.quorum_reached_at.is_some())
	}

	pub fn has_voted(fingerprint: &Fingerprint, who: &T::AccountId) -> bool {
		Votes::<T>::get(fingerprint).map_or(false, |record| record.voters.contains(who))
	}

	pub fn vote_count(fingerprint: &Fingerprint) -> u32 {
		Votes::<T>::get(fingerprint).map_or(0, |record| record.voters.len() as u32)
	}

	/// Why a vote by `who` would be a no-op, if it would be.
	pub(crate) fn vote_skip_reason(
		fingerprint: &Fingerprint,
		who: &T::AccountId,
	) -> Option<VoteOutcome> {
		let record = Votes::<T>::get(fingerprint)?;
		if record.quorum_reached_at.is_some() {
			Some(VoteOutcome::AlreadyConfirmed)
		} else if record.voters.contains(who) {
			Some(VoteOutcome::AlreadyVoted)
		} else {
			None
		}
	}

	pub(crate) fn record_vote(
		category: VoteCategory,
		fingerprint: &Fingerprint,
		voter: &T::AccountId,
	) -> VoteOutcome {
		Self::record_vote_with_threshold(category, fingerprint, voter, Self::quorum_count())
	}

	/// Adds `voter` to the record of `fingerprint`. `QuorumReached` is returned to exactly one
	/// caller per record, the one whose vote brought the count to `threshold`.
	pub(crate) fn record_vote_with_threshold(
		category: VoteCategory,
		fingerprint: &Fingerprint,
		voter: &T::AccountId,
		threshold: u32,
	) -> VoteOutcome {
		if let Some(outcome) = Self::vote_skip_reason(fingerprint, voter) {
			log::debug!(
				target: LOG_TARGET,
				"vote on {:?} by {:?} skipped: {:?}",
				fingerprint,
				voter,
				outcome
			);
			return outcome;
		}

		let now = frame_system::Pallet::<T>::block_number();
		let mut record = match Votes::<T>::get(fingerprint) {
			Some(record) => record,
			None => {
				Self::index_vote_record(category, fingerprint);
				VoteRecord { voters: BTreeSet::new(), recorded_at: now, quorum_reached_at: None }
			},
		};
		record.voters.insert(voter.clone());

		let outcome = if record.voters.len() as u32 >= threshold {
			record.quorum_reached_at = Some(now);
			VoteOutcome::QuorumReached
		} else {
			VoteOutcome::Recorded
		};
		Votes::<T>::insert(fingerprint, record);
		outcome
	}

	fn index_vote_record(category: VoteCategory, fingerprint: &Fingerprint) {
		let now = frame_system::Pallet::<T>::block_number();
		let index = NextVoteIndex::<T>::get(category);
		VoteIndex::<T>::insert(category, index, (*fingerprint, now));
		NextVoteIndex::<T>::insert(category, index.saturating_add(1));
	}
}
