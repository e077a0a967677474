//! Validator registry: chain registration and two-phase validator set replacement.

use crate::{
	access::{AdminTicket, ValidatorTicket},
	fingerprint,
	types::*,
	BatchWindows, ChainIds, Chains, Config, Error, Event, Pallet, PendingChainKeys,
	ValidatorChainData, ValidatorSetId, ValidatorSetState, Validators, LOG_TARGET,
};
use codec::Decode;
use frame_support::pallet_prelude::*;
use frame_system::pallet_prelude::BlockNumberFor;
use sp_runtime::traits::TrailingZeroInput;
use sp_std::{collections::btree_set::BTreeSet, prelude::*};

impl<T: Config> Pallet<T> {
	pub fn registered_chains() -> Vec<ChainInfo> {
		ChainIds::<T>::get().into_iter().filter_map(|chain_id| Chains::<T>::get(chain_id)).collect()
	}

	pub fn validator_set_state() -> ValidatorSetStatus<T::AccountId, BlockNumberFor<T>> {
		ValidatorSetState::<T>::get()
	}

	fn ensure_chain_can_register(chain_id: ChainId) -> Result<(), Error<T>> {
		ensure!(
			!ValidatorSetState::<T>::get().is_pending(),
			Error::<T>::ValidatorSetUpdateInProgress
		);
		ensure!(!Chains::<T>::contains_key(chain_id), Error::<T>::ChainAlreadyRegistered);
		ensure!(
			(ChainIds::<T>::decode_len().unwrap_or(0) as u32) < T::MaxRegisteredChains::get(),
			Error::<T>::TooManyChains
		);
		Ok(())
	}

	pub(crate) fn do_register_chain(
		_admin: &AdminTicket,
		chain: ChainInfo,
		token_quantity: Amount,
		wrapped_token_quantity: Amount,
		validator_keys: Vec<(T::AccountId, ChainKey)>,
	) -> DispatchResult {
		Self::ensure_chain_can_register(chain.id)?;

		let validators = Validators::<T>::get();
		ensure!(validator_keys.len() == validators.len(), Error::<T>::InvalidValidatorChainData);
		let mut seen = BTreeSet::new();
		for (account, key) in validator_keys.iter() {
			ensure!(validators.contains(account), Error::<T>::UnknownValidator);
			ensure!(seen.insert(account), Error::<T>::DuplicateValidator);
			ensure!(!key.is_empty(), Error::<T>::InvalidValidatorChainData);
		}

		Self::install_chain(chain, token_quantity, wrapped_token_quantity, validator_keys);
		Ok(())
	}

	/// Each validator votes with its own key. The chain is registered once every current
	/// validator voted for the same chain data.
	pub(crate) fn do_register_chain_governance(
		ticket: &ValidatorTicket<T::AccountId>,
		chain: ChainInfo,
		token_quantity: Amount,
		wrapped_token_quantity: Amount,
		key: ChainKey,
	) -> DispatchResult {
		Self::ensure_chain_can_register(chain.id)?;
		ensure!(!key.is_empty(), Error::<T>::InvalidValidatorChainData);

		let who = ticket.account();
		let fingerprint =
			fingerprint::chain_registration(&chain, token_quantity, wrapped_token_quantity);
		if let Some(outcome) = Self::vote_skip_reason(&fingerprint, who) {
			log::debug!(target: LOG_TARGET, "chain registration vote skipped: {:?}", outcome);
			return Ok(());
		}

		PendingChainKeys::<T>::insert(fingerprint, who, key);
		Self::deposit_event(Event::ChainRegistrationProposed {
			chain_id: chain.id,
			validator: who.clone(),
		});

		let validators = Validators::<T>::get();
		let outcome = Self::record_vote_with_threshold(
			VoteCategory::Governance,
			&fingerprint,
			who,
			validators.len() as u32,
		);
		if outcome == VoteOutcome::QuorumReached {
			let keys = PendingChainKeys::<T>::drain_prefix(fingerprint)
				.filter(|(account, _)| validators.contains(account))
				.collect();
			Self::install_chain(chain, token_quantity, wrapped_token_quantity, keys);
		}
		Ok(())
	}

	fn install_chain(
		chain: ChainInfo,
		token_quantity: Amount,
		wrapped_token_quantity: Amount,
		validator_keys: Vec<(T::AccountId, ChainKey)>,
	) {
		let chain_id = chain.id;
		for (account, key) in validator_keys {
			ValidatorChainData::<T>::insert(chain_id, account, key);
		}
		Self::credit(chain_id, TokenClass::Native, token_quantity);
		Self::credit(chain_id, TokenClass::Wrapped, wrapped_token_quantity);
		ChainIds::<T>::append(chain_id);
		BatchWindows::<T>::insert(chain_id, BatchWindow::default());
		Chains::<T>::insert(chain_id, chain);

		log::info!(target: LOG_TARGET, "chain {} registered", chain_id);
		Self::deposit_event(Event::ChainRegistered { chain_id });
	}

	pub(crate) fn do_submit_new_validator_set(
		ticket: &ValidatorTicket<T::AccountId>,
		proposal: ValidatorSetProposal<T::AccountId>,
	) -> DispatchResult {
		ensure!(
			!ValidatorSetState::<T>::get().is_pending(),
			Error::<T>::ValidatorSetUpdateInProgress
		);
		Self::validate_validator_set_proposal(&proposal)?;

		let who = ticket.account();
		let fingerprint = fingerprint::validator_set(ValidatorSetId::<T>::get(), &proposal);
		if let Some(outcome) = Self::vote_skip_reason(&fingerprint, who) {
			log::debug!(target: LOG_TARGET, "validator set vote skipped: {:?}", outcome);
			return Ok(());
		}

		Self::deposit_event(Event::NewValidatorSetSubmitted {
			validator: who.clone(),
			fingerprint,
		});
		if Self::record_vote(VoteCategory::Governance, &fingerprint, who) ==
			VoteOutcome::QuorumReached
		{
			Self::stage_validator_set(fingerprint, proposal);
		}
		Ok(())
	}

	fn validate_validator_set_proposal(
		proposal: &ValidatorSetProposal<T::AccountId>,
	) -> Result<(), Error<T>> {
		let zero = T::AccountId::decode(&mut TrailingZeroInput::zeroes()).ok();
		let current = Validators::<T>::get();

		let mut seen = BTreeSet::new();
		for account in proposal.added.iter().map(|v| &v.account).chain(proposal.removed.iter()) {
			ensure!(Some(account) != zero.as_ref(), Error::<T>::ZeroAddressValidator);
			ensure!(seen.insert(account), Error::<T>::DuplicateValidator);
		}
		for account in proposal.removed.iter() {
			ensure!(current.contains(account), Error::<T>::UnknownValidator);
		}
		for added in proposal.added.iter() {
			ensure!(!current.contains(&added.account), Error::<T>::DuplicateValidator);
		}

		let new_size = (current.len() + proposal.added.len())
			.checked_sub(proposal.removed.len())
			.ok_or(Error::<T>::InvalidValidatorSetSize)? as u32;
		ensure!(
			new_size >= T::MinValidators::get() && new_size <= T::MaxValidators::get(),
			Error::<T>::InvalidValidatorSetSize
		);

		let chain_ids = ChainIds::<T>::get();
		for added in proposal.added.iter() {
			ensure!(added.keys.len() == chain_ids.len(), Error::<T>::InvalidValidatorChainData);
			let mut covered = BTreeSet::new();
			for (chain_id, key) in added.keys.iter() {
				ensure!(
					chain_ids.contains(chain_id) && !key.is_empty() && covered.insert(*chain_id),
					Error::<T>::InvalidValidatorChainData
				);
			}
		}
		Ok(())
	}

	fn stage_validator_set(fingerprint: Fingerprint, proposal: ValidatorSetProposal<T::AccountId>) {
		let pending = PendingValidatorSet {
			set_id: ValidatorSetId::<T>::get().saturating_add(1),
			fingerprint,
			proposal,
			confirmed_chains: BTreeSet::new(),
			proposed_at: frame_system::Pallet::<T>::block_number(),
		};
		if ChainIds::<T>::get().is_empty() {
			Self::activate_validator_set(pending);
			return;
		}

		let set_id = pending.set_id;
		ValidatorSetState::<T>::put(ValidatorSetStatus::ProposalPending(pending));
		log::info!(target: LOG_TARGET, "validator set {} pending chain confirmations", set_id);
		Self::deposit_event(Event::NewValidatorSetPending { set_id });
	}

	/// Votes that the pending validator set is in place on `chain_id`. The set activates
	/// when every registered chain has been confirmed.
	pub(crate) fn do_confirm_validator_set_on_chain(
		ticket: &ValidatorTicket<T::AccountId>,
		chain_id: ChainId,
	) -> DispatchResult {
		Self::ensure_chain_registered(chain_id)?;
		let ValidatorSetStatus::ProposalPending(mut pending) = ValidatorSetState::<T>::get() else {
			return Err(Error::<T>::NoValidatorSetPending.into());
		};
		if pending.confirmed_chains.contains(&chain_id) {
			return Ok(());
		}

		let fingerprint = fingerprint::validator_set_chain(&pending.fingerprint, chain_id);
		if Self::record_vote(VoteCategory::Governance, &fingerprint, ticket.account()) !=
			VoteOutcome::QuorumReached
		{
			return Ok(());
		}

		pending.confirmed_chains.insert(chain_id);
		let set_id = pending.set_id;
		let complete = ChainIds::<T>::get().iter().all(|id| pending.confirmed_chains.contains(id));
		if complete {
			Self::deposit_event(Event::ValidatorSetChainConfirmed { set_id, chain_id });
			Self::activate_validator_set(pending);
		} else {
			ValidatorSetState::<T>::put(ValidatorSetStatus::ProposalPending(pending));
			Self::deposit_event(Event::ValidatorSetChainConfirmed { set_id, chain_id });
		}
		Ok(())
	}

	fn activate_validator_set(pending: PendingValidatorSet<T::AccountId, BlockNumberFor<T>>) {
		let ValidatorSetProposal { added, removed } = pending.proposal;
		let chain_ids = ChainIds::<T>::get();

		let mut validators = Validators::<T>::get();
		validators.retain(|account| !removed.contains(account));
		for account in removed.iter() {
			for chain_id in chain_ids.iter() {
				ValidatorChainData::<T>::remove(chain_id, account);
			}
		}
		for NewValidator { account, keys } in added {
			for (chain_id, key) in keys {
				ValidatorChainData::<T>::insert(chain_id, &account, key);
			}
			validators.push(account);
		}

		Validators::<T>::put(validators);
		ValidatorSetId::<T>::put(pending.set_id);
		ValidatorSetState::<T>::put(ValidatorSetStatus::Activated {
			set_id: pending.set_id,
			activated_at: frame_system::Pallet::<T>::block_number(),
		});

		log::info!(target: LOG_TARGET, "validator set {} activated", pending.set_id);
		Self::deposit_event(Event::NewValidatorSetActivated { set_id: pending.set_id });
	}
}
