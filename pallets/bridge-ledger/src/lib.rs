//! # Bridge Ledger Pallet
//!
//! ## Overview
//!
//! A committee of validators observes events on several chains and submits signed claims
//! about them. A claim is accepted once a quorum of validators submitted the same claim
//! fingerprint. Accepted claims append nonce-ordered confirmed transactions to the queue of
//! their destination chain; the queue is then grouped into batches which need a second
//! signature quorum before relayers may execute them on the destination chain.
//!
//! The pallet also keeps per-chain token liquidity, the last source-chain block observed by
//! a quorum, the validator registry with its two-phase replacement, and bounded pruning of
//! aged voting state.
//!
//! ## Interface
//!
//! ### Validator Functions
//!
//! - `submit_claims`: vote on any mix of bridging request, batch executed, batch execution
//!   failed, refund request, refund executed and hot-wallet increment claims.
//! - `submit_signed_batch`: sign a batch proposal for a chain's pending queue window.
//! - `submit_last_observed_blocks`: vote on source-chain blocks.
//! - `register_chain_governance`, `submit_new_validator_set`,
//!   `confirm_validator_set_on_chain`: governance votes.
//!
//! ### Admin Functions
//!
//! - `register_chain`, `defund`, `redistribute_tokens`, `stake_operation`,
//!   `rescale_unbatched_amounts`
//! - `prune_claims`, `prune_signed_batches`, `prune_confirmed_signed_batches`,
//!   `prune_confirmed_transactions`, `prune_slots`, `prune_governance_votes`

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

mod access;
mod batches;
mod claims;
pub mod fingerprint;
mod pruning;
mod queue;
mod slots;
mod tokens;
pub mod traits;
pub mod types;
mod validators;
mod votes;
pub mod weights;

pub use access::{AdminTicket, ValidatorTicket};
pub use traits::VerifyBatchSignature;
pub use types::*;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub(crate) const LOG_TARGET: &str = "runtime::bridge-ledger";

#[frame_support::pallet]
pub mod pallet {
	use super::*;
	use frame_support::pallet_prelude::*;
	use frame_system::pallet_prelude::*;
	use sp_std::{collections::btree_set::BTreeSet, prelude::*};

	#[pallet::pallet]
	#[pallet::without_storage_info]
	pub struct Pallet<T>(_);

	#[pallet::config]
	pub trait Config: frame_system::Config {
		type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

		/// Origin for owner actions: chain registration, defund, redistribution, stake
		/// operations, rescale and pruning.
		type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

		/// Checks validator signatures over batch payloads.
		type SignatureVerifier: VerifyBatchSignature;

		/// Weight information for extrinsics in this pallet.
		type WeightInfo: WeightInfo;

		#[pallet::constant]
		type MaxValidators: Get<u32>;

		#[pallet::constant]
		type MinValidators: Get<u32>;

		#[pallet::constant]
		type MaxRegisteredChains: Get<u32>;

		#[pallet::constant]
		type MaxClaimsPerSubmission: Get<u32>;

		#[pallet::constant]
		type MaxBlocksPerSubmission: Get<u32>;

		/// A queue holding this many unbatched transactions may be batched without waiting
		/// for the timeout.
		#[pallet::constant]
		type MaxNumberOfTransactions: Get<u32>;

		/// Blocks after the first unbatched confirmation before batching is allowed anyway.
		#[pallet::constant]
		type TimeoutBlocksNumber: Get<BlockNumberFor<Self>>;

		/// Nothing younger than this may be pruned.
		#[pallet::constant]
		type MinClaimBlockAge: Get<BlockNumberFor<Self>>;

		/// The most recent confirmed signed batches of a chain that are never pruned.
		#[pallet::constant]
		type MinNumberOfSignedBatches: Get<u64>;

		/// Most records a single prune or rescale call may walk.
		#[pallet::constant]
		type MaxRecordsPerCall: Get<u32>;
	}

	// ------------------------------------------------------------------
	// Validator registry
	// ------------------------------------------------------------------

	#[pallet::storage]
	#[pallet::getter(fn validators)]
	pub type Validators<T: Config> = StorageValue<_, Vec<T::AccountId>, ValueQuery>;

	/// Verifying key of a validator on a chain.
	#[pallet::storage]
	pub type ValidatorChainData<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		ChainId,
		Blake2_128Concat,
		T::AccountId,
		ChainKey,
		OptionQuery,
	>;

	#[pallet::storage]
	pub type ValidatorSetId<T: Config> = StorageValue<_, u32, ValueQuery>;

	#[pallet::storage]
	pub type ValidatorSetState<T: Config> =
		StorageValue<_, ValidatorSetStatus<T::AccountId, BlockNumberFor<T>>, ValueQuery>;

	// ------------------------------------------------------------------
	// Chains and liquidity
	// ------------------------------------------------------------------

	#[pallet::storage]
	pub type Chains<T: Config> = StorageMap<_, Blake2_128Concat, ChainId, ChainInfo, OptionQuery>;

	/// Registered chain ids in registration order.
	#[pallet::storage]
	pub type ChainIds<T: Config> = StorageValue<_, Vec<ChainId>, ValueQuery>;

	/// Keys contributed by validators to a governance chain registration, by fingerprint.
	#[pallet::storage]
	pub type PendingChainKeys<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		Fingerprint,
		Blake2_128Concat,
		T::AccountId,
		ChainKey,
		OptionQuery,
	>;

	#[pallet::storage]
	pub type TokenQuantity<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		ChainId,
		Blake2_128Concat,
		TokenClass,
		Amount,
		ValueQuery,
	>;

	// ------------------------------------------------------------------
	// Vote ledger
	// ------------------------------------------------------------------

	#[pallet::storage]
	pub type Votes<T: Config> = StorageMap<
		_,
		Blake2_128Concat,
		Fingerprint,
		VoteRecord<T::AccountId, BlockNumberFor<T>>,
		OptionQuery,
	>;

	/// Creation order of vote records, per category.
	#[pallet::storage]
	pub type VoteIndex<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		VoteCategory,
		Twox64Concat,
		u64,
		(Fingerprint, BlockNumberFor<T>),
		OptionQuery,
	>;

	#[pallet::storage]
	pub type NextVoteIndex<T: Config> =
		StorageMap<_, Blake2_128Concat, VoteCategory, u64, ValueQuery>;

	#[pallet::storage]
	pub type NextUnprunedVoteIndex<T: Config> =
		StorageMap<_, Blake2_128Concat, VoteCategory, u64, ValueQuery>;

	// ------------------------------------------------------------------
	// Confirmed transaction queue
	// ------------------------------------------------------------------

	#[pallet::storage]
	pub type ConfirmedTransactions<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		ChainId,
		Twox64Concat,
		Nonce,
		ConfirmedTransaction<BlockNumberFor<T>>,
		OptionQuery,
	>;

	#[pallet::storage]
	pub type BatchWindows<T: Config> =
		StorageMap<_, Blake2_128Concat, ChainId, BatchWindow<BlockNumberFor<T>>, ValueQuery>;

	#[pallet::storage]
	pub type LastPrunedTxNonce<T: Config> =
		StorageMap<_, Blake2_128Concat, ChainId, Nonce, ValueQuery>;

	#[pallet::storage]
	pub type AmountsRescaled<T: Config> =
		StorageMap<_, Blake2_128Concat, ChainId, bool, ValueQuery>;

	// ------------------------------------------------------------------
	// Signed batches
	// ------------------------------------------------------------------

	/// Proposals still collecting signatures.
	#[pallet::storage]
	pub type PendingBatches<T: Config> =
		StorageMap<_, Blake2_128Concat, Fingerprint, BatchProposal, OptionQuery>;

	#[pallet::storage]
	pub type BatchSignatures<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		Fingerprint,
		Blake2_128Concat,
		T::AccountId,
		BatchSignature,
		OptionQuery,
	>;

	#[pallet::storage]
	pub type ConfirmedSignedBatches<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		ChainId,
		Twox64Concat,
		BatchId,
		ConfirmedSignedBatch<T::AccountId, BlockNumberFor<T>>,
		OptionQuery,
	>;

	#[pallet::storage]
	pub type LastConfirmedBatchId<T: Config> =
		StorageMap<_, Blake2_128Concat, ChainId, BatchId, ValueQuery>;

	#[pallet::storage]
	pub type LastPrunedBatchId<T: Config> =
		StorageMap<_, Blake2_128Concat, ChainId, BatchId, ValueQuery>;

	// ------------------------------------------------------------------
	// Slots
	// ------------------------------------------------------------------

	#[pallet::storage]
	#[pallet::getter(fn last_observed_block)]
	pub type LastObservedBlock<T: Config> =
		StorageMap<_, Blake2_128Concat, ChainId, ObservedBlock, OptionQuery>;

	#[pallet::genesis_config]
	#[derive(frame_support::DefaultNoBound)]
	pub struct GenesisConfig<T: Config> {
		pub validators: Vec<T::AccountId>,
	}

	#[pallet::genesis_build]
	impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
		fn build(&self) {
			let unique: BTreeSet<&T::AccountId> = self.validators.iter().collect();
			assert_eq!(unique.len(), self.validators.len(), "duplicate genesis validator");
			assert!(
				self.validators.len() as u32 <= T::MaxValidators::get(),
				"too many genesis validators"
			);
			Validators::<T>::put(&self.validators);
		}
	}

	#[pallet::event]
	#[pallet::generate_deposit(pub(super) fn deposit_event)]
	pub enum Event<T: Config> {
		ChainRegistered { chain_id: ChainId },
		ChainRegistrationProposed { chain_id: ChainId, validator: T::AccountId },
		NewValidatorSetSubmitted { validator: T::AccountId, fingerprint: Fingerprint },
		NewValidatorSetPending { set_id: u32 },
		ValidatorSetChainConfirmed { set_id: u32, chain_id: ChainId },
		NewValidatorSetActivated { set_id: u32 },
		ClaimConfirmed { kind: ClaimKind, fingerprint: Fingerprint },
		/// A confirmed claim was dropped because the chain lacks liquidity.
		NotEnoughFunds { claim_kind: ClaimKind, index: u32, available: Amount },
		TransactionConfirmed { chain_id: ChainId, nonce: Nonce },
		HotWalletIncremented { chain_id: ChainId, amount: Amount },
		RefundExecuted { chain_id: ChainId, refund_tx_hash: TxHash },
		SignedBatchConfirmed { chain_id: ChainId, batch_id: BatchId },
		BatchExecuted { chain_id: ChainId, batch_id: BatchId },
		BatchExecutionFailed { chain_id: ChainId, batch_id: BatchId },
		/// An executed / failed claim arrived for a batch whose outcome is already known.
		BatchAlreadyClosed {
			claim_kind: ClaimKind,
			index: u32,
			chain_id: ChainId,
			batch_id: BatchId,
		},
		LastObservedBlockUpdated { chain_id: ChainId, block: ObservedBlock },
		ChainDefunded { chain_id: ChainId, token_class: TokenClass, amount: Amount },
		RedistributionRequested { chain_id: ChainId, nonce: Nonce },
		StakeOperationRequested { chain_id: ChainId, nonce: Nonce, operation: StakeOperation },
		AmountsRescaledDone { chain_id: ChainId, factor: u32, rescaled: u32 },
		VotesPruned { category: VoteCategory, up_to: u64 },
		ConfirmedSignedBatchesPruned { chain_id: ChainId, up_to: BatchId },
		ConfirmedTransactionsPruned { chain_id: ChainId, up_to: Nonce },
	}

	#[pallet::error]
	pub enum Error<T> {
		/// Caller is not in the current validator set
		NotValidator,
		ChainNotRegistered,
		ChainAlreadyRegistered,
		TooManyChains,
		SameSourceAndDestination,
		EmptyReceivers,
		/// Refund requests must not carry a refund tx hash
		RefundTxHashNotEmpty,
		TooManyClaims,
		TooManyBlocks,
		/// Key material does not match the validator set / registered chains
		InvalidValidatorChainData,
		InvalidValidatorSetSize,
		DuplicateValidator,
		ZeroAddressValidator,
		UnknownValidator,
		MissingValidatorKey,
		InvalidSignature,
		InvalidConsolidationRange,
		InvalidScaleFactor,
		AmountOverflow,
		/// A signed batch for this chain is waiting for its execution outcome
		BatchAlreadyInFlight,
		CannotCreateBatchYet,
		ValidatorSetUpdateInProgress,
		NoValidatorSetPending,
		DefundExceedsLiquidity,
		AmountsAlreadyRescaled,
		AlreadyPruned,
		/// Boundary reaches into records that must be kept
		PruneBoundaryProtected,
		PruneBoundaryTooRecent,
		TtlBelowMinimum,
		InvalidPruneBoundary,
		/// More records than `MaxRecordsPerCall` in one call
		RangeTooLarge,
	}

	#[pallet::hooks]
	impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
		fn integrity_test() {
			assert!(T::MinValidators::get() > 0, "MinValidators must be positive");
			assert!(
				T::MinValidators::get() <= T::MaxValidators::get(),
				"MinValidators exceeds MaxValidators"
			);
			assert!(
				T::MaxNumberOfTransactions::get() > 0,
				"MaxNumberOfTransactions must be positive"
			);
			assert!(T::MaxRecordsPerCall::get() > 0, "MaxRecordsPerCall must be positive");
		}
	}

	#[pallet::call]
	impl<T: Config> Pallet<T> {
		/// Validator votes on a list of claims.
		///
		/// Structural problems (unregistered chain, non-empty refund hash, ...) fail the whole
		/// call. Duplicate votes, already confirmed claims and underfunded claims are skipped
		/// item by item.
		#[pallet::call_index(0)]
		#[pallet::weight(T::WeightInfo::submit_claims(claims.len() as u32))]
		pub fn submit_claims(origin: OriginFor<T>, claims: Vec<Claim>) -> DispatchResult {
			let ticket = Self::ensure_validator(origin)?;
			Self::do_submit_claims(&ticket, claims)
		}

		/// Validator signs a batch proposal for a chain.
		#[pallet::call_index(1)]
		#[pallet::weight(T::WeightInfo::submit_signed_batch())]
		pub fn submit_signed_batch(
			origin: OriginFor<T>,
			proposal: BatchProposal,
			signature: BatchSignature,
		) -> DispatchResult {
			let ticket = Self::ensure_validator(origin)?;
			Self::do_submit_signed_batch(&ticket, proposal, signature)
		}

		/// Validator votes on blocks observed on a source chain.
		#[pallet::call_index(2)]
		#[pallet::weight(T::WeightInfo::submit_last_observed_blocks(blocks.len() as u32))]
		pub fn submit_last_observed_blocks(
			origin: OriginFor<T>,
			chain_id: ChainId,
			blocks: Vec<ObservedBlock>,
		) -> DispatchResult {
			let ticket = Self::ensure_validator(origin)?;
			Self::do_submit_last_observed_blocks(&ticket, chain_id, blocks)
		}

		/// Register a chain with the keys of every current validator.
		#[pallet::call_index(3)]
		#[pallet::weight(T::WeightInfo::register_chain(validator_keys.len() as u32))]
		pub fn register_chain(
			origin: OriginFor<T>,
			chain: ChainInfo,
			token_quantity: Amount,
			wrapped_token_quantity: Amount,
			validator_keys: Vec<(T::AccountId, ChainKey)>,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_register_chain(
				&admin,
				chain,
				token_quantity,
				wrapped_token_quantity,
				validator_keys,
			)
		}

		/// Validator votes on registering a chain and contributes its own key for it.
		#[pallet::call_index(4)]
		#[pallet::weight(T::WeightInfo::register_chain_governance())]
		pub fn register_chain_governance(
			origin: OriginFor<T>,
			chain: ChainInfo,
			token_quantity: Amount,
			wrapped_token_quantity: Amount,
			key: ChainKey,
		) -> DispatchResult {
			let ticket = Self::ensure_validator(origin)?;
			Self::do_register_chain_governance(
				&ticket,
				chain,
				token_quantity,
				wrapped_token_quantity,
				key,
			)
		}

		#[pallet::call_index(5)]
		#[pallet::weight(T::WeightInfo::submit_new_validator_set(
			proposal.added.len() as u32 + proposal.removed.len() as u32
		))]
		pub fn submit_new_validator_set(
			origin: OriginFor<T>,
			proposal: ValidatorSetProposal<T::AccountId>,
		) -> DispatchResult {
			let ticket = Self::ensure_validator(origin)?;
			Self::do_submit_new_validator_set(&ticket, proposal)
		}

		/// Validator confirms that the pending validator set is in place on a chain.
		#[pallet::call_index(6)]
		#[pallet::weight(T::WeightInfo::confirm_validator_set_on_chain())]
		pub fn confirm_validator_set_on_chain(
			origin: OriginFor<T>,
			chain_id: ChainId,
		) -> DispatchResult {
			let ticket = Self::ensure_validator(origin)?;
			Self::do_confirm_validator_set_on_chain(&ticket, chain_id)
		}

		#[pallet::call_index(7)]
		#[pallet::weight(T::WeightInfo::defund())]
		pub fn defund(
			origin: OriginFor<T>,
			chain_id: ChainId,
			token_class: TokenClass,
			amount: Amount,
			address: Address,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_defund(&admin, chain_id, token_class, amount, address)
		}

		#[pallet::call_index(8)]
		#[pallet::weight(T::WeightInfo::redistribute_tokens())]
		pub fn redistribute_tokens(origin: OriginFor<T>, chain_id: ChainId) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_redistribute_tokens(&admin, chain_id)
		}

		#[pallet::call_index(9)]
		#[pallet::weight(T::WeightInfo::stake_operation())]
		pub fn stake_operation(
			origin: OriginFor<T>,
			chain_id: ChainId,
			operation: StakeOperation,
			pool_id: PoolId,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_stake_operation(&admin, chain_id, operation, pool_id)
		}

		/// One-time multiplication of every unbatched amount of a chain.
		#[pallet::call_index(10)]
		#[pallet::weight(T::WeightInfo::rescale_unbatched_amounts(T::MaxRecordsPerCall::get()))]
		pub fn rescale_unbatched_amounts(
			origin: OriginFor<T>,
			chain_id: ChainId,
			factor: u32,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_rescale_unbatched_amounts(&admin, chain_id, factor)
		}

		#[pallet::call_index(11)]
		#[pallet::weight(T::WeightInfo::prune_votes(T::MaxRecordsPerCall::get()))]
		pub fn prune_claims(
			origin: OriginFor<T>,
			up_to_index: u64,
			ttl: BlockNumberFor<T>,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_prune_votes(&admin, VoteCategory::Claims, up_to_index, ttl)
		}

		#[pallet::call_index(12)]
		#[pallet::weight(T::WeightInfo::prune_votes(T::MaxRecordsPerCall::get()))]
		pub fn prune_signed_batches(
			origin: OriginFor<T>,
			up_to_index: u64,
			ttl: BlockNumberFor<T>,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_prune_votes(&admin, VoteCategory::SignedBatches, up_to_index, ttl)
		}

		#[pallet::call_index(13)]
		#[pallet::weight(T::WeightInfo::prune_confirmed_signed_batches(
			T::MaxRecordsPerCall::get()
		))]
		pub fn prune_confirmed_signed_batches(
			origin: OriginFor<T>,
			chain_id: ChainId,
			up_to_batch_id: BatchId,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_prune_confirmed_signed_batches(&admin, chain_id, up_to_batch_id)
		}

		#[pallet::call_index(14)]
		#[pallet::weight(T::WeightInfo::prune_confirmed_transactions(
			T::MaxRecordsPerCall::get()
		))]
		pub fn prune_confirmed_transactions(
			origin: OriginFor<T>,
			chain_id: ChainId,
			up_to_nonce: Nonce,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_prune_confirmed_transactions(&admin, chain_id, up_to_nonce)
		}

		#[pallet::call_index(15)]
		#[pallet::weight(T::WeightInfo::prune_votes(T::MaxRecordsPerCall::get()))]
		pub fn prune_slots(
			origin: OriginFor<T>,
			up_to_index: u64,
			ttl: BlockNumberFor<T>,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_prune_votes(&admin, VoteCategory::Slots, up_to_index, ttl)
		}

		/// Prunes chain registration and validator set votes. Refused while a validator set
		/// is pending.
		#[pallet::call_index(16)]
		#[pallet::weight(T::WeightInfo::prune_votes(T::MaxRecordsPerCall::get()))]
		pub fn prune_governance_votes(
			origin: OriginFor<T>,
			up_to_index: u64,
			ttl: BlockNumberFor<T>,
		) -> DispatchResult {
			let admin = Self::ensure_admin(origin)?;
			Self::do_prune_votes(&admin, VoteCategory::Governance, up_to_index, ttl)
		}
	}
}
