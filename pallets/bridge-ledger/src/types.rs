use codec::{Decode, Encode, MaxEncodedLen};
use frame_support::{pallet_prelude::*, BoundedVec};
use scale_info::TypeInfo;
use sp_core::H256;
use sp_std::{collections::btree_set::BTreeSet, prelude::*};

/// Maximum length of a destination-chain address
pub const MAX_ADDRESS_LENGTH: u32 = 128;
/// Maximum length of a validator's per-chain verifying key
pub const MAX_KEY_LENGTH: u32 = 128;
/// Maximum length of a batch signature
pub const MAX_SIGNATURE_LENGTH: u32 = 128;
/// Maximum length of an opaque destination-chain transaction
pub const MAX_RAW_TRANSACTION_LENGTH: u32 = 32 * 1024;
pub const MAX_RECEIVERS_PER_CLAIM: u32 = 64;
pub const MAX_OUTPUT_INDEXES: u32 = 64;
pub const MAX_POOL_ID_LENGTH: u32 = 64;

pub type ChainId = u8;
pub type Nonce = u64;
pub type BatchId = u64;
pub type Amount = u128;
pub type ColoredCoinId = u16;
pub type TxHash = H256;
pub type Fingerprint = H256;

pub type Address = BoundedVec<u8, ConstU32<MAX_ADDRESS_LENGTH>>;
pub type ChainKey = BoundedVec<u8, ConstU32<MAX_KEY_LENGTH>>;
pub type BatchSignature = BoundedVec<u8, ConstU32<MAX_SIGNATURE_LENGTH>>;
pub type RawTransaction = BoundedVec<u8, ConstU32<MAX_RAW_TRANSACTION_LENGTH>>;
pub type Receivers = BoundedVec<Receiver, ConstU32<MAX_RECEIVERS_PER_CLAIM>>;
pub type OutputIndexes = BoundedVec<u16, ConstU32<MAX_OUTPUT_INDEXES>>;
pub type PoolId = BoundedVec<u8, ConstU32<MAX_POOL_ID_LENGTH>>;

// ============================================================================
// Chains and tokens
// ============================================================================

#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum ChainType {
	/// UTXO-style chain (multisig address holding outputs)
	Utxo,
	/// Account-style chain (gateway contract)
	Account,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct ChainInfo {
	pub id: ChainId,
	pub chain_type: ChainType,
	pub multisig_address: Address,
	pub fee_payer_address: Address,
}

/// Liquidity bucket tracked per chain.
#[derive(
	Clone,
	Copy,
	Encode,
	Decode,
	Eq,
	PartialEq,
	Ord,
	PartialOrd,
	RuntimeDebug,
	TypeInfo,
	MaxEncodedLen,
)]
pub enum TokenClass {
	Native,
	Wrapped,
	Colored(ColoredCoinId),
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct ColoredCoinAmount {
	pub coin_id: ColoredCoinId,
	pub amount: Amount,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct Receiver {
	pub amount: Amount,
	pub dest_address: Address,
	pub wrapped_amount: Amount,
	pub colored_coin: Option<ColoredCoinAmount>,
}

// ============================================================================
// Claims
// ============================================================================

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct BridgingRequestClaim {
	pub observed_tx_hash: TxHash,
	pub receivers: Receivers,
	pub total_amount: Amount,
	pub total_wrapped_amount: Amount,
	pub retry_counter: u32,
	pub source_chain_id: ChainId,
	pub destination_chain_id: ChainId,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct BatchExecutedClaim {
	pub observed_tx_hash: TxHash,
	pub chain_id: ChainId,
	pub batch_nonce_id: BatchId,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct BatchExecutionFailedClaim {
	pub observed_tx_hash: TxHash,
	pub chain_id: ChainId,
	pub batch_nonce_id: BatchId,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct RefundRequestClaim {
	pub origin_tx_hash: TxHash,
	/// Must be `None` on submission.
	pub refund_tx_hash: Option<TxHash>,
	pub origin_amount: Amount,
	pub output_indexes: OutputIndexes,
	pub origin_sender_address: Address,
	pub retry_counter: u32,
	pub origin_chain_id: ChainId,
	pub should_decrement_hot_wallet: bool,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct RefundExecutedClaim {
	pub observed_tx_hash: TxHash,
	pub chain_id: ChainId,
	pub refund_tx_hash: TxHash,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct HotWalletIncrementClaim {
	pub chain_id: ChainId,
	pub amount: Amount,
}

/// A single validator assertion. One submission carries any mix of these.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum Claim {
	BridgingRequest(BridgingRequestClaim),
	BatchExecuted(BatchExecutedClaim),
	BatchExecutionFailed(BatchExecutionFailedClaim),
	RefundRequest(RefundRequestClaim),
	RefundExecuted(RefundExecutedClaim),
	HotWalletIncrement(HotWalletIncrementClaim),
}

#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum ClaimKind {
	BridgingRequest,
	BatchExecuted,
	BatchExecutionFailed,
	RefundRequest,
	RefundExecuted,
	HotWalletIncrement,
}

impl Claim {
	pub fn kind(&self) -> ClaimKind {
		match self {
			Claim::BridgingRequest(_) => ClaimKind::BridgingRequest,
			Claim::BatchExecuted(_) => ClaimKind::BatchExecuted,
			Claim::BatchExecutionFailed(_) => ClaimKind::BatchExecutionFailed,
			Claim::RefundRequest(_) => ClaimKind::RefundRequest,
			Claim::RefundExecuted(_) => ClaimKind::RefundExecuted,
			Claim::HotWalletIncrement(_) => ClaimKind::HotWalletIncrement,
		}
	}
}

// ============================================================================
// Confirmed transaction queue
// ============================================================================

#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum StakeOperation {
	Registration,
	Delegation,
	Deregistration,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum TransactionKind {
	Bridging,
	Refund { output_indexes: OutputIndexes },
	Redistribution,
	StakeOperation { operation: StakeOperation, pool_id: PoolId },
	Defund { token_class: TokenClass },
}

impl TransactionKind {
	/// Exclusive entries are always batched on their own.
	pub fn is_exclusive(&self) -> bool {
		matches!(self, TransactionKind::Redistribution | TransactionKind::StakeOperation { .. })
	}
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct ConfirmedTransaction<BlockNumber> {
	pub nonce: Nonce,
	pub kind: TransactionKind,
	/// Zero for administrative entries.
	pub observed_tx_hash: TxHash,
	pub source_chain_id: ChainId,
	pub receivers: Receivers,
	pub total_amount: Amount,
	pub total_wrapped_amount: Amount,
	pub retry_counter: u32,
	pub block_height: BlockNumber,
}

/// Per-chain view of the queue: what has been confirmed, what has been batched and
/// whether a signed batch is currently waiting for its execution outcome.
#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen, Default)]
pub struct BatchWindow<BlockNumber> {
	pub last_batched_tx_nonce: Nonce,
	pub last_confirmed_tx_nonce: Nonce,
	pub next_timeout_block: Option<BlockNumber>,
	pub current_batch_block: Option<BlockNumber>,
	pub in_flight_batch: Option<BatchId>,
}

impl<BlockNumber> BatchWindow<BlockNumber> {
	pub fn unbatched_count(&self) -> u64 {
		self.last_confirmed_tx_nonce.saturating_sub(self.last_batched_tx_nonce)
	}
}

// ============================================================================
// Signed batches
// ============================================================================

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct BatchProposal {
	pub id: BatchId,
	pub destination_chain_id: ChainId,
	pub first_tx_nonce_id: Nonce,
	pub last_tx_nonce_id: Nonce,
	pub raw_transaction: RawTransaction,
	pub is_consolidation: bool,
}

#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum BatchStatus {
	/// Reached signature quorum, waiting for an executed / failed claim.
	Confirmed,
	Executed,
	Failed,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct ConfirmedSignedBatch<AccountId, BlockNumber> {
	pub proposal: BatchProposal,
	pub signatures: Vec<(AccountId, BatchSignature)>,
	pub status: BatchStatus,
	pub confirmed_at: BlockNumber,
}

// ============================================================================
// Votes
// ============================================================================

/// Independent index spaces of the vote ledger, each pruned on its own.
#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum VoteCategory {
	Claims,
	SignedBatches,
	Slots,
	Governance,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct VoteRecord<AccountId: Ord, BlockNumber> {
	pub voters: BTreeSet<AccountId>,
	pub recorded_at: BlockNumber,
	/// Set once, never cleared. Survives pruning as a tombstone.
	pub quorum_reached_at: Option<BlockNumber>,
}

/// What happened to a single vote.
#[derive(Clone, Copy, Eq, PartialEq, RuntimeDebug)]
pub enum VoteOutcome {
	AlreadyConfirmed,
	AlreadyVoted,
	Recorded,
	QuorumReached,
}

// ============================================================================
// Slots
// ============================================================================

#[derive(Clone, Copy, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct ObservedBlock {
	pub slot: u64,
	pub hash: H256,
}

// ============================================================================
// Validator set
// ============================================================================

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct NewValidator<AccountId> {
	pub account: AccountId,
	pub keys: Vec<(ChainId, ChainKey)>,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct ValidatorSetProposal<AccountId> {
	pub added: Vec<NewValidator<AccountId>>,
	pub removed: Vec<AccountId>,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub struct PendingValidatorSet<AccountId, BlockNumber> {
	pub set_id: u32,
	pub fingerprint: Fingerprint,
	pub proposal: ValidatorSetProposal<AccountId>,
	pub confirmed_chains: BTreeSet<ChainId>,
	pub proposed_at: BlockNumber,
}

#[derive(Clone, Encode, Decode, Eq, PartialEq, RuntimeDebug, TypeInfo)]
pub enum ValidatorSetStatus<AccountId, BlockNumber> {
	Idle,
	ProposalPending(PendingValidatorSet<AccountId, BlockNumber>),
	Activated { set_id: u32, activated_at: BlockNumber },
}

impl<AccountId, BlockNumber> Default for ValidatorSetStatus<AccountId, BlockNumber> {
	fn default() -> Self {
		ValidatorSetStatus::Idle
	}
}

impl<AccountId, BlockNumber> ValidatorSetStatus<AccountId, BlockNumber> {
	pub fn is_pending(&self) -> bool {
		matches!(self, ValidatorSetStatus::ProposalPending(_))
	}
}
