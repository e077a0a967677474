//! Canonical fingerprints of claims, batch proposals and governance votes.
//!
//! A fingerprint is `keccak_256(tag ++ SCALE(fields))`, fields in the order listed for each
//! tag. Relayers recompute them off-chain, so tags and field order are part of the wire
//! contract.

use crate::types::*;
use codec::Encode;
use sp_core::H256;
use sp_io::hashing::keccak_256;
use sp_std::prelude::*;

pub const TAG_BRIDGING_REQUEST: u8 = 0x01;
pub const TAG_BATCH_EXECUTED: u8 = 0x02;
pub const TAG_BATCH_EXECUTION_FAILED: u8 = 0x03;
pub const TAG_REFUND_REQUEST: u8 = 0x04;
pub const TAG_REFUND_EXECUTED: u8 = 0x05;
pub const TAG_HOT_WALLET_INCREMENT: u8 = 0x06;
pub const TAG_SIGNED_BATCH: u8 = 0x10;
pub const TAG_SLOT: u8 = 0x20;
pub const TAG_CHAIN_REGISTRATION: u8 = 0x30;
pub const TAG_VALIDATOR_SET: u8 = 0x31;
pub const TAG_VALIDATOR_SET_CHAIN: u8 = 0x32;

fn hash_tagged<F: Encode>(tag: u8, fields: F) -> Fingerprint {
	let mut data = Vec::with_capacity(1 + fields.size_hint());
	data.push(tag);
	fields.encode_to(&mut data);
	H256(keccak_256(&data))
}

pub trait Fingerprinted {
	fn fingerprint(&self) -> Fingerprint;
}

impl Fingerprinted for BridgingRequestClaim {
	fn fingerprint(&self) -> Fingerprint {
		hash_tagged(
			TAG_BRIDGING_REQUEST,
			(
				&self.observed_tx_hash,
				&self.receivers,
				self.total_amount,
				self.total_wrapped_amount,
				self.retry_counter,
				self.source_chain_id,
				self.destination_chain_id,
			),
		)
	}
}

impl Fingerprinted for BatchExecutedClaim {
	fn fingerprint(&self) -> Fingerprint {
		hash_tagged(
			TAG_BATCH_EXECUTED,
			(&self.observed_tx_hash, self.chain_id, self.batch_nonce_id),
		)
	}
}

impl Fingerprinted for BatchExecutionFailedClaim {
	fn fingerprint(&self) -> Fingerprint {
		hash_tagged(
			TAG_BATCH_EXECUTION_FAILED,
			(&self.observed_tx_hash, self.chain_id, self.batch_nonce_id),
		)
	}
}

impl Fingerprinted for RefundRequestClaim {
	fn fingerprint(&self) -> Fingerprint {
		hash_tagged(
			TAG_REFUND_REQUEST,
			(
				&self.origin_tx_hash,
				&self.refund_tx_hash,
				self.origin_amount,
				&self.output_indexes,
				&self.origin_sender_address,
				self.retry_counter,
				self.origin_chain_id,
				self.should_decrement_hot_wallet,
			),
		)
	}
}

impl Fingerprinted for RefundExecutedClaim {
	fn fingerprint(&self) -> Fingerprint {
		hash_tagged(
			TAG_REFUND_EXECUTED,
			(&self.observed_tx_hash, self.chain_id, &self.refund_tx_hash),
		)
	}
}

impl Fingerprinted for HotWalletIncrementClaim {
	fn fingerprint(&self) -> Fingerprint {
		hash_tagged(TAG_HOT_WALLET_INCREMENT, (self.chain_id, self.amount))
	}
}

impl Fingerprinted for Claim {
	fn fingerprint(&self) -> Fingerprint {
		match self {
			Claim::BridgingRequest(claim) => claim.fingerprint(),
			Claim::BatchExecuted(claim) => claim.fingerprint(),
			Claim::BatchExecutionFailed(claim) => claim.fingerprint(),
			Claim::RefundRequest(claim) => claim.fingerprint(),
			Claim::RefundExecuted(claim) => claim.fingerprint(),
			Claim::HotWalletIncrement(claim) => claim.fingerprint(),
		}
	}
}

impl BatchProposal {
	/// Message the validators sign.
	pub fn payload_hash(&self) -> H256 {
		H256(keccak_256(&self.raw_transaction))
	}
}

impl Fingerprinted for BatchProposal {
	fn fingerprint(&self) -> Fingerprint {
		hash_tagged(
			TAG_SIGNED_BATCH,
			(
				self.id,
				self.destination_chain_id,
				self.first_tx_nonce_id,
				self.last_tx_nonce_id,
				self.payload_hash(),
				self.is_consolidation,
			),
		)
	}
}

pub fn slot(chain_id: ChainId, block: &ObservedBlock) -> Fingerprint {
	hash_tagged(TAG_SLOT, (chain_id, block.slot, &block.hash))
}

pub fn chain_registration(
	chain: &ChainInfo,
	token_quantity: Amount,
	wrapped_token_quantity: Amount,
) -> Fingerprint {
	hash_tagged(TAG_CHAIN_REGISTRATION, (chain, token_quantity, wrapped_token_quantity))
}

pub fn validator_set<AccountId: Encode>(
	current_set_id: u32,
	proposal: &ValidatorSetProposal<AccountId>,
) -> Fingerprint {
	hash_tagged(TAG_VALIDATOR_SET, (current_set_id, proposal))
}

pub fn validator_set_chain(set_fingerprint: &Fingerprint, chain_id: ChainId) -> Fingerprint {
	hash_tagged(TAG_VALIDATOR_SET_CHAIN, (set_fingerprint, chain_id))
}
