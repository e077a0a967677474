use crate::types::ChainType;
use sp_core::H256;
#[cfg(feature = "runtime-benchmarks")]
use sp_std::vec::Vec;

/// Signature oracle for batch payloads.
///
/// `key` is the validator's verifying key registered for the destination chain and
/// `message` the hash of the raw destination-chain transaction.
pub trait VerifyBatchSignature {
	fn verify(chain_type: ChainType, key: &[u8], message: &H256, signature: &[u8]) -> bool;

	/// A signature `verify` accepts for `key`, used to set up benchmarks.
	#[cfg(feature = "runtime-benchmarks")]
	fn benchmark_signature(key: &[u8], message: &H256) -> Vec<u8>;
}
