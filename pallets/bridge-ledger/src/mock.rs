use crate as pallet_bridge_ledger;
use crate::{types::*, Validators, VerifyBatchSignature};
use frame_support::{assert_ok, derive_impl, parameter_types, traits::Get, BoundedVec};
use frame_system::EnsureRoot;
use sp_core::H256;
use sp_runtime::BuildStorage;

type Block = frame_system::mocking::MockBlock<Test>;

// Configure a mock runtime to test the pallet
frame_support::construct_runtime!(
	pub enum Test
	{
		System: frame_system,
		BridgeLedger: pallet_bridge_ledger,
	}
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
	type Block = Block;
}

parameter_types! {
	pub const MaxValidators: u32 = 10;
	pub const MinValidators: u32 = 3;
	pub const MaxRegisteredChains: u32 = 4;
	pub const MaxClaimsPerSubmission: u32 = 16;
	pub const MaxBlocksPerSubmission: u32 = 8;
	pub const MaxNumberOfTransactions: u32 = 3;
	pub const TimeoutBlocksNumber: u64 = 10;
	pub const MinClaimBlockAge: u64 = 5;
	pub const MinNumberOfSignedBatches: u64 = 1;
	pub const MaxRecordsPerCall: u32 = 8;
}

/// Accepts a signature iff it is the signer's key followed by the message bytes.
pub struct TestSignatureVerifier;

impl VerifyBatchSignature for TestSignatureVerifier {
	fn verify(_chain_type: ChainType, key: &[u8], message: &H256, signature: &[u8]) -> bool {
		signature == test_signature(key, message).as_slice()
	}

	#[cfg(feature = "runtime-benchmarks")]
	fn benchmark_signature(key: &[u8], message: &H256) -> Vec<u8> {
		test_signature(key, message)
	}
}

impl pallet_bridge_ledger::Config for Test {
	type RuntimeEvent = RuntimeEvent;
	type AdminOrigin = EnsureRoot<u64>;
	type SignatureVerifier = TestSignatureVerifier;
	type WeightInfo = ();
	type MaxValidators = MaxValidators;
	type MinValidators = MinValidators;
	type MaxRegisteredChains = MaxRegisteredChains;
	type MaxClaimsPerSubmission = MaxClaimsPerSubmission;
	type MaxBlocksPerSubmission = MaxBlocksPerSubmission;
	type MaxNumberOfTransactions = MaxNumberOfTransactions;
	type TimeoutBlocksNumber = TimeoutBlocksNumber;
	type MinClaimBlockAge = MinClaimBlockAge;
	type MinNumberOfSignedBatches = MinNumberOfSignedBatches;
	type MaxRecordsPerCall = MaxRecordsPerCall;
}

pub const VALIDATORS: [u64; 5] = [1, 2, 3, 4, 5];
pub const QUORUM: [u64; 4] = [1, 2, 3, 4];
pub const NON_VALIDATOR: u64 = 42;

pub const CHAIN_A: ChainId = 1;
pub const CHAIN_B: ChainId = 2;
pub const CHAIN_C: ChainId = 3;

pub fn bounded<S: Get<u32>>(bytes: &[u8]) -> BoundedVec<u8, S> {
	bytes.to_vec().try_into().expect("test data fits its bound")
}

pub fn test_signature(key: &[u8], message: &H256) -> Vec<u8> {
	let mut signature = key.to_vec();
	signature.extend_from_slice(message.as_bytes());
	signature
}

pub fn chain_info(chain_id: ChainId) -> ChainInfo {
	ChainInfo {
		id: chain_id,
		chain_type: ChainType::Utxo,
		multisig_address: bounded(format!("multisig-{chain_id}").as_bytes()),
		fee_payer_address: bounded(format!("fee-payer-{chain_id}").as_bytes()),
	}
}

pub fn chain_key(validator: u64, chain_id: ChainId) -> ChainKey {
	bounded(format!("key-{validator}-{chain_id}").as_bytes())
}

/// Keys of the current validator set for `chain_id`.
pub fn validator_keys(chain_id: ChainId) -> Vec<(u64, ChainKey)> {
	Validators::<Test>::get().into_iter().map(|v| (v, chain_key(v, chain_id))).collect()
}

pub fn register_chain(chain_id: ChainId, native: Amount, wrapped: Amount) {
	assert_ok!(BridgeLedger::register_chain(
		RuntimeOrigin::root(),
		chain_info(chain_id),
		native,
		wrapped,
		validator_keys(chain_id),
	));
}

pub fn sign(validator: u64, proposal: &BatchProposal) -> BatchSignature {
	let key = chain_key(validator, proposal.destination_chain_id);
	bounded(&test_signature(&key, &proposal.payload_hash()))
}

pub fn run_to_block(n: u64) {
	System::set_block_number(n);
}

pub fn new_test_ext() -> sp_io::TestExternalities {
	let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

	pallet_bridge_ledger::GenesisConfig::<Test> { validators: VALIDATORS.to_vec() }
		.assimilate_storage(&mut t)
		.unwrap();

	let mut ext: sp_io::TestExternalities = t.into();
	ext.execute_with(|| System::set_block_number(1));
	ext
}
