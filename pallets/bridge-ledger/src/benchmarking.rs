//! Benchmarking setup for pallet-bridge-ledger
#![cfg(feature = "runtime-benchmarks")]

use super::*;
use crate::{fingerprint::Fingerprinted, Pallet as BridgeLedger};
use frame_benchmarking::v2::*;
use frame_support::{
	assert_ok,
	traits::{EnsureOrigin, Get},
};
use frame_system::{pallet_prelude::BlockNumberFor, RawOrigin};
use sp_core::H256;
use sp_runtime::traits::Saturating;
use sp_std::{vec, vec::Vec};

const SEED: u32 = 0;
const LIQUIDITY: Amount = 1_000_000_000_000;
const SOURCE: ChainId = 1;
const DESTINATION: ChainId = 2;

/// Replace the validator set with `count` fresh accounts and return them
fn setup_validators<T: Config>(count: u32) -> Vec<T::AccountId> {
	let validators: Vec<T::AccountId> = (0..count).map(|i| account("validator", i, SEED)).collect();
	Validators::<T>::put(&validators);
	validators
}

fn bench_key(index: u32, chain_id: ChainId) -> ChainKey {
	let mut key = b"bench-key-".to_vec();
	key.extend_from_slice(&index.to_le_bytes());
	key.push(chain_id);
	ChainKey::truncate_from(key)
}

fn bench_chain(chain_id: ChainId) -> ChainInfo {
	ChainInfo {
		id: chain_id,
		chain_type: ChainType::Utxo,
		multisig_address: Address::truncate_from(vec![chain_id; 32]),
		fee_payer_address: Address::truncate_from(vec![chain_id.saturating_add(100); 32]),
	}
}

fn admin_origin<T: Config>() -> Result<T::RuntimeOrigin, BenchmarkError> {
	T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)
}

/// Register `chain_id` with a key for every validator in `validators`
fn setup_chain<T: Config>(
	chain_id: ChainId,
	validators: &[T::AccountId],
) -> Result<(), BenchmarkError> {
	let keys = validators
		.iter()
		.enumerate()
		.map(|(i, validator)| (validator.clone(), bench_key(i as u32, chain_id)))
		.collect();
	assert_ok!(BridgeLedger::<T>::register_chain(
		admin_origin::<T>()?,
		bench_chain(chain_id),
		LIQUIDITY,
		LIQUIDITY,
		keys,
	));
	Ok(())
}

fn bridging_claim(index: u32) -> Claim {
	let receiver = Receiver {
		amount: 1_000,
		dest_address: Address::truncate_from(vec![7u8; 32]),
		wrapped_amount: 0,
		colored_coin: None,
	};
	Claim::BridgingRequest(BridgingRequestClaim {
		observed_tx_hash: H256::from_low_u64_be(index as u64 + 1),
		receivers: Receivers::truncate_from(vec![receiver]),
		total_amount: 1_000,
		total_wrapped_amount: 0,
		retry_counter: 0,
		source_chain_id: SOURCE,
		destination_chain_id: DESTINATION,
	})
}

/// Confirm `count` bridging requests towards `DESTINATION` with the votes of `voters`
fn queue_transfers<T: Config>(voters: &[T::AccountId], count: u32) {
	let per_submission = T::MaxClaimsPerSubmission::get();
	let mut queued = 0;
	while queued < count {
		let end = count.min(queued.saturating_add(per_submission));
		let claims: Vec<Claim> = (queued..end).map(bridging_claim).collect();
		queued += claims.len() as u32;
		for voter in voters {
			assert_ok!(BridgeLedger::<T>::submit_claims(
				RawOrigin::Signed(voter.clone()).into(),
				claims.clone(),
			));
		}
	}
}

fn advance_blocks<T: Config>(blocks: BlockNumberFor<T>) {
	let now = frame_system::Pallet::<T>::block_number();
	frame_system::Pallet::<T>::set_block_number(now.saturating_add(blocks));
}

/// Smallest validator set with `MinValidators` members and one registered chain, plus a
/// proposal adding `added` validators
fn setup_validator_set_proposal<T: Config>(
	added: u32,
) -> Result<(Vec<T::AccountId>, ValidatorSetProposal<T::AccountId>), BenchmarkError> {
	let validators = setup_validators::<T>(T::MinValidators::get());
	setup_chain::<T>(SOURCE, &validators)?;
	let added = (0..added)
		.map(|i| NewValidator {
			account: account("candidate", i, SEED),
			keys: vec![(SOURCE, bench_key(1_000 + i, SOURCE))],
		})
		.collect();
	Ok((validators, ValidatorSetProposal { added, removed: Vec::new() }))
}

#[benchmarks]
mod benchmarks {
	use super::*;

	#[benchmark]
	fn submit_claims(
		c: Linear<1, { T::MaxClaimsPerSubmission::get() }>,
	) -> Result<(), BenchmarkError> {
		// A single validator confirms every claim with its own vote.
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(SOURCE, &validators)?;
		setup_chain::<T>(DESTINATION, &validators)?;
		let claims: Vec<Claim> = (0..c).map(bridging_claim).collect();

		#[extrinsic_call]
		_(RawOrigin::Signed(validators[0].clone()), claims);

		assert_eq!(BatchWindows::<T>::get(DESTINATION).last_confirmed_tx_nonce, c as u64);
		Ok(())
	}

	#[benchmark]
	fn submit_signed_batch() -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(T::MaxValidators::get());
		setup_chain::<T>(SOURCE, &validators)?;
		setup_chain::<T>(DESTINATION, &validators)?;
		let quorum = BridgeLedger::<T>::quorum_count() as usize;
		queue_transfers::<T>(&validators[..quorum], 1);
		advance_blocks::<T>(T::TimeoutBlocksNumber::get());

		let proposal = BatchProposal {
			id: 1,
			destination_chain_id: DESTINATION,
			first_tx_nonce_id: 1,
			last_tx_nonce_id: 1,
			raw_transaction: RawTransaction::truncate_from(vec![0u8; 1024]),
			is_consolidation: false,
		};
		let signature_of = |index: usize| {
			BatchSignature::truncate_from(T::SignatureVerifier::benchmark_signature(
				&bench_key(index as u32, DESTINATION),
				&proposal.payload_hash(),
			))
		};
		for (index, validator) in validators.iter().enumerate().take(quorum - 1) {
			assert_ok!(BridgeLedger::<T>::submit_signed_batch(
				RawOrigin::Signed(validator.clone()).into(),
				proposal.clone(),
				signature_of(index),
			));
		}
		let last_signer = validators[quorum - 1].clone();
		let signature = signature_of(quorum - 1);

		#[extrinsic_call]
		_(RawOrigin::Signed(last_signer), proposal.clone(), signature);

		assert!(ConfirmedSignedBatches::<T>::contains_key(DESTINATION, 1));
		assert!(!PendingBatches::<T>::contains_key(proposal.fingerprint()));
		Ok(())
	}

	#[benchmark]
	fn submit_last_observed_blocks(
		b: Linear<1, { T::MaxBlocksPerSubmission::get() }>,
	) -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(SOURCE, &validators)?;
		let blocks: Vec<ObservedBlock> = (1..=b as u64)
			.map(|slot| ObservedBlock { slot, hash: H256::from_low_u64_be(slot) })
			.collect();

		#[extrinsic_call]
		_(RawOrigin::Signed(validators[0].clone()), SOURCE, blocks);

		assert_eq!(LastObservedBlock::<T>::get(SOURCE).map(|block| block.slot), Some(b as u64));
		Ok(())
	}

	#[benchmark]
	fn register_chain(v: Linear<1, { T::MaxValidators::get() }>) -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(v);
		let keys: Vec<(T::AccountId, ChainKey)> = validators
			.iter()
			.enumerate()
			.map(|(i, validator)| (validator.clone(), bench_key(i as u32, SOURCE)))
			.collect();
		let origin = admin_origin::<T>()?;

		#[extrinsic_call]
		_(origin as T::RuntimeOrigin, bench_chain(SOURCE), LIQUIDITY, LIQUIDITY, keys);

		assert!(Chains::<T>::contains_key(SOURCE));
		assert_eq!(TokenQuantity::<T>::get(SOURCE, TokenClass::Native), LIQUIDITY);
		Ok(())
	}

	#[benchmark]
	fn register_chain_governance() -> Result<(), BenchmarkError> {
		// Registration needs every validator; the measured vote is the last one.
		let validators = setup_validators::<T>(T::MaxValidators::get());
		let (last, earlier) = validators.split_last().ok_or(BenchmarkError::Weightless)?;
		for (i, validator) in earlier.iter().enumerate() {
			assert_ok!(BridgeLedger::<T>::register_chain_governance(
				RawOrigin::Signed(validator.clone()).into(),
				bench_chain(SOURCE),
				LIQUIDITY,
				LIQUIDITY,
				bench_key(i as u32, SOURCE),
			));
		}
		let key = bench_key(earlier.len() as u32, SOURCE);

		#[extrinsic_call]
		_(RawOrigin::Signed(last.clone()), bench_chain(SOURCE), LIQUIDITY, LIQUIDITY, key);

		assert!(Chains::<T>::contains_key(SOURCE));
		assert_eq!(ValidatorChainData::<T>::iter_prefix(SOURCE).count(), validators.len());
		Ok(())
	}

	#[benchmark]
	fn submit_new_validator_set(
		n: Linear<0, { T::MaxValidators::get() - T::MinValidators::get() }>,
	) -> Result<(), BenchmarkError> {
		let (validators, proposal) = setup_validator_set_proposal::<T>(n)?;
		let quorum = BridgeLedger::<T>::quorum_count() as usize;
		for validator in validators.iter().take(quorum - 1) {
			assert_ok!(BridgeLedger::<T>::submit_new_validator_set(
				RawOrigin::Signed(validator.clone()).into(),
				proposal.clone(),
			));
		}

		#[extrinsic_call]
		_(RawOrigin::Signed(validators[quorum - 1].clone()), proposal);

		assert!(ValidatorSetState::<T>::get().is_pending());
		Ok(())
	}

	#[benchmark]
	fn confirm_validator_set_on_chain() -> Result<(), BenchmarkError> {
		let added = T::MaxValidators::get() - T::MinValidators::get();
		let (validators, proposal) = setup_validator_set_proposal::<T>(added)?;
		let quorum = BridgeLedger::<T>::quorum_count() as usize;
		for validator in validators.iter().take(quorum) {
			assert_ok!(BridgeLedger::<T>::submit_new_validator_set(
				RawOrigin::Signed(validator.clone()).into(),
				proposal.clone(),
			));
		}
		for validator in validators.iter().take(quorum - 1) {
			assert_ok!(BridgeLedger::<T>::confirm_validator_set_on_chain(
				RawOrigin::Signed(validator.clone()).into(),
				SOURCE,
			));
		}

		#[extrinsic_call]
		_(RawOrigin::Signed(validators[quorum - 1].clone()), SOURCE);

		assert!(matches!(ValidatorSetState::<T>::get(), ValidatorSetStatus::Activated { .. }));
		assert_eq!(Validators::<T>::get().len(), validators.len() + added as usize);
		Ok(())
	}

	#[benchmark]
	fn defund() -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(SOURCE, &validators)?;
		let origin = admin_origin::<T>()?;

		#[extrinsic_call]
		_(
			origin as T::RuntimeOrigin,
			SOURCE,
			TokenClass::Native,
			1_000,
			Address::truncate_from(vec![9u8; 32]),
		);

		assert_eq!(TokenQuantity::<T>::get(SOURCE, TokenClass::Native), LIQUIDITY - 1_000);
		Ok(())
	}

	#[benchmark]
	fn redistribute_tokens() -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(SOURCE, &validators)?;
		let origin = admin_origin::<T>()?;

		#[extrinsic_call]
		_(origin as T::RuntimeOrigin, SOURCE);

		assert_eq!(BatchWindows::<T>::get(SOURCE).last_confirmed_tx_nonce, 1);
		Ok(())
	}

	#[benchmark]
	fn stake_operation() -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(SOURCE, &validators)?;
		let origin = admin_origin::<T>()?;
		let pool_id = PoolId::truncate_from(vec![3u8; MAX_POOL_ID_LENGTH as usize]);

		#[extrinsic_call]
		_(origin as T::RuntimeOrigin, SOURCE, StakeOperation::Delegation, pool_id);

		assert_eq!(BatchWindows::<T>::get(SOURCE).last_confirmed_tx_nonce, 1);
		Ok(())
	}

	#[benchmark]
	fn rescale_unbatched_amounts(
		n: Linear<1, { T::MaxRecordsPerCall::get() }>,
	) -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(SOURCE, &validators)?;
		setup_chain::<T>(DESTINATION, &validators)?;
		queue_transfers::<T>(&validators, n);
		let origin = admin_origin::<T>()?;

		#[extrinsic_call]
		_(origin as T::RuntimeOrigin, DESTINATION, 1_000);

		assert!(AmountsRescaled::<T>::get(DESTINATION));
		assert_eq!(
			ConfirmedTransactions::<T>::get(DESTINATION, 1).map(|tx| tx.total_amount),
			Some(1_000_000)
		);
		Ok(())
	}

	#[benchmark]
	fn prune_votes(n: Linear<1, { T::MaxRecordsPerCall::get() }>) -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(SOURCE, &validators)?;
		let range = n as u64;
		let per_submission = T::MaxClaimsPerSubmission::get() as u64;
		let mut submitted = 0u64;
		while submitted < range {
			let claims: Vec<Claim> = (submitted..(submitted + per_submission).min(range))
				.map(|i| {
					Claim::HotWalletIncrement(HotWalletIncrementClaim {
						chain_id: SOURCE,
						amount: i as Amount + 1,
					})
				})
				.collect();
			submitted += claims.len() as u64;
			assert_ok!(BridgeLedger::<T>::submit_claims(
				RawOrigin::Signed(validators[0].clone()).into(),
				claims,
			));
		}
		advance_blocks::<T>(T::MinClaimBlockAge::get());
		let origin = admin_origin::<T>()?;

		#[extrinsic_call]
		prune_claims(origin as T::RuntimeOrigin, range - 1, T::MinClaimBlockAge::get());

		assert_eq!(NextUnprunedVoteIndex::<T>::get(VoteCategory::Claims), range);
		Ok(())
	}

	#[benchmark]
	fn prune_confirmed_signed_batches(
		n: Linear<1, { T::MaxRecordsPerCall::get() }>,
	) -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(DESTINATION, &validators)?;
		let range = n as u64;
		let now = frame_system::Pallet::<T>::block_number();
		for batch_id in 1..=range {
			ConfirmedSignedBatches::<T>::insert(
				DESTINATION,
				batch_id,
				ConfirmedSignedBatch {
					proposal: BatchProposal {
						id: batch_id,
						destination_chain_id: DESTINATION,
						first_tx_nonce_id: batch_id,
						last_tx_nonce_id: batch_id,
						raw_transaction: RawTransaction::truncate_from(vec![0u8; 256]),
						is_consolidation: false,
					},
					signatures: Vec::new(),
					status: BatchStatus::Executed,
					confirmed_at: now,
				},
			);
		}
		LastConfirmedBatchId::<T>::insert(
			DESTINATION,
			range.saturating_add(T::MinNumberOfSignedBatches::get()),
		);
		advance_blocks::<T>(T::MinClaimBlockAge::get());
		let origin = admin_origin::<T>()?;

		#[extrinsic_call]
		_(origin as T::RuntimeOrigin, DESTINATION, range);

		assert_eq!(LastPrunedBatchId::<T>::get(DESTINATION), range);
		assert!(!ConfirmedSignedBatches::<T>::contains_key(DESTINATION, 1));
		Ok(())
	}

	#[benchmark]
	fn prune_confirmed_transactions(
		n: Linear<1, { T::MaxRecordsPerCall::get() }>,
	) -> Result<(), BenchmarkError> {
		let validators = setup_validators::<T>(1);
		setup_chain::<T>(SOURCE, &validators)?;
		let range = n as u64;
		let origin = admin_origin::<T>()?;
		for _ in 0..range {
			assert_ok!(BridgeLedger::<T>::redistribute_tokens(origin.clone(), SOURCE));
		}
		BatchWindows::<T>::mutate(SOURCE, |window| {
			window.last_batched_tx_nonce = window.last_confirmed_tx_nonce;
			window.next_timeout_block = None;
		});
		advance_blocks::<T>(T::MinClaimBlockAge::get());

		#[extrinsic_call]
		_(origin as T::RuntimeOrigin, SOURCE, range);

		assert_eq!(LastPrunedTxNonce::<T>::get(SOURCE), range);
		assert!(ConfirmedTransactions::<T>::get(SOURCE, range).is_none());
		Ok(())
	}

	impl_benchmark_test_suite!(BridgeLedger, crate::mock::new_test_ext(), crate::mock::Test);
}
