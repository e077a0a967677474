#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]

use frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use sp_std::marker::PhantomData;

/// Weight functions needed for pallet_bridge_ledger.
pub trait WeightInfo {
    fn submit_claims(c: u32) -> Weight;
    fn submit_signed_batch() -> Weight;
    fn submit_last_observed_blocks(b: u32) -> Weight;
    fn register_chain(v: u32) -> Weight;
    fn register_chain_governance() -> Weight;
    fn submit_new_validator_set(n: u32) -> Weight;
    fn confirm_validator_set_on_chain() -> Weight;
    fn defund() -> Weight;
    fn redistribute_tokens() -> Weight;
    fn stake_operation() -> Weight;
    fn rescale_unbatched_amounts(n: u32) -> Weight;
    fn prune_votes(n: u32) -> Weight;
    fn prune_confirmed_signed_batches(n: u32) -> Weight;
    fn prune_confirmed_transactions(n: u32) -> Weight;
}

/// Default weights for pallet_bridge_ledger
pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: frame_system::Config> WeightInfo for SubstrateWeight<T> {
    /// Per claim: vote record, batch window, liquidity of two chains, queue entry.
    fn submit_claims(c: u32) -> Weight {
        Weight::from_parts(12_000, 0)
            .saturating_add(Weight::from_parts(40_000, 0).saturating_mul(c.into()))
            .saturating_add(T::DbWeight::get().reads(1))
            .saturating_add(T::DbWeight::get().reads(6_u64.saturating_mul(c.into())))
            .saturating_add(T::DbWeight::get().writes(6_u64.saturating_mul(c.into())))
    }

    fn submit_signed_batch() -> Weight {
        Weight::from_parts(60_000, 0)
            .saturating_add(T::DbWeight::get().reads(10))
            .saturating_add(T::DbWeight::get().writes(8))
    }

    fn submit_last_observed_blocks(b: u32) -> Weight {
        Weight::from_parts(10_000, 0)
            .saturating_add(Weight::from_parts(15_000, 0).saturating_mul(b.into()))
            .saturating_add(T::DbWeight::get().reads(2))
            .saturating_add(T::DbWeight::get().reads(3_u64.saturating_mul(b.into())))
            .saturating_add(T::DbWeight::get().writes(3_u64.saturating_mul(b.into())))
    }

    fn register_chain(v: u32) -> Weight {
        Weight::from_parts(20_000, 0)
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().writes(6))
            .saturating_add(T::DbWeight::get().writes(v.into()))
    }

    fn register_chain_governance() -> Weight {
        Weight::from_parts(30_000, 0)
            .saturating_add(T::DbWeight::get().reads(6))
            .saturating_add(T::DbWeight::get().writes(6))
    }

    fn submit_new_validator_set(n: u32) -> Weight {
        Weight::from_parts(25_000, 0)
            .saturating_add(Weight::from_parts(5_000, 0).saturating_mul(n.into()))
            .saturating_add(T::DbWeight::get().reads(6))
            .saturating_add(T::DbWeight::get().writes(4))
    }

    fn confirm_validator_set_on_chain() -> Weight {
        Weight::from_parts(30_000, 0)
            .saturating_add(T::DbWeight::get().reads(6))
            .saturating_add(T::DbWeight::get().writes(6))
    }

    fn defund() -> Weight {
        Weight::from_parts(15_000, 0)
            .saturating_add(T::DbWeight::get().reads(3))
            .saturating_add(T::DbWeight::get().writes(3))
    }

    fn redistribute_tokens() -> Weight {
        Weight::from_parts(10_000, 0)
            .saturating_add(T::DbWeight::get().reads(2))
            .saturating_add(T::DbWeight::get().writes(2))
    }

    fn stake_operation() -> Weight {
        Weight::from_parts(10_000, 0)
            .saturating_add(T::DbWeight::get().reads(2))
            .saturating_add(T::DbWeight::get().writes(2))
    }

    fn rescale_unbatched_amounts(n: u32) -> Weight {
        Weight::from_parts(15_000, 0)
            .saturating_add(Weight::from_parts(8_000, 0).saturating_mul(n.into()))
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().reads(n.into()))
            .saturating_add(T::DbWeight::get().writes(1))
            .saturating_add(T::DbWeight::get().writes(n.into()))
    }

    /// Per record: index entry, vote record, and for signed batches the proposal and its
    /// signatures.
    fn prune_votes(n: u32) -> Weight {
        Weight::from_parts(20_000, 0)
            .saturating_add(Weight::from_parts(12_000, 0).saturating_mul(n.into()))
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().reads(3_u64.saturating_mul(n.into())))
            .saturating_add(T::DbWeight::get().writes(1))
            .saturating_add(T::DbWeight::get().writes(4_u64.saturating_mul(n.into())))
    }

    fn prune_confirmed_signed_batches(n: u32) -> Weight {
        Weight::from_parts(20_000, 0)
            .saturating_add(Weight::from_parts(3_000, 0).saturating_mul(n.into()))
            .saturating_add(T::DbWeight::get().reads(5))
            .saturating_add(T::DbWeight::get().writes(1))
            .saturating_add(T::DbWeight::get().writes(n.into()))
    }

    fn prune_confirmed_transactions(n: u32) -> Weight {
        Weight::from_parts(20_000, 0)
            .saturating_add(Weight::from_parts(3_000, 0).saturating_mul(n.into()))
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().writes(1))
            .saturating_add(T::DbWeight::get().writes(n.into()))
    }
}

impl WeightInfo for () {
    fn submit_claims(c: u32) -> Weight {
        Weight::from_parts(12_000, 0)
            .saturating_add(Weight::from_parts(40_000, 0).saturating_mul(c.into()))
    }

    fn submit_signed_batch() -> Weight {
        Weight::from_parts(60_000, 0)
    }

    fn submit_last_observed_blocks(b: u32) -> Weight {
        Weight::from_parts(10_000, 0)
            .saturating_add(Weight::from_parts(15_000, 0).saturating_mul(b.into()))
    }

    fn register_chain(_v: u32) -> Weight {
        Weight::from_parts(20_000, 0)
    }

    fn register_chain_governance() -> Weight {
        Weight::from_parts(30_000, 0)
    }

    fn submit_new_validator_set(_n: u32) -> Weight {
        Weight::from_parts(25_000, 0)
    }

    fn confirm_validator_set_on_chain() -> Weight {
        Weight::from_parts(30_000, 0)
    }

    fn defund() -> Weight {
        Weight::from_parts(15_000, 0)
    }

    fn redistribute_tokens() -> Weight {
        Weight::from_parts(10_000, 0)
    }

    fn stake_operation() -> Weight {
        Weight::from_parts(10_000, 0)
    }

    fn rescale_unbatched_amounts(n: u32) -> Weight {
        Weight::from_parts(15_000, 0)
            .saturating_add(Weight::from_parts(8_000, 0).saturating_mul(n.into()))
    }

    fn prune_votes(n: u32) -> Weight {
        Weight::from_parts(20_000, 0)
            .saturating_add(Weight::from_parts(12_000, 0).saturating_mul(n.into()))
    }

    fn prune_confirmed_signed_batches(n: u32) -> Weight {
        Weight::from_parts(20_000, 0)
            .saturating_add(Weight::from_parts(3_000, 0).saturating_mul(n.into()))
    }

    fn prune_confirmed_transactions(n: u32) -> Weight {
        Weight::from_parts(20_000, 0)
            .saturating_add(Weight::from_parts(3_000, 0).saturating_mul(n.into()))
    }
}
