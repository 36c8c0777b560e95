#![cfg(test)]
//! Randomized operation sequences checked against a plain in-memory model.
use arbitrary::{Result as ArbResult, Unstructured};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use soroban_sdk::{testutils::Address as _, token, vec, Address, Env};

use crate::{DistributionError, RewardDistribution, RewardDistributionClient};

const HOLDERS: usize = 4;
const POOL: i128 = 10_000_000;
/// Withdraw and refill sizes are `amount * WITHDRAW_SCALE`, large enough to drain the pool.
const WITHDRAW_SCALE: i128 = 10_000;

/// Seeded byte stream so every run replays the same sequence.
fn seed_bytes(seed: u64) -> [u8; 2048] {
    let mut out = [0u8; 2048];
    StdRng::seed_from_u64(seed).fill_bytes(&mut out);
    out
}

struct Model {
    balances: [i128; HOLDERS],
    list_len: u32,
    lock: bool,
    held: i128,
    owner_tokens: i128,
}

impl Model {
    fn total(&self) -> i128 {
        self.balances.iter().sum()
    }
}

fn check(
    client: &RewardDistributionClient,
    owner: &Address,
    holders: &[Address; HOLDERS],
    model: &Model,
) {
    for (holder, expected) in holders.iter().zip(model.balances.iter()) {
        assert_eq!(client.balance_of_beneficiary(holder), *expected);
    }
    assert_eq!(client.total_entitlements(), model.total());
    assert_eq!(client.get_beneficiary_count(), model.list_len);
    assert_eq!(client.lock_status(), model.lock);
    assert_eq!(client.held_balance(), model.held);
    let token = client.get_token().unwrap();
    assert_eq!(
        token::Client::new(&client.env, &token).balance(owner),
        model.owner_tokens
    );
}

fn run_sequence(seed: u64) -> ArbResult<()> {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register_contract(None, RewardDistribution);
    let client = RewardDistributionClient::new(&env, &contract_id);
    let owner = Address::generate(&env);
    let token = env.register_stellar_asset_contract(Address::generate(&env));
    token::StellarAssetClient::new(&env, &token).mint(&owner, &(POOL * 2));
    client.initialize(&owner, &token);
    client.deposit(&owner, &POOL);

    let holders: [Address; HOLDERS] = [
        Address::generate(&env),
        Address::generate(&env),
        Address::generate(&env),
        Address::generate(&env),
    ];
    let mut model = Model {
        balances: [0; HOLDERS],
        list_len: 0,
        lock: false,
        held: POOL,
        owner_tokens: POOL,
    };

    let bytes = seed_bytes(seed);
    let mut u = Unstructured::new(&bytes);
    for _ in 0..64 {
        if u.is_empty() {
            break;
        }
        let idx = u.int_in_range(0..=(HOLDERS as u8 - 1))? as usize;
        let amount = u.int_in_range(1..=500u32)? as i128;
        match u.int_in_range(0..=8u8)? {
            0 => {
                client.add_beneficiary(&owner, &holders[idx], &amount);
                model.balances[idx] += amount;
                model.list_len += 1;
            }
            1 => {
                let other = (idx + 1) % HOLDERS;
                client.add_beneficiaries(
                    &owner,
                    &vec![&env, holders[idx].clone(), holders[other].clone()],
                    &vec![&env, amount, amount + 1],
                );
                model.balances[idx] += amount;
                model.balances[other] += amount + 1;
                model.list_len += 2;
            }
            2 => {
                let result = client.try_decrease_reward(&owner, &holders[idx], &amount);
                if amount > model.balances[idx] {
                    assert_eq!(result, Err(Ok(DistributionError::InsufficientBalance)));
                } else {
                    assert!(result.is_ok());
                    model.balances[idx] -= amount;
                }
            }
            3 => {
                let lock = u.arbitrary::<bool>()?;
                client.lock_rewards(&owner, &lock);
                model.lock = lock;
            }
            4 => {
                let result = client.try_claim(&holders[idx]);
                if !model.lock {
                    assert_eq!(result, Err(Ok(DistributionError::ClaimDisabled)));
                } else if model.balances[idx] == 0 {
                    assert_eq!(result, Err(Ok(DistributionError::ZeroBalance)));
                } else if model.held < model.balances[idx] {
                    assert_eq!(result, Err(Ok(DistributionError::TransferFailed)));
                } else {
                    assert_eq!(result, Ok(Ok(model.balances[idx])));
                    model.held -= model.balances[idx];
                    model.balances[idx] = 0;
                }
            }
            5 => {
                let withdraw = amount * WITHDRAW_SCALE;
                let result = client.try_emergency_withdraw(&owner, &withdraw);
                if withdraw > model.held {
                    assert_eq!(result, Err(Ok(DistributionError::TransferFailed)));
                } else {
                    assert!(result.is_ok());
                    model.held -= withdraw;
                    model.owner_tokens += withdraw;
                }
            }
            6 => {
                let refill = amount * WITHDRAW_SCALE;
                let result = client.try_deposit(&owner, &refill);
                if refill > model.owner_tokens {
                    assert_eq!(result, Err(Ok(DistributionError::TransferFailed)));
                } else {
                    assert!(result.is_ok());
                    model.held += refill;
                    model.owner_tokens -= refill;
                }
            }
            7 => {
                let other = (idx + 1) % HOLDERS;
                let result = client.try_add_beneficiaries(
                    &owner,
                    &vec![&env, holders[idx].clone(), holders[other].clone()],
                    &vec![&env, amount],
                );
                assert_eq!(result, Err(Ok(DistributionError::LengthMismatch)));
            }
            _ => {
                let attacker = &holders[idx];
                let result = client.try_add_beneficiary(attacker, attacker, &amount);
                assert_eq!(result, Err(Ok(DistributionError::Unauthorized)));
            }
        }
        check(&client, &owner, &holders, &model);
    }
    Ok(())
}

#[test]
fn outstanding_total_tracks_entitlements_across_random_sequences() -> ArbResult<()> {
    for seed in [1_u64, 7, 42, 1337, 0xdead_beef] {
        run_sequence(seed)?;
    }
    Ok(())
}

#[test]
fn claimed_tokens_match_entitlements_paid_out() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register_contract(None, RewardDistribution);
    let client = RewardDistributionClient::new(&env, &contract_id);
    let owner = Address::generate(&env);
    let token = env.register_stellar_asset_contract(Address::generate(&env));
    token::StellarAssetClient::new(&env, &token).mint(&owner, &POOL);
    client.initialize(&owner, &token);
    client.deposit(&owner, &1_000);

    let a = Address::generate(&env);
    let b = Address::generate(&env);
    client.add_beneficiaries(&owner, &vec![&env, a.clone(), b.clone()], &vec![&env, 300_i128, 200]);
    client.lock_rewards(&owner, &true);
    client.claim(&a);
    client.claim(&b);

    let asset = token::Client::new(&env, &token);
    assert_eq!(asset.balance(&a) + asset.balance(&b), 500);
    assert_eq!(client.held_balance(), 500);
    assert_eq!(client.total_entitlements(), 0);
}

#[test]
fn drained_pool_rejects_claims_until_refilled() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register_contract(None, RewardDistribution);
    let client = RewardDistributionClient::new(&env, &contract_id);
    let owner = Address::generate(&env);
    let token = env.register_stellar_asset_contract(Address::generate(&env));
    token::StellarAssetClient::new(&env, &token).mint(&owner, &1_000);
    client.initialize(&owner, &token);
    client.deposit(&owner, &300);

    let a = Address::generate(&env);
    let b = Address::generate(&env);
    client.add_beneficiaries(&owner, &vec![&env, a.clone(), b.clone()], &vec![&env, 100_i128, 150]);
    client.lock_rewards(&owner, &true);
    client.emergency_withdraw(&owner, &180);

    // 120 held: a can still be paid, b cannot.
    assert_eq!(client.claim(&a), 100);
    assert_eq!(
        client.try_claim(&b),
        Err(Ok(DistributionError::TransferFailed))
    );
    assert_eq!(client.balance_of_beneficiary(&b), 150);
    assert_eq!(client.total_entitlements(), 150);
    assert_eq!(client.held_balance(), 20);

    client.deposit(&owner, &130);
    assert_eq!(client.claim(&b), 150);
    assert_eq!(client.total_entitlements(), 0);
    assert_eq!(client.held_balance(), 0);
}
