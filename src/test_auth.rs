#![cfg(test)]
use soroban_sdk::{testutils::Address as _, token, vec, Address, Env, Vec};

use crate::{DistributionError, RewardDistribution, RewardDistributionClient};

/// Everything an unauthorized call must leave untouched.
#[derive(Debug, PartialEq)]
struct Snapshot {
    beneficiaries: Vec<Address>,
    balances: Vec<i128>,
    total: i128,
    lock: bool,
    held: i128,
    owner_tokens: i128,
}

fn snapshot(env: &Env, client: &RewardDistributionClient, owner: &Address) -> Snapshot {
    let token = client.get_token().unwrap();
    Snapshot {
        beneficiaries: client.get_beneficiaries(),
        balances: client.get_beneficiary_balances(),
        total: client.total_entitlements(),
        lock: client.lock_status(),
        held: client.held_balance(),
        owner_tokens: token::Client::new(env, &token).balance(owner),
    }
}

/// Funded ledger with one beneficiary holding 50 and claims disabled.
/// Returns (env, client, owner, beneficiary).
fn setup() -> (Env, RewardDistributionClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register_contract(None, RewardDistribution);
    let client = RewardDistributionClient::new(&env, &contract_id);
    let owner = Address::generate(&env);
    let token = env.register_stellar_asset_contract(Address::generate(&env));
    token::StellarAssetClient::new(&env, &token).mint(&owner, &1_000);
    client.initialize(&owner, &token);
    client.deposit(&owner, &400);
    let beneficiary = Address::generate(&env);
    client.add_beneficiary(&owner, &beneficiary, &50);
    (env, client, owner, beneficiary)
}

// ── wrong caller (auth satisfied, not the owner) ──────────────

#[test]
fn deposit_wrong_caller_no_mutation() {
    let (env, client, owner, _beneficiary) = setup();
    let attacker = Address::generate(&env);
    let before = snapshot(&env, &client, &owner);

    let result = client.try_deposit(&attacker, &10);
    assert_eq!(result, Err(Ok(DistributionError::Unauthorized)));
    assert_eq!(snapshot(&env, &client, &owner), before);
}

#[test]
fn add_beneficiary_wrong_caller_no_mutation() {
    let (env, client, owner, beneficiary) = setup();
    let attacker = Address::generate(&env);
    let before = snapshot(&env, &client, &owner);

    let result = client.try_add_beneficiary(&attacker, &beneficiary, &10);
    assert_eq!(result, Err(Ok(DistributionError::Unauthorized)));
    assert_eq!(snapshot(&env, &client, &owner), before);
}

#[test]
fn add_beneficiary_wrong_caller_checked_before_input() {
    let (env, client, owner, _beneficiary) = setup();
    let attacker = Address::generate(&env);

    // Zero amount from a non-owner reports the authorization failure.
    let result = client.try_add_beneficiary(&attacker, &owner, &0);
    assert_eq!(result, Err(Ok(DistributionError::Unauthorized)));
}

#[test]
fn add_beneficiaries_wrong_caller_no_mutation() {
    let (env, client, owner, beneficiary) = setup();
    let attacker = Address::generate(&env);
    let before = snapshot(&env, &client, &owner);

    let result = client.try_add_beneficiaries(
        &attacker,
        &vec![&env, beneficiary.clone(), attacker.clone()],
        &vec![&env, 10_i128, 110],
    );
    assert_eq!(result, Err(Ok(DistributionError::Unauthorized)));
    assert_eq!(snapshot(&env, &client, &owner), before);
}

#[test]
fn decrease_reward_wrong_caller_no_mutation() {
    let (env, client, owner, beneficiary) = setup();
    let attacker = Address::generate(&env);
    let before = snapshot(&env, &client, &owner);

    let result = client.try_decrease_reward(&attacker, &beneficiary, &30);
    assert_eq!(result, Err(Ok(DistributionError::Unauthorized)));
    assert_eq!(snapshot(&env, &client, &owner), before);
}

#[test]
fn emergency_withdraw_wrong_caller_no_mutation() {
    let (env, client, owner, _beneficiary) = setup();
    let attacker = Address::generate(&env);
    let before = snapshot(&env, &client, &owner);

    let result = client.try_emergency_withdraw(&attacker, &200);
    assert_eq!(result, Err(Ok(DistributionError::Unauthorized)));
    assert_eq!(snapshot(&env, &client, &owner), before);
}

#[test]
fn lock_rewards_wrong_caller_no_mutation() {
    let (env, client, owner, _beneficiary) = setup();
    let attacker = Address::generate(&env);
    let before = snapshot(&env, &client, &owner);

    let result = client.try_lock_rewards(&attacker, &true);
    assert_eq!(result, Err(Ok(DistributionError::Unauthorized)));
    assert_eq!(snapshot(&env, &client, &owner), before);
}

#[test]
fn beneficiary_cannot_run_owner_operations() {
    let (env, client, owner, beneficiary) = setup();
    let before = snapshot(&env, &client, &owner);

    assert_eq!(
        client.try_add_beneficiary(&beneficiary, &beneficiary, &1_000),
        Err(Ok(DistributionError::Unauthorized))
    );
    assert_eq!(
        client.try_lock_rewards(&beneficiary, &true),
        Err(Ok(DistributionError::Unauthorized))
    );
    assert_eq!(snapshot(&env, &client, &owner), before);
}

#[test]
fn claim_is_not_owner_gated() {
    let (_env, client, owner, beneficiary) = setup();
    client.lock_rewards(&owner, &true);

    assert_eq!(client.claim(&beneficiary), 50);
    assert_eq!(client.get_owner(), Some(owner));
}

// ── missing signatures ────────────────────────────────────────

#[test]
fn owner_operations_missing_auth_no_mutation() {
    let (env, client, owner, beneficiary) = setup();
    let before = snapshot(&env, &client, &owner);
    env.set_auths(&[]);

    assert!(client.try_deposit(&owner, &10).is_err());
    assert!(client.try_add_beneficiary(&owner, &beneficiary, &10).is_err());
    assert!(client
        .try_add_beneficiaries(&owner, &vec![&env, beneficiary.clone()], &vec![&env, 10_i128])
        .is_err());
    assert!(client.try_decrease_reward(&owner, &beneficiary, &10).is_err());
    assert!(client.try_emergency_withdraw(&owner, &10).is_err());
    assert!(client.try_lock_rewards(&owner, &true).is_err());
    assert_eq!(snapshot(&env, &client, &owner), before);
}

#[test]
fn claim_missing_auth_no_mutation() {
    let (env, client, owner, beneficiary) = setup();
    client.lock_rewards(&owner, &true);
    let before = snapshot(&env, &client, &owner);
    env.set_auths(&[]);

    assert!(client.try_claim(&beneficiary).is_err());
    assert_eq!(snapshot(&env, &client, &owner), before);
    assert_eq!(client.balance_of_beneficiary(&beneficiary), 50);
}

#[test]
fn initialize_missing_auth() {
    let env = Env::default();
    let contract_id = env.register_contract(None, RewardDistribution);
    let client = RewardDistributionClient::new(&env, &contract_id);
    let owner = Address::generate(&env);
    let token = Address::generate(&env);

    assert!(client.try_initialize(&owner, &token).is_err());
    assert!(client.get_owner().is_none());
}
