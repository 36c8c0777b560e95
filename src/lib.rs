#![no_std]
#![deny(unsafe_code)]
#![deny(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env, Map,
    Symbol, Vec,
};

/// Centralized contract error codes. Auth failures are signaled by host panic (require_auth).
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum DistributionError {
    /// Contract is not initialized (owner not set).
    NotInitialized = 1,
    /// `initialize` was already called.
    AlreadyInitialized = 2,
    /// Caller is not the owner.
    Unauthorized = 3,
    /// Beneficiary is the null identity (this contract) or amount is not positive.
    InvalidInput = 4,
    /// Batch beneficiaries and amounts have different lengths.
    LengthMismatch = 5,
    /// Decrease amount exceeds the beneficiary's entitlement.
    InsufficientBalance = 6,
    /// Claims are currently disabled by the lock gate.
    ClaimDisabled = 7,
    /// Claimant has nothing to claim.
    ZeroBalance = 8,
    /// The token contract rejected the transfer.
    TransferFailed = 9,
    /// Entitlement arithmetic would overflow i128.
    Overflow = 10,
}

// ── Event symbols ────────────────────────────────────────────
const EVENT_INIT: Symbol = symbol_short!("init");
const EVENT_DEPOSIT: Symbol = symbol_short!("deposit");
const EVENT_REWARD_ADD: Symbol = symbol_short!("rwd_add");
const EVENT_REWARD_ADD_BATCH: Symbol = symbol_short!("rwd_addb");
const EVENT_REWARD_DECREASE: Symbol = symbol_short!("rwd_dec");
const EVENT_LOCK_SET: Symbol = symbol_short!("lock_set");
const EVENT_CLAIM: Symbol = symbol_short!("claim");
const EVENT_EMERGENCY_WITHDRAW: Symbol = symbol_short!("emrg_wd");

// ── Data structures ──────────────────────────────────────────
/// Contract version identifier. Bumped when storage or semantics change.
pub const CONTRACT_VERSION: u32 = 1;

/// Maximum number of beneficiary entries returned in a single page.
const MAX_PAGE_LIMIT: u32 = 20;

/// Storage keys. The beneficiary list uses BeneficiaryCount/BeneficiaryAt so it can be
/// enumerated in insertion order; entries are never removed and may repeat.
#[contracttype]
pub enum DataKey {
    /// Owner address; the only identity allowed to run administrative operations.
    Owner,
    /// Token contract holding the pooled asset.
    Token,
    /// Claim gate. true = claims enabled, false = claims disabled.
    LockStatus,
    /// Current entitlement of a beneficiary.
    Entitlement(Address),
    /// Number of entries in the ordered beneficiary list.
    BeneficiaryCount,
    /// Beneficiary at a list index.
    BeneficiaryAt(u32),
    /// Sum of all current entitlements.
    TotalEntitlements,
}

// ── Contract ─────────────────────────────────────────────────
#[contract]
pub struct RewardDistribution;

#[contractimpl]
impl RewardDistribution {
    /// Load the owner, failing if the contract was never initialized.
    fn get_stored_owner(env: &Env) -> Result<Address, DistributionError> {
        env.storage()
            .persistent()
            .get(&DataKey::Owner)
            .ok_or(DistributionError::NotInitialized)
    }

    fn token_client(env: &Env) -> Result<token::Client<'_>, DistributionError> {
        let token: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Token)
            .ok_or(DistributionError::NotInitialized)?;
        Ok(token::Client::new(env, &token))
    }

    /// Authorization guard. Must be the first call of every owner-only entrypoint.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), DistributionError> {
        caller.require_auth();
        let owner = Self::get_stored_owner(env)?;
        if *caller != owner {
            return Err(DistributionError::Unauthorized);
        }
        Ok(())
    }

    fn require_valid_amount(amount: i128) -> Result<(), DistributionError> {
        if amount <= 0 {
            return Err(DistributionError::InvalidInput);
        }
        Ok(())
    }

    /// The contract's own address stands in for the null identity: an entitlement
    /// assigned to it could never be claimed.
    fn require_valid_beneficiary(
        env: &Env,
        beneficiary: &Address,
    ) -> Result<(), DistributionError> {
        if *beneficiary == env.current_contract_address() {
            return Err(DistributionError::InvalidInput);
        }
        Ok(())
    }

    fn read_entitlement(env: &Env, beneficiary: &Address) -> i128 {
        let key = DataKey::Entitlement(beneficiary.clone());
        env.storage().persistent().get(&key).unwrap_or(0)
    }

    fn write_entitlement(env: &Env, beneficiary: &Address, amount: i128) {
        let key = DataKey::Entitlement(beneficiary.clone());
        env.storage().persistent().set(&key, &amount);
    }

    fn read_total(env: &Env) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::TotalEntitlements)
            .unwrap_or(0)
    }

    fn write_total(env: &Env, total: i128) {
        env.storage()
            .persistent()
            .set(&DataKey::TotalEntitlements, &total);
    }

    fn append_beneficiary(env: &Env, beneficiary: &Address) {
        let count = Self::get_beneficiary_count(env.clone());
        env.storage()
            .persistent()
            .set(&DataKey::BeneficiaryAt(count), beneficiary);
        env.storage()
            .persistent()
            .set(&DataKey::BeneficiaryCount, &(count + 1));
    }

    /// Transfer through the token contract, mapping any failure to `TransferFailed`.
    fn transfer_or_fail(
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), DistributionError> {
        let client = Self::token_client(env)?;
        match client.try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(DistributionError::TransferFailed),
        }
    }

    // ── Initialization ────────────────────────────────────────

    /// Set the owner and the distributed token. Can only be called once.
    /// Claims start disabled.
    pub fn initialize(env: Env, owner: Address, token: Address) -> Result<(), DistributionError> {
        if env.storage().persistent().has(&DataKey::Owner) {
            return Err(DistributionError::AlreadyInitialized);
        }
        Self::require_valid_beneficiary(&env, &owner)?;
        owner.require_auth();

        env.storage().persistent().set(&DataKey::Owner, &owner);
        env.storage().persistent().set(&DataKey::Token, &token);
        env.storage().persistent().set(&DataKey::LockStatus, &false);
        env.events().publish((EVENT_INIT, owner), token);
        Ok(())
    }

    // ── Pool accounting ───────────────────────────────────────

    /// Move `amount` of the token from the owner into the pool.
    pub fn deposit(env: Env, caller: Address, amount: i128) -> Result<(), DistributionError> {
        Self::require_owner(&env, &caller)?;
        Self::require_valid_amount(amount)?;

        let contract_addr = env.current_contract_address();
        Self::transfer_or_fail(&env, &caller, &contract_addr, amount)?;

        env.events().publish((EVENT_DEPOSIT, caller), amount);
        Ok(())
    }

    /// Return `amount` from the pool to the owner, ignoring outstanding entitlements.
    /// The pool may end up holding less than `total_entitlements`.
    pub fn emergency_withdraw(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), DistributionError> {
        Self::require_owner(&env, &caller)?;
        Self::require_valid_amount(amount)?;

        let contract_addr = env.current_contract_address();
        Self::transfer_or_fail(&env, &contract_addr, &caller, amount)?;

        env.events()
            .publish((EVENT_EMERGENCY_WITHDRAW, caller), amount);
        Ok(())
    }

    // ── Beneficiary table ─────────────────────────────────────

    /// Increase `beneficiary`'s entitlement by `amount` and append it to the
    /// beneficiary list. No tokens move; the pool is expected to be funded already.
    pub fn add_beneficiary(
        env: Env,
        caller: Address,
        beneficiary: Address,
        amount: i128,
    ) -> Result<(), DistributionError> {
        Self::require_owner(&env, &caller)?;
        Self::require_valid_beneficiary(&env, &beneficiary)?;
        Self::require_valid_amount(amount)?;

        let balance = Self::read_entitlement(&env, &beneficiary)
            .checked_add(amount)
            .ok_or(DistributionError::Overflow)?;
        let total = Self::read_total(&env)
            .checked_add(amount)
            .ok_or(DistributionError::Overflow)?;

        Self::write_entitlement(&env, &beneficiary, balance);
        Self::write_total(&env, total);
        Self::append_beneficiary(&env, &beneficiary);

        env.events()
            .publish((EVENT_REWARD_ADD, beneficiary), (amount, true));
        Ok(())
    }

    /// Batch form of `add_beneficiary`. Every pair is validated and staged before
    /// anything is written, so one bad pair rejects the whole batch.
    /// A beneficiary listed more than once accumulates and is appended once per entry.
    pub fn add_beneficiaries(
        env: Env,
        caller: Address,
        beneficiaries: Vec<Address>,
        amounts: Vec<i128>,
    ) -> Result<(), DistributionError> {
        Self::require_owner(&env, &caller)?;
        if beneficiaries.len() != amounts.len() {
            return Err(DistributionError::LengthMismatch);
        }

        let mut staged: Map<Address, i128> = Map::new(&env);
        let mut total = Self::read_total(&env);
        for (beneficiary, amount) in beneficiaries.iter().zip(amounts.iter()) {
            Self::require_valid_beneficiary(&env, &beneficiary)?;
            Self::require_valid_amount(amount)?;

            let current = match staged.get(beneficiary.clone()) {
                Some(balance) => balance,
                None => Self::read_entitlement(&env, &beneficiary),
            };
            let next = current
                .checked_add(amount)
                .ok_or(DistributionError::Overflow)?;
            staged.set(beneficiary, next);
            total = total
                .checked_add(amount)
                .ok_or(DistributionError::Overflow)?;
        }

        for (beneficiary, balance) in staged.iter() {
            Self::write_entitlement(&env, &beneficiary, balance);
        }
        for beneficiary in beneficiaries.iter() {
            Self::append_beneficiary(&env, &beneficiary);
        }
        Self::write_total(&env, total);

        env.events()
            .publish((EVENT_REWARD_ADD_BATCH,), (beneficiaries, amounts, true));
        Ok(())
    }

    /// Reduce `beneficiary`'s entitlement by `amount`. The list entry stays.
    pub fn decrease_reward(
        env: Env,
        caller: Address,
        beneficiary: Address,
        amount: i128,
    ) -> Result<(), DistributionError> {
        Self::require_owner(&env, &caller)?;
        Self::require_valid_beneficiary(&env, &beneficiary)?;
        Self::require_valid_amount(amount)?;

        let balance = Self::read_entitlement(&env, &beneficiary);
        if amount > balance {
            return Err(DistributionError::InsufficientBalance);
        }

        Self::write_entitlement(&env, &beneficiary, balance - amount);
        Self::write_total(&env, Self::read_total(&env) - amount);

        env.events()
            .publish((EVENT_REWARD_DECREASE, beneficiary), amount);
        Ok(())
    }

    // ── Claim gate ────────────────────────────────────────────

    /// Set the claim gate. `true` enables claims, `false` disables them.
    pub fn lock_rewards(env: Env, caller: Address, lock: bool) -> Result<(), DistributionError> {
        Self::require_owner(&env, &caller)?;
        env.storage().persistent().set(&DataKey::LockStatus, &lock);
        env.events().publish((EVENT_LOCK_SET,), lock);
        Ok(())
    }

    /// Pay out the claimant's whole entitlement. Returns the amount transferred.
    ///
    /// The entitlement is zeroed before the token call; if the transfer fails it is
    /// restored and the claim fails with `TransferFailed`.
    pub fn claim(env: Env, claimant: Address) -> Result<i128, DistributionError> {
        claimant.require_auth();

        if !Self::lock_status(env.clone()) {
            return Err(DistributionError::ClaimDisabled);
        }

        let amount = Self::read_entitlement(&env, &claimant);
        if amount == 0 {
            return Err(DistributionError::ZeroBalance);
        }

        let total = Self::read_total(&env);
        Self::write_entitlement(&env, &claimant, 0);
        Self::write_total(&env, total - amount);

        let contract_addr = env.current_contract_address();
        if let Err(err) = Self::transfer_or_fail(&env, &contract_addr, &claimant, amount) {
            // The host also discards these writes when the call returns Err; the explicit
            // restore keeps the entitlement intact if the error is ever handled in-contract.
            Self::write_entitlement(&env, &claimant, amount);
            Self::write_total(&env, total);
            return Err(err);
        }

        env.events().publish((EVENT_CLAIM, claimant), amount);
        Ok(amount)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current entitlement of `beneficiary` (0 if never added).
    pub fn balance_of_beneficiary(env: Env, beneficiary: Address) -> i128 {
        Self::read_entitlement(&env, &beneficiary)
    }

    /// Claim gate state. true = claims enabled.
    pub fn lock_status(env: Env) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::LockStatus)
            .unwrap_or(false)
    }

    pub fn get_owner(env: Env) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Owner)
    }

    pub fn get_token(env: Env) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Token)
    }

    /// The pool: this contract's balance in the token contract. 0 before initialization.
    pub fn held_balance(env: Env) -> i128 {
        match Self::token_client(&env) {
            Ok(client) => client.balance(&env.current_contract_address()),
            Err(_) => 0,
        }
    }

    /// Sum of all current entitlements. Can exceed `held_balance` after an
    /// emergency withdrawal or when the owner over-allocates.
    pub fn total_entitlements(env: Env) -> i128 {
        Self::read_total(&env)
    }

    pub fn get_beneficiary_count(env: Env) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::BeneficiaryCount)
            .unwrap_or(0)
    }

    /// All list entries in insertion order, duplicates included.
    /// Reads the whole list; use `get_beneficiaries_page` once the list is long.
    pub fn get_beneficiaries(env: Env) -> Vec<Address> {
        let count = Self::get_beneficiary_count(env.clone());
        let mut result = Vec::new(&env);
        for i in 0..count {
            if let Some(beneficiary) = env
                .storage()
                .persistent()
                .get::<DataKey, Address>(&DataKey::BeneficiaryAt(i))
            {
                result.push_back(beneficiary);
            }
        }
        result
    }

    /// Current entitlement of every list entry, aligned with `get_beneficiaries`.
    /// Unbounded like `get_beneficiaries`; page with `get_beneficiaries_page` for long lists.
    pub fn get_beneficiary_balances(env: Env) -> Vec<i128> {
        let mut result = Vec::new(&env);
        for beneficiary in Self::get_beneficiaries(env.clone()).iter() {
            result.push_back(Self::read_entitlement(&env, &beneficiary));
        }
        result
    }

    /// Return a page of (beneficiary, entitlement) pairs. Limit capped at MAX_PAGE_LIMIT (20).
    /// Ordering: by list index (insertion order).
    pub fn get_beneficiaries_page(
        env: Env,
        start: u32,
        limit: u32,
    ) -> (Vec<(Address, i128)>, Option<u32>) {
        let count = Self::get_beneficiary_count(env.clone());

        let effective_limit = if limit == 0 || limit > MAX_PAGE_LIMIT {
            MAX_PAGE_LIMIT
        } else {
            limit
        };

        if start >= count {
            return (Vec::new(&env), None);
        }

        let end = core::cmp::min(start.saturating_add(effective_limit), count);
        let mut results = Vec::new(&env);

        for i in start..end {
            if let Some(beneficiary) = env
                .storage()
                .persistent()
                .get::<DataKey, Address>(&DataKey::BeneficiaryAt(i))
            {
                let balance = Self::read_entitlement(&env, &beneficiary);
                results.push_back((beneficiary, balance));
            }
        }

        let next_cursor = if end < count { Some(end) } else { None };
        (results, next_cursor)
    }

    /// Return the current contract version.
    pub fn get_version(env: Env) -> u32 {
        let _ = env;
        CONTRACT_VERSION
    }
}

mod test_auth;
mod test_invariants;
