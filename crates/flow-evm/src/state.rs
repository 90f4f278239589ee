//! World-state access
//!
//! The interpreter reads and writes accounts only through [`StateStore`].
//! [`InMemoryState`] is a map-backed implementation with whole-state
//! snapshots, used by the CLI and the tests.

use crate::error::{EvmError, EvmResult};
use crate::result::Log;
use bytes::Bytes;
use flow_primitives::{keccak256, Address, Word, H256};
use rlp::RlpStream;
use std::collections::{HashMap, HashSet};

/// Accounts, storage, logs and block hashes seen by the interpreter
pub trait StateStore {
    /// Balance of an account
    fn balance(&self, address: &Address) -> Word;

    /// Credit an account
    fn add_balance(&mut self, address: &Address, amount: Word);

    /// Debit an account, failing when the balance is too low
    fn sub_balance(&mut self, address: &Address, amount: Word) -> EvmResult<()>;

    /// Move `amount` between two accounts
    fn transfer(&mut self, from: &Address, to: &Address, amount: Word) -> EvmResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.sub_balance(from, amount)?;
        self.add_balance(to, amount);
        Ok(())
    }

    /// Account nonce
    fn nonce(&self, address: &Address) -> u64;

    /// Code of an account (empty if none)
    fn code(&self, address: &Address) -> Bytes;

    /// Size of an account's code
    fn code_size(&self, address: &Address) -> usize {
        self.code(address).len()
    }

    /// Keccak-256 of an account's code
    fn code_hash(&self, address: &Address) -> H256 {
        keccak256(&self.code(address))
    }

    /// Install code on an account
    fn set_code(&mut self, address: &Address, code: Bytes);

    /// Storage slot value (zero if unset)
    fn storage(&self, address: &Address, slot: Word) -> Word;

    /// Write a storage slot
    fn set_storage(&mut self, address: &Address, slot: Word, value: Word);

    /// Whether the account has ever been touched
    fn exists(&self, address: &Address) -> bool;

    /// Whether the account has no balance, nonce or code
    fn is_empty(&self, address: &Address) -> bool {
        self.balance(address).is_zero()
            && self.nonce(address) == 0
            && self.code_size(address) == 0
    }

    /// Derive the address of a contract created by `creator` and bump its nonce
    fn create_address(&mut self, creator: &Address) -> Address;

    /// Record an emitted log
    fn add_log(&mut self, log: Log);

    /// Record a SHA3 preimage
    fn add_preimage(&mut self, hash: H256, preimage: &[u8]);

    /// Schedule an account for destruction
    fn self_destruct(&mut self, address: &Address);

    /// Whether the account self-destructed in this transaction
    fn has_self_destructed(&self, address: &Address) -> bool;

    /// Hash of block `number`
    fn block_hash(&self, number: u64) -> H256;

    /// Mark the current state for a later [`StateStore::revert_to`]
    fn snapshot(&mut self) -> usize;

    /// Discard all changes made since `snapshot`
    fn revert_to(&mut self, snapshot: usize);

    /// Keep all changes made since `snapshot` and release it
    fn commit_snapshot(&mut self, snapshot: usize);
}

/// Contract address for `creator` at `nonce`: keccak(rlp([creator, nonce]))[12..]
pub fn contract_address(creator: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(creator);
    stream.append(&nonce);
    let hash = keccak256(&stream.out());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

/// One account in [`InMemoryState`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// Balance
    pub balance: Word,
    /// Nonce
    pub nonce: u64,
    /// Code
    pub code: Bytes,
    /// Storage
    pub storage: HashMap<Word, Word>,
}

#[derive(Debug, Clone, Default)]
struct Journaled {
    accounts: HashMap<Address, Account>,
    logs: Vec<Log>,
    destructed: HashSet<Address>,
}

/// Map-backed state store
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    current: Journaled,
    snapshots: Vec<Journaled>,
    preimages: HashMap<H256, Vec<u8>>,
    block_hashes: HashMap<u64, H256>,
}

impl InMemoryState {
    /// Create empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account
    pub fn insert_account(&mut self, address: Address, account: Account) {
        self.current.accounts.insert(address, account);
    }

    /// Set an account balance
    pub fn set_balance(&mut self, address: Address, balance: Word) {
        self.current.accounts.entry(address).or_default().balance = balance;
    }

    /// Account, if it exists
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.current.accounts.get(address)
    }

    /// Override the hash of a block
    pub fn set_block_hash(&mut self, number: u64, hash: H256) {
        self.block_hashes.insert(number, hash);
    }

    /// Logs emitted so far
    pub fn logs(&self) -> &[Log] {
        &self.current.logs
    }

    /// Recorded SHA3 preimages
    pub fn preimages(&self) -> &HashMap<H256, Vec<u8>> {
        &self.preimages
    }

    #[cfg(test)]
    pub(crate) fn snapshot_depth(&self) -> usize {
        self.snapshots.len()
    }
}

impl StateStore for InMemoryState {
    fn balance(&self, address: &Address) -> Word {
        self.account(address).map(|a| a.balance).unwrap_or_default()
    }

    fn add_balance(&mut self, address: &Address, amount: Word) {
        let account = self.current.accounts.entry(*address).or_default();
        account.balance = account.balance.overflowing_add(amount).0;
    }

    fn sub_balance(&mut self, address: &Address, amount: Word) -> EvmResult<()> {
        let account = self.current.accounts.entry(*address).or_default();
        if account.balance < amount {
            return Err(EvmError::InsufficientBalance);
        }
        account.balance -= amount;
        Ok(())
    }

    fn nonce(&self, address: &Address) -> u64 {
        self.account(address).map(|a| a.nonce).unwrap_or(0)
    }

    fn code(&self, address: &Address) -> Bytes {
        self.account(address)
            .map(|a| a.code.clone())
            .unwrap_or_default()
    }

    fn set_code(&mut self, address: &Address, code: Bytes) {
        self.current.accounts.entry(*address).or_default().code = code;
    }

    fn storage(&self, address: &Address, slot: Word) -> Word {
        self.account(address)
            .and_then(|a| a.storage.get(&slot).copied())
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: &Address, slot: Word, value: Word) {
        let storage = &mut self.current.accounts.entry(*address).or_default().storage;
        if value.is_zero() {
            storage.remove(&slot);
        } else {
            storage.insert(slot, value);
        }
    }

    fn exists(&self, address: &Address) -> bool {
        self.current.accounts.contains_key(address)
    }

    fn create_address(&mut self, creator: &Address) -> Address {
        let account = self.current.accounts.entry(*creator).or_default();
        let nonce = account.nonce;
        account.nonce = nonce.wrapping_add(1);
        contract_address(creator, nonce)
    }

    fn add_log(&mut self, log: Log) {
        self.current.logs.push(log);
    }

    fn add_preimage(&mut self, hash: H256, preimage: &[u8]) {
        self.preimages
            .entry(hash)
            .or_insert_with(|| preimage.to_vec());
    }

    fn self_destruct(&mut self, address: &Address) {
        if let Some(account) = self.current.accounts.get_mut(address) {
            account.balance = Word::zero();
        }
        self.current.destructed.insert(*address);
    }

    fn has_self_destructed(&self, address: &Address) -> bool {
        self.current.destructed.contains(address)
    }

    fn block_hash(&self, number: u64) -> H256 {
        self.block_hashes
            .get(&number)
            .copied()
            .unwrap_or_else(|| keccak256(number.to_string().as_bytes()))
    }

    fn snapshot(&mut self) -> usize {
        self.snapshots.push(self.current.clone());
        self.snapshots.len() - 1
    }

    fn revert_to(&mut self, snapshot: usize) {
        if snapshot >= self.snapshots.len() {
            return;
        }
        self.snapshots.truncate(snapshot + 1);
        if let Some(saved) = self.snapshots.pop() {
            self.current = saved;
        }
    }

    fn commit_snapshot(&mut self, snapshot: usize) {
        self.snapshots.truncate(snapshot);
    }
}
