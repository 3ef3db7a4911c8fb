//! Minimal token balance book backing the registration fee.
//!
//! Stand-in for the network's fee token: a flat map of account balances
//! with mint and transfer. No allowances, no burn — the directory debits
//! the payer directly when an agent registers.

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{Address, Amount};

/// Token operation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The debited account does not hold enough tokens.
    #[error("insufficient funds: balance {balance} is below required {required}")]
    InsufficientFunds { balance: Amount, required: Amount },
}

/// In-memory balance book.
#[derive(Debug, Default)]
pub struct TokenLedger {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `account`, growing the total supply.
    pub fn mint(&mut self, account: Address, amount: Amount) {
        *self.balances.entry(account).or_insert(0) += amount;
        self.total_supply += amount;
        tracing::debug!(account = %account, amount, "minted tokens");
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Debit and credit happen together or not at all.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TokenError::InsufficientFunds {
                balance,
                required: amount,
            });
        }
        *self.balances.entry(from).or_insert(0) -= amount;
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    /// Balance of `account`; unknown accounts hold zero.
    pub fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }
}
