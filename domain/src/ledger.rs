use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A coin balance as a plain value. Storage belongs to the caller; every
/// operation returns the updated balance instead of mutating in place.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoinBalance {
    pub balance: u64,
    /// Coins ever credited
    pub total_earned: u64,
    /// Coins ever removed
    pub total_spent: u64,
}

impl CoinBalance {
    pub fn new(balance: u64, total_earned: u64, total_spent: u64) -> Self {
        CoinBalance { balance, total_earned, total_spent }
    }

    pub fn credit(self, amount: u64) -> Self {
        CoinBalance {
            balance: self.balance.saturating_add(amount),
            total_earned: self.total_earned.saturating_add(amount),
            total_spent: self.total_spent,
        }
    }

    /// Removes up to `amount`, clamping the balance at zero. Only what was
    /// actually removed counts toward `total_spent`.
    pub fn debit(self, amount: u64) -> Self {
        let removed = amount.min(self.balance);
        CoinBalance {
            balance: self.balance - removed,
            total_earned: self.total_earned,
            total_spent: self.total_spent.saturating_add(removed),
        }
    }

    pub fn covers(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    /// Spends `amount` coins. Unlike `debit`, a zero amount or an overdraft
    /// is refused and the balance is left as it was.
    pub fn redeem(self, amount: u64) -> DomainResult<Self> {
        if amount == 0 {
            return Err(DomainError::InvalidAmount);
        }
        if !self.covers(amount) {
            return Err(DomainError::InsufficientCoins { balance: self.balance, amount });
        }
        Ok(self.debit(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_then_debit() {
        let b = CoinBalance::default().credit(23).debit(10);
        assert_eq!(b, CoinBalance::new(13, 23, 10));
    }

    #[test]
    fn debit_clamps_at_zero() {
        let b = CoinBalance::new(5, 5, 0).debit(8);
        assert_eq!(b.balance, 0);
        assert_eq!(b.total_spent, 5);
        assert!(!b.covers(1));
        assert!(b.covers(0));
    }

    #[test]
    fn redeem_refuses_zero_and_overdraft() {
        let b = CoinBalance::new(13, 23, 10);
        assert_eq!(b.redeem(0), Err(DomainError::InvalidAmount));
        assert_eq!(b.redeem(14), Err(DomainError::InsufficientCoins { balance: 13, amount: 14 }));
        assert_eq!(b.redeem(13), Ok(CoinBalance::new(0, 23, 23)));
    }
}
