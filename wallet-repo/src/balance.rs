//! Wallet balance rules.
//!
//! A wallet's balance is never stored; it is the sum of the amounts of the wallet's
//! transactions. Every write to a transaction is checked against the balance it would leave
//! behind: a write that lowers the balance below zero is an overdraft and is refused.
//!
//! Amounts carry at most two decimal places and, like balances, stay within the range of a
//! `NUMERIC(14, 2)` column. Both limits hold for every store.
//!
//! The stores call [check_balance_change] while holding whatever lock or database transaction
//! guards the wallet, so the balance read and the write it validates cannot interleave with
//! another write to the same wallet.

use rust_decimal::Decimal;
use thiserror::Error;

/// The effect a transaction write has on one wallet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BalanceChange {
    Create { amount: Decimal },
    Update { original: Decimal, amount: Decimal },
    Delete { original: Decimal },
}

impl BalanceChange {
    /// Net amount by which the wallet balance moves. `None` if it does not fit a [Decimal].
    pub fn delta(&self) -> Option<Decimal> {
        match *self {
            BalanceChange::Create { amount } => Some(amount),
            BalanceChange::Update { original, amount } => amount.checked_sub(original),
            BalanceChange::Delete { original } => Some(-original),
        }
    }
}

pub const AMOUNT_SCALE: u32 = 2;

/// Largest absolute value of an amount or a balance.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, AMOUNT_SCALE)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidAmount {
    #[error("Amount {0} has more than {AMOUNT_SCALE} decimal places")]
    TooPrecise(Decimal),
    #[error("Amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// Validates a transaction amount and returns it with exactly [AMOUNT_SCALE] decimal places.
pub fn check_amount(amount: Decimal) -> Result<Decimal, InvalidAmount> {
    if amount.abs() > max_amount() {
        return Err(InvalidAmount::OutOfRange(amount));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(InvalidAmount::TooPrecise(amount));
    }
    let mut amount = amount;
    amount.rescale(AMOUNT_SCALE);
    Ok(amount)
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Wallet {wallet_id} has insufficient funds: balance {balance} would become {prospective}")]
pub struct InsufficientFunds {
    pub wallet_id: i32,
    pub balance: Decimal,
    pub prospective: Decimal,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BalanceError {
    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),
    #[error("Balance of wallet {0} would leave the supported range")]
    OutOfRange(i32),
}

/// Sums transaction amounts into a balance. `None` on overflow.
pub fn sum_amounts<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount))
}

/// Validates `change` against the current `balance` of wallet `wallet_id` and returns the
/// balance the wallet will have once the change is written.
///
/// Changes that do not lower the balance are accepted even on a wallet that is already
/// negative, as long as the new balance stays within [max_amount].
pub fn check_balance_change(
    wallet_id: i32,
    balance: Decimal,
    change: BalanceChange,
) -> Result<Decimal, BalanceError> {
    let (delta, prospective) = change
        .delta()
        .and_then(|delta| Some((delta, balance.checked_add(delta)?)))
        .ok_or(BalanceError::OutOfRange(wallet_id))?;
    if delta < Decimal::ZERO && prospective < Decimal::ZERO {
        return Err(InsufficientFunds {
            wallet_id,
            balance,
            prospective,
        }
        .into());
    }
    if prospective.abs() > max_amount() {
        return Err(BalanceError::OutOfRange(wallet_id));
    }
    Ok(prospective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case::deposit("0", BalanceChange::Create { amount: dec("25.00") }, "25.00")]
    #[case::withdrawal_within_balance("30", BalanceChange::Create { amount: dec("-30") }, "0")]
    #[case::edit_expense_up_to_balance(
        "10",
        BalanceChange::Update { original: dec("-20"), amount: dec("-30") },
        "0"
    )]
    #[case::edit_to_deposit("0", BalanceChange::Update { original: dec("-5"), amount: dec("5") }, "10")]
    #[case::delete_expense("0", BalanceChange::Delete { original: dec("-12.5") }, "12.5")]
    #[case::delete_income_covered("100", BalanceChange::Delete { original: dec("60") }, "40")]
    #[case::deposit_into_negative_wallet("-10", BalanceChange::Create { amount: dec("4") }, "-6")]
    fn accepted(#[case] balance: &str, #[case] change: BalanceChange, #[case] expected: &str) {
        let prospective = check_balance_change(1, dec(balance), change).unwrap();
        assert_eq!(prospective, dec(expected));
    }

    #[rstest]
    #[case::overdraw("10", BalanceChange::Create { amount: dec("-10.01") }, "-0.01")]
    #[case::edit_expense_larger("10", BalanceChange::Update { original: dec("-5"), amount: dec("-20") }, "-5")]
    #[case::edit_income_smaller("50", BalanceChange::Update { original: dec("100"), amount: dec("10") }, "-40")]
    #[case::delete_income("20", BalanceChange::Delete { original: dec("50") }, "-30")]
    fn rejected(#[case] balance: &str, #[case] change: BalanceChange, #[case] prospective: &str) {
        let err = check_balance_change(7, dec(balance), change).unwrap_err();
        assert_eq!(
            err,
            BalanceError::InsufficientFunds(InsufficientFunds {
                wallet_id: 7,
                balance: dec(balance),
                prospective: dec(prospective),
            })
        );
    }

    #[rstest]
    #[case::deposit_past_limit(max_amount(), BalanceChange::Create { amount: dec("0.01") })]
    #[case::decimal_overflow(Decimal::MAX, BalanceChange::Create { amount: Decimal::MAX })]
    #[case::delta_overflow(
        Decimal::ZERO,
        BalanceChange::Update { original: Decimal::MIN, amount: Decimal::MAX }
    )]
    fn out_of_range(#[case] balance: Decimal, #[case] change: BalanceChange) {
        assert_eq!(
            check_balance_change(3, balance, change),
            Err(BalanceError::OutOfRange(3))
        );
    }

    #[test]
    fn deposit_up_to_limit() {
        let balance = max_amount() - dec("1");
        let change = BalanceChange::Create { amount: dec("1") };
        assert_eq!(check_balance_change(3, balance, change), Ok(max_amount()));
    }

    #[rstest]
    #[case::cents("12.34", Ok("12.34"))]
    #[case::padded("1.500", Ok("1.50"))]
    #[case::whole("-7", Ok("-7.00"))]
    #[case::largest("999999999999.99", Ok("999999999999.99"))]
    #[case::smallest("-999999999999.99", Ok("-999999999999.99"))]
    #[case::sub_cent("1.005", Err(InvalidAmount::TooPrecise(dec("1.005"))))]
    #[case::too_large("1000000000000", Err(InvalidAmount::OutOfRange(dec("1000000000000"))))]
    fn amount_limits(#[case] amount: &str, #[case] expected: Result<&str, InvalidAmount>) {
        let checked = check_amount(dec(amount));
        match expected {
            Ok(expected) => {
                let checked = checked.unwrap();
                assert_eq!(checked.to_string(), expected);
                assert_eq!(checked.scale(), AMOUNT_SCALE);
            }
            Err(expected) => assert_eq!(checked, Err(expected)),
        }
    }

    #[test]
    fn largest_decimal_is_rejected() {
        assert_eq!(
            check_amount(Decimal::MAX),
            Err(InvalidAmount::OutOfRange(Decimal::MAX))
        );
    }

    #[test]
    fn sum_of_amounts() {
        assert_eq!(sum_amounts(Vec::new()), Some(Decimal::ZERO));
        assert_eq!(
            sum_amounts(vec![dec("10.50"), dec("-3.25"), dec("0.75")]),
            Some(dec("8.00"))
        );
        assert_eq!(sum_amounts(vec![Decimal::MAX, Decimal::ONE]), None);
    }
}
