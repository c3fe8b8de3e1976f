//! Transaction types and the classification rules that route each amount
//! into income, variable spending, or a commitment envelope.

use crate::{
    core::category::Commitment,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The three kinds of transaction the ledger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money coming in, on top of the month's base income
    Income,
    /// Ordinary spending, optionally against a category
    Expense,
    /// Payment towards a tracked debt
    DebtPayment,
}

impl TransactionKind {
    /// Storage representation used in the `transaction_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::DebtPayment => "debt_payment",
        }
    }

    /// Description used when the caller leaves it blank.
    #[must_use]
    pub const fn default_description(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::DebtPayment => "Debt Payment",
        }
    }

    /// Whether the amount leaves the owner's cash (expenses and debt payments).
    #[must_use]
    pub const fn is_outflow(self) -> bool {
        matches!(self, Self::Expense | Self::DebtPayment)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "debt_payment" => Ok(Self::DebtPayment),
            other => Err(Error::InvalidTransactionType {
                value: other.to_string(),
            }),
        }
    }
}

/// Where a transaction's amount is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Added to the month's income
    Income,
    /// Counted as discretionary spending
    VariableSpend,
    /// Counted against the commitment envelope of this category id
    EnvelopeSpend(i64),
}

/// Decides where a transaction counts.
///
/// `category` is the transaction's category id together with its commitment,
/// or `None` when the transaction is uncategorized or its category no longer
/// exists. Only expenses against commitment categories land in an envelope;
/// debt payments always reduce Safe-to-Spend directly.
#[must_use]
pub fn classify(kind: TransactionKind, category: Option<(i64, Commitment)>) -> Classification {
    match kind {
        TransactionKind::Income => Classification::Income,
        TransactionKind::DebtPayment => Classification::VariableSpend,
        TransactionKind::Expense => match category {
            Some((id, commitment)) if commitment.is_commitment() => {
                Classification::EnvelopeSpend(id)
            }
            _ => Classification::VariableSpend,
        },
    }
}
