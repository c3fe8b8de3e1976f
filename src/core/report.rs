//! Dashboard assembly and text formatting.
//!
//! This module gathers everything the dashboard shows for one owner and month into a
//! single [`DashboardData`]: the Safe-to-Spend headline, debts, recent transactions,
//! categories and the breakdown behind the headline. Formatting helpers turn that
//! data into plain text for the binary.

use crate::{
    core::{
        aggregate::{Breakdown, aggregate, compute_safe_to_spend},
        category::{Commitment, get_categories},
        classify::TransactionKind,
        debt::{display_balance, get_debts},
        envelope::EnvelopeStatus,
        monthly::{find_month, get_or_create_month, month_start},
        transaction::transactions_in_month,
    },
    entities::{category, debt, transaction},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;

/// A debt as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtView {
    /// Debt id
    pub id: i64,
    /// Debt name
    pub name: String,
    /// Balance clamped at zero
    pub balance: f64,
    /// Annual rate in percent
    pub interest_rate: f64,
}

impl From<&debt::Model> for DebtView {
    fn from(model: &debt::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            balance: display_balance(model.total_balance),
            interest_rate: model.interest_rate,
        }
    }
}

/// A category with its decoded commitment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryView {
    /// Category id
    pub id: i64,
    /// Category name
    pub name: String,
    /// Whether and how much the category reserves each month
    pub commitment: Commitment,
}

impl From<&category::Model> for CategoryView {
    fn from(model: &category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            commitment: Commitment::from_model(model),
        }
    }
}

/// A transaction line on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    /// Transaction id
    pub id: i64,
    /// Positive amount
    pub amount: f64,
    /// Free-text description
    pub description: String,
    /// `income`, `expense` or `debt_payment`
    pub transaction_type: String,
    /// Day the transaction happened
    pub date: NaiveDate,
    /// Category for expenses
    pub category_id: Option<i64>,
    /// Debt for debt payments
    pub debt_id: Option<i64>,
    /// Category name for expenses, `To: <debt>` for debt payments
    pub category_name: Option<String>,
}

/// Everything the dashboard displays for one owner and month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    /// First day of the month shown
    pub month: NaiveDate,
    /// What can still be spent this month
    pub safe_to_spend: f64,
    /// Variable spending plus overspend
    pub spent: f64,
    /// Every debt of the owner, by name
    pub debts: Vec<DebtView>,
    /// Newest first
    pub recent_transactions: Vec<TransactionView>,
    /// Every category of the owner
    pub categories: Vec<CategoryView>,
    /// Totals behind `safe_to_spend`
    pub breakdown: Breakdown,
}

impl DashboardData {
    /// Zero-valued dashboard, used when nothing can be read.
    #[must_use]
    pub fn empty(month: NaiveDate) -> Self {
        Self {
            month: month_start(month),
            safe_to_spend: 0.0,
            spent: 0.0,
            debts: Vec::new(),
            recent_transactions: Vec::new(),
            categories: Vec::new(),
            breakdown: Breakdown::default(),
        }
    }
}

fn transaction_view(
    model: &transaction::Model,
    category_names: &HashMap<i64, &str>,
    debt_names: &HashMap<i64, &str>,
) -> TransactionView {
    let category_name = if model.transaction_type == TransactionKind::DebtPayment.as_str() {
        model
            .debt_id
            .and_then(|id| debt_names.get(&id))
            .map(|name| format!("To: {name}"))
    } else {
        model
            .category_id
            .and_then(|id| category_names.get(&id))
            .map(|name| (*name).to_string())
    };

    TransactionView {
        id: model.id,
        amount: model.amount,
        description: model.description.clone(),
        transaction_type: model.transaction_type.clone(),
        date: model.date,
        category_id: model.category_id,
        debt_id: model.debt_id,
        category_name,
    }
}

/// Builds the dashboard for the month containing `month`.
///
/// With `ensure_month` the month record is created when missing, as happens when
/// the owner opens the current month. Otherwise a missing month reads as zero income
/// and rollover. At most `recent_limit` transactions are included.
pub async fn generate_dashboard<C>(
    db: &C,
    owner_id: &str,
    month: NaiveDate,
    ensure_month: bool,
    recent_limit: usize,
) -> Result<DashboardData>
where
    C: ConnectionTrait,
{
    let start = month_start(month);
    let month_record = if ensure_month {
        Some(get_or_create_month(db, owner_id, start).await?)
    } else {
        find_month(db, owner_id, start).await?
    };

    let transactions = transactions_in_month(db, owner_id, start).await?;
    let categories = get_categories(db, owner_id).await?;
    let debts = get_debts(db, owner_id).await?;

    let breakdown = aggregate(start, month_record.as_ref(), &transactions, &categories);

    let category_names: HashMap<i64, &str> =
        categories.iter().map(|c| (c.id, c.name.as_str())).collect();
    let debt_names: HashMap<i64, &str> = debts.iter().map(|d| (d.id, d.name.as_str())).collect();

    let recent_transactions = transactions
        .iter()
        .take(recent_limit)
        .map(|tx| transaction_view(tx, &category_names, &debt_names))
        .collect();

    Ok(DashboardData {
        month: start,
        safe_to_spend: compute_safe_to_spend(&breakdown),
        spent: breakdown.spent(),
        debts: debts.iter().map(DebtView::from).collect(),
        recent_transactions,
        categories: categories.iter().map(CategoryView::from).collect(),
        breakdown,
    })
}

/// Formats an amount as dollars, e.g. `$1234.50` or `-$20.00`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress is in [0, 100] and length is small
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

/// One line per transaction: `date | +$50.00 | description (category)`.
#[must_use]
pub fn format_transaction_line(view: &TransactionView) -> String {
    let signed = if view.transaction_type == TransactionKind::Income.as_str() {
        format!("+{}", format_currency(view.amount))
    } else {
        format!("-{}", format_currency(view.amount))
    };
    match &view.category_name {
        Some(category) => format!("{} | {signed} | {} ({category})", view.date, view.description),
        None => format!("{} | {signed} | {}", view.date, view.description),
    }
}

/// Plain text rendering of the dashboard and the tracked envelopes.
#[must_use]
pub fn format_dashboard_summary(data: &DashboardData, envelopes: &[EnvelopeStatus]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", data.month.format("%B %Y"));
    let _ = writeln!(out, "Safe to Spend: {}", format_currency(data.safe_to_spend));
    let _ = writeln!(out, "Spent: {}", format_currency(data.spent));
    let _ = writeln!(
        out,
        "Income {} + rollover {} - commitments {}",
        format_currency(data.breakdown.income),
        format_currency(data.breakdown.rollover),
        format_currency(data.breakdown.total_commitments)
    );

    if !envelopes.is_empty() {
        let _ = writeln!(out, "\nTracked budgets:");
        for envelope in envelopes {
            let _ = writeln!(
                out,
                "  {} {} of {} {}",
                envelope.name,
                format_currency(envelope.spent),
                format_currency(envelope.limit),
                format_progress_bar(envelope.percent, None)
            );
        }
    }

    if !data.debts.is_empty() {
        let _ = writeln!(out, "\nDebts:");
        for debt in &data.debts {
            let _ = writeln!(out, "  {}: {}", debt.name, format_currency(debt.balance));
        }
    }

    if !data.recent_transactions.is_empty() {
        let _ = writeln!(out, "\nRecent:");
        for tx in &data.recent_transactions {
            let _ = writeln!(out, "  {}", format_transaction_line(tx));
        }
    }

    out
}
