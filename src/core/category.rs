//! Category business logic - commitment classification and category CRUD.
//!
//! The rest of the crate only sees [`Commitment`]. The stored columns
//! (`commitment_type`, the legacy `is_commitment` flag, `budget_limit`,
//! `is_pinned`) are read and written exclusively in this module.

use crate::{
    config::settings::CategoryConfig,
    core::validation::{finite_or_zero, validate_name, validate_non_negative},
    entities::{Category, Transaction, category, transaction},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const FIXED: &str = "fixed";
const VARIABLE_FIXED: &str = "variable_fixed";

/// How a category affects Safe-to-Spend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Commitment {
    /// Ordinary discretionary spending
    Standard,
    /// A bill with a fixed amount, reserved in full every month
    Fixed {
        /// Amount reserved each month
        limit: f64,
    },
    /// A recurring cost that varies, reserved at its budget every month
    VariableFixed {
        /// Amount reserved each month
        limit: f64,
        /// Whether the envelope tracker shows this category
        pinned: bool,
    },
}

impl Commitment {
    /// Builds a commitment from the loose form used by callers and config files.
    ///
    /// `is_pinned` only has an effect for `variable_fixed`, and the budget limit
    /// is ignored for standard categories.
    pub fn from_parts(
        commitment_type: Option<&str>,
        budget_limit: f64,
        is_pinned: bool,
    ) -> Result<Self> {
        match commitment_type.map(str::trim).filter(|t| !t.is_empty()) {
            None => Ok(Self::Standard),
            Some(FIXED) => Ok(Self::Fixed {
                limit: validate_non_negative(budget_limit)?,
            }),
            Some(VARIABLE_FIXED) => Ok(Self::VariableFixed {
                limit: validate_non_negative(budget_limit)?,
                pinned: is_pinned,
            }),
            Some(other) => Err(Error::InvalidCommitmentType {
                value: other.to_string(),
            }),
        }
    }

    /// Reads the commitment stored on a category row.
    ///
    /// Rows written before `commitment_type` existed only carry the legacy
    /// `is_commitment` flag; those read as fixed commitments. Missing or
    /// non-finite limits read as zero.
    #[must_use]
    pub fn from_model(model: &category::Model) -> Self {
        let limit = finite_or_zero(model.budget_limit.unwrap_or(0.0));
        match model.commitment_type.as_deref() {
            Some(FIXED) => Self::Fixed { limit },
            Some(VARIABLE_FIXED) => Self::VariableFixed {
                limit,
                pinned: model.is_pinned,
            },
            Some(other) => {
                warn!(
                    "Category {} has unknown commitment type {:?}, using legacy flag",
                    model.id, other
                );
                Self::legacy(model.is_commitment, limit)
            }
            None => Self::legacy(model.is_commitment, limit),
        }
    }

    const fn legacy(is_commitment: bool, limit: f64) -> Self {
        if is_commitment {
            Self::Fixed { limit }
        } else {
            Self::Standard
        }
    }

    /// Whether the category reserves a budget from Safe-to-Spend.
    #[must_use]
    pub const fn is_commitment(&self) -> bool {
        matches!(self, Self::Fixed { .. } | Self::VariableFixed { .. })
    }

    /// Reserved monthly budget, zero for standard categories.
    #[must_use]
    pub const fn limit(&self) -> f64 {
        match self {
            Self::Standard => 0.0,
            Self::Fixed { limit } | Self::VariableFixed { limit, .. } => *limit,
        }
    }

    /// Whether the category appears in the envelope tracker.
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        matches!(self, Self::VariableFixed { pinned: true, .. })
    }

    /// Storage value for the `commitment_type` column.
    #[must_use]
    pub const fn type_tag(&self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Fixed { .. } => Some(FIXED),
            Self::VariableFixed { .. } => Some(VARIABLE_FIXED),
        }
    }

    /// Writes this commitment into the stored columns, keeping the legacy flag in sync.
    fn apply_to(self, model: &mut category::ActiveModel) {
        model.commitment_type = Set(self.type_tag().map(str::to_string));
        model.is_commitment = Set(self.is_commitment());
        model.budget_limit = Set(self.is_commitment().then(|| self.limit()));
        model.is_pinned = Set(self.is_pinned());
    }
}

/// Validated input for creating or editing a category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInput {
    /// Display name
    pub name: String,
    /// Commitment classification and budget
    pub commitment: Commitment,
}

impl CategoryInput {
    /// Validates the loose `(name, commitmentType, budgetLimit, isPinned)` form.
    pub fn from_parts(
        name: &str,
        commitment_type: Option<&str>,
        budget_limit: f64,
        is_pinned: bool,
    ) -> Result<Self> {
        Ok(Self {
            name: validate_name(name)?,
            commitment: Commitment::from_parts(commitment_type, budget_limit, is_pinned)?,
        })
    }
}

impl TryFrom<&CategoryConfig> for CategoryInput {
    type Error = Error;

    fn try_from(config: &CategoryConfig) -> Result<Self> {
        Self::from_parts(
            &config.name,
            config.commitment_type.as_deref(),
            config.budget_limit,
            config.is_pinned,
        )
    }
}

/// Retrieves all of an owner's categories, ordered alphabetically by name.
pub async fn get_categories<C>(db: &C, owner_id: &str) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::OwnerId.eq(owner_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds one of an owner's categories by id.
pub async fn get_category_by_id<C>(
    db: &C,
    owner_id: &str,
    category_id: i64,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(category::Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new category for the owner.
pub async fn create_category(
    db: &DatabaseConnection,
    owner_id: &str,
    input: CategoryInput,
) -> Result<category::Model> {
    let mut model = category::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(input.name),
        ..Default::default()
    };
    input.commitment.apply_to(&mut model);

    let created = model.insert(db).await?;
    info!("Created category {} ({})", created.name, created.id);
    Ok(created)
}

/// Replaces a category's name and commitment configuration.
pub async fn update_category(
    db: &DatabaseConnection,
    owner_id: &str,
    category_id: i64,
    input: CategoryInput,
) -> Result<category::Model> {
    let existing = get_category_by_id(db, owner_id, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let mut model: category::ActiveModel = existing.into();
    model.name = Set(input.name);
    input.commitment.apply_to(&mut model);

    model.update(db).await.map_err(Into::into)
}

/// Deletes a category. Its transactions are kept and become uncategorized.
pub async fn delete_category(
    db: &DatabaseConnection,
    owner_id: &str,
    category_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let existing = get_category_by_id(&txn, owner_id, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let detached = Transaction::update_many()
        .col_expr(
            transaction::Column::CategoryId,
            Expr::value(Option::<i64>::None),
        )
        .filter(transaction::Column::OwnerId.eq(owner_id))
        .filter(transaction::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted category {} and uncategorized {} transactions",
        category_id, detached.rows_affected
    );
    Ok(())
}

/// Creates the configured categories the owner does not have yet (matched by name).
///
/// Returns the number of categories created. Invalid entries are skipped with a warning.
pub async fn seed_categories(
    db: &DatabaseConnection,
    owner_id: &str,
    configs: &[CategoryConfig],
) -> Result<usize> {
    let mut known: Vec<String> = get_categories(db, owner_id)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    let mut created = 0;

    for config in configs {
        let input = match CategoryInput::try_from(config) {
            Ok(input) => input,
            Err(e) => {
                warn!("Skipping configured category {:?}: {}", config.name, e);
                continue;
            }
        };

        if known.iter().any(|name| name.eq_ignore_ascii_case(&input.name)) {
            continue;
        }

        let category = create_category(db, owner_id, input).await?;
        known.push(category.name);
        created += 1;
    }

    Ok(created)
}
