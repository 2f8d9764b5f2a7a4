//! Expense records
//!
//! Expense types, validated values and the create/update payloads that flow
//! from the API into the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::DomainError;
use super::locale::LocaleFormatter;
use super::money::{AmountNormalizer, MonetaryAmount};

/// Longest accepted description, in characters
pub const DESCRIPTION_MAX_LENGTH: usize = 100;

/// Smallest accepted value (R$ 0,01)
pub const VALUE_MIN_CENTS: u64 = 1;

/// Largest accepted value (R$ 999.999,99)
pub const VALUE_MAX_CENTS: u64 = 99_999_999;

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Food,
    Study,
    Transport,
    Fun,
    Other,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 5] = [
        ExpenseType::Food,
        ExpenseType::Study,
        ExpenseType::Transport,
        ExpenseType::Fun,
        ExpenseType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Food => "food",
            ExpenseType::Study => "study",
            ExpenseType::Transport => "transport",
            ExpenseType::Fun => "fun",
            ExpenseType::Other => "other",
        }
    }

    /// Label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseType::Food => "Alimentação",
            ExpenseType::Study => "Estudo",
            ExpenseType::Transport => "Transporte",
            ExpenseType::Fun => "Diversão",
            ExpenseType::Other => "Outros",
        }
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                DomainError::InvalidExpenseType(format!(
                    "{s:?}; expected one of food, study, transport, fun, other"
                ))
            })
    }
}

/// Amount as submitted: a JSON number of major units, or display text such
/// as `"R$ 25,50"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

/// Expense value within the accepted range.
///
/// # Invariants
/// - At least one cent
/// - At most 999 999,99
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseValue(MonetaryAmount);

impl ExpenseValue {
    pub fn new(amount: MonetaryAmount) -> Result<Self, DomainError> {
        if amount.cents() < VALUE_MIN_CENTS {
            return Err(DomainError::invalid_amount("must be greater than zero"));
        }
        if amount.cents() > VALUE_MAX_CENTS {
            return Err(DomainError::invalid_amount("must not exceed 999999.99"));
        }
        Ok(Self(amount))
    }

    /// Validate submitted input, reading text through the strict parser.
    pub fn from_input<F: LocaleFormatter>(
        input: &AmountInput,
        normalizer: &AmountNormalizer<F>,
    ) -> Result<Self, DomainError> {
        let major = match input {
            AmountInput::Number(value) => *value,
            AmountInput::Text(text) => normalizer
                .try_parse_amount(text)
                .map_err(|e| DomainError::invalid_amount(e.to_string()))?,
        };
        if major <= 0.0 {
            return Err(DomainError::invalid_amount("must be greater than zero"));
        }
        let amount = MonetaryAmount::from_major(major)
            .ok_or_else(|| DomainError::invalid_amount("must be a finite number"))?;
        Self::new(amount)
    }

    pub fn amount(&self) -> MonetaryAmount {
        self.0
    }
}

/// Trim and bound a description.
pub fn validate_description(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_description("description is required"));
    }
    if trimmed.chars().count() > DESCRIPTION_MAX_LENGTH {
        return Err(DomainError::invalid_description(format!(
            "description must be at most {DESCRIPTION_MAX_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// A stored expense.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub user_mail: String,
    pub description: String,
    pub value: ExpenseValue,
    pub expense_type: ExpenseType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Client address, or the request source when it is unknown
    pub user_ip: String,
}

/// Validated payload for a new expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub value: ExpenseValue,
    pub expense_type: ExpenseType,
}

impl NewExpense {
    pub fn new(
        description: &str,
        value: ExpenseValue,
        expense_type: ExpenseType,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            description: validate_description(description)?,
            value,
            expense_type,
        })
    }

    /// Materialize the record for `user_mail` at `now`.
    pub fn into_expense(self, user_mail: &str, user_ip: &str, now: DateTime<Utc>) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            user_mail: user_mail.to_string(),
            description: self.description,
            value: self.value,
            expense_type: self.expense_type,
            created_at: now,
            updated_at: now,
            user_ip: user_ip.to_string(),
        }
    }
}

/// Validated partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub description: Option<String>,
    pub value: Option<ExpenseValue>,
    pub expense_type: Option<ExpenseType>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.value.is_none() && self.expense_type.is_none()
    }

    pub fn apply(&self, expense: &mut Expense, now: DateTime<Utc>) {
        if let Some(ref description) = self.description {
            expense.description = description.clone();
        }
        if let Some(value) = self.value {
            expense.value = value;
        }
        if let Some(expense_type) = self.expense_type {
            expense.expense_type = expense_type;
        }
        expense.updated_at = now;
    }
}
