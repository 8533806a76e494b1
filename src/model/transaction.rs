use crate::error::{ErrorType, Res};
use crate::Error;
use crate::model::Amount;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The header row of the ledger file.
pub const HEADERS: [&str; 4] = [DATE_STR, DESCRIPTION_STR, AMOUNT_STR, BALANCE_STR];

/// The date format used in both the ledger file and the run-state file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The description of the synthetic first row of every ledger.
pub const STARTING_BALANCE: &str = "Starting Balance";

pub(crate) const DATE_STR: &str = "Date";
pub(crate) const DESCRIPTION_STR: &str = "Description";
pub(crate) const AMOUNT_STR: &str = "Amount";
pub(crate) const BALANCE_STR: &str = "Balance";

/// A ledger record exactly as it is persisted: four text fields, unparsed.
///
/// Rows are what the storage layer reads and appends. A row that does not parse into a
/// `Transaction` is still a row, and it is kept around so that history can show it.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Row {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub balance: String,
}

impl Row {
    /// Builds a row from positional fields. Missing trailing fields become empty strings and extra
    /// fields are ignored.
    pub fn from_fields<S, I>(fields: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let mut fields = fields.into_iter().map(Into::into);
        Self {
            date: fields.next().unwrap_or_default(),
            description: fields.next().unwrap_or_default(),
            amount: fields.next().unwrap_or_default(),
            balance: fields.next().unwrap_or_default(),
        }
    }

    /// The fields in file column order.
    pub fn fields(&self) -> [&str; 4] {
        [&self.date, &self.description, &self.amount, &self.balance]
    }

    /// Parses only the `Balance` column, which is all that is needed to know the current balance.
    pub(crate) fn parse_balance(&self) -> Res<Amount> {
        Amount::from_str(&self.balance)
            .with_context(|| format!("Unparsable {BALANCE_STR} '{}'", self.balance))
    }
}

/// A single, parsed entry of the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    date: NaiveDate,
    description: String,
    amount: Amount,
    balance: Amount,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Amount,
        balance: Amount,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount: amount.plain(),
            balance: balance.plain(),
        }
    }

    /// The synthetic first entry of every ledger.
    pub fn seed(date: NaiveDate) -> Self {
        Self::new(date, STARTING_BALANCE, Amount::ZERO, Amount::ZERO)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The running balance after this transaction was applied.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn to_row(&self) -> Row {
        Row {
            date: self.date.format(DATE_FORMAT).to_string(),
            description: self.description.clone(),
            amount: self.amount.plain().to_string(),
            balance: self.balance.plain().to_string(),
        }
    }
}

impl TryFrom<&Row> for Transaction {
    type Error = anyhow::Error;

    fn try_from(row: &Row) -> Res<Self> {
        let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT)
            .with_context(|| format!("Unparsable {DATE_STR} '{}'", row.date))?;
        let amount = Amount::from_str(&row.amount)
            .with_context(|| format!("Unparsable {AMOUNT_STR} '{}'", row.amount))?;
        let balance = row.parse_balance()?;
        Ok(Self::new(date, row.description.clone(), amount, balance))
    }
}

/// One item of the ledger history.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Entry {
    Valid(Transaction),
    /// A row that could not be parsed. It is shown as-is, never repaired or dropped.
    Malformed { row: Row, reason: String },
}

impl Entry {
    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            Entry::Valid(t) => Some(t),
            Entry::Malformed { .. } => None,
        }
    }

    /// The parsed transaction, or an `ErrorType::MalformedRecord` error saying why the row could
    /// not be parsed.
    pub fn into_transaction(self) -> crate::Result<Transaction> {
        match self {
            Entry::Valid(t) => Ok(t),
            Entry::Malformed { row, reason } => Err(Error::new(
                ErrorType::MalformedRecord,
                anyhow::anyhow!("Malformed ledger row {:?}: {reason}", row.fields()),
            )),
        }
    }

    /// The row as it should be displayed or exported.
    pub fn to_row(&self) -> Row {
        match self {
            Entry::Valid(t) => t.to_row(),
            Entry::Malformed { row, .. } => row.clone(),
        }
    }
}

impl From<Row> for Entry {
    fn from(row: Row) -> Self {
        match Transaction::try_from(&row) {
            Ok(t) => Entry::Valid(t),
            Err(e) => Entry::Malformed {
                reason: format!("{e:#}"),
                row,
            },
        }
    }
}
