//! The records passed over the wire to and from the remote expense API.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::Date;

mod date_format {
    //! Serializes a [time::Date] as "YYYY-MM-DD".
    //!
    //! The API stores dates as full ISO date-times, e.g.
    //! "2024-01-01T00:00:00.000Z", so only the date part of a string is parsed.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    pub(crate) const DATE_FORMAT: &[BorrowedFormatItem] =
        format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let date_part = s.split_once('T').map(|(date, _)| date).unwrap_or(&s);
        Date::parse(date_part, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

mod amount_format {
    //! Accepts an amount as either a JSON number or a numeric string.
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(amount) => Ok(amount),
            RawAmount::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

pub(crate) use date_format::DATE_FORMAT;

/// The credentials sent to the log-in endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInRequest {
    /// The username the account was registered with.
    pub username: String,
    /// The plain text password, only ever sent to the API.
    pub password: String,
}

/// Which registration payload the remote API expects.
///
/// Two incompatible payload shapes exist for the same endpoint, so the shape
/// is chosen when the server starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationSchema {
    /// `{name, email, password}`
    #[default]
    NameEmail,
    /// `{username, firstname, lastname, password}`
    Username,
}

/// The body sent to the registration endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Registration {
    /// Registration with a display name and email address.
    NameEmail {
        /// The user's full name.
        name: String,
        /// The user's email address.
        email: String,
        /// The plain text password.
        password: String,
    },
    /// Registration with a username and first/last names.
    Username {
        /// The username used to log in.
        username: String,
        /// The user's first name.
        firstname: String,
        /// The user's last name.
        lastname: String,
        /// The plain text password.
        password: String,
    },
}

impl Registration {
    /// The schema this payload belongs to.
    pub fn schema(&self) -> RegistrationSchema {
        match self {
            Registration::NameEmail { .. } => RegistrationSchema::NameEmail,
            Registration::Username { .. } => RegistrationSchema::Username,
        }
    }
}

/// The profile of a signed in user as returned by the API.
///
/// The API does not document this object, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's ID in the remote database.
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Some API revisions nest the session token in the user object.
    #[serde(default)]
    pub token: Option<String>,
}

impl UserProfile {
    /// The most human friendly name available for the user.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.firstname.as_deref())
            .or(self.username.as_deref())
            .or(self.email.as_deref())
    }
}

/// The response to log-in and registration requests.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthResponse {
    /// The session token issued by the API.
    ///
    /// The top-level `token` takes precedence over `user.token`.
    pub fn session_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|user| user.token.as_deref()))
            .filter(|token| !token.is_empty())
    }
}

/// The generic acknowledgement returned by mutating endpoints.
///
/// Bodies that do not match this shape are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct Acknowledgement {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The server-assigned ID of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    /// Wrap an ID string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw ID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The spending categories offered by the client.
///
/// Any category the client does not know decodes as [Category::Other].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Entertainment,
    Utilities,
    Health,
    Education,
    #[serde(other)]
    Other,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Travel,
        Category::Entertainment,
        Category::Utilities,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    /// The category name as sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }

    /// Parse a category name, returning `None` for unknown names.
    pub fn parse(name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == name)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    #[default]
    #[serde(other)]
    Expense,
}

impl TransactionType {
    /// The type as sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Expense => "expense",
        }
    }
}

/// A single recorded expense or credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(rename = "_id", alias = "id")]
    pub id: ExpenseId,
    #[serde(default)]
    pub title: String,
    #[serde(deserialize_with = "amount_format::deserialize")]
    pub amount: f64,
    pub category: Category,
    #[serde(with = "date_format")]
    pub date: Date,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "transactionType", default)]
    pub transaction_type: TransactionType,
}

impl Expense {
    /// The fields of this expense as a draft, e.g. for pre-filling a form.
    pub fn to_draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            title: self.title.clone(),
            amount: self.amount,
            category: self.category,
            date: self.date,
            description: self.description.clone(),
            transaction_type: self.transaction_type,
        }
    }
}

/// The body of requests that create or update an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: f64,
    pub category: Category,
    #[serde(with = "date_format")]
    pub date: Date,
    pub description: String,
    #[serde(rename = "transactionType")]
    pub transaction_type: TransactionType,
}

/// The response of the expense list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ExpenseList {
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

/// One bar of the spending chart: the total spent in a category.
///
/// Computed by the API and passed through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingDatum {
    pub category: String,
    pub total: f64,
}

/// The response of the spending metrics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SpendingMetrics {
    #[serde(default)]
    pub spending: Vec<SpendingDatum>,
}
