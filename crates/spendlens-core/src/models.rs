//! Data models for Spendlens
//!
//! Wire shapes follow the remote API: camelCase field names, category labels
//! as sent by the server, numeric status codes.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    #[serde(rename = "餐饮美食")]
    Dining,
    #[serde(rename = "交通出行")]
    Transport,
    #[serde(rename = "办公耗材")]
    OfficeSupplies,
    #[serde(rename = "通讯网络")]
    Telecom,
    #[serde(rename = "电子设备")]
    Electronics,
    #[serde(rename = "其他")]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dining => "dining",
            Category::Transport => "transport",
            Category::OfficeSupplies => "office_supplies",
            Category::Telecom => "telecom",
            Category::Electronics => "electronics",
            Category::Other => "other",
        }
    }

    /// Label used by the remote API and for display
    pub fn label(&self) -> &'static str {
        match self {
            Category::Dining => "餐饮美食",
            Category::Transport => "交通出行",
            Category::OfficeSupplies => "办公耗材",
            Category::Telecom => "通讯网络",
            Category::Electronics => "电子设备",
            Category::Other => "其他",
        }
    }

    /// All categories in default display order
    pub fn all() -> &'static [Category] {
        &[
            Category::Dining,
            Category::Transport,
            Category::OfficeSupplies,
            Category::Telecom,
            Category::Electronics,
            Category::Other,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts either the wire label or the snake_case key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::all()
            .iter()
            .copied()
            .find(|c| c.label() == s || c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Category::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle status of a receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RecordStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Rejected,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Draft => "draft",
            RecordStatus::PendingApproval => "pending_approval",
            RecordStatus::Approved => "approved",
            RecordStatus::Rejected => "rejected",
        }
    }
}

impl TryFrom<u8> for RecordStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RecordStatus::Draft),
            1 => Ok(RecordStatus::PendingApproval),
            2 => Ok(RecordStatus::Approved),
            3 => Ok(RecordStatus::Rejected),
            _ => Err(format!("Unknown record status code: {}", code)),
        }
    }
}

impl From<RecordStatus> for u8 {
    fn from(status: RecordStatus) -> u8 {
        match status {
            RecordStatus::Draft => 0,
            RecordStatus::PendingApproval => 1,
            RecordStatus::Approved => 2,
            RecordStatus::Rejected => 3,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One captured receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: i64,
    #[serde(default)]
    pub merchant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
    /// Missing or null amounts count as zero
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Category>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ExpenseRecord {
    pub fn new(id: i64, merchant_name: impl Into<String>, amount: f64) -> Self {
        Self {
            id,
            merchant_name: merchant_name.into(),
            item_name: None,
            date: None,
            amount,
            category: None,
            status: RecordStatus::Draft,
            remark: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_item_name(mut self, item_name: impl Into<String>) -> Self {
        self.item_name = Some(item_name.into());
        self
    }

    /// Category used for grouping (unset falls into Other)
    pub fn category_or_other(&self) -> Category {
        self.category.unwrap_or(Category::Other)
    }

    /// Month this record falls in, if dated
    pub fn month(&self) -> Option<MonthKey> {
        self.date.map(MonthKey::of)
    }
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            // Some payloads carry a time component; only the date part matters
            let day = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid date {:?}: {}", s, e)))
        }
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn deserialize_optional_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::trim) {
        None | Some("") => None,
        // Labels outside the fixed set are grouped with Other
        Some(s) => Some(Category::from_str(s).unwrap_or(Category::Other)),
    })
}

/// A calendar month, formatted `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns None when month is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift by a number of months (negative goes back)
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn prev(&self) -> Self {
        self.offset(-1)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Short display label (`MM`)
    pub fn label(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key (use YYYY-MM): {}", s))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format!("Invalid month key (use YYYY-MM): {}", s));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month key: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in month key: {}", s))?;
        MonthKey::new(year, month).ok_or_else(|| format!("Month out of range: {}", s))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MonthKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A configured budget with the server-computed spend against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLine {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_category")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub limit_amount: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub used_amount: f64,
}
