use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{PROJECT_STATUS_COMPLETED, PROJECT_STATUS_PENDING, ROLE_ADMIN, ROLE_RESIDENT};

/// The closed set of project categories.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Sports,
    Culture,
    Education,
    Ecology,
    Infrastructure,
    Health,
    Safety,
    Social,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Sports,
        Category::Culture,
        Category::Education,
        Category::Ecology,
        Category::Infrastructure,
        Category::Health,
        Category::Safety,
        Category::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sports => "Sports",
            Category::Culture => "Culture",
            Category::Education => "Education",
            Category::Ecology => "Ecology",
            Category::Infrastructure => "Infrastructure",
            Category::Health => "Health",
            Category::Safety => "Safety",
            Category::Social => "Social",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Pending,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => PROJECT_STATUS_PENDING,
            ProjectStatus::Completed => PROJECT_STATUS_COMPLETED,
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PROJECT_STATUS_PENDING => Ok(ProjectStatus::Pending),
            PROJECT_STATUS_COMPLETED => Ok(ProjectStatus::Completed),
            other => Err(format!("Unknown project status: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Project {
    pub id: String,
    pub project_id: i64,
    pub title: String,
    pub photo_url: String,
    pub category: Category,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub description: String,
    pub location: String,
    pub coordinates: Coordinates,
    pub is_verified: bool,
    pub is_disabled: bool,
    pub status: ProjectStatus,
    pub date_added: String,
    pub date_ended: Option<String>,
    pub cost: f64,
    pub user_id: String,
    pub user_name: String,
    pub gathered_money: f64,
    pub funded_money: f64,
}

#[derive(Deserialize)]
pub struct CreateProjectPayload {
    pub title: String,
    #[serde(default)]
    pub photo_url: String,
    pub category: Category,
    #[serde(rename = "abstract", default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub coordinates: Coordinates,
    pub cost: f64,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub date_ended: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateProjectResponse {
    pub id: String,
    pub project_id: i64,
}

#[derive(Deserialize)]
pub struct SortQuery {
    pub field: Option<String>,
}

#[derive(Deserialize)]
pub struct GetProjectQuery {
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminQuery {
    pub admin_id: String,
}

#[derive(Deserialize)]
pub struct PayToProjectQuery {
    pub project_id: i64,
    pub payment_amount: f64,
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct FundProjectQuery {
    pub project_id: i64,
    pub payment_amount: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    MoneyDeposit,
    TokenDeposit,
    MoneyPayment,
    TokenPayment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::MoneyDeposit => "money_deposit",
            TransactionKind::TokenDeposit => "token_deposit",
            TransactionKind::MoneyPayment => "money_payment",
            TransactionKind::TokenPayment => "token_payment",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "money_deposit" => Ok(TransactionKind::MoneyDeposit),
            "token_deposit" => Ok(TransactionKind::TokenDeposit),
            "money_payment" => Ok(TransactionKind::MoneyPayment),
            "token_payment" => Ok(TransactionKind::TokenPayment),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WalletTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub timestamp: String,
    pub reference: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Wallet {
    pub user_id: String,
    pub money_balance: f64,
    pub token_balance: i64,
    pub bank_number: Option<String>,
    pub transaction_history: Vec<WalletTransaction>,
}

#[derive(Deserialize)]
pub struct CreateWalletQuery {
    pub bank_number: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoteOutcome {
    pub entity_id: String,
    pub user_id: String,
    pub value: i64,
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VoteTally {
    pub entity_id: String,
    pub upvotes: i64,
    pub downvotes: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryViews {
    pub category: Category,
    pub views: i64,
}

#[derive(Deserialize)]
pub struct FavoritesQuery {
    pub limit: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FavoriteCategoriesResponse {
    pub user_id: String,
    pub categories: Vec<CategoryViews>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryResponse {
    pub user_id: String,
    pub views: BTreeMap<Category, i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Resident,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Resident => ROLE_RESIDENT,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_RESIDENT => Ok(Role::Resident),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct CreateUserPayload {
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("sports".parse::<Category>(), Ok(Category::Sports));
        assert_eq!(" Culture ".parse::<Category>(), Ok(Category::Culture));
        assert!("Gardening".parse::<Category>().is_err());
    }

    #[test]
    fn category_strings_match_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn transaction_kind_round_trips_through_str() {
        for kind in [
            TransactionKind::MoneyDeposit,
            TransactionKind::TokenDeposit,
            TransactionKind::MoneyPayment,
            TransactionKind::TokenPayment,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>(), Ok(kind));
        }
    }
}
