use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::RawField;

/// The three inventory categories a branch keeps boxes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoxType {
    /// Early Learning
    #[serde(rename = "EL")]
    EarlyLearning,
    Kids,
    Teens,
}

impl BoxType {
    pub const ALL: [BoxType; 3] = [BoxType::EarlyLearning, BoxType::Kids, BoxType::Teens];

    pub fn as_str(self) -> &'static str {
        match self {
            BoxType::EarlyLearning => "EL",
            BoxType::Kids => "Kids",
            BoxType::Teens => "Teens",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BoxType::EarlyLearning => "Early Learning",
            BoxType::Kids => "Kids",
            BoxType::Teens => "Teens",
        }
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown box type '{0}', expected one of EL, Kids, Teens")]
pub struct UnknownBoxType(pub String);

impl FromStr for BoxType {
    type Err = UnknownBoxType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EL" => Ok(BoxType::EarlyLearning),
            "Kids" => Ok(BoxType::Kids),
            "Teens" => Ok(BoxType::Teens),
            other => Err(UnknownBoxType(other.to_string())),
        }
    }
}

impl TryFrom<String> for BoxType {
    type Error = UnknownBoxType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ----- Stored rows -----

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Library {
    pub id: i64,
    pub name: String,
    pub short_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: String,
}

/// A user joined with its library name, including the password hash.
/// Never serialized; responses use [`UserProfile`] or [`UserSummary`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub library_id: i64,
    pub library_name: String,
    pub is_admin: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub library_id: i64,
    pub library_name: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<UserRecord> for UserSummary {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            username: u.username,
            library_id: u.library_id,
            library_name: u.library_name,
            is_admin: u.is_admin,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub library_id: i64,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoxInventory {
    pub id: i64,
    pub library_id: i64,
    #[sqlx(try_from = "String")]
    pub box_type: BoxType,
    pub quantity: i64,
    pub updated_at: String,
}

/// One row of the cross-branch snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryRow {
    pub id: i64,
    pub library_id: i64,
    #[sqlx(try_from = "String")]
    pub box_type: BoxType,
    pub quantity: i64,
    pub updated_at: String,
    pub library_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    pub library_id: i64,
    #[sqlx(try_from = "String")]
    pub box_type: BoxType,
    pub quantity: i64,
    pub changed_by: i64,
    pub change_date: String,
    pub library_name: String,
    pub changed_by_user: String,
}

/// A library with coordinates left-joined against its inventory; one row per
/// inventory row, or a single row with empty inventory columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MapRow {
    pub library_id: i64,
    pub library_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub box_type: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub library_id: i64,
    pub library_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub inventory: BTreeMap<BoxType, i64>,
    pub total_boxes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub libraries: i64,
    pub total_boxes: i64,
    pub by_type: BTreeMap<BoxType, i64>,
}

/// Location fields applied to an existing library during an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryLocation {
    pub short_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ----- Request / response bodies -----

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: RawField,
    #[serde(default)]
    pub password: RawField,
}

/// Denormalized profile echoed on login and embedded in the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub library_id: i64,
    pub library_name: String,
    pub is_admin: bool,
}

impl From<&UserRecord> for UserProfile {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            library_id: u.library_id,
            library_name: u.library_name.clone(),
            is_admin: u.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: RawField,
    #[serde(default)]
    pub new_password: RawField,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLibraryRequest {
    #[serde(default)]
    pub name: RawField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLibraryResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: RawField,
    #[serde(default)]
    pub password: RawField,
    #[serde(default)]
    pub library_id: RawField,
    #[serde(default)]
    pub is_admin: RawField,
}

/// Body of `PUT /api/inventory/update`. `library_id` is only honored for admins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInventoryRequest {
    #[serde(default)]
    pub library_id: RawField,
    #[serde(default)]
    pub box_type: RawField,
    #[serde(default)]
    pub quantity: RawField,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportLibraryRecord {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub location: LibraryLocation,
    #[serde(default)]
    pub quantities: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
