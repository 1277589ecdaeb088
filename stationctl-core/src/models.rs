//! Row types for the three tables plus the JSON import records.
//!
//! Import records use `#[serde(default)]` on every field: a missing key
//! becomes an empty string or zero and is left for the database constraints
//! to accept or reject.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Station {
    pub id: i64,
    pub title: String,
    pub city: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Position {
    pub id: i64,
    pub title: String,
    pub add_date: String,
    pub salary: i64,
}

impl Position {
    /// Salary after withholding `tax_percent` percent
    pub fn net_salary(&self, tax_percent: u8) -> f64 {
        let percent = f64::from(tax_percent.min(100));
        self.salary as f64 * (100.0 - percent) / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub full_name: String,
    pub start_date: String,
    /// Only NULL while a swap is in flight
    pub station_id: Option<i64>,
    pub position_id: i64,
}

/// Employee joined with the titles of its position and station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct EmployeeView {
    pub id: i64,
    pub full_name: String,
    pub start_date: String,
    pub station_id: Option<i64>,
    pub position_id: i64,
    pub position_title: Option<String>,
    pub station_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewStation {
    pub title: String,
    pub city: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewPosition {
    pub title: String,
    pub add_date: String,
    pub salary: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewEmployee {
    pub full_name: String,
    pub start_date: String,
    pub station_id: i64,
    pub position_id: i64,
}

/// Row ordering for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Insertion order
    #[default]
    Id,
    /// Title ascending (full name for employees)
    Title,
}

impl SortOrder {
    pub fn from_title_sort(title_sort: bool) -> Self {
        if title_sort {
            SortOrder::Title
        } else {
            SortOrder::Id
        }
    }
}
