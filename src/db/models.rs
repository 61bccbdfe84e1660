//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Certificate model
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub filename: String,
    pub filepath: String,
    pub upload_date: Option<NaiveDateTime>,
}

/// New certificate for insertion
#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub filename: String,
    pub filepath: String,
}

/// Review model
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub name: String,
    pub rating: i64,
    pub comment: String,
    pub date: Option<NaiveDate>,
}

/// New review for insertion
#[derive(Debug, Clone)]
pub struct NewReview {
    pub name: String,
    pub rating: i64,
    pub comment: String,
}

/// Aggregate over all reviews; `average` is `None` when there are none.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: i64,
    pub average: Option<f64>,
    pub five_star: i64,
    pub four_star: i64,
    pub three_star: i64,
    pub two_star: i64,
    pub one_star: i64,
}
