//! Dashboard statistics.
//!
//! `GET /statistics/dashboard` aggregates assignment counts by status and
//! invoiced/paid totals, optionally restricted to a date range.

use chrono::NaiveDate;
use expd_core::{decode_entity, Amount, EnvelopeShape, StatusRef};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::ApiClient;

const DASHBOARD_PATH: &str = "statistics/dashboard";

/// Number of assignments in one status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: StatusRef,
    pub count: u64,
}

/// Record counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default)]
    pub assignments: u64,
    #[serde(default)]
    pub vehicles: u64,
    #[serde(default)]
    pub invoices: u64,
    #[serde(default)]
    pub payments: u64,
}

/// Money figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Amounts {
    #[serde(default)]
    pub invoiced: Option<Amount>,
    #[serde(default)]
    pub paid: Option<Amount>,
    #[serde(default)]
    pub outstanding: Option<Amount>,
}

/// Dashboard figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub totals: Totals,
    #[serde(default)]
    pub assignments_by_status: Vec<StatusCount>,
    #[serde(default)]
    pub amounts: Amounts,
}

/// Optional reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Period {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Client for the statistics endpoints.
#[derive(Debug, Clone)]
pub struct StatisticsService {
    api: ApiClient,
}

impl StatisticsService {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Dashboard figures for `period`.
    ///
    /// Calls `GET {base}/statistics/dashboard?start_date=..&end_date=..`.
    pub async fn dashboard(&self, period: Period) -> Result<DashboardStats, ApiError> {
        let start = period.start.map(|d| d.to_string());
        let end = period.end.map(|d| d.to_string());
        let mut query = Vec::new();
        if let Some(start) = &start {
            query.push(("start_date", start.as_str()));
        }
        if let Some(end) = &end {
            query.push(("end_date", end.as_str()));
        }

        let body = self.api.get(DASHBOARD_PATH, &query).await?;
        decode_entity(EnvelopeShape::Either, &body).map_err(|source| ApiError::Decode {
            endpoint: format!("GET /{DASHBOARD_PATH}"),
            source,
        })
    }
}
