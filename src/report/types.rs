// src/report/types.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Pollution,
    Waste,
    Water,
    Deforestation,
    Wildlife,
    Other,
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportCategory::Pollution => write!(f, "pollution"),
            ReportCategory::Waste => write!(f, "waste"),
            ReportCategory::Water => write!(f, "water"),
            ReportCategory::Deforestation => write!(f, "deforestation"),
            ReportCategory::Wildlife => write!(f, "wildlife"),
            ReportCategory::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for ReportCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pollution" => Ok(ReportCategory::Pollution),
            "waste" => Ok(ReportCategory::Waste),
            "water" => Ok(ReportCategory::Water),
            "deforestation" => Ok(ReportCategory::Deforestation),
            "wildlife" => Ok(ReportCategory::Wildlife),
            "other" => Ok(ReportCategory::Other),
            _ => Err(format!("Unknown report category: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Pending,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
        ReportStatus::Rejected,
    ];
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "in_progress" => Ok(ReportStatus::InProgress),
            "resolved" => Ok(ReportStatus::Resolved),
            "rejected" => Ok(ReportStatus::Rejected),
            _ => Err(format!("Unknown report status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemReport {
    pub id: String,
    pub reporter_id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub status: ReportStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

// category and status are TEXT columns
#[derive(FromRow)]
pub(crate) struct ReportRow {
    pub id: String,
    pub reporter_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<ReportRow> for ProblemReport {
    type Error = StoreError;

    fn try_from(r: ReportRow) -> Result<Self, Self::Error> {
        let category = r
            .category
            .parse::<ReportCategory>()
            .map_err(|e| StoreError::Corrupt(format!("report {}: {e}", r.id)))?;
        let status = r
            .status
            .parse::<ReportStatus>()
            .map_err(|e| StoreError::Corrupt(format!("report {}: {e}", r.id)))?;
        Ok(ProblemReport {
            id: r.id,
            reporter_id: r.reporter_id,
            title: r.title,
            description: r.description,
            category,
            location: r.location,
            latitude: r.latitude,
            longitude: r.longitude,
            image_url: r.image_url,
            status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

// Request types for API

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReportRequest {
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ReportStatus,
}

/// Raw `?status=&category=` filters; parsed in the handler so bad values get a clear 400.
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilterQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub category: Option<ReportCategory>,
}
