use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::RecordId;
use crate::schema::{self, lenient_date, lenient_timestamp, Field, FieldAlias};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    OnHold,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planning,
        ProjectStatus::Active,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on-hold",
            ProjectStatus::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::Active => "Active",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown project status {s:?}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name_c", default)]
    pub name: String,
    #[serde(rename = "Description_c", default)]
    pub description: Option<String>,
    #[serde(rename = "Status_c", default)]
    pub status: ProjectStatus,
    #[serde(rename = "Start_Date_c", default, with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "Due_Date_c", default, with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "CreatedOn", default, with = "lenient_timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(rename = "ModifiedOn", default, with = "lenient_timestamp")]
    pub modified_on: Option<DateTime<Utc>>,
}

pub const PROJECT_ALIASES: &[FieldAlias] = &[
    FieldAlias { canonical: "Name_c", legacy: "name" },
    FieldAlias { canonical: "Description_c", legacy: "description" },
    FieldAlias { canonical: "Status_c", legacy: "status" },
    FieldAlias { canonical: "Start_Date_c", legacy: "startDate" },
    FieldAlias { canonical: "Due_Date_c", legacy: "dueDate" },
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(rename = "Name_c", default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(rename = "Description_c", default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(rename = "Status_c", default, skip_serializing_if = "Field::is_absent")]
    pub status: Field<ProjectStatus>,
    #[serde(rename = "Start_Date_c", default, skip_serializing_if = "Field::is_absent")]
    pub start_date: Field<NaiveDate>,
    #[serde(rename = "Due_Date_c", default, skip_serializing_if = "Field::is_absent")]
    pub due_date: Field<NaiveDate>,
}

impl ProjectInput {
    pub fn from_json(input: &Value) -> Result<Self, serde_json::Error> {
        schema::from_loose(input, PROJECT_ALIASES)
    }
}
