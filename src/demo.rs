//! Seeded in-memory backend for `--demo` runs.

use std::time::Duration;

use serde_json::json;

use crate::projects::PROJECT_TABLE;
use crate::record::MemoryTransport;
use crate::tasks::TASK_TABLE;
use crate::team::TEAM_TABLE;

pub fn transport(latency: Duration) -> MemoryTransport {
    MemoryTransport::new()
        .with_latency(latency)
        .require(PROJECT_TABLE.name, &["Name_c"])
        .require(TASK_TABLE.name, &["Title_c", "project_c"])
        .require(TEAM_TABLE.name, &["Name_c", "Email_c"])
        .seed(
            TEAM_TABLE.name,
            vec![
                json!({"Name_c": "Ada Lovelace", "Email_c": "ada@example.com", "Role_c": "Engineer"}),
                json!({"Name_c": "Grace Hopper", "Email_c": "grace@example.com", "Role_c": "Tech Lead"}),
                json!({"Name_c": "Alan Turing", "Email_c": "alan@example.com", "Role_c": "Designer"}),
            ],
        )
        .seed(
            PROJECT_TABLE.name,
            vec![
                json!({
                    "Name_c": "Website Redesign",
                    "Description_c": "New marketing site and docs portal",
                    "Status_c": "active",
                    "Start_Date_c": "2024-03-01",
                    "Due_Date_c": "2024-06-30",
                }),
                json!({
                    "Name_c": "Mobile App",
                    "Description_c": "First release of the companion app",
                    "Status_c": "planning",
                    "Due_Date_c": "2024-09-15",
                }),
                json!({
                    "Name_c": "Billing Migration",
                    "Status_c": "on-hold",
                }),
            ],
        )
        .seed(
            TASK_TABLE.name,
            vec![
                json!({
                    "Title_c": "Draft sitemap", "Status_c": "done", "Priority_c": "high",
                    "project_c": {"Id": 1, "Name": "Website Redesign"}, "Assigned_To_c": 2,
                }),
                json!({
                    "Title_c": "Build landing page", "Status_c": "in-progress",
                    "Priority_c": "high", "project_c": 1, "Assigned_To_c": 1,
                    "Due_Date_c": "2024-04-12",
                }),
                json!({
                    "Title_c": "Write copy", "Status_c": "todo", "Priority_c": "medium",
                    "project_c": 1, "Assigned_To_c": 3,
                }),
                json!({
                    "Title_c": "Set up analytics", "Status_c": "todo", "Priority_c": "low",
                    "project_c": 1,
                }),
                json!({
                    "Title_c": "Pick navigation pattern", "Status_c": "in-progress",
                    "project_c": {"Id": 2, "Name": "Mobile App"}, "Assigned_To_c": 1,
                }),
                json!({
                    "Title_c": "Audit invoices", "Status_c": "todo", "Priority_c": "medium",
                    "project_c": 3, "Assigned_To_c": 2,
                }),
            ],
        )
}
