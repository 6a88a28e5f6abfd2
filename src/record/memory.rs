//! In-process record store speaking the same protocol as the hosted service.
//!
//! Backs the test suites and the `--demo` mode. Supports required-field
//! validation, per-operation failure injection and a call log.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use super::transport::RecordTransport;
use super::wire::{
    ByIdParams, Condition, DeletePayload, FetchParams, FieldError, FieldSelector, Operator,
    Record, RecordResponse, RecordResult, RecordsPayload, SortType,
};
use super::RecordId;
use crate::error::RecordError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Fetch,
    GetById,
    Create,
    Update,
    Delete,
}

/// How an injected failure presents itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The request never reaches the service.
    Transport(String),
    /// The service answers `success: false` with this message.
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub table: String,
}

#[derive(Debug, Default)]
struct Store {
    tables: HashMap<String, Vec<Record>>,
    next_ids: HashMap<String, i64>,
}

impl Store {
    fn next_id(&mut self, table: &str) -> i64 {
        let rows = self.tables.get(table);
        let max = rows
            .into_iter()
            .flatten()
            .filter_map(|r| r.get("Id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        let next = self.next_ids.entry(table.to_string()).or_insert(0);
        *next = (*next).max(max) + 1;
        *next
    }
}

#[derive(Debug, Default)]
pub struct MemoryTransport {
    store: Mutex<Store>,
    required: HashMap<String, Vec<String>>,
    failures: Mutex<HashMap<Op, Failure>>,
    calls: Mutex<Vec<Call>>,
    latency: Duration,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects creates (and updates that clear the field) on `table` when any
    /// of `fields` is missing, null or blank.
    pub fn require(mut self, table: &str, fields: &[&str]) -> Self {
        self.required.insert(
            table.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Inserts rows as-is. Rows without an `Id` get the next free one.
    pub fn seed(self, table: &str, rows: Vec<Value>) -> Self {
        if let Ok(mut store) = self.store.lock() {
            for row in rows {
                let Value::Object(mut record) = row else {
                    continue;
                };
                if !record.contains_key("Id") {
                    let id = store.next_id(table);
                    record.insert("Id".to_string(), json!(id));
                }
                store.tables.entry(table.to_string()).or_default().push(record);
            }
        }
        self
    }

    /// Makes every subsequent `op` fail until [`recover`](Self::recover) is called.
    pub fn fail(&self, op: Op, failure: Failure) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(op, failure);
        }
    }

    pub fn recover(&self) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.clear();
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, op: Op) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    /// The stored row, with every field.
    pub fn record(&self, table: &str, id: RecordId) -> Option<Record> {
        let store = self.store.lock().ok()?;
        store
            .tables
            .get(table)?
            .iter()
            .find(|r| row_id(r) == Some(id))
            .cloned()
    }

    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.store
            .lock()
            .ok()
            .and_then(|s| s.tables.get(table).cloned())
            .unwrap_or_default()
    }

    async fn enter(&self, op: Op, table: &str) -> Result<Option<RecordResponse>, RecordError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Call {
                op,
                table: table.to_string(),
            });
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|f| f.get(&op).cloned());
        match failure {
            Some(Failure::Transport(message)) => Err(RecordError::Transport(message)),
            Some(Failure::Remote(message)) => Ok(Some(RecordResponse::failed(message))),
            None => Ok(None),
        }
    }

    fn validate(&self, table: &str, record: &Record) -> Vec<FieldError> {
        self.required
            .get(table)
            .into_iter()
            .flatten()
            .filter(|field| match record.get(field.as_str()) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .map(|field| FieldError {
                field_label: field.clone(),
                message: "is required".to_string(),
            })
            .collect()
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, Store>, RecordError> {
        self.store
            .lock()
            .map_err(|_| RecordError::Transport("record store poisoned".to_string()))
    }
}

fn row_id(record: &Record) -> Option<RecordId> {
    record
        .get("Id")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn project(record: &Record, fields: &[FieldSelector]) -> Record {
    let mut out = Record::new();
    if let Some(id) = record.get("Id") {
        out.insert("Id".to_string(), id.clone());
    }
    for selector in fields {
        let name = &selector.field.name;
        if let Some(value) = record.get(name) {
            out.insert(name.clone(), value.clone());
        }
    }
    out
}

/// Lookup fields may be stored as `{"Id": n}`; comparisons use the id.
fn comparable(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get("Id").unwrap_or(value),
        other => other,
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (comparable(a), comparable(b)) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        (x, y) => x == y,
    }
}

fn matches(record: &Record, condition: &Condition) -> bool {
    let value = record.get(&condition.field_name).unwrap_or(&Value::Null);
    match condition.operator {
        Operator::EqualTo => condition.values.iter().any(|v| loose_eq(value, v)),
        Operator::NotEqualTo => !condition.values.iter().any(|v| loose_eq(value, v)),
        Operator::Contains => {
            let haystack = value.as_str().unwrap_or_default().to_lowercase();
            condition
                .values
                .iter()
                .filter_map(Value::as_str)
                .any(|needle| haystack.contains(&needle.to_lowercase()))
        }
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (comparable(a), comparable(b)) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RecordTransport for MemoryTransport {
    async fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> Result<RecordResponse, RecordError> {
        if let Some(failed) = self.enter(Op::Fetch, table).await? {
            return Ok(failed);
        }
        let store = self.lock_store()?;
        let mut rows: Vec<&Record> = store
            .tables
            .get(table)
            .into_iter()
            .flatten()
            .filter(|r| params.filters.iter().all(|c| matches(r, c)))
            .collect();
        for order in params.order_by.iter().rev() {
            rows.sort_by(|a, b| {
                let ord = compare(
                    a.get(&order.field_name).unwrap_or(&Value::Null),
                    b.get(&order.field_name).unwrap_or(&Value::Null),
                );
                match order.sorttype {
                    SortType::Asc => ord,
                    SortType::Desc => ord.reverse(),
                }
            });
        }
        let (offset, limit) = params
            .paging_info
            .map(|p| (p.offset as usize, p.limit as usize))
            .unwrap_or((0, usize::MAX));
        let data: Vec<Value> = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| Value::Object(project(r, &params.fields)))
            .collect();
        Ok(RecordResponse::ok(Value::Array(data)))
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &ByIdParams,
    ) -> Result<RecordResponse, RecordError> {
        if let Some(failed) = self.enter(Op::GetById, table).await? {
            return Ok(failed);
        }
        let store = self.lock_store()?;
        let found = store
            .tables
            .get(table)
            .into_iter()
            .flatten()
            .find(|r| row_id(r) == Some(id))
            .map(|r| Value::Object(project(r, &params.fields)))
            .unwrap_or(Value::Null);
        Ok(RecordResponse::ok(found))
    }

    async fn create_record(
        &self,
        table: &str,
        payload: &RecordsPayload,
    ) -> Result<RecordResponse, RecordError> {
        if let Some(failed) = self.enter(Op::Create, table).await? {
            return Ok(failed);
        }
        let mut results = Vec::with_capacity(payload.records.len());
        for record in &payload.records {
            let errors = self.validate(table, record);
            if !errors.is_empty() {
                results.push(RecordResult {
                    success: false,
                    errors,
                    ..RecordResult::default()
                });
                continue;
            }
            let mut store = self.lock_store()?;
            let id = store.next_id(table);
            let now = Utc::now().to_rfc3339();
            let mut row = record.clone();
            row.insert("Id".to_string(), json!(id));
            row.insert("CreatedOn".to_string(), json!(now));
            row.insert("ModifiedOn".to_string(), json!(now));
            store
                .tables
                .entry(table.to_string())
                .or_default()
                .push(row.clone());
            results.push(RecordResult {
                success: true,
                data: Some(Value::Object(row)),
                ..RecordResult::default()
            });
        }
        Ok(RecordResponse::batch(results))
    }

    async fn update_record(
        &self,
        table: &str,
        payload: &RecordsPayload,
    ) -> Result<RecordResponse, RecordError> {
        if let Some(failed) = self.enter(Op::Update, table).await? {
            return Ok(failed);
        }
        let mut store = self.lock_store()?;
        let mut results = Vec::with_capacity(payload.records.len());
        for changes in &payload.records {
            let Some(id) = row_id(changes) else {
                results.push(RecordResult {
                    success: false,
                    message: Some("Record Id is required".to_string()),
                    ..RecordResult::default()
                });
                continue;
            };
            let rows = store.tables.entry(table.to_string()).or_default();
            let Some(row) = rows.iter_mut().find(|r| row_id(r) == Some(id)) else {
                results.push(RecordResult {
                    success: false,
                    message: Some(format!("Record {id} not found")),
                    ..RecordResult::default()
                });
                continue;
            };
            let mut merged = row.clone();
            for (key, value) in changes {
                merged.insert(key.clone(), value.clone());
            }
            let errors = self.validate(table, &merged);
            if !errors.is_empty() {
                results.push(RecordResult {
                    success: false,
                    errors,
                    ..RecordResult::default()
                });
                continue;
            }
            merged.insert("ModifiedOn".to_string(), json!(Utc::now().to_rfc3339()));
            *row = merged.clone();
            results.push(RecordResult {
                success: true,
                data: Some(Value::Object(merged)),
                ..RecordResult::default()
            });
        }
        Ok(RecordResponse::batch(results))
    }

    async fn delete_record(
        &self,
        table: &str,
        payload: &DeletePayload,
    ) -> Result<RecordResponse, RecordError> {
        if let Some(failed) = self.enter(Op::Delete, table).await? {
            return Ok(failed);
        }
        let mut store = self.lock_store()?;
        let rows = store.tables.entry(table.to_string()).or_default();
        let results = payload
            .record_ids
            .iter()
            .map(|id| match rows.iter().position(|r| row_id(r) == Some(*id)) {
                Some(index) => {
                    rows.remove(index);
                    RecordResult {
                        success: true,
                        ..RecordResult::default()
                    }
                }
                None => RecordResult {
                    success: false,
                    message: Some(format!("Record {id} not found")),
                    ..RecordResult::default()
                },
            })
            .collect();
        Ok(RecordResponse::batch(results))
    }
}
