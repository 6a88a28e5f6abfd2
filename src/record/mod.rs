//! Client for the hosted tabular record service.
//!
//! Every primitive comes in two forms. The `try_*` form returns
//! `Result<_, RecordError>`. The plain form logs the failure, raises an error
//! notification and returns an empty default (`Vec::new()`, `None`, `false`),
//! so the layers above never see an error.

pub mod id;
pub mod memory;
pub mod transport;
pub mod wire;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use id::RecordId;
pub use memory::MemoryTransport;
pub use transport::{HttpTransport, RecordTransport};
pub use wire::{
    ByIdParams, Condition, DeletePayload, FetchParams, FieldError, FieldSelector, Operator,
    OrderBy, PagingInfo, Record, RecordResponse, RecordResult, RecordsPayload, SortType,
};

use crate::error::{RecordError, RecordFailure};
use crate::notify::Notifier;

/// A remote table and the fields queried from it.
///
/// The record service only returns fields that are asked for, so every
/// table declares its projection explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

impl Table {
    pub fn selectors(&self) -> Vec<FieldSelector> {
        self.fields.iter().map(|f| FieldSelector::named(f)).collect()
    }
}

/// Filters, ordering and page size for `list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Condition>,
    pub order_by: Vec<OrderBy>,
    pub page_size: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, operator: Operator, value: impl Into<Value>) -> Self {
        self.filters.push(Condition {
            field_name: field.to_string(),
            operator,
            values: vec![value.into()],
        });
        self
    }

    pub fn equal_to(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, Operator::EqualTo, value)
    }

    pub fn order_by(mut self, field: &str, sorttype: SortType) -> Self {
        self.order_by.push(OrderBy {
            field_name: field.to_string(),
            sorttype,
        });
        self
    }

    pub fn page_size(mut self, limit: u32) -> Self {
        self.page_size = Some(limit);
        self
    }

    fn to_params(&self, table: &Table) -> FetchParams {
        FetchParams {
            fields: table.selectors(),
            filters: self.filters.clone(),
            order_by: self.order_by.clone(),
            paging_info: self.page_size.map(|limit| PagingInfo { limit, offset: 0 }),
        }
    }
}

/// Records accepted and rejected by one create/update batch.
///
/// `accepted` counts every accepted entry. The service may accept a record
/// without echoing it back, so `succeeded` can be shorter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub accepted: usize,
    pub succeeded: Vec<Record>,
    pub failed: Vec<RecordFailure>,
}

/// Uniform wrapper around a [`RecordTransport`].
///
/// Cheap to clone; the transport and notifier are shared.
#[derive(Clone)]
pub struct RecordClient {
    transport: Arc<dyn RecordTransport>,
    notifier: Arc<dyn Notifier>,
}

impl RecordClient {
    pub fn new(transport: Arc<dyn RecordTransport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
        }
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub async fn try_list(
        &self,
        table: &Table,
        query: &ListQuery,
    ) -> Result<Vec<Record>, RecordError> {
        let response = self
            .transport
            .fetch_records(table.name, &query.to_params(table))
            .await?;
        match expect_success(response)?.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => Ok(serde_json::from_value(data)?),
        }
    }

    pub async fn try_get_by_id(
        &self,
        table: &Table,
        id: RecordId,
    ) -> Result<Option<Record>, RecordError> {
        let params = ByIdParams {
            fields: table.selectors(),
        };
        let response = self
            .transport
            .get_record_by_id(table.name, id, &params)
            .await?;
        match expect_success(response)?.data {
            None | Some(Value::Null) => Ok(None),
            Some(data) => Ok(Some(serde_json::from_value(data)?)),
        }
    }

    pub async fn try_create(
        &self,
        table: &Table,
        records: Vec<Record>,
    ) -> Result<BatchOutcome, RecordError> {
        let payload = RecordsPayload { records };
        let response = self.transport.create_record(table.name, &payload).await?;
        split_batch(response)
    }

    pub async fn try_update(
        &self,
        table: &Table,
        records: Vec<Record>,
    ) -> Result<BatchOutcome, RecordError> {
        let payload = RecordsPayload { records };
        let response = self.transport.update_record(table.name, &payload).await?;
        split_batch(response)
    }

    pub async fn try_delete(&self, table: &Table, ids: &[RecordId]) -> Result<(), RecordError> {
        let payload = DeletePayload {
            record_ids: ids.to_vec(),
        };
        let response = self.transport.delete_record(table.name, &payload).await?;
        let response = expect_success(response)?;
        let failures: Vec<RecordFailure> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .filter(|r| !r.success)
            .map(|r| RecordFailure {
                message: r.message,
                errors: r.errors,
            })
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RecordError::Batch { failures })
        }
    }

    /// Every row of `table` matching `query`. Rows that do not decode as `T`
    /// are logged and skipped.
    pub async fn list<T: DeserializeOwned>(&self, table: &Table, query: &ListQuery) -> Vec<T> {
        match self.try_list(table, query).await {
            Ok(records) => records
                .into_iter()
                .filter_map(|record| match decode::<T>(record) {
                    Ok(row) => Some(row),
                    Err(e) => {
                        tracing::warn!(table = table.name, error = %e, "skipping malformed row");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                self.report(table, "fetch", &e);
                Vec::new()
            }
        }
    }

    pub async fn get_by_id<T: DeserializeOwned>(&self, table: &Table, id: RecordId) -> Option<T> {
        let record = match self.try_get_by_id(table, id).await {
            Ok(record) => record?,
            Err(e) => {
                self.report(table, "get", &e);
                return None;
            }
        };
        self.decode_or_report(table, "get", record)
    }

    /// Creates `records`; returns the first accepted one.
    pub async fn create<T: DeserializeOwned>(
        &self,
        table: &Table,
        records: Vec<Record>,
    ) -> Option<T> {
        let outcome = self.try_create(table, records).await;
        self.first_accepted(table, "create", outcome, None).await
    }

    /// Partially updates one record. Only the keys present in `fields` are sent.
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &Table,
        id: RecordId,
        mut fields: Record,
    ) -> Option<T> {
        fields.insert("Id".to_string(), Value::from(id.get()));
        self.update_batch(table, vec![fields]).await
    }

    /// Updates several records; each must carry its `Id`. Returns the first accepted one.
    pub async fn update_batch<T: DeserializeOwned>(
        &self,
        table: &Table,
        records: Vec<Record>,
    ) -> Option<T> {
        let sent_id = match records.as_slice() {
            [only] => record_id(only),
            _ => None,
        };
        let outcome = self.try_update(table, records).await;
        self.first_accepted(table, "update", outcome, sent_id).await
    }

    /// Partially updates one record and reports whether the service accepted
    /// it. The reply body is not decoded.
    pub async fn patch(&self, table: &Table, id: RecordId, mut fields: Record) -> bool {
        fields.insert("Id".to_string(), Value::from(id.get()));
        match self.try_update(table, vec![fields]).await {
            Ok(outcome) => {
                self.surface_failures(table, "update", &outcome.failed);
                outcome.failed.is_empty() && outcome.accepted > 0
            }
            Err(e) => {
                self.report(table, "update", &e);
                false
            }
        }
    }

    pub async fn delete(&self, table: &Table, ids: &[RecordId]) -> bool {
        if ids.is_empty() {
            return true;
        }
        match self.try_delete(table, ids).await {
            Ok(()) => true,
            Err(e) => {
                self.report(table, "delete", &e);
                false
            }
        }
    }

    /// Resolves the first accepted record of a batch into `T`.
    ///
    /// A reply that is missing or carries only some fields is completed by
    /// reading the record back, using its echoed `Id` or `sent_id`.
    async fn first_accepted<T: DeserializeOwned>(
        &self,
        table: &Table,
        op: &'static str,
        outcome: Result<BatchOutcome, RecordError>,
        sent_id: Option<RecordId>,
    ) -> Option<T> {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report(table, op, &e);
                return None;
            }
        };
        self.surface_failures(table, op, &outcome.failed);
        if outcome.accepted == 0 {
            return None;
        }
        let first = outcome.succeeded.into_iter().next();
        let id = first.as_ref().and_then(record_id).or(sent_id);
        if let Some(record) = first {
            match decode(record) {
                Ok(row) => return Some(row),
                Err(e) if id.is_none() => {
                    self.report(table, op, &RecordError::Decode(e));
                    return None;
                }
                Err(e) => {
                    tracing::debug!(table = table.name, op, error = %e, "partial record in reply, reading back");
                }
            }
        }
        match id {
            Some(id) => self.get_by_id(table, id).await,
            None => {
                tracing::warn!(table = table.name, op, "record accepted without an id in the reply");
                None
            }
        }
    }

    fn decode_or_report<T: DeserializeOwned>(
        &self,
        table: &Table,
        op: &'static str,
        record: Record,
    ) -> Option<T> {
        match decode(record) {
            Ok(row) => Some(row),
            Err(e) => {
                self.report(table, op, &RecordError::Decode(e));
                None
            }
        }
    }

    fn surface_failures(&self, table: &Table, op: &'static str, failures: &[RecordFailure]) {
        for failure in failures {
            tracing::error!(table = table.name, op, ?failure, "record rejected");
            for line in failure.messages() {
                self.notifier.error(&line);
            }
        }
    }

    fn report(&self, table: &Table, op: &'static str, error: &RecordError) {
        match error {
            RecordError::Batch { failures } => self.surface_failures(table, op, failures),
            _ => {
                tracing::error!(table = table.name, op, error = %error, "record request failed");
                self.notifier.error(&error.to_string());
            }
        }
    }
}

/// The `Id` a row carries, if any.
pub fn record_id(record: &Record) -> Option<RecordId> {
    record
        .get("Id")
        .and_then(|id| serde_json::from_value(id.clone()).ok())
}

fn decode<T: DeserializeOwned>(record: Record) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(record))
}

fn expect_success(response: RecordResponse) -> Result<RecordResponse, RecordError> {
    if response.success {
        Ok(response)
    } else {
        Err(RecordError::Remote {
            message: response
                .message
                .unwrap_or_else(|| "Record service request failed".to_string()),
        })
    }
}

/// Splits a create/update response into accepted and rejected records.
///
/// A response with no `results` array counts as one accepted record,
/// echoed in `data` when present. When nothing was accepted the rejections
/// are returned as [`RecordError::Batch`].
fn split_batch(response: RecordResponse) -> Result<BatchOutcome, RecordError> {
    let response = expect_success(response)?;
    let mut outcome = BatchOutcome::default();
    match response.results {
        Some(results) => {
            for result in results {
                if result.success {
                    outcome.accepted += 1;
                    if let Some(data) = result.data.filter(|d| !d.is_null()) {
                        outcome.succeeded.push(serde_json::from_value(data)?);
                    }
                } else {
                    outcome.failed.push(RecordFailure {
                        message: result.message,
                        errors: result.errors,
                    });
                }
            }
        }
        None => {
            outcome.accepted = 1;
            if let Some(data) = response.data.filter(|d| !d.is_null()) {
                outcome.succeeded.push(serde_json::from_value(data)?);
            }
        }
    }
    if outcome.accepted == 0 && !outcome.failed.is_empty() {
        return Err(RecordError::Batch {
            failures: outcome.failed,
        });
    }
    Ok(outcome)
}
