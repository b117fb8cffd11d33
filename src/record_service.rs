use crate::{
    data::{
        search::{SearchCriteria, SearchField},
        student::{Student, StudentId, StudentPatch, StudentPayload},
    },
    error::RosterResult,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod http;
#[cfg(test)]
pub mod memory;

/// The remote service that actually owns student records.
///
/// Every call is a single request: no retries, no caching. Failures come back as
/// [`crate::error::RosterError`]s tagged with the [`crate::error::RecordAction`] that failed.
#[async_trait]
pub trait RecordService: Send + Sync + Debug {
    async fn list_all(&self) -> RosterResult<Vec<Student>>;
    /// Server-side filtering through query parameters; empty criteria are not sent.
    async fn list_filtered(&self, criteria: &SearchCriteria) -> RosterResult<Vec<Student>>;
    /// Server-side filtering on a single field through the dedicated search paths.
    async fn search(&self, field: SearchField, value: &str) -> RosterResult<Vec<Student>>;
    /// The stored student, or `None` when the service accepted the write but sent back
    /// something we can't read.
    async fn create(&self, student: &StudentPayload) -> RosterResult<Option<Student>>;
    async fn update(&self, id: &StudentId, patch: &StudentPatch) -> RosterResult<Option<Student>>;
    async fn delete(&self, id: &StudentId) -> RosterResult<()>;
}
