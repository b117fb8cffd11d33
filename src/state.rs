use crate::{
    config::RuntimeConfiguration,
    data::{
        draft::{FormMode, StudentDraft},
        search::{SearchCriteria, SearchMode, SearchOutcome},
        student::{Student, StudentId, StudentPatch},
    },
    error::{RosterError, RosterResult},
    record_service::{RecordService, http::HttpRecordService},
    routes::sse::SseEvent,
};
use maud::{DOCTYPE, Markup, html};
use std::sync::Arc;
use tokio::sync::{
    RwLock,
    broadcast::{Receiver, Sender, channel},
};

/// The last full list fetched from the record service.
type Snapshot = Arc<[Student]>;

#[derive(Clone, Debug)]
pub struct RosterState {
    records: Arc<dyn RecordService>,
    snapshot: Arc<RwLock<Option<Snapshot>>>,
    config: RuntimeConfiguration,
    sse_events_sender: Sender<SseEvent>,
}

impl RosterState {
    pub fn new(config: RuntimeConfiguration) -> RosterResult<Self> {
        let records = HttpRecordService::new(&config.record_service())?;
        Ok(Self::with_record_service(config, Arc::new(records)))
    }

    pub fn with_record_service(
        config: RuntimeConfiguration,
        records: Arc<dyn RecordService>,
    ) -> Self {
        let (tx, _rx) = channel(16);

        Self {
            records,
            snapshot: Arc::new(RwLock::new(None)),
            config,
            sse_events_sender: tx,
        }
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    // error fragments carry the message the user needs to see, so swap them in too
                    meta name="htmx-config" content=r#"{"responseHandling":[{"code":"204","swap":false},{"code":"[2345]..","swap":true}]}"# {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-sse@2.2.3" integrity="sha384-Y4gc0CK6Kg+hmulDc6rZPJu0tqvk7EWlih0Oh+2OkAi1ZDlCbBDCQEE2uVk472Ky" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Roster" }
                }
                body hx-ext="sse" class="bg-gray-900 min-h-screen flex flex-col items-center text-white py-8" {
                    (markup)
                }
            }
        }
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    /// Fetches the full list and keeps it as the new snapshot.
    pub async fn refresh_snapshot(&self) -> RosterResult<Snapshot> {
        let students: Snapshot = self.records.list_all().await?.into();
        debug!(count = students.len(), "refreshed student snapshot");
        *self.snapshot.write().await = Some(students.clone());
        Ok(students)
    }

    /// The current snapshot, fetching one first if we have none.
    pub async fn snapshot(&self) -> RosterResult<Snapshot> {
        if let Some(students) = self.snapshot.read().await.clone() {
            return Ok(students);
        }
        self.refresh_snapshot().await
    }

    pub async fn invalidate_snapshot(&self) {
        *self.snapshot.write().await = None;
    }

    pub async fn find_student(&self, id: &StudentId) -> RosterResult<Student> {
        let find = |students: &[Student]| students.iter().find(|s| &s.id == id).cloned();

        if let Some(student) = find(&*self.snapshot().await?) {
            return Ok(student);
        }
        // might have been created somewhere else since our last fetch
        find(&*self.refresh_snapshot().await?).ok_or_else(|| RosterError::MissingStudent {
            id: id.to_string(),
        })
    }

    /// Works out which students to show for the given criteria, using the configured
    /// [`SearchMode`].
    pub async fn find_students(&self, criteria: &SearchCriteria) -> RosterResult<SearchOutcome> {
        match self.config.search_mode() {
            SearchMode::Client => {
                let students = self.snapshot().await?;
                Ok(SearchOutcome {
                    visible: criteria.filter(students.iter()),
                    total: Some(students.len()),
                })
            }
            SearchMode::Query => {
                let visible = self.records.list_filtered(criteria).await?;
                let total = criteria.is_empty().then_some(visible.len());
                Ok(SearchOutcome { visible, total })
            }
            SearchMode::Path => {
                // blank boxes would otherwise end up as `/search/name/%20`
                let criteria = criteria.without_blanks();
                self.search_one_field(&criteria).await
            }
        }
    }

    /// Path searches hit one field on the service; anything else set is narrowed down here.
    async fn search_one_field(&self, criteria: &SearchCriteria) -> RosterResult<SearchOutcome> {
        let Some(field) = criteria.first_active_field() else {
            let students = self.snapshot().await?;
            return Ok(SearchOutcome {
                visible: students.to_vec(),
                total: Some(students.len()),
            });
        };

        let found = self.records.search(field, criteria.value(field)).await?;
        Ok(SearchOutcome {
            visible: criteria.without(field).filter(&found),
            total: None,
        })
    }

    /// Validates the draft and creates or updates the student it describes. On success the
    /// draft goes back to an empty create form; on failure it is left alone so nothing typed
    /// is lost.
    pub async fn submit_draft(&self, draft: &mut StudentDraft) -> RosterResult<Option<Student>> {
        let payload = draft.validate()?;

        let saved = match &draft.mode {
            FormMode::Create => self.records.create(&payload).await?,
            FormMode::Edit(id) => self.records.update(id, &payload.into()).await?,
        };
        match &saved {
            Some(student) => info!(id = %student.id, "saved student"),
            None => info!("saved student, service sent nothing back we could read"),
        }

        self.after_mutation().await;
        draft.reset();
        Ok(saved)
    }

    /// Renames a student. Blank names and names that wouldn't change anything are skipped,
    /// returning `false`.
    pub async fn rename_student(&self, id: &StudentId, new_name: &str) -> RosterResult<bool> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Ok(false);
        }

        let current = self.find_student(id).await?;
        if current.name == new_name {
            return Ok(false);
        }

        self.records
            .update(id, &StudentPatch::rename(new_name))
            .await?;
        self.after_mutation().await;
        Ok(true)
    }

    pub async fn delete_student(&self, id: &StudentId) -> RosterResult<()> {
        self.records.delete(id).await?;
        self.after_mutation().await;
        Ok(())
    }

    async fn after_mutation(&self) {
        if let Err(e) = self.refresh_snapshot().await {
            warn!(?e, "unable to refresh students after a change");
            self.invalidate_snapshot().await;
        }
        self.send_sse_event(SseEvent::CrudStudent);
    }

    pub fn subscribe_to_sse_feed(&self) -> Receiver<SseEvent> {
        self.sse_events_sender.subscribe()
    }

    pub fn send_sse_event(&self, event: SseEvent) {
        let _ = self.sse_events_sender.send(event);
    }
}
