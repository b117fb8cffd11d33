use crate::{
    config::RecordServiceConfig,
    data::{
        search::{SearchCriteria, SearchField},
        student::{Student, StudentId, StudentPatch, StudentPayload},
    },
    error::{
        BuildClientSnafu, DecodeRecordsSnafu, RecordAction, RecordServiceStatusSnafu,
        RecordServiceUnreachableSnafu, RosterResult,
    },
    record_service::RecordService,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use snafu::{ResultExt, ensure};

/// Talks JSON to the record service under `{base}/students`.
#[derive(Clone, Debug)]
pub struct HttpRecordService {
    client: Client,
    base_url: Url,
}

impl HttpRecordService {
    pub fn new(config: &RecordServiceConfig) -> RosterResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context(BuildClientSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
        })
    }

    /// `{base}/students/{extra...}`, each extra piece encoded as a single path segment.
    fn students_url<'a>(&self, extra: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        //config only lets through URLs that can be a base, so this always works
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("students").extend(extra);
        }
        url
    }

    async fn checked(request: RequestBuilder, action: RecordAction) -> RosterResult<Response> {
        let response = request
            .send()
            .await
            .context(RecordServiceUnreachableSnafu { action })?;

        let status = response.status();
        ensure!(
            status.is_success(),
            RecordServiceStatusSnafu { status, action }
        );

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(
        request: RequestBuilder,
        action: RecordAction,
    ) -> RosterResult<T> {
        Self::checked(request, action)
            .await?
            .json()
            .await
            .context(DecodeRecordsSnafu { action })
    }

    /// Writes only need a 2xx; the body is a bonus.
    async fn save(request: RequestBuilder, action: RecordAction) -> RosterResult<Option<Student>> {
        let response = Self::checked(request, action).await?;
        match response.json().await {
            Ok(student) => Ok(Some(student)),
            Err(e) => {
                warn!(?e, %action, "saved, but unable to decode the returned student");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl RecordService for HttpRecordService {
    async fn list_all(&self) -> RosterResult<Vec<Student>> {
        let url = self.students_url([]);
        debug!(%url, "listing all students");
        Self::fetch(self.client.get(url), RecordAction::LoadStudents).await
    }

    async fn list_filtered(&self, criteria: &SearchCriteria) -> RosterResult<Vec<Student>> {
        let mut url = self.students_url([]);
        let params = [
            ("name", criteria.name.as_str()),
            ("phoneNo", criteria.phone_no.as_str()),
            ("courseName", criteria.course_name.as_str()),
        ];
        if params.iter().any(|(_, value)| !value.is_empty()) {
            let mut query = url.query_pairs_mut();
            for (key, value) in params.into_iter().filter(|(_, value)| !value.is_empty()) {
                query.append_pair(key, value);
            }
        }

        debug!(%url, "listing filtered students");
        Self::fetch(self.client.get(url), RecordAction::LoadStudents).await
    }

    async fn search(&self, field: SearchField, value: &str) -> RosterResult<Vec<Student>> {
        let url = self.students_url(["search", field.path_segment(), value]);
        debug!(%url, "searching students");
        Self::fetch(self.client.get(url), RecordAction::Search).await
    }

    async fn create(&self, student: &StudentPayload) -> RosterResult<Option<Student>> {
        let url = self.students_url([]);
        info!(name = %student.name, "creating student");
        Self::save(self.client.post(url).json(student), RecordAction::Create).await
    }

    async fn update(&self, id: &StudentId, patch: &StudentPatch) -> RosterResult<Option<Student>> {
        let url = self.students_url([id.as_ref()]);
        let action = if patch.phone_no.is_none() && patch.courses.is_none() {
            RecordAction::Rename
        } else {
            RecordAction::Update
        };
        info!(%id, ?action, "updating student");
        Self::save(self.client.put(url).json(patch), action).await
    }

    async fn delete(&self, id: &StudentId) -> RosterResult<()> {
        let url = self.students_url([id.as_ref()]);
        info!(%id, "deleting student");
        Self::checked(self.client.delete(url), RecordAction::Delete).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::student::Course, error::RosterError};
    use axum::{
        Json, Router,
        body::Bytes,
        extract::{OriginalUri, State},
        http::{Method, StatusCode},
        response::IntoResponse,
    };
    use serde_json::{Value, json};
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tokio::net::TcpListener;

    /// Every request the fake service saw: method, path+query, body.
    type Seen = Arc<Mutex<Vec<(Method, String, String)>>>;

    async fn fake_service(status: StatusCode, reply: Value) -> (HttpRecordService, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .fallback(
                |State((seen, status, reply)): State<(Seen, StatusCode, Value)>,
                 method: Method,
                 OriginalUri(uri): OriginalUri,
                 body: Bytes| async move {
                    seen.lock().unwrap().push((
                        method,
                        uri.to_string(),
                        String::from_utf8_lossy(&body).into_owned(),
                    ));
                    (status, Json(reply)).into_response()
                },
            )
            .with_state((seen.clone(), status, reply));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let config =
            RecordServiceConfig::from_parts(&format!("http://{addr}/"), Duration::from_secs(5))
                .unwrap();
        (HttpRecordService::new(&config).unwrap(), seen)
    }

    fn one_student() -> Value {
        json!({
            "id": "abc123",
            "name": "Asha",
            "phoneNo": "555",
            "courses": [{"courseId": "CS101", "courseName": "Java"}]
        })
    }

    #[tokio::test]
    async fn lists_everyone() {
        let (service, seen) = fake_service(StatusCode::OK, json!([one_student()])).await;

        let students = service.list_all().await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].courses, vec![Course::new("CS101", "Java")]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, Method::GET);
        assert_eq!(seen[0].1, "/students");
    }

    #[tokio::test]
    async fn only_non_empty_criteria_become_query_params() {
        let (service, seen) = fake_service(StatusCode::OK, json!([])).await;

        service
            .list_filtered(&SearchCriteria {
                name: "asha rao".into(),
                phone_no: String::new(),
                course_name: "Java".into(),
            })
            .await
            .unwrap();
        service
            .list_filtered(&SearchCriteria::default())
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].1, "/students?name=asha+rao&courseName=Java");
        assert_eq!(seen[1].1, "/students");
    }

    #[tokio::test]
    async fn search_values_are_one_encoded_segment() {
        let (service, seen) = fake_service(StatusCode::OK, json!([])).await;

        service.search(SearchField::Course, "C/C++ basics").await.unwrap();
        service.search(SearchField::Phone, "98765").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].1, "/students/search/course/C%2FC++%20basics");
        assert_eq!(seen[1].1, "/students/search/phone/98765");
    }

    #[tokio::test]
    async fn writes_send_json_bodies() {
        let (service, seen) = fake_service(StatusCode::OK, one_student()).await;
        let id = StudentId("abc123".into());

        let created = service
            .create(&StudentPayload {
                name: "Asha".into(),
                phone_no: "555".into(),
                courses: vec![Course::new("CS101", "Java")],
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.id, id);

        service
            .update(&id, &StudentPatch::rename("Asha R"))
            .await
            .unwrap();
        service.delete(&id).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, Method::POST);
        assert_eq!(seen[0].1, "/students");
        assert_eq!(
            serde_json::from_str::<Value>(&seen[0].2).unwrap(),
            json!({"name": "Asha", "phoneNo": "555", "courses": [{"courseId": "CS101", "courseName": "Java"}]})
        );
        assert_eq!(seen[1].0, Method::PUT);
        assert_eq!(seen[1].1, "/students/abc123");
        assert_eq!(
            serde_json::from_str::<Value>(&seen[1].2).unwrap(),
            json!({"name": "Asha R"})
        );
        assert_eq!(seen[2].0, Method::DELETE);
        assert_eq!(seen[2].1, "/students/abc123");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_the_action() {
        let (service, _) = fake_service(StatusCode::INTERNAL_SERVER_ERROR, json!({})).await;

        let err = service.delete(&StudentId("x".into())).await.unwrap_err();
        assert!(matches!(
            err,
            RosterError::RecordServiceStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                action: RecordAction::Delete,
            }
        ));
        assert_eq!(err.user_message(), "Delete failed");
    }

    #[tokio::test]
    async fn writes_succeed_even_when_the_reply_is_unreadable() {
        let (service, _) = fake_service(StatusCode::CREATED, json!(null)).await;

        let created = service
            .create(&StudentPayload {
                name: "Asha".into(),
                phone_no: "555".into(),
                courses: vec![Course::new("CS101", "Java")],
            })
            .await
            .unwrap();
        assert_eq!(created, None);

        let updated = service
            .update(&StudentId("abc123".into()), &StudentPatch::rename("Asha R"))
            .await
            .unwrap();
        assert_eq!(updated, None);
    }

    #[tokio::test]
    async fn garbage_bodies_are_decode_errors() {
        let (service, _) = fake_service(StatusCode::OK, json!({"not": "a list"})).await;

        let err = service.list_all().await.unwrap_err();
        assert!(matches!(
            err,
            RosterError::DecodeRecords {
                action: RecordAction::LoadStudents,
                ..
            }
        ));
        assert_eq!(err.user_message(), "Failed to load students");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config =
            RecordServiceConfig::from_parts(&format!("http://{addr}"), Duration::from_secs(2))
                .unwrap();
        let service = HttpRecordService::new(&config).unwrap();

        let err = service.list_all().await.unwrap_err();
        assert!(matches!(
            err,
            RosterError::RecordServiceUnreachable {
                action: RecordAction::LoadStudents,
                ..
            }
        ));
    }
}
