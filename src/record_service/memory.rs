use crate::{
    data::{
        search::{SearchCriteria, SearchField},
        student::{Student, StudentId, StudentPatch, StudentPayload},
    },
    error::{RecordAction, RosterError, RosterResult},
    record_service::RecordService,
};
use async_trait::async_trait;
use axum::http::StatusCode;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// In-process stand-in for the record service, with a log of every call made.
#[derive(Debug, Default)]
pub struct MemoryRecordService {
    students: Mutex<Vec<Student>>,
    calls: Mutex<Vec<String>>,
    failing: AtomicBool,
    blank_replies: AtomicBool,
    next_id: AtomicUsize,
}

impl MemoryRecordService {
    pub fn with_students(students: Vec<Student>) -> Self {
        Self {
            students: Mutex::new(students),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn students(&self) -> Vec<Student> {
        self.students.lock().unwrap().clone()
    }

    /// While set, every call answers with a 500.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// While set, writes are stored but answer with nothing readable.
    pub fn set_blank_replies(&self, blank: bool) {
        self.blank_replies.store(blank, Ordering::SeqCst);
    }

    fn reply(&self, student: Student) -> Option<Student> {
        (!self.blank_replies.load(Ordering::SeqCst)).then_some(student)
    }

    fn record(&self, call: String, action: RecordAction) -> RosterResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RosterError::RecordServiceStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                action,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordService for MemoryRecordService {
    async fn list_all(&self) -> RosterResult<Vec<Student>> {
        self.record("list_all".into(), RecordAction::LoadStudents)?;
        Ok(self.students())
    }

    async fn list_filtered(&self, criteria: &SearchCriteria) -> RosterResult<Vec<Student>> {
        self.record(
            format!(
                "list_filtered name={} phoneNo={} courseName={}",
                criteria.name, criteria.phone_no, criteria.course_name
            ),
            RecordAction::LoadStudents,
        )?;
        Ok(criteria.filter(&self.students()))
    }

    async fn search(&self, field: SearchField, value: &str) -> RosterResult<Vec<Student>> {
        self.record(
            format!("search {} {value}", field.path_segment()),
            RecordAction::Search,
        )?;
        let mut criteria = SearchCriteria::default();
        match field {
            SearchField::Name => criteria.name = value.to_string(),
            SearchField::Phone => criteria.phone_no = value.to_string(),
            SearchField::Course => criteria.course_name = value.to_string(),
        }
        Ok(criteria.filter(&self.students()))
    }

    async fn create(&self, student: &StudentPayload) -> RosterResult<Option<Student>> {
        self.record(format!("create {}", student.name), RecordAction::Create)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Student {
            id: StudentId(format!("mem-{id}")),
            name: student.name.clone(),
            phone_no: student.phone_no.clone(),
            courses: student.courses.clone(),
        };
        self.students.lock().unwrap().push(created.clone());
        Ok(self.reply(created))
    }

    async fn update(&self, id: &StudentId, patch: &StudentPatch) -> RosterResult<Option<Student>> {
        self.record(format!("update {id}"), RecordAction::Update)?;
        let mut students = self.students.lock().unwrap();
        let Some(student) = students.iter_mut().find(|s| &s.id == id) else {
            return Err(RosterError::RecordServiceStatus {
                status: StatusCode::NOT_FOUND,
                action: RecordAction::Update,
            });
        };
        if let Some(name) = &patch.name {
            student.name.clone_from(name);
        }
        if let Some(phone_no) = &patch.phone_no {
            student.phone_no.clone_from(phone_no);
        }
        if let Some(courses) = &patch.courses {
            student.courses.clone_from(courses);
        }
        Ok(self.reply(student.clone()))
    }

    async fn delete(&self, id: &StudentId) -> RosterResult<()> {
        self.record(format!("delete {id}"), RecordAction::Delete)?;
        self.students.lock().unwrap().retain(|s| &s.id != id);
        Ok(())
    }
}
