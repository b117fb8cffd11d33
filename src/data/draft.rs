use crate::{
    data::student::{Course, Student, StudentId, StudentPayload},
    error::{RosterError, RosterResult},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CourseField {
    Id,
    Name,
}

/// The course rows of a draft. Always holds at least one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseRows(Vec<Course>);

impl Default for CourseRows {
    fn default() -> Self {
        Self(vec![Course::default()])
    }
}

#[allow(clippy::len_without_is_empty)] //never empty
impl CourseRows {
    pub fn from_courses(courses: Vec<Course>) -> Self {
        if courses.is_empty() {
            Self::default()
        } else {
            Self(courses)
        }
    }

    pub fn append(&mut self) {
        self.0.push(Course::default());
    }

    /// Out-of-range indices are ignored.
    pub fn set_field(&mut self, index: usize, field: CourseField, value: impl Into<String>) {
        let Some(row) = self.0.get_mut(index) else {
            return;
        };
        match field {
            CourseField::Id => row.course_id = value.into(),
            CourseField::Name => row.course_name = value.into(),
        }
    }

    /// Removing the only row leaves a blank one in its place.
    pub fn remove(&mut self, index: usize) {
        if index < self.0.len() {
            self.0.remove(index);
        }
        if self.0.is_empty() {
            self.0.push(Course::default());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.0.iter()
    }

    /// Rows with both fields filled in, trimmed.
    pub fn complete(&self) -> Vec<Course> {
        self.0
            .iter()
            .map(|c| Course::new(c.course_id.trim(), c.course_name.trim()))
            .filter(|c| !c.course_id.is_empty() && !c.course_name.is_empty())
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Edit(StudentId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudentDraft {
    pub mode: FormMode,
    pub name: String,
    pub phone_no: String,
    pub courses: CourseRows,
}

impl StudentDraft {
    pub fn edit(student: &Student) -> Self {
        Self {
            mode: FormMode::Edit(student.id.clone()),
            name: student.name.clone(),
            phone_no: student.phone_no.clone(),
            courses: CourseRows::from_courses(student.courses.clone()),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rebuilds a draft from a posted student form.
    ///
    /// Course rows arrive as repeated `courseId`/`courseName` keys in document order; a
    /// row missing one of its halves gets an empty string for it. A non-empty `id` puts the
    /// draft in edit mode.
    pub fn from_form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut draft = Self::default();
        let mut rows: Option<CourseRows> = None;
        let (mut next_id, mut next_name) = (0, 0);

        for (key, value) in pairs {
            match key.as_ref() {
                "id" => {
                    let id: String = value.into();
                    if !id.is_empty() {
                        draft.mode = FormMode::Edit(StudentId(id));
                    }
                }
                "name" => draft.name = value.into(),
                "phoneNo" => draft.phone_no = value.into(),
                "courseId" => {
                    Self::place_course(&mut rows, next_id, CourseField::Id, value.into());
                    next_id += 1;
                }
                "courseName" => {
                    Self::place_course(&mut rows, next_name, CourseField::Name, value.into());
                    next_name += 1;
                }
                other => trace!(key = other, "ignoring unknown student form key"),
            }
        }

        if let Some(rows) = rows {
            draft.courses = rows;
        }
        draft
    }

    fn place_course(rows: &mut Option<CourseRows>, index: usize, field: CourseField, value: String) {
        let rows = rows.get_or_insert_with(CourseRows::default);
        while rows.len() <= index {
            rows.append();
        }
        rows.set_field(index, field, value);
    }

    /// Trims everything, drops half-filled course rows, and refuses drafts missing a name, a
    /// phone number or every course.
    pub fn validate(&self) -> RosterResult<StudentPayload> {
        let payload = StudentPayload {
            name: self.name.trim().to_string(),
            phone_no: self.phone_no.trim().to_string(),
            courses: self.courses.complete(),
        };

        if payload.name.is_empty() || payload.phone_no.is_empty() || payload.courses.is_empty() {
            return Err(RosterError::IncompleteDraft);
        }

        Ok(payload)
    }
}
