use crate::{
    data::student::Student,
    error::{RosterError, RosterResult},
};
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// What the user typed into the three search boxes. Empty means "don't care".
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchCriteria {
    pub name: String,
    pub phone_no: String,
    pub course_name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Phone,
    Course,
}

impl SearchField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Phone, Self::Course];

    /// Segment used by `/students/search/{segment}/{value}`.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Course => "course",
        }
    }
}

impl SearchCriteria {
    pub fn value(&self, field: SearchField) -> &str {
        match field {
            SearchField::Name => &self.name,
            SearchField::Phone => &self.phone_no,
            SearchField::Course => &self.course_name,
        }
    }

    pub fn is_empty(&self) -> bool {
        SearchField::ALL.iter().all(|f| self.value(*f).is_empty())
    }

    pub fn first_active_field(&self) -> Option<SearchField> {
        SearchField::ALL
            .into_iter()
            .find(|f| !self.value(*f).is_empty())
    }

    /// The same criteria with one field cleared.
    #[must_use]
    pub fn without(&self, field: SearchField) -> Self {
        let mut out = self.clone();
        match field {
            SearchField::Name => out.name.clear(),
            SearchField::Phone => out.phone_no.clear(),
            SearchField::Course => out.course_name.clear(),
        }
        out
    }

    /// The same criteria with whitespace-only fields cleared.
    #[must_use]
    pub fn without_blanks(&self) -> Self {
        SearchField::ALL
            .into_iter()
            .filter(|f| self.value(*f).trim().is_empty())
            .fold(self.clone(), |criteria, f| criteria.without(f))
    }

    /// Name and course names compare case-insensitively, phone numbers raw.
    pub fn matches(&self, student: &Student) -> bool {
        let matches_name = self.name.is_empty()
            || student
                .name
                .to_lowercase()
                .contains(&self.name.to_lowercase());

        let matches_phone = self.phone_no.is_empty() || student.phone_no.contains(&self.phone_no);

        let matches_course = self.course_name.is_empty() || {
            let wanted = self.course_name.to_lowercase();
            student
                .courses
                .iter()
                .any(|c| c.course_name.to_lowercase().contains(&wanted))
        };

        matches_name && matches_phone && matches_course
    }

    pub fn filter<'a>(&self, students: impl IntoIterator<Item = &'a Student>) -> Vec<Student> {
        students
            .into_iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }
}

/// Where the filtering happens.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Filter the last full list we fetched.
    #[default]
    Client,
    /// `GET /students?name=..&phoneNo=..&courseName=..`
    Query,
    /// `GET /students/search/{field}/{value}`, one field at a time.
    Path,
}

impl FromStr for SearchMode {
    type Err = RosterError;

    fn from_str(s: &str) -> RosterResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "query" => Ok(Self::Query),
            "path" => Ok(Self::Path),
            _ => Err(RosterError::UnknownSearchMode {
                original: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Client => "client",
            Self::Query => "query",
            Self::Path => "path",
        })
    }
}

/// The rows to show, plus the size of the full list when we know it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub visible: Vec<Student>,
    pub total: Option<usize>,
}
