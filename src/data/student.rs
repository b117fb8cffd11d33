use maud::{Markup, Render, html};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned, never minted here. The service may send it as a string or a number; either
/// way we only ever keep the text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl<'de> Deserialize<'de> for StudentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(Self(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }))
    }
}

impl StudentId {
    /// First eight characters and an ellipsis, for table cells.
    pub fn short(&self) -> String {
        let mut chars = self.0.chars();
        let head: String = chars.by_ref().take(8).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StudentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, deserialize_with = "null_as_default")]
    pub course_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub course_name: String,
}

impl Course {
    pub fn new(course_id: impl Into<String>, course_name: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            course_name: course_name.into(),
        }
    }
}

impl Render for Course {
    fn render(&self) -> Markup {
        html! {
            span class="inline-block bg-gray-700 rounded px-2 py-1 mr-1 mb-1 text-sm" {
                (self.course_id) " - " (self.course_name)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_no: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub courses: Vec<Course>,
}

/// Body for creating a student or replacing one wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub name: String,
    pub phone_no: String,
    pub courses: Vec<Course>,
}

/// Body for `PUT /students/{id}`. Absent fields are left out of the JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Course>>,
}

impl StudentPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl From<StudentPayload> for StudentPatch {
    fn from(StudentPayload { name, phone_no, courses }: StudentPayload) -> Self {
        Self {
            name: Some(name),
            phone_no: Some(phone_no),
            courses: Some(courses),
        }
    }
}

// the service has been seen to send `null` instead of leaving fields out
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_service_json() {
        let student: Student = serde_json::from_value(json!({
            "id": "65f0c0ffee",
            "name": "Asha",
            "phoneNo": "9876543211",
            "courses": [{"courseId": "CS101", "courseName": "Java Spring Boot"}]
        }))
        .unwrap();

        assert_eq!(student.id, StudentId("65f0c0ffee".into()));
        assert_eq!(student.phone_no, "9876543211");
        assert_eq!(student.courses, vec![Course::new("CS101", "Java Spring Boot")]);
    }

    #[test]
    fn numeric_ids_are_kept_as_text() {
        let students: Vec<Student> = serde_json::from_value(json!([
            {"id": 1, "name": "Asha", "phoneNo": "1", "courses": []},
            {"id": "two", "name": "Ravi", "phoneNo": "2", "courses": []}
        ]))
        .unwrap();

        assert_eq!(students[0].id, StudentId("1".into()));
        assert_eq!(students[1].id, StudentId("two".into()));
        assert_eq!(serde_json::to_value(&students[0].id).unwrap(), json!("1"));
    }

    #[test]
    fn ids_still_come_through_query_strings() {
        let uri = "/internal/student_form/edit?id=12".parse().unwrap();
        let axum::extract::Query(form) =
            axum::extract::Query::<crate::data::IdForm>::try_from_uri(&uri).unwrap();
        assert_eq!(form.id, StudentId("12".into()));
    }

    #[test]
    fn nulls_and_missing_fields_decode_as_empty() {
        let student: Student = serde_json::from_value(json!({
            "id": "1",
            "name": null,
            "courses": null
        }))
        .unwrap();

        assert_eq!(student.name, "");
        assert_eq!(student.phone_no, "");
        assert!(student.courses.is_empty());
    }

    #[test]
    fn partial_update_only_sends_what_changed() {
        let body = serde_json::to_value(StudentPatch::rename("Ravi")).unwrap();
        assert_eq!(body, json!({"name": "Ravi"}));

        let full: StudentPatch = StudentPayload {
            name: "Ravi".into(),
            phone_no: "123".into(),
            courses: vec![Course::new("M1", "Maths")],
        }
        .into();
        assert_eq!(
            serde_json::to_value(full).unwrap(),
            json!({
                "name": "Ravi",
                "phoneNo": "123",
                "courses": [{"courseId": "M1", "courseName": "Maths"}]
            })
        );
    }

    #[test]
    fn short_ids() {
        assert_eq!(StudentId("0123456789abcdef".into()).short(), "01234567...");
        assert_eq!(StudentId("42".into()).short(), "42");
        assert_eq!(StudentId("ééééééééé".into()).short(), "éééééééé...");
    }
}
