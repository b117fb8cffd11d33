use crate::{
    data::{
        IdForm,
        draft::{FormMode, StudentDraft},
    },
    maud_conveniences::{INPUT_CLASSES, error_banner, form_submit_button, simple_form_element, subtitle},
    state::RosterState,
};
use axum::{
    Form,
    extract::{Query, State},
};
use maud::{Markup, html};
use serde::Deserialize;

/// The posted student form, in document order so course rows line up.
type FormPairs = Vec<(String, String)>;

pub fn student_form(draft: &StudentDraft, error: Option<&str>) -> Markup {
    let editing = matches!(draft.mode, FormMode::Edit(_));
    let can_remove = draft.courses.len() > 1;

    html! {
        @if editing {
            (subtitle("Edit Student"))
        } @else {
            (subtitle("Add Student"))
        }

        @if let Some(error) = error {
            (error_banner(error))
        }

        form hx-post="/students" hx-target="#student_form" class="p-4" {
            @if let FormMode::Edit(id) = &draft.mode {
                input type="hidden" name="id" value=(id.as_ref());
            }
            (simple_form_element("name", "Name *", true, None, Some(&draft.name)))
            (simple_form_element("phoneNo", "Phone *", true, Some("tel"), Some(&draft.phone_no)))

            div class="mb-4" {
                div class="flex flex-row items-center justify-between mb-2" {
                    h3 class="text-sm font-bold text-gray-300" { "Courses" }
                    button type="button" hx-post="/internal/student_form/add_course" hx-include="closest form" hx-target="#student_form" class="bg-gray-600 hover:bg-gray-500 font-bold py-1 px-2 rounded text-sm" {
                        "+ Add Course"
                    }
                }
                @for (index, course) in draft.courses.iter().enumerate() {
                    div class="flex flex-row space-x-2 mb-2" {
                        input type="text" name="courseId" placeholder="Course ID" value=(course.course_id) class=(INPUT_CLASSES);
                        input type="text" name="courseName" placeholder="Course Name" value=(course.course_name) class=(INPUT_CLASSES);
                        @if can_remove {
                            button type="button" hx-post={"/internal/student_form/remove_course?index=" (index)} hx-include="closest form" hx-target="#student_form" class="bg-red-600 hover:bg-red-800 font-bold py-1 px-2 rounded text-sm" {
                                "Remove"
                            }
                        }
                    }
                }
            }

            div class="flex flex-row space-x-4" {
                @if editing {
                    (form_submit_button(Some("Update")))
                } @else {
                    (form_submit_button(Some("Create")))
                }
                button type="button" hx-get="/internal/student_form" hx-target="#student_form" class="bg-gray-600 hover:bg-gray-500 font-bold py-2 px-4 rounded" {
                    "Reset"
                }
            }
        }
    }
}

pub async fn internal_get_student_form() -> Markup {
    student_form(&StudentDraft::default(), None)
}

/// Falls back to a blank create form carrying the message when the student can't be loaded.
pub async fn internal_get_edit_student_form(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Markup {
    match state.find_student(&id).await {
        Ok(student) => student_form(&StudentDraft::edit(&student), None),
        Err(e) => {
            warn!(?e, %id, "unable to load student for editing");
            student_form(&StudentDraft::default(), Some(&e.user_message()))
        }
    }
}

pub async fn internal_post_add_course(Form(pairs): Form<FormPairs>) -> Markup {
    let mut draft = StudentDraft::from_form(pairs);
    draft.courses.append();
    student_form(&draft, None)
}

#[derive(Deserialize)]
pub struct IndexQuery {
    index: usize,
}

pub async fn internal_post_remove_course(
    Query(IndexQuery { index }): Query<IndexQuery>,
    Form(pairs): Form<FormPairs>,
) -> Markup {
    let mut draft = StudentDraft::from_form(pairs);
    draft.courses.remove(index);
    student_form(&draft, None)
}

pub async fn post_student(
    State(state): State<RosterState>,
    Form(pairs): Form<FormPairs>,
) -> Markup {
    let mut draft = StudentDraft::from_form(pairs);

    match state.submit_draft(&mut draft).await {
        Ok(_) => student_form(&draft, None),
        Err(e) => {
            warn!(?e, "unable to save student");
            student_form(&draft, Some(&e.user_message()))
        }
    }
}
