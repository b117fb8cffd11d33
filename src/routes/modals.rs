use crate::{
    data::{
        IdForm,
        student::{Student, StudentId},
    },
    maud_conveniences::{
        error_banner, form_submit_button, hx_vals_id, modal, simple_form_element, subtitle,
    },
    state::RosterState,
};
use axum::{
    Form,
    extract::{Query, State},
};
use maud::{Markup, html};
use serde::Deserialize;

fn rename_modal(id: &StudentId, name: &str, error: Option<&str>) -> Markup {
    modal(html! {
        (subtitle("Rename Student"))
        @if let Some(error) = error {
            (error_banner(error))
        }
        form hx-patch="/students" hx-target="#modal" {
            input type="hidden" name="id" value=(id.as_ref());
            (simple_form_element("name", "New Name", true, None, Some(name)))
            div class="flex flex-row space-x-4" {
                (form_submit_button(Some("Rename")))
                button type="button" hx-get="/internal/modal/close" hx-target="#modal" class="bg-gray-600 hover:bg-gray-500 font-bold py-2 px-4 rounded" {
                    "Cancel"
                }
            }
        }
    })
}

/// A modal holding just the message and a way out.
fn error_modal(message: &str) -> Markup {
    modal(html! {
        (error_banner(message))
        button type="button" hx-get="/internal/modal/close" hx-target="#modal" class="bg-gray-600 hover:bg-gray-500 font-bold py-2 px-4 rounded" {
            "Close"
        }
    })
}

pub async fn internal_get_rename_form(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Markup {
    match state.find_student(&id).await {
        Ok(Student { id, name, .. }) => rename_modal(&id, &name, None),
        Err(e) => {
            warn!(?e, %id, "unable to load student to rename");
            error_modal(&e.user_message())
        }
    }
}

#[derive(Deserialize)]
pub struct RenameForm {
    pub id: StudentId,
    pub name: String,
}

/// Closes the modal on success; the table picks the new name up from the sse feed.
pub async fn patch_student_name(
    State(state): State<RosterState>,
    Form(RenameForm { id, name }): Form<RenameForm>,
) -> Markup {
    match state.rename_student(&id, &name).await {
        Ok(renamed) => {
            if !renamed {
                debug!(%id, "nothing to rename");
            }
            html! {}
        }
        Err(e) => {
            warn!(?e, %id, "unable to rename student");
            rename_modal(&id, &name, Some(&e.user_message()))
        }
    }
}

pub async fn internal_get_confirm_delete(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Markup {
    let student = match state.find_student(&id).await {
        Ok(student) => student,
        Err(e) => {
            warn!(?e, %id, "unable to load student to delete");
            return error_modal(&e.user_message());
        }
    };

    modal(html! {
        (subtitle("Delete Student"))
        p class="mb-2" { "Are you sure you want to delete this student? This action cannot be undone." }
        p class="mb-4 font-semibold" { (student.name) }
        div class="flex flex-row space-x-4" {
            button type="button" hx-get="/internal/modal/close" hx-target="#modal" class="bg-gray-600 hover:bg-gray-500 font-bold py-2 px-4 rounded" {
                "Cancel"
            }
            button type="button" hx-delete="/students" hx-vals=(hx_vals_id(&student.id)) hx-target="#modal" class="bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded" {
                "Delete Student"
            }
        }
    })
}

pub async fn delete_student(
    State(state): State<RosterState>,
    Query(IdForm { id }): Query<IdForm>,
) -> Markup {
    match state.delete_student(&id).await {
        Ok(()) => html! {},
        Err(e) => {
            warn!(?e, %id, "unable to delete student");
            error_modal(&e.user_message())
        }
    }
}

pub async fn internal_close_modal() -> Markup {
    html! {}
}
