use crate::{
    data::{
        search::{SearchCriteria, SearchMode, SearchOutcome},
        student::Student,
    },
    maud_conveniences::{
        INPUT_CLASSES, error_banner, form_element, form_submit_button, hx_vals_id, render_table,
        title,
    },
    state::RosterState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};
use serde::Deserialize;

/// The three search boxes. With `reload_table` set the list is re-fetched as soon as the
/// panel lands, which is how "Clear" shows everyone again.
pub fn search_panel(criteria: &SearchCriteria, reload_table: bool) -> Markup {
    let search_input = |id: &'static str, name: &'static str, placeholder: &'static str, value: &str| {
        html! {
            input type="search" id=(id) name=(name) placeholder=(placeholder) value=(value) class=(INPUT_CLASSES);
        }
    };

    html! {
        h2 class="text-xl font-semibold mb-2" { "Search" }
        form id="search_form" hx-get="/internal/students" hx-target="#student_table" hx-trigger="input delay:300ms, submit" class="grid grid-cols-1 md:grid-cols-3 gap-4" {
            (form_element("search_name", "Name", search_input("search_name", "name", "Search by name...", &criteria.name)))
            (form_element("search_phone", "Phone", search_input("search_phone", "phoneNo", "Search by phone...", &criteria.phone_no)))
            (form_element("search_course", "Course", search_input("search_course", "courseName", "Search by course name...", &criteria.course_name)))
            div class="flex flex-row space-x-4 md:col-span-3" {
                (form_submit_button(Some("Search")))
                button type="button" hx-get="/internal/search_panel" hx-target="#search_panel" class="bg-gray-600 hover:bg-gray-500 font-bold py-2 px-4 rounded" {
                    "Clear All"
                }
            }
        }
        @if reload_table {
            div hx-get="/internal/students" hx-target="#student_table" hx-trigger="load" {}
        }
    }
}

pub async fn internal_get_search_panel() -> Markup {
    search_panel(&SearchCriteria::default(), true)
}

#[derive(Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub refresh: bool,
}

pub async fn internal_get_students(
    State(state): State<RosterState>,
    Query(criteria): Query<SearchCriteria>,
    Query(RefreshQuery { refresh }): Query<RefreshQuery>,
) -> Markup {
    // query mode never reads the snapshot, every listing is already fresh
    if refresh && state.config().search_mode() != SearchMode::Query {
        if let Err(e) = state.refresh_snapshot().await {
            warn!(?e, "unable to reload students");
            return error_banner(e.user_message());
        }
    }

    match state.find_students(&criteria).await {
        Ok(outcome) => student_table(outcome),
        Err(e) => {
            warn!(?e, ?criteria, "unable to list students");
            error_banner(e.user_message())
        }
    }
}

fn student_row(student: Student) -> [Markup; 5] {
    let vals = hx_vals_id(&student.id);
    [
        html! { span title=(student.id.as_ref()) class="font-mono text-sm" { (student.id.short()) } },
        html! { (student.name) },
        html! { (student.phone_no) },
        html! {
            @if student.courses.is_empty() {
                span class="italic text-gray-400" { "None" }
            } @else {
                @for course in &student.courses {
                    (course)
                }
            }
        },
        html! {
            div class="flex flex-row space-x-2" {
                button class="bg-blue-600 hover:bg-blue-800 font-bold py-1 px-2 rounded text-sm" hx-get="/internal/student_form/edit" hx-vals=(vals) hx-target="#student_form" {
                    "Edit"
                }
                button class="bg-gray-600 hover:bg-gray-500 font-bold py-1 px-2 rounded text-sm" hx-get="/internal/students/rename_form" hx-vals=(vals) hx-target="#modal" {
                    "Rename"
                }
                button class="bg-red-600 hover:bg-red-800 font-bold py-1 px-2 rounded text-sm" hx-get="/internal/students/confirm_delete" hx-vals=(vals) hx-target="#modal" {
                    "Delete"
                }
            }
        },
    ]
}

fn student_table(SearchOutcome { visible, total }: SearchOutcome) -> Markup {
    let heading = html! {
        div class="flex flex-row items-center justify-between" {
            span {
                "Students ("
                (visible.len())
                @if let Some(total) = total {
                    "/" (total)
                }
                ")"
            }
            button class="bg-gray-600 hover:bg-gray-500 font-bold py-1 px-2 rounded text-sm" hx-get="/internal/students?refresh=true" hx-include="#search_form" hx-target="#student_table" {
                "Reload"
            }
        }
    };

    if visible.is_empty() {
        return html! {
            (title(heading))
            @if total == Some(0) {
                p class="italic text-center py-4" { "No students yet. Create one!" }
            } @else {
                p class="italic text-center py-4" { "No matches found" }
            }
        };
    }

    render_table(
        heading,
        ["ID", "Name", "Phone", "Courses", "Actions"],
        visible.into_iter().map(student_row).collect(),
    )
}
