use crate::{
    data::{
        draft::StudentDraft,
        search::{SearchCriteria, SearchMode},
    },
    routes::{student_form::student_form, students::search_panel},
    state::RosterState,
};
use axum::extract::State;
use maud::{Markup, html};

#[axum::debug_handler]
pub async fn get_index_route(State(state): State<RosterState>) -> Markup {
    // query mode asks the service on every search anyway
    if state.config().search_mode() != SearchMode::Query {
        if let Err(e) = state.refresh_snapshot().await {
            //the list fragment will try again and show the message
            warn!(?e, "unable to load students for a fresh page");
        }
    }

    state.render(html! {
        div sse-connect="/sse_feed" class="max-w-6xl w-full flex flex-col space-y-6 px-4" {
            h1 class="text-3xl font-semibold text-center" { "Student Management" }

            section class="bg-gray-800 p-6 rounded shadow-md" {
                div id="search_panel" {
                    (search_panel(&SearchCriteria::default(), false))
                }
            }

            div class="flex flex-col lg:flex-row lg:space-x-6 space-y-6 lg:space-y-0" {
                section id="student_form" class="bg-gray-800 p-6 rounded shadow-md lg:w-1/3" {
                    (student_form(&StudentDraft::default(), None))
                }
                section class="bg-gray-800 p-6 rounded shadow-md lg:w-2/3" {
                    div id="student_table" hx-get="/internal/students" hx-include="#search_form" hx-trigger="load, sse:crud_student" {
                        p class="italic" { "Loading..." }
                    }
                }
            }

            div id="modal" {}
        }
    })
}
