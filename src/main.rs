#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    routes::{
        index::get_index_route,
        modals::{
            delete_student, internal_close_modal, internal_get_confirm_delete,
            internal_get_rename_form, patch_student_name,
        },
        sse::sse_feed,
        student_form::{
            internal_get_edit_student_form, internal_get_student_form, internal_post_add_course,
            internal_post_remove_course, post_student,
        },
        students::{internal_get_search_panel, internal_get_students},
    },
    state::RosterState,
};
use axum::{
    Router,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod maud_conveniences;
mod record_service;
mod routes;
mod state;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() {
    // everything has a default, so a missing .env is fine
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("not loading .env: {e}");
    }

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let config = RuntimeConfiguration::new().expect("unable to create config");
    info!(
        base_url = %config.record_service().base_url(),
        search_mode = %config.search_mode(),
        "record service configured"
    );
    let state = RosterState::new(config.clone()).expect("unable to create state");

    let trace_layer = TraceLayer::new_for_http();
    let compression_layer = CompressionLayer::new();

    let app = Router::new()
        .route("/", get(get_index_route))
        .route(
            "/students",
            post(post_student)
                .patch(patch_student_name)
                .delete(delete_student),
        )
        .route("/internal/search_panel", get(internal_get_search_panel))
        .route("/internal/students", get(internal_get_students))
        .route("/internal/student_form", get(internal_get_student_form))
        .route(
            "/internal/student_form/edit",
            get(internal_get_edit_student_form),
        )
        .route(
            "/internal/student_form/add_course",
            post(internal_post_add_course),
        )
        .route(
            "/internal/student_form/remove_course",
            post(internal_post_remove_course),
        )
        .route(
            "/internal/students/rename_form",
            get(internal_get_rename_form),
        )
        .route(
            "/internal/students/confirm_delete",
            get(internal_get_confirm_delete),
        )
        .route("/internal/modal/close", get(internal_close_modal))
        .route("/sse_feed", get(sse_feed))
        .layer(compression_layer)
        .layer(trace_layer)
        .with_state(state);

    let server_ip = config.server_ip();
    let listener = TcpListener::bind(server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("unable to serve app");
}
