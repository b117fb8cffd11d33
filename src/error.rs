use crate::maud_conveniences::error_banner;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use snafu::Snafu;
use std::{fmt, num::ParseIntError};

pub type RosterResult<T> = Result<T, RosterError>;

/// What we were asking the record service to do when something went wrong.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordAction {
    LoadStudents,
    Search,
    Create,
    Update,
    Rename,
    Delete,
}

impl RecordAction {
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::LoadStudents => "Failed to load students",
            Self::Search => "Search failed",
            Self::Create => "Create failed",
            Self::Update | Self::Rename => "Update failed",
            Self::Delete => "Delete failed",
        }
    }
}

impl fmt::Display for RecordAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadStudents => "load students",
            Self::Search => "search students",
            Self::Create => "create student",
            Self::Update => "update student",
            Self::Rename => "rename student",
            Self::Delete => "delete student",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Unable to reach the record service to {action}"))]
    RecordServiceUnreachable {
        source: reqwest::Error,
        action: RecordAction,
    },
    #[snafu(display("Record service answered {status} when trying to {action}"))]
    RecordServiceStatus {
        status: StatusCode,
        action: RecordAction,
    },
    #[snafu(display("Unable to decode the record service response to {action}"))]
    DecodeRecords {
        source: reqwest::Error,
        action: RecordAction,
    },
    #[snafu(display("Unable to build the record service client"))]
    BuildClient { source: reqwest::Error },
    #[snafu(display("Unable to parse record service URL {:?}: {}", original, reason))]
    ParseBaseUrl { original: String, reason: String },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse request timeout"))]
    ParseTimeout { source: ParseIntError },
    #[snafu(display("Unknown search mode {:?}, expected client, query or path", original))]
    UnknownSearchMode { original: String },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: String },
    #[snafu(display("Please fill all required fields"))]
    IncompleteDraft,
}

impl RosterError {
    /// The one line we show to whoever is using the page.
    pub fn user_message(&self) -> String {
        match self {
            Self::RecordServiceUnreachable { action, .. }
            | Self::RecordServiceStatus { action, .. }
            | Self::DecodeRecords { action, .. } => action.failure_message().to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const BG: StatusCode = StatusCode::BAD_GATEWAY; //upstream broke

        let status_code = match &self {
            Self::RecordServiceUnreachable { .. } => BG,
            Self::RecordServiceStatus { status, .. } if *status == StatusCode::NOT_FOUND => NF,
            Self::RecordServiceStatus { .. } => BG,
            Self::DecodeRecords { .. } => BG,
            Self::BuildClient { .. } => ISE,
            Self::ParseBaseUrl { .. } | Self::BadEnvVar { .. } | Self::ParseTimeout { .. } => ISE,
            Self::UnknownSearchMode { .. } => ISE,
            Self::MissingStudent { .. } => NF,
            Self::IncompleteDraft => BI,
        };

        error!(?self, "Error!");
        (status_code, Html(error_banner(self.user_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_failures_collapse_to_the_action_message() {
        let err = RosterError::RecordServiceStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            action: RecordAction::Create,
        };
        assert_eq!(err.user_message(), "Create failed");

        let err = RosterError::RecordServiceStatus {
            status: StatusCode::BAD_REQUEST,
            action: RecordAction::Rename,
        };
        assert_eq!(err.user_message(), "Update failed");
    }

    #[test]
    fn other_errors_use_their_display() {
        assert_eq!(
            RosterError::IncompleteDraft.user_message(),
            "Please fill all required fields"
        );
        assert_eq!(
            RosterError::MissingStudent { id: "abc".into() }.user_message(),
            "Unable to find student with ID: abc"
        );
    }

    #[test]
    fn missing_upstream_record_maps_to_not_found() {
        let response = RosterError::RecordServiceStatus {
            status: StatusCode::NOT_FOUND,
            action: RecordAction::Delete,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = RosterError::IncompleteDraft.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
