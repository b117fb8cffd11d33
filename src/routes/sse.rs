use crate::state::RosterState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SseEvent {
    CrudStudent,
}

impl SseEvent {
    /// The name htmx listens for, as in `hx-trigger="sse:crud_student"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CrudStudent => "crud_student",
        }
    }
}

pub async fn sse_feed(
    State(state): State<RosterState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // lagged receivers just miss a refresh, the next one catches them up
    let stream = BroadcastStream::new(state.subscribe_to_sse_feed())
        .filter_map(|event| event.ok())
        .map(|event| Ok(Event::default().event(event.name()).data("")));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
