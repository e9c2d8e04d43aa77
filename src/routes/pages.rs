use crate::{pages, server::SharedState};
use axum::{extract::State, response::Html};

pub async fn index(State(state): State<SharedState>) -> Html<&'static str> {
    state.metrics.record_request("/");
    Html(pages::INDEX_HTML)
}

pub async fn home(State(state): State<SharedState>) -> Html<&'static str> {
    state.metrics.record_request("/home");
    Html(pages::HOME_HTML)
}

/// Direct access renders the shell with no prediction bound to it.
pub async fn result(State(state): State<SharedState>) -> Html<&'static str> {
    state.metrics.record_request("/result");
    Html(pages::RESULT_SHELL_HTML)
}
