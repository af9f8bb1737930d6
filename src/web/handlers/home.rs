//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use crate::state::AppState;
use crate::utils::code_generator::MAX_CUSTOM_CODE_LENGTH;

/// Template for the home page with the shorten form.
///
/// Renders `templates/index.html`; the form posts to `POST /shorten`.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub link_count: usize,
    pub max_code_length: usize,
}

/// Renders the home page.
///
/// # Endpoint
///
/// `GET /`
pub async fn home_handler(State(state): State<AppState>) -> HomeTemplate {
    HomeTemplate {
        link_count: state.link_service.link_count().await,
        max_code_length: MAX_CUSTOM_CODE_LENGTH,
    }
}
