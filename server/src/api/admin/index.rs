use crate::api::{is_partial_request, TOTAL_COUNT_HEADER};
use crate::auth::AdminUser;
use crate::error::AppError;
use crate::views::base_context;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tera::Context;

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    #[serde(default)]
    pub skip: i64,
}

/// Newest recipes first, one page at a time. The "load more" button asks for
/// the next page with `X-Requested-With` and gets just the cards back.
pub async fn index(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(params): Query<IndexParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let page = state.recipes.list(&admin, params.skip)?;

    let (template, mut context) = if is_partial_request(&headers) {
        ("admin/_recipe_cards.html", Context::new())
    } else {
        ("admin/index.html", base_context(Some(&admin)))
    };
    context.insert("recipes", &page.items);
    context.insert("total_count", &page.total_count);
    context.insert("next_skip", &page.next_skip());

    let html = state.views.render(template, &context)?;
    Ok((
        [(TOTAL_COUNT_HEADER, page.total_count.to_string())],
        html,
    )
        .into_response())
}
