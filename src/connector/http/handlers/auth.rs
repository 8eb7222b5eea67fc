use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::application::{AuthSession, LoginInput, RegistrationInput};
use crate::connector::api::Container;

use super::super::error::ApiResult;
use super::super::extract::ApiJson;

pub async fn register(
    State(container): State<Container>,
    ApiJson(input): ApiJson<RegistrationInput>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let session = container.register_use_case().execute(input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(container): State<Container>,
    ApiJson(input): ApiJson<LoginInput>,
) -> ApiResult<Json<AuthSession>> {
    let session = container.login_use_case().execute(input).await?;
    Ok(Json(session))
}
