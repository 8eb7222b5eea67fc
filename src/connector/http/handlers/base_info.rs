use axum::extract::State;
use axum::Json;

use crate::connector::api::Container;
use crate::domain::BaseInfo;

use super::super::error::ApiResult;

pub async fn base_info(State(container): State<Container>) -> ApiResult<Json<BaseInfo>> {
    let info = container.base_info_use_case().execute().await?;
    Ok(Json(info))
}
