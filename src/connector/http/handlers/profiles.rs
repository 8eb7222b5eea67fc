use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::connector::api::Container;
use crate::domain::{Profile, ProfileType};

use super::super::error::ApiResult;
use super::super::extract::{ApiJson, ApiPath, CurrentUser};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            user: p.user_id,
            username: p.username,
            first_name: p.first_name,
            last_name: p.last_name,
            file: p.file,
            location: p.location,
            tel: p.tel,
            description: p.description,
            working_hours: p.working_hours,
            profile_type: p.profile_type,
            email: p.email,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BusinessProfileItem {
    pub user: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
}

impl From<Profile> for BusinessProfileItem {
    fn from(p: Profile) -> Self {
        Self {
            user: p.user_id,
            username: p.username,
            first_name: p.first_name,
            last_name: p.last_name,
            file: p.file,
            location: p.location,
            tel: p.tel,
            description: p.description,
            working_hours: p.working_hours,
            profile_type: p.profile_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerProfileItem {
    pub user: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
}

impl From<Profile> for CustomerProfileItem {
    fn from(p: Profile) -> Self {
        Self {
            user: p.user_id,
            username: p.username,
            first_name: p.first_name,
            last_name: p.last_name,
            file: p.file,
            uploaded_at: p.uploaded_at,
            profile_type: p.profile_type,
        }
    }
}

pub async fn get_profile(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = container.profiles_use_case().get(user_id).await?;
    Ok(Json(profile.into()))
}

pub async fn update_profile(
    State(container): State<Container>,
    CurrentUser(user): CurrentUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = container.profiles_use_case().update(&user, user_id, fields).await?;
    Ok(Json(profile.into()))
}

pub async fn list_business(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
) -> ApiResult<Json<Vec<BusinessProfileItem>>> {
    let profiles = container.profiles_use_case().list(ProfileType::Business).await?;
    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

pub async fn list_customer(
    State(container): State<Container>,
    CurrentUser(_user): CurrentUser,
) -> ApiResult<Json<Vec<CustomerProfileItem>>> {
    let profiles = container.profiles_use_case().list(ProfileType::Customer).await?;
    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}
