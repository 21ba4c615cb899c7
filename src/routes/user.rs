use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::CookieJar;
use eventhub_event::EventDocument;
use eventhub_user::{LoginInput, SignupInput, User};
use serde::Serialize;
use serde_json::{Value, json};
use ulid::Ulid;

use crate::{
    auth::{AuthUser, build_cookie, removal_cookie},
    error::{AppError, AppResult},
    routes::ApiJson,
    server::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub events: Vec<EventDocument>,
    pub created_at: i64,
    pub updated_at: i64,
}

async fn open_session(
    state: &AppState,
    jar: CookieJar,
    user_id: &str,
) -> AppResult<(CookieJar, User)> {
    let Some(user) = state.user_query.find(user_id).await? else {
        return Err(eventhub_shared::Error::NotFound("user".to_owned()).into());
    };

    let id = user
        .id
        .parse::<Ulid>()
        .map_err(|err| AppError::Internal(err.into()))?;
    let token = state
        .auth
        .issue(&id)
        .map_err(|err| AppError::Internal(err.into()))?;

    Ok((jar.add(build_cookie(token, state.auth.lifetime())), user))
}

fn public_user(user: &User) -> Value {
    json!({ "id": user.id, "name": user.name, "email": user.email })
}

#[tracing::instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<SignupInput>,
) -> AppResult<(StatusCode, CookieJar, Json<Value>)> {
    let id = state.user_command.signup(input).await?;
    let (jar, user) = open_session(&state, jar, &id).await?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "success": true,
            "message": "User created successfully",
            "user": public_user(&user),
        })),
    ))
}

#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<LoginInput>,
) -> AppResult<(CookieJar, Json<Value>)> {
    let id = state.user_command.login(input).await?;
    let (jar, user) = open_session(&state, jar, &id).await?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "user": public_user(&user),
        })),
    ))
}

#[tracing::instrument(skip_all)]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Value>> {
    let events = state.event_query.find_many(&user.events).await?;
    let profile = Profile {
        id: user.id,
        name: user.name,
        email: user.email,
        events,
        created_at: user.created_at,
        updated_at: user.updated_at,
    };

    Ok(Json(json!({ "success": true, "user": profile })))
}

#[tracing::instrument(skip_all)]
pub async fn logout(_user: AuthUser, jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.remove(removal_cookie()),
        Json(json!({
            "success": true,
            "message": "Logged out successfully",
        })),
    )
}
