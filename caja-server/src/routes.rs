use crate::dto::{
    CreateActivityRequest, CreateSessionRequest, JoinSessionRequest, SessionDetail, SessionStatus,
    SubmitResponseRequest, SubmitResponseResponse, UpdateActivityRequest,
};
use crate::error::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use caja_core::domain::{Activity, ActivityStatusSnapshot, Participant, UserResponse};
use caja_core::{ServiceError, SessionCommand, SessionEvent, SessionService};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Shared server state: the session service behind a read-write lock
#[derive(Clone)]
pub struct AppState {
    service: Arc<RwLock<SessionService>>,
}

impl AppState {
    pub fn new(service: SessionService) -> Self {
        Self {
            service: Arc::new(RwLock::new(service)),
        }
    }

    pub fn service(&self) -> Arc<RwLock<SessionService>> {
        self.service.clone()
    }
}

/// The `/api/v1` surface
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:session_id", get(get_session))
        .route("/api/v1/sessions/:session_id/status", get(session_status))
        .route(
            "/api/v1/sessions/:session_id/participants",
            post(join_session),
        )
        .route(
            "/api/v1/sessions/:session_id/activities",
            get(list_activities).post(create_activity),
        )
        .route(
            "/api/v1/sessions/:session_id/activities/:activity_id",
            patch(update_activity),
        )
        .route(
            "/api/v1/sessions/:session_id/activities/:activity_id/responses",
            get(list_responses).post(submit_response),
        )
        .route(
            "/api/v1/sessions/:session_id/activities/:activity_id/status",
            get(activity_status),
        )
        .with_state(state)
}

async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut service = state.service.write().await;

    let event = service.try_handle(SessionCommand::CreateSession {
        session_id: None,
        name: request.name,
        admin_name: request.admin_name,
    })?;

    let SessionEvent::SessionCreated { session } = event else {
        return Err(unexpected_event("CreateSession"));
    };

    Ok((
        StatusCode::CREATED,
        Json(SessionDetail::from_session(&session)),
    ))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionDetail>, ApiError> {
    let service = state.service.read().await;

    let session = service
        .get_session(session_id)
        .ok_or(ServiceError::SessionNotFound(session_id))?;

    Ok(Json(SessionDetail::from_session(session)))
}

async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionStatus>, ApiError> {
    let service = state.service.read().await;

    let session = service
        .get_session(session_id)
        .ok_or(ServiceError::SessionNotFound(session_id))?;

    Ok(Json(SessionStatus::from_session(session)))
}

async fn join_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<JoinSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut service = state.service.write().await;

    let event = service.try_handle(SessionCommand::JoinSession {
        session_id,
        participant_name: request.name,
    })?;

    let SessionEvent::ParticipantJoined { participant, .. } = event else {
        return Err(unexpected_event("JoinSession"));
    };

    Ok((StatusCode::CREATED, Json::<Participant>(participant)))
}

async fn list_activities(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let service = state.service.read().await;

    let session = service
        .get_session(session_id)
        .ok_or(ServiceError::SessionNotFound(session_id))?;

    Ok(Json(session.activities().to_vec()))
}

async fn create_activity(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CreateActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut service = state.service.write().await;

    let event = service.try_handle(SessionCommand::AddActivity {
        session_id,
        requester_id: None,
        type_id: request.type_id,
        title: request.title,
        description: request.description,
        config: request.configuration,
        order: request.order,
    })?;

    let SessionEvent::ActivityAdded { activity, .. } = event else {
        return Err(unexpected_event("AddActivity"));
    };

    Ok((StatusCode::CREATED, Json(activity)))
}

async fn update_activity(
    State(state): State<AppState>,
    Path((session_id, activity_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateActivityRequest>,
) -> Result<Json<Activity>, ApiError> {
    let mut service = state.service.write().await;

    if let Some(configuration) = request.configuration {
        service.try_handle(SessionCommand::UpdateActivityConfig {
            session_id,
            requester_id: None,
            activity_id,
            config: configuration,
        })?;
    }

    if let Some(status) = request.status {
        service.try_handle(SessionCommand::TransitionActivity {
            session_id,
            requester_id: None,
            activity_id,
            new_status: status,
        })?;
    }

    let session = service
        .get_session(session_id)
        .ok_or(ServiceError::SessionNotFound(session_id))?;
    let activity = session
        .get_activity(activity_id)
        .ok_or(ServiceError::Session(
            caja_core::SessionError::ActivityNotFound(activity_id),
        ))?;

    Ok(Json(activity.clone()))
}

async fn list_responses(
    State(state): State<AppState>,
    Path((session_id, activity_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let service = state.service.read().await;

    let session = service
        .get_session(session_id)
        .ok_or(ServiceError::SessionNotFound(session_id))?;

    let responses: Vec<UserResponse> = session
        .responses_for(activity_id)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(responses))
}

async fn submit_response(
    State(state): State<AppState>,
    Path((session_id, activity_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SubmitResponseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut service = state.service.write().await;

    let event = service.try_handle(SessionCommand::SubmitResponse {
        session_id,
        activity_id,
        participant_id: request.participant_id,
        payload: request.response_data,
    })?;

    let SessionEvent::ResponseSubmitted {
        response_id,
        response_count,
        ..
    } = event
    else {
        return Err(unexpected_event("SubmitResponse"));
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponseResponse {
            response_id,
            response_count,
        }),
    ))
}

/// The polled activity snapshot: status, counts, aggregated results and
/// legal transitions
async fn activity_status(
    State(state): State<AppState>,
    Path((session_id, activity_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ActivityStatusSnapshot>, ApiError> {
    let service = state.service.read().await;

    let snapshot = service.snapshot(session_id, activity_id)?;
    Ok(Json(snapshot))
}

fn unexpected_event(command: &str) -> ApiError {
    // try_handle returned Ok with a mismatched event; treat as a payload bug
    ApiError::MalformedPayload(format!("unexpected event for {command}"))
}
