use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use potlog_settle::{CashOuts, NumericCode, Preview, Session, TransferId, UserStats};

use crate::error::{ApiError, ApiResult};
use crate::types::*;
use crate::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let req = body(payload)?;
    let session = state.service.create_session(&req.stakes)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            numeric_id: session.numeric_id,
            session,
        }),
    ))
}

/// GET /api/sessions/:code
pub async fn get_session(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.service.get_session(parse_code(&code)?)?))
}

/// POST /api/sessions/:code/players
pub async fn add_player(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<AddPlayerRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let code = parse_code(&code)?;
    let req = body(payload)?;
    let session = state
        .service
        .add_player(code, &req.name, req.initial_buy_in, req.user_id)?;
    Ok(Json(session))
}

/// POST /api/sessions/:code/rebuy
pub async fn rebuy(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<RebuyRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let code = parse_code(&code)?;
    let req = body(payload)?;
    Ok(Json(state.service.rebuy(code, &req.player_id, req.amount)?))
}

/// POST /api/sessions/:code/settle
pub async fn settle(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<SettleRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let code = parse_code(&code)?;
    let req = body(payload)?;
    let session = state
        .coordinator
        .settle(code, &req.cash_outs, req.balance_mode)?;
    Ok(Json(session))
}

/// POST /api/sessions/:code/reopen
pub async fn reopen(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.coordinator.reopen_session(parse_code(&code)?)?))
}

/// POST /api/sessions/:code/debts/settle
pub async fn settle_debt(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<ManualSettleRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let code = parse_code(&code)?;
    let req = body(payload)?;
    let session = state
        .coordinator
        .mark_debt_settled(code, &req.debt_id, req.settled_amount)?;
    Ok(Json(session))
}

/// POST /api/sessions/:code/diff, body is the bare cash-out map.
pub async fn diff(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<CashOuts>, JsonRejection>,
) -> ApiResult<Json<DiffResponse>> {
    let code = parse_code(&code)?;
    let cash_outs = body(payload)?;
    let diff = state.coordinator.diff(code, &cash_outs)?;
    Ok(Json(DiffResponse { diff }))
}

/// POST /api/sessions/:code/preview
pub async fn preview(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<SettleRequest>, JsonRejection>,
) -> ApiResult<Json<Preview>> {
    let code = parse_code(&code)?;
    let req = body(payload)?;
    let preview = state
        .coordinator
        .preview(code, &req.cash_outs, req.balance_mode)?;
    Ok(Json(preview))
}

/// POST /api/sessions/:code/transfers
pub async fn add_transfer(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: Result<Json<AddTransferRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let code = parse_code(&code)?;
    let req = body(payload)?;
    let session = state.service.add_transfer(
        code,
        &req.from_player_id,
        &req.to_player_id,
        req.amount,
        req.note,
    )?;
    Ok(Json(session))
}

/// DELETE /api/sessions/:code/transfers/:transfer_id
pub async fn remove_transfer(
    State(state): State<AppState>,
    Path((code, transfer_id)): Path<(String, String)>,
) -> ApiResult<Json<Session>> {
    let code = parse_code(&code)?;
    let session = state
        .service
        .remove_transfer(code, &TransferId::from(transfer_id))?;
    Ok(Json(session))
}

/// GET /api/users/:user_id/stats
pub async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserStats>> {
    Ok(Json(state.service.user_stats(&user_id)?))
}

fn parse_code(raw: &str) -> ApiResult<NumericCode> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid session code: {raw}")))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}
