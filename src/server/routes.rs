//! HTTP handlers. Mutations read the session token from the JSON body.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use kami_core::{
    Customer, CustomerDetails, CustomerPatch, NewCustomer, NewService, NewTransaction, Service,
    ServicePatch, Transaction,
};
use serde::{Deserialize, Serialize};

use super::error::StubError;
use super::state::StubState;

type HandlerResult<T> = Result<T, StubError>;

/// Request body with the session token next to the payload fields.
#[derive(Deserialize)]
pub struct Authed<T> {
    #[serde(default)]
    token: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    phone: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    message: String,
}

/// Counts every request so tests can tell whether the client called out.
pub async fn count_requests(
    State(state): State<StubState>,
    request: Request,
    next: Next,
) -> Response {
    state.count_request();
    next.run(request).await
}

// ========== Auth ==========

pub async fn login(
    State(state): State<StubState>,
    Json(req): Json<LoginRequest>,
) -> HandlerResult<Json<LoginResponse>> {
    let token = state.login(&req.phone, &req.password)?;
    tracing::info!("Login for {}", req.phone);
    Ok(Json(LoginResponse { token }))
}

pub async fn register(
    State(state): State<StubState>,
    Json(req): Json<RegisterRequest>,
) -> HandlerResult<(StatusCode, Json<MessageResponse>)> {
    state.register(&req.email, &req.password)?;
    tracing::info!("Registered {}", req.email);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Account created".to_string(),
        }),
    ))
}

// ========== Services ==========

pub async fn list_services(State(state): State<StubState>) -> Json<Vec<Service>> {
    Json(state.services())
}

pub async fn get_service(
    State(state): State<StubState>,
    Path(id): Path<String>,
) -> HandlerResult<Json<Service>> {
    state.service(&id).map(Json)
}

pub async fn create_service(
    State(state): State<StubState>,
    Json(req): Json<Authed<NewService>>,
) -> HandlerResult<(StatusCode, Json<Service>)> {
    state.authorize(req.token.as_deref())?;
    let service = state.create_service(req.body)?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(req): Json<Authed<ServicePatch>>,
) -> HandlerResult<Json<Service>> {
    state.authorize(req.token.as_deref())?;
    state.update_service(&id, &req.body).map(Json)
}

pub async fn delete_service(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(req): Json<TokenBody>,
) -> HandlerResult<StatusCode> {
    state.authorize(req.token.as_deref())?;
    state.delete_service(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== Customers ==========

pub async fn list_customers(State(state): State<StubState>) -> Json<Vec<Customer>> {
    Json(state.customers())
}

pub async fn get_customer(
    State(state): State<StubState>,
    Path(id): Path<String>,
) -> HandlerResult<Json<CustomerDetails>> {
    state.customer_details(&id).map(Json)
}

pub async fn create_customer(
    State(state): State<StubState>,
    Json(req): Json<Authed<NewCustomer>>,
) -> HandlerResult<(StatusCode, Json<Customer>)> {
    state.authorize(req.token.as_deref())?;
    let customer = state.create_customer(req.body)?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(req): Json<Authed<CustomerPatch>>,
) -> HandlerResult<Json<Customer>> {
    state.authorize(req.token.as_deref())?;
    state.update_customer(&id, &req.body).map(Json)
}

pub async fn delete_customer(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(req): Json<TokenBody>,
) -> HandlerResult<StatusCode> {
    state.authorize(req.token.as_deref())?;
    state.delete_customer(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== Transactions ==========

pub async fn list_transactions(State(state): State<StubState>) -> Json<Vec<Transaction>> {
    Json(state.transactions())
}

pub async fn get_transaction(
    State(state): State<StubState>,
    Path(id): Path<String>,
) -> HandlerResult<Json<Transaction>> {
    state.transaction(&id).map(Json)
}

pub async fn create_transaction(
    State(state): State<StubState>,
    Json(req): Json<Authed<NewTransaction>>,
) -> HandlerResult<(StatusCode, Json<Transaction>)> {
    state.authorize(req.token.as_deref())?;
    let transaction = state.create_transaction(req.body)?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Soft-cancels; the transaction stays in the list.
pub async fn cancel_transaction(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(req): Json<TokenBody>,
) -> HandlerResult<Json<Transaction>> {
    state.authorize(req.token.as_deref())?;
    state.cancel_transaction(&id).map(Json)
}
