//! User handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::{AppError, AppResult};
use domain::{NewUser, PageRequest, UserPatch, UserResponse};

use crate::extractors::{RequestingUser, ValidatedJson};
use crate::state::AppState;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list_users))
        .route("/new", post(create_user))
        .route("/deletar/:id", delete(delete_user))
        .route("/byId/:id", get(get_user))
        .route("/filterById", get(filter_by_id))
        .route("/update/:id", put(rename_user))
        .route("/updateUser/:id", patch(set_creator))
        .route("/editById/:id", patch(edit_user))
}

/// Path ids that do not parse can never match a record.
fn parse_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::not_found("User"))
}

/// Listing query string
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    pub total_items_by_page: Option<String>,
    /// Matches name or email case-insensitively, cpf verbatim
    pub search: Option<String>,
}

/// One page of users created by the caller
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// Size of the whole filtered set
    pub total: usize,
    pub usuarios: Vec<UserResponse>,
}

/// New user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default, rename = "nome")]
    #[validate(length(min = 1, message = "nome is required"))]
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "cpf is required"))]
    #[schema(example = "123.456.789-00")]
    pub cpf: String,
    #[serde(default, rename = "telefone")]
    #[validate(length(min = 1, message = "telefone is required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "cep is required"))]
    #[schema(example = "01001-000")]
    pub cep: String,
    #[serde(default, rename = "endereco")]
    #[validate(length(min = 1, message = "endereco is required"))]
    pub address: String,
    #[serde(default, rename = "numero")]
    #[validate(length(min = 1, message = "numero is required"))]
    pub number: String,
    #[serde(default, rename = "complemento")]
    pub complement: Option<String>,
    #[serde(default, rename = "cidade")]
    #[validate(length(min = 1, message = "cidade is required"))]
    pub city: String,
    #[serde(default, rename = "estado")]
    #[validate(length(min = 1, message = "estado is required"))]
    pub state: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "latitude is required"))]
    pub latitude: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "longitude is required"))]
    pub longitude: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
    /// Creating user; absent or 0 makes the record its own creator
    #[serde(default, rename = "IdUserCreate")]
    pub creator_id: Option<i64>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            name: req.name,
            cpf: req.cpf,
            phone: req.phone,
            cep: req.cep,
            address: req.address,
            number: req.number,
            complement: req.complement,
            city: req.city,
            state: req.state,
            latitude: req.latitude,
            longitude: req.longitude,
            password: req.password,
            email: req.email,
            creator_id: req.creator_id,
        }
    }
}

/// Created user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub message: String,
    pub new_usuario: UserResponse,
}

/// Delete request, authorised by the acting user's password.
///
/// A missing body reads as an unknown actor.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub logged_user_id: i64,
}

/// Plain confirmation message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Confirmation message plus the affected user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserMessageResponse {
    pub message: String,
    pub usuario: UserResponse,
}

/// Lookup by query-string id
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterByIdQuery {
    pub id: Option<String>,
}

/// Rename request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameUserRequest {
    #[serde(rename = "nome")]
    #[validate(
        required(message = "nome is required"),
        length(min = 1, message = "nome is required")
    )]
    pub name: Option<String>,
}

/// Creator reference update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetCreatorRequest {
    #[serde(default, rename = "IdUserCreate")]
    pub creator_id: Option<i64>,
}

/// Partial profile update. `id`, `IdUserCreate` and `resetCode` are ignored.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct EditUserRequest {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub cpf: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub cep: Option<String>,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    #[serde(rename = "numero")]
    pub number: Option<String>,
    #[serde(rename = "complemento")]
    pub complement: Option<String>,
    #[serde(rename = "cidade")]
    pub city: Option<String>,
    #[serde(rename = "estado")]
    pub state: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

impl From<EditUserRequest> for UserPatch {
    fn from(req: EditUserRequest) -> Self {
        Self {
            name: req.name,
            cpf: req.cpf,
            phone: req.phone,
            cep: req.cep,
            address: req.address,
            number: req.number,
            complement: req.complement,
            city: req.city,
            state: req.state,
            latitude: req.latitude,
            longitude: req.longitude,
            password: req.password,
            email: req.email,
        }
    }
}

/// List users created by the caller
#[utoipa::path(
    get,
    path = "/usuarios/list",
    tag = "Users",
    params(
        ListQuery,
        ("user-id" = i64, Header, description = "Id of the logged user")
    ),
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 400, description = "Logged user id missing")
    )
)]
pub async fn list_users(
    RequestingUser(owner): RequestingUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<UserListResponse>> {
    let page = PageRequest::from_query(
        query.page.as_deref(),
        query.total_items_by_page.as_deref(),
    );

    let result = state
        .user_service
        .list_users(owner, query.search, page)
        .await?
        .map(UserResponse::from);

    Ok(Json(UserListResponse {
        total: result.total,
        usuarios: result.items,
    }))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/usuarios/new",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Missing field, bad email, duplicate cpf or email, unknown creator")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<CreateUserResponse>)> {
    let user = state.user_service.create_user(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "User created successfully".to_string(),
            new_usuario: UserResponse::from(user),
        }),
    ))
}

/// Delete a user; deleting yourself also deletes the users you created
#[utoipa::path(
    delete,
    path = "/usuarios/deletar/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Incorrect password for logged user"),
        (status = 404, description = "Logged user or target not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<DeleteUserRequest>>,
) -> AppResult<Json<MessageResponse>> {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();
    // Ids start at 1, so an unparsable target can never match
    let target = id.trim().parse::<i64>().unwrap_or(0);

    let deletion = state
        .user_service
        .delete_user(target, payload.logged_user_id, &payload.password)
        .await?;

    let message = if deletion.cascaded.is_empty() {
        "User deleted successfully".to_string()
    } else {
        format!(
            "User and {} created user(s) deleted successfully",
            deletion.cascaded.len()
        )
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/usuarios/byId/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(parse_id(&id)?).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Get user by ID from the query string
#[utoipa::path(
    get,
    path = "/usuarios/filterById",
    tag = "Users",
    params(FilterByIdQuery),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "User not found")
    )
)]
pub async fn filter_by_id(
    State(state): State<AppState>,
    Query(query): Query<FilterByIdQuery>,
) -> AppResult<Json<UserResponse>> {
    let id = query
        .id
        .as_deref()
        .and_then(|id| id.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid ID".to_string()))?;

    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Rename a user
#[utoipa::path(
    put,
    path = "/usuarios/update/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = RenameUserRequest,
    responses(
        (status = 200, description = "User renamed", body = UserMessageResponse),
        (status = 400, description = "Name missing"),
        (status = 404, description = "User not found")
    )
)]
pub async fn rename_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<RenameUserRequest>,
) -> AppResult<Json<UserMessageResponse>> {
    let id = parse_id(&id)?;
    let user = state
        .user_service
        .rename_user(id, payload.name.unwrap_or_default())
        .await?;

    Ok(Json(UserMessageResponse {
        message: "User updated successfully".to_string(),
        usuario: UserResponse::from(user),
    }))
}

/// Overwrite a user's creator reference
#[utoipa::path(
    patch,
    path = "/usuarios/updateUser/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = SetCreatorRequest,
    responses(
        (status = 200, description = "Creator updated", body = UserMessageResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_creator(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<SetCreatorRequest>,
) -> AppResult<Json<UserMessageResponse>> {
    let id = parse_id(&id)?;
    let user = state
        .user_service
        .set_creator(id, payload.creator_id)
        .await?;

    Ok(Json(UserMessageResponse {
        message: "IdUserCreate updated successfully".to_string(),
        usuario: UserResponse::from(user),
    }))
}

/// Merge a partial profile update
#[utoipa::path(
    patch,
    path = "/usuarios/editById/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = EditUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Bad email or duplicate cpf or email"),
        (status = 404, description = "User not found")
    )
)]
pub async fn edit_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<EditUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let id = parse_id(&id)?;
    let user = state.user_service.edit_user(id, payload.into()).await?;
    Ok(Json(UserResponse::from(user)))
}
