//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::address_handler::AddressResponse;
use crate::handlers::auth_handler::{
    CleanResetCodeRequest, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
    ResetPasswordRequest, TokenResponse,
};
use crate::handlers::user_handler::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, EditUserRequest, MessageResponse,
    RenameUserRequest, SetCreatorRequest, UserListResponse, UserMessageResponse,
};
use domain::UserResponse;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::filter_by_id,
        crate::handlers::user_handler::rename_user,
        crate::handlers::user_handler::set_creator,
        crate::handlers::user_handler::edit_user,
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::forgot_password,
        crate::handlers::auth_handler::reset_password,
        crate::handlers::auth_handler::clean_reset_code,
        crate::handlers::address_handler::lookup_address,
    ),
    components(
        schemas(
            UserResponse,
            UserListResponse,
            CreateUserRequest,
            CreateUserResponse,
            DeleteUserRequest,
            RenameUserRequest,
            SetCreatorRequest,
            EditUserRequest,
            MessageResponse,
            UserMessageResponse,
            LoginRequest,
            TokenResponse,
            ForgotPasswordRequest,
            ForgotPasswordResponse,
            ResetPasswordRequest,
            CleanResetCodeRequest,
            AddressResponse,
        )
    ),
    tags(
        (name = "Users", description = "User registry endpoints"),
        (name = "Authentication", description = "Login and password reset"),
        (name = "Address", description = "Postal code lookup and geocoding"),
    )
)]
pub struct ApiDoc;
