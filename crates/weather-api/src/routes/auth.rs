use axum::Json;
use weather_db::UserRow;

use crate::auth::AuthUser;
use crate::response::ApiResponse;

/// Profile of the authenticated user
pub async fn me(user: AuthUser) -> Json<ApiResponse<UserRow>> {
    ApiResponse::ok(user.user, "User profile retrieved successfully")
}
