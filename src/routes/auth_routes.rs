//! Auth endpoints
//!
//! - `POST /auth/signin` `{email, password}` - session tokens or `{error}`
//! - `POST /auth/signout` - always `{success:true}`
//! - `POST /auth/recover` `{email}` - send a recovery link
//! - `POST /auth/update-password` `{password}` - needs a session

use hyper::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{
    action_response, json_response, method_not_allowed, not_found_response, ApiRequest, FullBody,
};
use crate::actions::ActionResult;
use crate::auth::AuthSession;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
struct SignInRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RecoverRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
struct UpdatePasswordRequest {
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    success: bool,
    /// Where the client goes next
    redirect_to: &'static str,
    session: AuthSession,
}

pub async fn handle_auth_request(
    state: &AppState,
    req: &ApiRequest,
    path: &str,
) -> Response<FullBody> {
    if req.method != Method::POST {
        return match path {
            "/auth/signin" | "/auth/signout" | "/auth/recover" | "/auth/update-password" => {
                method_not_allowed()
            }
            _ => not_found_response(path),
        };
    }

    match path {
        "/auth/signin" => {
            let body = match req.json::<SignInRequest>() {
                Ok(body) => body,
                Err(response) => return response,
            };
            match state.auth.sign_in(&body.email, &body.password).await {
                Ok(session) => json_response(
                    StatusCode::OK,
                    &SignInResponse {
                        success: true,
                        redirect_to: "/dashboard",
                        session,
                    },
                ),
                Err(message) => action_response(&ActionResult::failure(message)),
            }
        }
        "/auth/signout" => {
            let user = req.current_user(state);
            action_response(&state.auth.sign_out(&user).await)
        }
        "/auth/recover" => match req.json::<RecoverRequest>() {
            Ok(body) => action_response(&state.auth.send_password_reset(&body.email).await),
            Err(response) => response,
        },
        "/auth/update-password" => {
            let user = req.current_user(state);
            match req.json::<UpdatePasswordRequest>() {
                Ok(body) => action_response(&state.auth.update_password(&user, &body.password).await),
                Err(response) => response,
            }
        }
        _ => not_found_response(path),
    }
}
