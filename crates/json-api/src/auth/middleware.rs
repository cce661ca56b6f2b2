//! Auth middleware.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use soko_app::auth::AuthServiceError;
use tracing::error;

use crate::{extensions::*, state::State};

/// Resolve the bearer token to a user and place it in the depot.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));

        return;
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    let user_uuid = match state.app.auth.authenticate_bearer(token).await {
        Ok(user_uuid) => user_uuid,
        Err(AuthServiceError::NotFound) => {
            res.render(StatusError::unauthorized().brief("Invalid or expired session token"));

            return;
        }
        Err(other) => {
            error!("failed to validate session token: {other}");

            res.render(StatusError::internal_server_error());

            return;
        }
    };

    depot.insert_user_uuid(user_uuid);

    ctrl.call_next(req, depot, res).await;
}

/// Refuse the request unless the authenticated user currently holds the
/// admin role. Must run after [`handler`].
#[salvo::handler]
pub(crate) async fn require_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let user_uuid = match depot.user_uuid_or_401() {
        Ok(user_uuid) => user_uuid,
        Err(status) => {
            res.render(status);

            return;
        }
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    match state.app.auth.require_admin(user_uuid).await {
        Ok(()) => {}
        Err(AuthServiceError::Permission) => {
            res.render(StatusError::forbidden().brief("Admin role required"));

            return;
        }
        Err(other) => {
            error!(user_uuid = %user_uuid, "failed to check admin role: {other}");

            res.render(StatusError::internal_server_error());

            return;
        }
    }

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        test::{ResponseExt, TestClient},
    };
    use soko_app::auth::{MockAuthService, UserUuid};
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::test_helpers::TestServices;

    use super::*;

    const TOKEN: &str = "sk_0123456789abcdef";

    #[salvo::handler]
    async fn echo_user(depot: &mut Depot, res: &mut Response) {
        let user = depot.user_uuid_or_401().ok().map_or_else(
            || "missing".to_string(),
            |uuid: UserUuid| uuid.to_string(),
        );

        res.render(user);
    }

    fn make_service(auth: MockAuthService) -> Service {
        let state = TestServices {
            auth,
            ..TestServices::default()
        }
        .into_state();

        let router = Router::new()
            .hoop(inject(state))
            .hoop(handler)
            .push(Router::new().get(echo_user))
            .push(Router::with_path("admin").hoop(require_admin).get(echo_user));

        Service::new(router)
    }

    #[tokio::test]
    async fn test_missing_authorization_header_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com")
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_bearer_authorization_header_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Basic abc123", true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_session_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == TOKEN)
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, format!("Bearer {TOKEN}"), true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_valid_token_injects_user_uuid() -> TestResult {
        let user = UserUuid::from_uuid(Uuid::nil());

        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == TOKEN)
            .return_once(move |_| Ok(user));

        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, format!("Bearer {TOKEN}"), true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, user.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_on_admin_route_returns_403() -> TestResult {
        let user = UserUuid::new();

        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(move |_| Ok(user));

        auth.expect_require_admin()
            .once()
            .withf(move |u| *u == user)
            .return_once(|_| Err(AuthServiceError::Permission));

        let res = TestClient::get("http://example.com/admin")
            .add_header(AUTHORIZATION, format!("Bearer {TOKEN}"), true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_on_admin_route_passes_through() -> TestResult {
        let admin = UserUuid::new();

        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(move |_| Ok(admin));

        auth.expect_require_admin()
            .once()
            .withf(move |u| *u == admin)
            .return_once(|_| Ok(()));

        let mut res = TestClient::get("http://example.com/admin")
            .add_header(AUTHORIZATION, format!("Bearer {TOKEN}"), true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, admin.to_string());

        Ok(())
    }
}
