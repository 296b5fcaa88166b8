use crate::error::{ApiError, ApiResult};
use portal_auth::gate::{api_routes, app_routes};
use portal_auth::{AuthService, RouteGuard, SessionUser};
use portal_core::AppData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared by every handler.
///
/// The portal serves a single session, so the auth service and its session live here rather than
/// per connection. Handlers take the auth lock first and release it before locking the data.
#[derive(Clone)]
pub struct AppState {
    pub(crate) data: Arc<Mutex<AppData>>,
    pub(crate) auth: Arc<Mutex<AuthService>>,
    pub(crate) api_routes: Arc<RouteGuard>,
    pub(crate) app_routes: Arc<RouteGuard>,
}

impl AppState {
    pub fn new(data: AppData, auth: AuthService) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            auth: Arc::new(Mutex::new(auth)),
            api_routes: Arc::new(api_routes()),
            app_routes: Arc::new(app_routes()),
        }
    }

    /// The signed-in user, or 401.
    pub(crate) async fn signed_in(&self) -> ApiResult<SessionUser> {
        self.auth
            .lock()
            .await
            .current_user()
            .cloned()
            .ok_or_else(ApiError::unauthenticated)
    }
}
