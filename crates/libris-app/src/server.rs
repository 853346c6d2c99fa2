//! HTTP front end: hyper on one side, the dispatcher on the other.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use libris_auth::Session;
use libris_router::{Dispatcher, Method, Request, Response};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::context::Ctx;
use crate::controllers;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::views;

/// The application: shared state plus the controller dispatcher.
pub struct App {
    state: AppState,
    dispatcher: Dispatcher<Ctx>,
}

impl App {
    /// Builds the application with every route and controller registered.
    pub fn new(state: AppState) -> Result<Self> {
        Ok(Self {
            state,
            dispatcher: controllers::dispatcher()?,
        })
    }

    /// Returns the shared state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handles one request from start to finish.
    ///
    /// The session named by the request cookie is loaded before the action
    /// and saved after it. Sessions that hold nothing are neither stored nor
    /// sent as a cookie.
    pub async fn handle(&self, mut request: Request) -> Response {
        let base_path = self.state.config.base_path();
        if !base_path.is_empty() {
            match request.path.strip_prefix(base_path) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                    request.path = format!("/{}", rest.trim_start_matches('/'));
                }
                _ => return views::errors::page(404, "Page not found"),
            }
        }

        let pool = &self.state.pool;
        let session = match Session::load(pool, request.cookie(Session::COOKIE_NAME)).await {
            Ok(session) => session,
            Err(err) => {
                error!(error = %err, "failed to load session");
                return AppError::from(err).into_response();
            }
        };

        let target = request.route_target();
        let mut cx = Ctx::new(self.state.clone(), request, session);
        let response = match self.dispatcher.dispatch(&target, &mut cx).await {
            Ok(response) => response,
            Err(err) if err.status() == 404 => views::errors::page(404, "Page not found"),
            Err(err) => {
                error!(path = %target, error = %err, "request failed");
                views::errors::page(500, "Something went wrong")
            }
        };

        debug!(path = %target, status = response.status, "request handled");
        if !cx.session.needs_saving() {
            return response;
        }

        cx.session.extend(Session::DEFAULT_EXPIRY_DAYS);
        if let Err(err) = cx.session.save(pool).await {
            error!(error = %err, "failed to save session");
        }
        response.header("Set-Cookie", cx.session.cookie(base_path))
    }
}

/// Converts a hyper request, runs it through the app and converts back.
async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    app: Arc<App>,
) -> std::result::Result<HyperResponse<Full<Bytes>>, Infallible> {
    let method = Method::parse(req.method().as_str()).unwrap_or(Method::Get);
    let target = req
        .uri()
        .path_and_query()
        .map_or("/", |target| target.as_str())
        .to_string();

    let mut request = Request::new(method, target);
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request.headers.insert(key.to_string(), v.to_string());
        }
    }
    request.body = req
        .collect()
        .await
        .map(|b| b.to_bytes().to_vec())
        .unwrap_or_default();

    let response = app.handle(request).await;

    let mut builder = HyperResponse::builder().status(
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    );
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    Ok(builder
        .body(Full::new(Bytes::from(response.body)))
        .unwrap_or_else(|err| {
            error!(error = %err, "invalid response");
            let mut fallback = HyperResponse::new(Full::new(Bytes::from_static(b"Internal Server Error")));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        }))
}

/// Deletes expired sessions every `period`, starting with an immediate pass.
pub fn spawn_session_sweeper(pool: SqlitePool, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match Session::clear_expired(&pool).await {
                Ok(0) => {}
                Ok(cleared) => info!(cleared, "removed expired sessions"),
                Err(err) => warn!(error = %err, "failed to remove expired sessions"),
            }
        }
    })
}

/// Accepts connections until the listener fails, one task per connection.
pub async fn serve(app: Arc<App>, listener: TcpListener) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let app = app.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let app = app.clone();
                handle_request(req, app)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(%peer, error = %err, "error serving connection");
            }
        });
    }
}
