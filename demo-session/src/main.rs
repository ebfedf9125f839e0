use axum::{
    Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use dotenvy::dotenv;

use signed_session_axum::{
    CookieOptions, CurrentSession, IntoResponseError, SessionContext, SessionOptions,
    provide_session,
};

mod server;
use server::{init_tracing, spawn_http_server};

const REMEMBER_ME_MS: i64 = 30 * 24 * 60 * 60 * 1000;

async fn index(session: Option<CurrentSession>) -> String {
    match session {
        Some(session) => {
            let expires = session
                .cookie()
                .expires()
                .map(|e| e.to_rfc3339())
                .unwrap_or_else(|| "end of browser session".to_string());
            format!("Session {}\nExpires: {}\n", session.id(), expires)
        }
        None => "Session store unavailable, serving without a session\n".to_string(),
    }
}

async fn remember(mut session: CurrentSession) -> Redirect {
    session.set_max_age(REMEMBER_ME_MS);
    Redirect::to("/")
}

async fn regenerate(mut session: CurrentSession) -> Result<Redirect, (StatusCode, String)> {
    session.regenerate().await.into_response_error()?;
    Ok(Redirect::to("/"))
}

async fn logout(session: CurrentSession) -> Result<Response, (StatusCode, String)> {
    session.destroy().await.into_response_error()?;
    Ok("Logged out, the next visit starts a new session\n".into_response())
}

fn session_options() -> SessionOptions {
    match SessionOptions::from_env() {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!("{}, falling back to an insecure development secret", e);
            SessionOptions::new("demo-session-development-secret")
                .with_cookie(CookieOptions::default().with_secure(false))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_session");

    let context = SessionContext::new(session_options())?;

    let app = Router::new()
        .route("/", get(index))
        .route("/remember", get(remember))
        .route("/regenerate", get(regenerate))
        .route("/logout", get(logout))
        .layer(from_fn_with_state(context, provide_session));

    spawn_http_server(3001, app).await?;
    Ok(())
}
