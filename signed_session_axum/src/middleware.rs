use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use signed_session::{RequestMeta, SessionContext};

/// Session middleware, to be installed with `axum::middleware::from_fn_with_state`.
///
/// The context is also inserted into the request extensions so that
/// [`CurrentSession`](crate::CurrentSession) works regardless of the router state.
pub async fn provide_session(
    State(context): State<SessionContext>,
    mut req: Request,
    next: Next,
) -> Response {
    let meta = RequestMeta::from_request(&req);
    req.extensions_mut().insert(context.clone());

    context.provide(meta, move || next.run(req)).await
}
