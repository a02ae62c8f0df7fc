//! Auth bootstrap (spec §4.7, §9): lazy, once per process, idempotent under
//! concurrent callers.

use dispatch_clients::{ChatSource, Credentials};

/// The two values auth bootstrap produces, held for the process lifetime.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Bearer token from `/auths/signin`.
    pub token: String,
    /// API key used for chat completions. Falls back to `token` when the
    /// `/auths/api_key` exchange fails.
    pub api_key: String,
}

/// Run the bootstrap: sign in, then exchange the token for an API key,
/// falling back to the bearer token when that exchange fails.
///
/// A failed sign-in is fatal for the whole service (spec §4.7); the caller
/// should treat it as non-operational rather than retry per-request.
pub async fn bootstrap(
    client: &dyn ChatSource,
    credentials: &Credentials,
) -> crate::Result<AuthState> {
    let token = client.auth_signin(credentials).await?;

    let api_key = match client.generate_api_key(&token).await {
        Ok(key) => key,
        Err(err) => {
            tracing::warn!(error = %err, "api_key exchange failed, falling back to bearer token");
            token.clone()
        }
    };

    Ok(AuthState { token, api_key })
}
