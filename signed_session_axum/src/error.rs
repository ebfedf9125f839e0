use http::StatusCode;
use signed_session::SessionError;

/// Helper trait for converting session errors into a handler-friendly error tuple
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                SessionError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
                SessionError::Cookie(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_is_unavailable() {
        let result: Result<(), SessionError> =
            Err(SessionError::Storage("connection refused".to_string()));

        let (status, message) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn test_cookie_error_is_bad_request() {
        let result: Result<(), SessionError> = Err(SessionError::Cookie("bad".to_string()));
        assert_eq!(
            result.into_response_error().unwrap_err().0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_out_of_scope_is_internal() {
        let result: Result<(), SessionError> = Err(SessionError::OutOfScope);
        assert_eq!(
            result.into_response_error().unwrap_err().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ok_passes_through() {
        let result: Result<u8, SessionError> = Ok(7);
        assert_eq!(result.into_response_error().unwrap(), 7);
    }
}
