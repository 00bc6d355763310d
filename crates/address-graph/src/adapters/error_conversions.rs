//! Error conversions from `reqwest` into the transport taxonomy.

use crate::domain::TransportError;

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_connect() {
            TransportError::Connection(error.to_string())
        } else if error.is_decode() {
            TransportError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            TransportError::Status {
                status: status.as_u16(),
                url: error.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            TransportError::Http(error.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(error: serde_json::Error) -> Self {
        TransportError::Decode(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_decode() {
        let err = serde_json::from_str::<u64>("not json").unwrap_err();
        assert!(matches!(TransportError::from(err), TransportError::Decode(_)));
    }

    #[test]
    fn test_builder_error_is_http() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert!(matches!(TransportError::from(err), TransportError::Http(_)));
    }
}
