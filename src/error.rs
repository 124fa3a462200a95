//! Error types for talking to the catalog backend.

use thiserror::Error;

/// Errors that can occur while fetching catalog collections or records.
#[derive(Debug, Error)]
pub enum FetchError {
	/// The backend rejected the request as unauthenticated (HTTP 401).
	/// Surfaced as-is; the host decides whether to redirect or refresh.
	#[error("unauthorized request to {path}")]
	Unauthorized {
		/// Request path below the base URL.
		path: String,
	},

	/// The backend answered with a non-success status.
	#[error("{path} returned HTTP {status}")]
	Status {
		/// Request path below the base URL.
		path: String,
		/// HTTP status code.
		status: u16,
	},

	/// The request never produced a response.
	#[error("HTTP request failed: {0}")]
	Http(String),

	/// Timeout waiting for response.
	#[error("request timed out")]
	Timeout,

	/// The response body was not the expected JSON.
	#[error("failed to decode response from {path}: {message}")]
	Decode {
		/// Request path below the base URL.
		path: String,
		/// Decoder error.
		message: String,
	},

	/// The configured base URL cannot address the requested resource.
	#[error("invalid backend URL: {0}")]
	Url(String),
}

impl FetchError {
	/// True for 401 responses, which hosts usually treat differently.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, FetchError::Unauthorized { .. })
	}
}

impl From<reqwest::Error> for FetchError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			FetchError::Timeout
		} else {
			FetchError::Http(err.to_string())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_401_counts_as_unauthorized() {
		let denied = FetchError::Unauthorized {
			path: "/api/v1/systems".into(),
		};
		assert!(denied.is_unauthorized());
		assert!(!FetchError::Timeout.is_unauthorized());
		assert!(
			!FetchError::Status {
				path: "/api/v1/systems".into(),
				status: 403,
			}
			.is_unauthorized()
		);
	}

	#[test]
	fn messages_name_the_failing_request() {
		assert_eq!(FetchError::Timeout.to_string(), "request timed out");
		let status = FetchError::Status {
			path: "/api/v1/apis".into(),
			status: 500,
		};
		assert_eq!(status.to_string(), "/api/v1/apis returned HTTP 500");
	}
}
