//! Transport seam between the fetcher and the backend.
//!
//! The fetcher only sees [`HttpClient`]; production code plugs in
//! [`ReqwestClient`] and tests plug in canned responses.

use std::future::Future;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::FetchError;

/// Issues read-only JSON requests against the catalog backend.
pub trait HttpClient {
	/// GET the resource addressed by `segments` below the base URL and decode
	/// its JSON body. Segments are percent-encoded individually.
	fn get_json<T: DeserializeOwned>(
		&self,
		segments: &[&str],
	) -> impl Future<Output = Result<T, FetchError>>;
}

/// [`HttpClient`] backed by `reqwest` (browser `fetch` on wasm32).
#[derive(Clone, Debug)]
pub struct ReqwestClient {
	client: reqwest::Client,
	base: Url,
	auth_token: Option<String>,
}

impl ReqwestClient {
	/// Client for the configured backend. Fails on an unusable base URL.
	pub fn new(config: &BackendConfig) -> Result<Self, FetchError> {
		let base = Url::parse(&config.base_url).map_err(|e| FetchError::Url(e.to_string()))?;
		if base.cannot_be_a_base() {
			return Err(FetchError::Url(config.base_url.clone()));
		}

		#[cfg(not(target_arch = "wasm32"))]
		let client = reqwest::Client::builder()
			.timeout(std::time::Duration::from_millis(config.timeout_ms))
			.build()?;
		// The browser fetch backend has no client-level timeout.
		#[cfg(target_arch = "wasm32")]
		let client = reqwest::Client::builder().build()?;

		Ok(Self {
			client,
			base,
			auth_token: config.auth_token.clone(),
		})
	}

	/// Joins `segments` onto the base URL.
	pub fn url_for(&self, segments: &[&str]) -> Result<Url, FetchError> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|_| FetchError::Url(self.base.to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}
}

impl HttpClient for ReqwestClient {
	async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, FetchError> {
		let url = self.url_for(segments)?;
		let path = url.path().to_string();

		let mut request = self.client.get(url);
		if let Some(token) = &self.auth_token {
			request = request.bearer_auth(token);
		}
		let response = request.send().await?;

		let status = response.status();
		if status == StatusCode::UNAUTHORIZED {
			return Err(FetchError::Unauthorized { path });
		}
		if !status.is_success() {
			return Err(FetchError::Status {
				path,
				status: status.as_u16(),
			});
		}

		let body = response.text().await?;
		serde_json::from_str(&body).map_err(|e| FetchError::Decode {
			path,
			message: e.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn client(base_url: &str) -> ReqwestClient {
		ReqwestClient::new(&BackendConfig {
			base_url: base_url.into(),
			..BackendConfig::default()
		})
		.unwrap()
	}

	#[test]
	fn segments_are_joined_and_encoded() {
		let c = client("http://localhost:8080/api/v1/");
		let url = c.url_for(&["systems", "a b/c"]).unwrap();
		assert_eq!(url.as_str(), "http://localhost:8080/api/v1/systems/a%20b%2Fc");
	}

	#[test]
	fn base_without_trailing_slash_keeps_its_path() {
		let c = client("http://localhost:8080/api/v1");
		let url = c.url_for(&["relationships"]).unwrap();
		assert_eq!(url.as_str(), "http://localhost:8080/api/v1/relationships");
	}

	#[test]
	fn unusable_base_url_is_rejected() {
		let err = ReqwestClient::new(&BackendConfig {
			base_url: "mailto:ops@example.com".into(),
			..BackendConfig::default()
		})
		.unwrap_err();
		assert!(matches!(err, FetchError::Url(_)));
	}
}
