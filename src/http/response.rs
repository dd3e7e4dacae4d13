//! Raw backend responses and their conversion into typed outcomes.

// crates.io
use ::http::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::StatusError};

/// Response produced by an [`HttpTransport`](crate::http::HttpTransport) for any HTTP status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with an empty header map.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Checks whether the status is in the `2xx` range.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Checks whether the status is `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}

	/// Returns the body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON; failures name the offending field path.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::Decode { source, status: self.status.as_u16() })
	}

	/// Parses the `Retry-After` header as delta-seconds or an RFC 2822 date.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(&self.headers)
	}

	/// Extracts a human-readable failure message from the body.
	///
	/// JSON bodies are searched for `message`, `detail`, then `error` string fields. Otherwise
	/// the canonical reason phrase is used, falling back to `HTTP <code>`.
	pub fn message(&self) -> String {
		body_message(&self.body).unwrap_or_else(|| match self.status.canonical_reason() {
			Some(reason) => reason.to_owned(),
			None => format!("HTTP {}", self.status.as_u16()),
		})
	}

	/// Converts the response into the dispatch outcome: `2xx` passes through, anything else
	/// becomes [`Error::Status`].
	pub fn into_outcome(self) -> Result<Self> {
		if self.is_success() {
			return Ok(self);
		}

		let message = self.message();
		let retry_after = self.retry_after();

		Err(StatusError { status: self.status.as_u16(), message, body: self.body, retry_after }
			.into())
	}
}

fn body_message(body: &[u8]) -> Option<String> {
	let value = serde_json::from_slice::<serde_json::Value>(body).ok()?;

	["message", "detail", "error"].into_iter().find_map(|key| {
		value
			.get(key)
			.and_then(serde_json::Value::as_str)
			.map(str::trim)
			.filter(|text| !text.is_empty())
			.map(str::to_owned)
	})
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> ApiResponse {
		ApiResponse::new(
			StatusCode::from_u16(status).expect("Fixture status should be valid."),
			body.as_bytes(),
		)
	}

	#[test]
	fn success_passes_through_unchanged() {
		let original = response(200, "{\"ok\":true}");
		let outcome = original.clone().into_outcome().expect("2xx responses should pass.");

		assert_eq!(outcome, original);
	}

	#[test]
	fn failures_prefer_json_message_fields() {
		let err = response(422, "{\"detail\":\"Contract end date precedes start date\"}")
			.into_outcome()
			.expect_err("4xx responses should become status errors.");

		match err {
			Error::Status(status) => {
				assert_eq!(status.status, 422);
				assert_eq!(status.message, "Contract end date precedes start date");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn failures_fall_back_to_reason_phrase() {
		let err = response(404, "<html>not here</html>")
			.into_outcome()
			.expect_err("404 responses should become status errors.");

		match err {
			Error::Status(status) => {
				assert_eq!(status.message, "Not Found");
				assert_eq!(status.body, b"<html>not here</html>");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
		assert_eq!(response(599, "").message(), "HTTP 599");
	}

	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut throttled = response(503, "");

		throttled.headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

		match throttled.into_outcome() {
			Err(Error::Status(status)) =>
				assert_eq!(status.retry_after, Some(Duration::seconds(7))),
			other => panic!("Unexpected outcome: {other:?}."),
		}
	}

	#[test]
	fn json_decode_errors_name_the_field() {
		#[derive(Debug, Deserialize)]
		struct Payroll {
			#[allow(dead_code)]
			employee: Employee,
		}
		#[derive(Debug, Deserialize)]
		struct Employee {
			#[allow(dead_code)]
			salary: u32,
		}

		let err = response(200, "{\"employee\":{\"salary\":\"high\"}}")
			.json::<Payroll>()
			.expect_err("Mistyped fields should fail to decode.");

		match err {
			Error::Decode { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "employee.salary");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
