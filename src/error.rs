use thiserror::Error;

/// Failure talking to the knowledge-graph backend.
#[derive(Debug, Error)]
pub enum ApiError {
	#[error("no browser window available")]
	NoWindow,
	#[error("request failed: {0}")]
	Request(String),
	#[error("server responded with HTTP {0}")]
	Status(u16),
	#[error("could not decode response: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Failure setting up the canvas renderer.
#[derive(Debug, Error)]
pub enum SceneError {
	#[error("canvas has no 2d context")]
	NoContext,
	#[error("javascript error: {0}")]
	Js(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_are_user_readable() {
		assert_eq!(ApiError::Status(503).to_string(), "server responded with HTTP 503");
		let decode: ApiError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
		assert!(decode.to_string().starts_with("could not decode response"));
		assert_eq!(SceneError::NoContext.to_string(), "canvas has no 2d context");
	}
}
