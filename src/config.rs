/// Settings fixed at build time. `KG_API_BASE` and `KG_FETCH_LIMIT` override
/// the defaults when set while compiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphConfig {
	pub api_base: String,
	pub fetch_limit: u32,
	/// Delay between a data push and the camera re-fit.
	pub fit_delay_ms: u32,
	pub fit_duration_ms: u32,
	/// How long a notification stays on screen.
	pub notification_ms: u32,
}

const DEFAULT_API_BASE: &str = "/api/v1";
const DEFAULT_FETCH_LIMIT: u32 = 500;

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			api_base: DEFAULT_API_BASE.to_owned(),
			fetch_limit: DEFAULT_FETCH_LIMIT,
			fit_delay_ms: 200,
			fit_duration_ms: 800,
			notification_ms: 4000,
		}
	}
}

impl GraphConfig {
	pub fn from_env() -> Self {
		Self::from_values(option_env!("KG_API_BASE"), option_env!("KG_FETCH_LIMIT"))
	}

	fn from_values(api_base: Option<&str>, fetch_limit: Option<&str>) -> Self {
		let mut config = Self::default();
		if let Some(base) = api_base.map(str::trim).filter(|b| !b.is_empty()) {
			config.api_base = base.trim_end_matches('/').to_owned();
		}
		match fetch_limit.map(|raw| raw.trim().parse::<u32>()) {
			Some(Ok(limit)) if limit > 0 => config.fetch_limit = limit,
			Some(_) => log::warn!("ignoring invalid KG_FETCH_LIMIT"),
			None => {}
		}
		config
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_when_unset() {
		assert_eq!(GraphConfig::from_values(None, None), GraphConfig::default());
	}

	#[test]
	fn overrides_are_applied() {
		let config = GraphConfig::from_values(Some("https://kg.example/api/"), Some("1200"));
		assert_eq!(config.api_base, "https://kg.example/api");
		assert_eq!(config.fetch_limit, 1200);
	}

	#[test]
	fn bad_limit_keeps_default() {
		let config = GraphConfig::from_values(Some("  "), Some("lots"));
		assert_eq!(config.api_base, DEFAULT_API_BASE);
		assert_eq!(config.fetch_limit, DEFAULT_FETCH_LIMIT);
		assert_eq!(GraphConfig::from_values(None, Some("0")).fetch_limit, DEFAULT_FETCH_LIMIT);
	}
}
