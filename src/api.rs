//! API client for the knowledge-graph backend.
//!
//! Uses web-sys fetch; responses are read as text and decoded with serde_json.

use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::components::knowledge_graph::{DomainInfo, GraphDataset, TimeSliceInfo};
use crate::error::ApiError;

/// Parameters of the 3D visualization request. Unset fields are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Visualize3dQuery {
	pub start_year: Option<i32>,
	pub end_year: Option<i32>,
	/// Domain node ids; empty means no domain restriction.
	pub domains: Vec<String>,
	pub limit: Option<u32>,
}

impl Visualize3dQuery {
	pub fn to_query_string(&self) -> String {
		let mut params = Vec::new();
		if let Some(year) = self.start_year {
			params.push(format!("start_year={year}"));
		}
		if let Some(year) = self.end_year {
			params.push(format!("end_year={year}"));
		}
		if !self.domains.is_empty() {
			let joined = self
				.domains
				.iter()
				.map(|id| urlencoding::encode(id).into_owned())
				.collect::<Vec<_>>()
				.join(",");
			params.push(format!("domains={joined}"));
		}
		if let Some(limit) = self.limit {
			params.push(format!("limit={limit}"));
		}
		if params.is_empty() {
			String::new()
		} else {
			format!("?{}", params.join("&"))
		}
	}
}

#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: String,
}

impl ApiClient {
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		let url = self.url(path);

		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);

		let request = Request::new_with_str_and_init(&url, &opts)
			.map_err(|e| ApiError::Request(format!("{e:?}")))?;
		request
			.headers()
			.set("Accept", "application/json")
			.map_err(|e| ApiError::Request(format!("{e:?}")))?;

		let window = web_sys::window().ok_or(ApiError::NoWindow)?;
		let resp_value = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(|e| ApiError::Request(format!("{e:?}")))?;
		let resp: Response = resp_value
			.dyn_into()
			.map_err(|_| ApiError::Request("response is not a Response".into()))?;

		if !resp.ok() {
			return Err(ApiError::Status(resp.status()));
		}

		let body = JsFuture::from(resp.text().map_err(|e| ApiError::Request(format!("{e:?}")))?)
			.await
			.map_err(|e| ApiError::Request(format!("{e:?}")))?;
		let text = body
			.as_string()
			.ok_or_else(|| ApiError::Request("response body is not text".into()))?;
		Ok(serde_json::from_str(&text)?)
	}

	pub async fn visualize_3d(&self, query: &Visualize3dQuery) -> Result<GraphDataset, ApiError> {
		let path = format!("/knowledge-graph/visualize-3d{}", query.to_query_string());
		let data: GraphDataset = self.get(&path).await?;
		Ok(data.normalized())
	}

	pub async fn domains(&self) -> Result<Vec<DomainInfo>, ApiError> {
		self.get("/knowledge-graph/domains").await
	}

	pub async fn time_slices(&self) -> Result<Vec<TimeSliceInfo>, ApiError> {
		let mut slices: Vec<TimeSliceInfo> = self.get("/knowledge-graph/time-slices").await?;
		slices.sort_by_key(|slice| slice.year);
		Ok(slices)
	}
}
