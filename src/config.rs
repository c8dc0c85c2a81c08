//! Editor settings, read once at startup from browser storage.

use serde::{Deserialize, Serialize};

const STORAGE_KEY: &str = "mindmap.config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MindmapConfig {
	/// Backend root. A path starting with `/` is resolved against the page origin.
	pub api_base_url: String,
	/// Quiet period after a selection change before related knowledge is fetched.
	pub search_debounce_ms: u64,
	/// Authoritative refresh period; `0` disables polling.
	pub poll_interval_ms: u64,
	pub min_zoom: f64,
	pub max_zoom: f64,
}

impl Default for MindmapConfig {
	fn default() -> Self {
		Self {
			api_base_url: "/api/mindmap".to_string(),
			search_debounce_ms: 1500,
			poll_interval_ms: 10_000,
			min_zoom: 0.2,
			max_zoom: 4.0,
		}
	}
}

impl MindmapConfig {
	/// Load from `localStorage`, falling back to defaults on any failure.
	pub fn load() -> Self {
		let raw = web_sys::window()
			.and_then(|w| w.local_storage().ok().flatten())
			.and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
		match raw {
			Some(json) => Self::parse(&json),
			None => Self::default(),
		}
	}

	pub fn parse(json: &str) -> Self {
		match serde_json::from_str::<Self>(json) {
			Ok(config) => config.sanitized(),
			Err(e) => {
				log::warn!("Failed to parse config, using defaults: {}", e);
				Self::default()
			}
		}
	}

	fn sanitized(mut self) -> Self {
		if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
			log::warn!("invalid zoom bounds {}..{}, using defaults", self.min_zoom, self.max_zoom);
			let defaults = Self::default();
			self.min_zoom = defaults.min_zoom;
			self.max_zoom = defaults.max_zoom;
		}
		self
	}

	/// Absolute backend URL for `origin` (e.g. `https://host:8000`).
	pub fn base_url_for(&self, origin: &str) -> String {
		if self.api_base_url.starts_with('/') {
			format!("{}{}", origin.trim_end_matches('/'), self.api_base_url)
		} else {
			self.api_base_url.clone()
		}
	}

	/// Absolute backend URL for the current page.
	pub fn base_url(&self) -> String {
		let origin = web_sys::window()
			.and_then(|w| w.location().origin().ok())
			.unwrap_or_default();
		self.base_url_for(&origin)
	}
}
