//! HTTP network accessor
//!
//! Requests run on a private tokio runtime and the public methods block on
//! it, so callers stay synchronous. Do not call these from inside another
//! tokio runtime.

use crate::core::config::{config, ShellConfig};
use crate::core::error::{Result, ShellError};
use crate::core::types::{now, round2, Timestamp};
use crate::services::NetworkAccess;
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, ToSocketAddrs};
use std::time::{Duration, Instant};
use sysinfo::{Networks, System};
use tokio::runtime::Runtime;

// === RECORDS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchResultKind {
    Abstract,
    Related,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(rename = "type")]
    pub kind: SearchResultKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// Results found before truncation
    pub total_results: usize,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub location: String,
    pub temperature: f64,
    pub conditions: String,
    pub humidity: u32,
    pub wind_speed: f64,
    pub pressure: u32,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub weather: WeatherData,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub url: String,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityReport {
    pub connected: bool,
    /// "succeeded/attempted"
    pub success_rate: String,
    pub tests: Vec<ProbeResult>,
    pub timestamp: Timestamp,
}

impl ConnectivityReport {
    pub fn from_probes(tests: Vec<ProbeResult>) -> Self {
        let succeeded = tests
            .iter()
            .filter(|t| t.status == ProbeStatus::Success)
            .count();
        Self {
            connected: succeeded > 0,
            success_rate: format!("{}/{}", succeeded, tests.len()),
            tests,
            timestamp: now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub interface: String,
    pub mac_address: String,
    pub bytes_received: u64,
    pub bytes_transmitted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub hostname: String,
    pub local_ip: Option<IpAddr>,
    pub interfaces: Vec<InterfaceInfo>,
    pub timestamp: Timestamp,
}

/// One logged search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub query: String,
    pub result_count: usize,
    pub timestamp: Timestamp,
}

// === DUCKDUCKGO INSTANT ANSWER FORMAT ===

#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<serde_json::Value>,
}

// === ACCESSOR ===

/// Network accessor backed by reqwest
pub struct HttpNetworkManager {
    runtime: Runtime,
    client: Client,
    settings: ShellConfig,
    request_log: Mutex<Vec<RequestLogEntry>>,
}

impl HttpNetworkManager {
    /// Build an accessor from the global config
    pub fn new() -> Result<Self> {
        Self::with_config(config().clone())
    }

    pub fn with_config(settings: ShellConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            runtime,
            client,
            settings,
            request_log: Mutex::new(Vec::new()),
        })
    }

    /// Searches performed so far, oldest first
    pub fn request_log(&self) -> Vec<RequestLogEntry> {
        self.request_log.lock().clone()
    }

    async fn fetch_instant_answer(&self, query: &str) -> Result<InstantAnswer> {
        let response = self
            .client
            .get(&self.settings.search_endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .timeout(Duration::from_secs(self.settings.search_timeout_secs))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn probe(&self, url: &str) -> ProbeResult {
        let started = Instant::now();
        let outcome = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.settings.probe_timeout_secs))
            .send()
            .await;

        match outcome {
            Ok(response) => ProbeResult {
                url: url.to_string(),
                status: ProbeStatus::Success,
                response_time_ms: Some(round2(started.elapsed().as_secs_f64() * 1000.0)),
                status_code: Some(response.status().as_u16()),
                error: None,
            },
            Err(e) => {
                tracing::warn!(url, error = %e, "connectivity probe failed");
                ProbeResult {
                    url: url.to_string(),
                    status: ProbeStatus::Failed,
                    response_time_ms: None,
                    status_code: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

impl NetworkAccess for HttpNetworkManager {
    fn search(&self, query: &str) -> Result<SearchResponse> {
        let answer = self.runtime.block_on(self.fetch_instant_answer(query))?;
        let response = build_search_response(query, &answer, self.settings.search_max_results);

        self.request_log.lock().push(RequestLogEntry {
            query: query.to_string(),
            result_count: response.total_results,
            timestamp: now(),
        });
        tracing::info!(query, results = response.total_results, "web search complete");

        Ok(response)
    }

    fn weather(&self, location: &str) -> Result<WeatherReport> {
        Ok(simulated_weather(location))
    }

    fn check_connectivity(&self) -> Result<ConnectivityReport> {
        let tests = self.runtime.block_on(async {
            let mut tests = Vec::with_capacity(self.settings.connectivity_probes.len());
            for url in &self.settings.connectivity_probes {
                tests.push(self.probe(url).await);
            }
            tests
        });
        Ok(ConnectivityReport::from_probes(tests))
    }

    fn network_info(&self) -> Result<NetworkInfo> {
        let hostname = System::host_name()
            .ok_or_else(|| ShellError::Network("Unable to determine hostname".into()))?;
        let local_ip = resolve_local_ip(&hostname);

        let networks = Networks::new_with_refreshed_list();
        let mut interfaces: Vec<InterfaceInfo> = (&networks)
            .into_iter()
            .map(|(name, data)| InterfaceInfo {
                interface: name.clone(),
                mac_address: data.mac_address().to_string(),
                bytes_received: data.total_received(),
                bytes_transmitted: data.total_transmitted(),
            })
            .collect();
        interfaces.sort_by(|a, b| a.interface.cmp(&b.interface));

        Ok(NetworkInfo {
            hostname,
            local_ip,
            interfaces,
            timestamp: now(),
        })
    }
}

/// Canned weather record for `location`
pub fn simulated_weather(location: &str) -> WeatherReport {
    WeatherReport {
        weather: WeatherData {
            location: title_case(location),
            temperature: 22.5,
            conditions: "Partly Cloudy".into(),
            humidity: 65,
            wind_speed: 15.2,
            pressure: 1013,
            timestamp: now(),
        },
        source: "simulated".into(),
    }
}

/// Abstract first, then related topics, truncated to `max_results`
fn build_search_response(query: &str, answer: &InstantAnswer, max_results: usize) -> SearchResponse {
    let mut results = Vec::new();

    if !answer.abstract_text.is_empty() {
        let title = if answer.heading.is_empty() {
            "Information".to_string()
        } else {
            answer.heading.clone()
        };
        results.push(SearchResult {
            title,
            url: answer.abstract_url.clone(),
            snippet: answer.abstract_text.clone(),
            kind: SearchResultKind::Abstract,
        });
    }

    for topic in answer.related_topics.iter().take(max_results) {
        let text = topic.get("Text").and_then(|v| v.as_str()).unwrap_or_default();
        if text.is_empty() {
            continue;
        }
        let url = topic
            .get("FirstURL")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let slug = url.rsplit('/').next().unwrap_or_default().replace('_', " ");

        results.push(SearchResult {
            title: title_case(&slug),
            url: url.to_string(),
            snippet: text.to_string(),
            kind: SearchResultKind::Related,
        });
    }

    let total_results = results.len();
    results.truncate(max_results);

    SearchResponse {
        query: query.to_string(),
        results,
        total_results,
        source: "DuckDuckGo".into(),
    }
}

fn resolve_local_ip(hostname: &str) -> Option<IpAddr> {
    let addrs: Vec<IpAddr> = (hostname, 0)
        .to_socket_addrs()
        .ok()?
        .map(|addr| addr.ip())
        .collect();
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

/// Uppercase the first letter of each word, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
