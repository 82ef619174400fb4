// src/insights.rs
//
// Free-text occupancy report from a generative model. The engine feeds it a
// computed summary; nothing downstream depends on what comes back.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::dashboard::{team_overview, ConsultantFilter};
use crate::period::Period;
use crate::state::AppState;

pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const TEMPERATURE: f32 = 0.5;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Generative API key is not configured")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Generative API error: Status={status}, Message={message}")]
    Api { status: StatusCode, message: String },
    #[error("Generative API returned no text")]
    EmptyResponse,
}

/// What the model gets to see about the team.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySummary {
    pub total_consultants: usize,
    pub active_projects: usize,
    pub assignments_count: usize,
    pub period: String,
    pub view: String,
    pub overloaded_consultants: usize,
    pub available_consultants: usize,
    pub team_fte: f64,
}

impl OccupancySummary {
    pub fn from_state(state: &AppState, period: &Period, is_weekly: bool) -> Self {
        let overview = team_overview(
            state,
            period,
            is_weekly,
            state.settings.include_tentative_by_default,
            &ConsultantFilter::default(),
        );
        Self {
            total_consultants: state.consultants.len(),
            active_projects: state.projects.iter().filter(|p| p.active).count(),
            assignments_count: state.assignments.len(),
            period: period.key(),
            view: if is_weekly { "Weekly" } else { "Monthly" }.to_string(),
            overloaded_consultants: overview.stats.overloaded_count,
            available_consultants: overview.stats.available_count,
            team_fte: overview.stats.total_fte,
        }
    }
}

pub fn build_prompt(summary: &OccupancySummary) -> Result<String, serde_json::Error> {
    let summary_json = serde_json::to_string_pretty(summary)?;
    Ok(format!(
        "You are an experienced resource manager.\n\
         Analyse the following team occupancy state:\n\n\
         SUMMARY:\n{}\n\n\
         TASK:\n\
         Write a short report (max 200 words) on the health of team occupancy for period {}.\n\
         Point out likely bottlenecks, people without enough work and critical overloads.\n\
         Answer in a professional, executive tone.",
        summary_json, summary.period
    ))
}

// --- generateContent wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Text of the first candidate, parts concatenated.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Clone)]
pub struct InsightsClient {
    http_client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl InsightsClient {
    pub fn new(http_client: Client, api_key: &str, model: &str, base_url: &str) -> Result<Self, InsightsError> {
        if api_key.trim().is_empty() {
            return Err(InsightsError::MissingApiKey);
        }
        Ok(Self {
            http_client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> Result<Url, InsightsError> {
        let mut url = Url::parse(&format!("{}/models/{}:generateContent", self.base_url, self.model))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    pub async fn occupancy_insights(&self, summary: &OccupancySummary) -> Result<String, InsightsError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(summary)?),
                }],
            }],
            generation_config: GenerationConfig { temperature: TEMPERATURE },
        };

        info!("Requesting occupancy insights for {} from {}", summary.period, self.model);
        let response = self
            .http_client
            .post(self.endpoint()?)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Generative API request failed. Status: {}, Body: {}", status, message);
            return Err(InsightsError::Api { status, message });
        }

        let parsed = response.json::<GenerateContentResponse>().await?;
        extract_text(parsed).ok_or(InsightsError::EmptyResponse)
    }
}
