//! Riot Games API client for Teamfight Tactics.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{FetchError, FetchOutcome, LadderClient};
use crate::models::{
    Division, MatchData, MatchId, Participant, PlayerId, RankRecord, Tier, Trait, Unit,
};

/// Queue type of the ranked ladder in league entries.
const RANKED_QUEUE_TYPE: &str = "RANKED_TFT";

/// Header carrying the API key.
const RIOT_TOKEN_HEADER: &str = "x-riot-token";

/// Configuration for the Riot client.
#[derive(Debug, Clone)]
pub struct RiotClientConfig {
    pub api_key: String,

    /// Platform host, serves league endpoints (e.g. euw1)
    pub platform_url: Url,

    /// Regional host, serves account and match endpoints (e.g. europe)
    pub regional_url: Url,

    /// Platform region label used in reports
    pub region: String,

    /// Per-request timeout
    pub timeout: Duration,

    pub user_agent: String,
}

impl RiotClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

impl Default for RiotClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            platform_url: Url::parse("https://euw1.api.riotgames.com")
                .expect("static platform url"),
            regional_url: Url::parse("https://europe.api.riotgames.com")
                .expect("static regional url"),
            region: "euw1".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("ladder-tracker/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP client against the Riot account, league and match APIs.
pub struct RiotClient {
    client: Client,
    config: RiotClientConfig,
}

impl RiotClient {
    pub fn new(config: RiotClientConfig) -> Result<Self, FetchError> {
        let mut token = HeaderValue::from_str(&config.api_key)
            .map_err(|_| FetchError::Malformed("API key is not a valid header value".into()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(RIOT_TOKEN_HEADER, token);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("ladder-tracker")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// GET a JSON document. 404 is absence; anything else non-2xx is a failure.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchOutcome<T> {
        debug!("GET {}", url.path());

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return failed(&url, FetchError::Http(e)),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No data at {}", url.path());
            return FetchOutcome::Absent;
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return failed(
                &url,
                FetchError::RateLimited {
                    retry_after_secs: retry_after,
                },
            );
        }

        if !status.is_success() {
            return failed(
                &url,
                FetchError::HttpStatus {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("Unknown").to_string(),
                },
            );
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return failed(&url, FetchError::Http(e)),
        };

        match serde_json::from_slice(&body) {
            Ok(value) => FetchOutcome::Found(value),
            Err(e) => failed(&url, FetchError::Json(e)),
        }
    }
}

fn failed<T>(url: &Url, err: FetchError) -> FetchOutcome<T> {
    warn!("Request to {} failed: {}", url.path(), err);
    FetchOutcome::Failed(err)
}

/// Append percent-encoded path segments to a base URL.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl LadderClient for RiotClient {
    fn region(&self) -> &str {
        &self.config.region
    }

    async fn resolve_identity(&self, game_name: &str, tag_line: &str) -> FetchOutcome<PlayerId> {
        let url = match endpoint(
            &self.config.regional_url,
            &["riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line],
        ) {
            Ok(url) => url,
            Err(e) => return FetchOutcome::Failed(e),
        };

        self.get_json::<AccountDto>(url)
            .await
            .map(|account| PlayerId::from(account.puuid))
    }

    async fn get_rank(&self, player_id: &PlayerId) -> FetchOutcome<RankRecord> {
        let url = match endpoint(
            &self.config.platform_url,
            &["tft", "league", "v1", "by-puuid", player_id.as_str()],
        ) {
            Ok(url) => url,
            Err(e) => return FetchOutcome::Failed(e),
        };

        match self.get_json::<Vec<LeagueEntryDto>>(url).await {
            FetchOutcome::Found(entries) => match ranked_entry(entries) {
                Some(rank) => FetchOutcome::Found(rank),
                None => FetchOutcome::Absent,
            },
            FetchOutcome::Absent => FetchOutcome::Absent,
            FetchOutcome::Failed(e) => FetchOutcome::Failed(e),
        }
    }

    async fn list_recent_match_ids(
        &self,
        player_id: &PlayerId,
        count: u32,
    ) -> FetchOutcome<Vec<MatchId>> {
        let mut url = match endpoint(
            &self.config.regional_url,
            &["tft", "match", "v1", "matches", "by-puuid", player_id.as_str(), "ids"],
        ) {
            Ok(url) => url,
            Err(e) => return FetchOutcome::Failed(e),
        };
        url.query_pairs_mut().append_pair("count", &count.to_string());

        self.get_json::<Vec<String>>(url)
            .await
            .map(|ids| ids.into_iter().map(MatchId::from).collect())
    }

    async fn get_match(&self, match_id: &MatchId) -> FetchOutcome<MatchData> {
        let url = match endpoint(
            &self.config.regional_url,
            &["tft", "match", "v1", "matches", match_id.as_str()],
        ) {
            Ok(url) => url,
            Err(e) => return FetchOutcome::Failed(e),
        };

        match self.get_json::<MatchDto>(url).await {
            FetchOutcome::Found(dto) => match dto.into_model() {
                Ok(data) => FetchOutcome::Found(data),
                Err(e) => {
                    warn!("Skipping malformed match {}: {}", match_id, e);
                    FetchOutcome::Failed(e)
                }
            },
            FetchOutcome::Absent => FetchOutcome::Absent,
            FetchOutcome::Failed(e) => FetchOutcome::Failed(e),
        }
    }
}

/// Account API response.
#[derive(Debug, Deserialize)]
struct AccountDto {
    puuid: String,
}

/// League API entry. One per queue the player is placed in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeagueEntryDto {
    queue_type: Option<String>,
    tier: Option<String>,
    rank: Option<String>,
    #[serde(default)]
    league_points: u32,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
}

/// Pick the ranked ladder entry and convert it.
fn ranked_entry(entries: Vec<LeagueEntryDto>) -> Option<RankRecord> {
    entries
        .into_iter()
        .find(|e| e.queue_type.as_deref() == Some(RANKED_QUEUE_TYPE))
        .map(|e| RankRecord {
            tier: e.tier.as_deref().map(Tier::parse).unwrap_or(Tier::Unranked),
            division: e.rank.as_deref().and_then(Division::parse),
            league_points: e.league_points,
            wins: e.wins,
            losses: e.losses,
        })
}

/// Match API response.
#[derive(Debug, Deserialize)]
struct MatchDto {
    metadata: MatchMetadataDto,
    info: MatchInfoDto,
}

#[derive(Debug, Deserialize)]
struct MatchMetadataDto {
    match_id: String,
}

#[derive(Debug, Deserialize)]
struct MatchInfoDto {
    #[serde(default)]
    queue_id: Option<u32>,
    /// Older payloads carry the camel-cased key, newer ones carry both
    #[serde(default, rename = "queueId")]
    queue_id_camel: Option<u32>,
    #[serde(default)]
    tft_game_type: Option<String>,
    participants: Vec<ParticipantDto>,
}

#[derive(Debug, Deserialize)]
struct ParticipantDto {
    puuid: String,
    placement: u32,
    #[serde(default)]
    time_eliminated: f64,
    #[serde(default)]
    traits: Vec<TraitDto>,
    #[serde(default)]
    units: Vec<UnitDto>,
}

#[derive(Debug, Deserialize)]
struct TraitDto {
    name: String,
    #[serde(default)]
    tier_current: u32,
    #[serde(default)]
    num_units: u32,
}

#[derive(Debug, Deserialize)]
struct UnitDto {
    character_id: String,
    #[serde(default)]
    tier: u32,
}

impl MatchDto {
    /// Validate and convert into the domain model.
    fn into_model(self) -> Result<MatchData, FetchError> {
        let match_id = self.metadata.match_id;
        let queue_id = self
            .info
            .queue_id
            .or(self.info.queue_id_camel)
            .ok_or_else(|| FetchError::Malformed(format!("no queue id in {}", match_id)))?;
        let participants = self
            .info
            .participants
            .into_iter()
            .map(|p| {
                if !(1..=8).contains(&p.placement) {
                    return Err(FetchError::Malformed(format!(
                        "placement {} out of range in {}",
                        p.placement, match_id
                    )));
                }
                Ok(Participant {
                    player_id: PlayerId::from(p.puuid),
                    placement: p.placement,
                    eliminated_at_seconds: p.time_eliminated.max(0.0),
                    traits: p
                        .traits
                        .into_iter()
                        .map(|t| Trait::new(t.name, t.tier_current, t.num_units))
                        .collect(),
                    units: p
                        .units
                        .into_iter()
                        .map(|u| Unit {
                            character_id: u.character_id,
                            star_level: u.tier,
                        })
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MatchData {
            match_id: MatchId::from(match_id),
            queue_id,
            game_mode_tag: self
                .info
                .tft_game_type
                .unwrap_or_else(|| "standard".to_string()),
            participants,
        })
    }
}
