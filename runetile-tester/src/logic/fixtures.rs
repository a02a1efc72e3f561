use anyhow::{Context, Result};
use runetile_game::{
    PlayerStats, ProviderError, QuestProvider, QuestRecord, RewardPolicy, StatProvider,
};
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;

const DEFAULT_POLICY: &str = include_str!("../../../assets/data/reward_policy.json");
const DEFAULT_PLAYERS: &str = include_str!("../../../assets/data/players.json");

/// A scripted hiscores profile.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerFixture {
    pub name: String,
    pub stats: PlayerStats,
    #[serde(default)]
    pub quests: Vec<QuestRecord>,
}

/// Fixture-backed stat and quest providers. Clones share the fixture list.
#[derive(Debug, Clone)]
pub struct FixtureProviders {
    players: Rc<[PlayerFixture]>,
    offline: bool,
}

impl FixtureProviders {
    #[must_use]
    pub fn new(players: &[PlayerFixture]) -> Self {
        Self {
            players: players.into(),
            offline: false,
        }
    }

    /// Providers that fail every lookup, for outage scenarios.
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn find(&self, player_name: &str) -> Result<&PlayerFixture, ProviderError> {
        if self.offline {
            return Err(ProviderError::Unavailable("fixtures offline".to_string()));
        }
        self.players
            .iter()
            .find(|fixture| fixture.name.eq_ignore_ascii_case(player_name.trim()))
            .ok_or_else(|| ProviderError::NotFound(player_name.to_string()))
    }
}

impl StatProvider for FixtureProviders {
    fn fetch_stats(&self, player_name: &str) -> Result<PlayerStats, ProviderError> {
        self.find(player_name).map(|fixture| fixture.stats)
    }
}

impl QuestProvider for FixtureProviders {
    fn fetch_quests(&self, player_name: &str) -> Result<Vec<QuestRecord>, ProviderError> {
        self.find(player_name).map(|fixture| fixture.quests.clone())
    }
}

/// Policy and player fixtures shared by every scenario.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    pub policy: RewardPolicy,
    pub players: Vec<PlayerFixture>,
}

impl TesterAssets {
    /// Assets compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled JSON fails to parse or validate.
    pub fn load_default() -> Result<Self> {
        Self::from_json(DEFAULT_POLICY, DEFAULT_PLAYERS)
    }

    /// Bundled assets with optional on-disk overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be read or any JSON is invalid.
    pub fn load(policy_path: Option<&Path>, players_path: Option<&Path>) -> Result<Self> {
        let policy = match policy_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading policy {}", path.display()))?,
            None => DEFAULT_POLICY.to_string(),
        };
        let players = match players_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading players {}", path.display()))?,
            None => DEFAULT_PLAYERS.to_string(),
        };
        Self::from_json(&policy, &players)
    }

    fn from_json(policy: &str, players: &str) -> Result<Self> {
        let policy = RewardPolicy::from_json(policy).context("parsing reward policy")?;
        let players: Vec<PlayerFixture> =
            serde_json::from_str(players).context("parsing player fixtures")?;
        anyhow::ensure!(!players.is_empty(), "player fixtures are empty");
        Ok(Self { policy, players })
    }

    #[must_use]
    pub fn providers(&self) -> FixtureProviders {
        FixtureProviders::new(&self.players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_assets_load() {
        let assets = TesterAssets::load_default().unwrap();
        assert_eq!(assets.policy, RewardPolicy::default());
        assert!(assets.providers().fetch_stats("iron novice").is_ok());
    }

    #[test]
    fn providers_resolve_case_insensitively() {
        let assets = TesterAssets::load_default().unwrap();
        let providers = assets.providers();
        let stats = providers.fetch_stats("LYNX TITAN").unwrap();
        assert_eq!(stats.attack, 99);
        assert!(matches!(
            providers.fetch_quests("nobody"),
            Err(ProviderError::NotFound(_))
        ));
        assert!(matches!(
            providers.offline().fetch_stats("Lynx Titan"),
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn missing_override_reports_path() {
        let err = TesterAssets::load(Some(Path::new("/nonexistent/policy.json")), None)
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/policy.json"));
    }
}
