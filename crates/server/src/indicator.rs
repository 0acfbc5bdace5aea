//! Per-tab status indicator.
//!
//! Three states, three icon colours, three sizes per colour. The board keeps
//! the latest state for each tab so the bridge can ask which icon to show.

use std::collections::{BTreeMap, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use idxwatch_core::Error;

/// Browser tab identifier.
pub type TabId = i64;

/// Icon sizes shipped for every state.
pub const ICON_SIZES: [u16; 3] = [16, 48, 128];

/// What the indicator for a tab currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorState {
    #[default]
    Unknown,
    Indexed,
    NotIndexed,
}

impl IndicatorState {
    /// Map a classifier verdict onto the indicator.
    pub fn from_verdict(is_indexed: Option<bool>) -> Self {
        match is_indexed {
            Some(true) => Self::Indexed,
            Some(false) => Self::NotIndexed,
            None => Self::Unknown,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Unknown => "gray",
            Self::Indexed => "green",
            Self::NotIndexed => "red",
        }
    }

    /// Icon asset paths keyed by pixel size.
    pub fn icon_paths(self) -> BTreeMap<u16, String> {
        ICON_SIZES
            .iter()
            .map(|size| (*size, format!("icons/icon-{}-{}.png", self.color(), size)))
            .collect()
    }
}

/// Renders an indicator state for a tab.
#[async_trait::async_trait]
pub trait Indicator: Send + Sync {
    async fn set_indicator(&self, tab_id: TabId, state: IndicatorState) -> Result<(), Error>;
}

/// In-memory indicator that remembers the latest state per tab.
#[derive(Debug, Default)]
pub struct IconBoard {
    tabs: RwLock<HashMap<TabId, IndicatorState>>,
}

impl IconBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest state set for `tab_id`, if any navigation has been handled.
    pub async fn state_of(&self, tab_id: TabId) -> Option<IndicatorState> {
        self.tabs.read().await.get(&tab_id).copied()
    }
}

#[async_trait::async_trait]
impl Indicator for IconBoard {
    async fn set_indicator(&self, tab_id: TabId, state: IndicatorState) -> Result<(), Error> {
        tracing::debug!(tab_id, icon = state.color(), "updating indicator");
        self.tabs.write().await.insert(tab_id, state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_verdict() {
        assert_eq!(IndicatorState::from_verdict(Some(true)), IndicatorState::Indexed);
        assert_eq!(IndicatorState::from_verdict(Some(false)), IndicatorState::NotIndexed);
        assert_eq!(IndicatorState::from_verdict(None), IndicatorState::Unknown);
    }

    #[test]
    fn test_icon_paths() {
        let paths = IndicatorState::NotIndexed.icon_paths();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[&16], "icons/icon-red-16.png");
        assert_eq!(paths[&48], "icons/icon-red-48.png");
        assert_eq!(paths[&128], "icons/icon-red-128.png");
        assert_eq!(IndicatorState::Unknown.icon_paths()[&16], "icons/icon-gray-16.png");
        assert_eq!(IndicatorState::Indexed.icon_paths()[&16], "icons/icon-green-16.png");
    }

    #[test]
    fn test_state_serde() {
        assert_eq!(serde_json::to_string(&IndicatorState::NotIndexed).unwrap(), "\"not-indexed\"");
        let state: IndicatorState = serde_json::from_str("\"indexed\"").unwrap();
        assert_eq!(state, IndicatorState::Indexed);
    }

    #[tokio::test]
    async fn test_board_keeps_latest_state_per_tab() {
        let board = IconBoard::new();
        assert_eq!(board.state_of(1).await, None);

        board.set_indicator(1, IndicatorState::Indexed).await.unwrap();
        board.set_indicator(2, IndicatorState::NotIndexed).await.unwrap();
        board.set_indicator(1, IndicatorState::Unknown).await.unwrap();

        assert_eq!(board.state_of(1).await, Some(IndicatorState::Unknown));
        assert_eq!(board.state_of(2).await, Some(IndicatorState::NotIndexed));
    }
}
