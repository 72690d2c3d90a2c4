//! Maintenance reminder thresholds and alerts.
//!
//! Thresholds are persisted as a single JSON object through a
//! [`PreferenceStore`]; saved values are overlaid on the defaults, so an
//! action never saved keeps its default.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{QuickAction, QuickRecord};

/// Preference key the thresholds are saved under
pub const THRESHOLDS_KEY: &str = "moto-log:maintenance-thresholds";

/// Days after which an action is due (`warn`) or overdue (`danger`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceThreshold {
    pub warn_days: u32,
    pub danger_days: u32,
}

impl MaintenanceThreshold {
    pub const fn new(warn_days: u32, danger_days: u32) -> Self {
        Self {
            warn_days,
            danger_days,
        }
    }
}

/// Thresholds by action
pub type MaintenanceThresholds = BTreeMap<QuickAction, MaintenanceThreshold>;

/// Built-in thresholds
pub fn default_thresholds() -> MaintenanceThresholds {
    BTreeMap::from([
        (QuickAction::ChainLube, MaintenanceThreshold::new(7, 14)),
        (QuickAction::TirePressure, MaintenanceThreshold::new(14, 30)),
        (QuickAction::Wash, MaintenanceThreshold::new(14, 30)),
        (QuickAction::ChainClean, MaintenanceThreshold::new(14, 30)),
        (QuickAction::OilCheck, MaintenanceThreshold::new(30, 60)),
        (QuickAction::CoolantCheck, MaintenanceThreshold::new(30, 90)),
        (QuickAction::BatteryCharge, MaintenanceThreshold::new(30, 60)),
    ])
}

/// String key/value persistence for user preferences
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Preferences kept only for the life of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Threshold settings backed by a preference store
#[derive(Debug)]
pub struct MaintenanceSettings<S> {
    store: S,
}

impl<S: PreferenceStore> MaintenanceSettings<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Defaults overlaid with saved values.
    ///
    /// Saved entries for actions this build does not know are ignored, and
    /// an unreadable saved value falls back to the defaults.
    pub fn thresholds(&self) -> Result<MaintenanceThresholds> {
        let mut thresholds = default_thresholds();
        let Some(saved) = self.store.get(THRESHOLDS_KEY)? else {
            return Ok(thresholds);
        };

        let saved: BTreeMap<String, MaintenanceThreshold> = match serde_json::from_str(&saved) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Ignoring unreadable maintenance thresholds: {e}");
                return Ok(thresholds);
            }
        };
        for (action, threshold) in saved {
            match action.parse::<QuickAction>() {
                Ok(action) => {
                    thresholds.insert(action, threshold);
                }
                Err(e) => tracing::debug!("Skipping saved threshold: {e}"),
            }
        }
        Ok(thresholds)
    }

    /// Save a threshold for one action
    pub fn set_threshold(&mut self, action: QuickAction, threshold: MaintenanceThreshold) -> Result<()> {
        if threshold.warn_days == 0 || threshold.warn_days > threshold.danger_days {
            return Err(Error::InvalidInput(format!(
                "warn days must be positive and not exceed danger days (got {}/{})",
                threshold.warn_days, threshold.danger_days
            )));
        }

        let mut thresholds = self.thresholds()?;
        thresholds.insert(action, threshold);
        let saved: BTreeMap<&str, MaintenanceThreshold> = thresholds
            .iter()
            .map(|(action, threshold)| (action.as_str(), *threshold))
            .collect();
        self.store
            .set(THRESHOLDS_KEY, &serde_json::to_string(&saved)?)
    }

    /// Drop every saved threshold
    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(THRESHOLDS_KEY)
    }
}

/// How overdue an action is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Ok,
    Warn,
    Danger,
    /// Never recorded
    Never,
}

/// Days since an action was last recorded, graded by its threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceAlert {
    pub action: QuickAction,
    pub last_date: Option<NaiveDate>,
    pub days_since: Option<i64>,
    pub level: AlertLevel,
}

/// Grade every thresholded action against the latest record of it.
pub fn maintenance_alerts(
    quicks: &[QuickRecord],
    thresholds: &MaintenanceThresholds,
    today: NaiveDate,
) -> Vec<MaintenanceAlert> {
    thresholds
        .iter()
        .map(|(&action, threshold)| {
            let last_date = quicks
                .iter()
                .filter(|record| record.action == action)
                .map(|record| record.date)
                .max();
            let days_since = last_date.map(|date| (today - date).num_days());
            let level = match days_since {
                None => AlertLevel::Never,
                Some(days) if days >= i64::from(threshold.danger_days) => AlertLevel::Danger,
                Some(days) if days >= i64::from(threshold.warn_days) => AlertLevel::Warn,
                Some(_) => AlertLevel::Ok,
            };
            MaintenanceAlert {
                action,
                last_date,
                days_since,
                level,
            }
        })
        .collect()
}
