//! The saved analyses, newest first, persisted as one JSON list.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::storage::{LocalStore, Storable};
use crate::engine::model::{AnalysisType, HistoryRecord};
use crate::engine::parser::extract_summary;

/// Label used when an analysis was saved without a period.
pub const UNNAMED_PERIOD: &str = "Análise Avulsa";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(pub Vec<HistoryRecord>);

impl Storable for HistoryLog {
    const KEY: &'static str = "nucleo_history";
}

impl HistoryLog {
    pub fn load(store: &LocalStore) -> Result<Self> {
        Ok(store.load::<Self>()?.unwrap_or_default())
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Looks a record up by full id, or by an id prefix that matches exactly one record.
    pub fn find(&self, id: &str) -> Result<&HistoryRecord> {
        if let Some(r) = self.0.iter().find(|r| r.id == id) {
            return Ok(r);
        }
        let mut matches = self.0.iter().filter(|r| !id.is_empty() && r.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(r), None) => Ok(r),
            (Some(_), Some(_)) => bail!("Ambiguous history id '{id}'"),
            (None, _) => bail!("No analysis with id '{id}'"),
        }
    }

    /// Removes one record and returns it.
    pub fn delete(&mut self, id: &str) -> Result<HistoryRecord> {
        let target = self.find(id)?.id.clone();
        let pos = self
            .0
            .iter()
            .position(|r| r.id == target)
            .ok_or_else(|| anyhow::anyhow!("No analysis with id '{id}'"))?;
        Ok(self.0.remove(pos))
    }

    fn prepend(&mut self, record: HistoryRecord) {
        self.0.insert(0, record);
    }
}

/// Builds a record for a finished analysis, stores it at the head of the list
/// and returns it.
pub fn save_record(
    store: &LocalStore,
    kind: AnalysisType,
    period: &str,
    input: &str,
    result: &str,
) -> Result<HistoryRecord> {
    let record = HistoryRecord {
        id: Uuid::new_v4().to_string(),
        kind,
        date: chrono::Utc::now().to_rfc3339(),
        month_year: if period.trim().is_empty() {
            UNNAMED_PERIOD.to_string()
        } else {
            period.to_string()
        },
        input: input.to_string(),
        result: result.to_string(),
        summary: extract_summary(result),
    };

    let mut log = HistoryLog::load(store)?;
    log.prepend(record.clone());
    store.save(&log)?;
    log::info!("saved analysis {} ({} in history)", record.id, log.len());
    Ok(record)
}

pub fn delete_record(store: &LocalStore, id: &str) -> Result<HistoryRecord> {
    let mut log = HistoryLog::load(store)?;
    let removed = log.delete(id)?;
    store.save(&log)?;
    Ok(removed)
}

pub fn clear(store: &LocalStore) -> Result<()> {
    store.remove::<HistoryLog>()
}
