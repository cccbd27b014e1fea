//! Set reconciliation of an emote's tags and names.
//!
//! Only the difference between the current and the desired set is written.
//! Every write is independent: a failure is recorded in the report and the
//! remaining writes still run.

use std::fmt;

use emotes_common::{AppError, AppResult};
use emotes_db::EmoteStore;
use emotes_db::entities::{emote_name, tag};
use tracing::{debug, warn};

/// Association kind being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Tag,
    Name,
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag => f.write_str("tag"),
            Self::Name => f.write_str("name"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Add,
    Remove,
}

/// Result of a single association write.
#[derive(Debug)]
pub struct Outcome {
    pub value: String,
    pub change: Change,
    pub result: AppResult<()>,
}

/// Collected outcomes of one reconciliation pass.
#[derive(Debug)]
pub struct ReconcileReport {
    pub association: Association,
    pub outcomes: Vec<Outcome>,
}

impl ReconcileReport {
    const fn new(association: Association) -> Self {
        Self {
            association,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, value: &str, change: Change, result: AppResult<()>) {
        self.outcomes.push(Outcome {
            value: value.to_string(),
            change,
            result,
        });
    }

    /// Number of writes that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Log every failed write at `warn`.
    pub fn log(&self, emote_id: i32) {
        for outcome in &self.outcomes {
            if let Err(e) = &outcome.result {
                warn!(
                    emote_id,
                    association = %self.association,
                    value = %outcome.value,
                    change = ?outcome.change,
                    error = %e,
                    "Association write failed"
                );
            }
        }

        debug!(
            emote_id,
            association = %self.association,
            writes = self.outcomes.len(),
            failed = self.failures(),
            "Reconciled associations"
        );
    }
}

fn plan<'a>(current: &'a [&'a str], desired: &'a [String]) -> (Vec<&'a str>, Vec<&'a str>) {
    let to_add = desired
        .iter()
        .map(String::as_str)
        .filter(|d| !current.contains(d))
        .collect();
    let to_remove = current
        .iter()
        .copied()
        .filter(|c| !desired.iter().any(|d| d == c))
        .collect();
    (to_add, to_remove)
}

/// Attach missing tags and detach dropped ones. Tag rows are never deleted.
pub async fn reconcile_tags(
    store: &dyn EmoteStore,
    emote_id: i32,
    current: &[tag::Model],
    desired: &[String],
) -> ReconcileReport {
    let mut report = ReconcileReport::new(Association::Tag);
    let current_names: Vec<&str> = current.iter().map(|t| t.name.as_str()).collect();
    let (to_add, to_remove) = plan(&current_names, desired);

    for name in to_add {
        let result = async {
            let tag = store.find_or_create_tag(name).await?;
            store.attach_tag(emote_id, &tag.id).await
        }
        .await;
        report.record(name, Change::Add, result);
    }

    for name in to_remove {
        let result = match current.iter().find(|t| t.name == name) {
            Some(tag) => store.detach_tag(emote_id, &tag.id).await,
            None => Ok(()),
        };
        report.record(name, Change::Remove, result);
    }

    report
}

/// Bind missing names and delete dropped ones.
///
/// A name already bound to another emote is left with its owner and the
/// attempt is recorded as a failure.
pub async fn reconcile_names(
    store: &dyn EmoteStore,
    emote_id: i32,
    current: &[emote_name::Model],
    desired: &[String],
) -> ReconcileReport {
    let mut report = ReconcileReport::new(Association::Name);
    let current_names: Vec<&str> = current.iter().map(|n| n.name.as_str()).collect();
    let (to_add, to_remove) = plan(&current_names, desired);

    for name in to_add {
        let result = async {
            let row = store.find_or_create_name(name).await?;
            match row.emote_id {
                None => store.attach_name(emote_id, &row.id).await,
                Some(owner) if owner == emote_id => Ok(()),
                Some(owner) => Err(AppError::Conflict(format!(
                    "Name {name} already belongs to emote {owner}"
                ))),
            }
        }
        .await;
        report.record(name, Change::Add, result);
    }

    for name in to_remove {
        let result = match current.iter().find(|n| n.name == name) {
            Some(row) => store.delete_name(&row.id).await,
            None => Ok(()),
        };
        report.record(name, Change::Remove, result);
    }

    report
}
