use super::identity::{ChannelId, extract_channel_id};
use super::source::SubscriptionRecord;
use crate::error::{ApiError, ExtractionError};
use crate::youtube::ChannelSubscriber;
use tracing::{info, warn};

/// Result of one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Subscribed {
        row: usize,
        channel: ChannelId,
    },
    ExtractionFailed {
        row: usize,
        error: ExtractionError,
    },
    SubscribeFailed {
        row: usize,
        channel: ChannelId,
        error: ApiError,
    },
}

impl ImportOutcome {
    pub fn row(&self) -> usize {
        match self {
            ImportOutcome::Subscribed { row, .. }
            | ImportOutcome::ExtractionFailed { row, .. }
            | ImportOutcome::SubscribeFailed { row, .. } => *row,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Subscribed { .. })
    }
}

/// Per-row outcomes of one run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub outcomes: Vec<ImportOutcome>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn subscribed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn extraction_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ImportOutcome::ExtractionFailed { .. }))
            .count()
    }

    pub fn subscribe_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ImportOutcome::SubscribeFailed { .. }))
            .count()
    }
}

/// Subscribe to every data row, one call at a time.
///
/// The first record is the header and is skipped whatever it contains. Row failures are
/// recorded and never stop the loop; a row that fails extraction never reaches `subscriber`.
pub async fn run_import(
    records: &[SubscriptionRecord],
    subscriber: &dyn ChannelSubscriber,
) -> ImportReport {
    let mut report = ImportReport {
        outcomes: Vec::with_capacity(records.len().saturating_sub(1)),
    };

    for record in records.iter().skip(1) {
        let row = record.index;
        let channel = match extract_channel_id(&record.channel_ref) {
            Ok(channel) => channel,
            Err(error) => {
                warn!(row, error = %error, "skipping row");
                report
                    .outcomes
                    .push(ImportOutcome::ExtractionFailed { row, error });
                continue;
            }
        };

        let outcome = match subscriber.subscribe(&channel).await {
            Ok(()) => {
                info!(row, channel_id = %channel, "subscribed to channel");
                ImportOutcome::Subscribed { row, channel }
            }
            Err(error) => {
                warn!(row, channel_id = %channel, error = %error, "unable to subscribe to channel");
                ImportOutcome::SubscribeFailed {
                    row,
                    channel,
                    error,
                }
            }
        };
        report.outcomes.push(outcome);
    }

    info!(
        total = report.total(),
        subscribed = report.subscribed(),
        extraction_failures = report.extraction_failures(),
        subscribe_failures = report.subscribe_failures(),
        "subscription import completed"
    );
    report
}
