mod identity;
mod pipeline;
mod source;

pub use identity::{ChannelId, extract_channel_id};
pub use pipeline::{ImportOutcome, ImportReport, run_import};
pub use source::{CHANNEL_URL_COLUMN, CsvRecordSource, RecordSource, SubscriptionRecord};
