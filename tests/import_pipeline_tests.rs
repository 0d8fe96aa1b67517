use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;
use tubeport::error::{ApiError, InputError};
use tubeport::import::{
    ChannelId, CsvRecordSource, ImportOutcome, RecordSource, SubscriptionRecord, run_import,
};
use tubeport::youtube::ChannelSubscriber;

#[derive(Default)]
struct RecordingSubscriber {
    calls: Mutex<Vec<String>>,
    reject: Vec<&'static str>,
}

#[async_trait]
impl ChannelSubscriber for RecordingSubscriber {
    async fn subscribe(&self, channel: &ChannelId) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(channel.to_string());
        if self.reject.contains(&channel.as_str()) {
            return Err(ApiError::Status {
                status: StatusCode::FORBIDDEN,
                reason: Some("subscriptionForbidden".to_string()),
                message: "forbidden".to_string(),
            });
        }
        Ok(())
    }
}

fn records(rows: &[&str]) -> Vec<SubscriptionRecord> {
    rows.iter()
        .enumerate()
        .map(|(index, url)| SubscriptionRecord::new(index, *url))
        .collect()
}

#[tokio::test]
async fn header_is_skipped_and_bad_rows_never_reach_the_api() {
    let subscriber = RecordingSubscriber::default();
    let input = records(&[
        "Channel Url",
        "https://www.youtube.com/channel/UC_A",
        "https://www.youtube.com/user/B",
    ]);

    let report = run_import(&input, &subscriber).await;

    assert_eq!(*subscriber.calls.lock().unwrap(), vec!["UC_A"]);
    assert_eq!(report.total(), 2);
    assert!(matches!(
        &report.outcomes[0],
        ImportOutcome::Subscribed { row: 1, channel } if channel.as_str() == "UC_A"
    ));
    assert!(matches!(
        &report.outcomes[1],
        ImportOutcome::ExtractionFailed { row: 2, .. }
    ));
}

#[tokio::test]
async fn header_only_input_makes_no_calls() {
    let subscriber = RecordingSubscriber::default();
    let report = run_import(&records(&["Channel Url"]), &subscriber).await;

    assert_eq!(report.total(), 0);
    assert!(subscriber.calls.lock().unwrap().is_empty());

    let report = run_import(&[], &subscriber).await;
    assert_eq!(report.total(), 0);
}

#[tokio::test]
async fn header_row_is_skipped_even_when_it_names_a_channel() {
    let subscriber = RecordingSubscriber::default();
    let report = run_import(
        &records(&[
            "https://www.youtube.com/channel/UC_HEADER",
            "https://www.youtube.com/channel/UC_DATA",
        ]),
        &subscriber,
    )
    .await;

    assert_eq!(*subscriber.calls.lock().unwrap(), vec!["UC_DATA"]);
    assert_eq!(report.subscribed(), 1);
}

#[tokio::test]
async fn rejected_subscription_does_not_stop_the_run() {
    let subscriber = RecordingSubscriber {
        reject: vec!["UC_2"],
        ..Default::default()
    };
    let input = records(&[
        "header",
        "https://www.youtube.com/channel/UC_1",
        "https://www.youtube.com/channel/UC_2",
        "",
        "https://www.youtube.com/channel/UC_3",
    ]);

    let report = run_import(&input, &subscriber).await;

    assert_eq!(
        *subscriber.calls.lock().unwrap(),
        vec!["UC_1", "UC_2", "UC_3"]
    );
    assert_eq!(report.total(), input.len() - 1);
    assert_eq!(
        report.subscribed() + report.extraction_failures() + report.subscribe_failures(),
        report.total()
    );
    assert_eq!(report.subscribed(), 2);
    assert_eq!(report.extraction_failures(), 1);
    assert_eq!(report.subscribe_failures(), 1);
    assert_eq!(
        report.outcomes.iter().map(ImportOutcome::row).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    match &report.outcomes[1] {
        ImportOutcome::SubscribeFailed { channel, error, .. } => {
            assert_eq!(channel.as_str(), "UC_2");
            assert_eq!(error.status(), Some(StatusCode::FORBIDDEN));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn takeout_csv_is_imported_in_file_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("subscriptions.csv");
    std::fs::write(
        &path,
        "Channel Id,Channel Url,Channel Title\n\
         UC_one,http://www.youtube.com/channel/UC_one,\"One, the channel\"\n\
         UC_two,http://www.youtube.com/channel/UC_two,Two\n\
         bad,not a url,Bad\n",
    )
    .expect("write csv");

    let source = CsvRecordSource::new(&path);
    let input = source.read_all().expect("readable csv");
    assert_eq!(input.len(), 4);

    let subscriber = RecordingSubscriber::default();
    let report = run_import(&input, &subscriber).await;

    assert_eq!(*subscriber.calls.lock().unwrap(), vec!["UC_one", "UC_two"]);
    assert_eq!(report.subscribed(), 2);
    assert_eq!(report.extraction_failures(), 1);
}

#[test]
fn missing_input_file_is_an_open_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = CsvRecordSource::new(dir.path().join("absent.csv"));

    let err = source.read_all().expect_err("missing file");
    assert!(matches!(err, InputError::Open { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn ragged_rows_are_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("subscriptions.csv");
    std::fs::write(&path, "a,b,c\nx,y\n").expect("write csv");

    let err = CsvRecordSource::new(&path).read_all().expect_err("ragged");
    assert!(matches!(err, InputError::Parse { .. }));
}
