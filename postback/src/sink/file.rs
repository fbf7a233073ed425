use std::path::Path;
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{ErrorKind, PostbackResult};
use crate::postback_error;
use crate::sink::base::{DeliveryRecord, RecordSink};
use crate::types::DeliveryOutcome;

/// Append-only JSON-lines delivery log.
///
/// One [`DeliveryRecord`] is written per line. The file is opened once at
/// startup, so an unopenable log destination is a fatal startup error. A
/// failed write later is reported to the caller after dumping the line to
/// stderr as a best-effort fallback.
#[derive(Debug, Clone)]
pub struct FileSink {
    file: Arc<Mutex<File>>,
}

impl FileSink {
    /// Opens (creating if needed) the delivery log at `path` for appending.
    pub async fn create(path: impl AsRef<Path>) -> PostbackResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|err| {
                postback_error!(
                    ErrorKind::SinkIoError,
                    "Failed to open delivery log",
                    path.display().to_string(),
                    source: err
                )
            })?;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

impl RecordSink for FileSink {
    async fn record(&self, outcome: DeliveryOutcome) -> PostbackResult<()> {
        let record = DeliveryRecord::from(&outcome);
        let mut line = serde_json::to_string(&record).map_err(|err| {
            postback_error!(
                ErrorKind::SerializationError,
                "Failed to serialize delivery record",
                source: err
            )
        })?;
        line.push('\n');

        let mut file = self.file.lock().await;
        let written = async {
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(err) = written {
            // The record still reaches stderr, so a full disk degrades
            // observability without losing the attempt entirely.
            eprint!("{line}");

            return Err(postback_error!(
                ErrorKind::SinkIoError,
                "Failed to write delivery record",
                source: err
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use rand::random;

    use crate::types::{DeliveryStatus, HttpMethod, Job};

    use super::*;

    #[tokio::test]
    async fn records_are_written_as_parseable_json_lines() {
        let path = std::env::temp_dir().join(format!("postback-sink-{}.log", random::<u64>()));
        let sink = FileSink::create(&path).await.unwrap();

        for status_code in [200, 404] {
            let outcome = DeliveryOutcome {
                job: Job {
                    method: HttpMethod::Get,
                    url: "https://example.test/cb".to_string(),
                },
                started_at: Utc::now(),
                elapsed: Duration::from_millis(7),
                status: DeliveryStatus::Delivered {
                    status_code,
                    response_body: "OK".to_string(),
                },
            };
            sink.record(outcome).await.unwrap();
        }

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let records: Vec<DeliveryRecord> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].response_code, Some(200));
        assert_eq!(records[1].response_code, Some(404));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn create_fails_for_unopenable_path() {
        let result = FileSink::create("/nonexistent-dir/delivery.log").await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), ErrorKind::SinkIoError);
    }
}
