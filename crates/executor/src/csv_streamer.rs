use csv::ReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::Sender;
use tracing::{error, info};

use super::error::Error;
use super::types::{GraphJob, GraphStreamer};
use common::types::EdgeRecord;

/// Reads one signal-flow graph per CSV file.
///
/// Each file needs a header row with `from`, `to` and `gain` columns; other
/// columns are ignored.
pub struct CsvStreamer {
    paths: Vec<PathBuf>,
}

impl CsvStreamer {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        CsvStreamer { paths }
    }

    fn parse_csv_to_edges(path: &Path) -> Result<Vec<EdgeRecord>, Error> {
        let file = File::open(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to read edge list");
            Error::IoError(e)
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut edges = Vec::new();

        for result in rdr.deserialize() {
            let record: EdgeRecord = result?;
            edges.push(record);
        }
        Ok(edges)
    }
}

#[async_trait::async_trait]
impl GraphStreamer for CsvStreamer {
    async fn run_stream(self, sender: Sender<GraphJob>) -> Result<(), Error> {
        info!(files = self.paths.len(), "CsvStreamer: starting");
        let mut graphs_sent = 0;

        for path in &self.paths {
            let edges = match Self::parse_csv_to_edges(path) {
                Ok(edges) => edges,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Skipping unreadable edge list");
                    continue;
                }
            };

            let job = GraphJob {
                label: path.display().to_string(),
                edges,
            };
            if sender.send(job).await.is_err() {
                error!("CsvStreamer shutting down: worker receiver dropped during send");
                return Err(Error::ChannelSendFailed);
            }
            graphs_sent += 1;
        }

        info!(graphs_sent, "CsvStreamer: finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio::sync::mpsc;

    const MOCK_CSV_CONTENT: &str = "\
id,from,to,gain,label
1,A,B,2.0,forward
2,B,C,3.0,forward
3,C,B,-0.5,feedback
4,C,D,1.0,forward
";

    fn mock_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(content.as_bytes())
            .expect("Failed to write mock content");
        temp_file
    }

    #[test]
    fn test_parse_csv_to_edges_success() {
        let temp_file = mock_file(MOCK_CSV_CONTENT);

        let result = CsvStreamer::parse_csv_to_edges(temp_file.path());
        assert!(
            result.is_ok(),
            "Parsing failed with error: {:?}",
            result.err()
        );

        let edges = result.unwrap();
        let expected_edges = vec![
            EdgeRecord::new("A", "B", 2.0),
            EdgeRecord::new("B", "C", 3.0),
            EdgeRecord::new("C", "B", -0.5),
            EdgeRecord::new("C", "D", 1.0),
        ];

        assert_eq!(edges, expected_edges, "Parsed edges do not match expected data.");
    }

    #[test]
    fn test_parse_csv_to_edges_file_not_found() {
        let result = CsvStreamer::parse_csv_to_edges(Path::new("non_existent_file.csv"));

        if let Err(Error::IoError(e)) = result {
            assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        } else {
            panic!("Expected IoError, got: {:?}", result);
        }
    }

    #[test]
    fn test_parse_csv_bad_gain() {
        let temp_file = mock_file("from,to,gain\nA,B,abc\n");

        let result = CsvStreamer::parse_csv_to_edges(temp_file.path());
        assert!(matches!(result, Err(Error::CsvError(_))));
    }

    /// Unreadable files are skipped; readable ones still become jobs.
    #[tokio::test]
    async fn test_run_stream_sends_one_job_per_file() {
        let temp_file = mock_file(MOCK_CSV_CONTENT);
        let streamer = CsvStreamer::new(vec![
            PathBuf::from("non_existent_file.csv"),
            temp_file.path().to_path_buf(),
        ]);

        let (tx, mut rx) = mpsc::channel(4);
        streamer.run_stream(tx).await.expect("Stream should finish");

        let job = rx.recv().await.expect("One job expected");
        assert_eq!(job.edges.len(), 4);
        assert_eq!(job.label, temp_file.path().display().to_string());
        assert!(rx.recv().await.is_none());
    }
}
