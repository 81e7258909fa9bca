//! Streaming download of a generated video to disk.

use crate::error::Result;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Granularity of writes and progress reports.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// An open download: an optional declared length plus the body stream.
pub struct DownloadBody {
    /// Length declared by the server, if any.
    pub content_length: Option<u64>,
    /// The response body.
    pub stream: BoxStream<'static, Result<Bytes>>,
}

impl std::fmt::Debug for DownloadBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Progress after one chunk has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes written so far.
    pub downloaded: u64,
    /// Declared total, when known and non-zero.
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Percentage complete, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        self.total
            .map(|total| self.downloaded as f64 / total as f64 * 100.0)
    }
}

/// Writes `body` to `destination`, reporting progress after every chunk.
///
/// Returns the number of bytes written. A failure part-way leaves the
/// partial file in place.
pub async fn write_stream<F>(
    body: DownloadBody,
    destination: &Path,
    mut on_progress: F,
) -> Result<u64>
where
    F: FnMut(DownloadProgress),
{
    let total = body.content_length.filter(|&len| len > 0);
    let file = tokio::fs::File::create(destination).await?;
    let mut file = tokio::io::BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = body.stream;
    let mut downloaded = 0u64;

    while let Some(chunk) = stream.next().await {
        let mut chunk = chunk?;
        while !chunk.is_empty() {
            let piece = chunk.split_to(chunk.len().min(CHUNK_SIZE));
            file.write_all(&piece).await?;
            downloaded += piece.len() as u64;
            on_progress(DownloadProgress { downloaded, total });
        }
    }

    file.flush().await?;
    tracing::debug!(
        path = %destination.display(),
        bytes = downloaded,
        "finished writing video"
    );
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrokVidError;
    use futures::stream;

    fn body(chunks: Vec<Vec<u8>>, content_length: Option<u64>) -> DownloadBody {
        DownloadBody {
            content_length,
            stream: stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c)))).boxed(),
        }
    }

    #[tokio::test]
    async fn test_known_length_reaches_exactly_100() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.mp4");
        let chunks = vec![vec![1u8; 5000], vec![2u8; 20_000], vec![3u8; 123]];
        let len: u64 = chunks.iter().map(|c| c.len() as u64).sum();

        let mut reports = Vec::new();
        let written = write_stream(body(chunks, Some(len)), &dest, |p| reports.push(p))
            .await
            .unwrap();

        assert_eq!(written, len);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), len);

        let percents: Vec<f64> = reports.iter().map(|p| p.percent().unwrap()).collect();
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*percents.last().unwrap(), 100.0);
        assert!(percents[..percents.len() - 1].iter().all(|&p| p < 100.0));
    }

    #[tokio::test]
    async fn test_large_chunks_are_split() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.mp4");

        let mut reports = Vec::new();
        write_stream(
            body(vec![vec![0u8; CHUNK_SIZE * 2 + 10]], None),
            &dest,
            |p| reports.push(p.downloaded),
        )
        .await
        .unwrap();

        assert_eq!(
            reports,
            vec![
                CHUNK_SIZE as u64,
                CHUNK_SIZE as u64 * 2,
                CHUNK_SIZE as u64 * 2 + 10
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_length_has_no_percentage() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.mp4");
        let chunks = vec![b"hello ".to_vec(), b"world".to_vec()];

        let mut reports = Vec::new();
        let written = write_stream(body(chunks, None), &dest, |p| reports.push(p))
            .await
            .unwrap();

        assert_eq!(written, 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
        assert!(reports.iter().all(|p| p.percent().is_none()));
    }

    #[tokio::test]
    async fn test_zero_declared_length_treated_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.mp4");

        let mut reports = Vec::new();
        write_stream(body(vec![vec![7u8; 10]], Some(0)), &dest, |p| reports.push(p))
            .await
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].percent(), None);
    }

    #[tokio::test]
    async fn test_stream_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.mp4");
        let items: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(GrokVidError::UnexpectedResponse("connection reset".into())),
        ];
        let body = DownloadBody {
            content_length: Some(100),
            stream: stream::iter(items).boxed(),
        };

        let err = write_stream(body, &dest, |_| {}).await.unwrap_err();
        assert!(matches!(err, GrokVidError::UnexpectedResponse(_)));
    }
}
