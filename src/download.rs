// Saving the generated file to disk

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, SubmissionError};

/// Write a response body into `dir/filename`, returning the path actually used.
///
/// Data goes to a short hidden temp file in `dir` first and is moved into
/// place only after the last chunk is flushed, so an interrupted body never
/// leaves a truncated deck behind. The temp file is deleted on every error
/// path. An existing file is never overwritten: ` (1)`, ` (2)`, ... is
/// inserted before the extension instead.
pub async fn save_stream<S, E>(body: S, dir: &Path, filename: &str) -> Result<PathBuf>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Display,
{
    futures::pin_mut!(body);

    let partial = tempfile::Builder::new()
        .prefix(".presentify-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|source| save_error(dir, source))?;

    let handle = partial
        .as_file()
        .try_clone()
        .map_err(|source| save_error(partial.path(), source))?;
    let mut file = tokio::fs::File::from_std(handle);

    let mut written: u64 = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| SubmissionError::Body(e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|source| save_error(partial.path(), source))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|source| save_error(partial.path(), source))?;
    drop(file);

    let dest = persist_unique(partial, dir, filename)?;

    tracing::info!(path = %dest.display(), bytes = written, "Saved generated file");
    Ok(dest)
}

/// Save a successful response body
pub async fn save_response(
    response: reqwest::Response,
    dir: &Path,
    filename: &str,
) -> Result<PathBuf> {
    save_stream(response.bytes_stream(), dir, filename).await
}

/// Candidate paths for `filename` in `dir`: the name itself, then ` (1)`, ` (2)`, ...
pub fn destination_candidates(dir: &Path, filename: &str) -> impl Iterator<Item = PathBuf> {
    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string());
    let extension = name.extension().map(|e| e.to_string_lossy().to_string());

    let dir = dir.to_path_buf();
    let first = dir.join(filename);
    std::iter::once(first).chain((1u32..).map(move |n| match &extension {
        Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
        None => dir.join(format!("{} ({})", stem, n)),
    }))
}

/// Move the finished temp file to the first free candidate path.
///
/// `persist_noclobber` fails atomically when the target exists, so a file
/// created between two attempts is never overwritten.
fn persist_unique(mut partial: NamedTempFile, dir: &Path, filename: &str) -> Result<PathBuf> {
    for dest in destination_candidates(dir, filename) {
        match partial.persist_noclobber(&dest) {
            Ok(_) => return Ok(dest),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                partial = e.file;
            }
            Err(e) => return Err(save_error(&dest, e.error)),
        }
    }
    unreachable!("destination candidates are unbounded")
}

fn save_error(path: &Path, source: std::io::Error) -> SubmissionError {
    SubmissionError::Save {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(
        parts: Vec<std::result::Result<&'static str, &'static str>>,
    ) -> impl Stream<Item = std::result::Result<Bytes, &'static str>> {
        stream::iter(
            parts
                .into_iter()
                .map(|p| p.map(|s| Bytes::from_static(s.as_bytes()))),
        )
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_save_stream_writes_all_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let body = chunks(vec![Ok("PK\x03\x04"), Ok("slides"), Ok("")]);

        let path = save_stream(body, dir.path(), "report.pptx").await.unwrap();

        assert_eq!(path, dir.path().join("report.pptx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04slides");
        assert_eq!(entries(dir.path()), vec!["report.pptx"]);
    }

    #[tokio::test]
    async fn test_failed_body_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let body = chunks(vec![Ok("PK\x03\x04"), Err("connection reset")]);

        let err = save_stream(body, dir.path(), "report.pptx").await.unwrap_err();

        assert!(matches!(err, SubmissionError::Body(ref m) if m == "connection reset"));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_save_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let body = chunks(vec![Ok("data")]);

        let err = save_stream(body, &missing, "report.pptx").await.unwrap_err();
        assert!(matches!(err, SubmissionError::Save { .. }));
    }

    #[tokio::test]
    async fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.pptx"), b"old").unwrap();

        let path = save_stream(chunks(vec![Ok("new")]), dir.path(), "report.pptx")
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("report (1).pptx"));
        assert_eq!(std::fs::read(dir.path().join("report.pptx")).unwrap(), b"old");
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        assert_eq!(entries(dir.path()), vec!["report (1).pptx", "report.pptx"]);
    }

    #[tokio::test]
    async fn test_long_filename_is_saved() {
        // 251 bytes: valid on common filesystems, too long once decorated
        let filename = format!("{}.pptx", "a".repeat(246));
        assert_eq!(filename.len(), 251);
        let dir = tempfile::tempdir().unwrap();

        let path = save_stream(chunks(vec![Ok("deck")]), dir.path(), &filename)
            .await
            .unwrap();

        assert_eq!(path, dir.path().join(&filename));
        assert_eq!(std::fs::read(&path).unwrap(), b"deck");
        assert_eq!(entries(dir.path()), vec![filename]);
    }

    #[tokio::test]
    async fn test_concurrent_saves_with_same_name_keep_both() {
        let dir = tempfile::tempdir().unwrap();

        let (first, second) = tokio::join!(
            save_stream(chunks(vec![Ok("one")]), dir.path(), "deck.pptx"),
            save_stream(chunks(vec![Ok("two")]), dir.path(), "deck.pptx"),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_ne!(first, second);
        let mut contents = vec![
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap(),
        ];
        contents.sort();
        assert_eq!(contents, vec![b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(entries(dir.path()), vec!["deck (1).pptx", "deck.pptx"]);
    }

    #[test]
    fn test_destination_candidates_count_up() {
        let dir = Path::new("/out");
        let names: Vec<PathBuf> = destination_candidates(dir, "deck.pptx").take(3).collect();
        assert_eq!(
            names,
            vec![
                dir.join("deck.pptx"),
                dir.join("deck (1).pptx"),
                dir.join("deck (2).pptx"),
            ]
        );
    }

    #[test]
    fn test_destination_candidates_without_extension() {
        let dir = Path::new("/out");
        let names: Vec<PathBuf> = destination_candidates(dir, "output").take(2).collect();
        assert_eq!(names, vec![dir.join("output"), dir.join("output (1)")]);
    }
}
