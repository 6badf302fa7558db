use std::path::{Path, PathBuf};

use super::{EditorialError, FetchError};

/// Fetches an editorial page and returns its main text content.
pub trait ArticleSource {
    fn fetch_article_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Reads pre-extracted article text from local files. `url` is a path,
/// resolved against `root` when relative.
pub struct FileArticleSource {
    root: Option<PathBuf>,
}

impl FileArticleSource {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for FileArticleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleSource for FileArticleSource {
    fn fetch_article_text(&self, url: &str) -> Result<String, FetchError> {
        std::fs::read_to_string(self.resolve(url)).map_err(|source| FetchError::Io {
            url: url.to_string(),
            source,
        })
    }
}

/// Article texts gathered for one contest, in URL order, plus per-URL failures.
#[derive(Debug)]
pub struct CollectedArticles {
    pub texts: Vec<String>,
    pub failures: Vec<FetchError>,
}

impl CollectedArticles {
    pub fn combined(&self) -> String {
        combine_articles(&self.texts)
    }
}

/// Fetch every URL, keeping the ones that yield text.
///
/// Fails with `NotFound` for an empty URL list and `AllSourcesFailed` when no
/// URL produced text. Individual failures are logged and recorded.
pub fn collect_articles(
    source: &dyn ArticleSource,
    contest_id: &str,
    urls: &[String],
) -> Result<CollectedArticles, EditorialError> {
    if urls.is_empty() {
        return Err(EditorialError::NotFound {
            contest_id: contest_id.to_string(),
        });
    }

    let mut texts = Vec::with_capacity(urls.len());
    let mut failures = Vec::new();

    for url in urls {
        let fetched = source.fetch_article_text(url).and_then(|text| {
            let text = text.trim();
            if text.is_empty() {
                Err(FetchError::Empty { url: url.clone() })
            } else {
                Ok(text.to_string())
            }
        });

        match fetched {
            Ok(text) => {
                tracing::debug!(url = %url, chars = text.chars().count(), "Fetched editorial article");
                texts.push(text);
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to fetch editorial article");
                failures.push(e);
            }
        }
    }

    if texts.is_empty() {
        return Err(EditorialError::AllSourcesFailed {
            contest_id: contest_id.to_string(),
            failed_urls: failures.iter().map(|e| e.url().to_string()).collect(),
        });
    }

    Ok(CollectedArticles { texts, failures })
}

/// One article is returned as-is; several are labelled and separated by blank lines.
pub fn combine_articles(texts: &[String]) -> String {
    match texts {
        [single] => single.clone(),
        _ => texts
            .iter()
            .enumerate()
            .map(|(i, text)| format!("=== EDITORIAL SOURCE {} ===\n\n{}", i + 1, text))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory source; unknown URLs fail.
    struct MapSource(HashMap<String, String>);

    impl MapSource {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self(
                pages
                    .iter()
                    .map(|(u, t)| (u.to_string(), t.to_string()))
                    .collect(),
            )
        }
    }

    impl ArticleSource for MapSource {
        fn fetch_article_text(&self, url: &str) -> Result<String, FetchError> {
            self.0.get(url).cloned().ok_or_else(|| FetchError::Unavailable {
                url: url.to_string(),
                reason: "404".into(),
            })
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn single_article_is_returned_unchanged() {
        assert_eq!(combine_articles(&["only text".to_string()]), "only text");
    }

    #[test]
    fn several_articles_are_labelled() {
        let combined = combine_articles(&["first".to_string(), "second".to_string()]);
        assert_eq!(
            combined,
            "=== EDITORIAL SOURCE 1 ===\n\nfirst\n\n=== EDITORIAL SOURCE 2 ===\n\nsecond"
        );
    }

    #[test]
    fn empty_url_list_is_not_found() {
        let source = MapSource::new(&[]);
        let err = collect_articles(&source, "1900", &[]).unwrap_err();
        assert!(matches!(err, EditorialError::NotFound { .. }));
    }

    #[test]
    fn failing_url_is_skipped_when_another_succeeds() {
        let source = MapSource::new(&[("good", "  Editorial body  ")]);
        let collected = collect_articles(&source, "1900", &urls(&["bad", "good"])).unwrap();
        assert_eq!(collected.texts, vec!["Editorial body"]);
        assert_eq!(collected.failures.len(), 1);
        assert_eq!(collected.failures[0].url(), "bad");
        assert_eq!(collected.combined(), "Editorial body");
    }

    #[test]
    fn blank_article_counts_as_failure() {
        let source = MapSource::new(&[("blank", "  \n ")]);
        let err = collect_articles(&source, "1900", &urls(&["blank", "missing"])).unwrap_err();
        match err {
            EditorialError::AllSourcesFailed { failed_urls, .. } => {
                assert_eq!(failed_urls, vec!["blank", "missing"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn file_source_reads_relative_to_root() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("round.txt"), "Problem A text").unwrap();

        let source = FileArticleSource::with_root(tmp.path());
        assert_eq!(source.fetch_article_text("round.txt").unwrap(), "Problem A text");

        let absolute = tmp.path().join("round.txt");
        let text = FileArticleSource::new()
            .fetch_article_text(&absolute.to_string_lossy())
            .unwrap();
        assert_eq!(text, "Problem A text");
    }

    #[test]
    fn file_source_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = FileArticleSource::with_root(tmp.path())
            .fetch_article_text("missing.txt")
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        assert_eq!(err.url(), "missing.txt");
    }
}
