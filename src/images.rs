use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Where uploaded event images live. Local disk in production; tests plug in
/// an in-memory stand-in.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `body` under `filename` (already sanitized) and return the
    /// name it was actually stored under.
    async fn save(&self, filename: &str, body: Bytes) -> anyhow::Result<String>;
    async fn remove(&self, filename: &str) -> anyhow::Result<()>;
}

/// Stores images under a fixed directory, served back at /static/images.
#[derive(Clone)]
pub struct LocalImages {
    root: PathBuf,
}

impl LocalImages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageStore for LocalImages {
    async fn save(&self, filename: &str, body: Bytes) -> anyhow::Result<String> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create upload dir {}", self.root.display()))?;

        // Never overwrite: an existing name gains a short suffix instead.
        let mut stored = filename.to_string();
        if fs::try_exists(self.root.join(&stored)).await? {
            stored = dedupe_filename(filename);
            warn!(requested = %filename, stored = %stored, "image filename collision");
        }

        let target = self.root.join(&stored);
        fs::write(&target, &body)
            .await
            .with_context(|| format!("write image {}", target.display()))?;
        debug!(image = %stored, bytes = body.len(), "image stored");
        Ok(stored)
    }

    async fn remove(&self, filename: &str) -> anyhow::Result<()> {
        let target = self.root.join(filename);
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove image {}", target.display())),
        }
    }
}

/// Reduce an uploaded filename to a safe basename: path components are
/// stripped, whitespace becomes `_`, anything outside `[A-Za-z0-9._-]` is
/// dropped. Returns None when nothing usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '-') {
        None
    } else {
        Some(cleaned)
    }
}

fn dedupe_filename(filename: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{suffix}.{ext}"),
        _ => format!("{filename}-{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename("C:\\photos\\party.jpg").as_deref(),
            Some("party.jpg")
        );
    }

    #[test]
    fn sanitize_replaces_whitespace_and_drops_punctuation() {
        assert_eq!(
            sanitize_filename("my cool event!.png").as_deref(),
            Some("my_cool_event.png")
        );
        assert_eq!(
            sanitize_filename("caf\u{e9} menu.jpg").as_deref(),
            Some("caf_menu.jpg")
        );
    }

    #[test]
    fn sanitize_rejects_empty_results() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename("///"), None);
        assert_eq!(sanitize_filename("日本語"), None);
    }

    #[test]
    fn dedupe_keeps_extension() {
        let name = dedupe_filename("party.jpg");
        assert!(name.starts_with("party-"));
        assert!(name.ends_with(".jpg"));
        assert_ne!(name, "party.jpg");
    }

    #[tokio::test]
    async fn save_and_collision_suffix() {
        let root = std::env::temp_dir().join(format!("event-portal-test-{}", Uuid::new_v4()));
        let store = LocalImages::new(&root);

        let first = store
            .save("banner.png", Bytes::from_static(b"one"))
            .await
            .expect("first save");
        assert_eq!(first, "banner.png");

        let second = store
            .save("banner.png", Bytes::from_static(b"two"))
            .await
            .expect("second save");
        assert_ne!(second, "banner.png");
        assert!(second.ends_with(".png"));

        // first upload untouched
        let body = fs::read(root.join("banner.png")).await.expect("read first");
        assert_eq!(body, b"one");

        store.remove(&first).await.expect("remove first");
        store.remove(&second).await.expect("remove second");
        store.remove("never-existed.png").await.expect("remove missing is ok");
        fs::remove_dir_all(&root).await.ok();
    }
}
