pub mod cache;
pub mod client;

pub use cache::{get_cache_path, read_cached_checklist, write_cached_checklist, CachedChecklist};
pub use client::{
    create_client, get_token_from_env, is_unreachable, RemoteClient, RemoteUnreachable,
    ENV_TOKEN_VAR,
};

#[cfg(test)]
mod test_server;

use anyhow::Result;
use std::path::Path;
use tracing::warn;

use crate::checklist::ChecklistDefinition;

/// Fetch a checklist, refreshing the on-disk copy.
///
/// If the remote cannot be reached the last cached copy is used instead.
/// Any answer from the remote, including an error status or an invalid
/// definition, is returned as is.
pub async fn fetch_checklist_cached(
    client: &RemoteClient,
    cache_path: &Path,
    checklist_id: &str,
) -> Result<ChecklistDefinition> {
    match client.fetch_checklist(checklist_id).await {
        Ok(definition) => {
            if let Err(e) = write_cached_checklist(cache_path, &definition) {
                warn!(checklist_id, error = %e, "failed to cache checklist");
            }
            Ok(definition)
        }
        Err(e) if !is_unreachable(&e) => Err(e),
        Err(e) => match read_cached_checklist(cache_path, checklist_id) {
            Some(cached) => {
                warn!(
                    checklist_id,
                    error = %e,
                    fetched_at = %cached.fetched_at,
                    "remote unavailable, using cached checklist"
                );
                Ok(cached.definition)
            }
            None => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::parse_checklist;
    use crate::config::RemoteConfig;
    use super::test_server::serve;

    const OPENING: &str =
        r#"{"id": "opening", "name": "Opening", "items": [{"id": "a", "type": "yes_no"}]}"#;

    fn client_for(base_url: &str) -> RemoteClient {
        create_client(
            &RemoteConfig {
                base_url: base_url.to_string(),
                timeout: Some("1s".to_string()),
                retries: Some(1),
            },
            None,
        )
        .unwrap()
    }

    fn offline_client() -> RemoteClient {
        client_for("http://127.0.0.1:9")
    }

    fn cache_opening(dir: &Path) -> ChecklistDefinition {
        let definition = parse_checklist(OPENING).unwrap();
        write_cached_checklist(dir, &definition).unwrap();
        definition
    }

    #[tokio::test]
    async fn test_falls_back_to_cache_when_offline() {
        let dir = tempfile::tempdir().unwrap();
        let definition = cache_opening(dir.path());

        let fetched = fetch_checklist_cached(&offline_client(), dir.path(), "opening")
            .await
            .unwrap();
        assert_eq!(fetched, definition);
    }

    #[tokio::test]
    async fn test_offline_without_cache_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = fetch_checklist_cached(&offline_client(), dir.path(), "opening").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_not_found_ignores_cache() {
        let dir = tempfile::tempdir().unwrap();
        cache_opening(dir.path());
        let (base, _server) = serve(vec![(404, String::new())]).await;

        let err = fetch_checklist_cached(&client_for(&base), dir.path(), "opening")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP 404"), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_invalid_definition_ignores_cache() {
        let dir = tempfile::tempdir().unwrap();
        cache_opening(dir.path());
        let empty = r#"{"id": "opening", "name": "Opening", "items": []}"#.to_string();
        let (base, _server) = serve(vec![(200, empty)]).await;

        let err = fetch_checklist_cached(&client_for(&base), dir.path(), "opening")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is invalid"), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_successful_fetch_refreshes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (base, _server) = serve(vec![(200, OPENING.to_string())]).await;

        let fetched = fetch_checklist_cached(&client_for(&base), dir.path(), "opening")
            .await
            .unwrap();
        let cached = read_cached_checklist(dir.path(), "opening").unwrap();
        assert_eq!(cached.definition, fetched);
    }
}
