//! Implements the ReleaseSource trait for GitHub
use async_trait::async_trait;
use base64::{Engine, prelude::BASE64_STANDARD};
use log::*;
use reqwest::{
    Client, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::env;

use crate::{
    config::UpstreamConfig,
    error::{ReleasewatchError, Result},
    upstream::{
        traits::ReleaseSource,
        types::{ReadmeResponse, Release, RepoComparison},
    },
};

/// GitHub release source using reqwest against the REST API.
pub struct GithubReleases {
    client: Client,
    base_url: Url,
    compare_base: String,
}

impl GithubReleases {
    /// Create a client for the configured repository, reading an optional
    /// token from the configured environment variable.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let token = env::var(&config.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        Self::with_token(config, token)
    }

    pub fn with_token(
        config: &UpstreamConfig,
        token: Option<SecretString>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.append(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.append(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(
                format!("Bearer {}", token.expose_secret()).as_str(),
            )?;
            value.set_sensitive(true);
            headers.append(AUTHORIZATION, value);
        }

        let client = Client::builder().default_headers(headers).build()?;

        let base_url = Url::parse(&format!(
            "{}/repos/{}/{}/",
            config.api_base.trim_end_matches('/'),
            config.owner,
            config.repo
        ))?;

        Ok(Self {
            client,
            base_url,
            compare_base: config.compare_base.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path)?;
        debug!("GET {}", url);
        let request = self.client.get(url).build()?;
        let response = self.client.execute(request).await?;
        let result = response.error_for_status()?;
        let body = result.json::<T>().await?;
        Ok(body)
    }

    async fn get_readme(&self) -> Result<String> {
        let readme: ReadmeResponse = self.get_json("readme").await?;

        if !readme.encoding.is_empty() && readme.encoding != "base64" {
            return Err(ReleasewatchError::NetworkError(format!(
                "unsupported readme encoding: {}",
                readme.encoding
            )));
        }

        let compact = readme
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>();

        let bytes = BASE64_STANDARD.decode(compact)?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[async_trait]
impl ReleaseSource for GithubReleases {
    async fn fetch_latest_release(&self) -> Option<Release> {
        match self.get_json::<Release>("releases/latest").await {
            Ok(release) => Some(release),
            Err(e) => {
                error!("failed to fetch latest release: {}", e);
                None
            }
        }
    }

    async fn fetch_all_releases(&self) -> Vec<Release> {
        match self.get_json::<Vec<Release>>("releases").await {
            Ok(releases) => releases,
            Err(e) => {
                error!("failed to fetch releases: {}", e);
                vec![]
            }
        }
    }

    async fn fetch_repo_changes(&self, tag: &str) -> Option<RepoComparison> {
        let path = format!("compare/{}...{}", self.compare_base, tag);
        match self.get_json::<RepoComparison>(&path).await {
            Ok(comparison) => Some(comparison),
            Err(e) => {
                error!("failed to fetch changes for {}: {}", tag, e);
                None
            }
        }
    }

    async fn fetch_readme_content(&self) -> Option<String> {
        match self.get_readme().await {
            Ok(content) => Some(content),
            Err(e) => {
                error!("failed to fetch README: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    use super::*;

    fn config_for(server: &MockServer) -> UpstreamConfig {
        UpstreamConfig {
            api_base: server.uri(),
            token_env: "RELEASEWATCH_TEST_TOKEN_NOT_SET".into(),
            ..UpstreamConfig::default()
        }
    }

    fn release_json(tag: &str) -> serde_json::Value {
        json!({
            "id": 42,
            "tag_name": tag,
            "name": format!("Release {tag}"),
            "published_at": "2025-06-09T18:00:00Z",
            "body": "- Added `container volume`",
            "prerelease": false,
            "draft": false,
            "html_url": format!("https://github.com/apple/container/releases/tag/{tag}"),
            "assets": []
        })
    }

    #[test_log::test(tokio::test)]
    async fn fetches_latest_release() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/apple/container/releases/latest"))
            .and(header("accept", "application/vnd.github+json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(release_json("0.3.0")),
            )
            .mount(&server)
            .await;

        let source = GithubReleases::new(&config_for(&server)).unwrap();
        let release = source.fetch_latest_release().await.unwrap();

        assert_eq!(release.id, 42);
        assert_eq!(release.tag_name, "0.3.0");
        assert_eq!(release.name.as_deref(), Some("Release 0.3.0"));
        assert!(release.published_at.is_some());
        assert!(!release.prerelease);
    }

    #[test_log::test(tokio::test)]
    async fn latest_release_is_none_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/apple/container/releases/latest"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = GithubReleases::new(&config_for(&server)).unwrap();
        assert!(source.fetch_latest_release().await.is_none());
    }

    #[test_log::test(tokio::test)]
    async fn latest_release_is_none_on_network_failure() {
        let config = UpstreamConfig {
            api_base: "http://127.0.0.1:9".into(),
            token_env: "RELEASEWATCH_TEST_TOKEN_NOT_SET".into(),
            ..UpstreamConfig::default()
        };
        let source = GithubReleases::new(&config).unwrap();
        assert!(source.fetch_latest_release().await.is_none());
    }

    #[test_log::test(tokio::test)]
    async fn fetches_all_releases_or_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/apple/container/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                release_json("0.3.0"),
                release_json("0.2.0")
            ])))
            .mount(&server)
            .await;

        let source = GithubReleases::new(&config_for(&server)).unwrap();
        let releases = source.fetch_all_releases().await;
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[1].tag_name, "0.2.0");

        let empty_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/apple/container/releases"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&empty_server)
            .await;

        let source = GithubReleases::new(&config_for(&empty_server)).unwrap();
        assert!(source.fetch_all_releases().await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn fetches_comparison_against_base() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/apple/container/compare/main...0.3.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ahead",
                "ahead_by": 2,
                "behind_by": 0,
                "total_commits": 2,
                "html_url": "https://github.com/apple/container/compare/main...0.3.0",
                "commits": [
                    { "sha": "abc", "commit": { "message": "feat: volumes" } }
                ],
                "files": [
                    { "filename": "Sources/Volume.swift", "status": "added" }
                ]
            })))
            .mount(&server)
            .await;

        let source = GithubReleases::new(&config_for(&server)).unwrap();
        let changes = source.fetch_repo_changes("0.3.0").await.unwrap();

        assert_eq!(changes.ahead_by, 2);
        assert_eq!(changes.commits[0].commit.message, "feat: volumes");
        assert_eq!(changes.files[0].filename, "Sources/Volume.swift");
    }

    #[test_log::test(tokio::test)]
    async fn decodes_readme_content() {
        let server = MockServer::start().await;
        let encoded = BASE64_STANDARD.encode("# container\n\nTool for Linux containers.\n");
        // GitHub wraps the base64 payload at 60 columns
        let wrapped = format!("{}\n{}", &encoded[..20], &encoded[20..]);

        Mock::given(method("GET"))
            .and(path("/repos/apple/container/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": wrapped,
                "encoding": "base64"
            })))
            .mount(&server)
            .await;

        let source = GithubReleases::new(&config_for(&server)).unwrap();
        let readme = source.fetch_readme_content().await.unwrap();
        assert!(readme.starts_with("# container"));
    }

    #[test_log::test(tokio::test)]
    async fn sends_bearer_token_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/apple/container/releases/latest"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(release_json("0.4.0")),
            )
            .mount(&server)
            .await;

        let source = GithubReleases::with_token(
            &config_for(&server),
            Some(SecretString::from("secret-token".to_string())),
        )
        .unwrap();

        let release = source.fetch_latest_release().await.unwrap();
        assert_eq!(release.tag_name, "0.4.0");
    }
}
