//! GitHub repository download.
//!
//! A repository URL is reduced to `owner/repo`, the default-branch zipball is
//! fetched from the REST API, and the archive is read like any other upload.
//! Members keep the `owner-repo-sha/` prefix GitHub puts on every path; the
//! asset resolver already tolerates one leading segment.

use std::time::Duration;

use htmlpack_shared::{FileSet, GithubConfig, HtmlpackError, Result};
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use crate::archive::read_zip;

/// Maximum number of redirects to follow; the zipball endpoint redirects to
/// codeload.
const MAX_REDIRECTS: usize = 5;

/// Largest archive we are willing to download (50 MB).
const MAX_ARCHIVE_SIZE: u64 = 50 * 1024 * 1024;

/// User-Agent string for API requests. GitHub rejects requests without one.
const USER_AGENT: &str = concat!("htmlpack/", env!("CARGO_PKG_VERSION"));

/// Hosts accepted as GitHub repository URLs.
const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

// ---------------------------------------------------------------------------
// Repository references
// ---------------------------------------------------------------------------

/// `owner/repo` pair parsed from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Whether `input` looks like a GitHub URL rather than a local path.
pub fn is_github_url(input: &str) -> bool {
    Url::parse(input)
        .ok()
        .and_then(|u| u.host_str().map(|h| GITHUB_HOSTS.contains(&h)))
        .unwrap_or(false)
}

/// Parse `https://github.com/owner/repo[.git][/...]` into its owner and repo.
///
/// Query strings, fragments, trailing slashes and a `.git` suffix are ignored.
/// Extra path segments (`/tree/main/docs`) are dropped.
pub fn parse_repo_url(input: &str) -> Result<RepoRef> {
    let url = Url::parse(input.trim())
        .map_err(|e| HtmlpackError::validation(format!("invalid repository URL {input}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(HtmlpackError::validation(format!(
            "unsupported URL scheme in {input}"
        )));
    }
    let host = url.host_str().unwrap_or_default();
    if !GITHUB_HOSTS.contains(&host) {
        return Err(HtmlpackError::validation(format!(
            "not a GitHub URL: {input}"
        )));
    }

    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty());
    let (Some(owner), Some(repo)) = (segments.next(), segments.next()) else {
        return Err(HtmlpackError::validation(format!(
            "repository URL must name an owner and a repository: {input}"
        )));
    };
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(HtmlpackError::validation(format!(
            "repository URL must name an owner and a repository: {input}"
        )));
    }

    Ok(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// Download the repository's default-branch archive and read its text files.
#[instrument(skip_all, fields(url = %input))]
pub async fn fetch_repo(input: &str, config: &GithubConfig) -> Result<FileSet> {
    let repo = parse_repo_url(input)?;
    let zipball = format!(
        "{}/repos/{}/{}/zipball",
        config.api_base.trim_end_matches('/'),
        repo.owner,
        repo.repo
    );

    info!(%repo, "downloading repository archive");

    let client = build_client(config)?;
    let bytes = download(&client, &zipball).await?;
    debug!(bytes = bytes.len(), "archive downloaded");

    let files = read_zip(&bytes)?;
    info!(%repo, files = files.len(), "repository archive extracted");
    Ok(files)
}

/// Build a reqwest client with appropriate settings.
fn build_client(config: &GithubConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| HtmlpackError::Network(format!("failed to build HTTP client: {e}")))
}

async fn download(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| HtmlpackError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HtmlpackError::input_unavailable(format!(
            "failed to download repository: HTTP {status}"
        )));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_ARCHIVE_SIZE {
            return Err(HtmlpackError::input_unavailable(format!(
                "repository archive too large ({len} bytes, max {MAX_ARCHIVE_SIZE})"
            )));
        }
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| HtmlpackError::Network(format!("{url}: failed to read body: {e}")))?;

    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip_bytes;

    fn config_for(server: &wiremock::MockServer) -> GithubConfig {
        GithubConfig {
            api_base: server.uri(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_parse_plain_url() {
        let r = parse_repo_url("https://github.com/octo/site").unwrap();
        assert_eq!(r.owner, "octo");
        assert_eq!(r.repo, "site");
        assert_eq!(r.to_string(), "octo/site");
    }

    #[test]
    fn test_parse_strips_suffixes() {
        for input in [
            "https://github.com/octo/site/",
            "https://github.com/octo/site.git",
            "https://github.com/octo/site?tab=readme",
            "https://github.com/octo/site#readme",
            "https://www.github.com/octo/site/tree/main/docs",
        ] {
            let r = parse_repo_url(input).unwrap();
            assert_eq!((r.owner.as_str(), r.repo.as_str()), ("octo", "site"), "{input}");
        }
    }

    #[test]
    fn test_parse_rejects_other_hosts_and_short_paths() {
        assert!(parse_repo_url("https://gitlab.com/octo/site").is_err());
        assert!(parse_repo_url("https://github.com/octo").is_err());
        assert!(parse_repo_url("ftp://github.com/octo/site").is_err());
        assert!(parse_repo_url("not a url").is_err());
    }

    #[test]
    fn test_is_github_url() {
        assert!(is_github_url("https://github.com/octo/site"));
        assert!(!is_github_url("./site.zip"));
        assert!(!is_github_url("https://example.com/octo/site"));
    }

    #[tokio::test]
    async fn test_fetch_repo_with_mock_server() {
        let server = wiremock::MockServer::start().await;
        let archive = zip_bytes(&[
            ("octo-site-abc123/", b""),
            ("octo-site-abc123/index.html", b"<title>Site</title><p>hi</p>"),
            ("octo-site-abc123/style.css", b"p{}"),
        ]);

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/repos/octo/site/zipball"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(archive))
            .mount(&server)
            .await;

        let files = fetch_repo("https://github.com/octo/site.git", &config_for(&server))
            .await
            .unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files.get("octo-site-abc123/style.css"), Some("p{}"));
    }

    #[tokio::test]
    async fn test_fetch_repo_not_found() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/repos/octo/missing/zipball"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_repo("https://github.com/octo/missing", &config_for(&server))
            .await
            .unwrap_err();
        assert!(matches!(err, HtmlpackError::InputUnavailable { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_repo_corrupt_archive() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/repos/octo/site/zipball"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&server)
            .await;

        let err = fetch_repo("https://github.com/octo/site", &config_for(&server))
            .await
            .unwrap_err();
        assert!(err.is_input_unavailable());
    }
}
