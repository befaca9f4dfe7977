use base64::Engine;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed {resource} response: {source}")]
    Malformed {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not decode file content: {0}")]
    DecodeError(String),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Thin REST client for one GitHub host.
///
/// Every call is a single GET, single page, no retry. Callers decide what a
/// failure means for them.
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise, or for pointing tests somewhere harmless
    pub fn with_base_url(token: Option<String>, base_url: String) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("repolens/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(GITHUB_ACCEPT),
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One page of commits, newest first
    pub async fn list_commits(&self, owner: &str, repo: &str) -> Result<Vec<GitHubCommit>> {
        let url = self.repo_url(owner, repo, "commits");
        self.get_list("commits", &url, &[]).await
    }

    /// Commit with its per-file change list
    pub async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<GitHubCommitDetail> {
        let url = self.repo_url(owner, repo, &format!("commits/{}", urlencoding::encode(sha)));
        self.get_json("commit", &url, &[]).await
    }

    pub async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<GitHubBranch>> {
        let url = self.repo_url(owner, repo, "branches");
        self.get_list("branches", &url, &[]).await
    }

    pub async fn list_issues(&self, owner: &str, repo: &str) -> Result<Vec<GitHubIssue>> {
        let url = self.repo_url(owner, repo, "issues");
        self.get_list("issues", &url, &[]).await
    }

    pub async fn list_pulls(&self, owner: &str, repo: &str) -> Result<Vec<GitHubPull>> {
        let url = self.repo_url(owner, repo, "pulls");
        self.get_list("pulls", &url, &[]).await
    }

    pub async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<GitHubContributor>> {
        let url = self.repo_url(owner, repo, "contributors");
        self.get_list("contributors", &url, &[]).await
    }

    /// File contents at a given ref. `Ok(None)` when the path does not exist there.
    pub async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Option<GitHubContent>> {
        let url = self.repo_url(owner, repo, &format!("contents/{}", encode_path(path)));

        match self.get_json("contents", &url, &[("ref", reference)]).await {
            Ok(content) => Ok(Some(content)),
            Err(GitHubError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn repo_url(&self, owner: &str, repo: &str, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            tail
        )
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let body = self.get_body(resource, url, query).await?;

        // Contributors answers 204 with an empty body for empty repositories
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        decode(resource, &body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.get_body(resource, url, query).await?;
        decode(resource, &body)
    }

    async fn get_body(&self, resource: &str, url: &str, query: &[(&str, &str)]) -> Result<String> {
        debug!("GET {} ({})", url, resource);

        let mut request = self.client.get(url).query(query);

        if let Some(ref token) = self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(url.to_string()));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GitHubError::AuthRequired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        Ok(response.text().await?)
    }
}

fn decode<T: DeserializeOwned>(resource: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| GitHubError::Malformed {
        resource: resource.to_string(),
        source,
    })
}

/// Encode each path segment but keep the separators
fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    pub commit: GitHubCommitData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommitData {
    pub message: String,
    pub author: Option<GitHubSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSignature {
    pub name: String,
    pub date: Option<DateTime<Utc>>,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommitDetail {
    pub sha: String,
    pub commit: GitHubCommitData,
    #[serde(default)]
    pub files: Vec<GitHubFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubFile {
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    /// Missing for binary files and very large diffs
    #[serde(default)]
    pub patch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubBranch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    pub user: GitHubUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubPull {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub user: GitHubUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubContributor {
    pub login: String,
    pub contributions: u32,
}

/// `GET /repos/{owner}/{repo}/contents/{path}` for a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubContent {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl GitHubContent {
    /// Raw bytes of the file. GitHub wraps base64 payloads every 60 columns.
    ///
    /// Files over 1 MB come back with encoding `none` and no payload; that is
    /// an error rather than an empty file.
    pub fn decoded(&self) -> Result<Vec<u8>> {
        let content = self.content.as_deref().unwrap_or_default();

        match self.encoding.as_deref() {
            Some("none") => Err(GitHubError::DecodeError(format!(
                "{} is too large for the contents API ({} bytes)",
                self.path, self.size
            ))),
            Some("base64") => {
                let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact.as_bytes())
                    .map_err(|e| GitHubError::DecodeError(e.to_string()))
            }
            _ => Ok(content.as_bytes().to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new(Some("ghp_test".to_string())).unwrap();
        assert_eq!(client.base_url(), GITHUB_API_BASE);
        assert_eq!(client.token.as_deref(), Some("ghp_test"));
    }

    #[test]
    fn test_base_url_trailing_slash_dropped() {
        let client = GitHubClient::with_base_url(None, "https://ghe.example.com/api/v3/".into()).unwrap();
        assert_eq!(
            client.repo_url("acme", "widgets", "commits"),
            "https://ghe.example.com/api/v3/repos/acme/widgets/commits"
        );
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("src/main.rs"), "src/main.rs");
        assert_eq!(encode_path("/docs/read me.md"), "docs/read%20me.md");
    }

    #[test]
    fn test_decode_commit_detail() {
        let body = r#"{
            "sha": "abc123",
            "commit": {
                "message": "Fix parser",
                "author": { "name": "Ada", "email": "ada@example.com", "date": "2024-03-01T12:00:00Z" }
            },
            "files": [
                { "filename": "src/lib.rs", "status": "modified", "additions": 2, "deletions": 1, "patch": "@@ -1 +1 @@\n-a\n+b" },
                { "filename": "logo.png", "status": "added" }
            ]
        }"#;

        let detail: GitHubCommitDetail = decode("commit", body).unwrap();
        assert_eq!(detail.sha, "abc123");
        assert_eq!(detail.files.len(), 2);
        assert!(detail.files[0].patch.is_some());
        assert!(detail.files[1].patch.is_none());
        assert_eq!(detail.commit.author.unwrap().name, "Ada");
    }

    #[test]
    fn test_decode_reports_malformed_resource() {
        let err = decode::<Vec<GitHubIssue>>("issues", r#"[{"title": "no state"}]"#).unwrap_err();
        match err {
            GitHubError::Malformed { resource, .. } => assert_eq!(resource, "issues"),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_base64_content_decoding() {
        let content = GitHubContent {
            path: "hello.txt".into(),
            sha: "f00".into(),
            size: 12,
            content: Some("aGVsbG8g\nd29ybGQK\n".into()),
            encoding: Some("base64".into()),
        };
        assert_eq!(content.decoded().unwrap(), b"hello world\n");
    }

    #[test]
    fn test_bad_base64_is_decode_error() {
        let content = GitHubContent {
            path: "x".into(),
            sha: "f00".into(),
            size: 1,
            content: Some("!!!not base64!!!".into()),
            encoding: Some("base64".into()),
        };
        assert!(matches!(content.decoded(), Err(GitHubError::DecodeError(_))));
    }

    #[test]
    fn test_oversized_content_is_decode_error() {
        let content: GitHubContent = serde_json::from_str(
            r#"{"path": "data/dump.sql", "sha": "f00", "size": 2097152, "content": "", "encoding": "none"}"#,
        )
        .unwrap();
        match content.decoded() {
            Err(GitHubError::DecodeError(msg)) => assert!(msg.contains("data/dump.sql")),
            other => panic!("expected DecodeError, got {:?}", other),
        }
    }

    /// Answers every connection with the status of the first route whose
    /// fragment appears in the request path, and forwards the request head.
    async fn spawn_canned_server(
        routes: Vec<(&'static str, &'static str)>,
    ) -> (String, tokio::sync::mpsc::UnboundedReceiver<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&head).into_owned();
                let path = head.split_whitespace().nth(1).unwrap_or_default();

                let status = routes
                    .iter()
                    .find(|(fragment, _)| path.contains(fragment))
                    .map(|(_, status)| *status)
                    .unwrap_or("500 Internal Server Error");
                let length = if status.starts_with("204") { "" } else { "Content-Length: 0\r\n" };
                let response = format!("HTTP/1.1 {}\r\n{}Connection: close\r\n\r\n", status, length);

                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
                let _ = tx.send(head);
            }
        });

        (format!("http://{}", addr), rx)
    }

    #[tokio::test]
    async fn test_status_codes_and_request_headers() {
        let (base_url, mut requests) = spawn_canned_server(vec![
            ("/contents/", "404 Not Found"),
            ("/contributors", "204 No Content"),
            ("/branches", "401 Unauthorized"),
            ("/commits", "404 Not Found"),
        ])
        .await;
        let client = GitHubClient::with_base_url(Some("tok123".into()), base_url.clone()).unwrap();

        let content = client.get_contents("acme", "w", "src/a b.rs", "abc").await;
        assert!(matches!(content, Ok(None)));

        let contributors = client.list_contributors("acme", "w").await.unwrap();
        assert!(contributors.is_empty());

        let branches = client.list_branches("acme", "w").await;
        assert!(matches!(branches, Err(GitHubError::AuthRequired)));

        // 404 means "absent" only for contents
        let commits = client.list_commits("acme", "w").await;
        assert!(matches!(commits, Err(GitHubError::NotFound(_))));

        let mut heads = Vec::new();
        for _ in 0..4 {
            heads.push(requests.recv().await.unwrap().to_lowercase());
        }
        assert!(heads[0].starts_with("get /repos/acme/w/contents/src/a%20b.rs?ref=abc "));
        for head in &heads {
            assert!(head.contains("\r\nauthorization: token tok123\r\n"), "{}", head);
            assert!(head.contains("\r\naccept: application/vnd.github.v3+json\r\n"), "{}", head);
        }

        let anonymous = GitHubClient::with_base_url(None, base_url).unwrap();
        assert!(anonymous.list_contributors("acme", "w").await.unwrap().is_empty());
        let head = requests.recv().await.unwrap().to_lowercase();
        assert!(!head.contains("authorization:"));
        assert!(head.contains("\r\naccept: application/vnd.github.v3+json\r\n"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = GitHubClient::with_base_url(None, "http://127.0.0.1:1".into()).unwrap();
        let result = client.list_commits("acme", "widgets").await;
        assert!(matches!(result, Err(GitHubError::NetworkError(_))));
    }
}
