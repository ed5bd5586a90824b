//! End-to-end `bundle` pipeline: source → file set → bundle → size check.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use htmlpack_bundler::{Analysis, ProjectType};
use htmlpack_shared::{BundleOptions, FileSet, GithubConfig, HtmlpackError, Result};

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where the project comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A `.zip` upload.
    Archive(PathBuf),
    /// A local project directory.
    Directory(PathBuf),
    /// A single `.html`/`.htm` document.
    Html(PathBuf),
    /// A saved `.mhtml`/`.mht` page.
    Mhtml(PathBuf),
    /// A GitHub repository URL.
    GitHub(String),
}

impl Source {
    /// Classify a command-line argument.
    ///
    /// GitHub URLs are recognized first, then directories, then files by
    /// extension. Anything else is rejected.
    pub fn detect(input: &str) -> Result<Self> {
        if htmlpack_sources::is_github_url(input) {
            return Ok(Self::GitHub(input.to_string()));
        }
        if input.contains("://") {
            return Err(HtmlpackError::validation(format!(
                "only GitHub repository URLs are supported: {input}"
            )));
        }

        let path = PathBuf::from(input);
        if path.is_dir() {
            return Ok(Self::Directory(path));
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "zip" => Ok(Self::Archive(path)),
            "html" | "htm" => Ok(Self::Html(path)),
            "mhtml" | "mht" => Ok(Self::Mhtml(path)),
            _ => Err(HtmlpackError::validation(format!(
                "unsupported input {input}: expected a .zip, .html, .htm, .mhtml or .mht file, a directory, or a GitHub URL"
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Archive(_) => "archive",
            Self::Directory(_) => "directory",
            Self::Html(_) => "html",
            Self::Mhtml(_) => "mhtml",
            Self::GitHub(_) => "github",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive(p) | Self::Directory(p) | Self::Html(p) | Self::Mhtml(p) => {
                write!(f, "{}", p.display())
            }
            Self::GitHub(url) => f.write_str(url),
        }
    }
}

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Configuration for the `build` pipeline.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub bundle: BundleOptions,
    pub github: GithubConfig,
}

/// How the output document was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMethod {
    /// Bundled around an HTML entry document.
    Entry,
    /// No HTML in the project; a placeholder document was synthesized.
    Synthetic,
    /// A single HTML document, minified.
    RawHtml,
    /// HTML extracted from an MHTML archive, minified.
    Mhtml,
}

impl fmt::Display for BuildMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Entry => "entry",
            Self::Synthetic => "synthetic",
            Self::RawHtml => "html",
            Self::Mhtml => "mhtml",
        })
    }
}

/// Result of the `build` pipeline.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// The finished single-file document.
    pub html: String,
    /// Entry document path, when there was one.
    pub entry: Option<String>,
    pub method: BuildMethod,
    pub project_type: ProjectType,
    /// Size in KB (bytes / 1024).
    pub size_kb: f64,
    /// SHA-256 hex digest of `html`.
    pub sha256: String,
    /// Locators that did not resolve to a file and were left as links.
    pub unresolved: Vec<String>,
    /// Files appended because nothing in the entry referenced them.
    pub appended: Vec<String>,
    /// Whether the size is above the configured warning threshold.
    pub near_limit: bool,
    pub elapsed: std::time::Duration,
}

/// What a source contains and how it would be bundled.
#[derive(Debug, Clone)]
pub struct Inspection {
    /// `(path, bytes)` for every collected file, in collection order.
    pub files: Vec<(String, usize)>,
    pub analysis: Analysis,
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &BuildResult) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full `bundle` pipeline.
///
/// 1. Collect the source into a file set (or read the raw document)
/// 2. Bundle, or minify a raw HTML/MHTML document
/// 3. Measure, hash, and enforce the size ceiling
#[instrument(skip_all, fields(source = %source, kind = source.kind()))]
pub async fn build(
    source: &Source,
    opts: &BuildOptions,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    info!("starting bundle pipeline");

    // --- Phase 1: Collect ---
    progress.phase(collect_phase(source));
    let files = collect(source, &opts.github).await?;
    if files.is_empty() {
        return Err(HtmlpackError::EmptyInput);
    }

    // --- Phase 2: Bundle ---
    let (html, entry, method, project_type, unresolved, appended) = match source {
        Source::Html(_) | Source::Mhtml(_) => {
            progress.phase("Minifying document");
            let Some(doc) = files.iter().next() else {
                return Err(HtmlpackError::EmptyInput);
            };
            let (html, method) = if matches!(source, Source::Mhtml(_)) {
                (htmlpack_bundler::process_mhtml(&doc.content)?, BuildMethod::Mhtml)
            } else {
                (htmlpack_bundler::process_html(&doc.content), BuildMethod::RawHtml)
            };
            (html, Some(doc.path.clone()), method, ProjectType::Static, vec![], vec![])
        }
        _ => {
            progress.phase("Bundling project");
            let bundle = htmlpack_bundler::bundle(&files, &opts.bundle)?;
            let method = if bundle.is_synthetic() {
                BuildMethod::Synthetic
            } else {
                BuildMethod::Entry
            };
            let unresolved = bundle
                .unresolved()
                .map(|a| a.reference.locator.clone())
                .collect();
            (bundle.html, bundle.entry, method, bundle.project_type, unresolved, bundle.appended)
        }
    };

    // --- Phase 3: Size check ---
    progress.phase("Checking size");
    let size = htmlpack_bundler::check_size(&html, opts.bundle.max_size_kb)?;
    let near_limit = size.exceeds(opts.bundle.warn_size_kb);
    if near_limit {
        warn!(
            size_kb = %format!("{:.2}", size.kb()),
            limit_kb = opts.bundle.max_size_kb,
            "bundle is approaching the size limit"
        );
    }

    let result = BuildResult {
        sha256: digest(&html),
        size_kb: size.kb(),
        html,
        entry,
        method,
        project_type,
        unresolved,
        appended,
        near_limit,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        method = %result.method,
        size_kb = %format!("{:.2}", result.size_kb),
        sha256 = %result.sha256,
        elapsed_ms = result.elapsed.as_millis(),
        "bundle pipeline complete"
    );

    Ok(result)
}

/// Collect a source and describe how it would be bundled, without bundling.
#[instrument(skip_all, fields(source = %source))]
pub async fn inspect(source: &Source, opts: &BuildOptions) -> Result<Inspection> {
    let files = collect(source, &opts.github).await?;
    let listing = files
        .iter()
        .map(|e| (e.path.clone(), e.content.len()))
        .collect();

    Ok(Inspection {
        files: listing,
        analysis: htmlpack_bundler::analyze(&files),
    })
}

fn collect_phase(source: &Source) -> &'static str {
    match source {
        Source::GitHub(_) => "Downloading repository",
        Source::Archive(_) => "Extracting archive",
        Source::Directory(_) => "Reading directory",
        Source::Html(_) | Source::Mhtml(_) => "Reading document",
    }
}

/// Reduce any source to a file set. Filesystem and archive work runs on the
/// blocking pool.
async fn collect(source: &Source, github: &GithubConfig) -> Result<FileSet> {
    match source {
        Source::GitHub(url) => htmlpack_sources::fetch_repo(url, github).await,
        Source::Archive(path) => blocking(path, htmlpack_sources::read_zip_file).await,
        Source::Directory(path) => blocking(path, htmlpack_sources::read_dir).await,
        Source::Html(path) | Source::Mhtml(path) => {
            blocking(path, htmlpack_sources::read_file).await
        }
    }
}

async fn blocking(path: &Path, read: fn(&Path) -> Result<FileSet>) -> Result<FileSet> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read(&path))
        .await
        .map_err(|e| HtmlpackError::input_unavailable(format!("reader task failed: {e}")))?
}

/// Lowercase hex SHA-256 of the bundle.
pub fn digest(html: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(html.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
    }

    fn source_for(path: &Path) -> Source {
        Source::detect(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_detect_source_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_str().unwrap();
        assert!(matches!(Source::detect(d).unwrap(), Source::Directory(_)));
        assert!(matches!(Source::detect("site.ZIP").unwrap(), Source::Archive(_)));
        assert!(matches!(Source::detect("page.htm").unwrap(), Source::Html(_)));
        assert!(matches!(Source::detect("page.mht").unwrap(), Source::Mhtml(_)));
        assert!(matches!(
            Source::detect("https://github.com/octo/site").unwrap(),
            Source::GitHub(_)
        ));
    }

    #[test]
    fn test_detect_rejects_unknown_inputs() {
        for input in ["notes.txt", "archive.tar.gz", "https://example.com/site.zip"] {
            let err = Source::detect(input).unwrap_err();
            assert!(matches!(err, HtmlpackError::Validation { .. }), "{input}");
        }
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        assert_eq!(
            digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_build_static_site_directory() {
        let source = source_for(&fixtures().join("projects/static-site"));
        let result = build(&source, &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.method, BuildMethod::Entry);
        assert_eq!(result.entry.as_deref(), Some("index.html"));
        assert_eq!(result.project_type, ProjectType::Static);
        assert_eq!(result.unresolved, ["fonts/missing.css"]);
        assert_eq!(result.appended, ["css/print.css", "js/extra.js"]);
        assert!(result.html.contains("<title>Static Demo</title>"));
        assert!(result.html.contains("--accent: #3366ff;"));
        assert!(!result.html.contains("left-pad"));
        assert!(!result.html.contains('"'));
        assert_eq!(result.sha256, digest(&result.html));
        assert!(result.size_kb > 0.0 && !result.near_limit);
    }

    #[tokio::test]
    async fn test_build_is_deterministic() {
        let source = source_for(&fixtures().join("projects/static-site"));
        let opts = BuildOptions::default();
        let a = build(&source, &opts, &SilentProgress).await.unwrap();
        let b = build(&source, &opts, &SilentProgress).await.unwrap();
        assert_eq!(a.html, b.html);
        assert_eq!(a.sha256, b.sha256);
    }

    #[tokio::test]
    async fn test_build_zip_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.zip");
        {
            let file = std::fs::File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let stored = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file("site/app.js", stored).unwrap();
            zip.write_all(b"console.log(1)").unwrap();
            zip.start_file("site/main.css", stored).unwrap();
            zip.write_all(b"h1{color:red}").unwrap();
            zip.finish().unwrap();
        }

        let result = build(&source_for(&path), &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(result.method, BuildMethod::Synthetic);
        assert!(result.entry.is_none());
        assert!(result.html.contains("<h1>Deployed Project</h1>"));
        assert!(result.html.contains("h1{color:red}"));
        assert!(result.html.contains("console.log(1)"));
    }

    #[tokio::test]
    async fn test_build_mhtml() {
        let source = source_for(&fixtures().join("mhtml/saved-page.mhtml"));
        let result = build(&source, &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(result.method, BuildMethod::Mhtml);
        assert!(result.html.starts_with("<html lang='en'>"));
        assert!(result.html.ends_with("</html>"));
        assert!(result.html.contains("<p class='lead'>"));
        assert!(!result.html.contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_build_mhtml_without_html_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mhtml");
        std::fs::write(&path, "MIME-Version: 1.0\r\n\r\nno markup here").unwrap();

        let err = build(&source_for(&path), &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, HtmlpackError::MalformedMhtml));
    }

    #[tokio::test]
    async fn test_build_raw_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html>\n<!-- c -->\n<body class=\"a\">\n  <p>x  y</p>\n</body>\n</html>")
            .unwrap();

        let result = build(&source_for(&path), &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap();
        assert_eq!(result.method, BuildMethod::RawHtml);
        assert_eq!(result.entry.as_deref(), Some("page.html"));
        assert_eq!(result.html, "<html><body class='a'><p>x y</p></body></html>");
    }

    #[tokio::test]
    async fn test_build_rejects_oversized_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.html");
        let filler = "x".repeat(105 * 1024);
        std::fs::write(&path, format!("<p>{filler}</p>")).unwrap();

        let err = build(&source_for(&path), &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap_err();
        match err {
            HtmlpackError::SizeExceeded { size_kb, limit_kb } => {
                assert_eq!(limit_kb, 100);
                assert!(size_kb > 105.0);
            }
            other => panic!("expected SizeExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_build_flags_size_near_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.html");
        std::fs::write(&path, "y".repeat(95 * 1024)).unwrap();

        let result = build(&source_for(&path), &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap();
        assert!(result.near_limit);
        assert!((result.size_kb - 95.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_build_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = build(&source_for(dir.path()), &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, HtmlpackError::EmptyInput));
    }

    #[tokio::test]
    async fn test_build_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::Archive(dir.path().join("missing.zip"));
        let err = build(&source, &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap_err();
        assert!(err.is_input_unavailable());
    }

    #[tokio::test]
    async fn test_directory_root_file_beats_nested_namesake() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<head><link rel=\"stylesheet\" href=\"style.css\"></head><body>x</body>",
        )
        .unwrap();
        std::fs::write(dir.path().join("a/style.css"), "WRONG{}").unwrap();
        std::fs::write(dir.path().join("style.css"), "RIGHT{}").unwrap();

        let source = source_for(dir.path());
        let inspection = inspect(&source, &BuildOptions::default()).await.unwrap();
        assert_eq!(inspection.analysis.references[0].path.as_deref(), Some("style.css"));

        let result = build(&source, &BuildOptions::default(), &SilentProgress)
            .await
            .unwrap();
        assert!(result.unresolved.is_empty());
        assert_eq!(result.appended, ["a/style.css"]);
        let inlined = result.html.find("RIGHT{}").unwrap();
        let appended = result.html.find("WRONG{}").unwrap();
        assert!(appended < inlined, "leftover styles precede the head content");
    }

    #[tokio::test]
    async fn test_inspect_static_site() {
        let source = source_for(&fixtures().join("projects/static-site"));
        let inspection = inspect(&source, &BuildOptions::default()).await.unwrap();

        assert!(inspection.files.iter().any(|(p, _)| p == "css/style.css"));
        assert_eq!(inspection.analysis.entry.as_deref(), Some("index.html"));
        let unresolved: Vec<_> = inspection
            .analysis
            .references
            .iter()
            .filter(|r| !r.is_resolved())
            .map(|r| r.reference.locator.as_str())
            .collect();
        assert_eq!(unresolved, ["fonts/missing.css"]);
    }
}
