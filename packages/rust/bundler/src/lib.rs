//! Single-file HTML bundling.
//!
//! Turns a [`FileSet`] (an HTML entry point plus its CSS and JavaScript) into one
//! self-contained HTML document with every resolvable local asset inlined, then
//! shrinks it with a series of textual minification passes.

mod assemble;
mod assets;
mod entry;
mod mhtml;
mod minify;
mod project;
mod sections;
mod size;

use tracing::{debug, info, instrument, warn};

use htmlpack_shared::{
    AssetKind, BundleOptions, FileSet, HtmlpackError, ResolvedAsset, Result,
};

pub use assemble::PLACEHOLDER_MESSAGE;
pub use assets::{find_asset_references, inline_assets, resolve, resolve_locator, unconsumed};
pub use entry::select_entry;
pub use mhtml::extract_html;
pub use minify::{minify, minify_markup};
pub use project::{ProjectType, detect_project_type};
pub use sections::{Section, Sections, extract_section, extract_sections};
pub use size::{BundleSize, check_size};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Result of bundling a file set.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// The finished document (minified unless disabled).
    pub html: String,
    /// Entry document path; `None` when the document was synthesized.
    pub entry: Option<String>,
    /// Title emitted in the document.
    pub title: String,
    /// Every stylesheet/script reference found in the entry, with its resolution.
    pub assets: Vec<ResolvedAsset>,
    /// Files appended as trailing blocks because nothing inlined them.
    pub appended: Vec<String>,
    /// Detected project kind.
    pub project_type: ProjectType,
}

impl Bundle {
    pub fn is_synthetic(&self) -> bool {
        self.entry.is_none()
    }

    /// References left as dangling links in the output.
    pub fn unresolved(&self) -> impl Iterator<Item = &ResolvedAsset> {
        self.assets.iter().filter(|a| !a.is_resolved())
    }
}

/// What a file set would bundle into, without building the document.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub entry: Option<String>,
    pub project_type: ProjectType,
    /// References in the entry document's head and body, resolved.
    pub references: Vec<ResolvedAsset>,
}

// ---------------------------------------------------------------------------
// Bundler
// ---------------------------------------------------------------------------

/// Bundle a file set into a single HTML document.
///
/// 1. Selects the entry document (or falls back to a synthetic one)
/// 2. Extracts head, body, and title
/// 3. Inlines referenced stylesheets and scripts in both sections
/// 4. Appends stylesheets and scripts nothing referenced
/// 5. Assembles the document and minifies it
///
/// Fails only when the file set is empty. Missing HTML and unresolved
/// references degrade the output instead.
#[instrument(skip_all, fields(files = files.len()))]
pub fn bundle(files: &FileSet, opts: &BundleOptions) -> Result<Bundle> {
    if files.is_empty() {
        return Err(HtmlpackError::EmptyInput);
    }

    let project_type = detect_project_type(files);
    if project_type.needs_build() {
        warn!(%project_type, "framework project detected; bundling sources without a build step");
    }

    let mut bundle = match select_entry(files) {
        Some(entry) => bundle_entry(files, entry, opts, project_type),
        None => {
            info!("no HTML entry document, synthesizing one");
            bundle_synthetic(files, opts, project_type)
        }
    };

    if opts.minify {
        let before = bundle.html.len();
        bundle.html = minify(&bundle.html);
        debug!(before, after = bundle.html.len(), "minified bundle");
    }

    info!(
        entry = bundle.entry.as_deref().unwrap_or("<synthetic>"),
        inlined = bundle.assets.iter().filter(|a| a.is_resolved()).count(),
        unresolved = bundle.unresolved().count(),
        appended = bundle.appended.len(),
        bytes = bundle.html.len(),
        "bundle complete"
    );

    Ok(bundle)
}

fn bundle_entry(
    files: &FileSet,
    entry: &str,
    opts: &BundleOptions,
    project_type: ProjectType,
) -> Bundle {
    let source = files.get(entry).unwrap_or_default();
    debug!(entry, bytes = source.len(), "bundling entry document");

    // Step 1: Split the entry into sections
    let sections = extract_sections(source);
    let title = sections
        .title
        .clone()
        .unwrap_or_else(|| opts.default_title.clone());

    // Step 2: Inline referenced assets in place. The entry's own title is
    // dropped first; the prologue emits the title.
    let mut log = Vec::new();
    let head = inline_assets(&crate::sections::strip_title(&sections.head), files, &mut log);
    let body = inline_assets(&sections.body, files, &mut log);

    // Step 3: Collect assets nothing inlined
    let inlined = [head.as_str(), body.as_str()];
    let leftover_styles = unconsumed(files, AssetKind::Stylesheet, &inlined);
    let leftover_scripts = unconsumed(files, AssetKind::Script, &inlined);
    let appended = leftover_styles
        .iter()
        .chain(&leftover_scripts)
        .map(|e| e.path.clone())
        .collect();

    // Step 4: Assemble
    let html = assemble::assemble_document(&assemble::DocumentParts {
        title: &title,
        head: &head,
        body: &body,
        leftover_styles,
        leftover_scripts,
    });

    Bundle {
        html,
        entry: Some(entry.to_string()),
        title,
        assets: log,
        appended,
        project_type,
    }
}

fn bundle_synthetic(files: &FileSet, opts: &BundleOptions, project_type: ProjectType) -> Bundle {
    let styles = unconsumed(files, AssetKind::Stylesheet, &[]);
    let scripts = unconsumed(files, AssetKind::Script, &[]);
    let appended = styles.iter().chain(&scripts).map(|e| e.path.clone()).collect();

    let html = assemble::synthesize_document(&opts.default_title, &styles, &scripts);

    Bundle {
        html,
        entry: None,
        title: opts.default_title.clone(),
        assets: Vec::new(),
        appended,
        project_type,
    }
}

/// Report the entry, project type, and asset resolutions for a file set.
pub fn analyze(files: &FileSet) -> Analysis {
    let entry = select_entry(files);
    let references = entry
        .and_then(|e| files.get(e))
        .map(|source| {
            let sections = extract_sections(source);
            find_asset_references(&sections.head)
                .into_iter()
                .chain(find_asset_references(&sections.body))
                .map(|r| resolve(files, r))
                .collect()
        })
        .unwrap_or_default();

    Analysis {
        entry: entry.map(String::from),
        project_type: detect_project_type(files),
        references,
    }
}

// ---------------------------------------------------------------------------
// Raw document inputs
// ---------------------------------------------------------------------------

/// Minify a raw HTML document uploaded on its own.
pub fn process_html(html: &str) -> String {
    minify_markup(html)
}

/// Unwrap an MHTML archive and minify the HTML inside.
pub fn process_mhtml(mhtml: &str) -> Result<String> {
    let html = extract_html(mhtml)?;
    debug!(bytes = html.len(), "extracted HTML from MHTML");
    Ok(process_html(html))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
