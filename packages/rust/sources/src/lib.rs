//! Input acquisition for htmlpack.
//!
//! Every source (zip upload, local directory, single file, GitHub repository)
//! is reduced to a [`FileSet`](htmlpack_shared::FileSet) of text files before
//! bundling starts. Failures here are all "input unavailable" errors.

mod archive;
mod directory;
mod github;

pub use archive::{read_zip, read_zip_file};
pub use directory::{read_dir, read_file};
pub use github::{RepoRef, fetch_repo, is_github_url, parse_repo_url};
