use git2::{DescribeFormatOptions, DescribeOptions, Repository};
use std::env;
use std::path::PathBuf;

fn main() {
    let repo_dir = match option_env!("SHIPYARD_GIT_REPOSITORY") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap()),
    };

    let version = describe(&repo_dir).unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap());

    println!("cargo:rustc-env=SHIPYARD_VERSION={}", version);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", repo_dir.join(".git").display());
}

/// Describes the current commit using the closest tag. Returns `None` outside of a git checkout
/// or when no tag is reachable.
fn describe(repo_dir: &PathBuf) -> Option<String> {
    let repository = Repository::open(repo_dir).ok()?;

    let mut describe_opts = DescribeOptions::new();
    describe_opts.describe_tags();

    let mut describe_format_opts = DescribeFormatOptions::new();
    describe_format_opts.dirty_suffix("-dirty");

    let description = repository.describe(&describe_opts).ok()?;
    description.format(Some(&describe_format_opts)).ok()
}
