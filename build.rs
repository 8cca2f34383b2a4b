use git2::Repository;
use std::env;
use std::fs;
use std::path::Path;

fn head_sha() -> Option<String> {
    let repo = Repository::discover(".").ok()?;
    let commit = repo.head().ok()?.peel_to_commit().ok()?;
    Some(commit.id().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest_path = Path::new(&out_dir).join("git_sha.rs");
    let git_sha = head_sha().unwrap_or_else(|| "unknown".to_string());

    fs::write(
        &dest_path,
        format!("pub const GIT_SHA: &str = \"{git_sha}\";\n"),
    )
    .expect("failed to write git_sha.rs");
}
