use std::process::Command;

fn main() {
    // Capture the git commit hash at build time for --version output.
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map_or_else(|| "unknown".to_owned(), |s| s.trim().to_owned());

    println!("cargo:rustc-env=GIT_HASH={git_hash}");

    // Build timestamp in ISO 8601 (UTC).
    let build_timestamp = {
        use time::format_description::well_known::Rfc3339;
        use time::OffsetDateTime;

        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_owned())
    };

    println!("cargo:rustc-env=BUILD_TIMESTAMP={build_timestamp}");

    println!("cargo:rerun-if-changed=.git/HEAD");
}
