//! Build script for rufw
//!
//! Embeds build-time information (git commit, dirty status, build timestamp)
//! surfaced through the CLI version string.

fn main() {
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build info");
}
