//! System browser integration.
//!
//! Opens a tree's detail page on the website.

use anyhow::Result;
use std::process::{Command, Stdio};
use tracing::debug;

/// Openers tried in order.
#[cfg(target_os = "macos")]
const OPENERS: &[&str] = &["open"];
#[cfg(not(target_os = "macos"))]
const OPENERS: &[&str] = &["xdg-open", "gio", "open"];

/// Open a URL in the user's browser.
///
/// # Arguments
/// * `url` - Full page URL (e.g. https://trees.example.org/trees/a1)
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// The opener's output is discarded so it cannot draw over the terminal UI.
pub fn open_in_browser(url: &str) -> Result<()> {
    for opener in OPENERS {
        let mut cmd = Command::new(opener);
        if *opener == "gio" {
            cmd.arg("open");
        }
        cmd.arg(url).stdout(Stdio::null()).stderr(Stdio::null());

        if cmd.spawn().is_ok() {
            debug!(opener, url, "Opened detail page");
            return Ok(());
        }
    }

    Err(anyhow::anyhow!(
        "Failed to open {} in a browser. Tried: {}",
        url,
        OPENERS.join(", ")
    ))
}
