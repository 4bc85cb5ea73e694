//! Issue a bearer token for a caller identity
//!
//! Signs with the same `JWT_SECRET` the server verifies against:
//!
//! ```text
//! cargo run --bin issue_token -- 0xAbC123
//! ```

use anyhow::{bail, Context};
use ballot_engine::auth::TokenKeys;
use ballot_engine::config::Settings;
use ballot_engine::models::is_valid_identity;
use ballot_engine::voting::Identity;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let identity = std::env::args()
        .nth(1)
        .context("usage: issue_token <identity>")?;
    if !is_valid_identity(&identity) {
        bail!("'{}' is not a valid identity", identity);
    }

    let settings = Settings::load()?;
    let token = TokenKeys::from_config(&settings.auth).issue(&Identity::new(identity))?;
    println!("{}", token);
    Ok(())
}
