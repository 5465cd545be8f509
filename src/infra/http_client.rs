use crate::error::Result;
use std::time::Duration;

const USER_AGENT: &str = concat!("prospect_pipeline/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client. `timeout` bounds the whole request including the body.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
