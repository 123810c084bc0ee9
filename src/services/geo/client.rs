use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CheckError;

pub const DEFAULT_LOOKUP_URL: &str = "https://ipvigilante.com";

/// Which countries count as licit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryPolicy {
    /// Only these countries are licit.
    Allow(Vec<String>),
    /// Every country but these is licit.
    Deny(Vec<String>),
}

impl Default for CountryPolicy {
    fn default() -> Self {
        CountryPolicy::Allow(vec!["Germany".to_string(), "Netherlands".to_string()])
    }
}

impl CountryPolicy {
    /// Case-insensitive, whitespace-insensitive match of `country` against
    /// the list.
    pub fn permits(&self, country: &str) -> bool {
        let country = country.trim();
        if country.is_empty() {
            return false;
        }
        let listed = |list: &[String]| list.iter().any(|c| c.trim().eq_ignore_ascii_case(country));
        match self {
            CountryPolicy::Allow(list) => listed(list),
            CountryPolicy::Deny(list) => !listed(list),
        }
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    status: String,
    #[serde(default)]
    data: Option<LookupData>,
}

#[derive(Deserialize)]
struct LookupData {
    country_name: Option<String>,
}

/// Extract the country name from a lookup service answer.
pub fn parse_country(body: &[u8]) -> Result<String, CheckError> {
    let resp: LookupResponse = serde_json::from_slice(body)?;
    if resp.status != "success" {
        return Err(CheckError::LookupRejected(resp.status));
    }
    resp.data
        .and_then(|d| d.country_name)
        .ok_or_else(|| CheckError::LookupRejected("success without country_name".to_string()))
}

/// Resolves the seed box's public IP country by running `curl` on the box
/// itself over ssh, so the answer reflects the box's egress (VPN) and not
/// ours.
#[derive(Debug, Clone)]
pub struct GeoLocator {
    user: String,
    addr: String,
    lookup_url: String,
    policy: CountryPolicy,
    timeout: Duration,
}

impl GeoLocator {
    pub fn new(
        user: impl Into<String>,
        addr: impl Into<String>,
        lookup_url: impl Into<String>,
        policy: CountryPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            user: user.into(),
            addr: addr.into(),
            lookup_url: lookup_url.into(),
            policy,
            timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg("BatchMode=yes")
            .arg(format!("{}@{}", self.user, self.addr))
            .arg("curl")
            .arg("-s")
            .arg(&self.lookup_url)
            .kill_on_drop(true);
        cmd
    }

    /// Country name of the box's public IP.
    pub async fn country(&self) -> Result<String, CheckError> {
        let output = tokio::time::timeout(self.timeout, self.command().output())
            .await
            .map_err(|_| CheckError::Timeout(self.timeout))?
            .map_err(CheckError::Spawn)?;

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(addr = %self.addr, code = ?output.status.code(), stderr = %stderr, "Unable to get IP localization");
            return Err(CheckError::EmptyOutput {
                code: output.status.code(),
                stderr,
            });
        }

        parse_country(&output.stdout)
    }

    /// Whether the box currently appears to be in a licit country.
    pub async fn check_licit(&self) -> Result<bool, CheckError> {
        let country = self.country().await?;
        let licit = self.policy.permits(&country);
        debug!(country = %country, licit, "IP localization");
        Ok(licit)
    }
}
