//! Application Configuration
//!
//! Explicit values handed to the pipeline by the binaries. Nothing in this
//! crate reads the environment.

use std::time::Duration;

/// Campaign page of the Les Pierres Noires buoy
pub const DEFAULT_CAMPAIGN_URL: &str =
    "https://candhis.cerema.fr/_public_/campagne.php?Y2FtcD0wMjkxMQ==";

/// Index the observations are written to
pub const DEFAULT_COLLECTION: &str = "les-pierres-noires";

/// Harvest pipeline configuration
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Observation page the table is read from
    pub campaign_url: String,
    /// Observation Store collection (index) name
    pub collection: String,
    /// Deadline applied to each network-bound step
    pub operation_timeout: Duration,
    /// Trailing window served by the listing endpoint
    pub listing_window: Duration,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            campaign_url: DEFAULT_CAMPAIGN_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            operation_timeout: Duration::from_secs(60),
            listing_window: Duration::from_secs(24 * 3600), // 24 hours
        }
    }
}

impl HarvestConfig {
    /// Listing window as a chrono duration
    pub fn listing_window_delta(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::from_std(self.listing_window).unwrap_or(chrono::TimeDelta::hours(24))
    }
}

/// Browser-driven session acquisition
#[derive(Debug, Clone)]
pub struct AcquirerConfig {
    /// Remote-debugging base of the running browser, scheme optional
    pub chrome_url: String,
    /// Page visited to obtain the session cookie
    pub target_url: String,
}

/// Search index location
#[derive(Debug, Clone)]
pub struct ObservationStoreConfig {
    pub base_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarvestConfig::default();
        assert_eq!(config.collection, "les-pierres-noires");
        assert_eq!(config.operation_timeout, Duration::from_secs(60));
        assert_eq!(config.listing_window_delta(), chrono::TimeDelta::hours(24));
        assert!(config.campaign_url.starts_with("https://candhis.cerema.fr/"));
    }
}
