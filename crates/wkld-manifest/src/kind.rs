//! Workload kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ManifestError;

/// The closed set of workload kinds a manifest can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    /// Public, internet-facing HTTP service behind a load balancer.
    #[serde(rename = "Load Balanced Web Service")]
    LoadBalancedWebService,
    /// Private service that is not reachable from the internet.
    #[serde(rename = "Backend Service")]
    BackendService,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 2] = [
        WorkloadKind::LoadBalancedWebService,
        WorkloadKind::BackendService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadBalancedWebService => "Load Balanced Web Service",
            Self::BackendService => "Backend Service",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = ManifestError;

    /// Accepts the display name or a short slug (`lb-web`, `backend`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "load balanced web service" | "lb-web" | "lb-web-svc" => {
                Ok(Self::LoadBalancedWebService)
            }
            "backend service" | "backend" | "backend-svc" => Ok(Self::BackendService),
            _ => Err(ManifestError::UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_names_and_slugs() {
        assert_eq!(
            "Load Balanced Web Service".parse::<WorkloadKind>().unwrap(),
            WorkloadKind::LoadBalancedWebService
        );
        assert_eq!("backend".parse::<WorkloadKind>().unwrap(), WorkloadKind::BackendService);
        assert!(matches!(
            "Scheduled Job".parse::<WorkloadKind>(),
            Err(ManifestError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for kind in WorkloadKind::ALL {
            assert_eq!(kind.to_string().parse::<WorkloadKind>().unwrap(), kind);
        }
    }
}
