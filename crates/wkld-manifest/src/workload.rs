//! Construction of new base manifests.
//!
//! Defaults (CPU, memory, task count, health check path) are applied here,
//! once, when a workload is created. They are part of the base configuration
//! and are never re-applied during resolution.

use crate::error::ManifestError;
use crate::field::Field;
use crate::image::{BuildSpec, ContainerHealthCheck, Image, ImageWithPort, ImageWithPortAndHealthcheck};
use crate::kind::WorkloadKind;
use crate::manifest::Manifest;
use crate::service::{
    BackendConfig, LoadBalancedConfig, RoutingRule, ServiceConfig, TaskConfig,
    DEFAULT_HEALTHCHECK_PATH,
};
use crate::validate::{validate_name, validate_port};

/// Builder used when the caller asks for buildpacks without naming one.
pub const DEFAULT_BUILDER: &str = "paketobuildpacks/builder:full";

/// Properties shared by every workload kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadProps {
    pub name: String,
    /// Dockerfile path relative to the workspace root.
    pub dockerfile: Option<String>,
    /// Buildpack builder image.
    pub builder: Option<String>,
}

impl WorkloadProps {
    pub fn validate(&self) -> Result<(), ManifestError> {
        validate_name(&self.name)?;
        let dockerfile = self.dockerfile.as_deref().filter(|s| !s.is_empty());
        let builder = self.builder.as_deref().filter(|s| !s.is_empty());
        if dockerfile.is_some() && builder.is_some() {
            return Err(ManifestError::validation(
                "image.build",
                "cannot specify both dockerfile and buildpack builder",
            ));
        }
        Ok(())
    }

    fn build_spec(&self) -> BuildSpec {
        match (self.dockerfile.as_deref(), self.builder.as_deref()) {
            (Some(df), _) if !df.is_empty() => BuildSpec::dockerfile(df),
            (_, Some(builder)) if !builder.is_empty() => BuildSpec::buildpack(builder),
            _ => BuildSpec::default(),
        }
    }
}

/// Properties for a new load balanced web service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBalancedWebServiceProps {
    pub workload: WorkloadProps,
    /// Request path routed to the service.
    pub path: String,
    pub port: u16,
}

/// Properties for a new backend service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendServiceProps {
    pub workload: WorkloadProps,
    /// Zero leaves the port unset.
    pub port: u16,
    pub healthcheck: Option<ContainerHealthCheck>,
}

/// Kind-tagged construction properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceProps {
    LoadBalanced(LoadBalancedWebServiceProps),
    Backend(BackendServiceProps),
}

impl ServiceProps {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            ServiceProps::LoadBalanced(_) => WorkloadKind::LoadBalancedWebService,
            ServiceProps::Backend(_) => WorkloadKind::BackendService,
        }
    }
}

/// A workload that already exists in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingService {
    pub name: String,
    pub kind: WorkloadKind,
}

/// Default request path for a new load balanced web service.
///
/// The first load balanced service of an application gets "/". Once another
/// one exists, the new service is routed under its own name.
pub fn default_http_path(name: &str, existing: &[ExistingService]) -> String {
    let shares_load_balancer = existing
        .iter()
        .any(|svc| svc.kind == WorkloadKind::LoadBalancedWebService && svc.name != name);
    if shares_load_balancer {
        name.to_string()
    } else {
        "/".to_string()
    }
}

impl Manifest {
    /// Create a base manifest for `props`, applying the kind's defaults.
    pub fn new(props: ServiceProps) -> Result<Self, ManifestError> {
        match props {
            ServiceProps::LoadBalanced(p) => Self::new_load_balanced_web_service(p),
            ServiceProps::Backend(p) => Self::new_backend_service(p),
        }
    }

    /// A load balanced web service with a single minimal task and a "/"
    /// health check.
    pub fn new_load_balanced_web_service(
        props: LoadBalancedWebServiceProps,
    ) -> Result<Self, ManifestError> {
        props.workload.validate()?;
        validate_port("image.port", props.port)?;

        let config = LoadBalancedConfig {
            image: ImageWithPort {
                image: Image {
                    build: props.workload.build_spec(),
                    location: Field::Unset,
                },
                port: Field::new(props.port),
            },
            http: RoutingRule {
                path: Field::new(props.path),
                healthcheck: Field::new(DEFAULT_HEALTHCHECK_PATH.to_string()),
                ..Default::default()
            },
            task: TaskConfig::with_defaults(),
            ..Default::default()
        };

        Ok(Manifest::from_parts(
            props.workload.name,
            ServiceConfig::LoadBalanced(config),
        ))
    }

    /// A backend service with a single minimal task.
    pub fn new_backend_service(props: BackendServiceProps) -> Result<Self, ManifestError> {
        props.workload.validate()?;

        let config = BackendConfig {
            image: ImageWithPortAndHealthcheck {
                image: Image {
                    build: props.workload.build_spec(),
                    location: Field::Unset,
                },
                port: if props.port == 0 {
                    Field::Unset
                } else {
                    Field::new(props.port)
                },
                healthcheck: props.healthcheck,
            },
            task: TaskConfig::with_defaults(),
            ..Default::default()
        };

        Ok(Manifest::from_parts(
            props.workload.name,
            ServiceConfig::Backend(config),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload(name: &str) -> WorkloadProps {
        WorkloadProps {
            name: name.to_string(),
            dockerfile: Some("frontend/Dockerfile".to_string()),
            builder: None,
        }
    }

    #[test]
    fn test_new_load_balanced_applies_defaults() {
        let manifest = Manifest::new_load_balanced_web_service(LoadBalancedWebServiceProps {
            workload: workload("frontend"),
            path: "/".to_string(),
            port: 80,
        })
        .unwrap();

        assert_eq!(manifest.name, "frontend");
        assert_eq!(manifest.kind(), WorkloadKind::LoadBalancedWebService);
        let ServiceConfig::LoadBalanced(config) = &manifest.config else {
            panic!("expected load balanced config");
        };
        assert_eq!(config.image.port, Field::new(80));
        assert_eq!(config.image.image.build.dockerfile.non_empty(), Some("frontend/Dockerfile"));
        assert_eq!(config.http.path, Field::new("/".to_string()));
        assert_eq!(config.http.healthcheck, Field::new("/".to_string()));
        assert!(config.http.stickiness.is_unset());
        assert_eq!(config.task, TaskConfig::with_defaults());
        assert!(manifest.environments.is_empty());
    }

    #[test]
    fn test_new_backend_with_builder_and_no_port() {
        let manifest = Manifest::new(ServiceProps::Backend(BackendServiceProps {
            workload: WorkloadProps {
                name: "worker".to_string(),
                dockerfile: None,
                builder: Some(DEFAULT_BUILDER.to_string()),
            },
            port: 0,
            healthcheck: None,
        }))
        .unwrap();

        assert_eq!(manifest.kind(), WorkloadKind::BackendService);
        assert!(manifest.config.port().is_unset());
        assert_eq!(manifest.config.image().build.builder.non_empty(), Some(DEFAULT_BUILDER));
        assert!(manifest.config.image().build.dockerfile.is_unset());
    }

    #[test]
    fn test_dockerfile_and_builder_rejected() {
        let mut props = workload("api");
        props.builder = Some(DEFAULT_BUILDER.to_string());
        let err = Manifest::new_backend_service(BackendServiceProps {
            workload: props,
            port: 8080,
            healthcheck: None,
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("image.build"));
    }

    #[test]
    fn test_invalid_port_and_name_rejected() {
        let err = Manifest::new_load_balanced_web_service(LoadBalancedWebServiceProps {
            workload: workload("frontend"),
            path: "/".to_string(),
            port: 0,
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("image.port"));

        let err = Manifest::new_backend_service(BackendServiceProps {
            workload: workload("Bad_Name"),
            port: 80,
            healthcheck: None,
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_default_http_path() {
        assert_eq!(default_http_path("api", &[]), "/");

        let existing = vec![
            ExistingService {
                name: "worker".to_string(),
                kind: WorkloadKind::BackendService,
            },
            ExistingService {
                name: "api".to_string(),
                kind: WorkloadKind::LoadBalancedWebService,
            },
        ];
        assert_eq!(default_http_path("api", &existing), "/");
        assert_eq!(default_http_path("admin", &existing), "admin");
    }
}
