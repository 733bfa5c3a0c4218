//! Field-level merge of a base configuration with an overlay.
//!
//! Merge rules:
//! - `Field<T>`: unset overlay keeps the base; a present overlay (including
//!   the zero value) replaces it verbatim
//! - sequences are `Field<Vec<_>>` and therefore replaced wholesale
//! - sections: recurse field by field
//! - optional sections: recurse when both exist, otherwise take whichever exists
//! - maps: key-by-key union; a key in both maps merges the two entries, so
//!   string values are replaced and sidecars recurse field by field
//!
//! Every merge reads both sides by reference and builds a new value; neither
//! input is modified.

use std::collections::BTreeMap;

use wkld_manifest::{
    BackendConfig, BuildSpec, ContainerHealthCheck, Field, Image, ImageWithPort,
    ImageWithPortAndHealthcheck, LoadBalancedConfig, Logging, RoutingRule, SidecarConfig,
    TaskConfig,
};

/// Produce a new value from `self` (the base) overridden by `overlay`.
pub trait Merge {
    fn merge(&self, overlay: &Self) -> Self;
}

impl<T: Clone> Merge for Field<T> {
    fn merge(&self, overlay: &Self) -> Self {
        match overlay {
            Field::Unset => self.clone(),
            Field::Value(v) => Field::Value(v.clone()),
        }
    }
}

impl<T: Merge + Clone> Merge for Option<T> {
    fn merge(&self, overlay: &Self) -> Self {
        match (self, overlay) {
            (Some(base), Some(over)) => Some(base.merge(over)),
            (None, Some(over)) => Some(over.clone()),
            (base, None) => base.clone(),
        }
    }
}

// Map values are plain strings; a present overlay value always wins.
impl Merge for String {
    fn merge(&self, overlay: &Self) -> Self {
        overlay.clone()
    }
}

impl<V: Merge + Clone> Merge for BTreeMap<String, V> {
    fn merge(&self, overlay: &Self) -> Self {
        let mut merged = self.clone();
        for (key, value) in overlay {
            let entry = match self.get(key) {
                Some(base) => base.merge(value),
                None => value.clone(),
            };
            merged.insert(key.clone(), entry);
        }
        merged
    }
}

impl Merge for BuildSpec {
    fn merge(&self, o: &Self) -> Self {
        BuildSpec {
            dockerfile: self.dockerfile.merge(&o.dockerfile),
            context: self.context.merge(&o.context),
            target: self.target.merge(&o.target),
            args: self.args.merge(&o.args),
            cache_from: self.cache_from.merge(&o.cache_from),
            builder: self.builder.merge(&o.builder),
            env: self.env.merge(&o.env),
        }
    }
}

impl Merge for Image {
    fn merge(&self, o: &Self) -> Self {
        Image {
            build: self.build.merge(&o.build),
            location: self.location.merge(&o.location),
        }
    }
}

impl Merge for ImageWithPort {
    fn merge(&self, o: &Self) -> Self {
        ImageWithPort {
            image: self.image.merge(&o.image),
            port: self.port.merge(&o.port),
        }
    }
}

impl Merge for ContainerHealthCheck {
    fn merge(&self, o: &Self) -> Self {
        ContainerHealthCheck {
            command: self.command.merge(&o.command),
            interval: self.interval.merge(&o.interval),
            retries: self.retries.merge(&o.retries),
            timeout: self.timeout.merge(&o.timeout),
            start_period: self.start_period.merge(&o.start_period),
        }
    }
}

impl Merge for ImageWithPortAndHealthcheck {
    fn merge(&self, o: &Self) -> Self {
        ImageWithPortAndHealthcheck {
            image: self.image.merge(&o.image),
            port: self.port.merge(&o.port),
            healthcheck: self.healthcheck.merge(&o.healthcheck),
        }
    }
}

impl Merge for RoutingRule {
    fn merge(&self, o: &Self) -> Self {
        RoutingRule {
            path: self.path.merge(&o.path),
            healthcheck: self.healthcheck.merge(&o.healthcheck),
            stickiness: self.stickiness.merge(&o.stickiness),
            target_container: self.target_container.merge(&o.target_container),
        }
    }
}

impl Merge for TaskConfig {
    fn merge(&self, o: &Self) -> Self {
        TaskConfig {
            cpu: self.cpu.merge(&o.cpu),
            memory: self.memory.merge(&o.memory),
            count: self.count.merge(&o.count),
            variables: self.variables.merge(&o.variables),
            secrets: self.secrets.merge(&o.secrets),
        }
    }
}

impl Merge for Logging {
    fn merge(&self, o: &Self) -> Self {
        Logging {
            image: self.image.merge(&o.image),
            destination: self.destination.merge(&o.destination),
            enable_metadata: self.enable_metadata.merge(&o.enable_metadata),
            secret_options: self.secret_options.merge(&o.secret_options),
            config_file: self.config_file.merge(&o.config_file),
        }
    }
}

impl Merge for SidecarConfig {
    fn merge(&self, o: &Self) -> Self {
        SidecarConfig {
            port: self.port.merge(&o.port),
            image: self.image.merge(&o.image),
            credentials_parameter: self.credentials_parameter.merge(&o.credentials_parameter),
        }
    }
}

impl Merge for LoadBalancedConfig {
    fn merge(&self, o: &Self) -> Self {
        LoadBalancedConfig {
            image: self.image.merge(&o.image),
            http: self.http.merge(&o.http),
            task: self.task.merge(&o.task),
            logging: self.logging.merge(&o.logging),
            sidecars: self.sidecars.merge(&o.sidecars),
        }
    }
}

impl Merge for BackendConfig {
    fn merge(&self, o: &Self) -> Self {
        BackendConfig {
            image: self.image.merge(&o.image),
            task: self.task.merge(&o.task),
            logging: self.logging.merge(&o.logging),
            sidecars: self.sidecars.merge(&o.sidecars),
        }
    }
}
