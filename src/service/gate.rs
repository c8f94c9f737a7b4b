//! Service compatibility checks
//!
//! Requested services are checked against the runtime's capability table
//! before any plugin is fetched. Packages a service needs are derived here
//! but applied to the runtime by the compiler.

use crate::error::{EnvGraphError, EnvGraphResult};
use crate::spec::{EnvironmentSpec, Service};

/// PyPI package the notebook server needs
pub const JUPYTER_PACKAGE: &str = "jupyter";

/// Services the spec asks for
pub fn requested_services(spec: &EnvironmentSpec) -> Vec<Service> {
    let mut services = Vec::new();
    if spec.jupyter.is_some() {
        services.push(Service::Jupyter);
    }
    if spec.rstudio.is_some() {
        services.push(Service::RStudio);
    }
    services
}

/// PyPI packages implied by the requested services
pub fn implied_packages(spec: &EnvironmentSpec) -> Vec<String> {
    requested_services(spec)
        .into_iter()
        .filter_map(|service| match service {
            Service::Jupyter => Some(JUPYTER_PACKAGE.to_string()),
            Service::RStudio => None,
        })
        .collect()
}

/// Check every requested service against the runtime language
pub fn check_services(spec: &EnvironmentSpec) -> EnvGraphResult<()> {
    let language = spec.runtime.language;

    for service in requested_services(spec) {
        if !language.supports(service) {
            return Err(EnvGraphError::UnsupportedFeatureCombination {
                feature: service.to_string(),
                runtime: language.to_string(),
            });
        }
    }

    Ok(())
}
