//! Language runtime selection and the services each runtime supports

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported runtime languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    R,
    Julia,
}

impl Language {
    /// Optional services this language can host
    pub fn supported_services(&self) -> &'static [Service] {
        match self {
            Self::Python => &[Service::Jupyter, Service::RStudio],
            Self::R => &[Service::RStudio],
            Self::Julia => &[Service::RStudio],
        }
    }

    /// Check the capability table for a service
    pub fn supports(&self, service: Service) -> bool {
        self.supported_services().contains(&service)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Python => "python",
            Self::R => "r",
            Self::Julia => "julia",
        };
        write!(f, "{}", name)
    }
}

/// Optional interactive services an environment can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Jupyter,
    RStudio,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jupyter => "Jupyter",
            Self::RStudio => "RStudio",
        };
        write!(f, "{}", name)
    }
}

/// The language runtime and the packages installed into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRuntime {
    pub language: Language,

    /// PyPI packages
    #[serde(default)]
    pub pypi: Vec<String>,

    /// Conda packages
    #[serde(default)]
    pub conda_packages: Vec<String>,

    /// CRAN packages
    #[serde(default)]
    pub r_packages: Vec<String>,

    /// Force the conda-managed interpreter even without conda packages
    #[serde(default)]
    pub conda: bool,
}

impl LanguageRuntime {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            pypi: Vec::new(),
            conda_packages: Vec::new(),
            r_packages: Vec::new(),
            conda: false,
        }
    }

    /// Whether the interpreter lives in the conda installation
    pub fn conda_enabled(&self) -> bool {
        self.conda || !self.conda_packages.is_empty()
    }

    /// Append PyPI packages that are not already requested.
    ///
    /// Returns the number of packages actually added.
    pub fn add_pypi_packages(&mut self, packages: &[String]) -> usize {
        let mut added = 0;
        for package in packages {
            if !self.pypi.contains(package) {
                self.pypi.push(package.clone());
                added += 1;
            }
        }
        added
    }
}

impl Default for LanguageRuntime {
    fn default() -> Self {
        Self::new(Language::Python)
    }
}
