//! Interactive services (Jupyter, RStudio)

pub mod command;
pub mod gate;

pub use command::{jupyter_command, rstudio_command, ServiceCommand};
pub use gate::{check_services, implied_packages, requested_services, JUPYTER_PACKAGE};
