//! Monitoring Operator CRD Definitions
//!
//! Kubernetes Custom Resource Definitions shared by the monitoring
//! controller and the admission webhook.

pub mod binding;
pub mod constants;
pub mod managed_cluster;
pub mod monitoring_instance;
pub mod references;

pub use binding::*;
pub use managed_cluster::*;
pub use monitoring_instance::*;
pub use references::*;
