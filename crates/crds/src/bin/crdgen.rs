//! CRD YAML Generator
//!
//! Prints the CRD manifests for every resource in this crate as a single
//! multi-document YAML stream.
//!
//! Usage:
//!   cargo run -p crds --bin crdgen > deploy/crds.yaml

use crds::{Binding, ManagedCluster, MonitoringInstance};
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let crds = [
        Binding::crd(),
        MonitoringInstance::crd(),
        ManagedCluster::crd(),
    ];

    for crd in &crds {
        println!("---");
        print!("{}", serde_yaml::to_string(crd)?);
    }

    Ok(())
}
