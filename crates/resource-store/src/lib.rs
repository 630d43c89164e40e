//! Resource Store
//!
//! Typed access to namespaced Kubernetes resources behind a mockable trait.
//! The monitoring controller reads and writes `MonitoringInstance` objects
//! through it, and the admission webhook looks up secrets through it.
//!
//! # Example
//!
//! ```no_run
//! use k8s_openapi::api::core::v1::Secret;
//! use resource_store::{KubeStore, ResourceStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let secrets: KubeStore<Secret> = KubeStore::new(client);
//!
//! match secrets.find("monitoring-mc", "prometheus-cluster1").await? {
//!     Some(_) => println!("secret present"),
//!     None => println!("secret missing"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod kube_store;
pub mod selector;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use error::StoreError;
pub use kube_store::KubeStore;
pub use selector::LabelSelector;
pub use store_trait::ResourceStore;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{InjectedFailure, MockStore, StoreCall, StoreOp};
