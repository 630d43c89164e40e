//! HTTP surface of the admission webhook.
//!
//! The API server POSTs an `AdmissionReview` to `/validate-managedcluster`
//! and always gets a review back: rule violations become denials carrying
//! the rule's message, undecodable reviews become invalid responses.

use crate::error::AdmissionError;
use crate::validator::AdmissionValidator;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use crds::ManagedCluster;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use kube::core::DynamicObject;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Path the ValidatingWebhookConfiguration points at
pub const VALIDATE_PATH: &str = "/validate-managedcluster";

/// Router serving the validation endpoint and `/healthz`
pub fn router(validator: Arc<AdmissionValidator>) -> Router {
    Router::new()
        .route(VALIDATE_PATH, post(validate_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(validator)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn validate_handler(
    State(validator): State<Arc<AdmissionValidator>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    Json(review(&validator, body).await)
}

/// Decide one review
pub async fn review(
    validator: &AdmissionValidator,
    body: AdmissionReview<DynamicObject>,
) -> AdmissionReview<DynamicObject> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(err) => {
            error!("invalid admission review: {}", err);
            return AdmissionResponse::invalid(err.to_string()).into_review();
        }
    };

    let res = AdmissionResponse::from(&req);
    let name = req.name.clone();
    let operation = req.operation.clone();

    match decide(validator, req).await {
        Ok(()) => {
            info!("accepted: {:?} on ManagedCluster {}", operation, name);
            res.into_review()
        }
        Err(AdmissionError::Validation(msg)) => {
            warn!("denied: {:?} on ManagedCluster {} ({})", operation, name, msg);
            res.deny(msg).into_review()
        }
        Err(e) => {
            error!("{:?} on ManagedCluster {} could not be decided: {}", operation, name, e);
            res.deny(format!("internal error: {}", e)).into_review()
        }
    }
}

async fn decide(validator: &AdmissionValidator, req: AdmissionRequest<DynamicObject>) -> Result<(), AdmissionError> {
    match req.operation {
        Operation::Create => validator.validate_create(&parse(req.object, "object")?).await,
        Operation::Update => {
            let cluster = parse(req.object, "object")?;
            let old = previous(req.old_object);
            validator.validate_update(old.as_ref(), &cluster).await
        }
        Operation::Delete => match previous(req.old_object) {
            Some(cluster) => validator.validate_delete(&cluster).await,
            None => {
                debug!("delete of ManagedCluster {} accepted without a readable oldObject", req.name);
                Ok(())
            }
        },
        Operation::Connect => Ok(()),
    }
}

/// The stored object, when the review carries a decodable one
///
/// Never decides the outcome, so a missing or unreadable `oldObject` is
/// only logged.
fn previous(object: Option<DynamicObject>) -> Option<ManagedCluster> {
    match parse(object, "oldObject") {
        Ok(cluster) => Some(cluster),
        Err(e) => {
            debug!("ignoring oldObject: {}", e);
            None
        }
    }
}

fn parse(object: Option<DynamicObject>, field: &str) -> Result<ManagedCluster, AdmissionError> {
    let object = object.ok_or_else(|| AdmissionError::InvalidObject(format!("review has no {}", field)))?;
    object
        .try_parse::<ManagedCluster>()
        .map_err(|e| AdmissionError::InvalidObject(format!("{} is not a ManagedCluster: {}", field, e)))
}
