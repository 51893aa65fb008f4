//! Turns validation results into Kubernetes admission responses.
//!
//! Denied requests are answered like the API server answers requests that fail
//! its own validation: HTTP code 422, reason `Invalid`, an aggregated message
//! and one `StatusCause` per [`Cause`] carrying the rendered field path.
//!
//! Serving the responses (HTTPS, certificates, webhook registration) is up to
//! the embedding binary.
use kube::{
    Resource, ResourceExt,
    core::{
        DynamicObject,
        admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation},
        response::{StatusCause, StatusDetails, StatusSummary},
    },
};
use tracing::instrument;

use crate::{
    crd::LinstorSatelliteConfiguration,
    options::ValidatorOptions,
    validation::{Cause, ValidationErrors},
};

/// The HTTP status code used by the API server for invalid objects.
pub const INVALID_STATUS_CODE: u16 = 422;

/// Validates the object of an admission request.
///
/// Deletions are always allowed. Creations and updates are allowed if the
/// new object passes [`LinstorSatelliteConfiguration::validate`].
#[instrument(
    skip_all,
    fields(
        request.uid = %request.uid,
        request.name = %request.name,
        request.operation = ?request.operation,
    )
)]
pub fn review(
    request: &AdmissionRequest<LinstorSatelliteConfiguration>,
    options: &ValidatorOptions,
) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);

    if matches!(request.operation, Operation::Delete) {
        return response;
    }

    let Some(object) = &request.object else {
        tracing::warn!("admission request does not contain an object");
        return response.deny("admission request does not contain an object");
    };

    match object.validate(request.old_object.as_ref(), options) {
        Ok(()) => {
            tracing::debug!("allowing request");
            response
        }
        Err(errors) => {
            tracing::info!(causes.count = errors.causes().len(), "denying request");
            deny_invalid(response, &object_name(request, object), &errors)
        }
    }
}

/// Handles a complete [`AdmissionReview`], as received by a validating webhook.
pub fn review_admission(
    review_request: AdmissionReview<LinstorSatelliteConfiguration>,
    options: &ValidatorOptions,
) -> AdmissionReview<DynamicObject> {
    let request: AdmissionRequest<LinstorSatelliteConfiguration> = match review_request.try_into() {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(
                error = &err as &dyn std::error::Error,
                "failed to convert admission review to request"
            );
            return AdmissionResponse::invalid(format!("failed to convert to request: {err}"))
                .into_review();
        }
    };

    review(&request, options).into_review()
}

/// Denies `response` with a `422 Invalid` status listing all `errors`.
pub fn deny_invalid(
    response: AdmissionResponse,
    name: &str,
    errors: &ValidationErrors,
) -> AdmissionResponse {
    let kind = LinstorSatelliteConfiguration::kind(&());
    let group = LinstorSatelliteConfiguration::group(&());

    let mut response = response.deny(format!("{kind}.{group} {name:?} is invalid: {errors}"));
    response.result.status = Some(StatusSummary::Failure);
    response.result.code = INVALID_STATUS_CODE;
    response.result.reason = "Invalid".to_owned();
    response.result.details = Some(StatusDetails {
        name: name.to_owned(),
        group: group.into_owned(),
        kind: kind.into_owned(),
        uid: String::new(),
        causes: errors.causes().iter().map(status_cause).collect(),
        retry_after_seconds: 0,
    });

    response
}

fn status_cause(cause: &Cause) -> StatusCause {
    StatusCause {
        reason: cause.reason.to_string(),
        message: cause.message.clone(),
        field: cause.field.to_string(),
    }
}

/// The name of the reviewed object. Objects created with `generateName` don't
/// have a name yet, the request might still know it.
fn object_name(
    request: &AdmissionRequest<LinstorSatelliteConfiguration>,
    object: &LinstorSatelliteConfiguration,
) -> String {
    match object.meta().name.as_deref() {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ if !request.name.is_empty() => request.name.clone(),
        _ => object.name_any(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Causes, FieldPath};

    #[test]
    fn invalid_response_lists_causes() {
        let pools = FieldPath::new("spec").child("storagePools");
        let mut causes = Causes::new();
        causes.missing_member(pools.index(0), "at least one backing type must be specified");
        let errors = causes.into_result().unwrap_err();

        let response = deny_invalid(AdmissionResponse::invalid("placeholder"), "pools", &errors);

        assert!(!response.allowed);
        assert_eq!(response.result.code, 422);
        assert_eq!(response.result.reason, "Invalid");
        assert_eq!(
            response.result.message,
            "LinstorSatelliteConfiguration.piraeus.io \"pools\" is invalid: \
             spec.storagePools.0: Required value: at least one backing type must be specified"
        );

        let details = response.result.details.unwrap();
        assert_eq!(details.name, "pools");
        assert_eq!(details.group, "piraeus.io");
        assert_eq!(details.kind, "LinstorSatelliteConfiguration");
        assert_eq!(details.uid, "");
        assert_eq!(details.retry_after_seconds, 0);
        assert_eq!(details.causes.len(), 1);
        assert_eq!(details.causes[0].reason, "FieldValueRequired");
        assert_eq!(details.causes[0].field, "spec.storagePools.0");
    }
}
