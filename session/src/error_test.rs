use super::*;

// =============================================================================
// detail_message
// =============================================================================

#[test]
fn detail_message_reads_string_detail() {
    assert_eq!(
        detail_message(r#"{"detail":"Incorrect email or password"}"#).as_deref(),
        Some("Incorrect email or password")
    );
}

#[test]
fn detail_message_joins_validation_list() {
    let body = r#"{"detail":[{"loc":["body","email"],"msg":"field required","type":"missing"},
                             {"loc":["body","password"],"msg":"too short","type":"value_error"}]}"#;
    assert_eq!(detail_message(body).as_deref(), Some("field required; too short"));
}

#[test]
fn detail_message_ignores_non_json_and_blank() {
    assert!(detail_message("Internal Server Error").is_none());
    assert!(detail_message(r#"{"detail":"  "}"#).is_none());
    assert!(detail_message(r#"{"message":"x"}"#).is_none());
}

#[test]
fn api_error_exposes_status_and_detail() {
    let err = ApiError::from_status(401, r#"{"detail":"Could not validate credentials"}"#);
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.detail(), Some("Could not validate credentials"));
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "backend returned 401: Could not validate credentials");
    assert!(ApiError::Network("refused".into()).status().is_none());
}

// =============================================================================
// AuthError classification
// =============================================================================

#[test]
fn login_rejection_uses_backend_detail() {
    let err = AuthError::from_login(ApiError::from_status(401, r#"{"detail":"Incorrect email or password"}"#));
    assert!(matches!(&err, AuthError::InvalidCredentials(m) if m == "Incorrect email or password"));
    assert_eq!(err.to_string(), "Incorrect email or password");
}

#[test]
fn login_rejection_without_detail_uses_generic_message() {
    let err = AuthError::from_login(ApiError::Status { status: 400, detail: None });
    assert!(matches!(err, AuthError::InvalidCredentials(m) if m == LOGIN_FAILED));
}

#[test]
fn login_server_and_network_failures_are_distinct() {
    assert!(matches!(
        AuthError::from_login(ApiError::Status { status: 503, detail: None }),
        AuthError::Server { status: 503, .. }
    ));
    assert!(matches!(AuthError::from_login(ApiError::Network("down".into())), AuthError::NetworkFailure(_)));
}

#[test]
fn resolution_maps_rejections_to_unauthenticated() {
    assert!(matches!(
        AuthError::from_resolution(ApiError::Status { status: 401, detail: None }),
        AuthError::Unauthenticated
    ));
    assert!(matches!(
        AuthError::from_resolution(ApiError::Status { status: 403, detail: Some("Inactive user".into()) }),
        AuthError::Unauthenticated
    ));
    assert!(matches!(AuthError::from_resolution(ApiError::Decode("bad".into())), AuthError::Unauthenticated));
    assert!(matches!(
        AuthError::from_resolution(ApiError::Status { status: 500, detail: None }),
        AuthError::Server { status: 500, .. }
    ));
}

// =============================================================================
// RegistrationError classification
// =============================================================================

#[test]
fn registration_duplicate_is_conflict() {
    let err = RegistrationError::from(ApiError::from_status(400, r#"{"detail":"Username or email already registered"}"#));
    assert_eq!(err.kind, RegistrationErrorKind::Conflict);
    assert_eq!(err.message, "Username or email already registered");
    let err = RegistrationError::from(ApiError::Status { status: 409, detail: None });
    assert_eq!(err.kind, RegistrationErrorKind::Conflict);
    assert_eq!(err.message, REGISTRATION_FAILED);
}

#[test]
fn registration_validation_failures() {
    let err = RegistrationError::from(ApiError::from_status(422, r#"{"detail":[{"msg":"invalid email"}]}"#));
    assert_eq!(err.kind, RegistrationErrorKind::ValidationFailed);
    assert_eq!(err.to_string(), "invalid email");
    let err = RegistrationError::from(ApiError::Status { status: 400, detail: Some("Password too weak".into()) });
    assert_eq!(err.kind, RegistrationErrorKind::ValidationFailed);
}

#[test]
fn registration_other_failures_are_unknown() {
    let err = RegistrationError::from(ApiError::Network("connection refused".into()));
    assert_eq!(err, RegistrationError::new(RegistrationErrorKind::Unknown, REGISTRATION_FAILED));
    let err = RegistrationError::from(ApiError::Status { status: 500, detail: None });
    assert_eq!(err.kind, RegistrationErrorKind::Unknown);
}
