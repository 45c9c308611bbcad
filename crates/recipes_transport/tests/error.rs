use recipes_transport::error::parse_error_message;
use recipes_transport::TransportError;
use reqwest::StatusCode;

#[test]
fn graphql_error_body_messages_are_joined() {
    let body = r#"{"errors":[{"message":"recipe not found"},{"message":"bad root"}]}"#;
    assert_eq!(
        parse_error_message(StatusCode::BAD_REQUEST, body),
        "recipe not found; bad root"
    );
}

#[test]
fn empty_body_falls_back_to_status_reason() {
    assert_eq!(
        parse_error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
        "Service Unavailable"
    );
}

#[test]
fn non_json_body_is_returned_verbatim() {
    assert_eq!(
        parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded"),
        "upstream exploded"
    );
}

#[test]
fn display_formats_are_stable() {
    assert_eq!(
        TransportError::Graphql(vec!["a".to_string(), "b".to_string()]).to_string(),
        "graphql error: a; b"
    );
    assert_eq!(
        TransportError::Status(StatusCode::BAD_REQUEST, "nope".to_string()).to_string(),
        "HTTP 400 Bad Request nope"
    );
    assert_eq!(
        TransportError::Protocol("unexpected frame".to_string()).to_string(),
        "protocol error: unexpected frame"
    );
}
