#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    use crate::error::{AppError, FieldError};
    use crate::validation::Validator;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Validation(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Unauthenticated("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Internal(anyhow::anyhow!("boom")).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Database(sqlx::Error::RowNotFound).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let (status, body) = render(AppError::Validation(vec![
            FieldError::new("box_type", "box_type is invalid"),
            FieldError::new("quantity", "quantity must be a non-negative integer"),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": [
                { "field": "box_type", "message": "box_type is invalid" },
                { "field": "quantity", "message": "quantity must be a non-negative integer" }
            ]})
        );
    }

    #[tokio::test]
    async fn test_internal_details_not_leaked() {
        let (status, body) = render(AppError::Internal(anyhow::anyhow!("disk on fire at /var/secret"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Something went wrong!" }));

        let (_, body) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(body, json!({ "error": "Database error" }));
    }

    #[tokio::test]
    async fn test_message_envelope() {
        let (status, body) = render(AppError::Forbidden("Admin access required".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "Admin access required" }));
    }

    #[test]
    fn test_validator_collects_all_fields() {
        let mut v = Validator::new();
        v.not_blank("username", " ").min_chars("password", "abc", 6).positive_id("library_id", 0);

        match v.finish() {
            Err(AppError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["username", "password", "library_id"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert!(Validator::new().non_negative("quantity", 0).finish().is_ok());
    }

    #[test]
    fn test_validator_decodes_raw_fields() {
        let mut v = Validator::new();
        assert_eq!(v.integer("quantity", &Some(json!(7))), 7);
        assert_eq!(v.integer("quantity", &Some(json!(" 12 "))), 12);
        assert_eq!(v.optional_integer("library_id", &None), None);
        assert_eq!(v.optional_integer("library_id", &Some(Value::Null)), None);
        assert_eq!(v.string("box_type", &Some(json!("Kids"))), "Kids");
        assert!(v.flag("is_admin", &Some(json!(true))));
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.integer("quantity", &Some(json!(4.5)));
        v.integer("count", &Some(json!("lots")));
        v.string("box_type", &None);
        v.string("name", &Some(json!(3)));
        match v.finish() {
            Err(AppError::Validation(errors)) => {
                let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
                assert_eq!(
                    messages,
                    vec![
                        "quantity must be an integer",
                        "count must be an integer",
                        "box_type is required",
                        "name must be a string",
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
