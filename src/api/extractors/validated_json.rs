//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// JSON body extractor that runs `validator` rules after deserializing.
///
/// Both malformed bodies and failed rules are reported as
/// `AppError::Validation`, so clients always get the error envelope.
///
/// ```rust,ignore
/// #[derive(Deserialize, Validate)]
/// struct EnrollRequest {
///     #[validate(range(min = 1))]
///     student_id: i32,
/// }
///
/// async fn enroll(ValidatedJson(payload): ValidatedJson<EnrollRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = match Json::<T>::from_request(req, state).await {
            Ok(Json(body)) => body,
            Err(rejection) => return Err(AppError::validation(rejection.body_text())),
        };

        if let Err(errors) = body.validate() {
            return Err(AppError::validation(format_validation_errors(&errors)));
        }
        Ok(ValidatedJson(body))
    }
}

/// One message per failed rule, ordered by field name so responses are stable.
pub(crate) fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages = Vec::new();
    for (field, rules) in fields {
        for rule in rules {
            match &rule.message {
                Some(message) => messages.push(message.to_string()),
                None => messages.push(format!("{} is invalid", field)),
            }
        }
    }
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(range(min = 1, message = "Invalid student id"))]
        student_id: i32,
        #[validate(length(min = 2))]
        code: String,
    }

    #[test]
    fn test_messages_are_ordered_by_field() {
        let errors = Probe { student_id: 0, code: "x".to_string() }
            .validate()
            .unwrap_err();
        assert_eq!(format_validation_errors(&errors), "code is invalid, Invalid student id");
    }
}
