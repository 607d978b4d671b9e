use serde::Deserialize;
use validator::Validate;

use crate::validation::not_blank;

/// Body for `POST` and `PUT`. Author and ad come from the request, never the body.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewWrite {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub text: Option<String>,
}

/// Body for `PATCH`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewPatch {
    #[validate(custom(function = "not_blank"))]
    pub text: Option<String>,
}
