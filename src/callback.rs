use http::{Method, Request};

use crate::encoding::{is_form_urlencoded, parse_form};
use crate::{CallbackError, CallbackResult, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY};

/// Request token and verifier the provider redirected back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCallback {
    pub oauth_token: String,
    pub oauth_verifier: String,
}

/// Parse the provider's redirect back to the application.
///
/// Both GET (query string) and POST (form body) callbacks are accepted; a
/// value in the form body takes precedence over the same key in the query.
pub fn parse_authorization_callback<B>(
    request: &Request<B>,
) -> CallbackResult<AuthorizationCallback>
where
    B: AsRef<[u8]>,
{
    let mut params = Vec::new();
    if has_form_body(request) {
        params.extend(parse_form(request.body().as_ref())?);
    }
    if let Some(query) = request.uri().query() {
        params.extend(parse_form(query.as_bytes())?);
    }

    let first = |name: &'static str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty())
            .ok_or(CallbackError::MissingParameter(name))
    };

    Ok(AuthorizationCallback {
        oauth_token: first(OAUTH_TOKEN_KEY)?,
        oauth_verifier: first(OAUTH_VERIFIER_KEY)?,
    })
}

fn has_form_body<B>(request: &Request<B>) -> bool {
    let method = request.method();
    (*method == Method::POST || *method == Method::PUT || *method == Method::PATCH)
        && is_form_urlencoded(request.headers())
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;

    use super::*;

    #[test]
    fn parse_get_callback() {
        let req = Request::get("https://app.example.com/callback?oauth_token=hh5s93j4hdidpola&oauth_verifier=hfdp7dh39dks9884")
            .body(Vec::new())
            .unwrap();
        let callback = parse_authorization_callback(&req).unwrap();
        assert_eq!(
            callback,
            AuthorizationCallback {
                oauth_token: "hh5s93j4hdidpola".to_string(),
                oauth_verifier: "hfdp7dh39dks9884".to_string(),
            }
        );
    }

    #[test]
    fn parse_post_callback() {
        let req = Request::post("https://app.example.com/callback?oauth_token=from_query")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(b"oauth_token=from_body&oauth_verifier=v%2B1".to_vec())
            .unwrap();
        let callback = parse_authorization_callback(&req).unwrap();
        assert_eq!(callback.oauth_token, "from_body");
        assert_eq!(callback.oauth_verifier, "v+1");
    }

    #[test]
    fn ignore_body_on_get() {
        let req = Request::get("https://app.example.com/callback?oauth_token=t")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(b"oauth_verifier=v".to_vec())
            .unwrap();
        assert_eq!(
            parse_authorization_callback(&req),
            Err(CallbackError::MissingParameter(OAUTH_VERIFIER_KEY))
        );
    }

    #[test]
    fn missing_or_empty_parameters() {
        let req = Request::get("https://app.example.com/callback?oauth_verifier=v")
            .body(Vec::new())
            .unwrap();
        assert_eq!(
            parse_authorization_callback(&req),
            Err(CallbackError::MissingParameter(OAUTH_TOKEN_KEY))
        );
        let req = Request::get("https://app.example.com/callback?oauth_token=t&oauth_verifier=")
            .body(Vec::new())
            .unwrap();
        assert_eq!(
            parse_authorization_callback(&req),
            Err(CallbackError::MissingParameter(OAUTH_VERIFIER_KEY))
        );
    }

    #[test]
    fn malformed_query() {
        let req = Request::get("https://app.example.com/callback?oauth_token=%x1&oauth_verifier=v")
            .body(Vec::new())
            .unwrap();
        assert!(matches!(
            parse_authorization_callback(&req),
            Err(CallbackError::MalformedQuery(_))
        ));
    }
}
