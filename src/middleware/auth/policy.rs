//! Request interception policy, independent of axum.
//!
//! received → classified → exempt: forward
//!                       → protected: extract bearer → verify → forward with identity | reject
//!
//! The axum middleware in `access` only translates `GateDecision` into a response.

use crate::services::auth::{VerifiedToken, VerifyToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Exempt,
    Protected,
}

/// Why a protected request was turned away. Logged, never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingToken,
    InvalidToken,
    EmptySubject,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing bearer token",
            Self::InvalidToken => "invalid or expired token",
            Self::EmptySubject => "token has empty subject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Exempt path: pass through untouched.
    Forward,
    /// Protected path with a valid token.
    Authenticated(VerifiedToken),
    Reject(RejectReason),
}

/// Static partition of request paths.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    exempt_paths: Vec<String>,
    protected_prefixes: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        // `/admin` itself is the page shell; it performs its own client-side check.
        Self::new(
            ["/healthz", "/auth/login", "/auth/validate", "/admin"],
            ["/admin"],
        )
    }
}

impl RoutePolicy {
    pub fn new<E, P>(exempt_paths: E, protected_prefixes: P) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            exempt_paths: exempt_paths.into_iter().map(Into::into).collect(),
            protected_prefixes: protected_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact allow-list match, or no protected prefix → exempt.
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.exempt_paths.iter().any(|p| p == path) {
            return RouteClass::Exempt;
        }
        if self
            .protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            RouteClass::Protected
        } else {
            RouteClass::Exempt
        }
    }

    pub fn evaluate(
        &self,
        path: &str,
        authorization: Option<&str>,
        verifier: &dyn VerifyToken,
    ) -> GateDecision {
        if self.classify(path) == RouteClass::Exempt {
            return GateDecision::Forward;
        }

        let Some(token) = authorization.and_then(bearer_token) else {
            return GateDecision::Reject(RejectReason::MissingToken);
        };

        match verifier.verify(token) {
            Some(v) if v.subject.is_empty() => GateDecision::Reject(RejectReason::EmptySubject),
            Some(v) => GateDecision::Authenticated(v),
            None => GateDecision::Reject(RejectReason::InvalidToken),
        }
    }
}

/// Outcome of parsing an `Authorization` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerParse<'a> {
    Token(&'a str),
    /// Header present but not `Bearer <token>`.
    WrongScheme,
}

/// `Bearer <token>`, scheme case-insensitive, split on the first space.
pub fn parse_bearer(header: &str) -> BearerParse<'_> {
    match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = rest.trim();
            if token.is_empty() {
                BearerParse::WrongScheme
            } else {
                BearerParse::Token(token)
            }
        }
        _ => BearerParse::WrongScheme,
    }
}

pub fn bearer_token(header: &str) -> Option<&str> {
    match parse_bearer(header) {
        BearerParse::Token(t) => Some(t),
        BearerParse::WrongScheme => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts exactly one token string; `"blank"` yields an empty subject.
    struct StubVerifier;

    impl VerifyToken for StubVerifier {
        fn verify(&self, token: &str) -> Option<VerifiedToken> {
            let subject = match token {
                "good" => "alice",
                "blank" => "",
                _ => return None,
            };
            Some(VerifiedToken {
                subject: subject.to_string(),
                issued_at: 0,
                expires_at: 1,
                jti: None,
            })
        }
    }

    #[test]
    fn classification_follows_allow_list_then_prefixes() {
        let policy = RoutePolicy::default();

        assert_eq!(policy.classify("/healthz"), RouteClass::Exempt);
        assert_eq!(policy.classify("/auth/login"), RouteClass::Exempt);
        assert_eq!(policy.classify("/auth/validate"), RouteClass::Exempt);
        assert_eq!(policy.classify("/admin"), RouteClass::Exempt);
        assert_eq!(policy.classify("/"), RouteClass::Exempt);
        assert_eq!(policy.classify("/static/app.js"), RouteClass::Exempt);

        assert_eq!(policy.classify("/admin/"), RouteClass::Protected);
        assert_eq!(policy.classify("/admin/me"), RouteClass::Protected);
        assert_eq!(policy.classify("/admin/upload"), RouteClass::Protected);
        // prefix match is plain string prefix
        assert_eq!(policy.classify("/administrator"), RouteClass::Protected);
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER abc "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Basic YWxpY2U6cHc="), None);
        assert_eq!(bearer_token("Bearerabc"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn exempt_path_forwards_without_token() {
        let policy = RoutePolicy::default();
        assert_eq!(
            policy.evaluate("/healthz", None, &StubVerifier),
            GateDecision::Forward
        );
        assert_eq!(
            policy.evaluate("/admin", Some("Bearer garbage"), &StubVerifier),
            GateDecision::Forward
        );
    }

    #[test]
    fn protected_path_requires_valid_token() {
        let policy = RoutePolicy::default();

        assert_eq!(
            policy.evaluate("/admin/me", None, &StubVerifier),
            GateDecision::Reject(RejectReason::MissingToken)
        );
        assert_eq!(
            policy.evaluate("/admin/me", Some("Token good"), &StubVerifier),
            GateDecision::Reject(RejectReason::MissingToken)
        );
        assert_eq!(
            policy.evaluate("/admin/me", Some("Bearer garbage"), &StubVerifier),
            GateDecision::Reject(RejectReason::InvalidToken)
        );
        assert_eq!(
            policy.evaluate("/admin/me", Some("Bearer blank"), &StubVerifier),
            GateDecision::Reject(RejectReason::EmptySubject)
        );

        match policy.evaluate("/admin/me", Some("Bearer good"), &StubVerifier) {
            GateDecision::Authenticated(v) => assert_eq!(v.subject, "alice"),
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn custom_policy() {
        let policy = RoutePolicy::new(["/api/public"], ["/api"]);
        assert_eq!(policy.classify("/api/public"), RouteClass::Exempt);
        assert_eq!(policy.classify("/api/public/x"), RouteClass::Protected);
        assert_eq!(policy.classify("/other"), RouteClass::Exempt);
    }
}
