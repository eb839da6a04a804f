// ABOUTME: Structured JWT claims carried by linkstash bearer tokens.
// ABOUTME: Identity is keyed by stable user id, with an optional expiry.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Token claims. `sub` is the user's stable id rather than the mutable
/// username, so renames do not invalidate outstanding tokens. `exp` is
/// absent when no token TTL is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Build claims for a user, issued now, expiring after `ttl_secs`
    /// when a TTL is configured.
    pub fn for_user(user_id: Ulid, ttl_secs: Option<i64>) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat,
            exp: ttl_secs.map(|ttl| iat + ttl),
        }
    }

    /// Whether the token has expired as of now. Tokens without an
    /// expiry never expire.
    pub fn is_expired(&self) -> bool {
        match self.exp {
            Some(exp) => exp < Utc::now().timestamp(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_without_ttl_never_expire() {
        let claims = Claims::for_user(Ulid::new(), None);
        assert!(claims.exp.is_none());
        assert!(!claims.is_expired());
    }

    #[test]
    fn claims_with_ttl_set_expiry() {
        let claims = Claims::for_user(Ulid::new(), Some(900));
        assert_eq!(claims.exp, Some(claims.iat + 900));
        assert!(!claims.is_expired());
    }

    #[test]
    fn claims_in_the_past_are_expired() {
        let mut claims = Claims::for_user(Ulid::new(), Some(900));
        claims.exp = Some(Utc::now().timestamp() - 10);
        assert!(claims.is_expired());
    }

    #[test]
    fn claims_sub_round_trips_user_id() {
        let user_id = Ulid::new();
        let claims = Claims::for_user(user_id, None);
        assert_eq!(claims.sub.parse::<Ulid>().unwrap(), user_id);
    }
}
