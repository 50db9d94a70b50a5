use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn new(user_id: uuid::Uuid, ttl: chrono::Duration) -> Self {
        Self::expiring_at(user_id, chrono::Utc::now() + ttl)
    }

    pub fn expiring_at(user_id: uuid::Uuid, expires_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: &UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let id = uuid::Uuid::new_v4();
        let token = generate_token(&UserClaims::new(id, chrono::Duration::hours(1)), "key").unwrap();
        let data = process_token(&token, "key").unwrap();
        assert_eq!(data.claims.sub, id.to_string());
    }

    #[test]
    fn token_wrong_key() {
        let claims = UserClaims::new(uuid::Uuid::new_v4(), chrono::Duration::hours(1));
        let token = generate_token(&claims, "key").unwrap();
        assert!(process_token(&token, "other").is_err());
    }

    #[test]
    fn token_expired() {
        let claims = UserClaims::new(uuid::Uuid::new_v4(), chrono::Duration::hours(-2));
        let token = generate_token(&claims, "key").unwrap();
        assert!(process_token(&token, "key").is_err());
    }
}
