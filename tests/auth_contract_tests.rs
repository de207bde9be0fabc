/// Contract tests for the auth token formats and storage behavior
///
/// Note: These are self-contained tests that verify the wire and storage
/// contracts. Full flow coverage lives in the unit tests next to each module.

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        sub: String,
        email: String,
        given_name: String,
        family_name: String,
        role: String,
        iss: String,
        iat: i64,
        exp: i64,
    }

    fn sample_claims(iat: i64, exp: i64) -> Claims {
        Claims {
            sub: "acc-1".to_string(),
            email: "alice@example.com".to_string(),
            given_name: "Alice".to_string(),
            family_name: "Smith".to_string(),
            role: "Owner".to_string(),
            iss: "contactry".to_string(),
            iat,
            exp,
        }
    }

    #[test]
    fn hs512_token_round_trips_identity_claims() {
        use jsonwebtoken::{
            decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
        };

        let secret = b"contract-test-secret-key-32-bytes!";
        let now = chrono::Utc::now().timestamp();
        let claims = sample_claims(now, now + 1800);

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        // Three dot-separated segments
        assert_eq!(token.split('.').count(), 3);

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret),
            &Validation::new(Algorithm::HS512),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, "acc-1");
        assert_eq!(decoded.claims.role, "Owner");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 1800);
    }

    #[test]
    fn expired_token_fails_strict_but_passes_tolerant_decode() {
        use jsonwebtoken::{
            decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
        };

        let secret = b"contract-test-secret-key-32-bytes!";
        let past = chrono::Utc::now().timestamp() - 7200;
        let claims = sample_claims(past, past + 60);

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let strict = Validation::new(Algorithm::HS512);
        assert!(decode::<Claims>(&token, &DecodingKey::from_secret(secret), &strict).is_err());

        let mut tolerant = Validation::new(Algorithm::HS512);
        tolerant.validate_exp = false;
        let decoded =
            decode::<Claims>(&token, &DecodingKey::from_secret(secret), &tolerant).unwrap();
        assert_eq!(decoded.claims.sub, "acc-1");
    }

    #[test]
    fn url_safe_encoding_survives_query_string_transport() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let raw = "header.payload.signature+/=";
        let encoded = URL_SAFE_NO_PAD.encode(raw);

        // Nothing that needs percent-escaping in a URL
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let decoded = URL_SAFE_NO_PAD.decode(&encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), raw);
    }

    #[tokio::test]
    async fn refresh_token_table_holds_one_row_per_account() {
        let db = sqlx::SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            "CREATE TABLE refresh_token (
                id TEXT PRIMARY KEY,
                token TEXT NOT NULL,
                account_id TEXT UNIQUE NOT NULL,
                created_at DATETIME NOT NULL,
                expires_at DATETIME NOT NULL
            )",
        )
        .execute(&db)
        .await
        .unwrap();

        let now = chrono::Utc::now();
        sqlx::query(
            "INSERT INTO refresh_token (id, token, account_id, created_at, expires_at) \
             VALUES ('rt-1', 'first', 'acc-1', ?1, ?2)",
        )
        .bind(now)
        .bind(now + chrono::Duration::days(7))
        .execute(&db)
        .await
        .unwrap();

        // The UNIQUE constraint makes a second insert for the same account fail
        let second_insert = sqlx::query(
            "INSERT INTO refresh_token (id, token, account_id, created_at, expires_at) \
             VALUES ('rt-2', 'second', 'acc-1', ?1, ?2)",
        )
        .bind(now)
        .bind(now + chrono::Duration::days(7))
        .execute(&db)
        .await;
        assert!(second_insert.is_err());

        // Rotation goes through UPDATE instead
        sqlx::query("UPDATE refresh_token SET token = 'second' WHERE account_id = 'acc-1'")
            .execute(&db)
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_token")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let token: String =
            sqlx::query_scalar("SELECT token FROM refresh_token WHERE account_id = 'acc-1'")
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(token, "second");
    }
}
