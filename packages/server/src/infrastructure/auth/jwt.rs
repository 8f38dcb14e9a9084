//! JWT を使った IdentityResolver 実装
//!
//! ## 責務
//!
//! - HS256 署名と有効期限の検証
//! - トークンの subject から公開アイデンティティへの解決
//!
//! ## 設計ノート
//!
//! 検証は参照のみで、いかなる永続エンティティも変更しません。署名・形式の
//! 不正は InvalidToken、期限切れは ExpiredToken、subject のユーザーが
//! 既に存在しない場合は IdentityNotFound に対応します。
//!
//! ユーザー管理（サインアップ等）はこのサービスの外側の責務のため、
//! ユーザーディレクトリは構築時に注入される固定マップです。

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, Identity, IdentityResolver, UserId};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// subject（ユーザー ID）
    pub sub: String,
    /// 有効期限（Unix 秒）
    pub exp: u64,
    /// 発行時刻（Unix 秒）
    pub iat: u64,
}

/// ユーザーへトークンを発行する（デモ seed・テスト用）
pub fn issue_token(
    secret: &str,
    user_id: &UserId,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_secs();

    let claims = Claims {
        sub: user_id.as_str().to_string(),
        exp: now + ttl_secs,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

/// JWT を使った IdentityResolver 実装
pub struct JwtIdentityResolver {
    decoding_key: DecodingKey,
    validation: Validation,
    /// user_id → Identity（構築時に注入）
    users: HashMap<String, Identity>,
}

impl JwtIdentityResolver {
    /// 新しい JwtIdentityResolver を作成
    ///
    /// # Arguments
    ///
    /// * `secret` - HS256 の共有シークレット
    /// * `users` - 解決可能なユーザーの一覧
    pub fn new(secret: &str, users: Vec<Identity>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation: Validation::default(),
            users: users
                .into_iter()
                .map(|identity| (identity.user_id.as_str().to_string(), identity))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                    _ => AuthError::InvalidToken,
                }
            })?;

        self.users
            .get(&token_data.claims.sub)
            .cloned()
            .ok_or(AuthError::IdentityNotFound)
    }
}
