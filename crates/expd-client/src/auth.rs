//! Typed client for the authentication endpoints.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/auth/tokens` | Exchange credentials for a bearer token |
//! | GET    | `/auth/user` | Profile of the token's owner |
//! | DELETE | `/auth/tokens` | Revoke the current token server-side |

use expd_core::{decode_entity, AuditStamps, EnvelopeShape, Identified, RecordId, ValidationError};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::storage::AuthToken;

const TOKENS_PATH: &str = "auth/tokens";
const USER_PATH: &str = "auth/user";

// -- Types --------------------------------------------------------------------

/// Login credentials. The password is zeroed on drop.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Build credentials, rejecting empty fields before any request is made.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let email = email.into().trim().to_string();
        let password = Zeroizing::new(password.into());
        if email.is_empty() {
            return Err(ValidationError::Empty("email"));
        }
        if password.is_empty() {
            return Err(ValidationError::Empty("password"));
        }
        Ok(Self { email, password })
    }

    /// Login identifier.
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Role as returned by the backend: either a bare code or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRole {
    /// `"role": "admin"`.
    Code(String),
    /// `"role": {"code": "admin", "label": "Administrator"}`.
    Detailed {
        code: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl UserRole {
    /// Machine code of the role.
    pub fn code(&self) -> &str {
        match self {
            Self::Code(code) | Self::Detailed { code, .. } => code,
        }
    }
}

/// Organisation a user belongs to (expertise office, insurer, repairer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntity {
    pub id: RecordId,
    pub name: String,
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    #[serde(default, alias = "full_name")]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub entity: Option<UserEntity>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl User {
    /// Whether the user holds `permission`.
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Whether the user's role code equals `code`.
    pub fn has_role(&self, code: &str) -> bool {
        self.role.as_ref().is_some_and(|r| r.code() == code)
    }
}

impl Identified for User {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

// -- Client -------------------------------------------------------------------

/// Client for the authentication endpoints.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Calls `POST {base}/auth/tokens`. The token is returned, not stored;
    /// persisting it is the session's job. A 401 here means bad credentials
    /// and is reported as [`ApiError::Api`].
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError> {
        let body = self
            .api
            .post_json_anonymous(
                TOKENS_PATH,
                &LoginRequest {
                    email: &credentials.email,
                    password: credentials.password.as_str(),
                },
            )
            .await?;
        extract_token(&body).ok_or_else(|| ApiError::MissingToken {
            endpoint: format!("POST /{TOKENS_PATH}"),
        })
    }

    /// Fetch the profile of the current token's owner.
    ///
    /// Calls `GET {base}/auth/user`; deployments answer bare or wrapped.
    pub async fn user(&self) -> Result<User, ApiError> {
        let body = self.api.get(USER_PATH, &[]).await?;
        decode_entity(EnvelopeShape::Either, &body).map_err(|source| ApiError::Decode {
            endpoint: format!("GET /{USER_PATH}"),
            source,
        })
    }

    /// Revoke the current token server-side.
    ///
    /// Calls `DELETE {base}/auth/tokens`.
    pub async fn revoke(&self) -> Result<(), ApiError> {
        self.api.delete(TOKENS_PATH).await.map(|_| ())
    }
}

/// Find the bearer token in a login response.
///
/// Accepted shapes: `{token}`, `{access_token}`, and either of those nested
/// under `data`.
fn extract_token(body: &[u8]) -> Option<AuthToken> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let pick = |v: &serde_json::Value| {
        ["token", "access_token"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|t| t.as_str()))
            .filter(|t| !t.is_empty())
            .map(AuthToken::new)
    };
    pick(&value).or_else(|| value.get("data").and_then(pick))
}
