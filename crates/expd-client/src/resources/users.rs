//! Back-office user accounts (administration screen). Records share the
//! profile type returned by `GET /auth/user`.

use expd_core::{EnvelopeShape, RecordId};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::resource::Resource;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<RecordId>,
}

/// `users` resource.
#[derive(Debug)]
pub enum Users {}

impl Resource for Users {
    const NAME: &'static str = "user";
    const PATH: &'static str = "users";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Either;
    type Record = User;
    type Create = UserInput;
    type Update = UserInput;
}
