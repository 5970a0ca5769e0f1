//! Normalized identity records.
//!
//! The provider's profile uses its own field names and a localized gender
//! vocabulary. [`IdentityRecord`] is the shape returned from `/oauth2.0/me`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::upstream::client::USER_INFO_PATH;
use crate::upstream::UpstreamError;

pub const PROVIDER: &str = "qq";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Map the provider's gender value. Anything unrecognized is `Unknown`.
    pub fn from_source(value: Option<&str>) -> Self {
        match value {
            Some("男") => Gender::Male,
            Some("女") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    pub sub: String,
    pub name: String,
    pub nickname: String,
    pub picture: String,
    pub avatar: String,
    pub provider: &'static str,
    pub gender: Gender,
}

impl IdentityRecord {
    /// Build a record from a `get_user_info` body.
    ///
    /// `nickname` and `figureurl_qq_2` are required; `gender` is optional.
    pub fn from_profile(openid: &str, profile: &Map<String, Value>) -> Result<Self, UpstreamError> {
        let nickname = string_field(profile, "nickname")?;
        let picture = string_field(profile, "figureurl_qq_2")?;
        let gender = Gender::from_source(profile.get("gender").and_then(Value::as_str));

        Ok(Self {
            sub: openid.to_string(),
            name: nickname.to_string(),
            nickname: nickname.to_string(),
            picture: picture.to_string(),
            avatar: picture.to_string(),
            provider: PROVIDER,
            gender,
        })
    }
}

fn string_field<'a>(profile: &'a Map<String, Value>, field: &str) -> Result<&'a str, UpstreamError> {
    profile
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| UpstreamError::missing_field(USER_INFO_PATH, field))
}
