use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::RecordId;
use crate::schema::{self, Field, FieldAlias};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name_c", default)]
    pub name: String,
    #[serde(rename = "Email_c", default)]
    pub email: String,
    #[serde(rename = "Role_c", default)]
    pub role: String,
    #[serde(rename = "Avatar_c", default)]
    pub avatar: Option<String>,
}

impl TeamMember {
    /// Up to two initials, used where the avatar image cannot be shown.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

pub const MEMBER_ALIASES: &[FieldAlias] = &[
    FieldAlias { canonical: "Name_c", legacy: "name" },
    FieldAlias { canonical: "Email_c", legacy: "email" },
    FieldAlias { canonical: "Role_c", legacy: "role" },
    FieldAlias { canonical: "Avatar_c", legacy: "avatar" },
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberInput {
    #[serde(rename = "Name_c", default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(rename = "Email_c", default, skip_serializing_if = "Field::is_absent")]
    pub email: Field<String>,
    #[serde(rename = "Role_c", default, skip_serializing_if = "Field::is_absent")]
    pub role: Field<String>,
    #[serde(rename = "Avatar_c", default, skip_serializing_if = "Field::is_absent")]
    pub avatar: Field<String>,
}

impl TeamMemberInput {
    pub fn from_json(input: &Value) -> Result<Self, serde_json::Error> {
        schema::from_loose(input, MEMBER_ALIASES)
    }
}
