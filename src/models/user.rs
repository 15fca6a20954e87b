//! Users, the current profile, roles and groups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Method;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::{DataObject, Response};
use crate::error::Result;
use crate::models::file::File;
use crate::pagination::paginate_bodies;
use crate::traits::{Get, List, Save};

/// Accept ids the server sends either as strings or as numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> core::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

/// A user account.
///
/// The account id, user name and timestamps are read-only. Users are never
/// deleted, only disabled through `is_enabled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    user_id: String,
    user_name: String,
    #[serde(default)]
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_enabled: Option<bool>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub organization: String,
    #[serde(skip)]
    picture: Option<File>,
}

/// Fields of a user account to create.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub organization: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserChanges<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    is_enabled: Option<bool>,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    country: &'a str,
    organization: &'a str,
}

#[derive(Serialize)]
struct Attributes<T> {
    attributes: T,
}

impl User {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[tracing::instrument(skip(client))]
    pub async fn create(client: &SignalsClient, user: &NewUser) -> Result<Self> {
        let body = DataObject {
            data: Attributes { attributes: user },
        };
        let request = ApiRequest::new(Method::POST, ["users"]).json(&body)?;
        let response = client.call(request).await?;
        Response::<User>::decode(&response.content)?.single()
    }

    /// Body of the update: only the editable fields.
    pub fn save_payload(&self) -> Result<Value> {
        let body = DataObject {
            data: Attributes {
                attributes: UserChanges {
                    is_enabled: self.is_enabled,
                    email: &self.email,
                    first_name: &self.first_name,
                    last_name: &self.last_name,
                    country: &self.country,
                    organization: &self.organization,
                },
            },
        };
        Ok(serde_json::to_value(&body)?)
    }

    /// Profile picture, fetched on first access. `None` when the user has
    /// no picture.
    pub async fn picture(&mut self, client: &SignalsClient) -> Result<Option<&File>> {
        if self.picture.is_none() {
            let response = client.get(["users", self.user_id.as_str(), "picture"]).await?;
            if response.content.is_empty() {
                return Ok(None);
            }
            let content_type = response.content_type().unwrap_or_default().to_string();
            let name = picture_name(&self.first_name, &self.last_name, &content_type);
            self.picture = Some(File::new(name, response.content, content_type));
        }
        Ok(self.picture.as_ref())
    }
}

fn picture_name(first_name: &str, last_name: &str, content_type: &str) -> String {
    let essence = content_type.split(';').next().unwrap_or_default();
    let subtype = essence.rsplit('/').next().unwrap_or_default().trim();
    format!("{first_name}_{last_name}.{subtype}")
}

#[async_trait]
impl Get for User {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SignalsClient, user_id: String) -> Result<Self> {
        let response = client.get(["users", user_id.as_str()]).await?;
        Response::<User>::decode(&response.content)?.single()
    }
}

#[async_trait]
impl List for User {
    type Query = ();

    fn get_list<'a>(client: &'a SignalsClient, _query: &()) -> BoxStream<'a, Result<Self>> {
        paginate_bodies(client, ApiRequest::get(["users"])).boxed()
    }
}

#[async_trait]
impl Save for User {
    #[tracing::instrument(skip(self, client), fields(user_id = %self.user_id))]
    async fn save(&self, client: &SignalsClient) -> Result<()> {
        let request = ApiRequest::new(Method::PATCH, ["users", self.user_id.as_str()])
            .json(&self.save_payload()?)?;
        client.call(request).await?;
        Ok(())
    }
}

fn allowed() -> bool {
    true
}

/// What a role permits. Privileges the server omits are granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Privileges {
    #[serde(default = "allowed")]
    pub can_move_experiments: bool,
    #[serde(default = "allowed")]
    pub can_manage_system_templates: bool,
    #[serde(default = "allowed")]
    pub can_trash_requests: bool,
    #[serde(default = "allowed")]
    pub can_trash_samples: bool,
    #[serde(default = "allowed")]
    pub can_share: bool,
    #[serde(default = "allowed")]
    pub can_add_materials: bool,
    #[serde(default = "allowed")]
    pub can_trash_experiments: bool,
    #[serde(default = "allowed")]
    pub can_trash_materials: bool,
    #[serde(default = "allowed")]
    pub can_trash_notebooks: bool,
    #[serde(default = "allowed")]
    pub can_view_materials: bool,
    #[serde(default = "allowed")]
    pub can_manage_material_libraries: bool,
    #[serde(default = "allowed")]
    pub can_share_templates: bool,
    #[serde(default = "allowed")]
    pub can_manage_attributes: bool,
    #[serde(default = "allowed")]
    pub can_manage_groups: bool,
    #[serde(default = "allowed")]
    pub can_search_eln_archive: bool,
    #[serde(default = "allowed")]
    pub can_configure: bool,
    #[serde(default = "allowed")]
    pub can_edit_materials: bool,
}

/// A role assigned to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub privileges: Privileges,
}

#[async_trait]
impl Get for Role {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SignalsClient, role_id: String) -> Result<Self> {
        let response = client.get(["roles", role_id.as_str()]).await?;
        Response::<Role>::decode(&response.content)?.single()
    }
}

#[async_trait]
impl List for Role {
    type Query = ();

    fn get_list<'a>(client: &'a SignalsClient, _query: &()) -> BoxStream<'a, Result<Self>> {
        paginate_bodies(client, ApiRequest::get(["roles"])).boxed()
    }
}

/// A tenant license held by the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
    pub valid: bool,
    pub has_service_expired: bool,
    pub has_user_found: bool,
    pub has_user_activated: bool,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "userId")]
    id: String,
    created_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub tenant: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub licenses: Vec<License>,
}

impl Profile {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Profile of the user the API key belongs to.
    #[tracing::instrument(skip(client))]
    pub async fn get_current(client: &SignalsClient) -> Result<Self> {
        let response = client.get(["profiles", "me"]).await?;
        Response::<Profile>::decode(&response.content)?.single()
    }
}

/// A user group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    eid: Option<String>,
    id: String,
    #[serde(default)]
    is_system: bool,
    created_at: DateTime<Utc>,
    edited_at: DateTime<Utc>,
    #[serde(default)]
    digest: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Fields of a group to create.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub is_system: bool,
    pub name: String,
    pub description: String,
}

impl Group {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn eid(&self) -> Option<&str> {
        self.eid.as_deref()
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn edited_at(&self) -> DateTime<Utc> {
        self.edited_at
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    #[tracing::instrument(skip(client))]
    pub async fn create(client: &SignalsClient, group: &NewGroup) -> Result<Self> {
        let body = DataObject {
            data: Attributes { attributes: group },
        };
        let request = ApiRequest::new(Method::POST, ["groups"]).json(&body)?;
        let response = client.call(request).await?;
        Response::<Group>::decode(&response.content)?.single()
    }
}

#[async_trait]
impl Get for Group {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SignalsClient, group_id: String) -> Result<Self> {
        let response = client.get(["groups", group_id.as_str()]).await?;
        Response::<Group>::decode(&response.content)?.single()
    }
}

#[async_trait]
impl List for Group {
    type Query = ();

    fn get_list<'a>(client: &'a SignalsClient, _query: &()) -> BoxStream<'a, Result<Self>> {
        paginate_bodies(client, ApiRequest::get(["groups"])).boxed()
    }
}
