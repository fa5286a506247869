use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field names a client may set, in the order they are checked on create.
pub const USER_FIELDS: [&str; 3] = ["username", "age", "hobbies"];

/// A stored user. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub age: u32,
    pub hobbies: Vec<String>,
}

/// Request body for `POST /users`. A client supplied `id` is dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub age: u32,
    pub hobbies: Vec<String>,
}

/// Request body for `PUT /users/{id}`. Absent or `null` fields are left alone;
/// `id` and unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub hobbies: Option<Vec<String>>,
}

impl User {
    pub fn from_request(id: Uuid, req: CreateUserRequest) -> Self {
        Self {
            id,
            username: req.username,
            age: req.age,
            hobbies: req.hobbies,
        }
    }

    /// Applies every field present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: UpdateUserRequest) {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(hobbies) = patch.hobbies {
            self.hobbies = hobbies;
        }
    }
}
