//! User data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to newly constructed users unless the caller picks another.
pub const DEFAULT_ROLE: &str = "user";

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// True for the all-zero UUID, which never names a stored user.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// ## Invariants
/// - `id`, `created_at` and `updated_at` are `None` until the user has been
///   persisted; storage assigns them on creation.
/// - Once assigned, `id` never changes.
/// - `email` is unique across all live users. Uniqueness is enforced by
///   storage, not by this type.
///
/// The password hash is accepted on deserialisation but never serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build an active, not yet persisted user with the default role.
    ///
    /// # Examples
    /// ```
    /// use user_store::domain::User;
    ///
    /// let user = User::new("Ada Lovelace", "ada@example.com", "$argon2id$hash");
    /// assert!(user.id.is_none());
    /// assert!(user.is_active);
    /// assert_eq!(user.role, "user");
    /// ```
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_active: true,
            role: DEFAULT_ROLE.to_owned(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Use a caller-chosen identifier instead of a storage-generated one.
    #[must_use]
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    /// Override the role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Override the active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// True once storage has assigned an identifier.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Explicit partial update for a stored user.
///
/// Every `None` field is left untouched; every `Some` field is written, even
/// when it holds an empty string or `false`. This avoids guessing intent from
/// zero values.
///
/// # Examples
/// ```
/// use user_store::domain::{UserId, UserPatch};
///
/// let patch = UserPatch::for_user(UserId::random())
///     .email("new@example.com")
///     .is_active(false);
/// assert!(!patch.is_empty());
/// assert_eq!(patch.name, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<String>,
}

impl UserPatch {
    /// Start an empty patch targeting `id`.
    pub fn for_user(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the password hash.
    #[must_use]
    pub fn password_hash(mut self, password_hash: impl Into<String>) -> Self {
        self.password_hash = Some(password_hash.into());
        self
    }

    /// Set the active flag.
    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Set the role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Target identifier, ignoring the nil UUID.
    pub fn target(&self) -> Option<UserId> {
        self.id.filter(|id| !id.is_nil())
    }

    /// True when no mutable field is supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.is_active.is_none()
            && self.role.is_none()
    }
}

impl From<&User> for UserPatch {
    /// Patch that rewrites every mutable field of `user`.
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            password_hash: Some(user.password_hash.clone()),
            is_active: Some(user.is_active),
            role: Some(user.role.clone()),
        }
    }
}
