//! Conversions between the domain [`User`] and the `users` row shapes.
//!
//! All conversions are total and pure. Missing values map through
//! `Option::map`, so an absent row yields an absent user and vice versa.

use crate::domain::{User, UserId, UserPatch};

use super::models::{NewUserRow, UserChangeset, UserRow};

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: Some(UserId::from_uuid(row.id)),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            role: row.role,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

impl From<&User> for NewUserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.map(|id| *id.as_uuid()),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            is_active: user.is_active,
            role: user.role.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&UserPatch> for UserChangeset {
    fn from(patch: &UserPatch) -> Self {
        Self {
            name: patch.name.clone(),
            email: patch.email.clone(),
            password_hash: patch.password_hash.clone(),
            is_active: patch.is_active,
            role: patch.role.clone(),
        }
    }
}

/// Copy the storage-assigned identifier and timestamps into `user`.
pub(crate) fn backfill_generated(user: &mut User, row: &UserRow) {
    user.id = Some(UserId::from_uuid(row.id));
    user.created_at = Some(row.created_at);
    user.updated_at = Some(row.updated_at);
}

#[cfg(test)]
mod tests {
    //! Round-trip coverage for the user mapper.
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26)
            .single()
            .expect("valid timestamp")
    }

    /// What storage does with an insert: fill generated columns.
    fn materialise(row: NewUserRow) -> UserRow {
        let now = fixed_time();
        UserRow {
            id: row.id.unwrap_or_else(Uuid::new_v4),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            role: row.role,
            created_at: row.created_at.unwrap_or(now),
            updated_at: row.updated_at.unwrap_or(now),
            deleted_at: None,
        }
    }

    #[fixture]
    fn fresh_user() -> User {
        User::new("Ada Lovelace", "ada@example.com", "$argon2id$v=19$abc").with_role("admin")
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn round_trip_preserves_non_generated_fields(fresh_user: User, #[case] is_active: bool) {
        let user = fresh_user.with_active(is_active);

        let restored = User::from(materialise(NewUserRow::from(&user)));

        assert_eq!(restored.name, user.name);
        assert_eq!(restored.email, user.email);
        assert_eq!(restored.password_hash, user.password_hash);
        assert_eq!(restored.is_active, user.is_active);
        assert_eq!(restored.role, user.role);
        assert!(restored.id.is_some());
        assert!(restored.created_at.is_some());
        assert!(restored.updated_at.is_some());
    }

    #[rstest]
    fn round_trip_is_exact_for_persisted_users(fresh_user: User) {
        let mut user = fresh_user.with_id(UserId::random());
        user.created_at = Some(fixed_time());
        user.updated_at = Some(fixed_time());

        let restored = User::from(materialise(NewUserRow::from(&user)));

        assert_eq!(restored, user);
    }

    #[rstest]
    fn unpersisted_user_leaves_generated_columns_to_storage(fresh_user: User) {
        let row = NewUserRow::from(&fresh_user);

        assert!(row.id.is_none());
        assert!(row.created_at.is_none());
        assert!(row.updated_at.is_none());
    }

    #[rstest]
    fn absent_values_stay_absent() {
        assert_eq!(None::<UserRow>.map(User::from), None);
        assert_eq!(None::<&User>.map(NewUserRow::from), None);
    }

    #[rstest]
    fn patch_maps_only_supplied_fields() {
        let patch = UserPatch::for_user(UserId::random())
            .email("new@example.com")
            .is_active(false);

        let changeset = UserChangeset::from(&patch);

        assert_eq!(
            changeset,
            UserChangeset {
                email: Some("new@example.com".to_owned()),
                is_active: Some(false),
                ..UserChangeset::default()
            }
        );
    }

    #[rstest]
    fn backfill_copies_generated_values_only(fresh_user: User) {
        let mut user = fresh_user;
        let row = materialise(NewUserRow::from(&user));
        let untouched_name = user.name.clone();

        backfill_generated(&mut user, &row);

        assert_eq!(user.id, Some(UserId::from_uuid(row.id)));
        assert_eq!(user.created_at, Some(row.created_at));
        assert_eq!(user.updated_at, Some(row.updated_at));
        assert_eq!(user.name, untouched_name);
    }
}
