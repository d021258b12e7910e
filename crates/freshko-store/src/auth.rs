//! # Accounts & Sessions
//!
//! Login, logout, federated sign-in, and user CRUD.
//!
//! ## Credential Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Two Ways In, No Third                               │
//! │                                                                         │
//! │  login(email, password)                                                 │
//! │       └── Credential::Password { hash } → argon2 verify                 │
//! │       └── Credential::Federated        → ALWAYS InvalidCredentials      │
//! │                                                                         │
//! │  login_federated(VerifiedIdentity)                                      │
//! │       └── identity was verified UPSTREAM; the store only maps it to     │
//! │           a user record and a session                                   │
//! │                                                                         │
//! │  There is no sentinel password. A federated account simply has no       │
//! │  password to guess.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use freshko_core::validation::{validate_email, validate_new_user};
use freshko_core::{
    CoreError, CoreResult, Credential, NewUser, Role, User, UserPatch, VerifiedIdentity,
};

use crate::store::DomainStore;

// =============================================================================
// Credential Helpers
// =============================================================================

/// Hashes a password into PHC string format.
pub(crate) fn hash_password(password: &str) -> CoreResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
}

/// Verifies a password against a stored PHC hash.
/// An unparseable hash verifies as false, not as an error.
fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Splits an identity provider's display name into first/last.
fn split_display_name(display_name: &str) -> (String, String) {
    let mut parts = display_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

// =============================================================================
// Session Actions
// =============================================================================

impl DomainStore {
    /// Signs in a local account.
    ///
    /// The error is `InvalidCredentials` for every failure mode - unknown
    /// email, wrong password, federated account - so the response never
    /// reveals which part was wrong.
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<User> {
        let key = email.trim().to_lowercase();

        let user = self
            .with_state(|state| state.users.iter().find(|u| u.email_key() == key).cloned())
            .ok_or(CoreError::InvalidCredentials)?;

        match &user.credential {
            Credential::Password { hash } => {
                if !verify_password(password, hash) {
                    return Err(CoreError::InvalidCredentials);
                }
            }
            // Federated accounts have no password at all
            Credential::Federated => return Err(CoreError::InvalidCredentials),
        }

        self.with_state_mut(|state| state.current_user = Some(user.id.clone()));
        self.persist_session().await;

        info!(user = %user.email, "Signed in");
        Ok(user)
    }

    /// Signs in (creating if necessary) an externally-verified account.
    ///
    /// The caller hands over a [`VerifiedIdentity`] only after the upstream
    /// provider confirmed it; the store never verifies identity itself.
    pub async fn login_federated(&self, identity: VerifiedIdentity) -> CoreResult<User> {
        validate_email(identity.email())?;
        let key = identity.email().trim().to_lowercase();

        let (user, created) = self.with_state_mut(|state| {
            if let Some(existing) = state.users.iter().find(|u| u.email_key() == key) {
                let user = existing.clone();
                state.current_user = Some(user.id.clone());
                (user, false)
            } else {
                let (first_name, last_name) = split_display_name(identity.display_name());
                let user = User {
                    id: Uuid::new_v4().to_string(),
                    first_name,
                    last_name,
                    email: identity.email().trim().to_string(),
                    phone: None,
                    role: Role::User,
                    credential: Credential::Federated,
                    avatar: None,
                    created_at: Utc::now(),
                };
                state.users.push(user.clone());
                state.current_user = Some(user.id.clone());
                (user, true)
            }
        });

        if created {
            info!(user = %user.email, "Federated account created");
            self.persist_users().await;
        }
        self.persist_session().await;

        Ok(user)
    }

    /// Clears the session.
    pub async fn logout(&self) {
        self.with_state_mut(|state| state.current_user = None);
        self.persist_session().await;
        debug!("Signed out");
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.with_state(|state| state.signed_in_user().cloned())
    }

    // =========================================================================
    // User CRUD
    // =========================================================================

    /// Registers a new local account.
    pub async fn create_user(&self, input: NewUser) -> CoreResult<User> {
        validate_new_user(&input)?;

        let hash = hash_password(&input.password)?;
        let key = input.email.trim().to_lowercase();

        let user = self.with_state_mut(|state| {
            // Case-folded uniqueness: Anna@x and anna@X are the same account
            if state.users.iter().any(|u| u.email_key() == key) {
                return Err(CoreError::DuplicateEmail {
                    email: input.email.clone(),
                });
            }

            let user = User {
                id: Uuid::new_v4().to_string(),
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                email: input.email.trim().to_string(),
                phone: input.phone,
                role: input.role,
                credential: Credential::Password { hash },
                avatar: None,
                created_at: Utc::now(),
            };
            state.users.push(user.clone());
            Ok(user)
        })?;

        self.persist_users().await;

        info!(user = %user.email, "Account created");
        Ok(user)
    }

    /// Field-merges a patch into a user.
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> CoreResult<User> {
        if let Some(email) = patch.email.as_deref() {
            validate_email(email)?;
        }

        let updated = self.with_state_mut(|state| {
            if let Some(email) = patch.email.as_deref() {
                let key = email.trim().to_lowercase();
                if state.users.iter().any(|u| u.id != id && u.email_key() == key) {
                    return Err(CoreError::DuplicateEmail {
                        email: email.to_string(),
                    });
                }
            }

            let user = state
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| CoreError::not_found("User", id))?;

            if let Some(v) = patch.first_name {
                user.first_name = v;
            }
            if let Some(v) = patch.last_name {
                user.last_name = v;
            }
            if let Some(v) = patch.email {
                user.email = v.trim().to_string();
            }
            if let Some(v) = patch.phone {
                user.phone = Some(v);
            }
            if let Some(v) = patch.avatar {
                user.avatar = Some(v);
            }
            if let Some(v) = patch.role {
                user.role = v;
            }

            Ok(user.clone())
        })?;

        self.persist_users().await;
        Ok(updated)
    }

    /// Removes a user. Deleting the signed-in user also clears the session.
    pub async fn delete_user(&self, id: &str) -> CoreResult<()> {
        let cleared_session = self.with_state_mut(|state| {
            let idx = state
                .users
                .iter()
                .position(|u| u.id == id)
                .ok_or_else(|| CoreError::not_found("User", id))?;

            state.users.remove(idx);

            if state.current_user.as_deref() == Some(id) {
                state.current_user = None;
                Ok::<bool, CoreError>(true)
            } else {
                Ok::<bool, CoreError>(false)
            }
        })?;

        self.persist_users().await;
        if cleared_session {
            self.persist_session().await;
        }

        info!(user = id, "Account deleted");
        Ok(())
    }

    /// All users (admin view).
    pub fn get_users(&self) -> Vec<User> {
        self.with_state(|state| state.users.clone())
    }

    /// Looks up a user by id.
    pub fn get_user(&self, id: &str) -> Option<User> {
        self.with_state(|state| state.users.iter().find(|u| u.id == id).cloned())
    }

    /// Looks up a user by case-folded email.
    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        let key = email.trim().to_lowercase();
        self.with_state(|state| state.users.iter().find(|u| u.email_key() == key).cloned())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::test_store;

    fn registration(email: &str) -> NewUser {
        NewUser {
            first_name: "Anna".to_string(),
            last_name: "Kovacs".to_string(),
            email: email.to_string(),
            phone: None,
            password: "correct horse battery".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = test_store().await;

        store.create_user(registration("anna@freshko.test")).await.unwrap();

        let user = store
            .login("anna@freshko.test", "correct horse battery")
            .await
            .unwrap();
        assert_eq!(user.email, "anna@freshko.test");
        assert_eq!(store.current_user().unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password_fails() {
        let store = test_store().await;
        store.create_user(registration("anna@freshko.test")).await.unwrap();

        let err = store.login("anna@freshko.test", "nope").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
        assert!(store.current_user().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_differs_only_by_case() {
        let store = test_store().await;
        store.create_user(registration("anna@freshko.test")).await.unwrap();

        let err = store
            .create_user(registration("ANNA@Freshko.Test"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEmail { .. }));

        // Store unchanged: still exactly one anna
        assert_eq!(
            store
                .get_users()
                .iter()
                .filter(|u| u.email_key() == "anna@freshko.test")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_federated_login_creates_account() {
        let store = test_store().await;

        let identity = VerifiedIdentity::new("maria@provider.test", "Maria Silva Costa");
        let user = store.login_federated(identity).await.unwrap();

        assert_eq!(user.first_name, "Maria");
        assert_eq!(user.last_name, "Silva Costa");
        assert_eq!(user.credential, Credential::Federated);
        assert!(store.current_user().is_some());

        // Second federated login reuses the account
        let again = store
            .login_federated(VerifiedIdentity::new("maria@provider.test", "Maria"))
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
    }

    #[tokio::test]
    async fn test_federated_account_cannot_password_login() {
        let store = test_store().await;
        store
            .login_federated(VerifiedIdentity::new("maria@provider.test", "Maria"))
            .await
            .unwrap();
        store.logout().await;

        // No constant, sentinel or empty string opens a federated account
        for guess in ["", "federated", "oauth", "maria@provider.test"] {
            let err = store.login("maria@provider.test", guess).await.unwrap_err();
            assert!(matches!(err, CoreError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn test_delete_signed_in_user_clears_session() {
        let store = test_store().await;
        let user = store.create_user(registration("anna@freshko.test")).await.unwrap();
        store
            .login("anna@freshko.test", "correct horse battery")
            .await
            .unwrap();

        store.delete_user(&user.id).await.unwrap();

        assert!(store.current_user().is_none());
        assert!(store.get_user(&user.id).is_none());
    }

    #[tokio::test]
    async fn test_update_user_merges_fields() {
        let store = test_store().await;
        let user = store.create_user(registration("anna@freshko.test")).await.unwrap();

        let patch = UserPatch {
            phone: Some("+36 30 555 0101".to_string()),
            ..Default::default()
        };
        let updated = store.update_user(&user.id, patch).await.unwrap();

        assert_eq!(updated.phone.as_deref(), Some("+36 30 555 0101"));
        assert_eq!(updated.first_name, "Anna"); // untouched
    }

    #[tokio::test]
    async fn test_update_user_email_collision_fails() {
        let store = test_store().await;
        store.create_user(registration("anna@freshko.test")).await.unwrap();
        let other = store.create_user(registration("ben@freshko.test")).await.unwrap();

        let patch = UserPatch {
            email: Some("Anna@freshko.test".to_string()),
            ..Default::default()
        };
        let err = store.update_user(&other.id, patch).await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let store = test_store().await;
        store.create_user(registration("anna@freshko.test")).await.unwrap();
        store
            .login("anna@freshko.test", "correct horse battery")
            .await
            .unwrap();

        store.logout().await;
        assert!(store.current_user().is_none());
    }
}
