//! Password hashing, login and the one-time administrator bootstrap.
//!
//! Passwords are stored as `pbkdf2:sha256:<iterations>$<salt>$<hash>` with a
//! random per-password salt. Verification never reports why it failed; a
//! malformed stored hash and a wrong password are indistinguishable.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::Hmac;
use log::{info, warn};
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;

use crate::error::AcademicError;
use crate::repository::user_repository::UserRepository;
use crate::types::{Role, User};

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 260_000;
const KEY_LENGTH: usize = 32;

/// Username and password of the administrator account created on first run.
/// This is a bootstrap credential only; the operator is expected to rotate
/// it immediately after the first login.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin.user";
const BOOTSTRAP_ADMIN_PASSWORD: &str = "user";

/// Credentials of a freshly seeded administrator account. Surfaced to the
/// operator exactly once, on the run that created the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

/// Hashes a plaintext password with PBKDF2-HMAC-SHA256 and a random
/// 16-byte salt. Accepts arbitrary UTF-8 input.
///
/// # Errors
/// Returns an error if key derivation fails.
pub fn hash_password(password: &str) -> Result<String, AcademicError> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| AcademicError::PasswordHash(e.to_string()))?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{ITERATIONS}${salt_b64}${hash_b64}"))
}

/// Verifies a plaintext password against a stored hash. Returns `false` for
/// a mismatch, a malformed stored hash, or any internal failure; callers
/// cannot tell these cases apart.
#[must_use]
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    verify_password_inner(stored_hash, password).unwrap_or(false)
}

fn verify_password_inner(stored_hash: &str, password: &str) -> Option<bool> {
    let mut parts = stored_hash.split('$');
    let header = parts.next()?;
    let salt_b64 = parts.next()?;
    let hash_b64 = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let mut header_parts = header.split(':');
    if header_parts.next()? != "pbkdf2" || header_parts.next()? != "sha256" {
        return None;
    }
    let iterations: u32 = header_parts.next()?.parse().ok()?;
    if iterations == 0 || header_parts.next().is_some() {
        return None;
    }

    let salt = URL_SAFE_NO_PAD.decode(salt_b64).ok()?;
    let expected = URL_SAFE_NO_PAD.decode(hash_b64).ok()?;
    if expected.is_empty() {
        return None;
    }

    let mut computed = vec![0u8; expected.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed).ok()?;

    Some(constant_time_eq(&computed, &expected))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Looks up the user by username and verifies the password.
///
/// # Errors
/// Returns [`AcademicError::InvalidCredentials`] when either the username is
/// unknown or the password does not match; the two cases are deliberately
/// indistinguishable. Storage faults propagate as their own error values.
pub fn authenticate(
    repository: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<User, AcademicError> {
    let Some(user) = repository.find_user_by_username(username)? else {
        return Err(AcademicError::InvalidCredentials);
    };
    if verify_password(&user.password_hash, password) {
        Ok(user)
    } else {
        Err(AcademicError::InvalidCredentials)
    }
}

/// Creates the bootstrap administrator account if no administrator exists
/// yet. Returns the generated credentials on the run that created the
/// account and `None` on every later run, regardless of what the existing
/// administrator is called.
///
/// # Errors
/// Returns an error when the lookup or the insert fails.
pub fn seed_initial_admin(
    repository: &dyn UserRepository,
) -> Result<Option<BootstrapAdmin>, AcademicError> {
    if !repository.find_users_by_role(Role::Admin)?.is_empty() {
        return Ok(None);
    }

    let password_hash = hash_password(BOOTSTRAP_ADMIN_PASSWORD)?;
    let admin = User::new_admin("Admin", "System", BOOTSTRAP_ADMIN_USERNAME, &password_hash);
    let id = repository.add_user(&admin)?;

    info!("Seeded initial administrator account with id {id}");
    warn!(
        "The administrator '{BOOTSTRAP_ADMIN_USERNAME}' uses a well-known bootstrap \
         password. Rotate it before handing the system to users."
    );

    Ok(Some(BootstrapAdmin {
        username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
        password: BOOTSTRAP_ADMIN_PASSWORD.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sqlite::tests::test_database_manager;

    #[test]
    fn hash_then_verify_round_trip() -> Result<(), AcademicError> {
        let hash = hash_password("hunter2")?;
        assert!(hash.starts_with("pbkdf2:sha256:260000$"));
        assert!(verify_password(&hash, "hunter2"));
        assert!(!verify_password(&hash, "hunter3"));
        Ok(())
    }

    #[test]
    fn same_password_hashes_differently() -> Result<(), AcademicError> {
        // Random salt per hash.
        assert_ne!(hash_password("secret")?, hash_password("secret")?);
        Ok(())
    }

    #[test]
    fn arbitrary_utf8_passwords_are_accepted() -> Result<(), AcademicError> {
        let password = "pässwörd-🔑-密码";
        let hash = hash_password(password)?;
        assert!(verify_password(&hash, password));
        Ok(())
    }

    #[test]
    fn malformed_hashes_never_verify() {
        for stored in [
            "",
            "not-a-hash",
            "pbkdf2:sha256:260000",
            "pbkdf2:sha256:260000$xyz",
            "pbkdf2:md5:260000$c2FsdA$aGFzaA",
            "pbkdf2:sha256:0$c2FsdA$aGFzaA",
            "pbkdf2:sha256:abc$c2FsdA$aGFzaA",
            "pbkdf2:sha256:260000$!!$aGFzaA",
            "pbkdf2:sha256:260000$c2FsdA$aGFzaA$extra",
        ] {
            assert!(!verify_password(stored, "user"), "accepted: {stored}");
        }
    }

    #[test]
    fn authenticate_rejects_unknown_user_and_wrong_password() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_user_repository();

        let hash = hash_password("correct")?;
        repo.add_user(&User::new_student("Ada", "Lovelace", "ada.lovelace", &hash))?;

        assert!(matches!(
            authenticate(repo.as_ref(), "nobody", "correct"),
            Err(AcademicError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(repo.as_ref(), "ada.lovelace", "wrong"),
            Err(AcademicError::InvalidCredentials)
        ));

        let user = authenticate(repo.as_ref(), "ada.lovelace", "correct")?;
        assert_eq!(user.username, "ada.lovelace");
        Ok(())
    }

    #[test]
    fn seeding_is_idempotent() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_user_repository();

        let first = seed_initial_admin(repo.as_ref())?.expect("first run should seed");
        assert_eq!(first.username, BOOTSTRAP_ADMIN_USERNAME);

        assert!(seed_initial_admin(repo.as_ref())?.is_none());
        assert_eq!(repo.find_users_by_role(Role::Admin)?.len(), 1);

        // Seeded credentials must actually log in.
        let admin = authenticate(repo.as_ref(), &first.username, &first.password)?;
        assert_eq!(admin.role, Role::Admin);
        Ok(())
    }

    #[test]
    fn seeding_respects_renamed_admin() -> Result<(), AcademicError> {
        let db_manager = test_database_manager()?;
        let repo = db_manager.create_user_repository();

        let hash = hash_password("x")?;
        repo.add_user(&User::new_admin("Grace", "Hopper", "grace.hopper", &hash))?;

        // An admin under any username suppresses seeding.
        assert!(seed_initial_admin(repo.as_ref())?.is_none());
        Ok(())
    }
}
