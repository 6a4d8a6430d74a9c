use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(plain.as_bytes(), &salt) {
        Ok(digest) => Ok(digest.to_string()),
        Err(e) => {
            error!(error = %e, "password hashing failed");
            Err(anyhow::anyhow!("password hashing failed"))
        }
    }
}

/// `Ok(false)` is a wrong password, a normal outcome. `Err` means the stored
/// hash itself would not parse, which is a fault in the stored record.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash would not parse");
        anyhow::anyhow!("malformed password hash")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Signup accepts passwords of 8 to 16 characters; test at both ends.

    #[test]
    fn accepts_the_password_it_was_hashed_from() {
        let stored = hash_password("password1").expect("hash");
        assert!(verify_password("password1", &stored).expect("verify"));
    }

    #[test]
    fn rejects_a_close_but_different_password() {
        let stored = hash_password("sixteen-chars-pw").expect("hash");
        assert!(!verify_password("sixteen-chars-pX", &stored).expect("verify"));
    }

    #[test]
    fn corrupted_stored_hash_is_a_fault_not_a_mismatch() {
        // A corrupted record must surface as an error so login can log the
        // fault instead of silently reading it as a wrong password.
        let err = verify_password("password1", "corrupted-row-value").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn repeated_hashing_never_reuses_a_salt() {
        let first = hash_password("password1").expect("hash");
        let second = hash_password("password1").expect("hash");
        assert_ne!(first, second);
    }
}
