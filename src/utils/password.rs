use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Hash un mot de passe avec PBKDF2-HMAC-SHA256 et un salt aléatoire de 16 bytes
/// Format: pbkdf2:sha256:iterations$salt$hash (salt et hash en base64 URL-safe sans padding)
pub fn hash_password(password: &str, iterations: u32) -> Result<String, String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut key)
        .map_err(|e| format!("PBKDF2 hash generation failed: {}", e))?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", iterations, salt_b64, hash_b64))
}

/// Hash au bon format qu'aucun mot de passe ne vérifie, pour qu'un email inconnu
/// coûte le même calcul PBKDF2 qu'un email existant
pub fn dummy_hash(iterations: u32) -> String {
    let salt_b64 = URL_SAFE_NO_PAD.encode([0u8; SALT_LENGTH]);
    let hash_b64 = URL_SAFE_NO_PAD.encode([0u8; KEY_LENGTH]);

    format!("pbkdf2:sha256:{}${}${}", iterations, salt_b64, hash_b64)
}

/// Vérifie un mot de passe contre un hash produit par `hash_password`
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err("Invalid hash format".to_string());
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err("Invalid header".to_string());
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;

    let salt = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| format!("Salt decode failed: {}", e))?;
    let expected_hash = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|e| format!("Hash decode failed: {}", e))?;

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| format!("PBKDF2 hash verification failed: {}", e))?;

    Ok(constant_time_eq(&computed, &expected_hash))
}

// Comparaison en temps constant via HMAC (clé aléatoire, puis verify_slice)
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut key = [0u8; 32];
    rand::thread_rng().fill(&mut key);

    let Ok(mut mac) = HmacSha256::new_from_slice(&key) else {
        return false;
    };
    mac.update(a);
    let tag = mac.finalize().into_bytes();

    let Ok(mut mac) = HmacSha256::new_from_slice(&key) else {
        return false;
    };
    mac.update(b);
    mac.verify_slice(&tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITERATIONS: u32 = 1000;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse", ITERATIONS).unwrap();

        assert!(hash.starts_with("pbkdf2:sha256:1000$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = hash_password("secret", ITERATIONS).unwrap();
        let second = hash_password("secret", ITERATIONS).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_dummy_hash_runs_full_verification() {
        let dummy = dummy_hash(ITERATIONS);

        assert!(dummy.starts_with("pbkdf2:sha256:1000$"));
        assert_eq!(verify_password("correct horse", &dummy), Ok(false));
        assert_eq!(verify_password("", &dummy), Ok(false));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("secret", "not-a-hash").is_err());
        assert!(verify_password("secret", "md5:x:1$a$b").is_err());
        assert!(verify_password("secret", "pbkdf2:sha256:abc$a$b").is_err());
    }
}
