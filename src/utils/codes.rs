use rand::RngCore;

pub const AFFILIATE_CODE_LENGTH: usize = 8;

/// Code affilié : 8 caractères hexadécimaux majuscules (4 bytes aléatoires)
pub fn affiliate_code() -> String {
    let mut bytes = [0u8; AFFILIATE_CODE_LENGTH / 2];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

/// Référence de paiement générée quand le client n'en fournit pas
pub fn payment_reference() -> String {
    format!("PAY-{}", uuid::Uuid::new_v4().simple())
}
