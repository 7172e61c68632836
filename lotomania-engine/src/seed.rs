use sha2::{Digest, Sha256};

/// Nombre de caractères hexadécimaux du condensé conservés (48 bits).
pub const SEED_HEX_DIGITS: usize = 12;

/// Graine reproductible : SHA-256 de "{identity}|{base_draw_id}|{salt}",
/// tronqué aux 12 premiers caractères hexadécimaux.
pub fn stable_seed(identity: u64, base_draw_id: &str, salt: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}", identity, base_draw_id, salt).as_bytes());
    let digest = hex::encode(hasher.finalize());
    // 12 chiffres hexadécimaux tiennent toujours dans un u64
    u64::from_str_radix(&digest[..SEED_HEX_DIGITS], 16).unwrap_or(0)
}

pub fn ticket_salt(index: usize) -> String {
    format!("ticket-{}", index)
}
