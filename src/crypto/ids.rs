// Random identifiers handed out at issuance.

use rand::Rng;

/// Prefix of generated content identifiers.
pub const CID_PREFIX: &str = "bafy";
const CID_BODY_LEN: usize = 20;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `0x` followed by `2 * bytes` lowercase hex digits.
pub fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill(buf.as_mut_slice());
    format!("0x{}", hex::encode(buf))
}

/// Issuance transaction identifier: a 32-byte hex string.
pub fn new_transaction_id() -> String {
    random_hex(32)
}

/// Content identifier for submissions that did not bring one.
pub fn new_certificate_id() -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..CID_BODY_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", CID_PREFIX, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_ids_are_64_hex_digits() {
        let tx = new_transaction_id();
        assert_eq!(tx.len(), 66);
        assert!(tx.starts_with("0x"));
        assert!(tx[2..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(tx, new_transaction_id());
    }

    #[test]
    fn certificate_ids_are_base36() {
        let cid = new_certificate_id();
        assert!(cid.starts_with(CID_PREFIX));
        assert!(cid[CID_PREFIX.len()..]
            .bytes()
            .all(|b| BASE36.contains(&b)));
    }
}
