use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Name of the signature parameter on the wire. Always excluded from the
/// signed set and appended after signing.
pub const SIGNATURE_PARAM: &str = "s";

/// Deterministic HMAC-SHA256 signer for gateway request parameters.
///
/// The signed payload is every `key + value` pair concatenated with no
/// delimiter, keys sorted lexicographically, so the result depends only on
/// the (key, value) set and never on insertion order.
#[derive(Clone)]
pub struct SignatureEngine {
    mac: HmacSha256,
}

impl SignatureEngine {
    pub fn new(secret: &str) -> Self {
        // HMAC-SHA256 accepts keys of any length; an unusable secret is a
        // startup configuration failure, not a per-request condition.
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("FLOW_SECRET_KEY is not a usable HMAC key");
        Self { mac }
    }

    pub fn sign(&self, params: &[(String, String)]) -> String {
        let mut pairs: Vec<&(String, String)> = params
            .iter()
            .filter(|(key, _)| key != SIGNATURE_PARAM)
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut payload = String::new();
        for (key, value) in pairs {
            payload.push_str(key);
            payload.push_str(value);
        }

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn signature_is_invariant_under_input_ordering() {
        let engine = SignatureEngine::new("shared-secret");

        let in_order = params(&[
            ("apiKey", "key-1"),
            ("amount", "2000"),
            ("commerceOrder", "GC-1"),
            ("subject", "Gasto comun enero"),
        ]);
        let shuffled = params(&[
            ("subject", "Gasto comun enero"),
            ("commerceOrder", "GC-1"),
            ("apiKey", "key-1"),
            ("amount", "2000"),
        ]);

        assert_eq!(engine.sign(&in_order), engine.sign(&shuffled));
    }

    #[test]
    fn changing_any_value_changes_the_signature() {
        let engine = SignatureEngine::new("shared-secret");

        let base = params(&[("apiKey", "key-1"), ("token", "tok-abc")]);
        let reference = engine.sign(&base);

        let edited = params(&[("apiKey", "key-1"), ("token", "tok-abd")]);
        assert_ne!(engine.sign(&edited), reference);

        let edited_key = params(&[("apiKeX", "key-1"), ("token", "tok-abc")]);
        assert_ne!(engine.sign(&edited_key), reference);
    }

    #[test]
    fn signature_param_is_excluded_from_the_signed_set() {
        let engine = SignatureEngine::new("shared-secret");

        let unsigned = params(&[("apiKey", "key-1"), ("token", "tok-abc")]);
        let mut with_signature = unsigned.clone();
        with_signature.push((SIGNATURE_PARAM.to_string(), engine.sign(&unsigned)));

        assert_eq!(engine.sign(&with_signature), engine.sign(&unsigned));
    }

    #[test]
    fn output_is_lowercase_hex() {
        let engine = SignatureEngine::new("shared-secret");
        let signature = engine.sign(&params(&[("apiKey", "key-1")]));

        assert_eq!(signature.len(), 64);
        assert!(
            signature
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        );
    }

    #[test]
    fn different_secrets_produce_different_signatures() {
        let input = params(&[("apiKey", "key-1"), ("token", "tok-abc")]);
        let a = SignatureEngine::new("secret-a").sign(&input);
        let b = SignatureEngine::new("secret-b").sign(&input);
        assert_ne!(a, b);
    }
}
