//! Synthetic test identities.
//!
//! Every value combines the current Unix time in milliseconds with a random
//! suffix, so two runs never collide in practice. Generators are pure apart
//! from the clock and the RNG, both of which can be supplied.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

const BASE36_LOWER: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BASE36_UPPER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const REGISTRATION_NAMES: &[&str] = &[
    "company-registration",
    "business-license",
    "incorporation-certificate",
];

const EDUCATION_NAMES: &[&str] = &[
    "educational-certificates",
    "academic-credentials",
    "training-certificates",
];

/// Which verification attachment a generated file name is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Registration,
    Education,
}

impl AssetKind {
    pub fn name_pool(self) -> &'static [&'static str] {
        match self {
            AssetKind::Registration => REGISTRATION_NAMES,
            AssetKind::Education => EDUCATION_NAMES,
        }
    }
}

/// Credentials and business data for one signup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub phone: String,
    pub password: String,
    pub business_reg_number: String,
}

impl Identity {
    pub fn generate(email_domain: &str, password: &str) -> Self {
        Self::generate_with(&mut rand::thread_rng(), now_ms(), email_domain, password)
    }

    pub fn generate_with<R: Rng + ?Sized>(
        rng: &mut R,
        now_ms: u64,
        email_domain: &str,
        password: &str,
    ) -> Self {
        Self {
            email: email_with(rng, now_ms, email_domain),
            phone: phone_with(rng),
            password: password.to_string(),
            business_reg_number: business_reg_number_with(rng, now_ms),
        }
    }

    /// Mailbox name before the `@`.
    pub fn local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }

    /// Handle typed into the agency details step.
    pub fn agency_handle(&self) -> String {
        format!("agency_{}", self.email)
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn random_chars<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// `testuser_<millis>_<6 base36 chars>@<domain>`
pub fn email_with<R: Rng + ?Sized>(rng: &mut R, now_ms: u64, domain: &str) -> String {
    format!(
        "testuser_{}_{}@{}",
        now_ms,
        random_chars(rng, BASE36_LOWER, 6),
        domain
    )
}

/// `98` followed by a number in 10,000,000..=99,999,999.
///
/// The suffix is always rendered as eight decimal digits, so the result is
/// ten digits long.
pub fn phone_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("98{}", rng.gen_range(10_000_000u32..100_000_000u32))
}

/// `BRN` + last eight digits of the timestamp + four uppercase base36 chars.
pub fn business_reg_number_with<R: Rng + ?Sized>(rng: &mut R, now_ms: u64) -> String {
    let timestamp = now_ms.to_string();
    let tail = &timestamp[timestamp.len().saturating_sub(8)..];
    format!(
        "BRN{:0>8}{}",
        tail,
        random_chars(rng, BASE36_UPPER, 4)
    )
}

/// `<pool entry>-<millis>-<6 base36 chars>`, without extension.
pub fn file_name_with<R: Rng + ?Sized>(rng: &mut R, now_ms: u64, kind: AssetKind) -> String {
    let pool = kind.name_pool();
    let name = pool[rng.gen_range(0..pool.len())];
    format!("{}-{}-{}", name, now_ms, random_chars(rng, BASE36_LOWER, 6))
}

pub fn file_name(kind: AssetKind) -> String {
    file_name_with(&mut rand::thread_rng(), now_ms(), kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    const NOW: u64 = 1_718_000_123_456;

    #[test]
    fn test_email_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let email = email_with(&mut rng, NOW, "mailinator.com");
        let re = Regex::new(r"^testuser_1718000123456_[0-9a-z]{6}@mailinator\.com$").unwrap();
        assert!(re.is_match(&email), "unexpected email {}", email);
    }

    #[test]
    fn test_emails_in_same_millisecond_differ() {
        let mut rng = rand::thread_rng();
        let a = email_with(&mut rng, NOW, "mailinator.com");
        let b = email_with(&mut rng, NOW, "mailinator.com");
        assert_ne!(a, b);
    }

    #[test]
    fn test_phone_shape() {
        let re = Regex::new(r"^98\d{8}$").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let phone = phone_with(&mut rng);
            assert!(re.is_match(&phone), "unexpected phone {}", phone);
        }
    }

    #[test]
    fn test_business_reg_number_shape() {
        let re = Regex::new(r"^BRN\d{8}[A-Z0-9]{4}$").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let brn = business_reg_number_with(&mut rng, NOW);
        assert!(re.is_match(&brn), "unexpected BRN {}", brn);
        assert!(brn.starts_with("BRN00123456"));
    }

    #[test]
    fn test_business_reg_number_pads_short_timestamps() {
        let mut rng = StdRng::seed_from_u64(3);
        let brn = business_reg_number_with(&mut rng, 42);
        assert!(brn.starts_with("BRN00000042"));
        assert_eq!(brn.len(), 15);
    }

    #[test]
    fn test_file_name_uses_kind_pool() {
        let mut rng = StdRng::seed_from_u64(5);
        for kind in [AssetKind::Registration, AssetKind::Education] {
            let name = file_name_with(&mut rng, NOW, kind);
            let (stem, rest) = name.split_once("-1718000123456-").unwrap();
            assert!(kind.name_pool().contains(&stem));
            assert_eq!(rest.len(), 6);
        }
    }

    #[test]
    fn test_identity_helpers() {
        let mut rng = StdRng::seed_from_u64(1);
        let identity = Identity::generate_with(&mut rng, NOW, "mailinator.com", "Test@12345");
        assert!(identity.local_part().starts_with("testuser_1718000123456_"));
        assert!(!identity.local_part().contains('@'));
        assert_eq!(identity.agency_handle(), format!("agency_{}", identity.email));
        assert_eq!(identity.password, "Test@12345");
    }
}
