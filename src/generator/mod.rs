//! Short code generation with pluggable strategies and collision retry.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::RngExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Full 62-character alphanumeric set.
const FULL_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 57-character set without the visually ambiguous `0 O 1 l I`.
const READABLE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

const BASE36_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The sequential strategy counter wraps at this bound.
const SEQUENCE_MODULUS: u64 = 10_000;

pub const DEFAULT_CODE_LENGTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

pub const MIN_CODE_LENGTH: usize = 3;
pub const MAX_CODE_LENGTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Random,
    UrlDerived,
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    Full,
    Readable,
}

impl Charset {
    pub fn chars(self) -> &'static [u8] {
        match self {
            Charset::Full => FULL_CHARSET,
            Charset::Readable => READABLE_CHARSET,
        }
    }

    pub fn len(self) -> usize {
        self.chars().len()
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub length: usize,
    pub strategy: Strategy,
    pub charset: Charset,
    pub max_attempts: u32,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
            strategy: Strategy::Random,
            charset: Charset::Full,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// A well-formed short code is 3-20 chars of `[A-Za-z0-9_-]`.
pub fn is_valid_code(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

pub struct CodeGenerator {
    sequence: AtomicU64,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
        }
    }

    /// Generate a code that the `exists` predicate reports as free.
    ///
    /// Each colliding candidate re-invokes the configured strategy, up to
    /// `max_attempts` times. After exhaustion, one final random draw is made
    /// at `length + 2` and accepted without another existence check; the
    /// widened space keeps the residual collision probability negligible.
    pub fn generate<F>(&self, url: &str, options: &GeneratorOptions, exists: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        for _ in 0..options.max_attempts {
            let candidate = self.candidate(url, options);
            if !exists(&candidate) {
                return candidate;
            }
        }

        random_code(options.length + 2, options.charset)
    }

    fn candidate(&self, url: &str, options: &GeneratorOptions) -> String {
        match options.strategy {
            Strategy::Random => random_code(options.length, options.charset),
            Strategy::UrlDerived => url_derived_code(url, options.length, options.charset),
            Strategy::Sequential => self.sequential_code(options.length, options.charset),
        }
    }

    /// Base-36 of `millis * 10000 + counter`, keeping the trailing (fastest
    /// varying) characters and left-padding short results with random chars.
    fn sequential_code(&self, length: usize, charset: Charset) -> String {
        let counter = self.sequence.fetch_add(1, Ordering::Relaxed) % SEQUENCE_MODULUS;
        let millis = Utc::now().timestamp_millis().unsigned_abs();
        let encoded = base36(millis.wrapping_mul(SEQUENCE_MODULUS).wrapping_add(counter));

        if encoded.len() >= length {
            encoded[encoded.len() - length..].to_string()
        } else {
            let mut code = random_code(length - encoded.len(), charset);
            code.push_str(&encoded);
            code
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn random_code(length: usize, charset: Charset) -> String {
    let chars = charset.chars();
    let mut rng = rand::rng();
    (0..length)
        .map(|_| chars[rng.random_range(0..chars.len())] as char)
        .collect()
}

/// Deterministic candidate: SHA-256 digest byte-pairs mapped onto charset
/// indices, cycling over the digest for lengths past 16.
fn url_derived_code(url: &str, length: usize, charset: Charset) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let chars = charset.chars();
    (0..length)
        .map(|i| {
            let hi = digest[(2 * i) % digest.len()] as usize;
            let lo = digest[(2 * i + 1) % digest.len()] as usize;
            chars[(hi * 256 + lo) % chars.len()] as char
        })
        .collect()
}

fn base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
