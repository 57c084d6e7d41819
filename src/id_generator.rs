//! Node id sources
//!
//! Documents normally carry their own ids. A source is only consulted for
//! nodes that arrive without one (or with a duplicate), and it is injected so
//! tests can get deterministic output.

use ulid::Ulid;

const CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j',
    'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't',
    'u', 'v', 'w', 'x', 'y', 'z',
];

/// Anything that can mint node ids
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

impl<F> IdSource for F
where
    F: FnMut() -> String,
{
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Production default: lowercase ULIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidIds;

impl IdSource for UlidIds {
    fn next_id(&mut self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}

/// Deterministic generator producing `<prefix><base36>` ids like `n00`, `n01`
///
/// Starts with two digits and widens once the namespace is exhausted.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    length: usize,
    counter: u64,
    max_value: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_prefix("n")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_length(prefix, 2)
    }

    pub fn with_length(prefix: impl Into<String>, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            length,
            counter: 0,
            max_value: (CHARS.len() as u64).pow(length as u32),
        }
    }

    fn encode(&self, mut num: u64) -> String {
        let base = CHARS.len() as u64;
        let mut digits = Vec::with_capacity(self.length);

        for _ in 0..self.length {
            digits.push(CHARS[(num % base) as usize]);
            num /= base;
        }

        digits.reverse();
        let mut id = self.prefix.clone();
        id.extend(digits);
        id
    }

    fn expand(&mut self) {
        self.length += 1;
        self.max_value = (CHARS.len() as u64).pow(self.length as u32);
        self.counter = 0;
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for IdGenerator {
    fn next_id(&mut self) -> String {
        if self.counter >= self.max_value {
            self.expand();
        }

        let id = self.encode(self.counter);
        self.counter += 1;
        id
    }
}
