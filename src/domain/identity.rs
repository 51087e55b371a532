//! Identity allocation for people.
//!
//! Every person in the ledger carries a [`PersonId`] with a fixed shape: two
//! uppercase letters drawn from the first name, a 7-digit number, and the
//! last-name initial. The [`IdAllocator`] owns the uniqueness set and is
//! passed explicitly to person constructors, so tests can reset it between
//! runs.

use std::{collections::HashSet, fmt, str::FromStr};

/// A unique person identifier, e.g. `MI4821937J`.
///
/// The shape is two uppercase letters, seven digits, one uppercase letter.
/// Ids are issued by an [`IdAllocator`]; parsing is provided for ids that
/// arrive as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(String);

impl PersonId {
    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PersonId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2..9].iter().all(u8::is_ascii_digit)
            && bytes[9].is_ascii_uppercase();
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidIdError(s.to_string()))
        }
    }
}

impl TryFrom<&str> for PersonId {
    type Error = InvalidIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

/// Error returned when a string does not have the id shape.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid person id '{0}': expected two letters, seven digits, one letter")]
pub struct InvalidIdError(String);

/// Issues unique [`PersonId`]s by generate-and-retry against an owned
/// uniqueness set.
///
/// The generate-check-insert sequence is a single step with respect to the
/// allocator: `allocate` takes `&mut self`, so no two callers can race it.
#[derive(Debug, Default)]
pub struct IdAllocator {
    issued: HashSet<PersonId>,
}

impl IdAllocator {
    /// Creates an allocator with an empty uniqueness set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id for the named person.
    ///
    /// The letter components are taken from the ASCII letters of the names,
    /// uppercased; names with fewer than two usable letters are padded with
    /// `X`. The numeric component is drawn at random and redrawn on
    /// collision until an unused id is found.
    pub fn allocate(&mut self, first_name: &str, last_name: &str) -> PersonId {
        let mut prefix: String = first_name
            .chars()
            .filter(char::is_ascii_alphabetic)
            .take(2)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        while prefix.len() < 2 {
            prefix.push('X');
        }
        let initial = last_name
            .chars()
            .find(char::is_ascii_alphabetic)
            .map_or('X', |c| c.to_ascii_uppercase());

        loop {
            let number: u32 = rand::random_range(1_000_000..10_000_000);
            let id = PersonId(format!("{prefix}{number}{initial}"));
            if self.issued.insert(id.clone()) {
                return id;
            }
            tracing::debug!("Id collision on {id}, redrawing");
        }
    }

    /// Returns whether the given id has been issued by this allocator.
    #[must_use]
    pub fn contains(&self, id: &PersonId) -> bool {
        self.issued.contains(id)
    }

    /// The number of ids issued so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    /// Forgets every issued id.
    pub fn reset(&mut self) {
        self.issued.clear();
    }
}
