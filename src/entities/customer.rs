// 👤 Customer Entity
//
// A customer is a {name, surname} value plus the contracts it owns.
// Identity inside the repository is the generated CustomerId; the
// (name, surname) pair is what duplicate detection looks at.

use crate::entities::contract::ContractRecord;
use crate::error::{CrmError, CrmResult};
use crate::matching::Searchable;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// PERSON NAME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonName {
    pub name: String,
    pub surname: String,
}

impl PersonName {
    pub fn new(name: &str, surname: &str) -> CrmResult<Self> {
        Ok(PersonName {
            name: validate_name_part("name", name)?,
            surname: validate_name_part("surname", surname)?,
        })
    }

    /// Case-sensitive equality on both parts
    pub fn is_exactly(&self, name: &str, surname: &str) -> bool {
        self.name == name && self.surname == surname
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.surname)
    }
}

/// Sort key: lowercased "{name} {surname}"
pub fn alphabetical_key(person: &PersonName) -> String {
    format!("{} {}", person.name, person.surname).to_lowercase()
}

pub fn compare_alphabetically(a: &PersonName, b: &PersonName) -> Ordering {
    alphabetical_key(a).cmp(&alphabetical_key(b))
}

fn validate_name_part(field: &str, value: &str) -> CrmResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CrmError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// CUSTOMER
// ============================================================================

/// Stable handle of a customer inside a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomerId(Uuid);

impl CustomerId {
    fn generate() -> Self {
        CustomerId(Uuid::new_v4())
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    id: CustomerId,
    person: PersonName,
    contracts: ContractRecord,
}

impl Customer {
    pub fn new(name: &str, surname: &str) -> CrmResult<Self> {
        Ok(Self::with_contracts(PersonName::new(name, surname)?, ContractRecord::new()))
    }

    /// Used when decoding a snapshot: the record arrives fully built
    pub fn with_contracts(person: PersonName, contracts: ContractRecord) -> Self {
        Customer {
            id: CustomerId::generate(),
            person,
            contracts,
        }
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.person.name
    }

    pub fn surname(&self) -> &str {
        &self.person.surname
    }

    pub fn person(&self) -> &PersonName {
        &self.person
    }

    pub fn contracts(&self) -> &ContractRecord {
        &self.contracts
    }

    pub fn contracts_mut(&mut self) -> &mut ContractRecord {
        &mut self.contracts
    }

    pub fn is_exactly(&self, name: &str, surname: &str) -> bool {
        self.person.is_exactly(name, surname)
    }

    /// (name, surname) uniqueness is checked by the repository before this runs
    pub(crate) fn set_person(&mut self, person: PersonName) {
        self.person = person;
    }
}

impl Searchable for Customer {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.person.name.as_str(), self.person.surname.as_str()]
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.person)
    }
}

// ============================================================================
// TESTS
// ============================================================================
