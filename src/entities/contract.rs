// 📄 Contract Entity + ContractRecord
//
// A contract is a named, dated, monetary agreement. A ContractRecord is the
// per-customer collection: insertion order is creation order and no two
// contracts share the exact same name.

use crate::error::{CrmError, CrmResult};
use crate::matching::{FuzzyMatcher, Searchable};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Wire and display format of contract dates
pub const DATE_FORMAT: &str = "%Y:%m:%d";

/// Earliest accepted year
pub const MIN_YEAR: i32 = 1900;

// ============================================================================
// CONTRACT DATE
// ============================================================================

/// Calendar date without time of day.
///
/// Ordering is the one derived from `NaiveDate`: year, then month, then day.
/// Range checks are built on `compare`, so `<=` and `>=` are always
/// complements of each other plus equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractDate(NaiveDate);

impl ContractDate {
    pub fn new(year: i32, month: u32, day: u32) -> CrmResult<Self> {
        let input = format!("{:04}:{:02}:{:02}", year, month, day);

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            CrmError::MalformedDate {
                input: input.clone(),
                reason: "not a calendar date".to_string(),
            }
        })?;

        Self::from_naive(date, &input)
    }

    /// Parse `YYYY:MM:DD`
    pub fn parse(input: &str) -> CrmResult<Self> {
        let trimmed = input.trim();

        let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| {
            CrmError::MalformedDate {
                input: input.to_string(),
                reason: format!("expected YYYY:MM:DD ({})", e),
            }
        })?;

        Self::from_naive(date, input)
    }

    fn from_naive(date: NaiveDate, input: &str) -> CrmResult<Self> {
        if date.year() < MIN_YEAR {
            return Err(CrmError::MalformedDate {
                input: input.to_string(),
                reason: format!("year must be {} or later", MIN_YEAR),
            });
        }
        Ok(ContractDate(date))
    }

    /// Canonical three-way comparison
    pub fn compare(&self, other: &ContractDate) -> Ordering {
        self.0.cmp(&other.0)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ContractDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

// ============================================================================
// CONTRACT
// ============================================================================

/// Stable handle of a contract inside its record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractId(Uuid);

impl ContractId {
    fn generate() -> Self {
        ContractId(Uuid::new_v4())
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    id: ContractId,
    name: String,
    money: f64,
    date: ContractDate,
}

impl Contract {
    /// Validates name and amount; the date is already structurally valid
    pub fn new(name: &str, money: f64, date: ContractDate) -> CrmResult<Self> {
        Ok(Contract {
            id: ContractId::generate(),
            name: validate_contract_name(name)?,
            money: validate_money(money)?,
            date,
        })
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn money(&self) -> f64 {
        self.money
    }

    pub fn date(&self) -> ContractDate {
        self.date
    }

    pub fn set_money(&mut self, money: f64) -> CrmResult<()> {
        self.money = validate_money(money)?;
        Ok(())
    }

    pub fn set_date(&mut self, date: ContractDate) {
        self.date = date;
    }

    /// Name uniqueness is a record-level rule, so renaming goes through
    /// `ContractRecord::rename`.
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl Searchable for Contract {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {:.2}", self.name, self.date, self.money)
    }
}

fn validate_contract_name(name: &str) -> CrmResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CrmError::validation("contract name", "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_money(money: f64) -> CrmResult<f64> {
    if !money.is_finite() || money < 0.0 {
        return Err(CrmError::validation(
            "money",
            format!("{} is not a non-negative amount", money),
        ));
    }
    Ok(money)
}

// ============================================================================
// CONTRACT RECORD
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractRecord {
    contracts: Vec<Contract>,
}

impl ContractRecord {
    pub fn new() -> Self {
        ContractRecord {
            contracts: Vec::new(),
        }
    }

    /// Append a new contract unless one with the exact same name exists
    pub fn add(&mut self, name: &str, money: f64, date: ContractDate) -> CrmResult<ContractId> {
        let contract = Contract::new(name, money, date)?;

        if self.search_duplicate(contract.name()).is_some() {
            return Err(CrmError::duplicate("contract", contract.name()));
        }

        let id = contract.id();
        self.contracts.push(contract);
        Ok(id)
    }

    /// Remove by handle; a stale handle is an error, never a no-op
    pub fn delete(&mut self, id: ContractId) -> CrmResult<Contract> {
        let index = self
            .position(id)
            .ok_or_else(|| CrmError::not_found("contract", id))?;

        Ok(self.contracts.remove(index))
    }

    /// Exact, case-sensitive name lookup; first occurrence in record order
    pub fn search_duplicate(&self, name: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.name == name)
    }

    /// Fuzzy lookup over contract names, words joined into one phrase
    pub fn search_by_name<S: AsRef<str>>(&self, words: &[S]) -> Vec<&Contract> {
        FuzzyMatcher::phrase(words).filter(&self.contracts)
    }

    pub fn rename(&mut self, id: ContractId, new_name: &str) -> CrmResult<()> {
        let new_name = validate_contract_name(new_name)?;
        let index = self
            .position(id)
            .ok_or_else(|| CrmError::not_found("contract", id))?;

        if let Some(existing) = self.search_duplicate(&new_name) {
            if existing.id != id {
                return Err(CrmError::duplicate("contract", new_name));
            }
        }

        self.contracts[index].set_name(new_name);
        Ok(())
    }

    pub fn set_money(&mut self, id: ContractId, money: f64) -> CrmResult<()> {
        self.get_mut(id)?.set_money(money)
    }

    pub fn set_date(&mut self, id: ContractId, date: ContractDate) -> CrmResult<()> {
        self.get_mut(id)?.set_date(date);
        Ok(())
    }

    pub fn get(&self, id: ContractId) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: ContractId) -> CrmResult<&mut Contract> {
        self.contracts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CrmError::not_found("contract", id))
    }

    fn position(&self, id: ContractId) -> Option<usize> {
        self.contracts.iter().position(|c| c.id == id)
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contract> {
        self.contracts.iter()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl<'a> IntoIterator for &'a ContractRecord {
    type Item = &'a Contract;
    type IntoIter = std::slice::Iter<'a, Contract>;

    fn into_iter(self) -> Self::IntoIter {
        self.contracts.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================
