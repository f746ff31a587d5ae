// 💾 Persistence - whole-collection snapshots and load-time merge
//
// Snapshot layout (JSON):
//   { "customers": [ { "name", "surname",
//                      "contracts": [ { "name", "money", "date": "YYYY:MM:DD" } ] } ] }
//
// Encode/decode go through plain record structs, so the entity types carry no
// serialization concerns. Decoding validates everything before any merge step
// runs: a bad contract anywhere fails the whole file and the live repository
// is left untouched.

use crate::entities::{Contract, ContractDate, ContractRecord, Customer, PersonName};
use crate::error::{CrmError, CrmResult};
use crate::repository::CustomerRepository;
use crate::selection::Mode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::Path;

// ============================================================================
// SNAPSHOT RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractEntry {
    pub name: String,
    pub money: f64,
    pub date: String,
}

impl ContractEntry {
    pub fn encode(contract: &Contract) -> Self {
        ContractEntry {
            name: contract.name().to_string(),
            money: contract.money(),
            date: contract.date().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerEntry {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub contracts: Vec<ContractEntry>,
}

impl CustomerEntry {
    pub fn encode(customer: &Customer) -> Self {
        CustomerEntry {
            name: customer.name().to_string(),
            surname: customer.surname().to_string(),
            contracts: customer.contracts().iter().map(ContractEntry::encode).collect(),
        }
    }

    /// Rebuild a customer, validating every contract on the way
    pub fn decode(&self) -> CrmResult<Customer> {
        let person = PersonName::new(&self.name, &self.surname)?;

        let mut record = ContractRecord::new();
        for entry in &self.contracts {
            let date = ContractDate::parse(&entry.date)?;
            record.add(&entry.name, entry.money, date)?;
        }

        Ok(Customer::with_contracts(person, record))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub customers: Vec<CustomerEntry>,
}

impl Snapshot {
    pub fn encode(repo: &CustomerRepository) -> Self {
        Snapshot {
            customers: repo.customers().iter().map(CustomerEntry::encode).collect(),
        }
    }

    /// All-or-nothing: the first invalid customer or contract fails the snapshot
    pub fn decode(&self) -> CrmResult<Vec<Customer>> {
        self.customers.iter().map(CustomerEntry::decode).collect()
    }

    pub fn to_json(&self) -> CrmResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CrmError::Snapshot {
            message: e.to_string(),
        })
    }

    pub fn from_json(content: &str) -> CrmResult<Self> {
        serde_json::from_str(content).map_err(|e| CrmError::Snapshot {
            message: e.to_string(),
        })
    }
}

// ============================================================================
// FILE SAVE / LOAD
// ============================================================================

/// Serialize first, then write; the repository is only read
pub fn save_to_path(repo: &CustomerRepository, path: &Path) -> CrmResult<()> {
    let content = Snapshot::encode(repo).to_json()?;

    fs::write(path, content).map_err(|source| CrmError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    repo.log().record(
        "snapshot_saved",
        "repository",
        "",
        json!({ "path": path.display().to_string(), "customers": repo.len() }),
    );
    Ok(())
}

/// Read and fully decode a snapshot file
pub fn load_from_path(path: &Path) -> CrmResult<Vec<Customer>> {
    let content = fs::read_to_string(path).map_err(|source| CrmError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Snapshot::from_json(&content)?.decode()
}

// ============================================================================
// MERGE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// No live customer had the same (name, surname)
    pub added: usize,

    /// Live customer deleted, loaded one appended
    pub replaced: usize,

    /// Overwrite declined, live customer kept
    pub skipped: usize,
}

impl MergeReport {
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} replaced, {} skipped",
            self.added, self.replaced, self.skipped
        )
    }
}

/// Merge loaded customers into the live repository, strictly in snapshot order.
///
/// Duplicate detection runs against the live state at every step, so a
/// snapshot that contains the same customer twice asks again for the second
/// copy and, when confirmed, the later one wins. `overwrite` receives the
/// loaded customer and answers the yes/no question. The first failing answer
/// stops the merge: customers after it are neither asked about nor added.
pub fn merge<F, E>(
    repo: &mut CustomerRepository,
    loaded: Vec<Customer>,
    mut overwrite: F,
) -> Result<MergeReport, E>
where
    F: FnMut(&Customer) -> Result<bool, E>,
    E: From<CrmError>,
{
    let mut report = MergeReport::default();

    for customer in loaded {
        let existing = repo
            .select(&[customer.name(), customer.surname()], true, Mode::NonInteractive)
            .exact();

        match existing {
            None => {
                repo.insert(customer)?;
                report.added += 1;
            }
            Some(live_id) => {
                let answer = match overwrite(&customer) {
                    Ok(answer) => answer,
                    Err(e) => {
                        tracing::warn!(customer = %customer, "overwrite prompt failed, merge stopped");
                        return Err(e);
                    }
                };

                if answer {
                    repo.delete(live_id)?;
                    repo.insert(customer)?;
                    report.replaced += 1;
                } else {
                    tracing::debug!(customer = %customer, "overwrite declined, keeping live copy");
                    report.skipped += 1;
                }
            }
        }
    }

    repo.log().record(
        "snapshot_merged",
        "repository",
        "",
        json!({
            "added": report.added,
            "replaced": report.replaced,
            "skipped": report.skipped,
        }),
    );
    Ok(report)
}

/// Load a file and merge it; a decode failure leaves `repo` unchanged
pub fn load_and_merge<F, E>(
    repo: &mut CustomerRepository,
    path: &Path,
    overwrite: F,
) -> Result<MergeReport, E>
where
    F: FnMut(&Customer) -> Result<bool, E>,
    E: From<CrmError>,
{
    let loaded = load_from_path(path)?;
    merge(repo, loaded, overwrite)
}

// ============================================================================
// TESTS
// ============================================================================
