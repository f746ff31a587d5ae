// 📇 Customer Repository - owns every Customer and its contracts
//
// Invariants kept here:
// - no two customers share (name, surname) exactly
// - no two contracts of one customer share a name (delegated to ContractRecord)
// - a stale CustomerId / ContractId fails with NotFound, never a silent no-op

use crate::activity::ActivityLog;
use crate::entities::{
    alphabetical_key, ContractDate, ContractId, Customer, CustomerId, PersonName,
};
use crate::error::{CrmError, CrmResult};
use crate::matching::FuzzyMatcher;
use crate::selection::{resolve, Mode, Resolution};
use serde_json::json;

pub struct CustomerRepository {
    customers: Vec<Customer>,
    log: ActivityLog,
}

impl CustomerRepository {
    pub fn new(log: ActivityLog) -> Self {
        CustomerRepository {
            customers: Vec::new(),
            log,
        }
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    // ========================================================================
    // CUSTOMERS
    // ========================================================================

    /// Append a customer unless one with the exact same (name, surname) exists
    pub fn add(&mut self, name: &str, surname: &str) -> CrmResult<CustomerId> {
        let person = PersonName::new(name, surname)?;

        if self.find_exact(&person.name, &person.surname).is_some() {
            self.log.record(
                "customer_add_rejected",
                "customer",
                "",
                json!({ "name": person.name, "surname": person.surname, "reason": "duplicate" }),
            );
            return Err(CrmError::duplicate("customer", person.to_string()));
        }

        let customer = Customer::new(&person.name, &person.surname)?;
        let id = customer.id();
        self.log.record(
            "customer_added",
            "customer",
            &id.to_string(),
            json!({ "name": customer.name(), "surname": customer.surname() }),
        );
        self.customers.push(customer);
        Ok(id)
    }

    /// Remove by handle and hand the customer back
    pub fn delete(&mut self, id: CustomerId) -> CrmResult<Customer> {
        let index = self
            .position(id)
            .ok_or_else(|| CrmError::not_found("customer", id))?;

        let removed = self.customers.remove(index);
        self.log.record(
            "customer_deleted",
            "customer",
            &id.to_string(),
            json!({
                "name": removed.name(),
                "surname": removed.surname(),
                "contracts": removed.contracts().len(),
            }),
        );
        Ok(removed)
    }

    /// Replace name and/or surname; the new pair must not belong to someone else
    pub fn rename(
        &mut self,
        id: CustomerId,
        name: Option<&str>,
        surname: Option<&str>,
    ) -> CrmResult<()> {
        let current = self
            .get(id)
            .ok_or_else(|| CrmError::not_found("customer", id))?;

        let person = PersonName::new(
            name.unwrap_or(current.name()),
            surname.unwrap_or(current.surname()),
        )?;

        if let Some(existing) = self.find_exact(&person.name, &person.surname) {
            if existing.id() != id {
                return Err(CrmError::duplicate("customer", person.to_string()));
            }
        }

        self.log.record(
            "customer_renamed",
            "customer",
            &id.to_string(),
            json!({ "name": person.name, "surname": person.surname }),
        );
        self.customer_mut(id)?.set_person(person);
        Ok(())
    }

    /// Fuzzy hits over (name, surname), in repository order
    pub fn search<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<&Customer> {
        FuzzyMatcher::new(tokens).filter(&self.customers)
    }

    /// Search + resolve. With exactly two tokens and `exact_ok`, a customer
    /// whose name and surname equal them (case-sensitive) is selected directly.
    pub fn select<S: AsRef<str>>(
        &self,
        tokens: &[S],
        exact_ok: bool,
        mode: Mode,
    ) -> Resolution<CustomerId> {
        let candidates = self.search(tokens);

        let resolution = match tokens {
            [name, surname] if exact_ok => {
                let is_exact =
                    |c: &&Customer| c.is_exactly(name.as_ref(), surname.as_ref());
                resolve(candidates, Some(&is_exact), mode)
            }
            _ => resolve(candidates, None, mode),
        };

        resolution.map(|c| c.id())
    }

    /// Stable sort by lowercased "{name} {surname}"
    pub fn sort_alphabetically(&mut self) {
        self.customers
            .sort_by_cached_key(|c| alphabetical_key(c.person()));
        tracing::debug!(count = self.customers.len(), "customers sorted");
    }

    pub fn find_exact(&self, name: &str, surname: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.is_exactly(name, surname))
    }

    pub fn get(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id() == id)
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Append an already built customer (load-merge path). The merger has
    /// checked for an exact duplicate first; this re-checks and refuses one.
    pub fn insert(&mut self, customer: Customer) -> CrmResult<CustomerId> {
        if self.find_exact(customer.name(), customer.surname()).is_some() {
            return Err(CrmError::duplicate("customer", customer.person().to_string()));
        }

        let id = customer.id();
        self.log.record(
            "customer_loaded",
            "customer",
            &id.to_string(),
            json!({
                "name": customer.name(),
                "surname": customer.surname(),
                "contracts": customer.contracts().len(),
            }),
        );
        self.customers.push(customer);
        Ok(id)
    }

    fn position(&self, id: CustomerId) -> Option<usize> {
        self.customers.iter().position(|c| c.id() == id)
    }

    fn customer_mut(&mut self, id: CustomerId) -> CrmResult<&mut Customer> {
        self.customers
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| CrmError::not_found("customer", id))
    }

    // ========================================================================
    // CONTRACTS
    // ========================================================================

    pub fn add_contract(
        &mut self,
        customer: CustomerId,
        name: &str,
        money: f64,
        date: ContractDate,
    ) -> CrmResult<ContractId> {
        let result = self.customer_mut(customer)?.contracts_mut().add(name, money, date);

        match &result {
            Ok(id) => self.log.record(
                "contract_added",
                "contract",
                &id.to_string(),
                json!({
                    "customer": customer.to_string(),
                    "name": name,
                    "money": money,
                    "date": date.to_string(),
                }),
            ),
            Err(e) => self.log.record(
                "contract_add_rejected",
                "contract",
                "",
                json!({ "customer": customer.to_string(), "name": name, "reason": e.to_string() }),
            ),
        }

        result
    }

    pub fn delete_contract(&mut self, customer: CustomerId, contract: ContractId) -> CrmResult<()> {
        let removed = self.customer_mut(customer)?.contracts_mut().delete(contract)?;
        self.log.record(
            "contract_deleted",
            "contract",
            &contract.to_string(),
            json!({ "customer": customer.to_string(), "name": removed.name() }),
        );
        Ok(())
    }

    pub fn rename_contract(
        &mut self,
        customer: CustomerId,
        contract: ContractId,
        new_name: &str,
    ) -> CrmResult<()> {
        self.customer_mut(customer)?
            .contracts_mut()
            .rename(contract, new_name)?;
        self.log.record(
            "contract_renamed",
            "contract",
            &contract.to_string(),
            json!({ "name": new_name.trim() }),
        );
        Ok(())
    }

    pub fn set_contract_money(
        &mut self,
        customer: CustomerId,
        contract: ContractId,
        money: f64,
    ) -> CrmResult<()> {
        self.customer_mut(customer)?
            .contracts_mut()
            .set_money(contract, money)?;
        self.log.record(
            "contract_money_changed",
            "contract",
            &contract.to_string(),
            json!({ "money": money }),
        );
        Ok(())
    }

    pub fn set_contract_date(
        &mut self,
        customer: CustomerId,
        contract: ContractId,
        date: ContractDate,
    ) -> CrmResult<()> {
        self.customer_mut(customer)?
            .contracts_mut()
            .set_date(contract, date)?;
        self.log.record(
            "contract_date_changed",
            "contract",
            &contract.to_string(),
            json!({ "date": date.to_string() }),
        );
        Ok(())
    }
}

impl Default for CustomerRepository {
    fn default() -> Self {
        Self::new(ActivityLog::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{Choice, Outcome};

    fn repo_with(people: &[(&str, &str)]) -> CustomerRepository {
        let mut repo = CustomerRepository::default();
        for (name, surname) in people {
            repo.add(name, surname).unwrap();
        }
        repo
    }

    fn names(repo: &CustomerRepository) -> Vec<String> {
        repo.customers().iter().map(|c| c.to_string()).collect()
    }

    fn date(s: &str) -> ContractDate {
        ContractDate::parse(s).unwrap()
    }

    #[test]
    fn test_add_customer() {
        let mut repo = CustomerRepository::default();
        let id = repo.add("Anna", "Rossi").unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(id).unwrap().surname(), "Rossi");
        assert_eq!(repo.log().events_for_entity(&id.to_string()).len(), 1);
    }

    #[test]
    fn test_add_duplicate_customer_rejected() {
        let mut repo = repo_with(&[("Anna", "Rossi")]);

        let err = repo.add("Anna", "Rossi").unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_add_similar_customers_allowed() {
        let mut repo = repo_with(&[("Anna", "Rossi")]);

        // fuzzy hits are not duplicates, only the exact pair is
        repo.add("anna", "Rossi").unwrap();
        repo.add("Anna", "Rossini").unwrap();
        repo.add("Annabel", "Rossi").unwrap();
        assert_eq!(repo.len(), 4);
    }

    #[test]
    fn test_delete_customer_and_stale_handle() {
        let mut repo = repo_with(&[("Anna", "Rossi")]);
        let id = repo.add("Bruno", "Bianchi").unwrap();

        let removed = repo.delete(id).unwrap();
        assert_eq!(removed.name(), "Bruno");
        assert_eq!(repo.len(), 1);

        assert!(repo.delete(id).unwrap_err().is_not_found());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_search_fuzzy() {
        let repo = repo_with(&[("Smith", "Jones"), ("Carla", "Smithers"), ("Marco", "Verdi")]);

        assert_eq!(repo.search(&["sm"]).len(), 2);
        assert!(repo.search(&["zz"]).is_empty());
        assert_eq!(repo.search(&["Smith", "Jones"]).len(), 2);
        assert_eq!(repo.search(&["verdi", "nobody"]).len(), 1);
    }

    #[test]
    fn test_select_exact_fast_path() {
        let repo = repo_with(&[("Anna", "Rossi"), ("Annabel", "Rossi")]);

        let resolution = repo.select(&["Anna", "Rossi"], true, Mode::Interactive);
        let id = resolution.exact().unwrap();
        assert_eq!(repo.get(id).unwrap().name(), "Anna");
    }

    #[test]
    fn test_select_without_exact_needs_choice() {
        let repo = repo_with(&[("Anna", "Rossi"), ("Annabel", "Rossi")]);

        let outcome = repo
            .select(&["rossi"], true, Mode::Interactive)
            .into_outcome(|request| {
                assert_eq!(request.len(), 2);
                Ok::<_, CrmError>(Choice::Pick(2))
            })
            .unwrap();
        let id = outcome.chosen().unwrap();
        assert_eq!(repo.get(id).unwrap().name(), "Annabel");

        let cancelled = repo
            .select(&["rossi"], true, Mode::Interactive)
            .into_outcome(|_| Ok::<_, CrmError>(Choice::Cancel))
            .unwrap();
        assert_eq!(cancelled, Outcome::Cancelled);
    }

    #[test]
    fn test_select_non_interactive() {
        let repo = repo_with(&[("Anna", "Rossi")]);

        assert_eq!(
            repo.select(&["anna", "rossi"], true, Mode::NonInteractive),
            Resolution::NoSelection
        );
        assert_eq!(
            repo.select(&["Bruno", "Bianchi"], true, Mode::NonInteractive),
            Resolution::NoMatch
        );
        // exact criteria disabled
        assert_eq!(
            repo.select(&["Anna", "Rossi"], false, Mode::NonInteractive),
            Resolution::NoSelection
        );
    }

    #[test]
    fn test_sort_alphabetically_case_insensitive_and_stable() {
        let mut repo = repo_with(&[
            ("bruno", "Bianchi"),
            ("Anna", "Rossi"),
            ("anna", "rossi"),
            ("ANNA", "Rossi"),
            ("Carla", "Verdi"),
        ]);

        repo.sort_alphabetically();
        assert_eq!(
            names(&repo),
            vec!["Anna Rossi", "anna rossi", "ANNA Rossi", "bruno Bianchi", "Carla Verdi"]
        );

        let once = names(&repo);
        repo.sort_alphabetically();
        assert_eq!(names(&repo), once);
    }

    #[test]
    fn test_rename_customer() {
        let mut repo = repo_with(&[("Anna", "Rossi")]);
        let id = repo.add("Bruno", "Bianchi").unwrap();

        assert!(repo.rename(id, Some("Anna"), Some("Rossi")).unwrap_err().is_duplicate());
        repo.rename(id, None, Some("Rossi")).unwrap();
        assert_eq!(repo.get(id).unwrap().to_string(), "Bruno Rossi");

        // renaming to itself is fine
        repo.rename(id, Some("Bruno"), None).unwrap();

        let gone = repo.delete(id).unwrap().id();
        assert!(repo.rename(gone, Some("X"), None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_contract_operations_through_repository() {
        let mut repo = CustomerRepository::default();
        let customer = repo.add("Anna", "Rossi").unwrap();

        let policy = repo
            .add_contract(customer, "Policy A", 500.0, date("2022:03:10"))
            .unwrap();
        let err = repo
            .add_contract(customer, "Policy A", 1.0, date("2022:03:11"))
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(repo.get(customer).unwrap().contracts().len(), 1);

        repo.set_contract_money(customer, policy, 750.0).unwrap();
        repo.set_contract_date(customer, policy, date("2023:01:01")).unwrap();
        repo.rename_contract(customer, policy, "Policy B").unwrap();

        let contract = repo.get(customer).unwrap().contracts().get(policy).unwrap();
        assert_eq!(contract.name(), "Policy B");
        assert_eq!(contract.money(), 750.0);

        repo.delete_contract(customer, policy).unwrap();
        assert!(repo.delete_contract(customer, policy).unwrap_err().is_not_found());
        assert!(repo.get(customer).unwrap().contracts().is_empty());
    }

    #[test]
    fn test_insert_refuses_exact_duplicate() {
        let mut repo = repo_with(&[("Anna", "Rossi")]);

        let twin = Customer::new("Anna", "Rossi").unwrap();
        assert!(repo.insert(twin).unwrap_err().is_duplicate());

        let other = Customer::new("Bruno", "Bianchi").unwrap();
        repo.insert(other).unwrap();
        assert_eq!(repo.len(), 2);
    }
}
