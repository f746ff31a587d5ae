// 🖥️ Text menus - the interactive front-end over the repository
//
// Every multi-step flow can be abandoned with the cancel sentinel; nothing is
// mutated until all fields of the step were collected.

use crate::config::AppConfig;
use crate::console::{Console, WordCount, SEPARATOR_LINE};
use crate::entities::{Contract, ContractId, CustomerId};
use crate::error::CrmError;
use crate::persistence;
use crate::range_query::{DateRange, MoneyRange, RangeQuery};
use crate::repository::CustomerRepository;
use crate::selection::{resolve, Mode, Outcome, Resolution};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Menu entries; the position is the number the user types
const MAIN_MENU: [&str; 6] = [
    "Add a new customer",
    "Search a customer",
    "Show the customer list",
    "Save data to file",
    "Load data from file",
    "Quit",
];

const CUSTOMER_MENU: [&str; 5] = [
    "Show complete information",
    "Edit customer name/surname",
    "Manage contracts",
    "Delete customer",
    "Back",
];

const EDIT_CUSTOMER_MENU: [&str; 3] = ["Edit name", "Edit surname", "Back"];

const CONTRACT_MENU: [&str; 4] = ["Add a new contract", "Search contracts", "Show all contracts", "Back"];

const SEARCH_CONTRACT_MENU: [&str; 4] = ["By name", "By date range", "By money range", "Back"];

const EDIT_CONTRACT_MENU: [&str; 5] = ["Edit name", "Edit date", "Edit money", "Delete contract", "Back"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    Leave,
}

pub struct App<R, W> {
    pub repo: CustomerRepository,
    console: Console<R, W>,
    config: AppConfig,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(repo: CustomerRepository, console: Console<R, W>, config: AppConfig) -> Self {
        App {
            repo,
            console,
            config,
        }
    }

    pub fn into_parts(self) -> (CustomerRepository, Console<R, W>) {
        (self.repo, self.console)
    }

    /// Main loop; returns when the user quits
    pub fn run(&mut self) -> Result<()> {
        loop {
            let choice = self.menu("Main menu", &MAIN_MENU)?;
            let flow = match choice {
                1 => self.add_customer()?,
                2 => self.search_customer()?,
                3 => self.print_customer_list()?,
                4 => self.save()?,
                5 => self.load()?,
                _ => Flow::Leave,
            };
            if flow == Flow::Leave {
                return Ok(());
            }
        }
    }

    fn menu(&mut self, title: &str, entries: &[&str]) -> Result<usize> {
        self.console.say(SEPARATOR_LINE)?;
        self.console.say(title)?;
        for (i, entry) in entries.iter().enumerate() {
            self.console.say(format!("{}) {}", i + 1, entry))?;
        }
        self.console
            .read_menu_choice("Type the number corresponding to an action.", entries.len())
    }

    /// Core rejections are reported, stale handles are logged as bugs
    fn report(&mut self, err: CrmError) -> Result<()> {
        if err.is_not_found() {
            tracing::error!(error = %err, "stale handle");
        } else {
            tracing::warn!(error = %err, "operation rejected");
        }
        self.console.say(format!("Operation not executed: {}", err))
    }

    fn cancelled(&mut self) -> Result<Flow> {
        self.console.say("Operation cancelled.")?;
        Ok(Flow::Stay)
    }

    // ========================================================================
    // CUSTOMERS
    // ========================================================================

    fn add_customer(&mut self) -> Result<Flow> {
        let prompt = format!(
            "Enter the name and surname of the new customer (only alphabetical characters) separated by a space character. Type '{}' to cancel the operation.",
            self.console.cancel_token()
        );
        let Some(words) = self.console.read_words(&prompt, WordCount::Exactly(2), true)? else {
            return self.cancelled();
        };

        match self.repo.add(&words[0], &words[1]) {
            Ok(_) => self
                .console
                .say(format!("Customer {} {} added.", words[0], words[1]))?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Stay)
    }

    fn search_customer(&mut self) -> Result<Flow> {
        let prompt = format!(
            "Enter the name and/or surname of the customer (one or two words). Type '{}' to cancel the operation.",
            self.console.cancel_token()
        );
        let Some(words) = self.console.read_words(&prompt, WordCount::Between(1, 2), true)? else {
            return self.cancelled();
        };

        let resolution = self.repo.select(&words, true, Mode::Interactive);
        if resolution == Resolution::NoMatch {
            self.console
                .say(format!("No match was found for {}", words.join(" ")))?;
            return Ok(Flow::Stay);
        }

        let repo = &self.repo;
        let outcome = choose(
            &mut self.console,
            resolution,
            "No exact match was found. Did you mean one of these customers?",
            |id| repo.get(*id).map(|c| c.to_string()).unwrap_or_default(),
        )?;

        match outcome {
            Outcome::Chosen(id) => self.customer_menu(id),
            Outcome::Empty => Ok(Flow::Stay),
            Outcome::Cancelled => self.cancelled(),
        }
    }

    fn print_customer_list(&mut self) -> Result<Flow> {
        self.repo.sort_alphabetically();

        if self.repo.is_empty() {
            self.console.say("No customer registered yet!")?;
            return Ok(Flow::Stay);
        }

        self.console.say("Customer list:")?;
        let lines: Vec<String> = self
            .repo
            .customers()
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}) {}", i + 1, c))
            .collect();
        for line in lines {
            self.console.say(line)?;
        }
        Ok(Flow::Stay)
    }

    fn customer_menu(&mut self, id: CustomerId) -> Result<Flow> {
        loop {
            let Some(customer) = self.repo.get(id) else {
                return Ok(Flow::Stay);
            };
            let title = format!("Customer: {}", customer);

            match self.menu(&title, &CUSTOMER_MENU)? {
                1 => self.print_customer(id)?,
                2 => self.edit_customer_menu(id)?,
                3 => self.contract_menu(id)?,
                4 => {
                    match self.repo.delete(id) {
                        Ok(removed) => self.console.say(format!("Customer {} deleted.", removed))?,
                        Err(e) => self.report(e)?,
                    }
                    return Ok(Flow::Stay);
                }
                _ => return Ok(Flow::Stay),
            }
        }
    }

    fn print_customer(&mut self, id: CustomerId) -> Result<()> {
        let Some(customer) = self.repo.get(id) else {
            return Ok(());
        };

        let mut lines = vec![
            format!("Name: {}", customer.name()),
            format!("Surname: {}", customer.surname()),
        ];
        if customer.contracts().is_empty() {
            lines.push("No contracts registered for this customer yet.".to_string());
        } else {
            lines.push("Contract record:".to_string());
            lines.extend(contract_lines(customer.contracts().contracts()));
        }

        for line in lines {
            self.console.say(line)?;
        }
        Ok(())
    }

    fn edit_customer_menu(&mut self, id: CustomerId) -> Result<()> {
        loop {
            let field = match self.menu("Edit customer", &EDIT_CUSTOMER_MENU)? {
                1 => "name",
                2 => "surname",
                _ => return Ok(()),
            };

            let prompt = format!(
                "Enter the new {} for the customer (only alphabetical characters). Type '{}' to cancel the operation.",
                field,
                self.console.cancel_token()
            );
            let Some(words) = self.console.read_words(&prompt, WordCount::Exactly(1), true)? else {
                self.cancelled()?;
                continue;
            };

            let value = words[0].as_str();
            let result = if field == "name" {
                self.repo.rename(id, Some(value), None)
            } else {
                self.repo.rename(id, None, Some(value))
            };

            match result {
                Ok(()) => self.console.say(format!("Customer {} updated.", field))?,
                Err(e) => self.report(e)?,
            }
        }
    }

    // ========================================================================
    // CONTRACTS
    // ========================================================================

    fn contract_menu(&mut self, id: CustomerId) -> Result<()> {
        loop {
            match self.menu("Contracts", &CONTRACT_MENU)? {
                1 => self.add_contract(id)?,
                2 => self.search_contract_menu(id)?,
                3 => {
                    let lines = self
                        .repo
                        .get(id)
                        .map(|c| contract_lines(c.contracts().contracts()))
                        .unwrap_or_default();
                    if lines.is_empty() {
                        self.console.say("No contracts registered for this customer yet.")?;
                    }
                    for line in lines {
                        self.console.say(line)?;
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn add_contract(&mut self, id: CustomerId) -> Result<()> {
        let cancel = self.console.cancel_token().to_string();

        let Some(name) = self
            .console
            .read_text(&format!("Enter the contract name. Type '{}' to cancel the operation.", cancel))?
        else {
            self.cancelled()?;
            return Ok(());
        };

        let exists = self
            .repo
            .get(id)
            .map(|c| c.contracts().search_duplicate(&name).is_some())
            .unwrap_or(false);
        if exists {
            self.console
                .say(format!("A contract named {} already exists.", name))?;
            return Ok(());
        }

        let Some(money) = self.console.read_money(&format!(
            "Enter the amount of money (only positive numbers). Type '{}' to cancel the operation.",
            cancel
        ))?
        else {
            self.cancelled()?;
            return Ok(());
        };

        let Some(date) = self.console.read_date(&format!(
            "Enter the contract date in the format YYYY:MM:DD. Type '{}' to cancel the operation.",
            cancel
        ))?
        else {
            self.cancelled()?;
            return Ok(());
        };

        match self.repo.add_contract(id, &name, money, date) {
            Ok(_) => self.console.say(format!("Contract {} added.", name))?,
            Err(e) => self.report(e)?,
        }
        Ok(())
    }

    fn search_contract_menu(&mut self, id: CustomerId) -> Result<()> {
        let cancel = self.console.cancel_token().to_string();

        let selected = match self.menu("Search contracts", &SEARCH_CONTRACT_MENU)? {
            1 => {
                let Some(words) = self.console.read_words(
                    &format!(
                        "Type a (sub)string contained in the contract's name. Type '{}' to cancel the operation.",
                        cancel
                    ),
                    WordCount::Any,
                    false,
                )?
                else {
                    self.cancelled()?;
                    return Ok(());
                };
                self.select_contract_by_name(id, &words)?
            }
            2 => {
                let Some(start) = self.console.read_date(&format!(
                    "Enter a start date in the format YYYY:MM:DD. Type '{}' to cancel the operation.",
                    cancel
                ))?
                else {
                    self.cancelled()?;
                    return Ok(());
                };
                let Some(end) = self.console.read_date(&format!(
                    "Enter a final date in the format YYYY:MM:DD. Type '{}' to cancel the operation.",
                    cancel
                ))?
                else {
                    self.cancelled()?;
                    return Ok(());
                };
                self.select_contract_in(id, RangeQuery::Date(DateRange::new(start, end)))?
            }
            3 => {
                let Some(lo) = self.console.read_money(&format!(
                    "Enter a lower bound for the amount of money. Type '{}' to cancel the operation.",
                    cancel
                ))?
                else {
                    self.cancelled()?;
                    return Ok(());
                };
                let Some(hi) = self.console.read_money(&format!(
                    "Enter an upper bound for the amount of money. Type '{}' to cancel the operation.",
                    cancel
                ))?
                else {
                    self.cancelled()?;
                    return Ok(());
                };
                self.select_contract_in(id, RangeQuery::Money(MoneyRange::new(lo, hi)))?
            }
            _ => return Ok(()),
        };

        match selected {
            Outcome::Chosen(contract) => self.edit_contract_menu(id, contract),
            Outcome::Empty => {
                self.console.say("No existing contract matches your query.")?;
                Ok(())
            }
            Outcome::Cancelled => {
                self.cancelled()?;
                Ok(())
            }
        }
    }

    /// Name search: the whole phrase typed equal to a contract name selects it directly
    fn select_contract_by_name(&mut self, id: CustomerId, words: &[String]) -> Result<Outcome<ContractId>> {
        let Some(customer) = self.repo.get(id) else {
            return Ok(Outcome::Empty);
        };

        let phrase = words.join(" ");
        let candidates = customer.contracts().search_by_name(words);
        let is_exact = |c: &&Contract| c.name() == phrase;
        let resolution = resolve(candidates, Some(&is_exact), Mode::Interactive);

        let outcome = choose(
            &mut self.console,
            resolution,
            "The following contracts match your query.",
            |c| c.to_string(),
        )?;
        Ok(outcome.map(|c| c.id()))
    }

    fn select_contract_in(&mut self, id: CustomerId, query: RangeQuery) -> Result<Outcome<ContractId>> {
        let Some(customer) = self.repo.get(id) else {
            return Ok(Outcome::Empty);
        };

        let resolution = resolve(query.apply(customer.contracts()), None, Mode::Interactive);
        let outcome = choose(
            &mut self.console,
            resolution,
            "The following contracts match your query.",
            |c| c.to_string(),
        )?;
        Ok(outcome.map(|c| c.id()))
    }

    fn edit_contract_menu(&mut self, id: CustomerId, contract: ContractId) -> Result<()> {
        let cancel = self.console.cancel_token().to_string();

        loop {
            let Some(current) = self.repo.get(id).and_then(|c| c.contracts().get(contract)) else {
                return Ok(());
            };
            let title = format!("Contract: {}", current);

            let result = match self.menu(&title, &EDIT_CONTRACT_MENU)? {
                1 => match self.console.read_text(&format!(
                    "Type the new name for this contract. Type '{}' to cancel the operation.",
                    cancel
                ))? {
                    Some(name) => self.repo.rename_contract(id, contract, &name),
                    None => {
                        self.cancelled()?;
                        continue;
                    }
                },
                2 => match self.console.read_date(&format!(
                    "Type the new date for this contract (YYYY:MM:DD). Type '{}' to cancel the operation.",
                    cancel
                ))? {
                    Some(date) => self.repo.set_contract_date(id, contract, date),
                    None => {
                        self.cancelled()?;
                        continue;
                    }
                },
                3 => match self.console.read_money(&format!(
                    "Type the new amount of money for this contract. Type '{}' to cancel the operation.",
                    cancel
                ))? {
                    Some(money) => self.repo.set_contract_money(id, contract, money),
                    None => {
                        self.cancelled()?;
                        continue;
                    }
                },
                4 => {
                    match self.repo.delete_contract(id, contract) {
                        Ok(()) => self.console.say("Contract deleted.")?,
                        Err(e) => self.report(e)?,
                    }
                    return Ok(());
                }
                _ => return Ok(()),
            };

            match result {
                Ok(()) => self.console.say("Contract updated.")?,
                Err(e) => self.report(e)?,
            }
        }
    }

    // ========================================================================
    // SAVE / LOAD
    // ========================================================================

    fn read_path(&mut self, action: &str) -> Result<Option<PathBuf>> {
        let default = self.config.default_snapshot.clone();
        let hint = match &default {
            Some(p) => format!(" Leave empty to use {}.", p.display()),
            None => String::new(),
        };
        let prompt = format!(
            "Enter the path of the file to {}.{} Type '{}' to cancel the operation.",
            action,
            hint,
            self.console.cancel_token()
        );

        loop {
            let line = self.console.read_line(&prompt)?;
            if line.to_lowercase() == self.console.cancel_token() {
                return Ok(None);
            }
            if !line.is_empty() {
                return Ok(Some(PathBuf::from(line)));
            }
            if let Some(path) = &default {
                return Ok(Some(path.clone()));
            }
            self.console.say("Invalid input. Please try again.")?;
        }
    }

    fn save(&mut self) -> Result<Flow> {
        let Some(path) = self.read_path("save to")? else {
            return self.cancelled();
        };

        match persistence::save_to_path(&self.repo, &path) {
            Ok(()) => self
                .console
                .say(format!("Saved {} customers to {}.", self.repo.len(), path.display()))?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Stay)
    }

    fn load(&mut self) -> Result<Flow> {
        let Some(path) = self.read_path("load from")? else {
            return self.cancelled();
        };

        self.load_snapshot(&path)?;
        Ok(Flow::Stay)
    }

    /// Load + merge, asking before each overwrite. Core failures are reported,
    /// console failures (end of input) propagate.
    pub fn load_snapshot(&mut self, path: &Path) -> Result<()> {
        let loaded = match persistence::load_from_path(path) {
            Ok(customers) => customers,
            Err(e) => return self.report(e),
        };

        let console = &mut self.console;
        let merged = persistence::merge(&mut self.repo, loaded, |customer| {
            let prompt = format!(
                "Customer {} already exists. Do you want to overwrite it? Type 'y' for yes and 'n' for no.",
                customer
            );
            console.read_yes_no(&prompt)
        });

        match merged {
            Ok(report) => self
                .console
                .say(format!("Loaded {}: {}.", path.display(), report.summary())),
            Err(e) => match e.downcast::<CrmError>() {
                Ok(core) => self.report(core),
                Err(prompt_failure) => Err(prompt_failure),
            },
        }
    }
}

/// Resolve with a human pick when needed
fn choose<R, W, T, L>(
    console: &mut Console<R, W>,
    resolution: Resolution<T>,
    header: &str,
    label: L,
) -> Result<Outcome<T>>
where
    R: BufRead,
    W: Write,
    L: Fn(&T) -> String,
{
    resolution.into_outcome(|request| {
        let labels: Vec<String> = request.candidates().iter().map(&label).collect();
        console.choose(header, &labels)
    })
}

fn contract_lines(contracts: &[Contract]) -> Vec<String> {
    contracts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}) Contract name: {} | Date of the deal: {} | Money: {:.2}",
                i + 1,
                c.name(),
                c.date(),
                c.money()
            )
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
