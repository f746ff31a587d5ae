// Entity Models
//
// Customers own their contracts exclusively. Each entity carries a generated
// handle (CustomerId / ContractId) so callers never hold references across
// structural changes; a stale handle fails with NotFound.

pub mod contract;
pub mod customer;

pub use contract::{Contract, ContractDate, ContractId, ContractRecord, DATE_FORMAT, MIN_YEAR};
pub use customer::{alphabetical_key, compare_alphabetically, Customer, CustomerId, PersonName};
