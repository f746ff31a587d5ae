// 📅 Range Queries - chronological and numeric filters over a ContractRecord
//
// Both bounds are inclusive. Results keep record order so they can be handed
// straight to the selection resolver. An inverted range is not an error, it
// simply matches nothing.

use crate::entities::{Contract, ContractDate, ContractRecord};
use std::cmp::Ordering;

// ============================================================================
// DATE RANGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: ContractDate,
    pub end: ContractDate,
}

impl DateRange {
    pub fn new(start: ContractDate, end: ContractDate) -> Self {
        DateRange { start, end }
    }

    /// start <= date <= end, both sides through the same three-way compare
    pub fn contains(&self, date: ContractDate) -> bool {
        self.start.compare(&date) != Ordering::Greater
            && date.compare(&self.end) != Ordering::Greater
    }

    pub fn filter<'a>(&self, record: &'a ContractRecord) -> Vec<&'a Contract> {
        record.iter().filter(|c| self.contains(c.date())).collect()
    }
}

// ============================================================================
// MONEY RANGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoneyRange {
    pub lo: f64,
    pub hi: f64,
}

impl MoneyRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        MoneyRange { lo, hi }
    }

    pub fn contains(&self, money: f64) -> bool {
        self.lo <= money && money <= self.hi
    }

    pub fn filter<'a>(&self, record: &'a ContractRecord) -> Vec<&'a Contract> {
        record.iter().filter(|c| self.contains(c.money())).collect()
    }
}

// ============================================================================
// RANGE QUERY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeQuery {
    Date(DateRange),
    Money(MoneyRange),
}

impl RangeQuery {
    pub fn apply<'a>(&self, record: &'a ContractRecord) -> Vec<&'a Contract> {
        match self {
            RangeQuery::Date(range) => range.filter(record),
            RangeQuery::Money(range) => range.filter(record),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> ContractDate {
        ContractDate::parse(s).unwrap()
    }

    fn sample_record() -> ContractRecord {
        let mut record = ContractRecord::new();
        record.add("First", 100.0, date("2020:01:15")).unwrap();
        record.add("Second", 250.0, date("2021:06:01")).unwrap();
        record.add("Third", 900.0, date("2019:12:31")).unwrap();
        record
    }

    #[test]
    fn test_date_range_filter_keeps_record_order() {
        let record = sample_record();
        let range = DateRange::new(date("2020:01:01"), date("2021:12:31"));

        let hits = range.filter(&record);
        let names: Vec<&str> = hits.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_date_range_inclusive_bounds() {
        let record = sample_record();

        let exact = DateRange::new(date("2020:01:15"), date("2020:01:15"));
        assert_eq!(exact.filter(&record).len(), 1);

        let edges = DateRange::new(date("2019:12:31"), date("2021:06:01"));
        assert_eq!(edges.filter(&record).len(), 3);

        // one day short on both ends
        let inner = DateRange::new(date("2020:01:16"), date("2021:05:31"));
        assert!(inner.filter(&record).is_empty());
    }

    #[test]
    fn test_inverted_date_range_is_empty() {
        let record = sample_record();
        let range = DateRange::new(date("2022:01:01"), date("2019:01:01"));
        assert!(range.filter(&record).is_empty());
    }

    #[test]
    fn test_money_range_filter() {
        let record = sample_record();

        let hits = MoneyRange::new(100.0, 250.0).filter(&record);
        let names: Vec<&str> = hits.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["First", "Second"]);

        assert!(MoneyRange::new(500.0, 100.0).filter(&record).is_empty());
        assert_eq!(MoneyRange::new(0.0, f64::MAX).filter(&record).len(), 3);
    }

    #[test]
    fn test_range_query_dispatch() {
        let record = sample_record();

        let by_money = RangeQuery::Money(MoneyRange::new(800.0, 1000.0));
        assert_eq!(by_money.apply(&record)[0].name(), "Third");

        let by_date = RangeQuery::Date(DateRange::new(date("2021:01:01"), date("2021:12:31")));
        assert_eq!(by_date.apply(&record)[0].name(), "Second");
    }
}
