// 🎯 Selection Resolver - from candidate matches to one entity (or none)
//
// The resolver never talks to the terminal. When a human has to pick, it hands
// back a Disambiguation that the front-end renders; the chosen menu number is
// fed back through `Disambiguation::finalize`.

use crate::error::{CrmError, CrmResult};

/// Menu value the front-end uses for "cancel"
pub const CANCEL_CHOICE: i64 = -1;

// ============================================================================
// MODE / CHOICE / OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Ambiguous results are handed to a human
    Interactive,

    /// Only the exact fast path can select (used by load-merge)
    NonInteractive,
}

/// What the human answered to a disambiguation menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// 1-based position in the candidate list
    Pick(usize),
    Cancel,
}

impl Choice {
    /// Map a raw menu value: CANCEL_CHOICE cancels, anything else is a position
    pub fn from_menu_value(value: i64) -> CrmResult<Choice> {
        if value == CANCEL_CHOICE {
            return Ok(Choice::Cancel);
        }
        usize::try_from(value)
            .ok()
            .filter(|v| *v >= 1)
            .map(Choice::Pick)
            .ok_or_else(|| CrmError::validation("menu choice", format!("{} is not a valid choice", value)))
    }
}

/// Tri-state result of any operation that may need human disambiguation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Chosen(T),
    Empty,
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Chosen(value) => Outcome::Chosen(f(value)),
            Outcome::Empty => Outcome::Empty,
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }

    pub fn chosen(self) -> Option<T> {
        match self {
            Outcome::Chosen(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

// ============================================================================
// DISAMBIGUATION REQUEST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disambiguation<T> {
    candidates: Vec<T>,
}

impl<T> Disambiguation<T> {
    pub fn candidates(&self) -> &[T] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates with their 1-based menu numbers
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &T)> {
        self.candidates.iter().enumerate().map(|(i, c)| (i + 1, c))
    }

    /// The front-end validates bounds before calling; an out-of-range pick
    /// still comes back as a Validation error instead of a panic.
    pub fn finalize(mut self, choice: Choice) -> CrmResult<Outcome<T>> {
        match choice {
            Choice::Cancel => Ok(Outcome::Cancelled),
            Choice::Pick(position) if (1..=self.candidates.len()).contains(&position) => {
                Ok(Outcome::Chosen(self.candidates.swap_remove(position - 1)))
            }
            Choice::Pick(position) => Err(CrmError::validation(
                "menu choice",
                format!("{} is outside 1..={}", position, self.candidates.len()),
            )),
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Disambiguation<U> {
        Disambiguation {
            candidates: self.candidates.into_iter().map(f).collect(),
        }
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// No candidates at all
    NoMatch,

    /// Exactly one candidate satisfied the exact criteria
    Exact(T),

    /// Non-interactive mode and no exact hit
    NoSelection,

    /// A human has to pick
    NeedsChoice(Disambiguation<T>),
}

impl<T> Resolution<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Resolution<U> {
        match self {
            Resolution::NoMatch => Resolution::NoMatch,
            Resolution::Exact(value) => Resolution::Exact(f(value)),
            Resolution::NoSelection => Resolution::NoSelection,
            Resolution::NeedsChoice(request) => Resolution::NeedsChoice(request.map(f)),
        }
    }

    /// The exact hit, if any; this is all the merge path needs
    pub fn exact(self) -> Option<T> {
        match self {
            Resolution::Exact(value) => Some(value),
            _ => None,
        }
    }

    /// Collapse to an Outcome, asking `ask` only when a human choice is needed.
    /// A failing `ask` (closed input, broken terminal) is passed through as is.
    pub fn into_outcome<F, E>(self, ask: F) -> Result<Outcome<T>, E>
    where
        F: FnOnce(&Disambiguation<T>) -> Result<Choice, E>,
        E: From<CrmError>,
    {
        match self {
            Resolution::NoMatch | Resolution::NoSelection => Ok(Outcome::Empty),
            Resolution::Exact(value) => Ok(Outcome::Chosen(value)),
            Resolution::NeedsChoice(request) => {
                let choice = ask(&request)?;
                Ok(request.finalize(choice)?)
            }
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Decide between the exact fast path, "no selection" and a human choice.
///
/// `exact` is the case-sensitive criteria supplied by the caller (for
/// customers: both name and surname were given). The fast path fires only when
/// exactly one candidate satisfies it.
pub fn resolve<T>(candidates: Vec<T>, exact: Option<&dyn Fn(&T) -> bool>, mode: Mode) -> Resolution<T> {
    if candidates.is_empty() {
        return Resolution::NoMatch;
    }

    if let Some(is_exact) = exact {
        let mut hits = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| is_exact(*c))
            .map(|(index, _)| index);

        if let (Some(index), None) = (hits.next(), hits.next()) {
            let mut candidates = candidates;
            return Resolution::Exact(candidates.swap_remove(index));
        }
    }

    match mode {
        Mode::NonInteractive => Resolution::NoSelection,
        Mode::Interactive => Resolution::NeedsChoice(Disambiguation { candidates }),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<&'static str> {
        vec!["Anna", "Annabel", "Marianna"]
    }

    #[test]
    fn test_empty_candidates_is_no_match() {
        let resolution = resolve(Vec::<&str>::new(), None, Mode::Interactive);
        assert_eq!(resolution, Resolution::NoMatch);
    }

    #[test]
    fn test_exact_fast_path() {
        let is_exact = |c: &&str| *c == "Annabel";
        let resolution = resolve(names(), Some(&is_exact), Mode::Interactive);
        assert_eq!(resolution, Resolution::Exact("Annabel"));

        // fast path works without a human as well
        let resolution = resolve(names(), Some(&is_exact), Mode::NonInteractive);
        assert_eq!(resolution.exact(), Some("Annabel"));
    }

    #[test]
    fn test_ambiguous_exact_criteria_falls_through() {
        let is_exact = |c: &&str| c.starts_with("Anna");
        let resolution = resolve(names(), Some(&is_exact), Mode::NonInteractive);
        assert_eq!(resolution, Resolution::NoSelection);
    }

    #[test]
    fn test_non_interactive_without_exact_hit() {
        let is_exact = |c: &&str| *c == "Bruno";
        assert_eq!(
            resolve(names(), Some(&is_exact), Mode::NonInteractive),
            Resolution::NoSelection
        );
        assert_eq!(resolve(names(), None, Mode::NonInteractive), Resolution::NoSelection);
    }

    #[test]
    fn test_interactive_pick_and_cancel() {
        let Resolution::NeedsChoice(request) = resolve(names(), None, Mode::Interactive) else {
            panic!("expected a disambiguation request");
        };

        let numbered: Vec<(usize, &&str)> = request.numbered().collect();
        assert_eq!(numbered[0], (1, &"Anna"));
        assert_eq!(numbered[2], (3, &"Marianna"));

        assert_eq!(
            request.clone().finalize(Choice::Pick(2)).unwrap(),
            Outcome::Chosen("Annabel")
        );
        assert_eq!(
            request.clone().finalize(Choice::Cancel).unwrap(),
            Outcome::Cancelled
        );
        assert!(request.finalize(Choice::Pick(4)).is_err());
    }

    #[test]
    fn test_into_outcome_asks_only_when_needed() {
        let mut asked = false;
        let outcome = resolve(vec!["Anna"], None, Mode::Interactive)
            .into_outcome(|request| {
                asked = true;
                assert_eq!(request.len(), 1);
                Ok::<_, CrmError>(Choice::Pick(1))
            })
            .unwrap();
        assert!(asked);
        assert_eq!(outcome, Outcome::Chosen("Anna"));

        let outcome = resolve(Vec::<&str>::new(), None, Mode::Interactive)
            .into_outcome(|_| -> CrmResult<Choice> { panic!("no human needed") })
            .unwrap();
        assert_eq!(outcome, Outcome::Empty);
    }

    #[test]
    fn test_into_outcome_passes_ask_failure_through() {
        let err = resolve(vec!["Anna", "Annabel"], None, Mode::Interactive)
            .into_outcome(|_| Err(CrmError::validation("menu choice", "input closed")))
            .unwrap_err();
        assert!(err.to_string().contains("input closed"));

        // an out-of-range pick surfaces as the finalize error
        let err = resolve(vec!["Anna", "Annabel"], None, Mode::Interactive)
            .into_outcome(|_| Ok::<_, CrmError>(Choice::Pick(9)))
            .unwrap_err();
        assert!(matches!(err, CrmError::Validation { .. }));
    }

    #[test]
    fn test_choice_from_menu_value() {
        assert_eq!(Choice::from_menu_value(-1).unwrap(), Choice::Cancel);
        assert_eq!(Choice::from_menu_value(3).unwrap(), Choice::Pick(3));
        assert!(Choice::from_menu_value(0).is_err());
        assert!(Choice::from_menu_value(-7).is_err());
    }

    #[test]
    fn test_outcome_helpers() {
        assert_eq!(Outcome::Chosen(2).map(|v| v * 10), Outcome::Chosen(20));
        assert!(Outcome::<u8>::Cancelled.is_cancelled());
        assert_eq!(Outcome::<u8>::Empty.chosen(), None);
    }
}
