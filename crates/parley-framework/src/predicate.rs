//! Predicates and the three-valued verdict they combine into.
//!
//! A registration may carry a *content* predicate (over the inbound event)
//! and a *state* predicate (over the persisted conversation state). Each side
//! yields a [`Verdict`]; a side without a predicate is
//! [`Unconstrained`](Verdict::Unconstrained). The two sides are combined
//! with [`Verdict::and`]:
//!
//! | content \ state | Unconstrained | Match   | NoMatch |
//! |-----------------|---------------|---------|---------|
//! | Unconstrained   | NoMatch       | Match   | NoMatch |
//! | Match           | Match         | Match   | NoMatch |
//! | NoMatch         | NoMatch       | NoMatch | NoMatch |
//!
//! A registration with no predicate at all therefore never fires. Use the
//! registry's default handler for catch-all behaviour.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parley_core::{BoxedEvent, ConversationState};

use crate::error::{PredicateError, PredicateKind};

/// What a predicate returns. `Err` counts as "does not match".
pub type PredicateResult = anyhow::Result<bool>;

/// A type-erased predicate over the inbound event.
pub type ContentPredicate = Arc<dyn Fn(&BoxedEvent) -> PredicateResult + Send + Sync>;

/// A type-erased predicate over the conversation state.
pub type StatePredicate = Arc<dyn Fn(&ConversationState) -> PredicateResult + Send + Sync>;

/// The outcome of one side of a registration's check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No predicate was set for this side.
    Unconstrained,
    /// The predicate returned `true`.
    Match,
    /// The predicate returned `false`.
    NoMatch,
}

impl Verdict {
    /// Three-valued AND. Two unconstrained sides do **not** match.
    pub fn and(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Self::Unconstrained, Self::Unconstrained) => Self::NoMatch,
            (Self::Unconstrained, v) | (v, Self::Unconstrained) => v,
            (Self::Match, Self::Match) => Self::Match,
            _ => Self::NoMatch,
        }
    }

    /// Returns `true` only for [`Match`](Self::Match).
    pub fn is_match(self) -> bool {
        self == Self::Match
    }
}

impl From<bool> for Verdict {
    fn from(matched: bool) -> Self {
        if matched { Self::Match } else { Self::NoMatch }
    }
}

/// Evaluates an optional predicate, turning both `Err` and panics into
/// [`PredicateError`].
pub(crate) fn evaluate<T: ?Sized>(
    kind: PredicateKind,
    predicate: Option<&(dyn Fn(&T) -> PredicateResult + Send + Sync)>,
    input: &T,
) -> Result<Verdict, PredicateError> {
    let Some(predicate) = predicate else {
        return Ok(Verdict::Unconstrained);
    };

    match catch_unwind(AssertUnwindSafe(|| predicate(input))) {
        Ok(Ok(matched)) => Ok(matched.into()),
        Ok(Err(source)) => Err(PredicateError::Failed { kind, source }),
        Err(payload) => Err(PredicateError::Panicked {
            kind,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use Verdict::*;

    #[test]
    fn test_and_table() {
        assert_eq!(Unconstrained.and(Unconstrained), NoMatch);
        assert_eq!(Unconstrained.and(Match), Match);
        assert_eq!(Unconstrained.and(NoMatch), NoMatch);
        assert_eq!(Match.and(Unconstrained), Match);
        assert_eq!(NoMatch.and(Unconstrained), NoMatch);
        assert_eq!(Match.and(Match), Match);
        assert_eq!(Match.and(NoMatch), NoMatch);
        assert_eq!(NoMatch.and(Match), NoMatch);
        assert_eq!(NoMatch.and(NoMatch), NoMatch);
    }

    #[test]
    fn test_only_match_is_match() {
        assert!(Match.is_match());
        assert!(!NoMatch.is_match());
        assert!(!Unconstrained.is_match());
    }

    #[test]
    fn test_evaluate_absent_is_unconstrained() {
        let verdict = evaluate::<str>(PredicateKind::Content, None, "x").unwrap();
        assert_eq!(verdict, Unconstrained);
    }

    #[test]
    fn test_evaluate_bool() {
        let yes = |s: &str| -> PredicateResult { Ok(s == "x") };
        assert_eq!(
            evaluate::<str>(PredicateKind::State, Some(&yes), "x").unwrap(),
            Match
        );
        assert_eq!(
            evaluate::<str>(PredicateKind::State, Some(&yes), "y").unwrap(),
            NoMatch
        );
    }

    #[test]
    fn test_evaluate_error() {
        let failing = |_: &str| -> PredicateResult { Err(anyhow!("malformed")) };
        let err = evaluate::<str>(PredicateKind::Content, Some(&failing), "x").unwrap_err();
        assert_eq!(err.kind(), PredicateKind::Content);
        assert_eq!(err.to_string(), "content predicate failed: malformed");
    }

    #[test]
    fn test_evaluate_panic() {
        let panicking = |_: &str| -> PredicateResult { panic!("boom") };
        let err = evaluate::<str>(PredicateKind::State, Some(&panicking), "x").unwrap_err();
        assert!(matches!(
            err,
            PredicateError::Panicked { kind: PredicateKind::State, ref message } if message == "boom"
        ));
    }
}
