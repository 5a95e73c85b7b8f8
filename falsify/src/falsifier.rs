//! The falsification contract: satisfied, falsified or invalid.
//!
//! A [`Falsifier`] evaluates one candidate and reports a [`TryExecutionResult`]. User
//! predicates are adapted through [`Falsifier::predicate`] or [`Falsifier::property`];
//! both catch panics and report them as falsifications.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::{Arc, Once};

/// Status of one falsifier invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub enum TryStatus {
    Satisfied,
    Falsified,
    Invalid,
}

/// Source position where a failure was raised
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl From<&Location<'_>> for ErrorLocation {
    fn from(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The error that made a try fail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TryError {
    kind: String,
    message: String,
    location: Option<ErrorLocation>,
}

impl TryError {
    /// Create an error of `kind`, located at the caller
    #[track_caller]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            location: Some(Location::caller().into()),
        }
    }

    /// Create an error without a known location
    pub fn unlocated(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            location: None,
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>, location: Option<ErrorLocation>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with non-string payload".to_string());
        Self {
            kind: "panic".to_string(),
            message,
            location,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&ErrorLocation> {
        self.location.as_ref()
    }

    /// Whether `other` describes the same failure: same kind raised at the same place
    pub fn is_equivalent_to(&self, other: &TryError) -> bool {
        self.kind == other.kind && self.location == other.location
    }
}

impl fmt::Display for TryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at {})", location)?;
        }
        Ok(())
    }
}

/// Whether two optional errors describe the same failure; two absent errors do
pub fn errors_equivalent(original: Option<&TryError>, candidate: Option<&TryError>) -> bool {
    match (original, candidate) {
        (None, None) => true,
        (Some(original), Some(candidate)) => original.is_equivalent_to(candidate),
        _ => false,
    }
}

thread_local! {
    static PANIC_LOCATION: Cell<Option<ErrorLocation>> = const { Cell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a panic hook that remembers where the current thread last panicked
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            PANIC_LOCATION.with(|cell| cell.set(info.location().map(ErrorLocation::from)));
            previous(info);
        }));
    });
}

/// Run `f`, turning a panic into a located [`TryError`]
fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, TryError> {
    install_panic_hook();
    PANIC_LOCATION.with(|cell| cell.set(None));
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let location = PANIC_LOCATION.with(|cell| cell.take());
        TryError::from_panic(payload, location)
    })
}

/// Outcome of one try
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryOutcome {
    Satisfied,
    Falsified(Option<TryError>),
    Invalid,
}

/// Outcome of one try together with footnotes collected while running it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryExecutionResult {
    outcome: TryOutcome,
    footnotes: Vec<String>,
}

impl TryExecutionResult {
    pub fn satisfied() -> Self {
        TryOutcome::Satisfied.into()
    }

    pub fn falsified(error: Option<TryError>) -> Self {
        TryOutcome::Falsified(error).into()
    }

    pub fn invalid() -> Self {
        TryOutcome::Invalid.into()
    }

    /// Attach footnotes
    pub fn with_footnotes(mut self, footnotes: Vec<String>) -> Self {
        self.footnotes = footnotes;
        self
    }

    pub fn outcome(&self) -> &TryOutcome {
        &self.outcome
    }

    pub fn status(&self) -> TryStatus {
        match self.outcome {
            TryOutcome::Satisfied => TryStatus::Satisfied,
            TryOutcome::Falsified(_) => TryStatus::Falsified,
            TryOutcome::Invalid => TryStatus::Invalid,
        }
    }

    pub fn error(&self) -> Option<&TryError> {
        match &self.outcome {
            TryOutcome::Falsified(error) => error.as_ref(),
            _ => None,
        }
    }

    pub fn footnotes(&self) -> &[String] {
        &self.footnotes
    }

    pub fn is_satisfied(&self) -> bool {
        self.status() == TryStatus::Satisfied
    }

    pub fn is_falsified(&self) -> bool {
        self.status() == TryStatus::Falsified
    }

    pub fn is_invalid(&self) -> bool {
        self.status() == TryStatus::Invalid
    }
}

impl From<TryOutcome> for TryExecutionResult {
    fn from(outcome: TryOutcome) -> Self {
        Self {
            outcome,
            footnotes: Vec::new(),
        }
    }
}

/// Why a property closure did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyFailure {
    /// The property does not hold
    Falsified(TryError),
    /// The candidate does not satisfy an assumption; it is discarded
    Assumption,
}

impl PropertyFailure {
    /// A failure located at the caller
    #[track_caller]
    pub fn falsified(message: impl Into<String>) -> Self {
        PropertyFailure::Falsified(TryError::new("assertion", message))
    }
}

/// Discard the current candidate unless `condition` holds
pub fn assume(condition: bool) -> Result<(), PropertyFailure> {
    if condition {
        Ok(())
    } else {
        Err(PropertyFailure::Assumption)
    }
}

/// Fail with `message` unless `condition` holds; the location is the caller's
#[track_caller]
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), PropertyFailure> {
    if condition {
        Ok(())
    } else {
        Err(PropertyFailure::falsified(message))
    }
}

type Check<T> = Arc<dyn Fn(&T) -> TryExecutionResult + Send + Sync>;

/// Evaluates candidates against a property
pub struct Falsifier<T> {
    check: Check<T>,
}

impl<T> Clone for Falsifier<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
        }
    }
}

impl<T: 'static> Falsifier<T> {
    /// A falsifier reporting results directly
    pub fn new(check: impl Fn(&T) -> TryExecutionResult + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    /// A falsifier for a boolean predicate; `false` and panics falsify
    pub fn predicate(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::new(move |value| {
            match catch_panic(|| predicate(value)) {
                Ok(true) => TryExecutionResult::satisfied(),
                Ok(false) => TryExecutionResult::falsified(None),
                Err(error) => TryExecutionResult::falsified(Some(error)),
            }
        })
    }

    /// A falsifier for a property returning [`PropertyFailure`]s; panics falsify
    pub fn property(
        property: impl Fn(&T) -> Result<(), PropertyFailure> + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |value| {
            match catch_panic(|| property(value)) {
                Ok(Ok(())) => TryExecutionResult::satisfied(),
                Ok(Err(PropertyFailure::Assumption)) => TryExecutionResult::invalid(),
                Ok(Err(PropertyFailure::Falsified(error))) => {
                    TryExecutionResult::falsified(Some(error))
                }
                Err(error) => TryExecutionResult::falsified(Some(error)),
            }
        })
    }

    /// Evaluate one candidate
    pub fn execute(&self, value: &T) -> TryExecutionResult {
        (self.check)(value)
    }

    /// Candidates rejected by `filter` are invalid without running this falsifier
    pub fn with_filter(&self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        let inner = self.clone();
        Self::new(move |value| {
            if filter(value) {
                inner.execute(value)
            } else {
                TryExecutionResult::invalid()
            }
        })
    }

    /// Falsified results count only if their error is equivalent to `original`;
    /// all others become invalid
    pub fn requiring_equivalent_error(&self, original: Option<TryError>) -> Self {
        let inner = self.clone();
        Self::new(move |value| {
            let result = inner.execute(value);
            if result.is_falsified() && !errors_equivalent(original.as_ref(), result.error()) {
                return TryExecutionResult::invalid().with_footnotes(result.footnotes);
            }
            result
        })
    }

    /// Evaluate a derived value with this falsifier
    pub fn contramap<S: 'static>(&self, f: impl Fn(&S) -> T + Send + Sync + 'static) -> Falsifier<S> {
        let inner = self.clone();
        Falsifier::new(move |value| inner.execute(&f(value)))
    }
}
