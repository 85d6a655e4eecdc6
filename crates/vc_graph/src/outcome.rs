use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Add, AddAssign};

// -----------------------------------------------------------------------------
// Outcome

/// The non-throwing status value returned by every serializer operation.
///
/// An `Outcome` is either a success (possibly carrying warnings) or a
/// failure, plus the list of every message produced along the way.
///
/// Outcomes merge additively:
/// - failure is sticky, merging a failure into a success yields a failure;
/// - messages always accumulate, whatever the status.
///
/// Nested operations merge their outcome into the caller's and keep going,
/// so a caller gets the fullest partial result together with the complete
/// message list.
///
/// # Examples
///
/// ```
/// use vc_graph::Outcome;
///
/// let mut outcome = Outcome::success();
/// outcome += Outcome::warn("field `hp` skipped");
/// assert!(outcome.succeeded());
///
/// outcome += Outcome::fail("no converter for `Foo`");
/// outcome += Outcome::success();
///
/// assert!(outcome.failed());
/// assert_eq!(outcome.messages().len(), 2);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
#[must_use = "an `Outcome` may carry a failure that should be inspected or merged"]
pub struct Outcome {
    failed: bool,
    messages: Vec<String>,
}

impl Outcome {
    /// A success without messages.
    #[inline]
    pub const fn success() -> Self {
        Self {
            failed: false,
            messages: Vec::new(),
        }
    }

    /// A success carrying one warning.
    #[inline]
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            failed: false,
            messages: alloc::vec![message.into()],
        }
    }

    /// A failure carrying one message.
    #[inline]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            failed: true,
            messages: alloc::vec![message.into()],
        }
    }

    /// Returns `true` if no failure was merged in.
    #[inline]
    pub const fn succeeded(&self) -> bool {
        !self.failed
    }

    /// Returns `true` if at least one failure was merged in.
    #[inline]
    pub const fn failed(&self) -> bool {
        self.failed
    }

    /// Returns `true` for a success that still produced messages.
    #[inline]
    pub fn has_warnings(&self) -> bool {
        !self.failed && !self.messages.is_empty()
    }

    /// All messages in the order they were produced.
    #[inline]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Appends a warning without changing the status.
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Merges `other` into `self`.
    pub fn merge(&mut self, other: Outcome) {
        self.failed |= other.failed;
        if self.messages.is_empty() {
            self.messages = other.messages;
        } else {
            self.messages.extend(other.messages);
        }
    }

    /// Joins all messages, one per line.
    pub fn format_messages(&self) -> String {
        self.messages.join("\n")
    }
}

impl AddAssign for Outcome {
    #[inline]
    fn add_assign(&mut self, rhs: Outcome) {
        self.merge(rhs);
    }
}

impl Add for Outcome {
    type Output = Outcome;

    #[inline]
    fn add(mut self, rhs: Outcome) -> Outcome {
        self.merge(rhs);
        self
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("succeeded", &self.succeeded())
            .field("messages", &self.messages)
            .finish()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.failed { "failure" } else { "success" };
        if self.messages.is_empty() {
            f.write_str(status)
        } else {
            write!(f, "{status}: {}", self.messages.join("; "))
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
