//! # Publication order.
//!
//! [`OrderMode`] decides when a completed slot's output may be published.
//!
//! - [`OrderMode::Submission`] outputs leave in the order inputs were submitted (default).
//! - [`OrderMode::Completion`] outputs leave as soon as their processing finishes.
//!
//! ## Example
//! ```text
//! submit(a) submit(b) submit(c)      processing finishes: b, c, a
//!
//! OrderMode::Completion  → publish b, c, a
//! OrderMode::Submission  → (hold b, c) ... a done → publish a, b, c
//! ```

/// Policy controlling the order in which outputs are published.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderMode {
    /// Publish in submission order: slot `i` waits until slot `i - 1` is published.
    #[default]
    Submission,
    /// Publish in completion order: every slot is published the moment it completes.
    Completion,
}

impl OrderMode {
    /// Maps the boolean constructor flag: `true` keeps submission order.
    ///
    /// # Example
    /// ```
    /// use seqvisor::OrderMode;
    ///
    /// assert_eq!(OrderMode::from_flag(true), OrderMode::Submission);
    /// assert_eq!(OrderMode::from_flag(false), OrderMode::Completion);
    /// ```
    #[inline]
    pub fn from_flag(maintain_order: bool) -> Self {
        if maintain_order {
            OrderMode::Submission
        } else {
            OrderMode::Completion
        }
    }

    /// Returns `true` for [`OrderMode::Submission`].
    #[inline]
    pub fn keeps_submission_order(self) -> bool {
        matches!(self, OrderMode::Submission)
    }
}

impl From<bool> for OrderMode {
    fn from(maintain_order: bool) -> Self {
        OrderMode::from_flag(maintain_order)
    }
}
