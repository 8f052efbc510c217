//! Quote request form and its submission lifecycle.
//!
//! ```text
//!   Closed ──open──▶ Editing ──submit──▶ Submitted { completes_at }
//!     │ ▲               │                   ▲    │
//!     │ └──── close ────┘                   │    │ poll(now ≥ completes_at)
//!     └──────────────── submit ─────────────┘    │ or close
//!     ▲                                          │
//!     └──────────────────────────────────────────┘  (cart cleared)
//! ```
//!
//! Opening the form is a display concern only; a request posted while the
//! form is closed is accepted the same way.
//!
//! Completion is driven by the caller: the deadline is stored with the
//! submission and applied by [`QuoteSubmission::poll`] on the visitor's next
//! interaction. Nothing fires in the background. Completion clears the whole
//! cart as it is at that moment, including lines added after the request was
//! sent.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::cart::{QuoteCart, QuoteItem};
use crate::types::{ContactEmail, EmailError};

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteForm {
    pub company: String,
    pub estimated_volume: String,
    pub city: String,
    pub email: String,
    pub phone: String,
}

/// Form validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteFormError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("the quote cart is empty")]
    EmptyCart,

    #[error("a quote request is already being sent")]
    AlreadySubmitted,

    #[error(transparent)]
    Form(#[from] QuoteFormError),
}

/// A validated quote request ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub company: String,
    pub estimated_volume: String,
    pub city: String,
    pub email: ContactEmail,
    pub phone: String,
    pub items: Vec<QuoteItem>,
    pub total_items: u64,
    pub submitted_at: DateTime<Utc>,
}

impl QuoteForm {
    /// Validate the form against a snapshot of the cart.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteFormError::MissingFields`] listing every blank field, or
    /// [`QuoteFormError::InvalidEmail`] for a malformed address.
    pub fn validate(
        &self,
        cart: &QuoteCart,
        now: DateTime<Utc>,
    ) -> Result<QuoteRequest, QuoteFormError> {
        let fields = [
            ("company", self.company.trim()),
            ("estimated_volume", self.estimated_volume.trim()),
            ("city", self.city.trim()),
            ("email", self.email.trim()),
            ("phone", self.phone.trim()),
        ];
        let missing: Vec<_> = fields
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(QuoteFormError::MissingFields(missing));
        }

        Ok(QuoteRequest {
            company: self.company.trim().to_owned(),
            estimated_volume: self.estimated_volume.trim().to_owned(),
            city: self.city.trim().to_owned(),
            email: ContactEmail::parse(&self.email)?,
            phone: self.phone.trim().to_owned(),
            items: cart.items().to_vec(),
            total_items: cart.total_items(),
            submitted_at: now,
        })
    }
}

/// Where the form is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Closed,
    Editing,
    Submitted { completes_at: DateTime<Utc> },
}

/// The visitor's quote request form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSubmission {
    state: SubmissionState,
    form: QuoteForm,
}

impl QuoteSubmission {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> SubmissionState {
        self.state
    }

    /// The last submitted field values, cleared on completion.
    #[must_use]
    pub const fn form(&self) -> &QuoteForm {
        &self.form
    }

    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self.state, SubmissionState::Submitted { .. })
    }

    /// Show the form. Has no effect while a submission is pending.
    pub fn open(&mut self) {
        if self.state == SubmissionState::Closed {
            self.state = SubmissionState::Editing;
        }
    }

    /// Hide the form. Dismissing a submitted form completes it immediately.
    pub fn close(&mut self, cart: &mut QuoteCart) {
        if self.is_submitted() {
            self.complete(cart);
        } else {
            self.state = SubmissionState::Closed;
        }
    }

    /// Validate and accept a request from either the closed or the editing
    /// state. The cart is left untouched until the submission completes
    /// `delay` after `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] for an empty cart, an invalid form, or a
    /// submission that is already pending.
    pub fn submit(
        &mut self,
        form: QuoteForm,
        cart: &QuoteCart,
        now: DateTime<Utc>,
        delay: TimeDelta,
    ) -> Result<QuoteRequest, SubmissionError> {
        if self.is_submitted() {
            return Err(SubmissionError::AlreadySubmitted);
        }
        if cart.is_empty() {
            return Err(SubmissionError::EmptyCart);
        }

        let request = form.validate(cart, now)?;
        self.form = form;
        self.state = SubmissionState::Submitted {
            completes_at: now + delay,
        };
        info!(
            lines = request.items.len(),
            total_items = request.total_items,
            "quote request accepted"
        );
        Ok(request)
    }

    /// Complete a pending submission whose deadline has passed.
    ///
    /// Returns `true` if the cart was cleared by this call.
    pub fn poll(&mut self, cart: &mut QuoteCart, now: DateTime<Utc>) -> bool {
        match self.state {
            SubmissionState::Submitted { completes_at } if now >= completes_at => {
                self.complete(cart);
                true
            }
            _ => false,
        }
    }

    fn complete(&mut self, cart: &mut QuoteCart) {
        cart.clear();
        cart.close();
        self.state = SubmissionState::Closed;
        self.form = QuoteForm::default();
        debug!("quote submission completed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::catalog::builtin_products;
    use crate::types::Quantity;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn delay() -> TimeDelta {
        TimeDelta::milliseconds(2500)
    }

    fn form() -> QuoteForm {
        QuoteForm {
            company: "Aguas del Norte S.A.".to_string(),
            estimated_volume: "500 mil / mes".to_string(),
            city: "Salta".to_string(),
            email: " Compras@AguasNorte.com.ar ".to_string(),
            phone: "+54 387 555 0101".to_string(),
        }
    }

    fn cart() -> QuoteCart {
        let mut cart = QuoteCart::new();
        let products = builtin_products();
        cart.add_item(products[1].clone(), Quantity::new(3).unwrap());
        cart.add_item(products[2].clone(), Quantity::new(2).unwrap());
        cart.open();
        cart
    }

    #[test]
    fn test_validate_reports_every_blank_field() {
        let form = QuoteForm {
            company: "Acme".to_string(),
            city: "  ".to_string(),
            ..QuoteForm::default()
        };
        assert_eq!(
            form.validate(&cart(), at(0)),
            Err(QuoteFormError::MissingFields(vec![
                "estimated_volume",
                "city",
                "email",
                "phone"
            ]))
        );
    }

    #[test]
    fn test_validate_rejects_malformed_email() {
        let form = QuoteForm {
            email: "compras-at-aguas".to_string(),
            ..form()
        };
        assert!(matches!(
            form.validate(&cart(), at(0)),
            Err(QuoteFormError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_request_snapshots_cart() {
        let request = form().validate(&cart(), at(0)).unwrap();
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.total_items, 5);
        assert_eq!(request.email.as_str(), "compras@aguasnorte.com.ar");
    }

    #[test]
    fn test_cart_cleared_only_after_deadline() {
        let mut cart = cart();
        let mut submission = QuoteSubmission::new();
        submission.open();
        submission.submit(form(), &cart, at(1_000), delay()).unwrap();

        assert!(!submission.poll(&mut cart, at(3_499)));
        assert_eq!(cart.line_count(), 2);
        assert!(submission.is_submitted());

        assert!(submission.poll(&mut cart, at(3_500)));
        assert!(cart.is_empty());
        assert!(!cart.is_open());
        assert_eq!(submission.state(), SubmissionState::Closed);
        assert_eq!(submission.form(), &QuoteForm::default());
    }

    #[test]
    fn test_submit_without_opening_form() {
        let mut cart = cart();
        let mut submission = QuoteSubmission::new();
        assert_eq!(submission.state(), SubmissionState::Closed);

        submission.submit(form(), &cart, at(1_000), delay()).unwrap();
        assert!(submission.is_submitted());
        assert!(submission.poll(&mut cart, at(3_500)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_completion_clears_lines_added_while_pending() {
        let mut cart = cart();
        let mut submission = QuoteSubmission::new();
        submission.submit(form(), &cart, at(1_000), delay()).unwrap();

        let late = builtin_products().into_iter().last().unwrap();
        cart.add_item(late, Quantity::new(1).unwrap());
        assert_eq!(cart.line_count(), 3);

        assert!(submission.poll(&mut cart, at(3_500)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_closing_submitted_form_completes_immediately() {
        let mut cart = cart();
        let mut submission = QuoteSubmission::new();
        submission.submit(form(), &cart, at(0), delay()).unwrap();

        submission.close(&mut cart);
        assert!(cart.is_empty());
        assert!(!submission.poll(&mut cart, at(10_000)));
    }

    #[test]
    fn test_closing_editing_form_keeps_cart() {
        let mut cart = cart();
        let mut submission = QuoteSubmission::new();
        submission.open();
        submission.close(&mut cart);
        assert_eq!(submission.state(), SubmissionState::Closed);
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_empty_cart_cannot_be_submitted() {
        let mut submission = QuoteSubmission::new();
        submission.open();
        assert_eq!(
            submission.submit(form(), &QuoteCart::new(), at(0), delay()),
            Err(SubmissionError::EmptyCart)
        );
        assert_eq!(submission.state(), SubmissionState::Editing);
    }

    #[test]
    fn test_double_submit_is_refused() {
        let cart = cart();
        let mut submission = QuoteSubmission::new();
        submission.submit(form(), &cart, at(0), delay()).unwrap();
        assert_eq!(
            submission.submit(form(), &cart, at(1), delay()),
            Err(SubmissionError::AlreadySubmitted)
        );
    }

    #[test]
    fn test_invalid_form_leaves_state_unchanged() {
        let cart = cart();
        let mut submission = QuoteSubmission::new();
        submission.open();
        let result = submission.submit(QuoteForm::default(), &cart, at(0), delay());
        assert!(matches!(result, Err(SubmissionError::Form(_))));
        assert_eq!(submission.state(), SubmissionState::Editing);
    }

    #[test]
    fn test_open_does_not_interrupt_pending_submission() {
        let cart = cart();
        let mut submission = QuoteSubmission::new();
        submission.submit(form(), &cart, at(0), delay()).unwrap();
        submission.open();
        assert!(submission.is_submitted());
    }
}
