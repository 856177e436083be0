//! Form input model for a new payment request.

use super::ports::Connection;
use super::workflow::WorkflowStatus;
use crate::domain::ReferenceData;

/// Editable fields of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    StorageChain,
    Amount,
    Currency,
    PaymentRecipient,
    PayerIdentity,
    DueDate,
    Reason,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::StorageChain,
        FormField::Amount,
        FormField::Currency,
        FormField::PaymentRecipient,
        FormField::PayerIdentity,
        FormField::DueDate,
        FormField::Reason,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::StorageChain => "Storage Chain *",
            FormField::Amount => "Amount *",
            FormField::Currency => "Currency *",
            FormField::PaymentRecipient => "Payment Recipient",
            FormField::PayerIdentity => "Payer Identity",
            FormField::DueDate => "Due Date",
            FormField::Reason => "Reason",
        }
    }

    /// Whether the field is picked from a reference table rather than typed.
    pub fn is_select(&self) -> bool {
        matches!(self, FormField::StorageChain | FormField::Currency)
    }

    pub fn next(&self) -> FormField {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> FormField {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Syntactic address check: `0x` prefix and 42 characters in total.
///
/// This does not validate hex digits or the checksum. It is a lightweight
/// input filter, not a security boundary.
pub fn is_address_shaped(value: &str) -> bool {
    value.starts_with("0x") && value.chars().count() == 42
}

/// User-entered request fields. Optional fields are empty when unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub storage_chain_key: String,
    pub currency_key: String,
    pub expected_amount: String,
    pub payment_recipient: String,
    pub payer_identity: String,
    pub due_date: String,
    pub reason: String,
}

impl FormState {
    /// Empty form with both selects on the first entry of their table.
    pub fn with_defaults(reference: &ReferenceData) -> Self {
        Self {
            storage_chain_key: reference.storage_chains.default_key().to_string(),
            currency_key: reference.currencies.default_key().to_string(),
            ..Self::default()
        }
    }

    pub fn set_storage_chain(&mut self, key: impl Into<String>) {
        self.storage_chain_key = key.into();
    }

    pub fn set_currency(&mut self, key: impl Into<String>) {
        self.currency_key = key.into();
    }

    pub fn set_expected_amount(&mut self, amount: impl Into<String>) {
        self.expected_amount = amount.into();
    }

    pub fn set_payment_recipient(&mut self, address: impl Into<String>) {
        self.payment_recipient = address.into();
    }

    pub fn set_payer_identity(&mut self, address: impl Into<String>) {
        self.payer_identity = address.into();
    }

    pub fn set_due_date(&mut self, date: impl Into<String>) {
        self.due_date = date.into();
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::StorageChain => &self.storage_chain_key,
            FormField::Amount => &self.expected_amount,
            FormField::Currency => &self.currency_key,
            FormField::PaymentRecipient => &self.payment_recipient,
            FormField::PayerIdentity => &self.payer_identity,
            FormField::DueDate => &self.due_date,
            FormField::Reason => &self.reason,
        }
    }

    pub fn set_value(&mut self, field: FormField, value: impl Into<String>) {
        match field {
            FormField::StorageChain => self.set_storage_chain(value),
            FormField::Amount => self.set_expected_amount(value),
            FormField::Currency => self.set_currency(value),
            FormField::PaymentRecipient => self.set_payment_recipient(value),
            FormField::PayerIdentity => self.set_payer_identity(value),
            FormField::DueDate => self.set_due_date(value),
            FormField::Reason => self.set_reason(value),
        }
    }

    /// Whether the submit action is enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use rn_create_request::application::{Connection, FormState, WorkflowStatus};
    ///
    /// let form = FormState::default();
    /// assert!(!form.can_submit(WorkflowStatus::AwaitingInput, &Connection::Disconnected));
    /// ```
    pub fn can_submit(&self, status: WorkflowStatus, connection: &Connection) -> bool {
        status != WorkflowStatus::Submitting
            && connection.is_ready()
            && !self.storage_chain_key.is_empty()
            && (self.payment_recipient.is_empty() || is_address_shaped(&self.payment_recipient))
            && (self.payer_identity.is_empty() || is_address_shaped(&self.payer_identity))
            && !self.expected_amount.is_empty()
            && !self.currency_key.is_empty()
    }
}
