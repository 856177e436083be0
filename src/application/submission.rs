//! Payload construction and the create-then-confirm call sequence.

use super::errors::SubmissionError;
use super::form::FormState;
use super::ports::{Account, RequestClient};
use super::workflow::{StatusUpdate, SubmissionEvent};
use crate::domain::{
    APP_NAME, BUILDER_ID, ContentData, CreateRequestParameters, Currency, CurrencyDescriptor,
    DomainResult, ERC20_FEE_PROXY_CONTRACT, Identity, PaymentNetwork, PaymentNetworkParameters,
    RequestInfo, ZERO_ADDRESS, to_smallest_unit,
};
use tracing::{error, info};

/// Builds the creation payload for the invoicing client.
///
/// The payer is only set when the form names one; the payment address
/// falls back to the payee. Fees are always zero.
pub fn build_create_parameters(
    form: &FormState,
    currency: &Currency,
    payee: &str,
    timestamp: u64,
) -> DomainResult<CreateRequestParameters> {
    let expected_amount = to_smallest_unit(&form.expected_amount, currency.decimals)?;

    let payer = if form.payer_identity.is_empty() {
        None
    } else {
        Some(Identity::ethereum(form.payer_identity.as_str()))
    };

    let payment_address = if form.payment_recipient.is_empty() {
        payee.to_string()
    } else {
        form.payment_recipient.clone()
    };

    Ok(CreateRequestParameters {
        request_info: RequestInfo {
            currency: CurrencyDescriptor::from(currency),
            expected_amount,
            payee: Identity::ethereum(payee),
            payer,
            timestamp,
        },
        payment_network: PaymentNetwork {
            id: ERC20_FEE_PROXY_CONTRACT.to_string(),
            parameters: PaymentNetworkParameters {
                payment_network_name: currency.network.clone(),
                payment_address,
                fee_address: ZERO_ADDRESS.to_string(),
                fee_amount: "0".to_string(),
            },
        },
        content_data: ContentData {
            reason: form.reason.clone(),
            due_date: form.due_date.clone(),
            builder_id: BUILDER_ID.to_string(),
            created_with: APP_NAME.to_string(),
        },
        signer: Identity::ethereum(payee),
    })
}

/// Everything a worker needs to run one submission, detached from the UI state.
#[derive(Debug, Clone)]
pub struct SubmissionJob {
    pub submission: u64,
    pub form: FormState,
    pub currency: Currency,
    pub gateway: String,
    pub account: Account,
    pub timestamp: u64,
}

impl SubmissionJob {
    /// Runs the submission to completion, reporting each step through `report`.
    ///
    /// Every path ends with either `Confirmed` or `Failed`.
    pub fn run(self, client: &dyn RequestClient, mut report: impl FnMut(StatusUpdate)) {
        let submission = self.submission;
        let mut emit = |event: SubmissionEvent| report(StatusUpdate { submission, event });

        if let Err(e) = self.execute(client, &mut emit) {
            error!(submission, error = %e, "submission failed");
            emit(SubmissionEvent::Failed(e.to_string()));
        }
    }

    fn execute(
        &self,
        client: &dyn RequestClient,
        emit: &mut impl FnMut(SubmissionEvent),
    ) -> Result<(), SubmissionError> {
        let parameters =
            build_create_parameters(&self.form, &self.currency, &self.account.address, self.timestamp)?;

        emit(SubmissionEvent::PersistingToRemoteStore);
        info!(submission = self.submission, gateway = %self.gateway, "creating request");
        let handle = client.create_request(&self.gateway, &parameters, self.account.signer.as_ref())?;

        emit(SubmissionEvent::Persisted(handle.data()));
        info!(submission = self.submission, "request persisted, waiting for confirmation");
        let confirmed = handle.wait_for_confirmation()?;

        info!(submission = self.submission, request_id = ?confirmed.request_id(), "request confirmed");
        emit(SubmissionEvent::Confirmed(confirmed));
        Ok(())
    }
}
