//! Payroll validation requests.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};
use crate::types::common::{Account, Individual, Transaction};

/// Request to validate a payroll destination account.
///
/// Extends an account validation with the employee's title and department
/// and the payroll transactions about to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollValidationRequest {
    /// Caller-supplied request id; a v4 UUID is generated when absent.
    pub request_id: Option<String>,

    /// Destination account.
    pub account: Account,

    /// Employee receiving the payroll.
    pub individual: Individual,

    /// Payroll transactions asserted with the request.
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Wire<'a> {
    request_id: &'a str,
    account: &'a Account,
    entity: EntityWire<'a>,
    transactions: &'a [Transaction],
}

#[derive(Serialize)]
struct EntityWire<'a> {
    individual: &'a Individual,
}

impl PayrollValidationRequest {
    /// Creates a request for the given account and employee.
    pub fn new(account: Account, individual: Individual) -> Self {
        Self {
            request_id: None,
            account,
            individual,
            transactions: Vec::new(),
        }
    }

    /// Pins the request id instead of generating one.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Adds a transaction to the request.
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] naming the offending
    /// field.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.account.account_number.is_empty() {
            return Err(ValidationError::invalid_param(
                "account number must not be empty",
                "account_number",
            ));
        }
        if self.individual.first_name.is_empty() || self.individual.last_name.is_empty() {
            return Err(ValidationError::invalid_param(
                "individual name must not be empty",
                "individual",
            ));
        }
        if self.transactions.is_empty() {
            return Err(ValidationError::invalid_param(
                "payroll validation requires at least one transaction",
                "transactions",
            ));
        }
        Ok(())
    }

    /// Serializes the request to its wire payload.
    pub fn to_payload(&self) -> ValidationResult<String> {
        self.validate()?;
        let request_id = self
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let wire = [Wire {
            request_id: &request_id,
            account: &self.account,
            entity: EntityWire {
                individual: &self.individual,
            },
            transactions: &self.transactions,
        }];
        Ok(serde_json::to_string(&wire)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PayrollValidationRequest {
        PayrollValidationRequest::new(
            Account::aba("987654321", "122199983"),
            Individual::new("Maria", "Santos")
                .with_title("CEO")
                .with_department("EXECUTIVE"),
        )
        .with_transaction(Transaction::payroll(5000.0, "USD"))
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = request().to_payload().unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();

        let entry = &json.as_array().unwrap()[0];
        assert_eq!(entry["account"]["accountNumber"], "987654321");
        assert_eq!(entry["entity"]["individual"]["title"], "CEO");
        assert_eq!(entry["entity"]["individual"]["department"], "EXECUTIVE");

        let transactions = entry["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["context"], "PAYROLL");
        assert_eq!(transactions[0]["amount"]["amount"], 5000.0);
        assert_eq!(transactions[0]["amount"]["currency"], "USD");
    }

    #[test]
    fn test_requires_a_transaction() {
        let bare = PayrollValidationRequest::new(
            Account::aba("987654321", "122199983"),
            Individual::new("Maria", "Santos"),
        );

        let err = bare.to_payload().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidArgument { param: Some(ref p), .. } if p == "transactions"
        ));
    }
}
