//! Wire-format building blocks shared across validation requests.

use serde::{Deserialize, Serialize};

/// A person named on a validation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Full name as it appears on the account.
    pub full_name: String,

    /// Job title, used on payroll validations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Department, used on payroll validations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl Individual {
    /// Creates an individual, deriving the full name from the parts.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let full_name = format!("{} {}", first_name, last_name);
        Self {
            first_name,
            last_name,
            full_name,
            title: None,
            department: None,
        }
    }

    /// Overrides the derived full name.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Sets the job title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// Clearing-system identifier for a financial institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearingSystemId {
    /// Identifier within the clearing system, e.g. an ABA routing number.
    pub id: String,

    /// Clearing-system scheme, e.g. `"ABA"`.
    pub id_type: String,
}

/// Identifies the institution holding an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInstitutionId {
    /// Clearing-system identifier.
    pub clearing_system_id: ClearingSystemId,
}

/// A bank account named on a validation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account number.
    pub account_number: String,

    /// Institution holding the account.
    pub financial_institution_id: FinancialInstitutionId,
}

impl Account {
    /// Creates an account identified within a clearing system.
    pub fn new(
        account_number: impl Into<String>,
        clearing_id: impl Into<String>,
        id_type: impl Into<String>,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            financial_institution_id: FinancialInstitutionId {
                clearing_system_id: ClearingSystemId {
                    id: clearing_id.into(),
                    id_type: id_type.into(),
                },
            },
        }
    }

    /// Creates a US account identified by an ABA routing number.
    pub fn aba(account_number: impl Into<String>, routing_number: impl Into<String>) -> Self {
        Self::new(account_number, routing_number, "ABA")
    }
}

/// Monetary amount on a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    /// Numeric amount.
    pub amount: f64,

    /// ISO 4217 currency code.
    pub currency: String,
}

/// A transaction asserted alongside a validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction context, e.g. `"PAYROLL"`.
    pub context: String,

    /// Transaction amount.
    pub amount: Amount,
}

impl Transaction {
    /// Creates a payroll transaction.
    pub fn payroll(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            context: "PAYROLL".to_string(),
            amount: Amount {
                amount,
                currency: currency.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_individual_derives_full_name() {
        let individual = Individual::new("Jane", "Abbott");
        assert_eq!(individual.full_name, "Jane Abbott");
        assert!(individual.title.is_none());
    }

    #[test]
    fn test_individual_serializes_camel_case() {
        let individual = Individual::new("Jane", "Abbott")
            .with_title("CEO")
            .with_department("EXECUTIVE");
        let json = serde_json::to_value(&individual).unwrap();

        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["lastName"], "Abbott");
        assert_eq!(json["fullName"], "Jane Abbott");
        assert_eq!(json["title"], "CEO");
        assert_eq!(json["department"], "EXECUTIVE");
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_string(&Individual::new("Jane", "Abbott")).unwrap();
        assert!(!json.contains("title"));
        assert!(!json.contains("department"));
    }

    #[test]
    fn test_aba_account_shape() {
        let account = Account::aba("12345", "122199983");
        let json = serde_json::to_value(&account).unwrap();

        assert_eq!(json["accountNumber"], "12345");
        assert_eq!(
            json["financialInstitutionId"]["clearingSystemId"]["id"],
            "122199983"
        );
        assert_eq!(
            json["financialInstitutionId"]["clearingSystemId"]["idType"],
            "ABA"
        );
    }

    #[test]
    fn test_payroll_transaction_shape() {
        let transaction = Transaction::payroll(5000.0, "USD");
        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["context"], "PAYROLL");
        assert_eq!(json["amount"]["amount"], 5000.0);
        assert_eq!(json["amount"]["currency"], "USD");
    }
}
