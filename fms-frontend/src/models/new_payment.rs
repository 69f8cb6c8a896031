use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input of the request stage form; also the body of the create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPayment {
    #[validate(length(min = 1, message = "Unique number is required"))]
    pub unique_no: String,
    #[validate(length(min = 1, message = "FMS name is required"))]
    pub fms_name: String,
    #[validate(length(min = 1, message = "Pay to is required"))]
    pub pay_to: String,
    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than zero"))]
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Filename reference only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

impl NewPayment {
    /// Trim text fields and drop blank optional ones before validation.
    pub fn normalized(self) -> Self {
        fn optional(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            unique_no: self.unique_no.trim().to_string(),
            fms_name: self.fms_name.trim().to_string(),
            pay_to: self.pay_to.trim().to_string(),
            amount: self.amount,
            remarks: optional(self.remarks),
            attachment: optional(self.attachment),
        }
    }
}
