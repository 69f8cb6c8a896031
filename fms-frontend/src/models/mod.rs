pub mod new_payment;
pub mod payment;

pub use new_payment::NewPayment;
pub use payment::{
    transform_payment_fms, Decision, PaymentRecord, PaymentStatus, PaymentType,
    RawPaymentRecord, RecordId, RecordList, CURRENCY_SYMBOL,
};
