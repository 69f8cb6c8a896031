use crate::models::PaymentRecord;

/// Case-insensitive substring match on unique number, FMS name and payee.
/// A blank term matches everything.
pub fn filter_records<'a>(records: &'a [PaymentRecord], term: &str) -> Vec<&'a PaymentRecord> {
    let needle = term.trim().to_lowercase();
    records
        .iter()
        .filter(|record| needle.is_empty() || contains(record, &needle))
        .collect()
}

fn contains(record: &PaymentRecord, needle: &str) -> bool {
    [&record.unique_no, &record.fms_name, &record.pay_to]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
