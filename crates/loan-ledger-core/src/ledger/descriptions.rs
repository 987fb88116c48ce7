//! Transaction descriptions written when a ledger entry is recorded.
//!
//! These strings are the only link between a transaction and a loan, so the
//! reconciler's patterns recognize exactly these shapes.

/// Description for the transaction that pays scheduled period `n`.
pub fn scheduled_description(loan_name: &str, payment_number: u32) -> String {
    format!("Cuota préstamo {} #{}", loan_name.trim(), payment_number)
}

/// Description for the transaction behind an extra payment.
pub fn extra_description(loan_name: &str) -> String {
    format!("Amortización anticipada {}", loan_name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(scheduled_description(" Coche ", 4), "Cuota préstamo Coche #4");
        assert_eq!(extra_description("Coche"), "Amortización anticipada Coche");
    }
}
