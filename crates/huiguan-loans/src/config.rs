//! Loan program configuration.

/// Terms of the interest-free study-loan program.
///
/// All amounts are in cents. The defaults mirror the standing program:
/// RM 4 000 principal repaid at RM 200 per month over 20 months.
#[derive(Debug, Clone)]
pub struct LoanConfig {
    /// Principal disbursed per accepted application.
    pub principal_cents: i64,
    /// Fixed monthly payment.
    pub monthly_payment_cents: i64,
}

impl LoanConfig {
    /// Scheduled number of payments over the loan's life.
    pub fn total_payments_for(&self, principal_cents: i64) -> u32 {
        ((principal_cents + self.monthly_payment_cents - 1) / self.monthly_payment_cents) as u32
    }
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            principal_cents: 400_000,
            monthly_payment_cents: 20_000,
        }
    }
}
