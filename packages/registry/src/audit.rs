//! Health report over the registration number ledger.

use ihu_regnum::{classify, next_sequence, IdentifierClass};
use serde::Serialize;

use crate::allocation::issued_numbers;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NumberAudit {
    pub total: usize,
    pub current: usize,
    pub legacy: Vec<String>,
    pub foreign: Vec<String>,
    /// Highest sequence among current-format numbers
    pub highest_sequence: Option<u32>,
    pub next_sequence: u32,
}

impl NumberAudit {
    pub fn from_numbers<I>(numbers: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut audit = NumberAudit::default();
        let mut current = Vec::new();

        for number in numbers {
            let number = number.as_ref();
            audit.total += 1;
            match classify(number) {
                IdentifierClass::Current(n) => current.push(n),
                IdentifierClass::Legacy => audit.legacy.push(number.to_string()),
                IdentifierClass::Foreign => audit.foreign.push(number.to_string()),
            }
        }

        audit.current = current.len();
        audit.highest_sequence = current.iter().map(|n| n.sequence()).max();
        audit.next_sequence = next_sequence(current.iter().map(|n| n.to_string()));
        audit.legacy.sort();
        audit.foreign.sort();
        audit
    }
}

pub async fn audit_numbers<'e, E>(executor: E) -> Result<NumberAudit>
where
    E: sqlx::PgExecutor<'e>,
{
    let numbers = issued_numbers(executor).await?;
    let audit = NumberAudit::from_numbers(&numbers);

    tracing::debug!(
        total = audit.total,
        current = audit.current,
        legacy = audit.legacy.len(),
        next_sequence = audit.next_sequence,
        "audited registration numbers"
    );
    Ok(audit)
}
