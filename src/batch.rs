use crate::analysis::AnalysisError;
use crate::metrics::ScoredEmail;

#[derive(Debug)]
pub struct EmailBatch<'a> {
    /// 1-based position of this batch in the run.
    pub index: usize,
    pub total: usize,
    pub emails: &'a [ScoredEmail],
}

/// Partitions the ranked set into contiguous batches of `batch_size`, in
/// ranking order. The final batch carries the remainder. Same input and
/// size always produce the same partition.
pub fn plan_batches(
    emails: &[ScoredEmail],
    batch_size: usize,
) -> Result<Vec<EmailBatch<'_>>, AnalysisError> {
    if batch_size == 0 {
        return Err(AnalysisError::Config(
            "analysis batch_size must be at least 1".to_string(),
        ));
    }

    let total = emails.len().div_ceil(batch_size);

    Ok(emails
        .chunks(batch_size)
        .enumerate()
        .map(|(i, chunk)| EmailBatch {
            index: i + 1,
            total,
            emails: chunk,
        })
        .collect())
}
