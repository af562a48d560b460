use rand::Rng;

use crate::error::AppError;
use crate::models::{ChanceResult, CutoffTable, Offering, StudentQuery};

/// Build the admission shortlist for one query.
///
/// Keeps every offering whose cutoff rank under the query category is at
/// or above the student's rank (rank 1 is best; a cutoff is the worst
/// rank admitted, so `cutoff >= rank` means the student would plausibly
/// have been admitted). Survivors are ordered by descending
/// `chance_score = cutoff - rank`; the sort is stable so ties keep the
/// original row order. At most `limit` entries are returned; an empty
/// shortlist is a valid outcome, not an error.
///
/// The display percentage is drawn from `rng` inside a fixed bucket of
/// the score, so callers wanting reproducible output pass a seeded RNG.
pub fn shortlist(
    table: &CutoffTable,
    query: &StudentQuery,
    limit: usize,
    rng: &mut impl Rng,
) -> Result<Vec<ChanceResult>, AppError> {
    if !table.has_category(&query.category) {
        return Err(AppError::InvalidCategory {
            category: query.category.clone(),
            available: table.categories.clone(),
        });
    }

    let mut eligible: Vec<(&Offering, u32, i64)> = table
        .offerings
        .iter()
        .filter_map(|offering| {
            let cutoff = offering.cutoff(&query.category)?;
            if cutoff < query.rank {
                return None;
            }
            let chance_score = i64::from(cutoff) - i64::from(query.rank);
            Some((offering, cutoff, chance_score))
        })
        .collect();

    eligible.sort_by(|a, b| b.2.cmp(&a.2));
    eligible.truncate(limit);

    // Percentages are drawn only for the survivors, so the RNG advances
    // once per returned entry regardless of table size.
    Ok(eligible
        .into_iter()
        .map(|(offering, cutoff, chance_score)| ChanceResult {
            offering: offering.clone(),
            cutoff,
            chance_score,
            chance_percent: chance_percent(chance_score, rng),
        })
        .collect())
}

/// Display-confidence bucket for a chance score.
///
/// Returns the inclusive-exclusive percentage range the score falls in;
/// the upper bucket is closed at 95.
pub fn percent_bucket(chance_score: i64) -> (u8, u8) {
    match chance_score {
        s if s > 5000 => (85, 96),
        s if s > 2000 => (70, 85),
        s if s > 500 => (50, 70),
        s if s > 0 => (30, 50),
        _ => (10, 30),
    }
}

/// Draw a human-friendly percentage inside the score's bucket. The
/// spread is cosmetic, not a statistical estimate.
pub fn chance_percent(chance_score: i64, rng: &mut impl Rng) -> u8 {
    let (low, high) = percent_bucket(chance_score);
    rng.gen_range(low..high)
}

/// Condense a chance percentage into the "X/10" score shown in college
/// summaries. Derived from the percentage instead of an independent
/// draw, so the two numbers in a summary never contradict each other.
pub fn summary_score(chance_percent: u8) -> u8 {
    (chance_percent / 10).clamp(1, 10)
}
