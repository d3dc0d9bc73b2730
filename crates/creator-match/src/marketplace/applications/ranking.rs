use std::cmp::Ordering;

use crate::marketplace::domain::Application;

/// Review order: scored before unscored, higher scores first, then newest unscored first.
pub fn compare_for_review(a: &Application, b: &Application) -> Ordering {
    match (a.fit_score, b.fit_score) {
        (Some(left), Some(right)) => right.total_cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.applied_at.cmp(&a.applied_at),
    }
}

/// Sort anything that carries an application into review order.
pub fn rank_for_review<T>(items: &mut [T])
where
    T: AsRef<Application>,
{
    items.sort_by(|a, b| compare_for_review(a.as_ref(), b.as_ref()));
}

impl AsRef<Application> for Application {
    fn as_ref(&self) -> &Application {
        self
    }
}
