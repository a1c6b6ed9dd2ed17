use chrono::{Datelike, NaiveDateTime, Weekday};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Step between labelled x positions so that roughly `target_labels`
/// labels are shown.
pub fn label_stride(len: usize, target_labels: usize) -> usize {
    (len / target_labels.max(1)).max(1)
}

/// Absolute net change per weekday, Monday first. Weekdays without any
/// commit are left out; missing changes do not count.
pub fn weekday_activity(dates: &[NaiveDateTime], changes: &[Option<f64>]) -> Vec<(Weekday, f64)> {
    let mut totals = [0.0f64; 7];
    let mut seen = [false; 7];

    for (date, change) in dates.iter().zip(changes) {
        let idx = date.weekday().num_days_from_monday() as usize;
        seen[idx] = true;
        totals[idx] += change.unwrap_or(0.0);
    }

    WEEK.iter()
        .enumerate()
        .filter(|(idx, _)| seen[*idx])
        .map(|(idx, day)| (*day, totals[idx].abs()))
        .collect()
}
