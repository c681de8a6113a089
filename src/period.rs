use chrono::{Datelike, NaiveDate};

/// Day of month from which the current month is considered incomplete
/// and dropped from the window.
pub const CURRENT_MONTH_CUTOFF_DAY: u32 = 25;

/// Number of months in the inclusion window.
pub const WINDOW_MONTHS: usize = 6;

const MONTH_NAMES_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// A calendar month. Derived ordering is chronological (year, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Canonical "Mês/Ano" label, e.g. "Julho/2025".
    pub fn label(&self) -> String {
        format!("{}/{}", MONTH_NAMES_PT[(self.month - 1) as usize], self.year)
    }
}

/// Resolves the ordered inclusion window for a reference date, oldest
/// first. On or after day 25 the reference month is excluded entirely and
/// the window is the 6 months preceding it; before day 25 the reference
/// month is included plus the 5 preceding it.
pub fn resolve_window(reference: NaiveDate) -> Vec<MonthRef> {
    let newest = if reference.day() >= CURRENT_MONTH_CUTOFF_DAY {
        MonthRef::from_date(reference).prev()
    } else {
        MonthRef::from_date(reference)
    };

    let mut window = Vec::with_capacity(WINDOW_MONTHS);
    let mut current = newest;
    for _ in 0..WINDOW_MONTHS {
        window.push(current);
        current = current.prev();
    }
    window.reverse();
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_window_is_six_contiguous_ordered_months() {
        let window = resolve_window(date(2026, 2, 10));
        assert_eq!(window.len(), WINDOW_MONTHS);

        for pair in window.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[1].prev(), pair[0]);
        }
    }

    #[test]
    fn test_day_24_includes_current_month() {
        let window = resolve_window(date(2026, 1, 24));
        assert_eq!(*window.last().unwrap(), MonthRef::new(2026, 1));
        assert_eq!(window[0], MonthRef::new(2025, 8));
    }

    #[test]
    fn test_day_25_excludes_current_month() {
        let window = resolve_window(date(2026, 1, 25));
        assert_eq!(
            window,
            vec![
                MonthRef::new(2025, 7),
                MonthRef::new(2025, 8),
                MonthRef::new(2025, 9),
                MonthRef::new(2025, 10),
                MonthRef::new(2025, 11),
                MonthRef::new(2025, 12),
            ]
        );
    }

    #[test]
    fn test_window_crosses_year_boundary() {
        let window = resolve_window(date(2026, 3, 1));
        assert_eq!(window[0], MonthRef::new(2025, 10));
        assert_eq!(*window.last().unwrap(), MonthRef::new(2026, 3));
    }

    #[test]
    fn test_labels() {
        assert_eq!(MonthRef::new(2025, 7).label(), "Julho/2025");
        assert_eq!(MonthRef::new(2026, 3).label(), "Março/2026");
    }
}
