// src/services/dashboard_service.rs

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        dashboard::{DailyCount, DashboardStats, InvoiceStatusSum, InvoiceTotals, VendorCounts, VendorStatusCount},
        finance::InvoiceStatus,
        vendor::VendorStatus,
    },
};

pub const TREND_DAYS: i64 = 7;

// ---
// Reporting windows, all expressed as UTC instants
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardWindows {
    pub now: DateTime<Utc>,
    pub start_of_today: DateTime<Utc>,
    pub start_of_month: DateTime<Utc>,
    // Local midnight opening the seven-day trend
    pub start_of_week: DateTime<Utc>,
    pub first_trend_day: NaiveDate,
}

impl DashboardWindows {
    pub fn at(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = now.with_timezone(&offset).date_naive();
        let first_trend_day = today - TimeDelta::days(TREND_DAYS - 1);
        let first_of_month = today - TimeDelta::days(i64::from(today.day0()));

        Self {
            now,
            start_of_today: local_midnight(today, offset),
            start_of_month: local_midnight(first_of_month, offset),
            start_of_week: local_midnight(first_trend_day, offset),
            first_trend_day,
        }
    }
}

fn local_midnight(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::MIN);
    (local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// One count per day starting at `first_day`, oldest first. Missing days are 0.
pub fn fill_weekly_trend(first_day: NaiveDate, rows: &[DailyCount]) -> Vec<i64> {
    (0..TREND_DAYS)
        .map(|i| {
            let day = first_day + TimeDelta::days(i);
            rows.iter().filter(|r| r.day == day).map(|r| r.count).sum()
        })
        .collect()
}

// Paid and outstanding partition the same per-status sums, so they always add up.
pub fn invoice_totals(rows: &[InvoiceStatusSum]) -> InvoiceTotals {
    rows.iter().fold(InvoiceTotals::default(), |mut acc, row| {
        acc.total_invoice_amount += row.total;
        match row.status {
            InvoiceStatus::Paid => acc.paid_amount += row.total,
            InvoiceStatus::Pending | InvoiceStatus::Overdue => acc.outstanding_amount += row.total,
        }
        acc
    })
}

pub fn vendor_counts(rows: &[VendorStatusCount]) -> VendorCounts {
    rows.iter().fold(VendorCounts::default(), |mut acc, row| {
        acc.total_mitra += row.count;
        match row.status {
            VendorStatus::Active => acc.active_mitra += row.count,
            VendorStatus::Suspended => acc.suspended_mitra += row.count,
            VendorStatus::Pending => acc.pending_verification += row.count,
        }
        acc
    })
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    report_offset: FixedOffset,
    popular_limit: i64,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, report_offset: FixedOffset, popular_limit: i64) -> Self {
        Self { repo, report_offset, popular_limit }
    }

    /// Builds every dashboard figure at once. The sub-queries run
    /// concurrently; if any one fails the whole summary fails.
    pub async fn get_stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, AppError> {
        let windows = DashboardWindows::at(now, self.report_offset);

        let (
            daily_transactions,
            monthly_revenue,
            invoice_rows,
            daily_rows,
            vendor_rows,
            (total_branches, new_branches_24h),
            popular_categories,
            popular_branches,
        ) = tokio::try_join!(
            self.repo.count_goods_between(windows.start_of_today, windows.now),
            self.repo.sum_goods_revenue_between(windows.start_of_month, windows.now),
            self.repo.invoice_sums_by_status(windows.start_of_month, windows.now),
            self.repo
                .daily_goods_counts(windows.start_of_week, windows.now, self.report_offset.local_minus_utc()),
            self.repo.vendor_status_counts(),
            self.repo.branch_counts(windows.now - TimeDelta::hours(24)),
            self.repo.popular_categories(self.popular_limit),
            self.repo.popular_branches(self.popular_limit),
        )
        .map_err(|e| AppError::AggregationError(e.to_string()))?;

        Ok(DashboardStats {
            vendors: vendor_counts(&vendor_rows),
            total_branches,
            new_branches_24h,
            daily_transactions,
            monthly_revenue,
            invoices: invoice_totals(&invoice_rows),
            weekly_trend: fill_weekly_trend(windows.first_trend_day, &daily_rows),
            popular_categories,
            popular_branches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn windows_start_at_local_midnight() {
        // 09:00 WIB on 10 March 2024
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 2, 0, 0).unwrap();
        let w = DashboardWindows::at(now, wib());

        assert_eq!(w.start_of_today, Utc.with_ymd_and_hms(2024, 3, 9, 17, 0, 0).unwrap());
        assert_eq!(w.start_of_month, Utc.with_ymd_and_hms(2024, 2, 29, 17, 0, 0).unwrap());
        assert_eq!(w.start_of_week, Utc.with_ymd_and_hms(2024, 3, 3, 17, 0, 0).unwrap());
        assert_eq!(w.first_trend_day, date(2024, 3, 4));
        assert!(w.start_of_month <= w.start_of_today && w.start_of_today <= w.now);
    }

    #[test]
    fn local_day_can_differ_from_utc_day() {
        // 23:30 UTC on 31 Jan is already 1 Feb in WIB
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();
        let w = DashboardWindows::at(now, wib());

        assert_eq!(w.start_of_today, Utc.with_ymd_and_hms(2024, 1, 31, 17, 0, 0).unwrap());
        assert_eq!(w.start_of_month, w.start_of_today);

        let utc = DashboardWindows::at(now, FixedOffset::east_opt(0).unwrap());
        assert_eq!(utc.start_of_month, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn weekly_trend_has_seven_entries_with_zero_fill() {
        let first = date(2024, 3, 4);
        let rows = vec![
            DailyCount { day: date(2024, 3, 4), count: 2 },
            DailyCount { day: date(2024, 3, 7), count: 5 },
            DailyCount { day: date(2024, 3, 10), count: 1 },
        ];

        assert_eq!(fill_weekly_trend(first, &rows), vec![2, 0, 0, 5, 0, 0, 1]);
        assert_eq!(fill_weekly_trend(first, &[]), vec![0; 7]);
    }

    #[test]
    fn rows_outside_the_week_are_ignored() {
        let rows = vec![
            DailyCount { day: date(2024, 3, 3), count: 9 },
            DailyCount { day: date(2024, 3, 11), count: 9 },
        ];
        assert_eq!(fill_weekly_trend(date(2024, 3, 4), &rows), vec![0; 7]);
    }

    #[test]
    fn invoice_partition_always_adds_up() {
        // 100000 paid, 50000 pending, 25000 overdue
        let rows = vec![
            InvoiceStatusSum { status: InvoiceStatus::Paid, total: 100_000 },
            InvoiceStatusSum { status: InvoiceStatus::Pending, total: 50_000 },
            InvoiceStatusSum { status: InvoiceStatus::Overdue, total: 25_000 },
        ];
        let totals = invoice_totals(&rows);

        assert_eq!(
            totals,
            InvoiceTotals { total_invoice_amount: 175_000, paid_amount: 100_000, outstanding_amount: 75_000 }
        );
        assert_eq!(totals.paid_amount + totals.outstanding_amount, totals.total_invoice_amount);
    }

    #[test]
    fn empty_month_yields_zeroes() {
        assert_eq!(invoice_totals(&[]), InvoiceTotals::default());
        assert_eq!(vendor_counts(&[]), VendorCounts::default());
    }

    #[test]
    fn vendor_counters_split_by_status() {
        let rows = vec![
            VendorStatusCount { status: VendorStatus::Active, count: 4 },
            VendorStatusCount { status: VendorStatus::Pending, count: 2 },
            VendorStatusCount { status: VendorStatus::Suspended, count: 1 },
        ];

        assert_eq!(
            vendor_counts(&rows),
            VendorCounts { total_mitra: 7, active_mitra: 4, suspended_mitra: 1, pending_verification: 2 }
        );
    }
}
