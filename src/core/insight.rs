//! Payment insights - late-payment metrics and risk scores.
//!
//! These are presentation heuristics layered on top of the ledger, not
//! load-bearing algorithms: every constant lives in [`RiskPolicy`] so
//! deployments can tune them. A row counts as late when it received less
//! than it billed; its delay is how far into the month it was recorded.

use crate::{
    config::policy::RiskPolicy,
    entities::{Floor, Payment, User, floor, payment, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Utc};
use sea_orm::{QueryOrder, prelude::*};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Coarse risk bands over the probability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// Below the medium threshold
    Low,
    /// At or above the medium threshold
    Medium,
    /// At or above the high threshold
    High,
}

impl RiskLevel {
    /// Human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Metrics derived from one tenant's ledger rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaymentProfile {
    /// Rows that received less than they billed
    pub late_count: u32,
    /// Mean days-into-month of late rows, averaged over all rows
    pub avg_delay_days: f64,
    /// Timestamp of the newest ledger row, if any
    pub last_payment_at: Option<DateTime<Utc>>,
}

impl PaymentProfile {
    /// Derives the metrics from ledger rows.
    #[must_use]
    pub fn from_history(rows: &[payment::Model]) -> Self {
        let mut late_count: u32 = 0;
        let mut delay_total = 0.0;
        for row in rows {
            if row.received_money < row.rent {
                late_count += 1;
                delay_total += f64::from(row.created_at.day0());
            }
        }
        let avg_delay_days = if rows.is_empty() {
            0.0
        } else {
            delay_total / rows.len() as f64
        };
        let last_payment_at = rows.iter().map(|r| r.created_at).max();
        Self {
            late_count,
            avg_delay_days,
            last_payment_at,
        }
    }
}

/// One tenant's insight card: metrics plus the scored risk.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantProfile {
    /// Phone number identifying the tenant
    pub phone: String,
    /// Probability score in [0, 1]
    pub risk_probability: f64,
    /// Band the score falls into
    pub risk_level: RiskLevel,
    /// Late rows on record
    pub late_count: u32,
    /// Mean delay of late rows, in days
    pub avg_delay_days: f64,
    /// Nominal rent of the tenant's current floor
    pub current_rent: i64,
    /// How long the tenancy has run, in whole months
    pub tenancy_months: u32,
    /// Timestamp of the newest ledger row, if any
    pub last_payment_at: Option<DateTime<Utc>>,
    /// Free-text annotation
    pub notes: String,
}

/// Scores a risk probability from payment metrics.
///
/// Late payments add up to `late_cap`; average delay adds up to
/// `delay_weight`; long tenancies subtract up to `tenure_discount`.
/// The result is clamped to [0, 1].
#[must_use]
pub fn risk_probability(
    late_count: u32,
    avg_delay_days: f64,
    tenancy_months: u32,
    policy: &RiskPolicy,
) -> f64 {
    let mut risk = 0.0;

    if late_count > 0 {
        risk += (f64::from(late_count) * policy.late_weight).min(policy.late_cap);
    }

    if avg_delay_days > 0.0 {
        risk += (avg_delay_days / policy.delay_divisor * policy.delay_weight)
            .min(policy.delay_weight);
    }

    if tenancy_months > policy.tenure_threshold_months {
        let discount = f64::from(tenancy_months - policy.tenure_threshold_months)
            / policy.tenure_divisor
            * policy.tenure_discount;
        risk -= discount.min(policy.tenure_discount);
    }

    risk.clamp(0.0, 1.0)
}

/// Maps a probability onto its band.
#[must_use]
pub fn risk_level(probability: f64, policy: &RiskPolicy) -> RiskLevel {
    if probability >= policy.high_threshold {
        RiskLevel::High
    } else if probability >= policy.medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Builds a tenant's insight card from their real ledger history.
///
/// The tenant's most recent floor provides the rent figure and the
/// tenancy start; a tenant with no floor scores from an empty history.
pub async fn profile_by_phone(
    db: &DatabaseConnection,
    phone: &str,
    policy: &RiskPolicy,
    now: DateTime<Utc>,
) -> Result<TenantProfile> {
    let tenant = User::find()
        .filter(user::Column::PhoneNumber.eq(phone))
        .one(db)
        .await?
        .ok_or_else(|| Error::PhoneNotRegistered {
            phone: phone.to_string(),
        })?;

    let floor_row = Floor::find()
        .filter(floor::Column::Tenant.eq(tenant.id))
        .order_by_desc(floor::Column::CreatedAt)
        .one(db)
        .await?;

    let (rows, current_rent, tenancy_months) = match &floor_row {
        Some(f) => {
            let rows = Payment::find()
                .filter(payment::Column::Fid.eq(f.id))
                .filter(payment::Column::Uid.eq(tenant.id))
                .order_by_asc(payment::Column::CreatedAt)
                .order_by_asc(payment::Column::Id)
                .all(db)
                .await?;
            (rows, f.rent, months_between(f.created_at, now))
        }
        None => (Vec::new(), 0, 0),
    };

    let profile = PaymentProfile::from_history(&rows);
    let probability = risk_probability(
        profile.late_count,
        profile.avg_delay_days,
        tenancy_months,
        policy,
    );

    Ok(TenantProfile {
        phone: tenant.phone_number,
        risk_probability: probability,
        risk_level: risk_level(probability, policy),
        late_count: profile.late_count,
        avg_delay_days: profile.avg_delay_days,
        current_rent,
        tenancy_months,
        last_payment_at: profile.last_payment_at,
        notes: format!("{} late payments on record", profile.late_count),
    })
}

fn months_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    months.max(0).unsigned_abs()
}

/// An explicitly-owned store of canned tenant profiles for demos.
///
/// Interior mutability is confined behind the lock here; there is no
/// package-level state.
#[derive(Debug, Default)]
pub struct SampleProfiles {
    profiles: RwLock<HashMap<String, TenantProfile>>,
}

impl SampleProfiles {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a spread of illustrative profiles.
    #[must_use]
    pub fn with_defaults() -> Self {
        let store = Self::new();
        for profile in default_samples() {
            store.insert(profile);
        }
        store
    }

    /// The profile registered under `phone`, if any.
    #[must_use]
    pub fn get(&self, phone: &str) -> Option<TenantProfile> {
        let guard = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.get(phone).cloned()
    }

    /// Registers or replaces a profile.
    pub fn insert(&self, profile: TenantProfile) {
        let mut guard = self
            .profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.insert(profile.phone.clone(), profile);
    }

    /// All registered profiles, in no particular order.
    #[must_use]
    pub fn all(&self) -> Vec<TenantProfile> {
        let guard = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.values().cloned().collect()
    }
}

fn default_samples() -> Vec<TenantProfile> {
    vec![
        TenantProfile {
            phone: "01712345679".to_string(),
            risk_probability: 0.78,
            risk_level: RiskLevel::High,
            late_count: 3,
            avg_delay_days: 6.2,
            current_rent: 1200,
            tenancy_months: 12,
            last_payment_at: None,
            notes: "3 late payments in last 6 months".to_string(),
        },
        TenantProfile {
            phone: "01712345678".to_string(),
            risk_probability: 0.45,
            risk_level: RiskLevel::Medium,
            late_count: 1,
            avg_delay_days: 2.0,
            current_rent: 850,
            tenancy_months: 24,
            last_payment_at: None,
            notes: "1 late payment in last 12 months".to_string(),
        },
        TenantProfile {
            phone: "01987654321".to_string(),
            risk_probability: 0.92,
            risk_level: RiskLevel::High,
            late_count: 5,
            avg_delay_days: 12.5,
            current_rent: 1500,
            tenancy_months: 6,
            last_payment_at: None,
            notes: "Multiple late payments and complaints".to_string(),
        },
        TenantProfile {
            phone: "01712345675".to_string(),
            risk_probability: 0.15,
            risk_level: RiskLevel::Low,
            late_count: 0,
            avg_delay_days: 0.0,
            current_rent: 950,
            tenancy_months: 36,
            last_payment_at: None,
            notes: "Excellent payment history".to_string(),
        },
    ]
}
