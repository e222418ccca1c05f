use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::models::*;

pub(super) const DEMO_TENANT_NAME: &str = "Demo Club";
pub(super) const DEMO_TENANT_SLUG: &str = "demo-club";
pub(super) const DEMO_ADMIN_EMAIL: &str = "admin@example.com";
pub(super) const DEMO_ADMIN_PASSWORD: &str = "admin";
pub(super) const DEMO_CUSTOMER_COUNT: usize = 8;

const CURRENCY: &str = "EUR";

/// Relative share of each payment method in generated payments
const PAYMENT_METHOD_WEIGHTS: [(PaymentMethod, u32); 4] = [
    (PaymentMethod::Card, 50),
    (PaymentMethod::Wristband, 25),
    (PaymentMethod::Mobile, 15),
    (PaymentMethod::Cash, 10),
];

const PAYMENT_STATUS_WEIGHTS: [(PaymentStatus, u32); 3] = [
    (PaymentStatus::Completed, 85),
    (PaymentStatus::Pending, 10),
    (PaymentStatus::Refunded, 5),
];

/// Weighted picker over a fixed table of choices
pub(super) struct WeightedPicker<T: Copy> {
    choices: Vec<T>,
    index: WeightedIndex<u32>,
}

impl<T: Copy> WeightedPicker<T> {
    pub(super) fn new(table: &[(T, u32)]) -> Result<Self> {
        Ok(Self {
            choices: table.iter().map(|(choice, _)| *choice).collect(),
            index: WeightedIndex::new(table.iter().map(|(_, weight)| *weight))?,
        })
    }

    pub(super) fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.choices[self.index.sample(rng)]
    }
}

/// Demo event template: (name, location, offset from now in hours, duration in hours, status, capacity)
fn demo_event_params() -> Vec<(&'static str, &'static str, i64, i64, EventStatus, Option<i64>)> {
    vec![
        ("Season Opening", "Main Floor", -30 * 24, 7, EventStatus::Completed, Some(800)),
        ("Techno Thursday", "Basement", -7 * 24, 6, EventStatus::Completed, Some(300)),
        ("Rooftop Sessions", "Rooftop Terrace", -3 * 24, 5, EventStatus::Cancelled, Some(150)),
        ("Friday Late", "Main Floor", -2, 6, EventStatus::Active, Some(800)),
        ("Summer Festival", "Harbour Grounds", 14 * 24, 48, EventStatus::Scheduled, Some(5000)),
        ("New Year's Eve", "All Floors", 60 * 24, 10, EventStatus::Draft, None),
    ]
}

/// Everything the demo seeder writes for one tenant
pub(super) struct DemoPlan {
    pub events: Vec<Event>,
    pub payments: Vec<Payment>,
}

/// Build demo events for `tenant_id` and payments made by `customer_ids`.
///
/// Drafts and cancelled events get no payments. Payments of upcoming
/// events are presales dated within the last week.
pub(super) fn demo_plan<R: Rng + ?Sized>(
    rng: &mut R,
    tenant_id: &str,
    customer_ids: &[String],
    now: DateTime<Utc>,
) -> Result<DemoPlan> {
    let methods = WeightedPicker::new(&PAYMENT_METHOD_WEIGHTS)?;
    let statuses = WeightedPicker::new(&PAYMENT_STATUS_WEIGHTS)?;

    let events: Vec<Event> = demo_event_params()
        .into_iter()
        .map(|(name, location, offset_hours, duration_hours, status, capacity)| {
            let start_date = now + TimeDelta::hours(offset_hours);
            Event {
                id: uuid::Uuid::new_v4().to_string(),
                tenant_id: tenant_id.to_string(),
                name: name.to_string(),
                description: Some(format!("{} at {}", name, DEMO_TENANT_NAME)),
                location: location.to_string(),
                address: Some("1 Harbour Street".to_string()),
                start_date,
                end_date: start_date + TimeDelta::hours(duration_hours),
                status,
                capacity,
                config: Some(serde_json::json!({ "cashless": true, "currency": CURRENCY })),
                images: vec![],
                created_at: now,
                updated_at: now,
            }
        })
        .collect();

    let mut payments = Vec::new();
    if customer_ids.is_empty() {
        return Ok(DemoPlan { events, payments });
    }

    for event in events
        .iter()
        .filter(|e| !matches!(e.status, EventStatus::Draft | EventStatus::Cancelled))
    {
        let (window_start, window_end) = if event.start_date < now {
            (event.start_date, event.end_date.min(now))
        } else {
            (now - TimeDelta::days(7), now)
        };
        let span = (window_end - window_start).num_seconds().max(1);

        for _ in 0..rng.gen_range(15..=40) {
            let created_at = window_start + TimeDelta::seconds(rng.gen_range(0..span));
            let status = statuses.pick(rng);
            let customer = &customer_ids[rng.gen_range(0..customer_ids.len())];
            payments.push(Payment {
                id: uuid::Uuid::new_v4().to_string(),
                // Whole 50-cent steps between 3.00 and 60.00
                amount: rng.gen_range(6..=120) * 50,
                currency: CURRENCY.to_string(),
                payment_method: methods.pick(rng),
                status,
                paid_at: (status != PaymentStatus::Pending).then_some(created_at),
                event_id: event.id.clone(),
                user_id: customer.clone(),
                tenant_id: tenant_id.to_string(),
                metadata: Some(serde_json::json!({
                    "terminal": format!("bar-{}", rng.gen_range(1..=4)),
                    "items": rng.gen_range(1..=5),
                })),
                created_at,
            });
        }
    }

    Ok(DemoPlan { events, payments })
}
