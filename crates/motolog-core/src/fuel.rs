//! Fuel efficiency from refuel history (full-tank method).
//!
//! Efficiency is measured between consecutive full-tank refuels that both
//! carry an odometer reading. Partial refuels in between add their fuel to
//! the interval. A refuel whose fuel amount is unknown poisons the interval
//! it falls in: no figure is produced for it, but the next full tank with an
//! odometer still becomes the new anchor.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::RefuelRecord;
use crate::util::round2;

/// Efficiency over one full-tank interval
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEfficiency {
    /// Date of the closing full-tank refuel
    pub date: NaiveDate,
    /// Kilometres driven in the interval
    pub distance: f64,
    /// Litres put in over the interval
    pub fuel_amount: f64,
    pub km_per_liter: f64,
}

/// Estimated fuel left in the tank
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemainingFuel {
    /// Litres
    pub remaining: f64,
    /// Whole percent of tank capacity
    pub percentage: u32,
}

#[derive(Debug, Default)]
struct Interval {
    anchor: Option<f64>,
    accumulated: f64,
    unknown_fuel: bool,
}

impl Interval {
    fn restart_at(&mut self, odometer: f64) {
        self.anchor = Some(odometer);
        self.accumulated = 0.0;
        self.unknown_fuel = false;
    }
}

/// Rebuild efficiency intervals from refuels in any order.
///
/// Intervals come out oldest first.
pub fn calculate_fuel_efficiency(refuels: &[RefuelRecord]) -> Vec<FuelEfficiency> {
    let mut sorted: Vec<&RefuelRecord> = refuels.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut interval = Interval::default();
    let mut results = Vec::new();

    for record in sorted {
        match (record.odometer, record.known_fuel()) {
            (None, Some(fuel)) => {
                if interval.anchor.is_some() && !record.is_full_tank {
                    interval.accumulated += fuel;
                }
            }
            (None, None) => interval.unknown_fuel = true,
            (Some(odometer), fuel) if record.is_full_tank => {
                if let (Some(anchor), Some(fuel), false) = (interval.anchor, fuel, interval.unknown_fuel) {
                    let distance = odometer - anchor;
                    let fuel_amount = interval.accumulated + fuel;
                    if distance > 0.0 && fuel_amount > 0.0 {
                        results.push(FuelEfficiency {
                            date: record.date,
                            distance,
                            fuel_amount,
                            km_per_liter: round2(distance / fuel_amount),
                        });
                    }
                }
                interval.restart_at(odometer);
            }
            (Some(_), Some(fuel)) => interval.accumulated += fuel,
            (Some(_), None) => interval.unknown_fuel = true,
        }
    }

    results
}

/// Distance-weighted average over all intervals
pub fn average_fuel_efficiency(efficiencies: &[FuelEfficiency]) -> Option<f64> {
    let distance: f64 = efficiencies.iter().map(|e| e.distance).sum();
    let fuel: f64 = efficiencies.iter().map(|e| e.fuel_amount).sum();
    (fuel > 0.0).then(|| round2(distance / fuel))
}

/// Most recent interval's figure
pub fn latest_fuel_efficiency(efficiencies: &[FuelEfficiency]) -> Option<f64> {
    efficiencies.last().map(|e| e.km_per_liter)
}

/// Best and worst interval figures
pub fn best_worst_fuel_efficiency(efficiencies: &[FuelEfficiency]) -> (Option<f64>, Option<f64>) {
    let values = efficiencies.iter().map(|e| e.km_per_liter);
    (values.clone().reduce(f64::max), values.reduce(f64::min))
}

/// Sum of recorded costs; refuels without a cost count as zero
pub fn total_fuel_cost(refuels: &[RefuelRecord]) -> f64 {
    refuels.iter().filter_map(|r| r.total_cost).sum()
}

/// Span between the lowest and highest odometer readings.
///
/// `None` with fewer than two readings.
pub fn total_distance(refuels: &[RefuelRecord]) -> Option<f64> {
    let readings: Vec<f64> = refuels.iter().filter_map(|r| r.odometer).collect();
    if readings.len() < 2 {
        return None;
    }
    let max = readings.iter().copied().fold(f64::MIN, f64::max);
    let min = readings.iter().copied().fold(f64::MAX, f64::min);
    Some(max - min)
}

/// Sum of known fuel amounts
pub fn total_fuel(refuels: &[RefuelRecord]) -> f64 {
    refuels.iter().filter_map(RefuelRecord::known_fuel).sum()
}

/// Estimate the fuel left since the last full tank.
///
/// Consumption is the distance from the newest full-tank refuel with an
/// odometer reading to the highest refuel odometer, divided by
/// `average_km_per_liter`; partial refuels since then are added back.
/// Readings from other record kinds do not count. The result is clamped to
/// `[0, capacity]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate_remaining_fuel(
    refuels: &[RefuelRecord],
    tank_capacity: f64,
    average_km_per_liter: Option<f64>,
) -> Option<RemainingFuel> {
    let average = average_km_per_liter.filter(|avg| *avg > 0.0)?;
    if tank_capacity <= 0.0 {
        return None;
    }

    let anchor = refuels
        .iter()
        .filter(|r| r.is_full_tank)
        .filter_map(|r| r.odometer.map(|odo| (r, odo)))
        .max_by(|(a, a_odo), (b, b_odo)| a.date.cmp(&b.date).then(a_odo.total_cmp(b_odo)))?;
    let (anchor_record, anchor_odometer) = anchor;

    let latest = refuels
        .iter()
        .filter_map(|r| r.odometer)
        .reduce(f64::max)?;
    let distance = latest - anchor_odometer;
    if distance < 0.0 {
        return None;
    }

    let added: f64 = refuels
        .iter()
        .filter(|r| !r.is_full_tank && r.date >= anchor_record.date && r.id != anchor_record.id)
        .filter_map(RefuelRecord::known_fuel)
        .sum();

    let consumed = distance / average;
    let remaining = (tank_capacity + added - consumed).clamp(0.0, tank_capacity);
    let percentage = (remaining / tank_capacity * 100.0).round() as u32;

    Some(RemainingFuel {
        remaining: round2(remaining),
        percentage,
    })
}

/// Every fuel figure for one vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelStats {
    pub intervals: Vec<FuelEfficiency>,
    pub average: Option<f64>,
    pub latest: Option<f64>,
    pub best: Option<f64>,
    pub worst: Option<f64>,
    pub total_cost: f64,
    pub total_distance: Option<f64>,
    pub total_fuel: f64,
    pub remaining: Option<RemainingFuel>,
}

impl FuelStats {
    /// Compute every figure; `tank_capacity` enables the remaining estimate
    pub fn compute(refuels: &[RefuelRecord], tank_capacity: Option<f64>) -> Self {
        let intervals = calculate_fuel_efficiency(refuels);
        let average = average_fuel_efficiency(&intervals);
        let (best, worst) = best_worst_fuel_efficiency(&intervals);
        let remaining =
            tank_capacity.and_then(|capacity| estimate_remaining_fuel(refuels, capacity, average));
        Self {
            latest: latest_fuel_efficiency(&intervals),
            average,
            best,
            worst,
            total_cost: total_fuel_cost(refuels),
            total_distance: total_distance(refuels),
            total_fuel: total_fuel(refuels),
            remaining,
            intervals,
        }
    }
}
