//! CAM allocation engine
//!
//! Splits a building's shared costs for one period between tenants (who pay
//! for occupied area) and the owner (who absorbs vacant and unallocated
//! area). The computation is pure: nothing here touches storage.
//!
//! Rounding: the tenants' total is rounded to whole cents once and the
//! owner's total is the integer residual, so the two always add up to the
//! cost pool. The owner's per-component portions are split from that
//! residual by largest remainder and add up to it exactly. Per-unit rows are
//! rounded independently and are informational; they may drift from the
//! summary by a few cents.

use chrono::NaiveDate;

use crate::error::{CamError, CamResult};
use crate::models::allocation::round2;
use crate::models::{
    AllocationInput, BillingPeriod, Building, BuildingId, CamSummary, CostPool, Money,
    OwnerShares, SpaceBreakdown, UnitAllocation, UnitInput, VACANT_LABEL,
};

/// Relative slack allowed when unit areas add up to more than the registered
/// leasable area (float noise from fractional areas)
const AREA_TOLERANCE: f64 = 1e-6;

/// Label for an occupied unit whose tenant name is unknown
const OCCUPIED_LABEL: &str = "Occupied";

/// Check that a billing period is well formed and has started
pub fn validate_period(period: BillingPeriod, today: NaiveDate) -> CamResult<()> {
    if period.end <= period.start {
        return Err(CamError::InvalidPeriod {
            start: period.start,
            end: period.end,
            reason: "period end must be after period start",
        });
    }
    if period.start > today {
        return Err(CamError::InvalidPeriod {
            start: period.start,
            end: period.end,
            reason: "period start is in the future",
        });
    }
    Ok(())
}

/// Space classifier: occupied, vacant and unallocated area
///
/// Unallocated area is registered leasable area not covered by any unit,
/// floored at zero.
pub fn classify_space(
    building_id: BuildingId,
    total_leasable_area: f64,
    units: &[UnitInput],
) -> CamResult<SpaceBreakdown> {
    if units.is_empty() {
        return Err(CamError::NoUnitsDefined(building_id));
    }

    let mut space = SpaceBreakdown {
        total_leasable_area,
        occupied_area: 0.0,
        vacant_area: 0.0,
        unallocated_area: 0.0,
        occupied_units: 0,
        vacant_units: 0,
    };

    for unit in units {
        if !unit.unit_space.is_finite() || unit.unit_space < 0.0 {
            return Err(CamError::InvalidArea {
                subject: format!("unit {} ({})", unit.unit_number, unit.unit_id),
                reason: format!("unit space must be a non-negative number, got {}", unit.unit_space),
            });
        }
        if unit.is_occupied {
            space.occupied_area += unit.unit_space;
            space.occupied_units += 1;
        } else {
            space.vacant_area += unit.unit_space;
            space.vacant_units += 1;
        }
    }

    if total_leasable_area.is_finite() {
        space.unallocated_area = (total_leasable_area - space.defined_area()).max(0.0);
    }

    Ok(space)
}

/// Cost aggregator: the period's total cost pool
pub fn aggregate_costs(
    generator_fee: Money,
    transformer_fee: Money,
    other_cam_costs: Money,
) -> CamResult<CostPool> {
    for (component, amount) in [
        ("generator_fee", generator_fee),
        ("transformer_fee", transformer_fee),
        ("other_cam_costs", other_cam_costs),
    ] {
        if amount.is_negative() {
            return Err(CamError::NegativeCost {
                component,
                amount: amount.to_string(),
            });
        }
    }

    let total = generator_fee
        .checked_add(transformer_fee)
        .and_then(|sum| sum.checked_add(other_cam_costs))
        .ok_or_else(|| CamError::CostPoolOverflow {
            generator_fee: generator_fee.to_string(),
            transformer_fee: transformer_fee.to_string(),
            other_cam_costs: other_cam_costs.to_string(),
        })?;

    Ok(CostPool {
        generator_fee,
        transformer_fee,
        other_cam_costs,
        total,
    })
}

/// Split `owner_total` across the cost components in proportion to each
/// component's exact owner portion, handing leftover cents to the largest
/// fractional remainders
fn split_owner_total(owner_total: Money, components: [Money; 3], owner_fraction: f64) -> [Money; 3] {
    let exact: Vec<f64> = components
        .iter()
        .map(|c| c.cents() as f64 * owner_fraction)
        .collect();
    let mut cents: Vec<i64> = exact.iter().map(|e| e.floor() as i64).collect();

    let mut remaining = owner_total.cents() - cents.iter().sum::<i64>();
    let mut order: Vec<usize> = (0..components.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    let mut i = 0;
    while remaining > 0 {
        cents[order[i % order.len()]] += 1;
        remaining -= 1;
        i += 1;
    }
    while remaining < 0 {
        // Only reachable through float noise; take back from the largest portions first
        let idx = (0..cents.len()).max_by_key(|&k| cents[k]).unwrap_or(0);
        cents[idx] -= 1;
        remaining += 1;
    }

    [
        Money::from_cents(cents[0]),
        Money::from_cents(cents[1]),
        Money::from_cents(cents[2]),
    ]
}

fn unit_allocation(unit: &UnitInput, leasable: f64, costs: &CostPool) -> UnitAllocation {
    let generator_share = costs.generator_fee.prorate(unit.unit_space, leasable);
    let transformer_share = costs.transformer_fee.prorate(unit.unit_space, leasable);
    let other_cam_share = costs.other_cam_costs.prorate(unit.unit_space, leasable);

    let tenant_name = if unit.is_occupied {
        unit.tenant_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| OCCUPIED_LABEL.to_string())
    } else {
        VACANT_LABEL.to_string()
    };

    UnitAllocation {
        unit_id: unit.unit_id,
        unit_number: unit.unit_number.clone(),
        unit_space: unit.unit_space,
        is_occupied: unit.is_occupied,
        tenant_name,
        percentage_of_leasable_area: round2(unit.unit_space / leasable * 100.0),
        cam_share: generator_share + transformer_share + other_cam_share,
        generator_share,
        transformer_share,
        other_cam_share,
    }
}

/// Allocation engine: split a cost pool over a classified building
pub fn allocate(
    building: &Building,
    period: BillingPeriod,
    space: &SpaceBreakdown,
    costs: &CostPool,
    units: &[UnitInput],
) -> CamResult<CamSummary> {
    let leasable = space.total_leasable_area;
    if !leasable.is_finite() || leasable <= 0.0 {
        return Err(CamError::DivisionByZeroArea {
            building: building.id,
            area: leasable,
        });
    }

    let defined = space.defined_area();
    if defined - leasable > AREA_TOLERANCE * leasable.max(1.0) {
        return Err(CamError::InvalidArea {
            subject: format!("building {}", building.id),
            reason: format!(
                "units cover {} but only {} is registered as leasable",
                defined, leasable
            ),
        });
    }

    // Excess inside the tolerance must not push the owner's share below zero
    let occupied = space.occupied_area.min(leasable);
    let tenants_cam = costs.total.prorate(occupied, leasable).min(costs.total);
    let owner_cam = costs.total - tenants_cam;

    let owner_fraction = (leasable - occupied) / leasable;
    let [generator, transformer, other_cam] = split_owner_total(
        owner_cam,
        [costs.generator_fee, costs.transformer_fee, costs.other_cam_costs],
        owner_fraction,
    );

    let occupied_percentage = space.occupied_area / leasable * 100.0;
    let vacant_percentage = space.vacant_area / leasable * 100.0;
    let unallocated_percentage = (100.0 - occupied_percentage - vacant_percentage).max(0.0);

    Ok(CamSummary {
        building_id: building.id,
        building_name: building.display_name(),
        period,
        total_leasable_area: leasable,
        total_occupied_area: space.occupied_area,
        total_vacant_area: space.vacant_area,
        unallocated_area: space.unallocated_area,
        occupied_percentage,
        vacant_percentage,
        unallocated_percentage,
        costs: *costs,
        cost_per_area_unit: costs.total.as_major_f64() / leasable,
        tenants_cam,
        owner_cam,
        owner_shares: OwnerShares {
            generator,
            transformer,
            other_cam,
        },
        occupied_units_count: space.occupied_units,
        vacant_units_count: space.vacant_units,
        units: units
            .iter()
            .map(|u| unit_allocation(u, leasable, costs))
            .collect(),
    })
}

/// Run the full pipeline for one request: period check, space classifier,
/// cost aggregator, allocation engine
///
/// Any failure aborts the whole computation; no partial summary is returned.
pub fn compute(input: &AllocationInput, today: NaiveDate) -> CamResult<CamSummary> {
    validate_period(input.period, today)?;

    let building = &input.building;
    let space = classify_space(building.id, building.total_leasable_area, &input.units)?;
    let costs = aggregate_costs(
        building.generator_fee,
        building.transformer_fee,
        input.other_cam_costs,
    )?;
    let summary = allocate(building, input.period, &space, &costs, &input.units)?;

    tracing::debug!(
        building_id = %building.id,
        period = %input.period,
        total = %summary.costs.total,
        tenants = %summary.tenants_cam,
        owner = %summary.owner_cam,
        "allocation computed"
    );

    Ok(summary)
}
