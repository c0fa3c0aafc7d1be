//! Records persisted by the custody store.
//!
//! Wire names are camelCase to match the front end. Every record carries an
//! opaque `id` assigned by the store on creation; clients may omit it.

use std::cmp::Ordering;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A document kind stored in its own collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (key prefix) the record lives under.
    const COLLECTION: &'static str;
    /// Human readable name used in error messages.
    const ENTITY: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

macro_rules! impl_record {
    ($ty:ty, $collection:literal, $entity:literal) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $collection;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

/// Cached occupancy aggregate over every cell reporting the block's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellBlock {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    pub current: u32,
    pub utilization: u32,
}

impl CellBlock {
    pub fn apply(&mut self, aggregate: BlockAggregate) {
        self.capacity = aggregate.capacity;
        self.current = aggregate.current;
        self.utilization = aggregate.utilization;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellStatus {
    #[default]
    Available,
    Occupied,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cell {
    pub id: String,
    #[serde(rename = "cellNumber")]
    pub cell_number: String,
    pub block: String,
    pub capacity: u32,
    #[serde(rename = "currentOccupancy")]
    pub current_occupancy: u32,
    pub status: CellStatus,
    /// Roster of inmate codes housed in this cell.
    pub inmates: Vec<String>,
}

impl Cell {
    pub fn has_space(&self) -> bool {
        self.current_occupancy < self.capacity
    }

    pub fn is_at(&self, cell_number: &str, block: &str) -> bool {
        self.cell_number == cell_number && self.block == block
    }

    pub fn refresh_status(&mut self) {
        self.status = if self.current_occupancy >= self.capacity {
            CellStatus::Occupied
        } else {
            CellStatus::Available
        };
    }

    /// Adds `code` to the roster and takes one slot.
    pub fn house(&mut self, code: &str) {
        self.inmates.push(code.to_string());
        self.current_occupancy += 1;
        self.refresh_status();
    }

    /// Drops the first roster entry for `code` and frees one slot.
    ///
    /// Status only moves back to `Available`; a release never marks a cell
    /// occupied.
    pub fn vacate(&mut self, code: &str) -> bool {
        let removed = match self.inmates.iter().position(|c| c == code) {
            Some(idx) => {
                self.inmates.remove(idx);
                true
            }
            None => false,
        };
        self.current_occupancy = self.current_occupancy.saturating_sub(1);
        if self.current_occupancy < self.capacity {
            self.status = CellStatus::Available;
        }
        removed
    }

    /// Re-derives occupancy and status from the roster.
    pub fn normalize(&mut self) {
        self.current_occupancy = u32::try_from(self.inmates.len()).unwrap_or(u32::MAX);
        self.refresh_status();
    }
}

/// Auto-assignment order: ascending cell number, numerically when both
/// numbers are integers, then block name, then id.
pub fn assignment_order(a: &Cell, b: &Cell) -> Ordering {
    let by_number = match (
        a.cell_number.trim().parse::<u64>(),
        b.cell_number.trim().parse::<u64>(),
    ) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cell_number.cmp(&b.cell_number),
    };
    by_number
        .then_with(|| a.block.cmp(&b.block))
        .then_with(|| a.id.cmp(&b.id))
}

/// Capacity, occupancy and utilization summed over a block's cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockAggregate {
    pub capacity: u32,
    pub current: u32,
    pub utilization: u32,
}

impl BlockAggregate {
    pub fn over<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let (capacity, current) = cells.into_iter().fold((0u64, 0u64), |(cap, cur), cell| {
            (
                cap + u64::from(cell.capacity),
                cur + u64::from(cell.current_occupancy),
            )
        });

        Self {
            capacity: clamp_u32(capacity),
            current: clamp_u32(current),
            utilization: utilization_percent(current, capacity),
        }
    }
}

/// `floor(100 * current / capacity)`, or 0 for an empty block.
pub fn utilization_percent(current: u64, capacity: u64) -> u32 {
    if capacity == 0 {
        return 0;
    }
    clamp_u32(current.saturating_mul(100) / capacity)
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inmate {
    pub id: String,
    pub name: String,
    /// External inmate code, distinct from the store id.
    #[serde(rename = "inmateId")]
    pub inmate_id: String,
    pub age: u32,
    #[serde(rename = "cellNumber")]
    pub cell_number: String,
    pub block: String,
    #[serde(rename = "admissionDate")]
    pub admission_date: String,
    /// Active, Released or Transferred.
    pub status: String,
    pub charges: String,
}

impl Inmate {
    /// Field replacement used by updates. `cell_number` is kept; nothing here
    /// touches cell rosters, so changing `inmate_id` or `block` leaves the
    /// housing cell's roster naming the old values.
    pub fn replace_details(&mut self, update: Inmate) {
        self.name = update.name;
        self.inmate_id = update.inmate_id;
        self.age = update.age;
        self.admission_date = update.admission_date;
        self.status = update.status;
        self.charges = update.charges;
        self.block = update.block;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Staff {
    pub id: String,
    pub name: String,
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    pub position: String,
    pub department: String,
    pub shift: String,
    pub status: String,
    #[serde(rename = "hireDate")]
    pub hire_date: String,
    pub phone: String,
}

/// Named counter feeding the dashboard's active staff figure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffStatus {
    pub id: String,
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visitor {
    pub id: String,
    pub name: String,
    pub relationship: String,
    #[serde(rename = "visitDate")]
    pub visit_date: String,
    #[serde(rename = "visitTime")]
    pub visit_time: String,
    pub status: String,
    pub phone: String,
    #[serde(rename = "idNumber")]
    pub id_number: String,
    /// Inmate code of the person being visited.
    #[serde(rename = "visitingInmate")]
    pub visiting_inmate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyActivity {
    pub id: String,
    pub day: String,
    pub admissions: u32,
    pub releases: u32,
    pub visitors: u32,
    pub incidents: u32,
}

impl WeeklyActivity {
    pub fn replace_counts(&mut self, update: WeeklyActivity) {
        self.day = update.day;
        self.admissions = update.admissions;
        self.releases = update.releases;
        self.visitors = update.visitors;
        self.incidents = update.incidents;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(rename = "totalInmates")]
    pub total_inmates: u64,
    #[serde(rename = "activeStaff")]
    pub active_staff: u64,
    #[serde(rename = "dailyVisitors")]
    pub daily_visitors: u64,
    /// Negative when blocks are over-filled.
    #[serde(rename = "availableCells")]
    pub available_cells: i64,
}

impl_record!(CellBlock, "cell_blocks", "cell block");
impl_record!(Cell, "cells", "cell");
impl_record!(Inmate, "inmates", "inmate");
impl_record!(Staff, "staff", "staff member");
impl_record!(StaffStatus, "staff_status", "staff status");
impl_record!(Visitor, "visitors", "visitor");
impl_record!(WeeklyActivity, "weekly_activity", "weekly activity");

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(number: &str, block: &str, capacity: u32) -> Cell {
        Cell {
            id: format!("{block}-{number}"),
            cell_number: number.to_string(),
            block: block.to_string(),
            capacity,
            ..Default::default()
        }
    }

    #[test]
    fn test_cell_wire_names() {
        let mut c = cell("101", "A", 2);
        c.house("INM-1");

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["cellNumber"], "101");
        assert_eq!(json["currentOccupancy"], 1);
        assert_eq!(json["status"], "Available");
        assert_eq!(json["inmates"][0], "INM-1");
    }

    #[test]
    fn test_partial_payload_uses_defaults() {
        let inmate: Inmate =
            serde_json::from_str(r#"{"name": "John Doe", "inmateId": "INM-7"}"#).unwrap();
        assert!(inmate.id.is_empty());
        assert_eq!(inmate.inmate_id, "INM-7");
        assert_eq!(inmate.age, 0);
        assert!(inmate.cell_number.is_empty());
    }

    #[test]
    fn test_house_marks_full_cell_occupied() {
        let mut c = cell("1", "A", 1);
        c.house("X");
        assert_eq!(c.current_occupancy, 1);
        assert_eq!(c.status, CellStatus::Occupied);
        assert!(!c.has_space());
    }

    #[test]
    fn test_vacate_removes_first_occurrence_only() {
        let mut c = cell("1", "A", 3);
        c.inmates = vec!["X".into(), "Y".into(), "X".into()];
        c.normalize();

        assert!(c.vacate("X"));
        assert_eq!(c.inmates, vec!["Y".to_string(), "X".to_string()]);
        assert_eq!(c.current_occupancy, 2);
    }

    #[test]
    fn test_vacate_unknown_code_still_frees_slot() {
        let mut c = cell("1", "A", 1);
        c.house("X");

        assert!(!c.vacate("Z"));
        assert_eq!(c.current_occupancy, 0);
        assert_eq!(c.status, CellStatus::Available);
    }

    #[test]
    fn test_vacate_never_underflows() {
        let mut c = cell("1", "A", 1);
        c.vacate("X");
        assert_eq!(c.current_occupancy, 0);
    }

    #[test]
    fn test_assignment_order_is_numeric_when_possible() {
        let mut cells = vec![cell("10", "A", 1), cell("9", "A", 1), cell("2", "B", 1)];
        cells.sort_by(assignment_order);
        let numbers: Vec<_> = cells.iter().map(|c| c.cell_number.as_str()).collect();
        assert_eq!(numbers, vec!["2", "9", "10"]);
    }

    #[test]
    fn test_assignment_order_falls_back_to_lexical() {
        let mut cells = vec![cell("B-2", "B", 1), cell("A-10", "A", 1), cell("7", "C", 1)];
        cells.sort_by(assignment_order);
        let numbers: Vec<_> = cells.iter().map(|c| c.cell_number.as_str()).collect();
        assert_eq!(numbers, vec!["7", "A-10", "B-2"]);
    }

    #[test]
    fn test_utilization_floors() {
        assert_eq!(utilization_percent(1, 3), 33);
        assert_eq!(utilization_percent(2, 3), 66);
        assert_eq!(utilization_percent(3, 3), 100);
        assert_eq!(utilization_percent(0, 0), 0);
    }

    #[test]
    fn test_block_aggregate_sums_cells() {
        let mut a = cell("1", "A", 2);
        a.house("X");
        let b = cell("2", "A", 2);

        let agg = BlockAggregate::over([&a, &b]);
        assert_eq!(
            agg,
            BlockAggregate {
                capacity: 4,
                current: 1,
                utilization: 25
            }
        );
    }

    #[test]
    fn test_block_aggregate_over_no_cells_is_zero() {
        let agg = BlockAggregate::over(std::iter::empty::<&Cell>());
        assert_eq!(agg, BlockAggregate::default());
    }
}
