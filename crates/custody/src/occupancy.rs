//! Occupancy coordination
//!
//! Keeps cell rosters and cell block aggregates in step with inmate admission
//! and release, and with cell/block edits that change capacity or occupancy.
//!
//! Cell state is authoritative. Block numbers are a cache recomputed from the
//! cells after every change; a block that cannot be found is skipped with a
//! warning and never rolls the cell change back.
//!
//! Cell writes made during admission and release are conditional on the
//! revision that was read. A stale write re-reads the cell, re-validates and
//! retries up to `retry_limit` times, so two admissions racing for the last
//! slot cannot both land. Cell replacements are conditional too but do not
//! retry: a replacement that loses to an admission or release is rejected.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{CustodyError, CustodyResult};
use crate::models::{assignment_order, BlockAggregate, Cell, CellBlock, Inmate, Record};
use crate::store::{Records, Versioned};

pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// How the caller identifies an inmate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InmateLookup {
    /// Store-assigned id.
    ById(String),
    /// External inmate code (`inmateId` on the wire).
    ByCode(String),
}

impl InmateLookup {
    fn key(&self) -> &str {
        match self {
            Self::ById(key) | Self::ByCode(key) => key,
        }
    }
}

/// Where an admission should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Explicit { cell_number: String, block: String },
    /// First cell with spare capacity in [`assignment_order`].
    Auto,
}

impl Placement {
    /// Explicit only when both the cell number and block are present.
    pub fn of(inmate: &Inmate) -> Self {
        let cell_number = inmate.cell_number.trim();
        let block = inmate.block.trim();
        if cell_number.is_empty() || block.is_empty() {
            Self::Auto
        } else {
            Self::Explicit {
                cell_number: cell_number.to_string(),
                block: block.to_string(),
            }
        }
    }
}

#[derive(Clone)]
pub struct OccupancyCoordinator {
    records: Records,
    retry_limit: u32,
}

impl OccupancyCoordinator {
    pub fn new(records: Records) -> Self {
        Self::with_retry_limit(records, DEFAULT_RETRY_LIMIT)
    }

    pub fn with_retry_limit(records: Records, retry_limit: u32) -> Self {
        Self {
            records,
            retry_limit,
        }
    }

    /// Admits `inmate` into its requested cell, or the first free one when no
    /// target is given.
    pub async fn admit(&self, mut inmate: Inmate) -> CustodyResult<Inmate> {
        let code = inmate.inmate_id.trim().to_string();
        inmate.inmate_id = code.clone();

        if code.is_empty() {
            return Err(CustodyError::InvalidInput(
                "inmate code is required".to_string(),
            ));
        }
        if self.find_by_code(&code).await?.is_some() {
            return Err(CustodyError::conflict("inmate code already in use"));
        }

        if inmate.admission_date.trim().is_empty() {
            inmate.admission_date = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        }

        let placement = Placement::of(&inmate);
        let cell = self.claim_slot(&placement, &code).await?;
        inmate.cell_number = cell.cell_number.clone();
        inmate.block = cell.block.clone();

        let admitted = match self.records.inmates.create(inmate).await {
            Ok(admitted) => admitted,
            Err(e) => {
                // Hand the slot back before surfacing the store failure.
                if let Err(rollback) = self.vacate_slot(&cell.cell_number, &cell.block, &code).await
                {
                    warn!(
                        "Failed to return slot in cell {} (block {}) after aborted admission: {}",
                        cell.cell_number, cell.block, rollback
                    );
                }
                return Err(e.into());
            }
        };

        self.recompute_block(&cell.block).await?;

        info!(
            "Admitted inmate {} ({}) to cell {} in block {}",
            admitted.inmate_id, admitted.id, admitted.cell_number, admitted.block
        );
        Ok(admitted)
    }

    /// Releases an inmate: frees its cell slot (if the cell still exists) and
    /// deletes the inmate record.
    pub async fn release(&self, lookup: &InmateLookup) -> CustodyResult<Inmate> {
        let inmate = self
            .find_inmate(lookup)
            .await?
            .ok_or_else(|| CustodyError::not_found(Inmate::ENTITY, lookup.key()))?;

        match self
            .vacate_slot(&inmate.cell_number, &inmate.block, &inmate.inmate_id)
            .await?
        {
            Some(cell) => {
                self.recompute_block(&cell.block).await?;
            }
            None => warn!(
                "Inmate {} assigned to missing cell {} in block {}; deleting record only",
                inmate.inmate_id, inmate.cell_number, inmate.block
            ),
        }

        self.records.inmates.delete(&inmate.id).await?;

        info!("Released inmate {} ({})", inmate.inmate_id, inmate.id);
        Ok(inmate)
    }

    pub async fn find_inmate(&self, lookup: &InmateLookup) -> CustodyResult<Option<Inmate>> {
        match lookup {
            InmateLookup::ById(id) => Ok(self.records.inmates.get(id).await?),
            InmateLookup::ByCode(code) => self.find_by_code(code).await,
        }
    }

    async fn find_by_code(&self, code: &str) -> CustodyResult<Option<Inmate>> {
        Ok(self
            .records
            .inmates
            .all()
            .await?
            .into_iter()
            .find(|inmate| inmate.inmate_id == code))
    }

    /// Recomputes and stores the aggregate of the first block named
    /// `block_name`. Returns `None` when no such block exists.
    pub async fn recompute_block(&self, block_name: &str) -> CustodyResult<Option<CellBlock>> {
        let aggregate = self.aggregate_for(block_name).await?;

        let Some(mut block) = self
            .records
            .cell_blocks
            .all()
            .await?
            .into_iter()
            .find(|block| block.name == block_name)
        else {
            warn!(
                "No cell block named {}; skipping aggregate update",
                block_name
            );
            return Ok(None);
        };

        block.apply(aggregate);
        self.records.cell_blocks.save(&block).await?;

        debug!(
            "Block {} now at {}/{} ({}%)",
            block.name, block.current, block.capacity, block.utilization
        );
        Ok(Some(block))
    }

    async fn aggregate_for(&self, block_name: &str) -> CustodyResult<BlockAggregate> {
        let cells = self.records.cells.all().await?;
        Ok(BlockAggregate::over(
            cells.iter().filter(|cell| cell.block == block_name),
        ))
    }

    async fn claim_slot(&self, placement: &Placement, code: &str) -> CustodyResult<Cell> {
        for attempt in 0..=self.retry_limit {
            let Versioned {
                revision,
                record: mut cell,
            } = self.resolve_cell(placement).await?;

            cell.house(code);
            if self.records.cells.save_if(&cell, revision).await? {
                return Ok(cell);
            }

            debug!(
                "Cell {} in block {} changed during admission (attempt {}), retrying",
                cell.cell_number,
                cell.block,
                attempt + 1
            );
        }

        Err(CustodyError::conflict("cell was modified concurrently"))
    }

    async fn resolve_cell(&self, placement: &Placement) -> CustodyResult<Versioned<Cell>> {
        let mut cells = self.records.cells.all_versioned().await?;

        match placement {
            Placement::Explicit { cell_number, block } => {
                let cell = cells
                    .into_iter()
                    .find(|c| c.record.is_at(cell_number, block))
                    .ok_or_else(|| {
                        CustodyError::not_found(
                            Cell::ENTITY,
                            format!("{cell_number} in block {block}"),
                        )
                    })?;
                if !cell.record.has_space() {
                    return Err(CustodyError::conflict("cell is full"));
                }
                Ok(cell)
            }
            Placement::Auto => {
                cells.sort_by(|a, b| assignment_order(&a.record, &b.record));
                cells
                    .into_iter()
                    .find(|c| c.record.has_space())
                    .ok_or_else(|| CustodyError::conflict("no available cells"))
            }
        }
    }

    /// Frees `code`'s slot in the cell at (`cell_number`, `block`). Returns the
    /// updated cell, or `None` when no such cell exists.
    async fn vacate_slot(
        &self,
        cell_number: &str,
        block: &str,
        code: &str,
    ) -> CustodyResult<Option<Cell>> {
        for attempt in 0..=self.retry_limit {
            let Some(Versioned {
                revision,
                record: mut cell,
            }) = self
                .records
                .cells
                .all_versioned()
                .await?
                .into_iter()
                .find(|c| c.record.is_at(cell_number, block))
            else {
                return Ok(None);
            };

            if !cell.vacate(code) {
                warn!(
                    "Inmate {} missing from roster of cell {} in block {}",
                    code, cell_number, block
                );
            }
            if self.records.cells.save_if(&cell, revision).await? {
                return Ok(Some(cell));
            }

            debug!(
                "Cell {} in block {} changed during release (attempt {}), retrying",
                cell_number,
                block,
                attempt + 1
            );
        }

        Err(CustodyError::conflict("cell was modified concurrently"))
    }

    /// Stores a new cell with occupancy derived from its roster and refreshes
    /// the owning block.
    pub async fn create_cell(&self, mut cell: Cell) -> CustodyResult<Cell> {
        cell.normalize();
        let cell = self.records.cells.create(cell).await?;
        self.recompute_block(&cell.block).await?;
        info!(
            "Created cell {} in block {} ({})",
            cell.cell_number, cell.block, cell.id
        );
        Ok(cell)
    }

    /// Replaces every mutable field of cell `id`, roster included, and
    /// refreshes the old and new owning blocks.
    pub async fn update_cell(&self, id: &str, mut replacement: Cell) -> CustodyResult<Cell> {
        let Versioned {
            revision,
            record: existing,
        } = self
            .records
            .cells
            .get_versioned(id)
            .await?
            .ok_or_else(|| CustodyError::not_found(Cell::ENTITY, id))?;

        replacement.id = existing.id;
        replacement.normalize();
        if !self.records.cells.save_if(&replacement, revision).await? {
            return Err(CustodyError::conflict("cell was modified concurrently"));
        }

        self.recompute_block(&replacement.block).await?;
        if existing.block != replacement.block {
            self.recompute_block(&existing.block).await?;
        }
        Ok(replacement)
    }

    /// Returns whether the cell existed.
    pub async fn delete_cell(&self, id: &str) -> CustodyResult<bool> {
        let Some(cell) = self.records.cells.get(id).await? else {
            return Ok(false);
        };
        if !cell.inmates.is_empty() {
            warn!(
                "Deleting cell {} in block {} with {} inmates on its roster",
                cell.cell_number,
                cell.block,
                cell.inmates.len()
            );
        }

        let removed = self.records.cells.delete(id).await?;
        self.recompute_block(&cell.block).await?;
        Ok(removed)
    }

    /// Stores a new block. Its numbers come from the cells already reporting
    /// its name, never from the caller.
    pub async fn create_block(&self, mut block: CellBlock) -> CustodyResult<CellBlock> {
        block.apply(self.aggregate_for(&block.name).await?);
        let block = self.records.cell_blocks.create(block).await?;
        info!("Created cell block {} ({})", block.name, block.id);
        Ok(block)
    }

    /// Renames block `id` and recomputes its numbers under the new name.
    pub async fn update_block(&self, id: &str, replacement: CellBlock) -> CustodyResult<CellBlock> {
        let mut block = self
            .records
            .cell_blocks
            .get(id)
            .await?
            .ok_or_else(|| CustodyError::not_found(CellBlock::ENTITY, id))?;

        block.name = replacement.name;
        block.apply(self.aggregate_for(&block.name).await?);
        self.records.cell_blocks.save(&block).await?;
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inmate(cell_number: &str, block: &str) -> Inmate {
        Inmate {
            cell_number: cell_number.to_string(),
            block: block.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_placement_requires_both_parts() {
        assert_eq!(
            Placement::of(&inmate("101", "A")),
            Placement::Explicit {
                cell_number: "101".to_string(),
                block: "A".to_string()
            }
        );
        assert_eq!(Placement::of(&inmate("101", "")), Placement::Auto);
        assert_eq!(Placement::of(&inmate("", "A")), Placement::Auto);
        assert_eq!(Placement::of(&inmate("  ", " ")), Placement::Auto);
    }

    #[test]
    fn test_lookup_key() {
        assert_eq!(InmateLookup::ById("abc".into()).key(), "abc");
        assert_eq!(InmateLookup::ByCode("INM-1".into()).key(), "INM-1");
    }
}
