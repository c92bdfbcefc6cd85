//! # Stage schedule
//!
//! Partitions the sale's block timeline into the commit phase (stage 0)
//! followed by `stage_count` buy stages of equal length:
//!
//! ```text
//!  stage 0 (commit)          stage 1               stage N
//! [start ..... start+C-1][start+C ... +S-1] ... [ ... last_block]
//!  price P                P + I                   P + N*I
//! ```
//!
//! Both bounds of a stage are inclusive: the last block of stage `i` belongs
//! to stage `i`, the next block to stage `i + 1`. The schedule holds only the
//! configuration scalars and derives every stage arithmetically, so lookups
//! are O(1) and need no storage access.

use soroban_sdk::{Env, Vec};

use crate::types::{SaleConfig, SaleState, Stage, MAX_STAGE_COUNT};
use crate::Error;

/// Current block height as seen by the contract.
pub fn current_block_number(env: &Env) -> u64 {
    env.ledger().sequence() as u64
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StageSchedule {
    commit_start: u64,
    commit_block_count: u64,
    commit_price: i128,
    stage_count: u32,
    stage_block_count: u64,
    price_increase: i128,
}

impl StageSchedule {
    pub fn from_config(config: &SaleConfig) -> Self {
        StageSchedule {
            commit_start: config.commit_phase_start_block,
            commit_block_count: config.commit_phase_block_count,
            commit_price: config.commit_phase_price,
            stage_count: config.stage_count,
            stage_block_count: config.stage_block_count,
            price_increase: config.stage_price_increase,
        }
    }

    /// Reject configurations that cannot produce a contiguous schedule with
    /// strictly increasing prices.
    pub fn validate(&self) -> Result<(), Error> {
        if self.commit_block_count == 0
            || self.stage_block_count == 0
            || self.commit_price <= 0
            || self.price_increase <= 0
            || self.stage_count == 0
            || self.stage_count > MAX_STAGE_COUNT
        {
            return Err(Error::InvalidConfig);
        }
        // The last stage must be representable.
        self.stage(self.stage_count)
            .map(|_| ())
            .map_err(|_| Error::InvalidConfig)
    }

    /// Number of buy stages; valid indices are `0..=stage_count()`.
    pub fn stage_count(&self) -> u32 {
        self.stage_count
    }

    pub fn stage(&self, index: u32) -> Result<Stage, Error> {
        if index > self.stage_count {
            return Err(Error::OutOfRange);
        }
        if index == 0 {
            let end_block = self
                .commit_start
                .checked_add(self.commit_block_count - 1)
                .ok_or(Error::Overflow)?;
            return Ok(Stage {
                start_block: self.commit_start,
                end_block,
                token_price: self.commit_price,
            });
        }

        let start_block = (index as u64 - 1)
            .checked_mul(self.stage_block_count)
            .and_then(|offset| offset.checked_add(self.commit_start))
            .and_then(|start| start.checked_add(self.commit_block_count))
            .ok_or(Error::Overflow)?;
        let end_block = start_block
            .checked_add(self.stage_block_count - 1)
            .ok_or(Error::Overflow)?;
        let token_price = self
            .price_increase
            .checked_mul(index as i128)
            .and_then(|increase| increase.checked_add(self.commit_price))
            .ok_or(Error::Overflow)?;

        Ok(Stage {
            start_block,
            end_block,
            token_price,
        })
    }

    pub fn first_block(&self) -> u64 {
        self.commit_start
    }

    /// End block of the last stage.
    pub fn last_block(&self) -> Result<u64, Error> {
        Ok(self.stage(self.stage_count)?.end_block)
    }

    /// Resolve `block` to the index of the stage containing it.
    ///
    /// Fails with `OutOfRange` outside `[first_block, last_block]`.
    pub fn stage_at(&self, block: u64) -> Result<u32, Error> {
        let commit = self.stage(0)?;
        if block < commit.start_block {
            return Err(Error::OutOfRange);
        }
        if block <= commit.end_block {
            return Ok(0);
        }

        let offset = (block - (commit.end_block + 1)) / self.stage_block_count;
        let index = offset.saturating_add(1).min(self.stage_count as u64) as u32;

        let stage = self.stage(index)?;
        if block >= stage.start_block && block <= stage.end_block {
            Ok(index)
        } else {
            Err(Error::OutOfRange)
        }
    }

    pub fn price_at(&self, block: u64) -> Result<i128, Error> {
        let index = self.stage_at(block)?;
        Ok(self.stage(index)?.token_price)
    }

    /// Stage used to attribute accepted funds: `0` before the sale starts,
    /// `stage_count + 1` once it has ended, `stage_at(block)` otherwise.
    pub fn accounting_stage(&self, block: u64) -> u32 {
        if block < self.commit_start {
            return 0;
        }
        self.stage_at(block).unwrap_or(self.stage_count + 1)
    }

    pub fn state_at(&self, block: u64) -> Result<SaleState, Error> {
        if block < self.commit_start {
            Ok(SaleState::Initialized)
        } else if block <= self.last_block()? {
            Ok(SaleState::Running)
        } else {
            Ok(SaleState::Ended)
        }
    }

    /// Materialize every stage, index 0 first.
    pub fn build(&self, env: &Env) -> Result<Vec<Stage>, Error> {
        let mut stages = Vec::new(env);
        for index in 0..=self.stage_count {
            stages.push_back(self.stage(index)?);
        }
        Ok(stages)
    }
}
