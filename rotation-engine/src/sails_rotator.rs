//! Sail orderings handed out one set at a time.
//!
//! Each call to [`SailsRotator::rotate`] returns the ordering for the next set:
//! position `i` of the returned list goes to the `i`-th slot of that set.

use tracing::debug;

use sail_types::Sail;

use crate::config::RotationType;
use crate::error::{Result, RotationError};

pub trait SailsRotator {
    fn rotate(&mut self) -> Vec<Sail>;
}

/// Build the rotator for `rotation_type` over `sails`.
pub fn sails_rotator(rotation_type: RotationType, sails: Vec<Sail>) -> Result<Box<dyn SailsRotator>> {
    debug!("Building {rotation_type} sails rotator over {} sails", sails.len());
    let rotator: Box<dyn SailsRotator> = match rotation_type {
        RotationType::None => Box::new(ConstantRotator::new(sails)),
        RotationType::Standard => Box::new(StandardRotator::new(sails)),
        RotationType::Swap => Box::new(SwapRotator::new(sails)?),
    };
    Ok(rotator)
}

// ─── Constant ─────────────────────────────────────────────────────────────────

/// Every set gets the input ordering unchanged.
pub struct ConstantRotator {
    sails: Vec<Sail>,
}

impl ConstantRotator {
    pub fn new(sails: Vec<Sail>) -> Self {
        Self { sails }
    }
}

impl SailsRotator for ConstantRotator {
    fn rotate(&mut self) -> Vec<Sail> {
        self.sails.clone()
    }
}

// ─── Standard ─────────────────────────────────────────────────────────────────

/// Returns the current ordering, then shifts it left by one for the next call.
/// After `n` calls every position has carried every sail once.
pub struct StandardRotator {
    sails: Vec<Sail>,
}

impl StandardRotator {
    pub fn new(sails: Vec<Sail>) -> Self {
        Self { sails }
    }
}

impl SailsRotator for StandardRotator {
    fn rotate(&mut self) -> Vec<Sail> {
        let current = self.sails.clone();
        if !self.sails.is_empty() {
            self.sails.rotate_left(1);
        }
        current
    }
}

// ─── Swap ─────────────────────────────────────────────────────────────────────

/// Half the fleet rotates up while the other half rotates down.
///
/// For the pair `(2i, 2i+1)` on call `c`:
/// - even slot takes `sails[(2i + c) mod n]`
/// - odd slot takes `sails[(2i + 1 - c) mod n]`
pub struct SwapRotator {
    sails: Vec<Sail>,
    counter: usize,
}

impl SwapRotator {
    pub fn new(sails: Vec<Sail>) -> Result<Self> {
        if sails.len() % 2 != 0 {
            return Err(RotationError::OddSwapSize(sails.len()));
        }
        Ok(Self { sails, counter: 0 })
    }
}

impl SailsRotator for SwapRotator {
    fn rotate(&mut self) -> Vec<Sail> {
        let n = self.sails.len();
        if n == 0 {
            return Vec::new();
        }
        let c = self.counter % n;
        let mut out = Vec::with_capacity(n);
        for i in (0..n).step_by(2) {
            out.push(self.sails[(i + c) % n].clone());
            out.push(self.sails[(i + 1 + n - c) % n].clone());
        }
        self.counter += 1;
        out
    }
}
