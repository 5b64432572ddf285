//! Stabilization locator.
//!
//! Finds the main-chain unit that first references a target as its last
//! ball. When no main-chain unit names the target directly (the target is
//! not itself a ball), the search moves one step down the main chain and
//! retries with the next main-chain unit.

use dagview_store::UnitStore;
use dagview_types::UnitHash;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::ExplorerResult;
use crate::walker::{MainChainStep, MainChainWalker};

pub struct StabilizationLocator<'a, U> {
    units: &'a U,
    walker: MainChainWalker<'a, U>,
}

impl<'a, U: UnitStore> StabilizationLocator<'a, U> {
    pub fn new(units: &'a U) -> Self {
        Self {
            units,
            walker: MainChainWalker::new(units),
        }
    }

    /// The stabilization point of `target`, or `None` if no main-chain unit
    /// at or below the current tip stabilizes it yet.
    ///
    /// Each iteration issues at most two probes and moves strictly down a
    /// finite main chain, so the loop ends at the tip at the latest.
    pub fn find_stabilization_point(
        &self,
        target: &UnitHash,
        cancel: &CancelToken,
    ) -> ExplorerResult<Option<MainChainStep>> {
        let mut current = target.clone();
        let mut advanced = 0u64;
        loop {
            cancel.check()?;
            if let Some(stabilizer) = self.units.latest_stabilizer(&current)? {
                debug!(
                    target = %target,
                    via = %current,
                    stabilizer = %stabilizer.unit,
                    mci = ?stabilizer.main_chain_index,
                    advanced,
                    "found stabilization point"
                );
                return Ok(Some(MainChainStep::from_props(&stabilizer)));
            }

            cancel.check()?;
            match self.walker.step(&current)? {
                Some(next) => {
                    current = next.unit;
                    advanced += 1;
                }
                None => {
                    debug!(target = %target, advanced, "no stabilization point yet");
                    return Ok(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;
    use dagview_nullables::{NullStore, UnitFixture};
    use dagview_store::{LedgerSnapshot, StoreError};

    /// g <- a <- b <- c <- d on the main chain; b and d carry last balls.
    fn store() -> NullStore {
        let snapshot = LedgerSnapshot {
            units: vec![
                UnitFixture::new("g", 1).on_main_chain(0).timestamp(100).build(),
                UnitFixture::new("a", 2)
                    .on_main_chain(1)
                    .best_parent("g")
                    .timestamp(110)
                    .build(),
                UnitFixture::new("b", 3)
                    .on_main_chain(2)
                    .best_parent("a")
                    .last_ball("g")
                    .timestamp(120)
                    .build(),
                UnitFixture::new("c", 4)
                    .on_main_chain(3)
                    .best_parent("b")
                    .last_ball("g")
                    .timestamp(130)
                    .build(),
                UnitFixture::new("d", 5)
                    .on_main_chain(4)
                    .best_parent("c")
                    .last_ball("b")
                    .timestamp(140)
                    .build(),
            ],
            ..Default::default()
        };
        NullStore::from_snapshot(&snapshot).unwrap()
    }

    #[test]
    fn direct_hit_prefers_greatest_index() {
        let store = store();
        let locator = StabilizationLocator::new(&store);
        let point = locator
            .find_stabilization_point(&UnitHash::new("g"), &CancelToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(point.unit.as_str(), "c");
        assert_eq!(point.timestamp.as_secs(), 130);
    }

    #[test]
    fn advances_down_the_chain_when_not_a_ball() {
        let store = store();
        let locator = StabilizationLocator::new(&store);
        // "a" is never a last ball; its successor "b" is, stabilized by "d".
        let point = locator
            .find_stabilization_point(&UnitHash::new("a"), &CancelToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(point.unit.as_str(), "d");
    }

    #[test]
    fn exhausted_chain_is_not_an_error() {
        let store = store();
        let locator = StabilizationLocator::new(&store);
        let point = locator
            .find_stabilization_point(&UnitHash::new("c"), &CancelToken::new())
            .unwrap();
        assert!(point.is_none());
    }

    #[test]
    fn store_failure_propagates() {
        let store = store();
        store.fail_after(2);
        let locator = StabilizationLocator::new(&store);
        let err = locator
            .find_stabilization_point(&UnitHash::new("a"), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Store(StoreError::Unavailable(_))));
    }

    #[test]
    fn cancelled_token_stops_before_probing() {
        let store = store();
        let token = CancelToken::new();
        token.cancel();
        let locator = StabilizationLocator::new(&store);
        let err = locator
            .find_stabilization_point(&UnitHash::new("a"), &token)
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Cancelled));
        assert_eq!(store.query_count(), 0);
    }
}
