//! End-to-end confirmation scenarios over a synthetic ten-unit main chain.

use std::sync::Arc;

use dagview_explorer::{
    CancelToken, ConfirmationDelays, ConfirmationTimes, Explorer, ExplorerError,
    ExplorerSettings, StabilizationLocator,
};
use dagview_nullables::{witness_addresses, NullStore, UnitFixture};
use dagview_store::{LedgerSnapshot, StoreError};
use dagview_types::{Address, Timestamp, UnitHash, WitnessParams};

const CHAIN_LEN: usize = 10;

/// Main-chain units `u0..u9`; `last_balls` maps a unit to the unit it
/// names as last ball. `u4` (timestamp 1000) stabilizes `u1`.
const LAST_BALLS: &[(usize, usize)] = &[(3, 0), (4, 1), (6, 3), (7, 3)];

fn timestamp_of(i: usize) -> u64 {
    match i {
        0..=3 => 900 + 10 * i as u64,
        _ => 1000 + 25 * (i as u64 - 4),
    }
}

fn unit(i: usize) -> UnitHash {
    UnitHash::new(format!("u{i}"))
}

/// Builds the chain; `authors(i)` are the authors of `u{i}`.
fn ledger(witnesses: &[Address], authors: impl Fn(usize) -> Vec<Address>) -> NullStore {
    let mut units = Vec::new();
    for i in 0..CHAIN_LEN {
        let mut fixture = UnitFixture::new(&format!("u{i}"), i as u64 + 1)
            .on_main_chain(i as u64)
            .stable()
            .timestamp(timestamp_of(i))
            .witness_list_unit("u0")
            .authored_by(&authors(i));
        if i == 0 {
            fixture = fixture.witnesses(witnesses);
        } else {
            fixture = fixture.best_parent(&format!("u{}", i - 1));
        }
        if let Some((_, ball)) = LAST_BALLS.iter().find(|(child, _)| *child == i) {
            fixture = fixture.last_ball(&format!("u{ball}"));
        }
        units.push(fixture.build());
    }
    // An off-chain unit included by u1.
    units.push(
        UnitFixture::new("side", CHAIN_LEN as u64 + 1)
            .included_at(1)
            .stable()
            .best_parent("u0")
            .created_at(940)
            .build(),
    );
    NullStore::from_snapshot(&LedgerSnapshot {
        units,
        ..Default::default()
    })
    .unwrap()
}

fn explorer(store: NullStore) -> Explorer<NullStore> {
    Explorer::new(
        Arc::new(store),
        ExplorerSettings {
            witness_params: WitnessParams::MAINNET,
            op_list: Vec::new(),
        },
    )
}

/// Quorum of 7 split as 3 + 2 + 2 over u4, u5, u6.
fn split_quorum(w: &[Address]) -> impl Fn(usize) -> Vec<Address> + '_ {
    move |i| match i {
        4 => w[0..3].to_vec(),
        5 => w[3..5].to_vec(),
        6 => w[5..7].to_vec(),
        _ => Vec::new(),
    }
}

#[test]
fn quorum_reached_at_the_stabilization_point() {
    let w = witness_addresses(12);
    let store = ledger(&w, |i| if i == 4 { w[..7].to_vec() } else { Vec::new() });
    let explorer = explorer(store);

    let times = explorer
        .trace_confirmation(&unit(1), &CancelToken::new())
        .unwrap();
    assert_eq!(times.full, Some(Timestamp::new(1000)));
    assert_eq!(times.light, Some(Timestamp::new(1000)));

    let delays = explorer
        .confirmation_delays(&unit(1), &CancelToken::new())
        .unwrap();
    assert_eq!(
        delays,
        ConfirmationDelays {
            full_node_confirmation_delay: Some(90),
            light_node_confirmation_delay: Some(90),
        }
    );
}

#[test]
fn quorum_reached_two_units_later() {
    let w = witness_addresses(12);
    let store = ledger(&w, split_quorum(&w));
    let explorer = explorer(store);

    let times = explorer
        .trace_confirmation(&unit(1), &CancelToken::new())
        .unwrap();
    assert_eq!(times.full, Some(Timestamp::new(1000)));
    assert_eq!(times.light, Some(Timestamp::new(1050)));
}

#[test]
fn off_chain_unit_uses_its_main_chain_index() {
    let w = witness_addresses(12);
    let explorer = explorer(ledger(&w, split_quorum(&w)));
    let delays = explorer
        .confirmation_delays(&UnitHash::new("side"), &CancelToken::new())
        .unwrap();
    assert_eq!(delays.full_node_confirmation_delay, Some(60));
    assert_eq!(delays.light_node_confirmation_delay, Some(110));
}

#[test]
fn six_witnesses_are_not_a_majority() {
    let w = witness_addresses(12);
    // The same six witnesses sign every unit below the stabilization point.
    let store = ledger(&w, |i| if i >= 4 { w[..6].to_vec() } else { Vec::new() });
    let explorer = explorer(store);
    let times = explorer
        .trace_confirmation(&unit(1), &CancelToken::new())
        .unwrap();
    assert_eq!(times.full, Some(Timestamp::new(1000)));
    assert_eq!(times.light, None);
}

#[test]
fn no_stabilizing_descendant_yields_nothing() {
    let w = witness_addresses(12);
    let explorer = explorer(ledger(&w, split_quorum(&w)));
    let times = explorer
        .trace_confirmation(&unit(8), &CancelToken::new())
        .unwrap();
    assert_eq!(times, ConfirmationTimes::NOT_STABLE);

    let delays = explorer
        .confirmation_delays(&unit(8), &CancelToken::new())
        .unwrap();
    assert!(delays.is_empty());
}

#[test]
fn transient_failure_mid_descent_fails_the_call() {
    let w = witness_addresses(12);
    let store = Arc::new(ledger(&w, split_quorum(&w)));
    let explorer = Explorer::new(Arc::clone(&store), ExplorerSettings::default());

    // stabilizer, witness resolution (props, own list, list unit's list),
    // authors of u4, step to u5; the authors of u5 are never read.
    store.reset_query_count();
    store.fail_after(6);
    let err = explorer
        .trace_confirmation(&unit(1), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ExplorerError::Store(StoreError::Unavailable(_))));

    store.heal();
    let times = explorer
        .trace_confirmation(&unit(1), &CancelToken::new())
        .unwrap();
    assert_eq!(times.light, Some(Timestamp::new(1050)));
}

#[test]
fn cancelled_request_touches_nothing() {
    let w = witness_addresses(12);
    let store = Arc::new(ledger(&w, split_quorum(&w)));
    let explorer = Explorer::new(Arc::clone(&store), ExplorerSettings::default());
    let token = CancelToken::new();
    token.cancel();
    store.reset_query_count();
    let err = explorer.confirmation_delays(&unit(1), &token).unwrap_err();
    assert!(matches!(err, ExplorerError::Cancelled));
    assert_eq!(store.query_count(), 0);
}

#[test]
fn stabilization_points_are_monotonic_and_bounded() {
    let w = witness_addresses(12);
    let store = ledger(&w, split_quorum(&w));
    let locator = StabilizationLocator::new(&store);

    let mut previous: Option<u64> = None;
    let mut exhausted = false;
    for i in 0..CHAIN_LEN {
        store.reset_query_count();
        let point = locator
            .find_stabilization_point(&unit(i), &CancelToken::new())
            .unwrap();
        let distance = (CHAIN_LEN - 1 - i) as u64;
        assert!(store.query_count() <= 2 * (distance + 1));

        match point.and_then(|p| p.main_chain_index) {
            Some(mci) => {
                assert!(!exhausted, "u{i} stabilized after an earlier unit did not");
                assert!(previous.map_or(true, |p| p <= mci));
                previous = Some(mci);
            }
            None => exhausted = true,
        }
    }
    assert_eq!(previous, Some(7));
}
