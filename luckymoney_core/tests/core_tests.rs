use std::collections::HashMap;

use luckymoney_core::{
    resolve, weighted_pick, Denomination, GameStore, HmacRandom, Inventory, MemoryStorage,
    RandomSource, RiggingConfig, Scenario, StoreConfig,
};
use rand::{rngs::StdRng, SeedableRng};

fn store(seed: u64) -> GameStore<MemoryStorage, StdRng> {
    GameStore::open(
        MemoryStorage::new(),
        StdRng::seed_from_u64(seed),
        StoreConfig::default(),
    )
}

fn frequencies<R: RandomSource>(inv: &Inventory, rng: &mut R, n: usize) -> HashMap<u64, usize> {
    let available = inv.available();
    let mut counts = HashMap::new();
    for _ in 0..n {
        let v = weighted_pick(&available, rng).unwrap();
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

#[test]
fn weighted_pick_converges_to_stock_share() {
    let inv = Inventory::tet_default();
    let total = inv.total_stock() as f64;
    let n = 200_000;
    let counts = frequencies(&inv, &mut StdRng::seed_from_u64(2024), n);
    for d in inv.denominations() {
        let expected = f64::from(d.quantity) / total;
        let observed = *counts.get(&d.value).unwrap_or(&0) as f64 / n as f64;
        assert!(
            (observed - expected).abs() < 0.01,
            "{}: observed {observed}, expected {expected}",
            d.value
        );
    }
}

#[test]
fn hmac_stream_also_converges() {
    let inv = Inventory::new(vec![Denomination::new(1, 1), Denomination::new(2, 3)]).unwrap();
    let n = 40_000;
    let counts = frequencies(&inv, &mut HmacRandom::new("server", "client", 0), n);
    let share = *counts.get(&2).unwrap_or(&0) as f64 / n as f64;
    assert!((share - 0.75).abs() < 0.02, "share {share}");
}

#[test]
fn zero_stock_never_picked() {
    let mut inv = Inventory::tet_default();
    inv.adjust(10_000, -20).unwrap();
    inv.adjust(200_000, -5).unwrap();
    let counts = frequencies(&inv, &mut StdRng::seed_from_u64(3), 20_000);
    assert!(!counts.contains_key(&10_000));
    assert!(!counts.contains_key(&200_000));
}

#[test]
fn spin_decrements_exactly_the_real_value() {
    let mut s = store(11);
    for i in 0..60 {
        let before = s.inventory().clone();
        let out = s.spin(&format!("player{i}"));
        assert!(!out.is_empty());
        for (b, a) in before.denominations().iter().zip(s.inventory().denominations()) {
            if b.value == out.real {
                assert_eq!(a.quantity + 1, b.quantity);
            } else {
                assert_eq!(a.quantity, b.quantity);
            }
        }
    }
    // 60 units of stock, all paid out.
    assert_eq!(s.inventory().total_stock(), 0);
    assert!(s.spin("late").is_empty());
}

#[test]
fn rigging_resets_after_non_empty_spin() {
    let rigs = [
        RiggingConfig::Random,
        RiggingConfig::ForceValue { target: 100_000 },
        RiggingConfig::ForceValue { target: 3 },
        RiggingConfig::TrollFakeThenReal {
            displayed: 500_000,
            real: 10_000,
        },
    ];
    let mut s = store(5);
    for rig in rigs {
        s.set_rigging(rig);
        s.spin("x");
        assert_eq!(s.rigging(), RiggingConfig::Random);
    }
}

#[test]
fn empty_resolve_leaves_inventory_unchanged() {
    let inv = Inventory::new(vec![Denomination::new(10, 0), Denomination::new(20, 0)]).unwrap();
    let before = inv.clone();
    let out = resolve(&inv, &RiggingConfig::Random, &mut StdRng::seed_from_u64(0));
    assert_eq!((out.displayed, out.real, out.scenario), (0, 0, Scenario::Empty));
    assert_eq!(inv, before);
}

#[test]
fn exhausted_force_matches_random_distribution() {
    let mut inv = Inventory::tet_default();
    inv.adjust(500_000, -2).unwrap();
    let forced = RiggingConfig::ForceValue { target: 500_000 };
    let mut a = StdRng::seed_from_u64(99);
    let mut b = StdRng::seed_from_u64(99);
    for _ in 0..1_000 {
        assert_eq!(
            resolve(&inv, &forced, &mut a),
            resolve(&inv, &RiggingConfig::Random, &mut b)
        );
    }
}

#[test]
fn troll_spin_pays_real_and_spares_fake() {
    let mut s = store(1);
    s.set_rigging(RiggingConfig::TrollFakeThenReal {
        displayed: 500_000,
        real: 20_000,
    });
    let out = s.spin("Tuan");
    assert_eq!(out.displayed, 500_000);
    assert_eq!(out.real, 20_000);
    assert_eq!(out.scenario, Scenario::TrollFakeToReal);
    assert_eq!(s.inventory().get(20_000).map(|d| d.quantity), Some(14));
    assert_eq!(s.inventory().get(500_000).map(|d| d.quantity), Some(2));
    let entry = s.history().most_recent().unwrap();
    assert_eq!(entry.displayed_value, 500_000);
    assert_eq!(entry.real_value, 20_000);
}

#[test]
fn reset_ignores_prior_mutations() {
    let mut s = store(4);
    for _ in 0..10 {
        s.spin("a");
    }
    s.adjust_quantity(50_000, 99);
    s.adjust_quantity(100_000, -99);
    s.reset_inventory();
    assert_eq!(s.inventory(), &Inventory::tet_default());
}

#[test]
fn history_is_newest_first() {
    let mut s = store(8);
    let n = 25;
    for i in 0..n {
        s.spin(&format!("p{i}"));
    }
    assert_eq!(s.history().len(), n);
    assert_eq!(
        s.history().most_recent().map(|e| e.user_name.as_str()),
        Some("p24")
    );
    let stamps: Vec<_> = s.history().iter().map(|e| e.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn login_only_accepts_default_pin() {
    let mut s = store(0);
    assert!(!s.login("4321"));
    assert!(!s.is_admin());
    assert!(s.login("1234"));
    assert!(s.is_admin());
}
