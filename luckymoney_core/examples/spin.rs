use luckymoney_core::{GameStore, HmacRandom, MemoryStorage, RiggingConfig, StoreConfig};

fn main() {
    // Example end-to-end session with a reproducible random stream
    let rng = HmacRandom::new("example-server-seed", "example-client-seed", 1);
    println!("server_seed_hash={}", rng.server_seed_hash_hex());
    let mut store = GameStore::open(MemoryStorage::new(), rng, StoreConfig::default());

    let honest = store.spin("Lan");
    println!("honest: {:?}", honest);

    store.set_rigging(RiggingConfig::TrollFakeThenReal {
        displayed: 500_000,
        real: 10_000,
    });
    let troll = store.spin("Minh");
    println!("troll: shown={} paid={}", troll.displayed, troll.real);
    println!("left in machine: {}", store.total_value());
}
