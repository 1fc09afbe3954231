use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use orderflow_core::{OrderId, ProductId, WarehouseId};
use orderflow_inventory::{StockKey, StockLedger};

/// Reserve/release round-trips against a single hot key.
fn bench_single_key_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_key_reserve_release");
    group.throughput(Throughput::Elements(1));

    group.bench_function("cycle", |b| {
        let ledger = StockLedger::new();
        let key = StockKey::new(ProductId::new(), WarehouseId::new());
        let order_id = OrderId::new();
        let at = Utc::now();
        ledger.stock(key, 1_000_000, at).unwrap();

        b.iter(|| {
            ledger.reserve(black_box(key), 1, order_id, at).unwrap();
            ledger.release(black_box(key), 1, order_id, at);
        });
    });

    group.finish();
}

/// All-or-nothing batch reservations of growing width.
fn bench_batch_reservation(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_reservation");

    for width in [2usize, 8, 32] {
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            let ledger = StockLedger::new();
            let at = Utc::now();
            let lines: Vec<(StockKey, u32)> = (0..width)
                .map(|_| {
                    let key = StockKey::new(ProductId::new(), WarehouseId::new());
                    ledger.stock(key, 1_000_000, at).unwrap();
                    (key, 1)
                })
                .collect();

            b.iter(|| {
                let order_id = OrderId::new();
                ledger.reserve_batch(order_id, black_box(&lines), at).unwrap();
                for (key, quantity) in &lines {
                    ledger.release(*key, *quantity, order_id, at);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_key_cycle, bench_batch_reservation);
criterion_main!(benches);
