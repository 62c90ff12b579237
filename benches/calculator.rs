use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mbay_core::{
    reference, AllocationRequest, ChargeRequest, ExpenseService, RateTable, ReserveFundService,
    ServiceChargeService, UnitRegistry,
};
use mbay_domain::{Area, PropertyType};

fn request() -> ChargeRequest {
    ChargeRequest::new("3", PropertyType::Apartment, Area::sqm(199.0).unwrap(), 2027)
}

fn bench_reserve_quote(c: &mut Criterion) {
    let table = RateTable::rfs_2025();
    let request = request();

    c.bench_function("reserve_fund_quote", |b| {
        b.iter(|| ReserveFundService::quote(black_box(&table), black_box(&request)).unwrap());
    });
}

fn bench_service_charge_quote(c: &mut Criterion) {
    let table = RateTable::rfs_2025();
    let request = request().with_reserve(true);

    c.bench_function("service_charge_quote", |b| {
        b.iter(|| ServiceChargeService::quote(black_box(&table), black_box(&request)).unwrap());
    });
}

fn bench_expense_allocation(c: &mut Criterion) {
    let units = UnitRegistry::builtin();
    let expenses = reference::builtin_expenses(2025);
    let unit = units.require("Z3-044-1").unwrap().clone();
    let request = AllocationRequest::for_unit(&unit, 2025, 3.84);

    c.bench_function("expense_allocation_builtin_portfolio", |b| {
        b.iter(|| {
            ExpenseService::allocate(black_box(&expenses), units.units(), black_box(&request))
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_reserve_quote,
    bench_service_charge_quote,
    bench_expense_allocation
);
criterion_main!(benches);
