use core::str::FromStr;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use ip::{Address, IPAddressString, Ipv6};

pub fn addr_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ipv6-address");
    [
        "2001:db8::1",
        "::ffff:172.16.0.255",
        "fe80::dead:beef",
        "2606:4700:4700::1111",
    ]
    .iter()
    .for_each(|addr| {
        group.bench_with_input(BenchmarkId::new("stdlib", addr), addr, |b, addr| {
            b.iter(|| std::net::Ipv6Addr::from_str(addr))
        });
        group.bench_with_input(BenchmarkId::new("crate", addr), addr, |b, addr| {
            b.iter(|| Address::<Ipv6>::from_str(addr))
        });
    });
    group.finish();
}

pub fn block_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ipv6-block");
    [
        "2001:db8::/32",
        "fe80::1%eth0",
        "::ffff:1.2.3.4/112",
        "2001:db8:a-f::/48",
    ]
    .iter()
    .for_each(|block| {
        group.bench_with_input(BenchmarkId::new("crate", block), block, |b, block| {
            b.iter(|| IPAddressString::new(*block).to_address())
        });
    });
    group.finish();
}

criterion_group!(benches, addr_benchmark, block_benchmark,);
criterion_main!(benches);
