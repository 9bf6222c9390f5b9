//! End-to-end scenarios exercising the parser, the segment algebra, the
//! range type and the allocator together.

use ip::{
    Address, AddressCount, IPAddressString, InetAtonRadix, Ipv4, Ipv4Options, Ipv6, ParseOptions,
    PrefixBlockAllocator, PrefixConfiguration, SequentialRange,
};

fn v4(s: &str) -> Address<Ipv4> {
    s.parse().unwrap()
}

fn v6(s: &str) -> Address<Ipv6> {
    s.parse().unwrap()
}

#[test]
fn prefixed_address_is_a_block_by_default() {
    let addr = IPAddressString::new("1.2.3.4/16").to_address().unwrap();
    assert_eq!(addr.count(), AddressCount::Count(65536));
    assert!(addr.is_prefix_block());
    assert_eq!(addr.to_string(), "1.2.0.0/16");
}

#[test]
fn prefixed_address_is_single_when_explicit() {
    let options = ParseOptions::default()
        .prefix_configuration(Some(PrefixConfiguration::PrefixedSubnetsAreExplicit));
    let addr = IPAddressString::with_options("1.2.3.4/16", options)
        .to_address()
        .unwrap();
    assert_eq!(addr.count(), AddressCount::Count(1));
    assert_eq!(addr.to_string(), "1.2.3.4/16");
}

#[test]
fn zero_host_mode_distinguishes_blocks() {
    let options = ParseOptions::default()
        .prefix_configuration(Some(PrefixConfiguration::ZeroHostsAreSubnets));
    let block = IPAddressString::with_options("1.2.0.0/16", options.clone())
        .to_address()
        .unwrap();
    assert_eq!(block.count(), AddressCount::Count(65536));
    let single = IPAddressString::with_options("1.2.3.4/16", options)
        .to_address()
        .unwrap();
    assert_eq!(single.count(), AddressCount::Count(1));
}

#[test]
fn mapped_and_grouped_notations_agree() {
    let mapped = v6("::ffff:1.2.3.4");
    let grouped = v6("0:0:0:0:0:ffff:102:304");
    assert_eq!(mapped, grouped);
    assert_eq!(mapped.to_canonical_string(), "::ffff:1.2.3.4");
}

#[test]
fn canonical_compression_picks_longest_run() {
    assert_eq!(v6("1:0:0:0:0:0:0:1").to_canonical_string(), "1::1");
    assert_eq!(v6("1::0:0:0:1").to_canonical_string(), "1::1");
}

#[test]
fn extraneous_digits_take_the_low_bits() {
    let options = ParseOptions::default()
        .allow_single_segment(true)
        .allow_ipv6(false)
        .ipv4(Ipv4Options::default().inet_aton_extraneous_digits(true));
    let addr = IPAddressString::with_options("0xBADC0DE7f000001", options)
        .to_address()
        .unwrap();
    assert_eq!(addr.to_string(), "127.0.0.1");
}

#[test]
fn spanning_aligned_interval() {
    let blocks = Address::spanning_prefix_blocks(&v4("1.2.3.4"), &v4("1.2.3.7")).unwrap();
    let strings: Vec<String> = blocks.iter().map(|b| b.to_string()).collect();
    assert_eq!(strings, vec!["1.2.3.4/30"]);
}

#[test]
fn spanning_unaligned_interval() {
    let blocks = Address::spanning_prefix_blocks(&v4("1.2.3.3"), &v4("1.2.3.8")).unwrap();
    let strings: Vec<String> = blocks.iter().map(|b| b.to_string()).collect();
    assert_eq!(strings, vec!["1.2.3.3/32", "1.2.3.4/30", "1.2.3.8/32"]);
}

#[test]
fn allocator_scenario() {
    let mut alloc = PrefixBlockAllocator::<Ipv4>::new();
    alloc.add_available(&v4("192.168.10.0/24")).unwrap();
    alloc.set_reserved(2);
    let blocks = alloc.allocate_sizes(&[50, 30, 20, 2, 2, 2]);
    let strings: Vec<String> = blocks.iter().map(|b| b.block.to_string()).collect();
    assert_eq!(
        strings,
        vec![
            "192.168.10.0/26",
            "192.168.10.64/27",
            "192.168.10.96/27",
            "192.168.10.128/30",
            "192.168.10.132/30",
            "192.168.10.136/30",
        ]
    );
}

#[test]
fn sparse_mask_over_block() {
    let block = IPAddressString::new("1.2.0.0/16").to_address().unwrap();
    let ip::any::Address::Ipv4(block) = block else {
        panic!("expected IPv4");
    };
    let mask = v4("255.255.3.3");
    let masked = block.mask(&mask, false).unwrap();
    assert_eq!(masked.to_normalized_string(), "1.2.0-3.0-3");
    assert_eq!(masked.count(), AddressCount::Count(16));
}

#[test]
fn parsed_sparse_mask_suffix() {
    let handle = IPAddressString::new("1.2.0.0/255.255.3.3");
    assert!(handle.is_valid());
    assert_eq!(handle.prefix_length(), None);
    assert!(handle.has_mask());
    let ip::any::Address::Ipv4(addr) = handle.to_address().unwrap() else {
        panic!("expected IPv4");
    };
    assert_eq!(addr.to_normalized_string(), "1.2.0.0");
}

#[test]
fn range_extension_and_joining() {
    let range = v4("1.2.0.0/15").to_sequential_range();
    assert_eq!(range.lower().to_string(), "1.2.0.0");
    assert_eq!(range.upper().to_string(), "1.3.255.255");

    let extended = range.extend(&v4("1.4.0.0").to_sequential_range());
    assert_eq!(extended.upper().to_string(), "1.4.0.0");

    assert_eq!(range.join(&v4("1.5.0.0").to_sequential_range()), None);
    assert!(range.join(&v4("1.4.0.0").to_sequential_range()).is_some());
}

#[test]
fn merge_blocks_to_minimum_cover() {
    let blocks = [v4("1.2.3.0/25"), v4("1.2.3.128/25"), v4("1.2.4.0/24")];
    let merged = Address::merge_to_prefix_blocks(&blocks).unwrap();
    let strings: Vec<String> = merged.iter().map(|b| b.to_string()).collect();
    assert_eq!(strings, vec!["1.2.3.0/24", "1.2.4.0/24"]);
}

#[test]
fn range_subtraction() {
    let range = SequentialRange::new(&v4("10.0.0.0"), &v4("10.0.0.255"));
    let hole = SequentialRange::new(&v4("10.0.0.64"), &v4("10.0.0.127"));
    let parts = range.subtract(&hole);
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].upper().to_string(), "10.0.0.63");
    assert_eq!(parts[1].lower().to_string(), "10.0.0.128");
}

#[test]
fn reverse_dns_and_literal_forms() {
    assert_eq!(
        v4("1.2.3.4").to_reverse_dns_string().unwrap(),
        "4.3.2.1.in-addr.arpa"
    );
    assert_eq!(
        v6("2001:db8::1").to_unc_string().unwrap(),
        "2001-db8--1.ipv6-literal.net"
    );
    assert_eq!(
        v4("127.0.0.1")
            .to_inet_aton_string(InetAtonRadix::Hex, 2)
            .unwrap(),
        "0x7f.0x1"
    );
}

#[test]
fn zoned_addresses_differ() {
    let plain = v6("fe80::1");
    let zoned = IPAddressString::new("fe80::1%eth0").to_address().unwrap();
    let ip::any::Address::Ipv6(zoned) = zoned else {
        panic!("expected IPv6");
    };
    assert_ne!(plain, zoned);
    assert_eq!(zoned.to_canonical_string(), "fe80::1%eth0");
}

#[test]
fn iteration_over_a_small_block() {
    let block = IPAddressString::new("192.0.2.0/30").to_address().unwrap();
    let ip::any::Address::Ipv4(block) = block else {
        panic!("expected IPv4");
    };
    let addrs: Vec<String> = block.iter().map(|a| a.to_string()).collect();
    assert_eq!(addrs, vec!["192.0.2.0", "192.0.2.1", "192.0.2.2", "192.0.2.3"]);
}

#[test]
fn increment_through_a_block() {
    let block = IPAddressString::new("192.0.2.0/30").to_address().unwrap();
    let ip::any::Address::Ipv4(block) = block else {
        panic!("expected IPv4");
    };
    assert_eq!(block.increment(3).unwrap().to_string(), "192.0.2.3");
    assert_eq!(block.increment(4).unwrap().to_string(), "192.0.2.4");
}
