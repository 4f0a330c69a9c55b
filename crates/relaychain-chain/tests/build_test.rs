//! Chain construction from configuration.
#![allow(clippy::tests_outside_test_module)]

mod common;

use std::sync::Arc;

use common::{Journal, config, registry};
use relaychain_bypass::Bypass;
use relaychain_chain::{Chain, ChainBuilder, ChainError, ChainSet};
use relaychain_config::Config;
use relaychain_registry::Registry;
use relaychain_selector::{Selectable, StrategyKind};
use relaychain_transport::{SockOpts, TransportError};

fn build(cfg: &Config, name: &str) -> Result<Option<Chain>, ChainError> {
    let registry = registry(cfg, &Journal::default());
    ChainBuilder::new(&registry).build(cfg.chain(name))
}

fn node_names(chain: &Chain) -> Vec<Vec<&str>> {
    chain
        .groups()
        .iter()
        .map(|g| g.nodes().iter().map(|n| n.name()).collect())
        .collect()
}

#[test]
fn absent_config_yields_none() {
    let cfg = Config::default();
    assert!(build(&cfg, "missing").unwrap().is_none());
}

#[test]
fn hops_and_nodes_keep_order() {
    let cfg = config(
        r#"
chains:
  - name: c
    metadata: { owner: ops }
    hops:
      - name: hop-0
        nodes:
          - { name: a, addr: "10.0.0.1:1080", connector: { type: mock }, dialer: { type: mock } }
          - { name: b, addr: "10.0.0.2:1080", connector: { type: socks5 }, dialer: { type: tcp } }
          - { name: c, addr: "10.0.0.3:8080" }
      - name: hop-1
        nodes:
          - { name: d, addr: "proxy.example.com:443", dialer: { type: tls } }
"#,
    );
    let chain = build(&cfg, "c").unwrap().unwrap();

    assert_eq!(chain.name(), "c");
    assert_eq!(chain.metadata().get_string("owner").unwrap().as_deref(), Some("ops"));
    assert_eq!(chain.groups().len(), 2);
    assert_eq!(chain.groups()[1].name(), "hop-1");
    assert_eq!(node_names(&chain), vec![vec!["a", "b", "c"], vec!["d"]]);
    assert_eq!(chain.groups()[0].nodes()[2].addr(), "10.0.0.3:8080");
}

#[test]
fn hop_without_nodes_is_kept() {
    let cfg = config("chains: [{ name: c, hops: [{ name: empty }] }]");
    let chain = build(&cfg, "c").unwrap().unwrap();
    assert_eq!(chain.groups().len(), 1);
    assert!(chain.groups()[0].nodes().is_empty());
}

#[test]
fn node_settings_inherit_from_hop() {
    let cfg = config(
        r#"
hosts:
  - { name: static, mappings: [{ hostname: relay.internal, ip: 10.1.0.1 }] }
chains:
  - name: c
    hops:
      - name: hop-0
        hosts: static
        resolver: not-registered
        interface: eth0
        sockopts: { mark: 100 }
        nodes:
          - { name: inherits, addr: "relay.internal:1080", connector: { type: mock }, dialer: { type: mock } }
          - name: overrides
            addr: "10.0.0.2:1080"
            connector: { type: mock }
            dialer: { type: mock }
            hosts: ""
            interface: wg0
            sockopts: { mark: 0 }
"#,
    );
    let chain = build(&cfg, "c").unwrap().unwrap();
    let nodes = chain.groups()[0].nodes();

    let inherits = &nodes[0];
    assert_eq!(inherits.transport().interface(), Some("eth0"));
    assert_eq!(inherits.transport().sockopts(), Some(SockOpts { mark: 100 }));
    assert!(inherits.hosts().is_some());
    assert!(inherits.resolver().is_none());

    let overrides = &nodes[1];
    assert_eq!(overrides.transport().interface(), Some("wg0"));
    assert_eq!(overrides.transport().sockopts(), Some(SockOpts { mark: 0 }));
    // An empty name counts as unset, so the hop's table is still used.
    assert!(overrides.hosts().is_some());
}

#[test]
fn no_sockopts_anywhere_stays_absent() {
    let cfg = config(
        "chains: [{ name: c, hops: [{ name: h, nodes: [{ name: n, addr: '1.2.3.4:80' }] }] }]",
    );
    let chain = build(&cfg, "c").unwrap().unwrap();
    let transport = chain.groups()[0].nodes()[0].transport();
    assert_eq!(transport.sockopts(), None);
    assert_eq!(transport.interface(), None);
}

#[test]
fn selector_precedence() {
    let cfg = config(
        r#"
chains:
  - name: with-chain-selector
    selector: { strategy: random, max_fails: 5 }
    hops:
      - { name: own, selector: { strategy: fifo } }
      - { name: unset }
      - { name: blank, selector: { strategy: "" } }
  - name: without
    hops:
      - { name: unset }
"#,
    );

    let chain = build(&cfg, "with-chain-selector").unwrap().unwrap();
    let groups = chain.groups();
    assert_eq!(groups[0].selector().kind(), StrategyKind::Fifo);
    assert_eq!(groups[1].selector().kind(), StrategyKind::Random);
    assert_eq!(groups[1].selector().max_fails(), 5);
    assert_eq!(groups[2].selector().kind(), StrategyKind::Random);
    assert!(Arc::ptr_eq(groups[1].selector(), groups[2].selector()));

    let chain = build(&cfg, "without").unwrap().unwrap();
    assert_eq!(chain.groups()[0].selector().kind(), StrategyKind::RoundRobin);
}

#[test]
fn bypass_union_at_hop_and_node_level() {
    let cfg = config(
        r#"
bypasses:
  - { name: a, matchers: ["10.0.0.0/8"] }
  - { name: b, matchers: ["192.168.0.0/16"] }
chains:
  - name: c
    hops:
      - name: h
        bypass: a
        bypasses: [b, unknown]
        nodes:
          - { name: n, addr: "1.2.3.4:80", bypasses: [b] }
"#,
    );
    let chain = build(&cfg, "c").unwrap().unwrap();
    let group = &chain.groups()[0];

    assert_eq!(group.bypass().len(), 2);
    assert!(group.bypass().contains("10.1.2.3:80"));
    assert!(group.bypass().contains("192.168.1.1:443"));
    assert!(!group.bypass().contains("8.8.8.8:53"));

    // Node level only sees its own references.
    let node = &group.nodes()[0];
    assert!(node.bypass().contains("192.168.1.1:443"));
    assert!(!node.bypass().contains("10.1.2.3:80"));
}

#[test]
fn unknown_component_types_fail_fast() {
    let cfg = config(
        r#"
chains:
  - name: bad-connector
    hops: [{ name: h, nodes: [{ name: n, addr: "1.2.3.4:80", connector: { type: quic } }] }]
  - name: bad-dialer
    hops: [{ name: h, nodes: [{ name: n, addr: "1.2.3.4:80", dialer: { type: kcp } }] }]
"#,
    );

    let err = build(&cfg, "bad-connector").err().unwrap();
    assert!(matches!(err, ChainError::UnknownConnector(ref t) if t == "quic"));

    let err = build(&cfg, "bad-dialer").err().unwrap();
    assert!(matches!(err, ChainError::UnknownDialer(ref t) if t == "kcp"));
}

#[test]
fn init_failures_name_the_component() {
    let cfg = config(
        r#"
chains:
  - name: connector
    hops:
      - name: h
        nodes: [{ name: n, addr: "1.2.3.4:80", connector: { type: http, metadata: { header: 5 } } }]
  - name: dialer
    hops:
      - name: h
        nodes: [{ name: n, addr: "1.2.3.4:80", connector: { type: mock }, dialer: { type: mock, metadata: { fail: true } } }]
"#,
    );

    let err = build(&cfg, "connector").err().unwrap();
    assert!(matches!(
        err,
        ChainError::ConnectorInit { ref connector, source: TransportError::Metadata(_) } if connector == "http"
    ));

    let err = build(&cfg, "dialer").err().unwrap();
    assert!(matches!(err, ChainError::DialerInit { ref dialer, .. } if dialer == "mock"));
}

#[test]
fn tls_failures_abort_the_build() {
    let cfg = config(
        r#"
chains:
  - name: c
    hops:
      - name: h
        nodes:
          - name: n
            addr: "1.2.3.4:443"
            dialer: { type: tls, tls: { cert_file: /nonexistent/cert.pem, key_file: /nonexistent/key.pem } }
"#,
    );
    assert!(matches!(build(&cfg, "c").err().unwrap(), ChainError::Tls(_)));

    let cfg = config(
        r#"
chains:
  - name: c
    hops:
      - name: h
        nodes:
          - { name: n, addr: "1.2.3.4:443", connector: { tls: { cert_file: only-cert.pem } } }
"#,
    );
    assert!(matches!(build(&cfg, "c").err().unwrap(), ChainError::Tls(_)));

    // Verification off does not excuse an unreadable CA file.
    let cfg = config(
        r#"
chains:
  - name: c
    hops:
      - name: h
        nodes:
          - { name: n, addr: "1.2.3.4:443", dialer: { type: tls, tls: { ca_file: /nonexistent/ca.pem, secure: false } } }
"#,
    );
    assert!(matches!(build(&cfg, "c").err().unwrap(), ChainError::Tls(_)));
}

#[test]
fn backup_flag_from_metadata() {
    let cfg = config(
        r#"
chains:
  - name: ok
    hops:
      - name: h
        nodes:
          - { name: primary, addr: "10.0.0.1:80" }
          - { name: standby, addr: "10.0.0.2:80", metadata: { backup: true } }
  - name: bad
    hops:
      - name: h
        nodes: [{ name: n, addr: "10.0.0.1:80", metadata: { backup: maybe } }]
"#,
    );

    let chain = build(&cfg, "ok").unwrap().unwrap();
    let nodes = chain.groups()[0].nodes();
    assert!(!nodes[0].is_backup());
    assert!(nodes[1].is_backup());

    let err = build(&cfg, "bad").err().unwrap();
    assert!(matches!(err, ChainError::Metadata { ref node, .. } if node == "n"));
}

#[test]
fn building_twice_yields_independent_chains() {
    let cfg = config(
        r#"
chains:
  - name: c
    hops:
      - { name: h0, nodes: [{ name: a, addr: "10.0.0.1:80" }, { name: b, addr: "10.0.0.2:80" }] }
      - { name: h1, nodes: [{ name: c, addr: "10.0.0.3:80" }] }
"#,
    );
    let registry = registry(&cfg, &Journal::default());
    let builder = ChainBuilder::new(&registry);
    let first = builder.build(cfg.chain("c")).unwrap().unwrap();
    let second = builder.build(cfg.chain("c")).unwrap().unwrap();

    assert_eq!(node_names(&first), node_names(&second));
    assert!(!Arc::ptr_eq(&first.groups()[0].nodes()[0], &second.groups()[0].nodes()[0]));
    assert!(!Arc::ptr_eq(first.groups()[0].selector(), second.groups()[0].selector()));

    first.groups()[0].nodes()[0].marker().mark();
    assert_eq!(first.groups()[0].nodes()[0].marker().fail_count(), 1);
    assert_eq!(second.groups()[0].nodes()[0].marker().fail_count(), 0);
}

#[test]
fn chain_set_reload_is_all_or_nothing() {
    let good = config(
        r#"
chains:
  - { name: alpha, hops: [{ name: h, nodes: [{ name: a, addr: "10.0.0.1:80" }] }] }
  - { name: beta, hops: [] }
"#,
    );
    let registry = registry(&good, &Journal::default());
    let set = ChainSet::build(&registry, &good.chains).unwrap();
    assert_eq!(set.names(), vec!["alpha", "beta"]);
    let alpha = set.get("alpha").unwrap();

    let broken = config(
        r#"
chains:
  - { name: gamma, hops: [] }
  - { name: delta, hops: [{ name: h, nodes: [{ name: n, addr: "1.2.3.4:80", connector: { type: quic } }] }] }
"#,
    );
    assert!(set.reload(&registry, &broken.chains).is_err());
    assert_eq!(set.len(), 2);
    assert!(Arc::ptr_eq(&set.get("alpha").unwrap(), &alpha));
    assert!(set.get("gamma").is_none());

    let next = config("chains: [{ name: gamma, hops: [] }]");
    set.reload(&registry, &next.chains).unwrap();
    assert_eq!(set.names(), vec!["gamma"]);
    // Readers holding the old chain keep it.
    assert_eq!(alpha.name(), "alpha");
}

#[test]
fn chain_set_rejects_duplicate_names() {
    let cfg = config("chains: [{ name: x, hops: [] }, { name: x, hops: [] }]");
    let registry = registry(&cfg, &Journal::default());
    assert!(matches!(
        ChainSet::build(&registry, &cfg.chains).err().unwrap(),
        ChainError::DuplicateChain(ref name) if name == "x"
    ));
}

#[test]
fn chains_and_registry_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Chain>();
    assert_send_sync::<ChainSet>();
    assert_send_sync::<Registry>();
}

#[test]
fn concurrent_builds_share_one_registry() {
    let cfg = config(
        r#"
bypasses:
  - { name: lan, matchers: ["10.0.0.0/8"] }
chains:
  - name: c
    hops:
      - { name: h0, bypass: lan, nodes: [{ name: a, addr: "10.0.0.1:80" }, { name: b, addr: "10.0.0.2:80", connector: { type: mock } }] }
      - { name: h1, nodes: [{ name: c, addr: "10.0.0.3:80", dialer: { type: mock } }] }
"#,
    );
    let registry = Arc::new(registry(&cfg, &Journal::default()));

    let results: Vec<Vec<Vec<String>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let cfg = &cfg;
                scope.spawn(move || {
                    let chain = ChainBuilder::new(&registry)
                        .build(cfg.chain("c"))
                        .unwrap()
                        .unwrap();
                    node_names(&chain)
                        .into_iter()
                        .map(|hop| hop.into_iter().map(str::to_string).collect())
                        .collect()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let expected = vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]];
    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|names| *names == expected));
}
