//! Tests for configuration parsing and validation

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use coop_capacity::config::{CapacityPolicy, ConfigSource, EngineConfig};
use coop_capacity::core::{CapacityEngine, CapacityError, CapacityResult, DecisionCache};
use coop_capacity::infra::InMemorySnapshot;
use parking_lot::Mutex;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_defaults_without_variables() {
    let cfg = EngineConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, EngineConfig::default());
    assert_eq!(cfg.policy_for(&"veg".into()), CapacityPolicy::Share);
    assert!(!cfg.auto_renewal);
}

#[test]
fn test_full_environment() {
    let cfg = EngineConfig::from_lookup(lookup(&[
        ("COOP_CAPACITY_POLICY", "basket"),
        ("COOP_CAPACITY_POLICY_OVERRIDES", "eggs=share, honey = shares"),
        ("COOP_AUTO_RENEWAL", "yes"),
        ("COOP_BASKET_SIZES", "small, large,"),
    ]))
    .unwrap();
    assert_eq!(cfg.default_policy, CapacityPolicy::Basket);
    assert_eq!(cfg.policy_for(&"eggs".into()), CapacityPolicy::Share);
    assert_eq!(cfg.policy_for(&"honey".into()), CapacityPolicy::Share);
    assert_eq!(cfg.policy_for(&"veg".into()), CapacityPolicy::Basket);
    assert!(cfg.auto_renewal);
    assert_eq!(cfg.basket_sizes.len(), 2);
}

#[test]
fn test_unknown_policy_rejected() {
    assert!(EngineConfig::from_lookup(lookup(&[("COOP_CAPACITY_POLICY", "volume")])).is_err());
}

#[test]
fn test_malformed_override_rejected() {
    let err = EngineConfig::from_lookup(lookup(&[("COOP_CAPACITY_POLICY_OVERRIDES", "eggs")])).unwrap_err();
    assert!(err.contains("type=policy"));
}

#[test]
fn test_bad_flag_rejected() {
    assert!(EngineConfig::from_lookup(lookup(&[("COOP_AUTO_RENEWAL", "sometimes")])).is_err());
}

#[test]
fn test_basket_policy_requires_sizes() {
    let cfg = EngineConfig {
        product_type_policies: [("veg".into(), CapacityPolicy::Basket)].into_iter().collect(),
        ..EngineConfig::default()
    };
    assert!(cfg.uses_baskets());
    assert!(cfg.validate().is_err());
}

#[test]
fn test_duplicate_basket_sizes_rejected() {
    let cfg = EngineConfig {
        basket_sizes: vec!["small".into(), "small".into()],
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_json_config() {
    let cfg = EngineConfig::from_json_str(
        r#"{"default_policy":"basket","basket_sizes":["small"],"auto_renewal":true}"#,
    )
    .unwrap();
    assert_eq!(cfg.default_policy, CapacityPolicy::Basket);
    assert!(cfg.auto_renewal);
    assert!(EngineConfig::from_json_str(r#"{"default_policy":"basket"}"#).is_err());
}

struct CountingSource {
    loads: Arc<AtomicU32>,
}

impl ConfigSource for CountingSource {
    fn load(&self) -> CapacityResult<EngineConfig> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(EngineConfig::default())
    }
}

#[test]
fn test_config_loaded_once_per_decision() {
    let snapshot = InMemorySnapshot::new();
    let loads = Arc::new(AtomicU32::new(0));
    let source = CountingSource {
        loads: Arc::clone(&loads),
    };
    let engine = CapacityEngine::new(&snapshot, &snapshot, source);
    let mut cache = DecisionCache::new();
    engine.config(&mut cache).unwrap();
    engine.config(&mut cache).unwrap();
    engine.config(&mut DecisionCache::new()).unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_invalid_loaded_config_surfaces_as_error() {
    let snapshot = InMemorySnapshot::new();
    let cfg = EngineConfig {
        default_policy: CapacityPolicy::Basket,
        ..EngineConfig::default()
    };
    let engine = CapacityEngine::new(&snapshot, &snapshot, cfg);
    let err = engine.config(&mut DecisionCache::new()).unwrap_err();
    assert!(matches!(err, CapacityError::InvalidConfig(_)));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_missing_variables_warn_and_fall_back() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let cfg = tracing::subscriber::with_default(subscriber, || {
        EngineConfig::from_lookup(lookup(&[("COOP_BASKET_SIZES", "small")])).unwrap()
    });

    assert_eq!(cfg.default_policy, CapacityPolicy::Share);
    assert!(!cfg.auto_renewal);
    let output = String::from_utf8(logs.0.lock().clone()).unwrap();
    assert!(output.contains("WARN"));
    assert!(output.contains("COOP_CAPACITY_POLICY not set"));
    assert!(output.contains("COOP_AUTO_RENEWAL not set"));
}

#[test]
fn test_set_variables_do_not_warn() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        EngineConfig::from_lookup(lookup(&[("COOP_CAPACITY_POLICY", "share"), ("COOP_AUTO_RENEWAL", "no")]))
            .unwrap()
    });
    assert!(logs.0.lock().is_empty());
}
