//! Integration tests for tracing and event monitoring.
//!
//! The trace callback sees every queue, delivery and install step, which is
//! useful for debugging a viewer that never receives some fragment.

use std::io;
use std::sync::{Arc, Mutex};

use xref_registry::{
    define_registry, ContributionBatch, DeliveryError, Registry, RegistryConfig, RegistryEvent,
};

fn batch(subjects: &[&str]) -> ContributionBatch<u32> {
    subjects.iter().map(|s| (*s, vec![1])).collect()
}

fn ok_consumer(_batch: ContributionBatch<u32>) -> Result<(), DeliveryError> {
    Ok(())
}

#[test]
fn test_basic_tracing() {
    define_registry!(traced1, u32);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    traced1::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.clone());
    });

    traced1::submit(batch(&["lib1", "lib2"])).unwrap();
    traced1::install(ok_consumer).unwrap();
    traced1::submit(batch(&["lib3"])).unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        [
            RegistryEvent::Queued {
                subjects: 2,
                pending: 1
            },
            RegistryEvent::Delivered {
                subjects: 2,
                from_queue: true
            },
            RegistryEvent::Installed {
                drained: 1,
                replaced: false
            },
            RegistryEvent::Delivered {
                subjects: 1,
                from_queue: false
            },
        ]
    );
}

#[test]
fn test_trace_queue_growth() {
    define_registry!(traced2, u32);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    traced2::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    traced2::submit(batch(&["a"])).unwrap();
    traced2::submit(batch(&["b"])).unwrap();
    traced2::submit(batch(&[])).unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        [
            "queued { subjects: 1, pending: 1 }",
            "queued { subjects: 1, pending: 2 }",
            "queued { subjects: 0, pending: 3 }",
        ]
    );

    traced2::clear_trace_callback();
}

#[test]
fn test_trace_replacement_and_rejection() {
    define_registry!(replacing, u32);
    define_registry!(
        rejecting,
        u32,
        xref_registry::RegistryConfig::default()
            .reinstall(xref_registry::ReinstallPolicy::Reject)
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let replace_events = events.clone();
    let reject_events = events.clone();
    replacing::set_trace_callback(move |event| {
        replace_events.lock().unwrap().push(format!("replacing: {event}"));
    });
    rejecting::set_trace_callback(move |event| {
        reject_events.lock().unwrap().push(format!("rejecting: {event}"));
    });

    replacing::install(ok_consumer).unwrap();
    replacing::install(ok_consumer).unwrap();
    rejecting::install(ok_consumer).unwrap();
    assert!(rejecting::install(ok_consumer).is_err());

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        [
            "replacing: installed { drained: 0, replaced: false }",
            "replacing: installed { drained: 0, replaced: true }",
            "rejecting: installed { drained: 0, replaced: false }",
            "rejecting: install rejected",
        ]
    );
}

#[test]
fn test_clear_trace_callback() {
    define_registry!(traced5, u32);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    traced5::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    traced5::submit(batch(&["a"])).unwrap();
    traced5::clear_trace_callback();
    traced5::submit(batch(&["b"])).unwrap();
    traced5::install(ok_consumer).unwrap();

    assert_eq!(events.lock().unwrap().len(), 1);
}

#[test]
fn test_trace_callback_with_custom_logic() {
    define_registry!(traced6, u32);

    let queued = Arc::new(Mutex::new(0));
    let delivered = Arc::new(Mutex::new(0));
    let queued_clone = queued.clone();
    let delivered_clone = delivered.clone();

    traced6::set_trace_callback(move |event| match event {
        RegistryEvent::Queued { .. } => *queued_clone.lock().unwrap() += 1,
        RegistryEvent::Delivered { .. } => *delivered_clone.lock().unwrap() += 1,
        _ => {}
    });

    traced6::submit(batch(&["a"])).unwrap();
    traced6::submit(batch(&["b"])).unwrap();
    traced6::install(ok_consumer).unwrap();
    traced6::submit(batch(&["c"])).unwrap();

    assert_eq!(*queued.lock().unwrap(), 2);
    assert_eq!(*delivered.lock().unwrap(), 3);
}

#[test]
fn test_failed_delivery_is_still_traced() {
    define_registry!(traced7, u32);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    traced7::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.clone());
    });

    traced7::submit(batch(&["a"])).unwrap();
    traced7::submit(batch(&["b"])).unwrap();
    let result = traced7::install(|_b: ContributionBatch<u32>| -> Result<(), DeliveryError> {
        Err("viewer not ready".into())
    });
    assert!(result.is_err());

    let captured = events.lock().unwrap();
    assert_eq!(
        captured.last(),
        Some(&RegistryEvent::Delivered {
            subjects: 1,
            from_queue: true
        })
    );
    assert!(!captured
        .iter()
        .any(|e| matches!(e, RegistryEvent::Installed { .. })));
    assert_eq!(traced7::pending_len(), 1);
}

/// Collects formatted `tracing` output so tests can count log lines.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn count(&self, needle: &str) -> usize {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_warnings(f: impl FnOnce()) -> CapturedLogs {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    logs
}

#[test]
fn test_pending_threshold_warns_once() {
    let logs = with_captured_warnings(|| {
        let registry: Registry<u32> =
            Registry::with_config(RegistryConfig::default().pending_warn_threshold(Some(2)));
        for subject in ["a", "b", "c", "d"] {
            registry.submit(batch(&[subject])).unwrap();
        }
        assert_eq!(registry.pending_len(), 4);
    });

    assert_eq!(logs.count("Pending queue reached warning threshold"), 1);
    assert_eq!(logs.count("WARN"), 1);
}

#[test]
fn test_pending_threshold_disabled_never_warns() {
    let logs = with_captured_warnings(|| {
        let registry: Registry<u32> =
            Registry::with_config(RegistryConfig::default().pending_warn_threshold(None));
        for _ in 0..8 {
            registry.submit(batch(&["a"])).unwrap();
        }
    });

    assert_eq!(logs.count("WARN"), 0);
}

#[test]
fn test_delivery_failures_are_logged() {
    let logs = with_captured_warnings(|| {
        let registry: Registry<u32> = Registry::new();
        registry.submit(batch(&["a"])).unwrap();
        registry
            .install(|_b: ContributionBatch<u32>| -> Result<(), DeliveryError> {
                Err("viewer not ready".into())
            })
            .unwrap_err();

        registry
            .install(|b: ContributionBatch<u32>| -> Result<(), DeliveryError> {
                if b.is_empty() {
                    Err("empty batch".into())
                } else {
                    Ok(())
                }
            })
            .unwrap();
        registry.submit(batch(&[])).unwrap_err();
        registry.submit(batch(&["b"])).unwrap();
    });

    assert_eq!(logs.count("Consumer failed while draining"), 1);
    assert_eq!(logs.count("Consumer rejected batch"), 1);
    assert_eq!(logs.count("empty batch"), 1);
}
