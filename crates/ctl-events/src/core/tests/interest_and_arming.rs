use std::sync::atomic::Ordering;

use gossamer_ctl_proto::{EventCode, EventMask};

use super::helpers::{FakeClient, harness};

#[test]
fn is_interesting_reflects_union_of_open_clients() {
	let h = harness();
	let mut warn_only = EventMask::EMPTY;
	warn_only.insert(EventCode::Warn);
	let client = FakeClient::new(warn_only);
	h.connections.add(client);
	h.core.registry.recompute_global_mask();

	assert!(h.core.registry.is_interesting(EventCode::Warn));
	assert!(!h.core.registry.is_interesting(EventCode::OrConn));
}

#[test]
fn set_client_mask_recomputes_the_global_mask() {
	let h = harness();
	let client = FakeClient::new(EventMask::EMPTY);
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();
	assert!(!h.core.registry.is_interesting(EventCode::OrConn));

	let mut new_mask = EventMask::EMPTY;
	new_mask.insert(EventCode::OrConn);
	h.core.registry.set_client_mask(client.as_ref(), new_mask);

	assert!(h.core.registry.is_interesting(EventCode::OrConn));
}

#[test]
fn arming_effect_fires_only_on_first_subscription() {
	let h = harness();
	let client = FakeClient::new(EventMask::EMPTY);
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();
	assert_eq!(h.arming.stream_bw.load(Ordering::SeqCst), 0);

	let mut mask = EventMask::EMPTY;
	mask.insert(EventCode::StreamBw);
	client.set_mask(mask);
	h.core.registry.recompute_global_mask();
	assert_eq!(h.arming.stream_bw.load(Ordering::SeqCst), 1);

	// Recomputing again with the same mask must not re-arm.
	h.core.registry.recompute_global_mask();
	assert_eq!(h.arming.stream_bw.load(Ordering::SeqCst), 1);
}

#[test]
fn scheduler_rescans_when_any_per_second_event_toggles() {
	let h = harness();
	let client = FakeClient::new(EventMask::EMPTY);
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();
	let before = h.scheduler.rescans.load(Ordering::SeqCst);

	let mut mask = EventMask::EMPTY;
	mask.insert(EventCode::CellStats);
	client.set_mask(mask);
	h.core.registry.recompute_global_mask();

	assert_eq!(h.scheduler.rescans.load(Ordering::SeqCst), before + 1);
	assert!(h.core.registry.any_per_second_enabled());

	client.set_mask(EventMask::EMPTY);
	h.core.registry.recompute_global_mask();
	assert_eq!(h.scheduler.rescans.load(Ordering::SeqCst), before + 2);
	assert!(!h.core.registry.any_per_second_enabled());
}

#[test]
fn closing_clients_do_not_contribute_to_global_mask() {
	let h = harness();
	let mut mask = EventMask::EMPTY;
	mask.insert(EventCode::OrConn);
	let client = FakeClient::new(mask);
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();
	assert!(h.core.registry.is_interesting(EventCode::OrConn));

	client.mark_for_close();
	h.core.registry.recompute_global_mask();
	assert!(!h.core.registry.is_interesting(EventCode::OrConn));
}
