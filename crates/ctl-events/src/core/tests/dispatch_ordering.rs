use gossamer_ctl_proto::EventCode;

use super::helpers::{FakeClient, harness};

fn mask_with(codes: &[EventCode]) -> gossamer_ctl_proto::EventMask {
	let mut mask = gossamer_ctl_proto::EventMask::EMPTY;
	for &c in codes {
		mask.insert(c);
	}
	mask
}

#[test]
fn flush_delivers_only_to_subscribed_clients_in_enqueue_order() {
	let h = harness();
	let warn_client = FakeClient::new(mask_with(&[EventCode::Warn]));
	let err_client = FakeClient::new(mask_with(&[EventCode::Err]));
	h.connections.add(warn_client.clone());
	h.connections.add(err_client.clone());
	h.core.registry.recompute_global_mask();

	h.core.dispatcher.publish(&h.core.registry, EventCode::Warn, b"first\r\n".to_vec());
	h.core.dispatcher.publish(&h.core.registry, EventCode::Warn, b"second\r\n".to_vec());

	h.core.dispatcher.flush(false);

	assert_eq!(warn_client.outbound_snapshot(), b"first\r\nsecond\r\n");
	assert!(err_client.outbound_snapshot().is_empty());
}

#[test]
fn publish_of_uninteresting_event_is_dropped_before_queuing() {
	let h = harness();
	let client = FakeClient::new(gossamer_ctl_proto::EventMask::EMPTY);
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();

	h.core.dispatcher.publish(&h.core.registry, EventCode::OrConn, b"650 ORCONN ...\r\n".to_vec());
	h.core.dispatcher.flush(true);

	assert!(client.outbound_snapshot().is_empty());
}

#[test]
fn closing_clients_are_skipped_on_flush() {
	let h = harness();
	let client = FakeClient::new(mask_with(&[EventCode::Warn]));
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();

	client.mark_for_close();
	h.core.dispatcher.publish(&h.core.registry, EventCode::Warn, b"x\r\n".to_vec());
	h.core.dispatcher.flush(false);

	assert!(client.outbound_snapshot().is_empty());
}

#[test]
fn force_flush_requests_an_outbound_flush_on_every_delivered_client() {
	let h = harness();
	let client = FakeClient::new(mask_with(&[EventCode::Warn]));
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();

	h.core.dispatcher.publish(&h.core.registry, EventCode::Warn, b"x\r\n".to_vec());
	h.core.dispatcher.flush(true);

	assert_eq!(client.flush_requests.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn shutdown_discards_queue_without_delivering() {
	let h = harness();
	let client = FakeClient::new(mask_with(&[EventCode::Warn]));
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();

	h.core.dispatcher.publish(&h.core.registry, EventCode::Warn, b"x\r\n".to_vec());
	h.core.shutdown();
	h.core.dispatcher.flush(false);

	assert!(client.outbound_snapshot().is_empty());
}

#[test]
fn shutdown_zeros_global_mask() {
	let h = harness();
	let client = FakeClient::new(mask_with(&[EventCode::Warn]));
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();
	assert!(h.core.registry.is_interesting(EventCode::Warn));

	h.core.shutdown();

	assert!(!h.core.registry.is_interesting(EventCode::Warn));
	h.core.dispatcher.publish(&h.core.registry, EventCode::Warn, b"late\r\n".to_vec());
	h.core.dispatcher.flush(false);
	assert!(client.outbound_snapshot().is_empty());
}

#[test]
fn publish_off_mainloop_thread_queues_without_activating() {
	let h = harness();
	h.mainloop.set_on_mainloop(false);
	let client = FakeClient::new(mask_with(&[EventCode::Warn]));
	h.connections.add(client.clone());
	h.core.registry.recompute_global_mask();

	h.core.dispatcher.publish(&h.core.registry, EventCode::Warn, b"x\r\n".to_vec());
	assert_eq!(h.mainloop.activations.load(std::sync::atomic::Ordering::SeqCst), 0);

	h.core.dispatcher.flush(false);
	assert_eq!(client.outbound_snapshot(), b"x\r\n");
}
