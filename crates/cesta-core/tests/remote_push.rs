use cesta_core::{Category, Controller, MemCache, MemRemote, RemoteStore};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

fn pair() -> (Arc<MemRemote>, Controller<MemCache>) {
    let remote = Arc::new(MemRemote::new());
    let shared: Arc<dyn RemoteStore> = remote.clone();
    let mut ctl = Controller::new(shared, MemCache::new());
    ctl.set_user("Daniel", None);
    (remote, ctl)
}

#[test]
fn mutations_reach_the_remote_after_flush() {
    let (remote, mut ctl) = pair();
    let id = ctl.add("Café", Category::Alimentos).unwrap().id.clone();
    ctl.toggle(&id);
    ctl.change_quantity(&id, 1);
    ctl.flush();

    let rows = remote.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].name, "Café");
    assert!(rows[0].completed);
    assert_eq!(rows[0].quantity, 2);
    assert_eq!(rows[0].added_by.as_deref(), Some("Daniel"));
}

#[test]
fn failed_remote_write_keeps_optimistic_state() {
    let (remote, mut ctl) = pair();
    remote.set_fail_writes(true);

    ctl.add("Sabão", Category::Limpeza).expect("added");
    ctl.flush();

    // local list and cache stand; the remote saw nothing and no retry happens
    assert_eq!(ctl.state().items.len(), 1);
    assert!(remote.snapshot().is_empty());

    remote.set_fail_writes(false);
    ctl.flush();
    assert!(remote.snapshot().is_empty(), "pushes are attempted exactly once");
}

#[test]
fn change_notifications_fire_for_every_write_including_own() {
    let (remote, mut ctl) = pair();
    let (tx, rx) = mpsc::channel();
    let sub = remote
        .subscribe(Box::new(move || {
            let _ = tx.send(());
        }))
        .unwrap();

    // own optimistic write still echoes back through the channel
    ctl.add("Pão", Category::Alimentos).expect("added");
    ctl.flush();
    assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());

    // a foreign write (another device) fires as well
    let foreign = remote.snapshot()[0].clone();
    remote.delete(&foreign.id).unwrap();
    assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());

    // after unsubscribe nothing more arrives
    while rx.try_recv().is_ok() {}
    sub.unsubscribe();
    remote
        .insert(&cesta_core::RemoteRecord {
            id: "z".into(),
            name: "Leite".into(),
            completed: false,
            quantity: 1,
            category: "Alimentos".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            added_by: None,
        })
        .unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn full_reload_overwrites_local_state_last_reload_wins() {
    let remote = Arc::new(MemRemote::new());

    let shared_a: Arc<dyn RemoteStore> = remote.clone();
    let mut device_a = Controller::new(shared_a, MemCache::new());
    device_a.set_user("Daniel", None);

    let shared_b: Arc<dyn RemoteStore> = remote.clone();
    let mut device_b = Controller::new(shared_b, MemCache::new());
    device_b.set_user("Kivhia", None);

    let id = device_a.add("Feijão", Category::Alimentos).unwrap().id.clone();
    device_a.flush();

    device_b.load();
    assert_eq!(device_b.state().items.len(), 1);
    assert_eq!(device_b.state().items[0].added_by.as_deref(), Some("Daniel"));

    // deletion on one device disappears from the other at its next reload
    device_a.delete(&id).unwrap();
    device_a.flush();
    device_b.load();
    assert!(device_b.state().items.is_empty());
}
