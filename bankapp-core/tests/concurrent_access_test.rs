//! Concurrent session access tests
//!
//! The session is shared behind one mutex. These tests hammer it from
//! several threads and check that the attempt counter is never
//! under-counted and never runs past the limit.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;
use uuid::Uuid;

use bankapp_core::adapters::biometric::ScriptedBiometric;
use bankapp_core::adapters::json_store::JsonCredentialStore;
use bankapp_core::adapters::memory::InMemoryCredentialStore;
use bankapp_core::domain::{AuthState, PinDigest, UserCredential};
use bankapp_core::ports::CredentialStore;
use bankapp_core::services::AuthService;
use bankapp_core::Error;

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 8;

/// Number of PIN submissions per thread
const ITERATIONS_PER_THREAD: usize = 5;

fn plain_user(pin: &str) -> UserCredential {
    UserCredential::new(Uuid::new_v4(), "Stress", PinDigest::Plain(pin.to_string()))
}

/// Many threads submitting wrong PINs at once.
///
/// Exactly `max_attempts` submissions may be counted; the one that reaches
/// the limit reports the lockout, and everything after it is refused as
/// locked out without touching the counter.
#[test]
fn test_concurrent_wrong_pins_lock_exactly_once() {
    let user = plain_user("1234");
    let user_id = user.user_id;
    let store = Arc::new(InMemoryCredentialStore::with_credentials(vec![user]));
    let service = Arc::new(AuthService::new(store, ScriptedBiometric::unavailable(), 3));
    service.begin_pin_entry().unwrap();

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let invalid_count = Arc::new(AtomicUsize::new(0));
    let lockout_reports = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];

    for _ in 0..THREAD_COUNT {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        let invalid_count = Arc::clone(&invalid_count);
        let lockout_reports = Arc::clone(&lockout_reports);

        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..ITERATIONS_PER_THREAD {
                match service.submit_pin(user_id, "0000") {
                    Err(Error::InvalidPin { .. }) => {
                        invalid_count.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(Error::TooManyAttempts { attempts }) => {
                        assert_eq!(attempts, 3);
                        lockout_reports.fetch_add(1, Ordering::SeqCst);
                    }
                    other => panic!("unexpected result {:?}", other),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let session = service.session().unwrap();
    println!(
        "invalid: {}, lockout reports: {}",
        invalid_count.load(Ordering::SeqCst),
        lockout_reports.load(Ordering::SeqCst)
    );

    assert_eq!(session.state, AuthState::LockedOut);
    assert_eq!(session.pin_attempt_count, 3);
    assert_eq!(invalid_count.load(Ordering::SeqCst), 2);
    assert_eq!(
        lockout_reports.load(Ordering::SeqCst),
        THREAD_COUNT * ITERATIONS_PER_THREAD - 2
    );
}

/// One thread has the right PIN while the others guess.
///
/// Whatever the interleaving, the session ends either authenticated with a
/// zero count or locked out with the count at the limit.
#[test]
fn test_concurrent_mixed_pins_end_in_consistent_state() {
    let user = plain_user("1234");
    let user_id = user.user_id;
    let store = Arc::new(InMemoryCredentialStore::with_credentials(vec![user]));
    let service = Arc::new(AuthService::new(store, ScriptedBiometric::unavailable(), 3));
    service.begin_pin_entry().unwrap();

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let mut handles = vec![];

    for thread_id in 0..THREAD_COUNT {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            let pin = if thread_id == 0 { "1234" } else { "0000" };
            barrier.wait();
            let _ = service.submit_pin(user_id, pin);
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let session = service.session().unwrap();
    match session.state {
        AuthState::Authenticated => {
            assert_eq!(session.pin_attempt_count, 0);
            assert_eq!(session.active_user_id, Some(user_id));
        }
        AuthState::LockedOut => {
            assert_eq!(session.pin_attempt_count, 3);
            assert!(session.active_user_id.is_none());
        }
        other => panic!("unexpected final state {}", other),
    }

    let stored = service.store().fetch_credential(user_id).unwrap().unwrap();
    assert_eq!(stored.is_authenticated, session.state == AuthState::Authenticated);
}

/// Many threads registering users through one file-backed store.
///
/// Read-modify-write cycles are serialized, so no registration is lost.
#[test]
fn test_concurrent_registrations_through_shared_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(JsonCredentialStore::new(temp_dir.path()));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let mut handles = vec![];
    for _ in 0..THREAD_COUNT {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            store.save_credential(&plain_user("1234")).unwrap();
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let reopened = JsonCredentialStore::new(temp_dir.path());
    assert_eq!(reopened.list_credentials().unwrap().len(), THREAD_COUNT);
}
