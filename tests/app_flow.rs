//! End-to-end flows through `AppRuntime`: real worker threads, the fake
//! backend, on-disk preferences.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use common::{FakeBackend, message, messages, page, runtime, runtime_with_payments, session, signed_in_store, test_config};
use nightlight::app::{AppMsg, Reaction, Target, ToastLevel};
use nightlight::coordinator::Route;
use nightlight::core::errors::Result;
use nightlight::paging::{FetchState, ItemId, ListKey};
use nightlight::purchase::{PaymentQueue, TransactionState, TransactionUpdate};
use nightlight::store::preferences::{self, Theme};
use nightlight::store::secure::MemorySecureStore;

fn feed_backend() -> Arc<FakeBackend> {
    let backend = FakeBackend::new();
    backend.on_json(
        "GET /messages",
        200,
        &page(messages("m", 0..2), "c1", Some("c2"), 3),
    );
    backend.on_json(
        "GET /messages?start=c2",
        200,
        &page(messages("m", 2..3), "c2", None, 3),
    );
    backend
}

#[test]
fn browse_open_and_appreciate() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    backend.on_json("GET /messages/m0", 200, &message("m0", "ember"));
    let mut appreciated = message("m0", "ember");
    appreciated["isAppreciated"] = json!(true);
    appreciated["appreciationCount"] = json!(1);
    backend.on_json(
        "POST /messages/m0/appreciate",
        200,
        &json!({"message": appreciated, "tokenBalance": 4}),
    );

    let mut rt = runtime(test_config(dir.path(), 2), &backend, signed_in_store("lumen", 5));
    rt.start().unwrap();
    rt.settle();
    assert_eq!(rt.model().current_route(), Some(&Route::Feed));
    assert_eq!(rt.model().item_count(ListKey::Feed), 2);

    rt.dispatch(AppMsg::Scrolled {
        list: ListKey::Feed,
        visible_index: 1,
    });
    rt.settle();
    assert_eq!(rt.model().item_count(ListKey::Feed), 3);
    assert_eq!(
        rt.model().fetch_state(ListKey::Feed),
        FetchState::Idle { has_data: true }
    );

    rt.dispatch(AppMsg::OpenMessage {
        list: ListKey::Feed,
        index: 0,
    });
    rt.settle();
    assert_eq!(
        rt.model().current_route(),
        Some(&Route::MessageDetail { id: ItemId::new("m0") })
    );

    rt.dispatch(AppMsg::StartAppreciate(Target::Detail));
    assert_eq!(
        rt.model().current_route(),
        Some(&Route::Appreciate { id: ItemId::new("m0") })
    );
    rt.dispatch(AppMsg::ConfirmAppreciate);
    rt.settle();

    let model = rt.model();
    assert_eq!(
        model.current_route(),
        Some(&Route::MessageDetail { id: ItemId::new("m0") })
    );
    assert_eq!(model.token_balance(), 4);
    assert!(model.feed.items()[0].is_appreciated);
    assert!(model.top_detail().unwrap().1.is_appreciated);
    assert_eq!(rt.context().credentials.token_balance().unwrap(), 4);
    assert_eq!(backend.hits("GET /messages"), 1);
}

#[test]
fn first_launch_onboards_then_signs_in() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    backend.on_json("POST /auth/signin", 200, &session("lumen", 7));
    let config = test_config(dir.path(), 2);
    let prefs_path = config.paths.preferences_file.clone();

    let mut rt = runtime(config, &backend, Arc::new(MemorySecureStore::default()));
    rt.start().unwrap();
    assert_eq!(rt.model().current_route(), Some(&Route::Onboarding));

    rt.dispatch(AppMsg::CompleteOnboarding);
    assert_eq!(rt.model().current_route(), Some(&Route::SignIn));
    assert!(preferences::load(&prefs_path).into_prefs().has_onboarded);

    rt.dispatch(AppMsg::SignIn {
        username: "lumen".into(),
        password: "hunter22".into(),
    });
    rt.settle();

    let model = rt.model();
    assert!(model.is_signed_in());
    assert_eq!(model.token_balance(), 7);
    assert_eq!(model.current_route(), Some(&Route::Feed));
    assert_eq!(model.item_count(ListKey::Feed), 2);
    assert!(rt.context().credentials.is_signed_in().unwrap());
}

#[test]
fn rejected_sign_in_toasts_and_stays() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.on("POST /auth/signin", 401, "");
    let mut config = test_config(dir.path(), 2);
    config.paths.preferences_file = dir.path().join("prefs.json");
    std::fs::write(&config.paths.preferences_file, r#"{"has_onboarded": true}"#).unwrap();

    let mut rt = runtime(config, &backend, Arc::new(MemorySecureStore::default()));
    rt.start().unwrap();
    assert_eq!(rt.model().current_route(), Some(&Route::SignIn));

    rt.dispatch(AppMsg::SignIn {
        username: "lumen".into(),
        password: "wrong".into(),
    });
    rt.settle();

    let model = rt.model();
    assert!(!model.is_signed_in());
    assert_eq!(model.current_route(), Some(&Route::SignIn));
    let toast = model.toasts.last().unwrap();
    assert_eq!(toast.level, ToastLevel::Error);
    assert_eq!(toast.message, "Could not connect. Please try again.");
}

#[test]
fn sign_out_discards_pages_still_in_flight() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    let secure = signed_in_store("lumen", 5);
    let mut rt = runtime(test_config(dir.path(), 2), &backend, Arc::clone(&secure));

    rt.start().unwrap();
    rt.dispatch(AppMsg::SignOut);
    rt.settle();

    let model = rt.model();
    assert!(!model.is_signed_in());
    assert_eq!(model.current_route(), Some(&Route::SignIn));
    assert_eq!(model.item_count(ListKey::Feed), 0);
    assert_eq!(model.arena.len(), 1);
    assert!(!rt.context().credentials.is_signed_in().unwrap());
}

#[test]
fn failed_first_page_shows_load_failed_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.on("GET /messages", 500, "");
    let mut rt = runtime(test_config(dir.path(), 2), &backend, signed_in_store("lumen", 5));

    rt.start().unwrap();
    rt.settle();

    let model = rt.model();
    assert_eq!(
        model.fetch_state(ListKey::Feed),
        FetchState::Failed { has_data: false }
    );
    assert_eq!(
        model.empty_state(ListKey::Feed),
        Some(&nightlight::app::model::empty_states(ListKey::Feed).load_failed)
    );
    assert!(model.toasts.is_empty(), "placeholder replaces the toast");
}

#[test]
fn crashed_page_worker_does_not_wedge_the_list() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    backend.crash_once("GET /messages");
    let mut rt = runtime(test_config(dir.path(), 2), &backend, signed_in_store("lumen", 5));

    rt.start().unwrap();
    rt.settle();
    assert_eq!(
        rt.model().fetch_state(ListKey::Feed),
        FetchState::Failed { has_data: false }
    );
    assert!(!rt.model().feed.pager().is_fetching());

    rt.dispatch(AppMsg::Refresh(ListKey::Feed));
    rt.settle();
    assert_eq!(rt.model().item_count(ListKey::Feed), 2);
    assert_eq!(backend.hits("GET /messages"), 2);
}

#[test]
fn love_and_save_in_flight_together_both_stick() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    backend.on("POST /messages/m0/love", 204, "");
    backend.on("POST /messages/m0/save", 204, "");
    let mut rt = runtime(test_config(dir.path(), 2), &backend, signed_in_store("lumen", 5));
    rt.start().unwrap();
    rt.settle();

    let row = Target::Row {
        list: ListKey::Feed,
        index: 0,
    };
    rt.dispatch(AppMsg::React {
        target: row,
        reaction: Reaction::Love,
    });
    rt.dispatch(AppMsg::React {
        target: row,
        reaction: Reaction::Save,
    });
    rt.settle();

    let message = &rt.model().feed.items()[0];
    assert!(message.is_loved);
    assert!(message.is_saved);
    assert_eq!(message.love_count, 2);
}

#[test]
fn love_from_list_row_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    backend.on("POST /messages/m1/love", 204, "");
    let mut rt = runtime(test_config(dir.path(), 2), &backend, signed_in_store("lumen", 5));
    rt.start().unwrap();
    rt.settle();

    rt.dispatch(AppMsg::React {
        target: Target::Row {
            list: ListKey::Feed,
            index: 1,
        },
        reaction: Reaction::Love,
    });
    rt.settle();

    let row = &rt.model().feed.items()[1];
    assert!(row.is_loved);
    assert_eq!(row.love_count, 2);
    assert_eq!(backend.hits("POST /messages/m1/love"), 1);
}

#[test]
fn push_payload_opens_message_detail() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    backend.on_json("GET /messages/1234", 200, &message("1234", "ember"));
    let mut rt = runtime(test_config(dir.path(), 2), &backend, signed_in_store("lumen", 5));
    rt.start().unwrap();
    rt.settle();

    assert!(!rt.open_push(r#"{"aps": {"alert": "hi"}}"#));
    assert!(rt.open_push(r#"{"data": {"entityId": 1234}}"#));
    rt.settle();

    let (_, shown) = rt.model().top_detail().unwrap();
    assert_eq!(shown.id, "1234");
    assert_eq!(backend.hits("GET /messages/1234"), 1);
}

#[derive(Clone, Default)]
struct RecordingQueue {
    added: Arc<Mutex<Vec<String>>>,
    finished: Arc<Mutex<Vec<String>>>,
}

impl PaymentQueue for RecordingQueue {
    fn add_payment(&mut self, product_id: &str) -> Result<()> {
        self.added.lock().push(product_id.to_string());
        Ok(())
    }

    fn finish_transaction(&mut self, transaction_id: &str) {
        self.finished.lock().push(transaction_id.to_string());
    }
}

#[test]
fn token_purchase_credits_balance_and_closes_store() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    let queue = RecordingQueue::default();
    let mut rt = runtime_with_payments(
        test_config(dir.path(), 2),
        &backend,
        signed_in_store("lumen", 5),
        Box::new(queue.clone()),
    );
    rt.start().unwrap();
    rt.settle();

    rt.dispatch(AppMsg::OpenTokens);
    assert_eq!(rt.model().current_route(), Some(&Route::Tokens));
    rt.dispatch(AppMsg::BuyTokens("nightlight.tokens.small".into()));
    assert_eq!(*queue.added.lock(), vec!["nightlight.tokens.small".to_string()]);

    rt.handle_transaction(&TransactionUpdate {
        transaction_id: "t-1".into(),
        product_id: "nightlight.tokens.small".into(),
        state: TransactionState::Purchasing,
    });
    assert_eq!(rt.model().current_route(), Some(&Route::Tokens));

    rt.handle_transaction(&TransactionUpdate {
        transaction_id: "t-1".into(),
        product_id: "nightlight.tokens.small".into(),
        state: TransactionState::Purchased,
    });

    assert_eq!(rt.model().current_route(), Some(&Route::Feed));
    assert_eq!(rt.model().token_balance(), 15);
    assert_eq!(rt.context().credentials.token_balance().unwrap(), 15);
    assert_eq!(*queue.finished.lock(), vec!["t-1".to_string()]);
}

#[test]
fn purchases_fail_cleanly_without_a_store() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    let mut rt = runtime(test_config(dir.path(), 2), &backend, signed_in_store("lumen", 5));
    rt.start().unwrap();
    rt.settle();

    rt.dispatch(AppMsg::OpenTokens);
    rt.dispatch(AppMsg::BuyTokens("nightlight.tokens.small".into()));

    let model = rt.model();
    assert_eq!(model.token_balance(), 5);
    assert_eq!(model.toasts.last().unwrap().level, ToastLevel::Error);
}

#[test]
fn theme_change_is_persisted_and_broadcast() {
    let dir = tempfile::tempdir().unwrap();
    let backend = feed_backend();
    let config = test_config(dir.path(), 2);
    let prefs_path = config.paths.preferences_file.clone();
    let mut rt = runtime(config, &backend, signed_in_store("lumen", 5));
    let changes = rt.context().theme.subscribe();

    rt.dispatch(AppMsg::SetTheme(Theme::Dark));

    assert_eq!(rt.model().theme, Theme::Dark);
    assert_eq!(changes.try_recv().unwrap(), Theme::Dark);
    assert_eq!(preferences::load(&prefs_path).into_prefs().theme, Theme::Dark);
}
