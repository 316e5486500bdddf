use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_widget_backend::{AdapterError, ChatBackend, Operation};
use chat_widget_test_backend::{PresetReply, ScriptedBackend};
use chrono::{TimeZone, Utc};
use tokio::task::yield_now;

use crate::conversation::Origin;
use crate::{
    ControllerBuilder, DEFAULT_APOLOGY_TEXT, SendOutcome, SendPolicy,
    WidgetError,
};

fn texts(controller: &crate::Controller) -> Vec<String> {
    controller
        .state()
        .history()
        .iter()
        .map(|msg| msg.text().to_owned())
        .collect()
}

#[tokio::test]
async fn test_simple_message() {
    let backend = ScriptedBackend::default();
    let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    backend.add_reply(
        PresetReply::message("Sure, what time?")
            .with_intent("book_appointment")
            .with_timestamp(timestamp),
    );

    let controller = ControllerBuilder::with_backend(backend.clone()).build();
    let outcome = controller.send_message("Book an appointment").await;
    assert_eq!(outcome, SendOutcome::Replied);

    let state = controller.state();
    assert!(!state.is_loading());
    let history = state.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].origin(), Origin::User);
    assert_eq!(history[0].text(), "Book an appointment");
    assert_eq!(history[0].intent(), None);
    assert_eq!(history[1].origin(), Origin::Bot);
    assert_eq!(history[1].text(), "Sure, what time?");
    assert_eq!(history[1].intent(), Some("book_appointment"));
    assert_eq!(history[1].timestamp(), timestamp);
    assert!(history[1].entities().is_none());
    assert_eq!(backend.received(), ["Book an appointment"]);
}

#[tokio::test]
async fn test_failure_appends_apology() {
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::failure());

    let controller = ControllerBuilder::with_backend(backend).build();
    let outcome = controller.send_message("Book an appointment").await;
    assert_eq!(outcome, SendOutcome::Recovered);

    let state = controller.state();
    assert!(!state.is_loading());
    let history = state.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].origin(), Origin::User);
    assert_eq!(history[1].origin(), Origin::Bot);
    assert_eq!(history[1].text(), DEFAULT_APOLOGY_TEXT);
    assert_eq!(history[1].intent(), None);
    assert!(history[1].entities().is_none());
    assert!(history[1].id().as_str().starts_with("error_"));
}

#[tokio::test]
async fn test_custom_apology_text() {
    let controller = ControllerBuilder::with_backend(ScriptedBackend::default())
        .with_apology_text("Something went wrong.")
        .build();
    controller.send_message("Hi").await;
    assert_eq!(texts(&controller), ["Hi", "Something went wrong."]);
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let backend = ScriptedBackend::default();
    let controller = ControllerBuilder::with_backend(backend.clone()).build();

    for text in ["", "   ", "\n\t"] {
        assert_eq!(controller.send_message(text).await, SendOutcome::Ignored);
    }
    let state = controller.state();
    assert!(state.history().is_empty());
    assert!(!state.is_loading());
    assert!(backend.received().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loading_lifecycle() {
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::message("Hello!").with_delay_ms(100));
    let controller = ControllerBuilder::with_backend(backend).build();
    let mut state_rx = controller.subscribe();

    let pending = controller.send_message("Hi");

    // The user's message and the loading flag are visible right away.
    let state = controller.state();
    assert!(state.is_loading());
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.history()[0].origin(), Origin::User);

    let mut snapshots = vec![];
    let collector = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update();
            snapshots.push((state.history().len(), state.is_loading()));
            if !state.is_loading() {
                break;
            }
        }
        snapshots
    });

    assert_eq!(pending.await, SendOutcome::Replied);
    let snapshots = collector.await.unwrap();

    // No snapshot ever shows the reply while still loading.
    assert_eq!(snapshots.last(), Some(&(2, false)));
    assert!(
        snapshots
            .iter()
            .all(|(len, loading)| (*len == 1) == *loading)
    );
}

#[tokio::test]
async fn test_toggle_open() {
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::message("Hello!"));
    let controller = ControllerBuilder::with_backend(backend).build();
    controller.send_message("Hi").await;

    assert!(!controller.state().is_open());
    assert!(controller.toggle_open());
    assert!(controller.state().is_open());
    assert!(!controller.toggle_open());

    let state = controller.state();
    assert!(!state.is_open());
    assert_eq!(state.history().len(), 2);
    assert!(!state.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_toggle_open_while_loading() {
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::message("Hello!").with_delay_ms(100));
    let controller = ControllerBuilder::with_backend(backend).build();

    let pending = controller.send_message("Hi");
    controller.toggle_open();
    let state = controller.state();
    assert!(state.is_open());
    assert!(state.is_loading());
    assert_eq!(state.history().len(), 1);

    pending.await;
    assert!(controller.state().is_open());
}

#[tokio::test]
async fn test_clear_history() {
    let backend = ScriptedBackend::with_session_id("session_1_abc");
    backend.add_reply(PresetReply::message("Hello!"));
    backend.add_reply(PresetReply::message("Welcome back!"));
    let controller = ControllerBuilder::with_backend(backend.clone()).build();

    controller.send_message("Hi").await;
    controller.toggle_open();
    controller.clear_history();

    let state = controller.state();
    assert!(state.history().is_empty());
    assert!(state.is_open());
    assert!(!state.is_loading());
    assert_eq!(controller.session_id().as_str(), "session_1_abc");

    controller.send_message("Hi again").await;
    assert_eq!(texts(&controller), ["Hi again", "Welcome back!"]);
}

#[tokio::test]
async fn test_session_is_stable() {
    let backend = ScriptedBackend::default();
    let session_id = backend.session_id().clone();
    for _ in 0..3 {
        backend.add_reply(PresetReply::message("Ok"));
    }
    let controller = ControllerBuilder::with_backend(backend).build();

    for text in ["one", "two", "three"] {
        controller.send_message(text).await;
        assert_eq!(controller.session_id(), &session_id);
    }
    assert_eq!(controller.state().history().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_replies_in_completion_order() {
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::message("slow").with_delay_ms(500));
    backend.add_reply(PresetReply::message("fast").with_delay_ms(10));
    let controller = ControllerBuilder::with_backend(backend.clone()).build();

    let first = controller.send_message("first");
    let second = controller.send_message("second");
    assert_eq!(texts(&controller), ["first", "second"]);

    assert_eq!(second.await, SendOutcome::Replied);
    // The slow request is still in flight.
    let state = controller.state();
    assert!(state.is_loading());
    assert_eq!(texts(&controller), ["first", "second", "fast"]);

    assert_eq!(first.await, SendOutcome::Replied);
    assert!(!controller.state().is_loading());
    assert_eq!(texts(&controller), ["first", "second", "fast", "slow"]);
    assert_eq!(backend.received(), ["first", "second"]);
}

#[tokio::test(start_paused = true)]
async fn test_serialized_replies_in_send_order() {
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::message("slow").with_delay_ms(500));
    backend.add_reply(PresetReply::message("fast").with_delay_ms(10));
    let controller = ControllerBuilder::with_backend(backend.clone())
        .with_send_policy(SendPolicy::Serialized)
        .build();

    let first = controller.send_message("first");
    let second = controller.send_message("second");
    assert_eq!(texts(&controller), ["first", "second"]);
    assert!(controller.state().is_loading());

    assert_eq!(first.await, SendOutcome::Replied);
    assert!(controller.state().is_loading());
    assert_eq!(second.await, SendOutcome::Replied);
    assert!(!controller.state().is_loading());
    assert_eq!(texts(&controller), ["first", "second", "slow", "fast"]);
    assert_eq!(backend.received(), ["first", "second"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_serialized_order_from_worker_task() {
    for _ in 0..50 {
        let backend = ScriptedBackend::default();
        backend.add_reply(PresetReply::message("one"));
        backend.add_reply(PresetReply::message("two"));
        let controller = ControllerBuilder::with_backend(backend.clone())
            .with_send_policy(SendPolicy::Serialized)
            .build();

        // Sending from a worker thread puts the second task in the LIFO
        // slot, so it is polled before the first one.
        tokio::spawn(async move {
            let first = controller.send_message("first");
            let second = controller.send_message("second");
            assert_eq!(first.await, SendOutcome::Replied);
            assert_eq!(second.await, SendOutcome::Replied);
            assert_eq!(
                texts(&controller),
                ["first", "second", "one", "two"]
            );
        })
        .await
        .unwrap();
        assert_eq!(backend.received(), ["first", "second"]);
    }
}

#[tokio::test(start_paused = true)]
async fn test_serialized_shutdown_aborts_queued() {
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::message("slow").with_delay_ms(3_600_000));
    let controller = ControllerBuilder::with_backend(backend)
        .with_send_policy(SendPolicy::Serialized)
        .build();

    let first = controller.send_message("first");
    let second = controller.send_message("second");
    yield_now().await;
    controller.shutdown();
    assert_eq!(first.await, SendOutcome::Aborted);
    assert_eq!(second.await, SendOutcome::Aborted);
    assert!(!controller.state().is_loading());
}

#[tokio::test]
async fn test_observers() {
    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::message("Hello!").with_intent("greeting"));
    backend.add_reply(PresetReply::failure());

    let controller = ControllerBuilder::with_backend(backend)
        .on_message({
            let events = Arc::clone(&events);
            move |msg| {
                events.lock().unwrap().push(format!("message:{}", msg.text()));
            }
        })
        .on_response({
            let events = Arc::clone(&events);
            move |resp| {
                events
                    .lock()
                    .unwrap()
                    .push(format!("response:{:?}", resp.intent));
            }
        })
        .on_error({
            let events = Arc::clone(&events);
            move |err| {
                let expected = AdapterError::new(Operation::SendMessage);
                assert_eq!(err, &WidgetError::Adapter(expected));
                events.lock().unwrap().push("error".to_owned());
            }
        })
        .build();

    controller.send_message("Hi").await;
    controller.send_message("   ").await;
    controller.send_message("Again").await;

    assert_eq!(
        *events.lock().unwrap(),
        [
            "message:Hi",
            "response:Some(\"greeting\")",
            "message:Again",
            "error",
        ]
    );
}

#[tokio::test]
async fn test_available_intents() {
    let errors = Arc::new(Mutex::new(0));
    let backend = ScriptedBackend::default();
    let controller = ControllerBuilder::with_backend(backend.clone())
        .on_error({
            let errors = Arc::clone(&errors);
            move |_| *errors.lock().unwrap() += 1
        })
        .build();

    let err = controller.available_intents().await.unwrap_err();
    assert_eq!(err.operation(), Operation::FetchIntents);
    assert_eq!(*errors.lock().unwrap(), 1);

    backend.set_intents(["greeting", "book_appointment"]);
    let intents = controller.available_intents().await.unwrap();
    assert_eq!(intents, ["greeting", "book_appointment"]);
    assert_eq!(*errors.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown() {
    let backend = ScriptedBackend::default();
    backend.set_delay(Duration::from_secs(3600));
    backend.add_reply(PresetReply::message("never"));
    let controller = ControllerBuilder::with_backend(backend).build();

    let pending = controller.send_message("Hi");
    yield_now().await;
    assert!(controller.state().is_loading());

    controller.shutdown();
    controller.shutdown();
    assert_eq!(pending.await, SendOutcome::Aborted);

    let state = controller.state();
    assert!(!state.is_loading());
    assert_eq!(texts(&controller), ["Hi"]);

    assert_eq!(controller.send_message("Hello?").await, SendOutcome::Ignored);
    assert_eq!(texts(&controller), ["Hi"]);
}

#[tokio::test]
async fn test_dropped_reply_still_lands() {
    let backend = ScriptedBackend::default();
    backend.add_reply(PresetReply::message("Hello!"));
    let controller = ControllerBuilder::with_backend(backend).build();
    let mut state_rx = controller.subscribe();

    drop(controller.send_message("Hi"));
    state_rx
        .wait_for(|state| !state.is_loading())
        .await
        .unwrap();
    assert_eq!(texts(&controller), ["Hi", "Hello!"]);
}
