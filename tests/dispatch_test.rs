mod common;

use common::RecordingMessenger;
use news_relay::Dispatcher;
use std::sync::Arc;

#[tokio::test]
async fn one_failing_recipient_does_not_block_the_others() {
    let _ = tracing_subscriber::fmt().try_init();

    let messenger = Arc::new(RecordingMessenger::failing_for(&[2]));
    let dispatcher = Dispatcher::new(messenger.clone());

    let delivered = dispatcher.send_to_all("breaking news", &[1, 2, 3]).await;
    assert_eq!(delivered, 2);
    assert_eq!(messenger.deliveries_to(1), 1);
    assert_eq!(messenger.deliveries_to(2), 0);
    assert_eq!(messenger.deliveries_to(3), 1);

    // A second cycle attempts every recipient again, exactly once each.
    dispatcher.send_to_all("breaking news", &[1, 2, 3]).await;
    assert_eq!(messenger.deliveries_to(1), 2);
    assert_eq!(messenger.deliveries_to(3), 2);
}

#[tokio::test]
async fn empty_subscriber_set_is_a_no_op() {
    let _ = tracing_subscriber::fmt().try_init();

    let messenger = Arc::new(RecordingMessenger::new());
    let dispatcher = Dispatcher::new(messenger.clone());

    assert_eq!(dispatcher.send_to_all("nobody home", &[]).await, 0);
    assert!(messenger.messages().is_empty());
}
