//! # Offload Flow
//!
//! Front-end → work topic → workers → notification topic → front-end,
//! driven through `WorkFrontendApi`.

#[cfg(test)]
mod tests {
    use crate::integration::harness::Deployment;
    use shared_bus::{MessageBroker, Payload, SubscriptionKind};
    use shared_types::{OffloadError, ResultItem, TopicConfig, WorkItem};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use wo_01_frontend::{FrontendConfig, FrontendService, WorkFrontendApi};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_hello_round_trip() {
        let d = Deployment::start(1).await;

        let receipt = d.frontend.submit(Some("hello")).await.unwrap();
        assert_eq!(receipt.item_count, 1);

        let results = d.collect(1).await;
        assert_eq!(results, vec![ResultItem::new("HELLO", "be-it-0")]);
        assert_eq!(d.frontend.poll().await.unwrap(), None);
        d.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_word_returned_exactly_once() {
        let d = Deployment::start(3).await;
        let words: Vec<String> = (0..30).map(|i| format!("word{i}")).collect();

        let receipt = d.frontend.submit(Some(words.join(" ").as_str())).await.unwrap();
        assert_eq!(receipt.item_count, 30);
        assert_eq!(d.broker.stats().unrouted(), 0);

        let results = d.collect(30).await;
        let returned: HashSet<_> = results.iter().map(|r| r.transformed_word.clone()).collect();
        let expected: HashSet<_> = words.iter().map(|w| w.to_uppercase()).collect();
        assert_eq!(returned, expected);
        assert_eq!(results.len(), 30);

        assert_eq!(d.frontend.poll().await.unwrap(), None);
        assert_eq!(d.broker.stats().peak_durable_consumers(), 1);
        d.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_callers_never_share_the_subscription() {
        let d = Deployment::start(2).await;
        let mut handles = Vec::new();
        for i in 0..16 {
            let frontend = Arc::clone(&d.frontend);
            handles.push(tokio::spawn(async move {
                frontend.submit(Some(format!("a{i} b{i}").as_str())).await.unwrap();
                frontend.poll().await.unwrap()
            }));
        }

        let mut early = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                early += 1;
            }
        }
        let rest = d.collect(32 - early).await;
        assert_eq!(early + rest.len(), 32);
        assert_eq!(d.frontend.poll().await.unwrap(), None);

        // A subscription created once, and never two pollers at a time.
        assert_eq!(d.broker.stats().peak_durable_consumers(), 1);
        d.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_results_for_work_before_first_poll_are_kept() {
        let d = Deployment::start(1).await;

        d.frontend.submit(Some("early")).await.unwrap();
        d.wait_processed(1).await;

        // Retained by the durable subscription although nobody was attached.
        assert_eq!(
            d.broker.backlog(
                &d.topics.notification_topic,
                &d.topics.subscription_name,
                SubscriptionKind::Durable
            ),
            Some(1)
        );
        assert_eq!(d.collect(1).await[0].transformed_word, "EARLY");
        d.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_expired_results_are_not_delivered() {
        let topics = TopicConfig::default().with_message_ttl(Duration::from_millis(100));
        let d = Deployment::start_with(topics, 1).await;

        d.frontend.submit(Some("stale")).await.unwrap();
        d.wait_processed(1).await;
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(d.frontend.poll().await.unwrap(), None);
        assert!(d.broker.stats().expired() >= 1);
        d.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_malformed_work_is_skipped() {
        let d = Deployment::start(1).await;

        let mut session = d.broker.connect().await.unwrap();
        session
            .publish(&d.topics.work_topic, Payload::Bytes(vec![7; 4]), None)
            .await
            .unwrap();
        drop(session);

        d.frontend.submit(Some("fine")).await.unwrap();
        assert_eq!(d.collect(1).await[0].transformed_word, "FINE");
        assert_eq!(d.workers.stats().dropped(), 1);
        d.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_malformed_result_surfaces_once() {
        let d = Deployment::start(0).await;
        d.frontend.gate().ensure_subscription().await.unwrap();

        let mut session = d.broker.connect().await.unwrap();
        let bogus = WorkItem::new("not-a-result", "x").encode().unwrap();
        session
            .publish(&d.topics.notification_topic, Payload::Text(bogus), None)
            .await
            .unwrap();

        let err = d.frontend.poll().await.unwrap_err();
        assert!(matches!(err, OffloadError::MalformedMessage(_)));
        assert_eq!(d.frontend.poll().await.unwrap(), None);
        d.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_frontends_with_own_subscriptions_each_see_results() {
        let d = Deployment::start(1).await;
        let mut other_topics = d.topics.clone();
        other_topics.subscription_name = "other.subscription".to_string();
        let other = FrontendService::new(
            Arc::new(d.broker.clone()),
            &FrontendConfig::new(other_topics).with_identity("fe-other"),
        );
        other.gate().ensure_subscription().await.unwrap();

        d.frontend.submit(Some("fanout")).await.unwrap();
        d.wait_processed(1).await;

        assert_eq!(d.collect(1).await[0].transformed_word, "FANOUT");
        let seen = other.poll().await.unwrap().unwrap();
        assert_eq!(seen.transformed_word, "FANOUT");
        d.stop().await;
    }

    #[tokio::test]
    async fn test_invalid_input_publishes_nothing() {
        let d = Deployment::start(0).await;
        for input in [None, Some("")] {
            let err = d.frontend.submit(input).await.unwrap_err();
            assert!(matches!(err, OffloadError::InvalidInput(_)));
        }
        assert_eq!(d.broker.stats().published(), 0);
        d.stop().await;
    }

    #[tokio::test]
    async fn test_broker_outage_then_recovery() {
        let d = Deployment::start(0).await;
        d.frontend.submit(Some("warm")).await.unwrap();

        d.broker.set_available(false);
        assert!(matches!(
            d.frontend.submit(Some("x")).await.unwrap_err(),
            OffloadError::BrokerUnavailable(_)
        ));
        assert!(matches!(
            d.frontend.poll().await.unwrap_err(),
            OffloadError::BrokerUnavailable(_)
        ));

        d.broker.set_available(true);
        assert_eq!(d.frontend.poll().await.unwrap(), None);
        d.stop().await;
    }
}
