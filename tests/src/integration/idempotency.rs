//! # Duplicate Safety
//!
//! Every handler may run any number of times for the same logical event;
//! the number of notification documents per `(type, actors)` stays at one.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;
    use sg_01_document_store::Fault;
    use sg_05_post_fanout::{FanoutConfig, FanoutError};
    use sg_runtime::RuntimeConfig;

    use crate::integration::fixtures::{object, pid, post, uid, Harness};

    #[tokio::test]
    async fn test_redelivered_fanout_creates_no_duplicates() {
        let h = Harness::new();
        h.connect("F1", "A").await;
        h.connect("F2", "A").await;

        for _ in 0..3 {
            h.services
                .fanout
                .on_post_created(&pid("P1"), &post("A", "published"))
                .await
                .expect("fanout");
        }

        for follower in ["F1", "F2"] {
            assert_eq!(h.notification_ids(follower).await, vec!["new_post_P1".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_redelivered_follower_trigger_creates_no_duplicates() {
        let h = Harness::new();
        let record = object(json!({ "source": "direct" }));
        h.write("users/B/followers/F1", record.clone()).await;

        for _ in 0..3 {
            h.services
                .follow
                .on_follower_created(&uid("B"), &uid("F1"), &record)
                .await
                .expect("follower trigger");
        }

        assert_eq!(h.notification_ids("B").await, vec!["follow_B_F1".to_string()]);
        assert!(h.exists("users/F1/following/B").await);
    }

    #[tokio::test]
    async fn test_republish_toggle_refreshes_single_notification() {
        let h = Harness::new();
        h.connect("F1", "A").await;
        let fanout = &h.services.fanout;
        let (draft, published) = (post("A", "draft"), post("A", "published"));

        fanout.on_post_created(&pid("P1"), &published).await.expect("publish");
        h.services
            .notifications
            .mark_read(&uid("F1"), &sg_02_notifications::NotificationKey::new_post(&pid("P1")))
            .await
            .expect("mark read");
        let read = h.doc("users/F1/notifications/new_post_P1").await.expect("stored");

        // published -> draft -> published, twice.
        for _ in 0..2 {
            fanout.on_post_updated(&pid("P1"), &published, &draft).await.expect("unpublish");
            fanout.on_post_updated(&pid("P1"), &draft, &published).await.expect("republish");
        }

        assert_eq!(h.notification_ids("F1").await.len(), 1);
        let after = h.doc("users/F1/notifications/new_post_P1").await.expect("stored");
        assert_eq!(after.get("seen"), Some(&json!(true)));
        assert_eq!(after.get("readAt"), read.get("readAt"));
        assert_eq!(after.get("createdAt"), read.get("createdAt"));
    }

    #[tokio::test]
    async fn test_thousand_followers_survive_partial_failure_and_redelivery() {
        let mut config = RuntimeConfig::for_testing();
        config.fanout = FanoutConfig::with_chunk_size(450);
        let h = Harness::with_config(config);
        for i in 0..1000 {
            h.connect(&format!("F{i:04}"), "A").await;
        }

        h.services.store.inject(Fault::FailBatch { nth: 3 });
        let err = h
            .services
            .fanout
            .on_post_created(&pid("P1"), &post("A", "published"))
            .await
            .expect_err("third chunk fails");
        let FanoutError::PartialFailure { report, .. } = err else {
            panic!("expected a partial failure");
        };
        assert_eq!(report.chunks, 3);
        assert_eq!(report.committed_chunks, vec![0, 1]);
        assert_eq!(report.failed_chunks, vec![2]);

        // Redelivery of the whole invocation.
        let report = h
            .services
            .fanout
            .on_post_created(&pid("P1"), &post("A", "published"))
            .await
            .expect("redelivery succeeds")
            .expect("fans out");
        assert!(report.is_complete());
        assert_eq!(report.written, 100);

        // And once more, as a duplicate delivery.
        h.services
            .fanout
            .on_post_created(&pid("P1"), &post("A", "published"))
            .await
            .expect("duplicate delivery");

        let mut recipients = HashSet::new();
        for i in 0..1000 {
            let follower = format!("F{i:04}");
            let ids = h.notification_ids(&follower).await;
            assert_eq!(ids, vec!["new_post_P1".to_string()], "follower {follower}");
            recipients.insert(follower);
        }
        assert_eq!(recipients.len(), 1000);
    }
}
