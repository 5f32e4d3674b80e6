//! # End-to-End Through the Router
//!
//! Clients only write documents; every side effect below is produced by the
//! trigger handlers the runtime dispatches from the store's change feed.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sg_01_document_store::{DocumentStore, Fault, WriteOp};
    use sg_04_follow_requests::FollowApi;

    use sg_runtime::{RuntimeConfig, SocialGraphRuntime};

    use crate::integration::fixtures::{eventually, object, path, post, uid, Harness};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_request_accept_via_status_update() {
        let (harness, runtime) = Harness::started().await;
        let h = &harness;
        h.write("users/F1", object(json!({ "displayName": "Fatima" }))).await;

        h.services.follow.create(&uid("F1"), &uid("B")).await.expect("create");
        eventually("follow_request notification", || async move {
            h.exists("users/B/notifications/follow_request_B_F1").await
        })
        .await;
        let request_notification = h
            .doc("users/B/notifications/follow_request_B_F1")
            .await
            .expect("stored");
        assert_eq!(request_notification.get("followerName"), Some(&json!("Fatima")));

        // B's client flips the status; the update trigger applies it.
        h.write("users/B/follow_requests/F1", object(json!({ "status": "accepted" }))).await;
        eventually("accepted transition", || async move {
            h.exists("users/F1/notifications/follow_request_accepted_B_F1").await
        })
        .await;

        assert!(h.exists("users/B/followers/F1").await);
        assert!(h.exists("users/F1/following/B").await);
        assert!(!h.exists("users/B/follow_requests/F1").await);
        assert!(!h.exists("users/F1/follow_requests_sent/B").await);

        // The follower-created trigger ran for the request-made edge but must
        // not announce it a second time.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!h.exists("users/B/notifications/follow_B_F1").await);

        runtime.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_declined_status_cleans_up() {
        let (harness, runtime) = Harness::started().await;
        let h = &harness;
        h.services.follow.create(&uid("F1"), &uid("B")).await.expect("create");

        h.write("users/B/follow_requests/F1", object(json!({ "status": "declined" }))).await;
        eventually("declined notification", || async move {
            h.exists("users/F1/notifications/follow_request_declined_B_F1").await
        })
        .await;

        assert!(!h.exists("users/B/follow_requests/F1").await);
        assert!(!h.exists("users/F1/follow_requests_sent/B").await);
        assert!(!h.exists("users/B/followers/F1").await);
        assert!(!h.exists("users/F1/following/B").await);

        runtime.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_from_other_client_removes_mirror() {
        let (harness, runtime) = Harness::started().await;
        let h = &harness;
        h.services.follow.create(&uid("F1"), &uid("B")).await.expect("create");

        // Only the primary is deleted; the deleted trigger removes the mirror.
        h.services
            .store
            .apply(WriteOp::delete(path("users/B/follow_requests/F1")))
            .await
            .expect("delete primary");
        eventually("mirror removal", || async move {
            !h.exists("users/F1/follow_requests_sent/B").await
        })
        .await;

        runtime.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_direct_follower_record_notifies_and_mirrors() {
        let (harness, runtime) = Harness::started().await;
        let h = &harness;

        h.write("users/C/followers/F2", object(json!({ "source": "direct" }))).await;
        eventually("follow notification", || async move {
            h.exists("users/C/notifications/follow_C_F2").await
        })
        .await;
        assert!(h.exists("users/F2/following/C").await);

        runtime.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_post_publish_fans_out_and_failed_chunk_is_redelivered() {
        let (harness, runtime) = Harness::started().await;
        let h = &harness;
        for follower in ["F1", "F2", "F3"] {
            h.connect(follower, "A").await;
        }
        // Let the follower-created triggers finish before injecting a fault.
        eventually("follow notifications", || async move {
            h.notification_ids("A").await.len() == 3
        })
        .await;

        h.write("posts/P1", post("A", "draft")).await;
        // Batch 1 is the publish write itself, batch 2 the first fanout chunk.
        h.services.store.inject(Fault::FailBatch { nth: 2 });
        h.write("posts/P1", post("A", "published")).await;

        eventually("new_post notifications", || async move {
            let mut all = true;
            for follower in ["F1", "F2", "F3"] {
                all &= h
                    .exists(&format!("users/{follower}/notifications/new_post_P1"))
                    .await;
            }
            all
        })
        .await;
        for follower in ["F1", "F2", "F3"] {
            assert_eq!(h.notification_ids(follower).await, vec!["new_post_P1".to_string()]);
        }

        runtime.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_large_fanout_does_not_crowd_out_triggers() {
        let config = RuntimeConfig::for_testing();
        let followers = 3 * config.bus_capacity / 2;
        let harness = Harness::with_config(config);
        let h = &harness;
        for i in 0..followers {
            h.connect(&format!("F{i:04}"), "A").await;
        }
        let runtime = SocialGraphRuntime::new(h.services.clone());
        runtime.start().await.expect("runtime starts");

        h.write("posts/P1", post("A", "published")).await;
        h.services.follow.create(&uid("R1"), &uid("B")).await.expect("create");

        eventually("request notification behind the fanout", || async move {
            h.exists("users/B/notifications/follow_request_B_R1").await
        })
        .await;
        eventually("fanout to every follower", || async move {
            h.exists(&format!("users/F{:04}/notifications/new_post_P1", followers - 1)).await
        })
        .await;
        for i in 0..followers {
            assert!(h.exists(&format!("users/F{i:04}/notifications/new_post_P1")).await);
        }

        runtime.shutdown().await;
    }
}
