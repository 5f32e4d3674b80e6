//! # Worked Example
//!
//! Author `A` has followers `{F1, F2, F3}` and publishes `P1`; then `F1`
//! asks to follow `B` and `B` accepts.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sg_04_follow_requests::{Decision, FollowApi, RequestOutcome};
    use sg_02_notifications::{NotificationKey, NotificationKind};

    use crate::integration::fixtures::{pid, post, uid, Harness};

    #[tokio::test]
    async fn test_publish_then_accept() {
        let h = Harness::new();
        for follower in ["F1", "F2", "F3"] {
            h.connect(follower, "A").await;
        }

        // A publishes P1.
        let report = h
            .services
            .fanout
            .on_post_created(&pid("P1"), &post("A", "published"))
            .await
            .expect("fanout")
            .expect("published post fans out");
        assert_eq!(report.followers, 3);
        assert_eq!(report.chunks, 1);

        for follower in ["F1", "F2", "F3"] {
            let doc = h
                .doc(&format!("users/{follower}/notifications/new_post_P1"))
                .await
                .expect("new_post notification");
            assert_eq!(doc.get("seen"), Some(&json!(false)));
            assert_eq!(doc.get("readAt"), Some(&json!(null)));
            assert_eq!(doc.get("type"), Some(&json!("new_post")));
            assert_eq!(doc.get("postId"), Some(&json!("P1")));
            assert_eq!(doc.get("authorId"), Some(&json!("A")));
        }
        assert!(h.notification_ids("A").await.is_empty());

        // F1 asks to follow B; B accepts.
        let follow = &h.services.follow;
        assert_eq!(
            follow.create(&uid("F1"), &uid("B")).await.expect("create"),
            RequestOutcome::Requested
        );
        let transition = follow
            .respond(&uid("B"), &uid("F1"), Decision::Accepted)
            .await
            .expect("respond");
        assert!(transition.is_committed());

        assert!(h.exists("users/B/followers/F1").await);
        assert!(h.exists("users/F1/following/B").await);
        assert!(!h.exists("users/B/follow_requests/F1").await);
        assert!(!h.exists("users/F1/follow_requests_sent/B").await);

        let accepted = h
            .services
            .notifications
            .get(&uid("F1"), &NotificationKey::follow_request_accepted(&uid("B"), &uid("F1")))
            .await
            .expect("read notification")
            .expect("accepted notification");
        assert_eq!(accepted.id, "follow_request_accepted_B_F1");
        assert_eq!(accepted.kind, NotificationKind::FollowRequestAccepted);
        assert!(!accepted.seen);
    }
}
