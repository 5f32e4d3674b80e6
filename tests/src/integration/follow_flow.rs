//! # Follow Request Flow
//!
//! Accept atomicity under concurrency, decline cleanup, self rejection and
//! best-effort notifications across the follow machine, relationship store
//! and notification store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;
    use serde_json::json;
    use sg_01_document_store::Fault;
    use sg_02_notifications::Delivery;
    use sg_03_relationships::RelationshipReader;
    use sg_04_follow_requests::{
        Decision, FollowApi, FollowError, FollowOutcome, IgnoreReason, Transition,
    };

    use crate::integration::fixtures::{object, uid, Harness};

    async fn assert_request_gone(h: &Harness) {
        assert!(!h.exists("users/B/follow_requests/F1").await);
        assert!(!h.exists("users/F1/follow_requests_sent/B").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_accepts_have_one_outcome() {
        let h = Harness::new();
        let follow = Arc::clone(&h.services.follow);
        follow.create(&uid("F1"), &uid("B")).await.expect("create");

        let attempts = (0..8).map(|_| {
            let follow = Arc::clone(&follow);
            tokio::spawn(async move { follow.respond(&uid("B"), &uid("F1"), Decision::Accepted).await })
        });
        let transitions: Vec<Transition> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.expect("task").expect("respond"))
            .collect();

        assert_eq!(transitions.iter().filter(|t| t.is_committed()).count(), 1);
        assert!(h.exists("users/B/followers/F1").await);
        assert!(h.exists("users/F1/following/B").await);
        assert_request_gone(&h).await;
        assert_eq!(
            h.notification_ids("F1").await,
            vec!["follow_request_accepted_B_F1".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_accept_and_decline_never_mix() {
        let h = Harness::new();
        let follow = Arc::clone(&h.services.follow);
        follow.create(&uid("F1"), &uid("B")).await.expect("create");

        let accept = {
            let follow = Arc::clone(&follow);
            tokio::spawn(async move { follow.respond(&uid("B"), &uid("F1"), Decision::Accepted).await })
        };
        let decline = {
            let follow = Arc::clone(&follow);
            tokio::spawn(async move { follow.respond(&uid("B"), &uid("F1"), Decision::Declined).await })
        };
        let accepted = accept.await.expect("task").expect("accept");
        let declined = decline.await.expect("task").expect("decline");

        assert_eq!(
            u8::from(accepted.is_committed()) + u8::from(declined.is_committed()),
            1
        );
        let edge = h.exists("users/B/followers/F1").await;
        assert_eq!(edge, h.exists("users/F1/following/B").await);
        assert_eq!(edge, accepted.is_committed());
        assert_request_gone(&h).await;
    }

    #[tokio::test]
    async fn test_decline_removes_request_without_edges() {
        let h = Harness::new();
        let follow = &h.services.follow;
        follow.create(&uid("F1"), &uid("B")).await.expect("create");

        let transition = follow
            .respond(&uid("B"), &uid("F1"), Decision::Declined)
            .await
            .expect("decline");

        assert!(transition.is_committed());
        assert_request_gone(&h).await;
        assert!(!h.exists("users/B/followers/F1").await);
        assert!(!h.exists("users/F1/following/B").await);
        assert!(!h
            .services
            .relationships
            .is_following(&uid("F1"), &uid("B"))
            .await
            .expect("read"));

        // F1 may ask again after a decline.
        follow.create(&uid("F1"), &uid("B")).await.expect("create again");
        assert!(h.exists("users/B/follow_requests/F1").await);
    }

    #[tokio::test]
    async fn test_self_relationship_never_writes() {
        let h = Harness::new();
        let follow = &h.services.follow;
        let me = uid("A");

        assert!(matches!(follow.create(&me, &me).await, Err(FollowError::SelfRelationship(_))));
        assert!(follow.respond(&me, &me, Decision::Accepted).await.is_err());
        assert!(follow.follow(&me, &me).await.is_err());
        assert!(follow.cancel(&me, &me).await.is_err());
        assert!(follow
            .on_follower_created(&me, &me, &object(json!({ "source": "direct" })))
            .await
            .is_err());

        assert!(h.services.store.is_empty());
    }

    #[tokio::test]
    async fn test_notification_outage_does_not_undo_accept() {
        let h = Harness::new();
        let follow = &h.services.follow;
        follow.create(&uid("F1"), &uid("B")).await.expect("create");
        h.services.store.inject(Fault::FailNotificationWrites);

        let transition = follow
            .respond(&uid("B"), &uid("F1"), Decision::Accepted)
            .await
            .expect("transition itself succeeds");

        let Transition::Committed { notification, .. } = transition else {
            panic!("expected a committed transition");
        };
        assert!(matches!(notification, Delivery::Failed(_)));
        assert!(h.exists("users/B/followers/F1").await);
        assert!(h.exists("users/F1/following/B").await);
        assert_request_gone(&h).await;
        assert!(h.notification_ids("F1").await.is_empty());
    }

    #[tokio::test]
    async fn test_follow_policy_and_unfollow() {
        let h = Harness::new();
        h.write("users/OPEN", object(json!({ "requiresFollowApproval": false }))).await;
        h.write("users/GATED", object(json!({ "requiresFollowApproval": true }))).await;
        let follow = &h.services.follow;

        assert_eq!(follow.follow(&uid("F1"), &uid("OPEN")).await.expect("follow"), FollowOutcome::Followed);
        assert_eq!(follow.follow(&uid("F1"), &uid("GATED")).await.expect("follow"), FollowOutcome::Requested);
        assert_eq!(
            h.services.relationships.following_ids(&uid("F1")).await.expect("read"),
            vec![uid("OPEN")]
        );
        assert_eq!(follow.outgoing(&uid("F1")).await.expect("outgoing").len(), 1);
        assert_eq!(follow.incoming(&uid("GATED")).await.expect("incoming").len(), 1);

        assert!(h.services.relationships.unfollow(&uid("F1"), &uid("OPEN")).await.expect("unfollow"));
        assert!(!h.exists("users/OPEN/followers/F1").await);
        assert!(!h.exists("users/F1/following/OPEN").await);
    }

    #[tokio::test]
    async fn test_reconcile_restores_lost_mirror() {
        let h = Harness::new();
        h.write("users/B/followers/F1", object(json!({ "source": "direct" }))).await;

        let report = h.services.relationships.reconcile(&uid("B")).await.expect("reconcile");

        assert_eq!(report.mirrors_restored, 1);
        assert!(h.exists("users/F1/following/B").await);
    }

    #[tokio::test]
    async fn test_stale_accept_event_needs_a_fresh_answer() {
        let h = Harness::new();
        let follow = &h.services.follow;
        follow.create(&uid("F1"), &uid("B")).await.expect("create");
        let before = h.doc("users/B/follow_requests/F1").await.expect("pending request");
        let after = object(json!({ "status": "accepted" }));
        h.write("users/B/follow_requests/F1", after.clone()).await;
        let after = h.doc("users/B/follow_requests/F1").await.expect("accepted request");

        let first = follow
            .on_request_updated(&uid("B"), &uid("F1"), &before, &after)
            .await
            .expect("accept");
        assert!(first.is_committed());

        h.services.relationships.unfollow(&uid("F1"), &uid("B")).await.expect("unfollow");
        follow.create(&uid("F1"), &uid("B")).await.expect("request again");

        let replayed = follow
            .on_request_updated(&uid("B"), &uid("F1"), &before, &after)
            .await
            .expect("replay");

        assert_eq!(replayed, Transition::Ignored(IgnoreReason::Unanswered));
        assert!(!h
            .services
            .relationships
            .is_following(&uid("F1"), &uid("B"))
            .await
            .expect("read"));
        assert!(h.exists("users/B/follow_requests/F1").await);
        assert_eq!(follow.incoming(&uid("B")).await.expect("incoming").len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_after_unfollow_restores_nothing() {
        let h = Harness::new();
        h.connect("F1", "B").await;
        h.services.relationships.unfollow(&uid("F1"), &uid("B")).await.expect("unfollow");

        let report = h.services.relationships.reconcile(&uid("B")).await.expect("reconcile");
        let restored = h
            .services
            .relationships
            .ensure_mirror(&sg_03_relationships::FollowEdge::new(uid("F1"), uid("B")).expect("edge"))
            .await
            .expect("ensure");

        assert_eq!(report.mirrors_restored, 0);
        assert!(!restored);
        assert!(!h.exists("users/F1/following/B").await);
    }
}
