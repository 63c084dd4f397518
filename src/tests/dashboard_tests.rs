use super::*;
use crate::store::testing::MemoryStore;

fn papers(rows: &[(u64, &str, &str)]) -> Vec<Paper> {
    rows
        .iter()
        .map(|(id, title, status)| Paper::new(*id, *title, *status))
        .collect()
}

async fn loaded(rows: &[(u64, &str, &str)]) -> (MemoryStore, PublicationController<MemoryStore>) {
    let store = MemoryStore::with_papers(papers(rows));
    let mut controller = PublicationController::new(store.clone(), 50);
    assert!(controller.refresh().await);
    (store, controller)
}

#[tokio::test]
async fn refresh_replaces_state_wholesale() {
    let (store, mut controller) = loaded(&[(1, "A", "GS Journal")]).await;
    {
        let mut inner = store.inner.lock().unwrap();
        inner.data.papers = papers(&[(5, "E", "Rejected")]);
        inner.data.researcher.name = "Dr. Someone".into();
    }
    assert!(controller.refresh().await);
    assert_eq!(controller.state().papers, papers(&[(5, "E", "Rejected")]));
    assert_eq!(controller.state().researcher.name, "Dr. Someone");
}

#[tokio::test]
async fn failed_refresh_keeps_previous_state() {
    let (store, mut controller) = loaded(&[(1, "A", "GS Journal")]).await;
    store.inner.lock().unwrap().fail_fetch = true;
    assert!(!controller.refresh().await);
    assert_eq!(controller.state().papers, papers(&[(1, "A", "GS Journal")]));
}

#[tokio::test]
async fn add_with_blank_title_is_rejected() {
    let (store, mut controller) = loaded(&[(1, "A", "x")]).await;
    controller.open_add_form();
    controller.set_add_draft("   ", "anything");

    assert_eq!(controller.add("", "anything").await, MutationOutcome::Rejected);
    assert_eq!(controller.save_add_draft().await, MutationOutcome::Rejected);
    assert_eq!(controller.state().papers.len(), 1);
    assert!(store.inner.lock().unwrap().pushes.is_empty());
    // Form stays open with its draft.
    assert!(controller.state().adding);
    assert_eq!(controller.state().add_draft.status, "anything");
}

#[tokio::test]
async fn add_assigns_max_plus_one() {
    let (_store, mut controller) = loaded(&[(2, "B", ""), (7, "G", ""), (3, "C", "")]).await;
    assert_eq!(
        controller.add("New Title", "Yet to Start").await,
        MutationOutcome::Synced
    );
    let last = controller.state().papers.last().expect("appended");
    assert_eq!(last.id, 8);
    assert_eq!(last.title, "New Title");
    assert_eq!(last.status, "Yet to Start");
}

#[tokio::test]
async fn add_to_empty_collection_starts_at_one() {
    let (_store, mut controller) = loaded(&[]).await;
    controller.add("First", "").await;
    assert_eq!(controller.state().papers[0].id, 1);
}

#[tokio::test]
async fn add_pushes_full_collection_then_refetches_and_closes_form() {
    let (store, mut controller) = loaded(&[(1, "A", "")]).await;
    store.inner.lock().unwrap().derive_color = Some("#00B050".into());
    controller.open_add_form();
    controller.set_add_draft("Second", "Awaiting");

    assert_eq!(controller.save_add_draft().await, MutationOutcome::Synced);

    let inner = store.inner.lock().unwrap();
    assert_eq!(inner.pushes.len(), 1);
    assert_eq!(inner.pushes[0].len(), 2);
    // Initial load plus the reconcile after the push.
    assert_eq!(inner.fetch_calls, 2);
    drop(inner);

    // Store-derived colours come back through the refresh.
    assert!(controller
        .state()
        .papers
        .iter()
        .all(|p| p.color.as_deref() == Some("#00B050")));
    assert!(!controller.state().adding);
    assert_eq!(controller.state().add_draft, PaperDraft::default());
}

#[tokio::test]
async fn failed_push_keeps_optimistic_state_and_skips_refresh() {
    let (store, mut controller) = loaded(&[(1, "A", "")]).await;
    store.inner.lock().unwrap().fail_push = true;

    assert_eq!(controller.add("B", "").await, MutationOutcome::PushFailed);
    assert_eq!(controller.state().papers.len(), 2);
    assert_eq!(store.inner.lock().unwrap().fetch_calls, 1);
}

#[tokio::test]
async fn edit_replaces_title_and_status_only() {
    let store = MemoryStore::with_papers(vec![Paper {
        color: Some("#e53e3e".into()),
        highlight: Some(true),
        ..Paper::new(4, "Old", "Indian Journal")
    }]);
    let mut controller = PublicationController::new(store.clone(), 50);
    controller.refresh().await;

    assert!(controller.begin_edit(4));
    controller.set_edit_draft("New", "EIC decision");
    assert_eq!(controller.save_edit_draft().await, MutationOutcome::Synced);

    let p = &controller.state().papers[0];
    assert_eq!((p.title.as_str(), p.status.as_str()), ("New", "EIC decision"));
    assert_eq!(p.color.as_deref(), Some("#e53e3e"));
    assert!(p.is_highlighted());
    assert!(controller.state().editing.is_none());
}

#[tokio::test]
async fn edit_and_delete_of_unknown_id_are_silent_noops() {
    let (store, mut controller) = loaded(&[(1, "A", "")]).await;
    assert_eq!(controller.edit(99, "X", "Y").await, MutationOutcome::NoMatch);
    assert_eq!(controller.delete(99).await, MutationOutcome::NoMatch);
    assert!(!controller.begin_edit(99));
    assert_eq!(controller.state().papers, papers(&[(1, "A", "")]));
    assert!(store.inner.lock().unwrap().pushes.is_empty());
}

#[tokio::test]
async fn saving_an_edit_whose_paper_vanished_closes_the_form() {
    let (store, mut controller) = loaded(&[(1, "A", ""), (3, "C", "Rejected")]).await;
    assert!(controller.begin_edit(3));
    controller.set_edit_draft("C2", "Rejected");

    store.inner.lock().unwrap().data.papers = papers(&[(1, "A", "")]);
    assert!(controller.refresh().await);

    assert_eq!(controller.save_edit_draft().await, MutationOutcome::NoMatch);
    assert!(controller.state().editing.is_none());
    assert!(store.inner.lock().unwrap().pushes.is_empty());
}

#[tokio::test]
async fn unknown_columns_are_pushed_back_after_edit() {
    let row: Paper = serde_json::from_value(serde_json::json!({
        "id": 1,
        "title": "T",
        "status": "S",
        "journal": "ESJ",
        "row": 7
    }))
    .expect("decode");
    let store = MemoryStore::with_papers(vec![row]);
    let mut controller = PublicationController::new(store.clone(), 50);
    assert!(controller.refresh().await);

    assert_eq!(controller.edit(1, "T2", "S2").await, MutationOutcome::Synced);

    let pushed = store.inner.lock().unwrap().pushes[0].clone();
    let body = serde_json::to_value(&pushed[0]).expect("encode");
    assert_eq!(body["title"], "T2");
    assert_eq!(body["journal"], "ESJ");
    assert_eq!(body["row"], 7);
}

#[tokio::test]
async fn delete_removes_and_stays_removed_after_refresh() {
    let (store, mut controller) = loaded(&[(1, "A", ""), (2, "B", ""), (3, "C", "")]).await;
    assert_eq!(controller.delete(2).await, MutationOutcome::Synced);
    assert!(controller.refresh().await);
    let ids: Vec<u64> = controller.state().papers.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(store.inner.lock().unwrap().pushes[0].len(), 2);
}

#[tokio::test]
async fn deleted_paper_returns_only_if_store_still_has_it() {
    let (store, mut controller) = loaded(&[(1, "A", ""), (2, "B", "")]).await;
    store.inner.lock().unwrap().fail_push = true;
    controller.delete(2).await;
    assert_eq!(controller.state().papers.len(), 1);

    // The store never accepted the delete, so the next refresh restores it.
    assert!(controller.refresh().await);
    assert_eq!(controller.state().papers.len(), 2);
}

#[tokio::test]
async fn ids_are_never_reused_while_higher_ids_exist() {
    let (_store, mut controller) = loaded(&[(1, "A", ""), (2, "B", ""), (3, "C", "")]).await;
    controller.delete(2).await;
    controller.add("D", "").await;
    let ids: Vec<u64> = controller.state().papers.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

#[tokio::test]
async fn search_is_case_insensitive_over_title_and_status() {
    let (_store, mut controller) = loaded(&[
        (1, "Lumbar fusion", "GS Journal"),
        (2, "Scoliosis", "Rejected"),
        (3, "Disc herniation", "Asian Spine Journal"),
    ])
    .await;

    let hits: Vec<u64> = controller.search("journal").iter().map(|p| p.id).collect();
    assert_eq!(hits, vec![1, 3]);

    let by_title: Vec<u64> = controller.search("SCOLIO").iter().map(|p| p.id).collect();
    assert_eq!(by_title, vec![2]);

    controller.set_search_term("JOURNAL");
    assert_eq!(controller.visible_papers().len(), 2);
    controller.set_search_term("");
    assert_eq!(controller.visible_papers().len(), 3);
}

#[tokio::test]
async fn forms_are_mutually_exclusive() {
    let (_store, mut controller) = loaded(&[(1, "A", "")]).await;
    controller.open_add_form();
    assert!(controller.begin_edit(1));
    assert!(!controller.state().adding);
    controller.open_add_form();
    assert!(controller.state().editing.is_none());
    controller.cancel_forms();
    assert!(!controller.state().adding);
}

#[tokio::test]
async fn progress_counts_against_goal() {
    let (_store, controller) = loaded(&[(1, "A", ""), (2, "B", "")]).await;
    let p = controller.progress();
    assert_eq!((p.count, p.goal, p.percent), (2, 50, 4));
}
