use domains::{DomainError, NewTask, ReorderEntry, TaskPatch, TaskStatus};
use integration_tests::{new_task, Harness};

#[tokio::test]
async fn assignee_must_be_a_project_member() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let m = h.member("Mia").await;
    let outsider = h.member("Otto").await;
    let project = h.project(&owner, "Roadmap", &[&m]).await;

    let err = h
        .services
        .tasks
        .create(
            owner.id,
            NewTask {
                assignee: Some(outsider.id),
                ..new_task(project.id, "Ship it")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let task = h
        .services
        .tasks
        .create(
            owner.id,
            NewTask {
                assignee: Some(m.id),
                ..new_task(project.id, "Ship it")
            },
        )
        .await
        .unwrap();
    assert_eq!(task.assignee.as_ref().map(|u| u.id), Some(m.id));

    let listed = h.services.tasks.list_by_project(m.id, project.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].assignee.as_ref().map(|u| u.name.as_str()), Some("Mia"));
}

#[tokio::test]
async fn new_tasks_go_to_the_end_of_the_board() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let project = h.project(&owner, "Roadmap", &[]).await;

    let first = h.task(&owner, project.id, "one").await;
    let second = h.task(&owner, project.id, "two").await;
    assert_eq!(first.order, 0.0);
    assert_eq!(second.order, 1.0);
    assert_eq!(first.status, TaskStatus::ToDo);
}

#[tokio::test]
async fn strangers_cannot_touch_tasks() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let stranger = h.member("Sam").await;
    let project = h.project(&owner, "Roadmap", &[]).await;
    let task = h.task(&owner, project.id, "one").await;

    let err = h
        .services
        .tasks
        .create(stranger.id, new_task(project.id, "sneaky"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = h.services.tasks.delete(stranger.id, task.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = h
        .services
        .tasks
        .list_by_project(stranger.id, project.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn update_validates_status_and_clears_nullable_fields() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let m = h.member("Mia").await;
    let project = h.project(&owner, "Roadmap", &[&m]).await;
    let task = h
        .services
        .tasks
        .create(
            m.id,
            NewTask {
                description: Some("details".into()),
                assignee: Some(m.id),
                due_date: Some("2030-01-15".into()),
                ..new_task(project.id, "Write docs")
            },
        )
        .await
        .unwrap();
    assert!(task.due_date.is_some());

    let bad = TaskPatch {
        status: Some("Blocked".into()),
        ..Default::default()
    };
    let err = h.services.tasks.update(m.id, task.id, bad).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let patch: TaskPatch = serde_json::from_value(serde_json::json!({
        "status": "In Progress",
        "assignee": null,
        "dueDate": null,
        "description": null,
    }))
    .unwrap();
    let updated = h.services.tasks.update(m.id, task.id, patch).await.unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert!(updated.assignee.is_none());
    assert!(updated.due_date.is_none());
    assert_eq!(updated.description, "");
    assert_eq!(updated.title, "Write docs");
}

#[tokio::test]
async fn cross_project_reorder_fails_and_mutates_nothing() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let p1 = h.project(&owner, "One", &[]).await;
    let p2 = h.project(&owner, "Two", &[]).await;
    let t1 = h.task(&owner, p1.id, "a").await;
    let t2 = h.task(&owner, p2.id, "b").await;

    let err = h
        .services
        .tasks
        .reorder(
            owner.id,
            vec![
                ReorderEntry { id: t1.id, order: 2.0, status: None },
                ReorderEntry { id: t2.id, order: 1.0, status: None },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let a = h.services.tasks.list_by_project(owner.id, p1.id).await.unwrap();
    let b = h.services.tasks.list_by_project(owner.id, p2.id).await.unwrap();
    assert_eq!(a[0].order, 0.0);
    assert_eq!(b[0].order, 0.0);
}

#[tokio::test]
async fn reorder_applies_positions_and_statuses() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let m = h.member("Mia").await;
    let project = h.project(&owner, "Board", &[&m]).await;
    let a = h.task(&owner, project.id, "a").await;
    let b = h.task(&owner, project.id, "b").await;

    h.services
        .tasks
        .reorder(
            m.id,
            vec![
                ReorderEntry { id: a.id, order: 5.0, status: Some("Done".into()) },
                ReorderEntry { id: b.id, order: 0.5, status: None },
            ],
        )
        .await
        .unwrap();

    let tasks = h.services.tasks.list_by_project(m.id, project.id).await.unwrap();
    let a = tasks.iter().find(|t| t.id == a.id).unwrap();
    let b = tasks.iter().find(|t| t.id == b.id).unwrap();
    assert_eq!(a.order, 5.0);
    assert_eq!(a.status, TaskStatus::Done);
    assert_eq!(b.order, 0.5);
    assert_eq!(b.status, TaskStatus::ToDo);
}

#[tokio::test]
async fn reorder_rejects_empty_unknown_and_foreign_batches() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let stranger = h.member("Sam").await;
    let project = h.project(&owner, "Board", &[]).await;
    let a = h.task(&owner, project.id, "a").await;

    let err = h.services.tasks.reorder(owner.id, vec![]).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let unknown = ReorderEntry { id: domains::TaskId::new(), order: 1.0, status: None };
    let err = h
        .services
        .tasks
        .reorder(owner.id, vec![unknown])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let entry = ReorderEntry { id: a.id, order: 3.0, status: None };
    let err = h
        .services
        .tasks
        .reorder(stranger.id, vec![entry])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn list_all_spans_every_project_of_the_user() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let m = h.member("Mia").await;
    let shared = h.project(&owner, "Shared", &[&m]).await;
    let private = h.project(&owner, "Private", &[]).await;
    h.task(&owner, shared.id, "s").await;
    h.task(&owner, private.id, "p").await;

    assert_eq!(h.services.tasks.list_all_for_user(owner.id).await.unwrap().len(), 2);
    let mine = h.services.tasks.list_all_for_user(m.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "s");
}

#[tokio::test]
async fn update_requires_a_member_assignee() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let m = h.member("Mia").await;
    let outsider = h.member("Otto").await;
    let project = h.project(&owner, "Roadmap", &[&m]).await;
    let task = h.task(&owner, project.id, "one").await;

    let patch = TaskPatch {
        assignee: Some(Some(outsider.id)),
        ..Default::default()
    };
    let err = h.services.tasks.update(owner.id, task.id, patch).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let listed = h.services.tasks.list_by_project(owner.id, project.id).await.unwrap();
    assert!(listed[0].assignee.is_none());

    let patch = TaskPatch {
        assignee: Some(Some(m.id)),
        ..Default::default()
    };
    let updated = h.services.tasks.update(owner.id, task.id, patch).await.unwrap();
    assert_eq!(updated.assignee.map(|u| u.id), Some(m.id));
}

#[tokio::test]
async fn strangers_cannot_update_tasks() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let stranger = h.member("Sam").await;
    let project = h.project(&owner, "Roadmap", &[]).await;
    let task = h.task(&owner, project.id, "one").await;

    let patch = TaskPatch {
        title: Some("taken over".into()),
        ..Default::default()
    };
    let err = h.services.tasks.update(stranger.id, task.id, patch).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let listed = h.services.tasks.list_by_project(owner.id, project.id).await.unwrap();
    assert_eq!(listed[0].title, "one");
}

#[tokio::test]
async fn empty_strings_clear_assignee_and_due_date() {
    let h = Harness::new();
    let owner = h.owner("Olive").await;
    let m = h.member("Mia").await;
    let project = h.project(&owner, "Roadmap", &[&m]).await;
    let task = h
        .services
        .tasks
        .create(
            owner.id,
            NewTask {
                assignee: Some(m.id),
                due_date: Some("2030-01-15".into()),
                ..new_task(project.id, "Plan")
            },
        )
        .await
        .unwrap();

    let patch: TaskPatch =
        serde_json::from_value(serde_json::json!({ "assignee": "", "dueDate": "" })).unwrap();
    let updated = h.services.tasks.update(owner.id, task.id, patch).await.unwrap();
    assert!(updated.assignee.is_none());
    assert!(updated.due_date.is_none());
}
