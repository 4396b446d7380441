//! CRUD checks every `Store` implementation must pass.

use super::Store;
use crate::model::{Note, NoteChanges, NoteInput, Priority, Task, TaskChanges, TaskInput};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Expects an empty note store.
pub(crate) async fn check_note_store<S: Store<Item = Note>>(store: S) {
    let created = store
        .create(NoteInput {
            title: "Trip plans".to_string(),
            content: "<p>Pack light</p>".to_string(),
            folder: "Travel".to_string(),
            tags: strings(&["summer", "x,y"]),
        })
        .await
        .expect("create note");
    assert_eq!(created.title, "Trip plans");
    assert_eq!(created.content, "<p>Pack light</p>");
    assert_eq!(created.folder, "Travel");
    assert_eq!(created.tags, vec!["summer", "x,y"]);
    assert!(!created.is_pinned);
    assert!(created.shared_with.is_empty());
    assert_eq!(store.get(created.id).await.expect("get note"), created);

    let second = store
        .create(NoteInput::default())
        .await
        .expect("create second note");
    assert_ne!(second.id, created.id);
    let ids: Vec<i64> = store
        .list()
        .await
        .expect("list notes")
        .iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(ids, vec![second.id, created.id]);

    let updated = store
        .update(
            created.id,
            NoteChanges {
                is_pinned: Some(true),
                shared_with: Some(strings(&["a,b@example.com", "c@example.com"])),
                ..Default::default()
            },
        )
        .await
        .expect("update note");
    assert!(updated.is_pinned);
    assert_eq!(updated.shared_with, vec!["a,b@example.com", "c@example.com"]);
    assert_eq!(updated.tags, vec!["summer", "x,y"]);
    assert_eq!(updated.title, "Trip plans");
    assert_eq!(store.get(created.id).await.expect("get updated"), updated);

    let removed = store.delete(created.id).await.expect("delete note");
    assert_eq!(removed, updated);
    assert!(store
        .get(created.id)
        .await
        .expect_err("deleted note is gone")
        .is_not_found());
    assert!(store
        .update(created.id, NoteChanges::default())
        .await
        .expect_err("update after delete")
        .is_not_found());
    assert!(store
        .delete(created.id)
        .await
        .expect_err("second delete")
        .is_not_found());
    assert_eq!(store.list().await.expect("list after delete").len(), 1);
}

/// Expects an empty task store.
pub(crate) async fn check_task_store<S: Store<Item = Task>>(store: S) {
    let mut input = TaskInput::new("Buy tiles");
    input.priority = Priority::High;
    input.tags = strings(&["home", "kitchen,bath"]);
    let created = store.create(input).await.expect("create task");
    assert_eq!(created.title, "Buy tiles");
    assert_eq!(created.priority, Priority::High);
    assert_eq!(created.tags, vec!["home", "kitchen,bath"]);
    assert!(!created.completed);
    assert_eq!(store.get(created.id).await.expect("get task"), created);

    let updated = store
        .update(
            created.id,
            TaskChanges {
                completed: Some(true),
                tags: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .expect("update task");
    assert!(updated.completed);
    assert!(updated.tags.is_empty());
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(store.get(created.id).await.expect("get updated"), updated);

    assert_eq!(store.delete(created.id).await.expect("delete"), updated);
    assert!(store.list().await.expect("list").is_empty());
    assert!(store
        .get(created.id)
        .await
        .expect_err("deleted task is gone")
        .is_not_found());
}
