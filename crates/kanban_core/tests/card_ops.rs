use kanban_core::db::open_db_in_memory;
use kanban_core::{
    BoardWithColumns, CardPatch, ColumnId, HierarchyRepository, NewCard, Priority,
    SqliteKanbanRepository,
};
use rusqlite::Connection;
use serde_json::json;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn new_board(repo: &SqliteKanbanRepository<'_>) -> BoardWithColumns {
    repo.create_board("Board", None).unwrap()
}

fn card_titles(repo: &SqliteKanbanRepository<'_>, column_id: ColumnId) -> Vec<(String, u32)> {
    repo.list_cards(column_id)
        .unwrap()
        .into_iter()
        .map(|card| (card.title, card.position))
        .collect()
}

#[test]
fn create_card_defaults_to_medium_priority() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);

    let card = repo
        .create_card(board.columns[0].id, &NewCard::new("Write docs"))
        .unwrap()
        .unwrap();

    assert_eq!(card.title, "Write docs");
    assert_eq!(card.priority, Priority::Medium);
    assert_eq!(card.position, 0);
    assert_eq!(card.column_id, board.columns[0].id);
    assert_eq!(card.description, None);
    assert_eq!(card.assignee, None);
    assert_eq!(card.due_date, None);
}

#[test]
fn create_card_persists_optional_fields() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);

    let input = NewCard {
        title: "Implement login".to_string(),
        description: Some("Authentication flow".to_string()),
        assignee: Some("Joao".to_string()),
        due_date: Some(1_735_603_200_000),
        priority: Priority::High,
    };
    let card = repo
        .create_card(board.columns[0].id, &input)
        .unwrap()
        .unwrap();

    let loaded = repo.get_card(card.id).unwrap().unwrap();
    assert_eq!(loaded, card);
    assert_eq!(loaded.description.as_deref(), Some("Authentication flow"));
    assert_eq!(loaded.assignee.as_deref(), Some("Joao"));
    assert_eq!(loaded.due_date, Some(1_735_603_200_000));
    assert_eq!(loaded.priority, Priority::High);
}

#[test]
fn create_card_returns_none_for_missing_column() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    assert!(repo
        .create_card(1234, &NewCard::new("Lost"))
        .unwrap()
        .is_none());
}

#[test]
fn sequential_creates_assign_consecutive_positions() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);
    let column_id = board.columns[0].id;

    for title in ["a", "b"] {
        repo.create_card(column_id, &NewCard::new(title)).unwrap();
    }

    let positions: Vec<u32> = ["c", "d", "e"]
        .into_iter()
        .map(|title| {
            repo.create_card(column_id, &NewCard::new(title))
                .unwrap()
                .unwrap()
                .position
        })
        .collect();
    assert_eq!(positions, vec![2, 3, 4]);
}

#[test]
fn update_card_applies_recognized_fields_and_ignores_unknown_keys() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);
    let card = repo
        .create_card(board.columns[0].id, &NewCard::new("Draft"))
        .unwrap()
        .unwrap();

    let patch = CardPatch::from_json(json!({
        "title": "Ready",
        "priority": "low",
        "assignee": "Maria",
        "description": null,
        "position": 9,
        "column_id": board.columns[2].id,
        "unknown": true,
    }))
    .unwrap();
    let updated = repo.update_card(card.id, &patch).unwrap().unwrap();

    assert_eq!(updated.title, "Ready");
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.assignee.as_deref(), Some("Maria"));
    assert_eq!(updated.description, None);
    assert_eq!(updated.position, 0);
    assert_eq!(updated.column_id, board.columns[0].id);
    assert_eq!(updated.external_id, card.external_id);
    assert!(updated.updated_at >= card.updated_at);
}

#[test]
fn update_card_with_empty_patch_only_refreshes_timestamp() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);
    let card = repo
        .create_card(board.columns[0].id, &NewCard::new("Same"))
        .unwrap()
        .unwrap();

    let updated = repo
        .update_card(card.id, &CardPatch::default())
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, card.title);
    assert_eq!(updated.priority, card.priority);
    assert!(updated.updated_at >= card.updated_at);
}

#[test]
fn update_card_returns_none_for_missing_card() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let patch = CardPatch {
        title: Some("Ghost".to_string()),
        ..CardPatch::default()
    };
    assert!(repo.update_card(55, &patch).unwrap().is_none());
}

#[test]
fn move_card_without_position_appends_to_target() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);
    let (todo, doing) = (board.columns[0].id, board.columns[1].id);

    let first = repo.create_card(todo, &NewCard::new("first")).unwrap().unwrap();
    repo.create_card(todo, &NewCard::new("second")).unwrap();
    repo.create_card(doing, &NewCard::new("busy")).unwrap();

    let moved = repo.move_card(first.id, doing, None).unwrap().unwrap();
    assert_eq!(moved.column_id, doing);
    assert_eq!(moved.position, 1);
    assert!(moved.updated_at >= first.updated_at);

    assert_eq!(card_titles(&repo, todo), vec![("second".to_string(), 0)]);
    assert_eq!(
        card_titles(&repo, doing),
        vec![("busy".to_string(), 0), ("first".to_string(), 1)]
    );
}

#[test]
fn move_card_with_position_inserts_and_resequences_target() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);
    let (todo, done) = (board.columns[0].id, board.columns[2].id);

    let card = repo.create_card(todo, &NewCard::new("mover")).unwrap().unwrap();
    for title in ["x", "y", "z"] {
        repo.create_card(done, &NewCard::new(title)).unwrap();
    }

    let moved = repo.move_card(card.id, done, Some(1)).unwrap().unwrap();
    assert_eq!(moved.position, 1);
    assert_eq!(
        card_titles(&repo, done),
        vec![
            ("x".to_string(), 0),
            ("mover".to_string(), 1),
            ("y".to_string(), 2),
            ("z".to_string(), 3),
        ]
    );
    assert!(card_titles(&repo, todo).is_empty());
}

#[test]
fn move_card_within_same_column_reorders() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);
    let todo = board.columns[0].id;

    repo.create_card(todo, &NewCard::new("a")).unwrap();
    repo.create_card(todo, &NewCard::new("b")).unwrap();
    let c = repo.create_card(todo, &NewCard::new("c")).unwrap().unwrap();

    let moved = repo.move_card(c.id, todo, Some(0)).unwrap().unwrap();
    assert_eq!(moved.position, 0);
    assert_eq!(
        card_titles(&repo, todo),
        vec![
            ("c".to_string(), 0),
            ("a".to_string(), 1),
            ("b".to_string(), 2),
        ]
    );
}

#[test]
fn move_card_returns_none_when_card_or_target_missing() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);
    let card = repo
        .create_card(board.columns[0].id, &NewCard::new("stay"))
        .unwrap()
        .unwrap();

    assert!(repo.move_card(card.id, 9999, None).unwrap().is_none());
    assert!(repo
        .move_card(9999, board.columns[1].id, None)
        .unwrap()
        .is_none());

    let unchanged = repo.get_card(card.id).unwrap().unwrap();
    assert_eq!(unchanged.column_id, board.columns[0].id);
    assert_eq!(unchanged.position, 0);
}

#[test]
fn move_card_to_column_of_deleted_board_is_rejected() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let live = new_board(&repo);
    let archived = new_board(&repo);
    repo.delete_board(archived.board.id).unwrap();

    let card = repo
        .create_card(live.columns[0].id, &NewCard::new("stay"))
        .unwrap()
        .unwrap();
    assert!(repo
        .move_card(card.id, archived.columns[0].id, None)
        .unwrap()
        .is_none());
}

#[test]
fn delete_card_removes_row_and_closes_gap() {
    let conn = setup();
    let repo = SqliteKanbanRepository::try_new(&conn).unwrap();
    let board = new_board(&repo);
    let todo = board.columns[0].id;

    repo.create_card(todo, &NewCard::new("a")).unwrap();
    let b = repo.create_card(todo, &NewCard::new("b")).unwrap().unwrap();
    repo.create_card(todo, &NewCard::new("c")).unwrap();

    assert!(repo.delete_card(b.id).unwrap());
    assert!(!repo.delete_card(b.id).unwrap());
    assert!(repo.get_card(b.id).unwrap().is_none());

    assert_eq!(
        card_titles(&repo, todo),
        vec![("a".to_string(), 0), ("c".to_string(), 1)]
    );

    let appended = repo.create_card(todo, &NewCard::new("d")).unwrap().unwrap();
    assert_eq!(appended.position, 2);
}
