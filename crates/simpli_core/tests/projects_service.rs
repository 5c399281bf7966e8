use simpli_core::db::open_db_in_memory;
use simpli_core::{
    now_epoch_ms, ItemPriority, PriorityPolicy, ProjectColor, ProjectsService, Rgba,
    ServiceConfig, ServiceError, SqliteStore, DEFAULT_ITEM_TITLE, DEFAULT_PROJECT_TITLE,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> ProjectsService<SqliteStore<'_>> {
    service_with(conn, ServiceConfig::default())
}

fn service_with(conn: &Connection, config: ServiceConfig) -> ProjectsService<SqliteStore<'_>> {
    ProjectsService::new(SqliteStore::try_new(conn).unwrap(), config)
}

#[test]
fn new_service_publishes_empty_snapshots_for_empty_store() {
    let conn = setup();
    let service = service(&conn);

    assert!(service.projects().is_empty());
    assert!(service.hot_items().is_empty());
}

#[test]
fn create_project_uses_defaults_and_is_listed() {
    let conn = setup();
    let mut service = service(&conn);

    let before = now_epoch_ms();
    let id = service.create_project().unwrap();

    let projects = service.list_projects().unwrap();
    assert_eq!(projects.len(), 1);
    let overview = &projects[0];
    assert_eq!(overview.project.id, id);
    assert_eq!(overview.project.title, DEFAULT_PROJECT_TITLE);
    assert!(!overview.project.closed);
    assert!(overview.project.date_created >= before);
    assert_eq!(overview.project.color, ProjectColor::DEFAULT.rgba());
    assert!(overview.items.is_empty());
    assert_eq!(overview.completion_status, 0.0);

    assert_eq!(service.projects(), projects.as_slice());
}

#[test]
fn create_item_links_back_to_project_with_valid_priority() {
    let conn = setup();
    let mut service = service(&conn);

    let project_id = service.create_project().unwrap();
    let item_id = service.create_item(project_id).unwrap();

    let item = service.get_item(item_id).unwrap().unwrap();
    assert_eq!(item.project_id, project_id);
    assert_eq!(item.title, DEFAULT_ITEM_TITLE);
    assert!(!item.completed);
    assert!((0..=2).contains(&item.priority.as_raw()));
    assert_eq!(item.completion_date, None);

    let overview = &service.projects()[0];
    assert_eq!(overview.items.len(), 1);
    assert_eq!(overview.items[0].id, item_id);
}

#[test]
fn fixed_priority_policy_is_applied_to_new_items() {
    let conn = setup();
    let config = ServiceConfig::default()
        .with_priority_policy(PriorityPolicy::Fixed(ItemPriority::Medium));
    let mut service = service_with(&conn, config);

    let project_id = service.create_project().unwrap();
    for _ in 0..5 {
        let item_id = service.create_item(project_id).unwrap();
        let item = service.get_item(item_id).unwrap().unwrap();
        assert_eq!(item.priority, ItemPriority::Medium);
    }
}

#[test]
fn create_item_for_missing_project_is_a_no_op() {
    let conn = setup();
    let mut service = service(&conn);
    service.create_project().unwrap();
    let snapshot = service.projects().to_vec();

    let missing = Uuid::new_v4();
    let err = service.create_item(missing).unwrap_err();

    assert!(matches!(err, ServiceError::ProjectNotFound(id) if id == missing));
    assert_eq!(service.list_projects().unwrap(), snapshot);
    assert!(service.hot_items().is_empty());
}

#[test]
fn delete_project_twice_second_call_is_a_no_op() {
    let conn = setup();
    let mut service = service(&conn);

    let keep = service.create_project().unwrap();
    let doomed = service.create_project().unwrap();

    service.delete_project(doomed).unwrap();
    let ids: Vec<_> = service.projects().iter().map(|p| p.project.id).collect();
    assert_eq!(ids, vec![keep]);

    let err = service.delete_project(doomed).unwrap_err();
    assert!(matches!(err, ServiceError::ProjectNotFound(id) if id == doomed));
    let ids_after: Vec<_> = service
        .list_projects()
        .unwrap()
        .iter()
        .map(|p| p.project.id)
        .collect();
    assert_eq!(ids_after, vec![keep]);
}

#[test]
fn delete_project_removes_its_items_and_hot_items() {
    let conn = setup();
    let mut service = service(&conn);

    let home = service.create_project().unwrap();
    let work = service.create_project().unwrap();
    let home_item = service.create_item(home).unwrap();
    let work_item = service.create_item(work).unwrap();

    let removed = service.delete_project(home).unwrap();

    assert_eq!(removed, 1);
    assert!(service.get_item(home_item).unwrap().is_none());
    let hot_ids: Vec<_> = service.hot_items().iter().map(|hot| hot.item.id).collect();
    assert_eq!(hot_ids, vec![work_item]);
}

#[test]
fn delete_item_removes_it_and_stale_id_is_not_found() {
    let conn = setup();
    let mut service = service(&conn);

    let project_id = service.create_project().unwrap();
    let item_id = service.create_item(project_id).unwrap();

    service.delete_item(item_id).unwrap();
    assert!(service.projects()[0].items.is_empty());

    let err = service.delete_item(item_id).unwrap_err();
    assert!(matches!(err, ServiceError::ItemNotFound(id) if id == item_id));
}

#[test]
fn toggle_flips_completion_and_leaves_completion_date_untouched() {
    let conn = setup();
    let mut service = service(&conn);

    let project_id = service.create_project().unwrap();
    let item_id = service.create_item(project_id).unwrap();

    assert!(service.toggle_item_completion(item_id).unwrap());
    let toggled = service.get_item(item_id).unwrap().unwrap();
    assert!(toggled.completed);
    assert_eq!(toggled.completion_date, None);

    assert!(!service.toggle_item_completion(item_id).unwrap());
    let restored = service.get_item(item_id).unwrap().unwrap();
    assert!(!restored.completed);
    assert_eq!(restored.completion_date, None);
}

#[test]
fn toggle_missing_item_returns_not_found() {
    let conn = setup();
    let mut service = service(&conn);

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.toggle_item_completion(missing),
        Err(ServiceError::ItemNotFound(id)) if id == missing
    ));
}

#[test]
fn update_item_stamps_completion_date_only_on_flag_change() {
    let conn = setup();
    let mut service = service(&conn);

    let project_id = service.create_project().unwrap();
    let item_id = service.create_item(project_id).unwrap();

    let call_time = now_epoch_ms();
    service
        .update_item(item_id, "X", ItemPriority::High, true)
        .unwrap();
    let updated = service.get_item(item_id).unwrap().unwrap();
    assert_eq!(updated.title, "X");
    assert_eq!(updated.priority, ItemPriority::High);
    assert!(updated.completed);
    let stamped = updated.completion_date.expect("completion date should be set");
    assert!(stamped >= call_time);

    service
        .update_item(item_id, "Y", ItemPriority::Low, true)
        .unwrap();
    let unchanged_flag = service.get_item(item_id).unwrap().unwrap();
    assert_eq!(unchanged_flag.title, "Y");
    assert_eq!(unchanged_flag.priority, ItemPriority::Low);
    assert_eq!(unchanged_flag.completion_date, Some(stamped));
}

#[test]
fn update_item_reopening_also_stamps_completion_date() {
    let conn = setup();
    let mut service = service(&conn);

    let project_id = service.create_project().unwrap();
    let item_id = service.create_item(project_id).unwrap();
    service.toggle_item_completion(item_id).unwrap();

    let call_time = now_epoch_ms();
    service
        .update_item(item_id, "again", ItemPriority::Low, false)
        .unwrap();

    let reopened = service.get_item(item_id).unwrap().unwrap();
    assert!(!reopened.completed);
    assert!(reopened.completion_date.unwrap() >= call_time);
}

#[test]
fn update_project_overwrites_title_closed_and_color() {
    let conn = setup();
    let mut service = service(&conn);

    let id = service.create_project().unwrap();
    let created = service.get_project(id).unwrap().unwrap();

    service
        .update_project(id, "Renovation", true, ProjectColor::Green.rgba())
        .unwrap();

    let updated = &service.projects()[0].project;
    assert_eq!(updated.title, "Renovation");
    assert!(updated.closed);
    assert_eq!(updated.color, ProjectColor::Green.rgba());
    assert_eq!(updated.date_created, created.date_created);
}

#[test]
fn update_project_rejects_invalid_color_and_missing_project() {
    let conn = setup();
    let mut service = service(&conn);
    let id = service.create_project().unwrap();

    let bad = Rgba {
        red: 2.0,
        green: 0.0,
        blue: 0.0,
        alpha: 1.0,
    };
    assert!(matches!(
        service.update_project(id, "x", false, bad),
        Err(ServiceError::InvalidColor(_))
    ));
    assert_eq!(service.projects()[0].project.title, DEFAULT_PROJECT_TITLE);

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.update_project(missing, "x", false, ProjectColor::Red.rgba()),
        Err(ServiceError::ProjectNotFound(_))
    ));
}

#[test]
fn hot_items_are_capped_and_never_completed() {
    let conn = setup();
    let mut service = service(&conn);

    let first = service.create_project().unwrap();
    let second = service.create_project().unwrap();
    let mut item_ids = Vec::new();
    for index in 0..14 {
        let project = if index % 2 == 0 { first } else { second };
        item_ids.push(service.create_item(project).unwrap());
    }
    for id in item_ids.iter().take(3) {
        service.toggle_item_completion(*id).unwrap();
    }

    let hot = service.list_hot_items().unwrap();
    assert_eq!(hot.len(), 10);
    assert!(hot.iter().all(|entry| !entry.item.completed));
    assert_eq!(service.hot_items(), hot.as_slice());

    let expected: Vec<_> = item_ids[3..13].to_vec();
    let actual: Vec<_> = hot.iter().map(|entry| entry.item.id).collect();
    assert_eq!(actual, expected);
}

#[test]
fn hot_items_carry_project_color_and_respect_configured_limit() {
    let conn = setup();
    let mut service = service_with(&conn, ServiceConfig::default().with_hot_items_limit(2));

    let project_id = service.create_project().unwrap();
    service
        .update_project(project_id, "Blue", false, ProjectColor::Blue.rgba())
        .unwrap();
    for _ in 0..4 {
        service.create_item(project_id).unwrap();
    }

    let hot = service.hot_items();
    assert_eq!(hot.len(), 2);
    assert!(hot
        .iter()
        .all(|entry| entry.project_color == Some(ProjectColor::Blue.rgba())));
}

#[test]
fn completing_item_moves_it_out_of_hot_items_and_updates_progress() {
    let conn = setup();
    let mut service = service(&conn);

    let project_id = service.create_project().unwrap();
    let done = service.create_item(project_id).unwrap();
    service.create_item(project_id).unwrap();

    service.toggle_item_completion(done).unwrap();

    assert!(service.hot_items().iter().all(|entry| entry.item.id != done));
    assert!((service.projects()[0].completion_status - 0.5).abs() < f32::EPSILON);
}

#[test]
fn every_mutation_notifies_both_channels_once_and_misses_notify_none() {
    let conn = setup();
    let mut service = service(&conn);

    let project_calls = Rc::new(RefCell::new(Vec::new()));
    let hot_calls = Rc::new(RefCell::new(0_usize));
    let project_sink = Rc::clone(&project_calls);
    service.subscribe_projects(move |projects| project_sink.borrow_mut().push(projects.len()));
    let hot_sink = Rc::clone(&hot_calls);
    service.subscribe_hot_items(move |_| *hot_sink.borrow_mut() += 1);

    let project_id = service.create_project().unwrap();
    let item_id = service.create_item(project_id).unwrap();
    service.toggle_item_completion(item_id).unwrap();
    service
        .update_item(item_id, "t", ItemPriority::Low, false)
        .unwrap();
    service
        .update_project(project_id, "p", false, ProjectColor::Red.rgba())
        .unwrap();
    service.delete_item(item_id).unwrap();
    service.delete_project(project_id).unwrap();

    assert_eq!(*project_calls.borrow(), vec![1, 1, 1, 1, 1, 1, 0]);
    assert_eq!(*hot_calls.borrow(), 7);

    let _ = service.delete_project(project_id);
    let _ = service.toggle_item_completion(item_id);
    assert_eq!(project_calls.borrow().len(), 7);
    assert_eq!(*hot_calls.borrow(), 7);
}

#[test]
fn unsubscribed_listener_stops_receiving_snapshots() {
    let conn = setup();
    let mut service = service(&conn);

    let calls = Rc::new(RefCell::new(0_usize));
    let sink = Rc::clone(&calls);
    let id = service.subscribe_projects(move |_| *sink.borrow_mut() += 1);

    service.create_project().unwrap();
    assert!(service.unsubscribe_projects(id));
    service.create_project().unwrap();

    assert_eq!(*calls.borrow(), 1);
    assert!(!service.unsubscribe_hot_items(id));
}

#[test]
fn failed_snapshot_fetch_publishes_empty_list() {
    let conn = setup();
    let mut service = service(&conn);
    let project_id = service.create_project().unwrap();
    assert_eq!(service.projects().len(), 1);

    conn.execute(
        "UPDATE projects SET color = x'00' WHERE uuid = ?1;",
        [project_id.to_string()],
    )
    .unwrap();
    service.refresh();

    assert!(service.projects().is_empty());
    assert!(matches!(service.list_projects(), Err(ServiceError::Repo(_))));
}

#[test]
fn failed_cascade_delete_rolls_back_republishes_and_errs() {
    let conn = setup();
    let mut service = service(&conn);
    let project_id = service.create_project().unwrap();
    let item_id = service.create_item(project_id).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_project_delete BEFORE DELETE ON projects
         BEGIN
             SELECT RAISE(ABORT, 'project delete rejected');
         END;",
    )
    .unwrap();

    let calls = Rc::new(RefCell::new(0_usize));
    let sink = Rc::clone(&calls);
    service.subscribe_projects(move |_| *sink.borrow_mut() += 1);

    let err = service.delete_project(project_id).unwrap_err();

    assert!(matches!(err, ServiceError::Repo(_)), "unexpected error: {err}");
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(service.projects().len(), 1);
    assert_eq!(service.projects()[0].items.len(), 1);
    assert!(service.get_project(project_id).unwrap().is_some());
    assert!(service.get_item(item_id).unwrap().is_some());
}

#[test]
fn service_state_survives_reopening_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simpli.db");

    let project_id = {
        let conn = simpli_core::db::open_db(&path).unwrap();
        let mut service = service(&conn);
        let id = service.create_project().unwrap();
        service.create_item(id).unwrap();
        id
    };

    let conn = simpli_core::db::open_db(&path).unwrap();
    let service = service(&conn);
    assert_eq!(service.projects().len(), 1);
    assert_eq!(service.projects()[0].project.id, project_id);
    assert_eq!(service.projects()[0].items.len(), 1);
}
