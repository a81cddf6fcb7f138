use kanban_core::db::open_db_in_memory;
use kanban_core::{
    BoardPosition, ContributorRepository, NewProject, ProjectService, SqliteContributorRepository,
    SqliteProjectRepository, SqliteTaskRepository, Task, TaskRepository,
};
use rusqlite::Connection;

struct Board<'conn> {
    service: ProjectService<SqliteProjectRepository<'conn>>,
    tasks: SqliteTaskRepository<'conn>,
    project_id: i64,
}

impl Board<'_> {
    fn add(&self, position: BoardPosition, contributors: &[i64], points: Option<u32>) -> i64 {
        let task = Task::new("card", position)
            .with_points(points)
            .with_contributors(contributors);
        self.tasks.create_task(self.project_id, &task).unwrap()
    }

    fn ranking(&self) -> Vec<(i64, f64)> {
        self.service
            .contributors_scores(self.project_id)
            .unwrap()
            .into_iter()
            .map(|entry| (entry.contributor_id, entry.score.as_f64()))
            .collect()
    }
}

fn contributors(conn: &Connection, names: &[&str]) -> Vec<i64> {
    let repo = SqliteContributorRepository::try_new(conn).unwrap();
    names
        .iter()
        .map(|name| repo.create_contributor(name).unwrap().id)
        .collect()
}

fn board(conn: &Connection, owner: i64, contributor_ids: Vec<i64>) -> Board<'_> {
    let service = ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap());
    let project = service
        .create_project(&NewProject {
            name: Some("kanban-roots".to_string()),
            owner_id: Some(owner),
            contributor_ids,
        })
        .unwrap();
    Board {
        service,
        tasks: SqliteTaskRepository::try_new(conn).unwrap(),
        project_id: project.id,
    }
}

#[test]
fn contributors_scores_are_ordered_by_score() {
    let conn = open_db_in_memory().unwrap();
    let ids = contributors(&conn, &["Dudu", "Max", "Hugo"]);
    let (dudu, max, hugo) = (ids[0], ids[1], ids[2]);
    let board = board(&conn, hugo, vec![dudu, max]);

    board.add(BoardPosition::Doing, &[dudu], Some(13));
    board.add(BoardPosition::Todo, &[hugo], Some(5));
    board.add(BoardPosition::Backlog, &[max], Some(8));
    board.add(BoardPosition::Out, &[dudu, hugo, max], Some(1));

    board.add(BoardPosition::Done, &[dudu], Some(1));
    board.add(BoardPosition::Done, &[hugo, dudu], Some(3));
    board.add(BoardPosition::Done, &[max], Some(2));
    board.add(BoardPosition::Done, &[hugo], Some(5));
    board.add(BoardPosition::Done, &[dudu, max], Some(3));

    assert_eq!(board.ranking(), vec![(hugo, 8.0), (dudu, 7.0), (max, 5.0)]);

    board.add(BoardPosition::Done, &[max], Some(13));
    assert_eq!(board.ranking(), vec![(max, 18.0), (hugo, 8.0), (dudu, 7.0)]);
}

#[test]
fn contributors_scores_ignore_tasks_without_points() {
    let conn = open_db_in_memory().unwrap();
    let hugo = contributors(&conn, &["Hugo"])[0];
    let board = board(&conn, hugo, Vec::new());

    board.add(BoardPosition::Done, &[hugo], None);
    board.add(BoardPosition::Done, &[hugo], Some(3));

    assert_eq!(board.ranking(), vec![(hugo, 3.0)]);
}

#[test]
fn contributors_scores_credit_one_tenth_for_zero_point_tasks() {
    let conn = open_db_in_memory().unwrap();
    let ids = contributors(&conn, &["Owner", "Hugo"]);
    let board = board(&conn, ids[0], vec![ids[1]]);
    let hugo = ids[1];

    board.add(BoardPosition::Done, &[hugo], Some(0));
    board.add(BoardPosition::Done, &[hugo], Some(3));
    assert_eq!(board.ranking()[0].1, 3.1);

    board.add(BoardPosition::Done, &[hugo], Some(0));
    assert_eq!(board.ranking()[0].1, 3.2);
}

#[test]
fn clean_up_moves_done_tasks_out_and_persists_positions() {
    let conn = open_db_in_memory().unwrap();
    let owner = contributors(&conn, &["Hugo"])[0];
    let board = board(&conn, owner, Vec::new());

    let doing = board.add(BoardPosition::Doing, &[], None);
    let done: Vec<i64> = (0..4)
        .map(|_| board.add(BoardPosition::Done, &[], None))
        .collect();

    assert_eq!(board.service.clean_up_done_tasks(board.project_id).unwrap(), 4);

    let project = board.service.get_project(board.project_id).unwrap().unwrap();
    assert!(project.tasks_by_position(BoardPosition::Done).is_empty());
    let out: Vec<i64> = project
        .tasks_by_position(BoardPosition::Out)
        .iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(out, done);
    assert_eq!(
        board.tasks.get_task(doing).unwrap().unwrap().position,
        BoardPosition::Doing
    );

    assert_eq!(board.service.clean_up_done_tasks(board.project_id).unwrap(), 0);
}

#[test]
fn clean_up_only_touches_done_tasks_on_a_mixed_board() {
    let conn = open_db_in_memory().unwrap();
    let owner = contributors(&conn, &["Hugo"])[0];
    let board = board(&conn, owner, Vec::new());

    let mut expected = Vec::new();
    for index in 0..60 {
        let position = BoardPosition::ALL[index % BoardPosition::ALL.len()];
        let id = board.add(position, &[], Some(1));
        let after = if position == BoardPosition::Done {
            BoardPosition::Out
        } else {
            position
        };
        expected.push((id, after));
    }

    assert_eq!(board.service.clean_up_done_tasks(board.project_id).unwrap(), 12);

    for (id, position) in expected {
        assert_eq!(board.tasks.get_task(id).unwrap().unwrap().position, position);
    }
}

#[test]
fn board_summary_counts_tasks_and_points_per_column() {
    let conn = open_db_in_memory().unwrap();
    let owner = contributors(&conn, &["Hugo"])[0];
    let board = board(&conn, owner, Vec::new());

    board.add(BoardPosition::Doing, &[], Some(1));
    board.add(BoardPosition::Doing, &[], Some(2));
    board.add(BoardPosition::Todo, &[], Some(8));
    board.add(BoardPosition::Todo, &[], None);
    board.add(BoardPosition::Doing, &[], Some(3));
    board.add(BoardPosition::Todo, &[], Some(5));

    let summary = board.service.board_summary(board.project_id).unwrap();
    let todo = summary.column(BoardPosition::Todo).unwrap();
    assert_eq!((todo.task_count, todo.points), (3, 13));
    let doing = summary.column(BoardPosition::Doing).unwrap();
    assert_eq!((doing.task_count, doing.points), (3, 6));
    let done = summary.column(BoardPosition::Done).unwrap();
    assert_eq!((done.task_count, done.points), (0, 0));

    let project = board.service.get_project(board.project_id).unwrap().unwrap();
    assert_eq!(project.count_points(BoardPosition::Todo), 13);
    assert_eq!(project.tasks_by_position(BoardPosition::Todo).len(), 3);
}

#[test]
fn update_task_replaces_points_position_and_credits() {
    let conn = open_db_in_memory().unwrap();
    let ids = contributors(&conn, &["Hugo", "Rodrigo"]);
    let board = board(&conn, ids[0], Vec::new());

    let id = board.add(BoardPosition::Todo, &[ids[0]], None);
    let mut task = board.tasks.get_task(id).unwrap().unwrap();
    task.points = Some(5);
    task.position = BoardPosition::Done;
    task.contributor_ids = vec![ids[1], ids[0]];
    board.tasks.update_task(&task).unwrap();

    assert_eq!(board.tasks.get_task(id).unwrap().unwrap(), task);
    assert_eq!(board.ranking(), vec![(ids[1], 5.0), (ids[0], 5.0)]);
}

#[test]
fn invalid_persisted_position_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let owner = contributors(&conn, &["Hugo"])[0];
    let board = board(&conn, owner, Vec::new());
    let id = board.add(BoardPosition::Todo, &[], None);

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute("UPDATE tasks SET position = 9 WHERE id = ?1;", [id])
        .unwrap();

    assert!(matches!(
        board.tasks.get_task(id),
        Err(kanban_core::RepoError::InvalidData(_))
    ));
}
