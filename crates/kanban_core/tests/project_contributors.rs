use kanban_core::db::open_db_in_memory;
use kanban_core::{
    Contributor, ContributorRepository, NewProject, ProjectService, ProjectServiceError,
    ProjectValidationError, RepoError, SqliteContributorRepository, SqliteProjectRepository,
};

#[test]
fn all_contributors_include_owner_and_other_contributors() {
    let conn = open_db_in_memory().unwrap();
    let people = SqliteContributorRepository::try_new(&conn).unwrap();
    let hugo = people.create_contributor("Hugo").unwrap();
    let rodrigo = people.create_contributor("Rodrigo").unwrap();
    let dudu = people.create_contributor("Dudu").unwrap();

    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let project = service
        .create_project(&NewProject {
            name: Some("kanban".to_string()),
            owner_id: Some(hugo.id),
            contributor_ids: vec![rodrigo.id],
        })
        .unwrap();

    let all = service.all_contributors(project.id).unwrap();
    assert!(all.contains(&hugo.id));
    assert!(all.contains(&rodrigo.id));
    assert!(!all.contains(&dudu.id));
}

#[test]
fn token_input_is_a_compact_json_of_contributors() {
    let conn = open_db_in_memory().unwrap();
    let people = SqliteContributorRepository::try_new(&conn).unwrap();
    let hugo = people.create_contributor("Hugo").unwrap();
    let rodrigo = people.create_contributor("Rodrigo").unwrap();
    let owner = people.create_contributor("Owner").unwrap();

    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let project = service
        .create_project(&NewProject {
            name: Some("kanban".to_string()),
            owner_id: Some(owner.id),
            contributor_ids: vec![hugo.id, rodrigo.id],
        })
        .unwrap();

    let json = service.contributors_for_token_input(project.id).unwrap();
    assert_eq!(json, r#"[{"id":1,"name":"Hugo"},{"id":2,"name":"Rodrigo"}]"#);

    let decoded: Vec<Contributor> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, vec![hugo, rodrigo]);
}

#[test]
fn contributor_tokens_replace_the_contributor_set() {
    let conn = open_db_in_memory().unwrap();
    let people = SqliteContributorRepository::try_new(&conn).unwrap();
    let owner = people.create_contributor("Owner").unwrap();
    let hugo = people.create_contributor("Hugo").unwrap();
    let rodrigo = people.create_contributor("Rodrigo").unwrap();

    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let project = service
        .create_project(&NewProject {
            name: Some("kanban".to_string()),
            owner_id: Some(owner.id),
            contributor_ids: vec![owner.id],
        })
        .unwrap();

    let updated = service
        .set_contributor_tokens(project.id, &format!("{}, {}", hugo.id, rodrigo.id))
        .unwrap();
    assert_eq!(updated.contributor_ids, vec![hugo.id, rodrigo.id]);

    let err = service
        .set_contributor_tokens(project.id, "1, two")
        .unwrap_err();
    assert!(matches!(
        err,
        ProjectServiceError::Validation(ProjectValidationError::InvalidContributorToken(_))
    ));
    let unchanged = service.get_project(project.id).unwrap().unwrap();
    assert_eq!(unchanged.contributor_ids, vec![hugo.id, rodrigo.id]);
}

#[test]
fn contributor_operations_on_missing_project_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.contributors_for_token_input(7),
        Err(ProjectServiceError::ProjectNotFound(7))
    ));
    assert!(matches!(
        service.set_contributor_tokens(7, ""),
        Err(ProjectServiceError::ProjectNotFound(7))
    ));
}

#[test]
fn unknown_contributor_ids_report_not_found_and_keep_the_set() {
    let conn = open_db_in_memory().unwrap();
    let people = SqliteContributorRepository::try_new(&conn).unwrap();
    let owner = people.create_contributor("Owner").unwrap();
    let hugo = people.create_contributor("Hugo").unwrap();

    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let project = service
        .create_project(&NewProject {
            name: Some("kanban".to_string()),
            owner_id: Some(owner.id),
            contributor_ids: vec![hugo.id],
        })
        .unwrap();

    let err = service
        .set_contributor_tokens(project.id, &format!("{}, 999", hugo.id))
        .unwrap_err();
    assert!(matches!(
        err,
        ProjectServiceError::Repo(RepoError::NotFound {
            entity: "contributor",
            id: 999
        })
    ));
    let unchanged = service.get_project(project.id).unwrap().unwrap();
    assert_eq!(unchanged.contributor_ids, vec![hugo.id]);

    let err = service
        .create_project(&NewProject {
            name: Some("other".to_string()),
            owner_id: Some(owner.id),
            contributor_ids: vec![404],
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ProjectServiceError::Repo(RepoError::NotFound {
            entity: "contributor",
            id: 404
        })
    ));
}

#[test]
fn unknown_owner_reports_contributor_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());

    let err = service
        .create_project(&NewProject::new("kanban", 42))
        .unwrap_err();
    assert!(matches!(
        err,
        ProjectServiceError::Repo(RepoError::NotFound {
            entity: "contributor",
            id: 42
        })
    ));
    assert!(service.list_projects().unwrap().is_empty());
}
