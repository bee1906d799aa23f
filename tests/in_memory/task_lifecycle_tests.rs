//! In-memory integration tests for task lifecycle operations.

use super::helpers::{TestService, create_due_in, days_from_now, owner, service, slugs};
use rstest::rstest;
use taskly::task::{
    domain::{OwnerId, TaskState},
    ports::TaskRepositoryError,
    services::{CreateTaskRequest, EditTaskRequest, TaskLifecycleError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_for_twenty_minutes_scenario(
    service: TestService,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let created = create_due_in(&service, owner, "Read for 20 mins.", 3).await?;

    eyre::ensure!(created.slug().as_str() == "1-read-for-20-mins");
    eyre::ensure!(slugs(&service.list_active(owner).await?) == ["1-read-for-20-mins"]);

    service.mark_done(owner, "1-read-for-20-mins").await?;

    eyre::ensure!(service.list_active(owner).await?.is_empty());
    let done = service.list_done(owner).await?;
    eyre::ensure!(slugs(&done) == ["1-read-for-20-mins"]);
    let finished = done
        .first()
        .ok_or_else(|| eyre::eyre!("expected a done task"))?;
    eyre::ensure!(finished.state() == TaskState::Done);
    eyre::ensure!(finished.finished_on().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identical_titles_get_distinct_slugs(
    service: TestService,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let first = create_due_in(&service, owner, "Water the plants", 1).await?;
    let second = create_due_in(&service, owner, "Water the plants", 1).await?;

    eyre::ensure!(first.slug() != second.slug());
    eyre::ensure!(first.slug().as_str() == "1-water-the-plants");
    eyre::ensure!(second.slug().as_str() == "2-water-the-plants");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn active_tasks_are_ordered_by_deadline(
    service: TestService,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    create_due_in(&service, owner, "Read for 20 mins.", 3).await?;
    create_due_in(&service, owner, "Watch a tv show.", 1).await?;
    create_due_in(&service, owner, "Call mum", 2).await?;

    let active = service.list_active(owner).await?;

    eyre::ensure!(
        slugs(&active) == ["2-watch-a-tv-show", "3-call-mum", "1-read-for-20-mins"],
        "unexpected order: {:?}",
        slugs(&active)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookups_ignore_slug_case(
    service: TestService,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let created = create_due_in(&service, owner, "Plan the trip", 5).await?;

    let found = service.find(owner, "1-PLAN-the-Trip").await?;

    eyre::ensure!(found == created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undo_restores_the_active_task(
    service: TestService,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let created = create_due_in(&service, owner, "Go for a run", 1).await?;
    let slug = created.slug().as_str();

    service.mark_done(owner, slug).await?;
    let restored = service.mark_undone(owner, slug).await?;

    eyre::ensure!(restored.state() == TaskState::Active);
    eyre::ensure!(restored.finished_on().is_none());
    eyre::ensure!(restored.title() == created.title());
    eyre::ensure!(restored.description() == created.description());
    eyre::ensure!(restored.do_before() == created.do_before());
    eyre::ensure!(service.list_done(owner).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_keeps_slug_and_replaces_fields(
    service: TestService,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let created = create_due_in(&service, owner, "Do the task", 1).await?;
    let deadline = days_from_now(9);

    let edited = service
        .edit(
            owner,
            created.slug().as_str(),
            EditTaskRequest::new("Make sure to do the task")
                .with_description("Before the weekend")
                .with_do_before(deadline),
        )
        .await?;

    eyre::ensure!(edited.slug() == created.slug());
    eyre::ensure!(edited.title().as_str() == "Make sure to do the task");
    eyre::ensure!(edited.description() == "Before the weekend");
    eyre::ensure!(edited.do_before() == deadline);
    eyre::ensure!(service.find(owner, created.slug().as_str()).await? == edited);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn past_deadline_is_rejected(service: TestService, owner: OwnerId) {
    let result = service
        .create(CreateTaskRequest::new(owner, "Too late").with_do_before(days_from_now(-1)))
        .await;

    assert!(result.is_err_and(|error| error.is_validation()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removed_task_cannot_be_found(
    service: TestService,
    owner: OwnerId,
) -> Result<(), eyre::Report> {
    let created = create_due_in(&service, owner, "Temporary", 1).await?;

    let removed = service.remove(owner, created.slug().as_str()).await?;
    let lookup = service.find(owner, created.slug().as_str()).await;

    eyre::ensure!(removed == created);
    eyre::ensure!(matches!(
        lookup,
        Err(TaskLifecycleError::Repository(TaskRepositoryError::NotFound))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_all_spans_owners(service: TestService) -> Result<(), eyre::Report> {
    let alice = OwnerId::new();
    let bob = OwnerId::new();
    create_due_in(&service, alice, "Alice task", 2).await?;
    create_due_in(&service, bob, "Bob task", 1).await?;

    let all = service.list_all().await?;

    eyre::ensure!(slugs(&all) == ["2-bob-task", "1-alice-task"]);
    Ok(())
}
