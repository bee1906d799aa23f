//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::then;
use std::collections::HashSet;
use taskly::task::{
    domain::{TaskDomainError, TaskState},
    services::TaskLifecycleError,
};

#[then(r#"the task slug is "{slug}""#)]
fn task_slug_is(world: &TaskLifecycleWorld, slug: String) -> Result<(), eyre::Report> {
    let actual = world.current_slug()?;
    eyre::ensure!(actual == slug, "expected slug {slug}, found {actual}");
    Ok(())
}

#[then(r#""{name}" has {active:usize} active and {done:usize} done tasks"#)]
fn owner_has_counts(
    world: &TaskLifecycleWorld,
    name: String,
    active: usize,
    done: usize,
) -> Result<(), eyre::Report> {
    let owner = world.owner(&name)?;
    let active_tasks = run_async(world.service.list_active(owner))?;
    let done_tasks = run_async(world.service.list_done(owner))?;

    eyre::ensure!(
        active_tasks.len() == active,
        "expected {active} active tasks, found {}",
        active_tasks.len()
    );
    eyre::ensure!(
        done_tasks.len() == done,
        "expected {done} done tasks, found {}",
        done_tasks.len()
    );
    Ok(())
}

fn current_state(world: &TaskLifecycleWorld) -> Result<TaskState, eyre::Report> {
    world
        .last_task
        .as_ref()
        .map(|task| task.state())
        .ok_or_else(|| eyre::eyre!("missing current task"))
}

#[then("the task is done")]
fn task_is_done(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let state = current_state(world)?;
    eyre::ensure!(state == TaskState::Done, "expected done, found {}", state.as_str());
    Ok(())
}

#[then("the task is active")]
fn task_is_active(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let state = current_state(world)?;
    eyre::ensure!(
        state == TaskState::Active,
        "expected active, found {}",
        state.as_str()
    );
    Ok(())
}

#[then("the request is rejected for a past deadline")]
fn rejected_for_past_deadline(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result"))?;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Domain(TaskDomainError::DueDateInPast { .. }))
        ),
        "expected DueDateInPast error, got {result:?}"
    );
    Ok(())
}

#[then("the request fails as not found")]
fn request_not_found(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result"))?;

    eyre::ensure!(
        result.as_ref().is_err_and(TaskLifecycleError::is_not_found),
        "expected NotFound error, got {result:?}"
    );
    Ok(())
}

#[then("every created task has a distinct slug")]
fn created_slugs_distinct(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let slugs: HashSet<&str> = world
        .created
        .iter()
        .map(|task| task.slug().as_str())
        .collect();

    eyre::ensure!(world.created.len() > 1, "expected several created tasks");
    eyre::ensure!(
        slugs.len() == world.created.len(),
        "slugs collided: {:?}",
        world.created.iter().map(|task| task.slug().as_str()).collect::<Vec<_>>()
    );
    Ok(())
}
