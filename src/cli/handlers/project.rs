use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::id_counter::IdAllocator;
use crate::io::lock::FileLock;
use crate::model::project::Project;
use crate::model::task::Task;
use crate::ops::filter::{self, ProjectFilter};
use crate::ops::sort::{self, SortKey};
use crate::ops::task_ops::{self, NewProject, TaskError};
use crate::ops::scan;

use super::{CmdResult, Context, print_json, report, today};

pub fn cmd_project(ctx: &Context, cmd: ProjectCmd) -> CmdResult {
    match cmd.action {
        ProjectAction::List(args) => cmd_project_list(ctx, args),
        ProjectAction::Show(args) => cmd_project_show(ctx, args),
        ProjectAction::New(args) => cmd_project_new(ctx, args),
        ProjectAction::Status(args) => cmd_project_status(ctx, args),
    }
}

fn find(ctx: &Context, key: &str) -> Result<Project, Box<dyn std::error::Error>> {
    let project = scan::find_project(ctx.notes_dir()?, key)?
        .ok_or_else(|| TaskError::ProjectNotFound(key.to_string()))?;
    Ok(project)
}

fn cmd_project_list(ctx: &Context, args: ProjectListArgs) -> CmdResult {
    let dir = ctx.notes_dir()?;
    let name = args.filter.as_deref().unwrap_or("all");
    let named = ProjectFilter::parse(name).ok_or_else(|| {
        format!(
            "unknown filter '{}' (expected: all, open, overdue, or a status)",
            name
        )
    })?;
    let mut filters = vec![named];
    if let Some(area) = &args.area {
        filters.push(ProjectFilter::Area(area.trim().to_string()));
    }

    let mut projects = filter::filter_projects(scan::scan_projects(dir)?, &filters, today());
    sort::sort_projects(
        &mut projects,
        args.sort.unwrap_or(ctx.config.sort),
        ctx.config.reverse != args.reverse,
    );

    if ctx.json {
        let items: Vec<ProjectJson> = projects.iter().map(|p| project_to_json(p, &[])).collect();
        return print_json(&items);
    }
    if projects.is_empty() {
        println!("no projects");
    }
    for project in &projects {
        println!("{}", format_project_line(project));
    }
    Ok(())
}

fn cmd_project_show(ctx: &Context, args: ProjectKeyArg) -> CmdResult {
    let project = find(ctx, &args.key)?;
    let mut tasks = scan::scan_tasks(ctx.notes_dir()?)?;
    sort::sort_tasks(&mut tasks, SortKey::Status, false);
    let linked: Vec<&Task> = scan::tasks_for_project(&tasks, &project);

    if ctx.json {
        return print_json(&project_to_json(&project, &linked));
    }
    for line in format_project_detail(&project, &linked) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_project_new(ctx: &Context, args: ProjectNewArgs) -> CmdResult {
    let dir = ctx.notes_dir()?;
    let new = NewProject {
        title: args.title,
        tags: args.tags,
        priority: args.priority,
        due_date: args.due,
        start_date: args.start,
        area: args.area.or_else(|| ctx.config.default_area.clone()),
    };

    let _lock = FileLock::acquire(dir, ctx.lock_timeout())?;
    let alloc = IdAllocator::open(dir)?;
    let project = task_ops::create_project(dir, &alloc, &new)?;

    if ctx.json {
        return print_json(&project_to_json(&project, &[]));
    }
    println!(
        "#{} {} {}",
        project.meta.project_id,
        project.key(),
        project.path.display()
    );
    Ok(())
}

fn cmd_project_status(ctx: &Context, args: ProjectStatusArgs) -> CmdResult {
    let status = task_ops::validate_project_status(&args.status)?;
    let project = find(ctx, &args.key)?;
    let outcome = task_ops::set_project_status(&project.path, status.as_str())?;
    report(
        outcome,
        &project.path,
        format!("{} → {}", project.key(), status),
    );
    Ok(())
}
