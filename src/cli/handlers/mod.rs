use std::collections::BTreeSet;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::cli::session::Session;
use crate::model::config::{CompletedFilter, SortCriteria, SortDirection, TrackerConfig};
use crate::model::route::{PlaceholderKind, Route};
use crate::render::list::ListRenderer;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(
    command: Commands,
    dir: &Path,
    config: TrackerConfig,
    cli_tab: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut session = Session::open(dir, config, cli_tab)?;
    match command {
        Commands::Route(cmd) => cmd_route(&mut session, cmd.action, json)?,
        Commands::Placeholder(cmd) => cmd_placeholder(&mut session, cmd.action)?,
        Commands::Task(cmd) => cmd_task(&mut session, cmd.action)?,
        Commands::List(args) => cmd_list(&mut session, args, json)?,
        Commands::Collapse(args) => cmd_collapse(&mut session, args)?,
        // The binary handles the TUI before a session is opened
        Commands::Tui => {}
    }
    // Also persists erasure of a corrupt tasks blob found while loading.
    session.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn parse_sort(s: &str) -> Result<SortCriteria, String> {
    match s.to_ascii_lowercase().as_str() {
        "default" => Ok(SortCriteria::Default),
        "name" => Ok(SortCriteria::Name),
        "tier" => Ok(SortCriteria::Tier),
        "points" => Ok(SortCriteria::Points),
        "completion" => Ok(SortCriteria::Completion),
        _ => Err(format!(
            "unknown sort '{}' (expected default, name, tier, points, completion)",
            s
        )),
    }
}

pub fn parse_completed(s: &str) -> Result<CompletedFilter, String> {
    match s.to_ascii_lowercase().as_str() {
        "all" => Ok(CompletedFilter::All),
        "complete" | "completed" => Ok(CompletedFilter::Complete),
        "incomplete" => Ok(CompletedFilter::Incomplete),
        _ => Err(format!(
            "unknown completion filter '{}' (expected all, complete, incomplete)",
            s
        )),
    }
}

fn find_route(session: &Session, name: &str) -> Result<Route, Box<dyn Error>> {
    session
        .store
        .load(session.tab, session.type_key())
        .into_iter()
        .find(|r| r.name == name)
        .ok_or_else(|| format!("no route named '{}' for {}", name, session.type_key()).into())
}

fn require_active_route(renderer: &ListRenderer) -> Result<(), Box<dyn Error>> {
    if renderer.active_route().is_none() {
        return Err("no active route; use `trail route activate <name>`".into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn cmd_route(session: &mut Session, action: RouteAction, json: bool) -> Result<(), Box<dyn Error>> {
    let tab = session.tab;
    let type_key = session.type_key().to_string();
    match action {
        RouteAction::List => {
            let routes = session.store.load(tab, &type_key);
            let active = session.store.load_active_route_name(tab, &type_key);
            let is_active = |r: &Route| active.as_deref() == Some(r.name.as_str());
            if json {
                let out: Vec<RouteSummaryJson> =
                    routes.iter().map(|r| route_summary(r, is_active(r))).collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if routes.is_empty() {
                println!("(no routes for {} on {})", type_key, tab);
            } else {
                for route in &routes {
                    println!("{}", format_route_line(route, is_active(route)));
                }
            }
        }
        RouteAction::Show(arg) => {
            let route = find_route(session, &arg.name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&route)?);
            } else {
                for line in format_route_detail(&route, &session.catalog) {
                    println!("{}", line);
                }
            }
        }
        RouteAction::Export(arg) => {
            let route = find_route(session, &arg.name)?;
            println!("{}", serde_json::to_string_pretty(&route)?);
        }
        RouteAction::Import(args) => {
            let text = fs::read_to_string(&args.file)
                .map_err(|e| format!("could not read {}: {}", args.file, e))?;
            let mut route: Route = serde_json::from_str(&text)
                .map_err(|e| format!("could not parse route {}: {}", args.file, e))?;
            if route.name.trim().is_empty() {
                return Err("route has no name".into());
            }
            if route.task_type.is_empty() {
                route.task_type = type_key.clone();
            } else if route.task_type != type_key {
                return Err(format!(
                    "route '{}' is for task type {}, not {}",
                    route.name, route.task_type, type_key
                )
                .into());
            }
            let name = route.name.clone();
            session.store.add_route_to_tab(tab, &type_key, route);
            if args.activate {
                session
                    .store
                    .save_active_route_name(tab, &type_key, Some(&name));
            }
            println!("imported route {}", name);
        }
        RouteAction::Activate(arg) => {
            let route = find_route(session, &arg.name)?;
            session
                .store
                .save_active_route_name(tab, &type_key, Some(&route.name));
            println!("active route: {}", route.name);
        }
        RouteAction::Deactivate => {
            session.store.save_active_route_name(tab, &type_key, None);
        }
        RouteAction::Remove(arg) => {
            if !session.store.remove_route_from_tab(tab, &type_key, &arg.name) {
                return Err(format!("no route named '{}' for {}", arg.name, type_key).into());
            }
            println!("removed route {}", arg.name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

fn cmd_placeholder(session: &mut Session, action: PlaceholderAction) -> Result<(), Box<dyn Error>> {
    let settings = session.list_settings();
    let filter = session.standing_filter(&settings);
    let mut renderer = session.render(settings, filter)?;
    require_active_route(&renderer)?;

    match action {
        PlaceholderAction::Insert(args) => {
            let kind = PlaceholderKind::parse_kind(&args.kind);
            let placeholder = renderer
                .insert_placeholder(&mut session.store, args.task_id, kind, !args.before)?
                .ok_or_else(|| format!("task {} is not in the active route", args.task_id))?;
            println!("{}", placeholder.id);
        }
        PlaceholderAction::Remove(arg) => {
            if !renderer.remove_placeholder(&mut session.store, &arg.id)? {
                return Err(format!("no placeholder '{}' in the active route", arg.id).into());
            }
        }
        PlaceholderAction::Done(arg) => set_placeholder(session, &mut renderer, &arg.id, true)?,
        PlaceholderAction::Undo(arg) => set_placeholder(session, &mut renderer, &arg.id, false)?,
    }
    Ok(())
}

fn set_placeholder(
    session: &mut Session,
    renderer: &mut ListRenderer,
    id: &str,
    done: bool,
) -> Result<(), Box<dyn Error>> {
    if !renderer.set_placeholder_completed(&mut session.store, id, done)? {
        return Err(format!("no placeholder '{}' in the active route", id).into());
    }
    renderer.run_until_idle(&mut session.store)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn cmd_task(session: &mut Session, action: TaskAction) -> Result<(), Box<dyn Error>> {
    let now = now_millis();
    let id = match &action {
        TaskAction::Complete(a) | TaskAction::Uncomplete(a) => a.id,
        TaskAction::Track(a) | TaskAction::Ignore(a) => a.id,
        TaskAction::Tag(a) => a.id,
    };
    let type_key = session.type_key().to_string();
    let task = session
        .catalog
        .task_mut(id)
        .ok_or_else(|| format!("no task {} in catalog {}", id, type_key))?;

    match action {
        TaskAction::Complete(_) => task.set_completed(true, now),
        TaskAction::Uncomplete(_) => task.set_completed(false, now),
        TaskAction::Track(a) => task.set_tracked(!a.off, now),
        TaskAction::Ignore(a) => task.set_ignored(!a.off, now),
        TaskAction::Tag(a) => match a.action.as_str() {
            "add" => {
                task.save.tags.insert(a.tag);
            }
            "rm" | "remove" => {
                task.save.tags.remove(&a.tag);
            }
            other => {
                return Err(format!("unknown tag action '{}' (expected add or rm)", other).into());
            }
        },
    }
    println!("{}", format_task_line(task));
    session.save_tasks();
    Ok(())
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

fn cmd_list(session: &mut Session, args: ListArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let mut settings = session.list_settings();
    if let Some(sort) = &args.sort {
        settings.sort = parse_sort(sort)?;
    }
    if args.desc {
        settings.direction = SortDirection::Descending;
    }
    if let Some(completed) = &args.completed {
        settings.completed = parse_completed(completed)?;
    }
    if !args.tag.is_empty() {
        let tags: BTreeSet<String> = args.tag.iter().cloned().collect();
        session.store.save_tag_filter(session.tab, &tags);
    }

    let mut filter = session.standing_filter(&settings);
    if let Some(text) = &args.text {
        filter.set_text(text);
    }
    let renderer = session.render(settings, filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list_to_json(&renderer))?);
    } else if renderer.is_empty_message_visible() {
        println!("{}", renderer.empty_message());
    } else {
        for line in format_rows(&renderer) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_collapse(session: &mut Session, args: CollapseArgs) -> Result<(), Box<dyn Error>> {
    let settings = session.list_settings();
    let filter = session.standing_filter(&settings);
    let mut renderer = session.render(settings, filter)?;
    require_active_route(&renderer)?;

    // Hidden sections have no header, so they cannot be toggled.
    if !renderer.toggle_collapsed(&mut session.store, &args.section)? {
        return Err(format!("no visible section '{}' in the active route", args.section).into());
    }
    let collapsed = renderer
        .header(&args.section)
        .is_some_and(|h| h.collapsed);
    println!(
        "{} {}",
        if collapsed { "collapsed" } else { "expanded" },
        args.section
    );
    Ok(())
}
