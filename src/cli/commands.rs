use clap::{Parser, Subcommand};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use crate::cli::error::{parse_number_field, validate_todo_id};
use crate::cli::output::{
    format_stats, format_tag_counts, format_todo_line, format_todo_summary, format_todo_table,
};
use crate::cli::parser::{parse_todo_args, ParsedTodoArgs, CLEAR_VALUE};
use crate::config::Config;
use crate::db::DbConnection;
use crate::models::{normalize_tag_name, NewTodo, SubtaskSpec, TodoUpdate};
use crate::query;
use crate::repo::{ParentFilter, TagRepo, TodoFilter, TodoOrder, TodoRepo};
use crate::subtasks::create_subtasks;
use crate::utils::parse_date_expr;
use anyhow::{Context, Result};

#[derive(Parser)]
#[command(name = "deltatask")]
#[command(about = "DeltaTask - todos with deadlines, urgency, effort and subtasks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new todo
    Add {
        /// Longer free-text description
        #[arg(short = 'd', long)]
        description: Option<String>,
        /// Print the created todo as JSON
        #[arg(long)]
        json: bool,
        /// Title and fields (e.g., "write report due=+3d urgency=4 effort=5 +work")
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List todos
    List {
        /// Only completed todos
        #[arg(long, conflicts_with = "open")]
        done: bool,
        /// Only incomplete todos
        #[arg(long)]
        open: bool,
        /// Only todos carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Only direct subtasks of this todo
        #[arg(long, conflicts_with = "top")]
        parent: Option<String>,
        /// Only top-level todos
        #[arg(long)]
        top: bool,
        /// Order by priority instead of creation order
        #[arg(long)]
        priority: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a todo with its subtasks
    Show {
        /// Todo ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Modify a todo
    Modify {
        /// Todo ID
        id: String,
        /// Replace the description
        #[arg(short = 'd', long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
        /// New title words and fields (e.g., "urgency=5 due= +urgent -someday")
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Mark a todo as completed
    Done {
        /// Todo ID
        id: String,
    },
    /// Mark a completed todo as open again
    Reopen {
        /// Todo ID
        id: String,
    },
    /// Delete a todo
    Delete {
        /// Todo ID
        id: String,
        /// Also delete all subtasks, recursively
        #[arg(long, conflicts_with = "keep_subtasks")]
        cascade: bool,
        /// Keep subtasks, moving them to top level
        #[arg(long)]
        keep_subtasks: bool,
    },
    /// Split a todo into subtasks
    Split {
        /// Parent todo ID
        id: String,
        /// One argument per subtask (e.g., "Draft outline urgency=3 effort=2 +writing")
        #[arg(required = true)]
        specs: Vec<String>,
    },
    /// Search titles, descriptions and tags
    Search {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Text to look for (case-insensitive)
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Show statistics
    Stats {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List tags with usage counts
    Tags {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add { description, json, args } => handle_add(args, description, json),
        Commands::List { done, open, tag, parent, top, priority, json } => {
            let completed = if done {
                Some(true)
            } else if open {
                Some(false)
            } else {
                None
            };
            let parent = match (parent, top) {
                (Some(id), _) => ParentFilter::ChildrenOf(parse_id(&id)?),
                (None, true) => ParentFilter::TopLevel,
                (None, false) => ParentFilter::Any,
            };
            let filter = TodoFilter {
                completed,
                tag,
                parent,
                order: if priority { TodoOrder::Priority } else { TodoOrder::Storage },
            };
            handle_list(filter, json)
        }
        Commands::Show { id, json } => handle_show(&id, json),
        Commands::Modify { id, description, clear_description, args } => {
            let description = if clear_description {
                Some(None)
            } else {
                description.map(Some)
            };
            handle_modify(&id, args, description)
        }
        Commands::Done { id } => handle_set_completed(&id, true),
        Commands::Reopen { id } => handle_set_completed(&id, false),
        Commands::Delete { id, cascade, keep_subtasks } => {
            let policy = if cascade {
                Some(true)
            } else if keep_subtasks {
                Some(false)
            } else {
                None
            };
            handle_delete(&id, policy)
        }
        Commands::Split { id, specs } => handle_split(&id, &specs),
        Commands::Search { json, query } => handle_search(&query.join(" "), json),
        Commands::Stats { json } => handle_stats(json),
        Commands::Tags { json } => handle_tags(json),
    }
}

fn connect() -> Result<Connection> {
    DbConnection::connect().context("Failed to connect to database")
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_id(id_str: &str) -> Result<i64> {
    validate_todo_id(id_str).map_err(anyhow::Error::msg)
}

fn parse_number(field: &str, value: &str) -> Result<i64> {
    parse_number_field(field, value).map_err(anyhow::Error::msg)
}

/// `None` for the clear sentinel, otherwise a parsed date
fn parse_deadline(value: &str) -> Result<Option<NaiveDate>> {
    if value == CLEAR_VALUE {
        Ok(None)
    } else {
        parse_date_expr(value).map(Some)
    }
}

fn handle_add(args: Vec<String>, description: Option<String>, json: bool) -> Result<()> {
    let parsed = parse_todo_args(&args)?;
    if !parsed.tags_remove.is_empty() {
        anyhow::bail!("Cannot remove tags when adding a todo: -{}", parsed.tags_remove.join(" -"));
    }

    let mut new = NewTodo::new(parsed.title_text());
    new.description = description;
    new.tags = parsed.tags_add.clone();
    if let Some(due) = &parsed.due {
        new.deadline = parse_deadline(due)?;
    }
    if let Some(urgency) = &parsed.urgency {
        new.urgency = parse_number("urgency", urgency)?;
    }
    if let Some(effort) = &parsed.effort {
        new.effort = parse_number("effort", effort)?;
    }
    if let Some(parent) = &parsed.parent {
        if parent != CLEAR_VALUE {
            new.parent_id = Some(parse_id(parent)?);
        }
    }

    let conn = connect()?;
    let todo = TodoRepo::add(&conn, &new)?;

    if json {
        print_json(&todo)
    } else {
        println!("Created todo {}", format_todo_line(&todo));
        Ok(())
    }
}

fn handle_list(filter: TodoFilter, json: bool) -> Result<()> {
    let conn = connect()?;
    let todos = TodoRepo::list(&conn, &filter)?;

    if json {
        print_json(&todos)
    } else {
        println!("{}", format_todo_table(&todos, today()));
        Ok(())
    }
}

fn handle_show(id_str: &str, json: bool) -> Result<()> {
    let id = parse_id(id_str)?;
    let conn = connect()?;
    let tree = TodoRepo::get_tree(&conn, id)?;

    if json {
        print_json(&tree)
    } else {
        println!("{}", format_todo_summary(&tree, today()));
        Ok(())
    }
}

fn handle_modify(id_str: &str, args: Vec<String>, description: Option<Option<String>>) -> Result<()> {
    let id = parse_id(id_str)?;
    let parsed = parse_todo_args(&args)?;
    let conn = connect()?;

    let mut update = build_update(&parsed)?;
    update.description = description;
    if !parsed.tags_add.is_empty() || !parsed.tags_remove.is_empty() {
        let current = TodoRepo::get(&conn, id)?.tags;
        update.tags = Some(merge_tags(current, &parsed.tags_add, &parsed.tags_remove)?);
    }

    if update.is_empty() {
        anyhow::bail!("No modifications specified for todo {}", id);
    }

    let todo = TodoRepo::update(&conn, id, &update)?;
    println!("Modified todo {}", format_todo_line(&todo));
    Ok(())
}

/// Field tokens and title words -> partial update (tags handled by the caller)
fn build_update(parsed: &ParsedTodoArgs) -> Result<TodoUpdate> {
    let mut update = TodoUpdate::default();
    if !parsed.title.is_empty() {
        update.title = Some(parsed.title_text());
    }
    if let Some(due) = &parsed.due {
        update.deadline = Some(parse_deadline(due)?);
    }
    if let Some(urgency) = &parsed.urgency {
        update.urgency = Some(parse_number("urgency", urgency)?);
    }
    if let Some(effort) = &parsed.effort {
        update.effort = Some(parse_number("effort", effort)?);
    }
    if let Some(parent) = &parsed.parent {
        update.parent_id = Some(if parent == CLEAR_VALUE {
            None
        } else {
            Some(parse_id(parent)?)
        });
    }
    Ok(update)
}

/// Apply +tag / -tag tokens to an existing tag set
fn merge_tags(current: Vec<String>, add: &[String], remove: &[String]) -> Result<Vec<String>> {
    let remove = remove
        .iter()
        .map(|t| normalize_tag_name(t))
        .collect::<crate::error::Result<Vec<_>>>()?;

    let mut tags: Vec<String> = current.into_iter().filter(|t| !remove.contains(t)).collect();
    for tag in add {
        let tag = normalize_tag_name(tag)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags.sort();
    Ok(tags)
}

fn handle_set_completed(id_str: &str, completed: bool) -> Result<()> {
    let id = parse_id(id_str)?;
    let conn = connect()?;
    let todo = TodoRepo::set_completed(&conn, id, completed)?;
    let verb = if completed { "Completed" } else { "Reopened" };
    println!("{} todo {}", verb, format_todo_line(&todo));
    Ok(())
}

fn handle_delete(id_str: &str, policy: Option<bool>) -> Result<()> {
    let id = parse_id(id_str)?;
    let config = Config::load()?;
    let cascade = policy.unwrap_or(config.cascade_delete);

    let conn = DbConnection::connect_at(&config.data_location)
        .context("Failed to connect to database")?;
    let todo = TodoRepo::get(&conn, id)?;
    let removed = TodoRepo::delete(&conn, id, cascade)?;

    if cascade && removed > 1 {
        println!("Deleted todo {}: {} (and {} subtask(s))", id, todo.title, removed - 1);
    } else {
        println!("Deleted todo {}: {}", id, todo.title);
    }
    Ok(())
}

/// One CLI argument per subtask: title words plus optional fields and +tags
fn parse_subtask_spec(spec: &str) -> Result<SubtaskSpec> {
    let tokens: Vec<&str> = spec.split_whitespace().collect();
    let parsed = parse_todo_args(&tokens)?;

    if parsed.parent.is_some() {
        anyhow::bail!("Subtask '{}' cannot set parent=; it is taken from the split target", spec);
    }
    if !parsed.tags_remove.is_empty() {
        anyhow::bail!("Subtask '{}' cannot remove tags", spec);
    }

    let mut result = SubtaskSpec::new(parsed.title_text());
    result.tags = parsed.tags_add.clone();
    if let Some(due) = &parsed.due {
        result.deadline = parse_deadline(due)?;
    }
    if let Some(urgency) = &parsed.urgency {
        result.urgency = Some(parse_number("urgency", urgency)?);
    }
    if let Some(effort) = &parsed.effort {
        result.effort = Some(parse_number("effort", effort)?);
    }
    Ok(result)
}

fn handle_split(id_str: &str, specs: &[String]) -> Result<()> {
    let parent_id = parse_id(id_str)?;
    let specs = specs
        .iter()
        .map(|s| parse_subtask_spec(s))
        .collect::<Result<Vec<_>>>()?;

    let conn = connect()?;
    let created = create_subtasks(&conn, parent_id, &specs)?;

    println!("Created {} subtask(s) under todo {}:", created.len(), parent_id);
    for todo in &created {
        println!("  {}", format_todo_line(todo));
    }
    Ok(())
}

fn handle_search(query: &str, json: bool) -> Result<()> {
    let conn = connect()?;
    let results = query::search(&conn, query)?;

    if json {
        print_json(&results)
    } else {
        println!("{}", format_todo_table(&results, today()));
        Ok(())
    }
}

fn handle_stats(json: bool) -> Result<()> {
    let conn = connect()?;
    let stats = query::statistics(&conn)?;

    if json {
        print_json(&stats)
    } else {
        println!("{}", format_stats(&stats));
        Ok(())
    }
}

fn handle_tags(json: bool) -> Result<()> {
    let conn = connect()?;
    let tags = TagRepo::list_with_counts(&conn)?;

    if json {
        print_json(&tags)
    } else {
        println!("{}", format_tag_counts(&tags));
        Ok(())
    }
}
