use anyhow::Result;
use clap::Subcommand;

use crate::context::Ctx;

#[derive(Subcommand, Debug)]
pub enum CourseCommand {
    /// Add a course
    Add {
        name: String,

        /// Display color label (free text)
        #[arg(long)]
        color: Option<String>,
    },

    /// List courses with their task counts
    List,

    /// Rename a course
    Rename { id: String, name: String },

    /// Remove a course; its tasks are kept but unlinked
    Remove { id: String },
}

pub fn run(ctx: &Ctx, cmd: CourseCommand) -> Result<()> {
    match cmd {
        CourseCommand::Add { name, color } => add(ctx, &name, color),
        CourseCommand::List => list(ctx),
        CourseCommand::Rename { id, name } => rename(ctx, &id, &name),
        CourseCommand::Remove { id } => remove(ctx, &id),
    }
}

fn add(ctx: &Ctx, name: &str, color: Option<String>) -> Result<()> {
    let mut board = ctx.load_board()?;
    let course = board.add_course(name, color)?.clone();
    ctx.commit(&board, &[])?;
    println!("Added course {} ({})", course.name, course.id);
    Ok(())
}

fn list(ctx: &Ctx) -> Result<()> {
    let board = ctx.load_board()?;
    if board.courses().is_empty() {
        println!("No courses yet. Add one: tronika course add <name>");
        return Ok(());
    }
    for c in board.sorted_courses() {
        let n = board.tasks_for_course(Some(&c.id)).len();
        match c.color.as_deref() {
            Some(color) => println!("{:<38} {} [{}] ({} tasks)", c.id, c.name, color, n),
            None => println!("{:<38} {} ({} tasks)", c.id, c.name, n),
        }
    }
    Ok(())
}

fn rename(ctx: &Ctx, id: &str, name: &str) -> Result<()> {
    let mut board = ctx.load_board()?;
    let course = board.rename_course(id, name)?.clone();
    ctx.commit(&board, &[])?;
    println!("Renamed course {} to {}", course.id, course.name);
    Ok(())
}

fn remove(ctx: &Ctx, id: &str) -> Result<()> {
    let mut board = ctx.load_board()?;
    let (course, unlinked) = board.remove_course(id, ctx.now())?;
    ctx.commit(&board, &[])?;
    println!(
        "Removed course {} ({} task{} unlinked)",
        course.name,
        unlinked,
        if unlinked == 1 { "" } else { "s" }
    );
    Ok(())
}
