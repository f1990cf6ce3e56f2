//! `clear-database` - wipe all posts and users.

use std::io::Write;

use anyhow::Result;

use kittygram_core::ports::{PostRepository, UserRepository};

use super::MaintenanceContext;

/// Interactive entry point. Confirms on stdin unless `force` is set.
pub async fn run(ctx: &MaintenanceContext, force: bool) -> Result<()> {
    if !force && !confirm()? {
        println!("Operation cancelled");
        return Ok(());
    }

    clear(ctx).await?;
    println!();
    println!("Database cleared!");
    Ok(())
}

fn confirm() -> Result<bool> {
    print!(
        "Are you sure you want to clear the database? \
         This deletes all users and all posts. [y/N]: "
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Delete all posts, then all users (their sessions cascade with them),
/// reporting counts.
pub async fn clear(ctx: &MaintenanceContext) -> Result<()> {
    println!("Clearing database...");

    let post_count = ctx.posts.count().await?;
    if post_count > 0 {
        ctx.posts.delete_all().await?;
        println!("Deleted posts: {post_count}");
    } else {
        println!("No posts to delete");
    }

    let user_count = ctx.users.count().await?;
    if user_count > 0 {
        ctx.users.delete_all().await?;
        println!("Deleted users: {user_count}");
    } else {
        println!("No users to delete");
    }

    Ok(())
}
