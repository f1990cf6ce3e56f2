//! `load-test-data` - clear the database, load demo fixtures, and attach
//! generated placeholder images to posts that lack one.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use kittygram_core::domain::{Post, User};
use kittygram_core::ports::{BaseRepository, MediaStore, PasswordService, PostRepository};
use kittygram_infra::media::placeholder_jpeg;

use super::MaintenanceContext;

/// Fixture accounts. The password equals the username, like the demo
/// credentials printed at the end.
const FIXTURE_USERS: &[(&str, &str)] = &[
    ("tester_1", "tester_1@example.com"),
    ("tester_2", "tester_2@example.com"),
    ("admin", "admin@example.com"),
];

/// (author, title, description)
const FIXTURE_POSTS: &[(&str, &str, &str)] = &[
    (
        "tester_1",
        "Schroedinger's cat",
        "Simultaneously napping and not napping.",
    ),
    (
        "tester_1",
        "Morning stretch",
        "A full-body stretch after twelve hours of sleep.",
    ),
    ("tester_1", "Box inspection", "If it fits, it sits."),
    (
        "tester_2",
        "Window patrol",
        "Keeping an eye on the neighborhood pigeons.",
    ),
    ("tester_2", "Keyboard assistant", "Helping with the code review."),
    ("admin", "Official portrait", ""),
];

pub async fn run(ctx: &MaintenanceContext) -> Result<()> {
    super::clear::clear(ctx).await?;

    println!();
    println!("Loading test data...");

    // Failures past this point are reported without undoing completed steps.
    match load(ctx).await {
        Ok(()) => {
            println!();
            println!("Total posts: {}", ctx.posts.count().await?);
            println!();
            println!("Test credentials:");
            println!("User 1: tester_1 / tester_1");
            println!("User 2: tester_2 / tester_2");
            println!("Admin:  admin / admin");
        }
        Err(e) => {
            tracing::error!("Error loading test data: {e}");
        }
    }

    Ok(())
}

async fn load(ctx: &MaintenanceContext) -> Result<()> {
    let mut user_ids: HashMap<&str, Uuid> = HashMap::new();
    for (username, email) in FIXTURE_USERS.iter().copied() {
        let hash = ctx.passwords.hash(username)?;
        let user = ctx
            .users
            .insert(User::new(username.to_string(), email.to_string(), hash))
            .await?;
        user_ids.insert(username, user.id);
    }

    // Stagger creation times so the newest-first listing has a stable order.
    let base = Utc::now();
    for (i, (author, title, description)) in FIXTURE_POSTS.iter().copied().enumerate() {
        let mut post = Post::new(user_ids[author], title.to_string(), description.to_string());
        post.created_at = base - Duration::minutes((FIXTURE_POSTS.len() - i) as i64);
        ctx.posts.insert(post).await?;
    }

    println!("Fixtures loaded!");

    add_placeholder_images(ctx).await
}

async fn add_placeholder_images(ctx: &MaintenanceContext) -> Result<()> {
    println!("Adding placeholder images to posts...");

    let mut rng = StdRng::from_entropy();
    for mut post in ctx.posts.find_all().await? {
        if post.image.is_some() {
            continue;
        }

        let bytes = placeholder_jpeg(&mut rng)?;
        let path = ctx.media.save("posts", "jpg", &bytes).await?;
        post.image = Some(path);

        let title = post.title.clone();
        ctx.posts.update(post).await?;
        println!("Added image for post \"{title}\"");
    }

    Ok(())
}
