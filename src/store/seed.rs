// SPDX-License-Identifier: MPL-2.0

use crate::store::{EventLog, EventStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

const USERNAMES: &[&str] = &[
    "john_doe",
    "jane_smith",
    "mike_wilson",
    "sarah_jones",
    "alex_brown",
    "emma_davis",
    "chris_lee",
    "olivia_martin",
];

const POSTS: &[&str] = &[
    "Just launched our new product line! Check it out.",
    "Behind the scenes of today's photo shoot",
    "Tips for staying productive while working from home",
    "What's your favorite weekend activity?",
    "Throwback to last summer's team retreat",
    "New blog post: ten lessons from our first year",
    "Coffee or tea? Settle this once and for all",
    "Thank you for 10k followers!",
    "Sneak peek at what we're building next",
    "Monday motivation",
    "",
    "Weekly roundup of community highlights",
];

/// Populate an empty store with two weeks of demo activity ending at `now`.
/// Returns false without touching anything if users already exist.
pub fn seed_demo(store: &EventStore, now: DateTime<Utc>) -> Result<bool, StoreError> {
    let existing: i64 = store
        .writer()?
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if existing > 0 {
        info!("Store already has {} users, skipping seed", existing);
        return Ok(false);
    }

    let events = EventLog::new(store);
    let mut users = Vec::with_capacity(USERNAMES.len());

    for (i, name) in USERNAMES.iter().enumerate() {
        let joined = now - Duration::days(13 - (i as i64 * 13 / USERNAMES.len() as i64));
        users.push(events.add_user(name, joined)?);
    }

    let mut likes = 0;
    let mut comments = 0;

    for (i, content) in POSTS.iter().enumerate() {
        let author = users[i % users.len()];
        let posted = now - Duration::days(12 - i as i64) - Duration::hours(i as i64 % 5);
        let content = (!content.is_empty()).then_some(*content);
        let post = events.add_post(author, content, posted)?;

        // Spread engagement unevenly so the ranking has a visible shape
        for (j, &fan) in users.iter().enumerate() {
            if fan == author || (i + j) % 3 == 0 {
                continue;
            }
            events.add_like(post, fan, posted + Duration::hours(j as i64 + 1))?;
            likes += 1;

            if (i * j) % 4 == 1 {
                events.add_comment(post, fan, "Love this!", posted + Duration::hours(j as i64 + 2))?;
                comments += 1;
            }
        }
    }

    info!(
        "Seeded {} users, {} posts, {} likes, {} comments",
        users.len(),
        POSTS.len(),
        likes,
        comments
    );

    Ok(true)
}
