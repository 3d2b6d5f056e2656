//! Admin role and dashboard commands

use anyhow::Result;

use crate::store::ContentStore;

/// Report whether a user holds the admin role
pub async fn check(store: &ContentStore, user_id: &str) -> Result<()> {
    let is_admin = store.check_admin_role(user_id).await;
    let roles = store.get_user_roles(user_id).await?;
    println!(
        "{}: {} ({} role{})",
        user_id,
        if is_admin { "admin" } else { "not admin" },
        roles.len(),
        if roles.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Print the dashboard counters
pub async fn stats(store: &ContentStore) -> Result<()> {
    let stats = store.dashboard_stats().await?;
    println!("Mode:            {}", store.mode());
    println!("Total posts:     {}", stats.total_posts);
    println!("Published:       {}", stats.published_posts);
    println!("Drafts:          {}", stats.draft_posts);
    println!("Contact entries: {}", stats.contacts);
    Ok(())
}
