//! Site settings commands

use anyhow::Result;

use crate::content::SettingGroup;
use crate::store::ContentStore;

/// List settings grouped the way the admin page shows them
pub async fn list(store: &ContentStore) -> Result<()> {
    let settings = store.list_settings().await?;
    println!("Settings ({}):", settings.len());
    for group in [SettingGroup::Contact, SettingGroup::Social, SettingGroup::Other] {
        let rows: Vec<_> = settings.iter().filter(|s| s.group() == group).collect();
        if rows.is_empty() {
            continue;
        }
        println!(" {}:", group.label());
        for setting in rows {
            println!(
                "  {} = {}",
                setting.key,
                setting.value.as_deref().unwrap_or("(unset)")
            );
        }
    }
    Ok(())
}

pub async fn get(store: &ContentStore, key: &str) -> Result<()> {
    match store.get_setting(key).await? {
        Some(value) => println!("{}", value),
        None => println!("(unset)"),
    }
    Ok(())
}

pub async fn set(store: &ContentStore, key: &str, value: &str) -> Result<()> {
    store.update_setting(key, value).await?;
    println!("Updated: {}", key);
    Ok(())
}
