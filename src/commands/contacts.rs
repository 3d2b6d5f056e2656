//! Contact submission commands

use anyhow::Result;

use crate::content::NewContact;
use crate::store::ContentStore;

pub async fn list(store: &ContentStore) -> Result<()> {
    let contacts = store.list_contacts().await?;
    println!("Contact submissions ({}):", contacts.len());
    for contact in contacts {
        println!(
            "  {} {} <{}>{}",
            contact.created_at.format("%Y-%m-%d %H:%M"),
            contact.name,
            contact.email,
            contact
                .phone
                .as_deref()
                .map(|p| format!(" {}", p))
                .unwrap_or_default()
        );
        println!("    {}", contact.message);
    }
    Ok(())
}

pub async fn submit(store: &ContentStore, input: NewContact) -> Result<()> {
    let submission = store.submit_contact(input).await?;
    println!("Submitted: {}", submission.id);
    Ok(())
}
