//! List command - show the provider directory

use anyhow::Result;
use colored::Colorize;
use docbot_consult_core::{ConsultConfig, ConsultManager, ProviderCard};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Specialty")]
    specialty: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Action")]
    action: &'static str,
}

impl From<&ProviderCard> for ProviderRow {
    fn from(card: &ProviderCard) -> Self {
        Self {
            id: card.id.0,
            name: card.name.clone(),
            specialty: card.specialty.clone(),
            status: card.availability_label,
            action: card.call_action_label,
        }
    }
}

/// Execute list command
pub fn execute(config: ConsultConfig, query: Option<&str>, json: bool) -> Result<()> {
    let manager = ConsultManager::builder().config(config).build()?;
    if let Some(query) = query {
        manager.set_query(query);
    }

    let cards = manager.visible_cards();
    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    if cards.is_empty() {
        println!(
            "{}",
            format!("No providers match \"{}\"", manager.query()).yellow()
        );
        return Ok(());
    }

    let online = cards.iter().filter(|c| c.call_enabled).count();
    let mut table = Table::new(cards.iter().map(ProviderRow::from));
    table.with(Style::rounded());

    println!("{table}");
    println!(
        "{} of {} shown, {} available now",
        cards.len(),
        manager.provider_count(),
        online.to_string().green()
    );
    Ok(())
}
