//! Trip settlement example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;
use tripsplit_core::utils::MemoryStorage;
use tripsplit_core::{
    describe_transfers, patterns, CurrencySettings, ExpenseBuilder, Member, Payer, TripBook,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧳 Tripsplit Core - Trip Settlement Example\n");

    let storage = MemoryStorage::new();
    let mut book = TripBook::new(storage);

    // 1. Create the trip and its roster
    let trip = book
        .create_trip(
            "Hokkaido in winter".to_string(),
            "Sapporo".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            CurrencySettings::new("JPY", "TWD", BigDecimal::from_str("0.21")?)?,
        )
        .await?;

    let members = [
        Member::new("alice", "Alice"),
        Member::new("bob", "Bob"),
        Member::new("chen", "Chen"),
        Member::new("dana", "Dana"),
    ];
    for member in &members {
        book.add_companion(&trip.id, member.clone()).await?;
        println!("  ✓ Added companion: {}", member.name);
    }
    let roster: Vec<String> = members.iter().map(|m| m.id.clone()).collect();
    println!();

    // 2. Record expenses
    println!("💴 Recording expenses...\n");
    let day = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();

    let lodging = patterns::split_equally(
        day,
        "Ryokan, two nights".to_string(),
        BigDecimal::from(96000),
        "alice".to_string(),
        &roster,
    )?;
    book.record_expense(&trip.id, lodging).await?;
    println!("  ✓ Alice paid ¥96,000 for the ryokan (everyone)");

    let crab = ExpenseBuilder::new(
        day,
        "Crab dinner".to_string(),
        BigDecimal::from(25000),
        Payer::from("bob"),
    )
    .category("food".to_string())
    .targets(vec!["alice".to_string(), "bob".to_string(), "chen".to_string()])
    .build()?;
    book.record_expense(&trip.id, crab).await?;
    println!("  ✓ Bob paid ¥25,000 for crab (Alice, Bob, Chen)");

    let ski = ExpenseBuilder::new(
        day,
        "Ski passes".to_string(),
        BigDecimal::from(2100),
        Payer::from("dana"),
    )
    .category("activity".to_string())
    .currency("TWD".to_string())
    .targets(vec!["chen".to_string(), "dana".to_string()])
    .build()?;
    book.record_expense(&trip.id, ski).await?;
    println!("  ✓ Dana paid NT$2,100 for ski passes (Chen, Dana)\n");

    // 3. Spending overview
    let summary = book.summarize_expenses(&trip.id).await?;
    println!("📊 Total spent: ¥{} (~NT${})", summary.total, summary.total_home.round(0));
    for (category, amount) in &summary.by_category {
        println!("  • {}: ¥{}", category, amount.round(0));
    }
    println!();

    // 4. Settle up
    let report = book.settle_trip(&trip.id).await?;
    println!("⚖️  Balances:");
    for balance in &report.balances {
        println!("  {}: {}", balance.participant, balance.balance.round(2));
    }
    println!();

    println!("🤝 Suggested transfers:");
    if report.is_settled() {
        println!("  Everyone is square!");
    }
    for line in describe_transfers(&report.transfers, &members) {
        println!("  {}", line);
    }

    Ok(())
}
