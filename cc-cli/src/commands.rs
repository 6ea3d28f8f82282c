//! Subcommand handlers

use std::collections::HashMap;
use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context as _, Result};
use cc_cli::ai_client::AiClient;
use cc_cli::render;
use cc_common::models::{ClothingItem, ItemUpdate, NewClothingItem, NewOutfit};
use cc_common::wardrobe::ClosetFilter;
use cc_store::{ImageUpload, PocketBase, RecordAction};
use chrono::Utc;
use futures::StreamExt;
use tracing::{info, warn};

use crate::{AddArgs, Command, EditArgs};

/// Closet page size; the listing filters client-side within it
const CLOSET_PAGE_SIZE: u32 = 200;

pub struct Context {
    pub pb: PocketBase,
    pub ai: AiClient,
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => login(ctx, &email, password).await,
        Command::Register { email, name, password } => register(ctx, &email, &name, password).await,
        Command::Logout => {
            ctx.pb.logout();
            println!("Signed out");
            Ok(())
        }
        Command::ResetPassword { email } => {
            ctx.pb.request_password_reset(&email).await?;
            println!("If an account exists for {}, a reset link is on its way.", email);
            Ok(())
        }
        Command::Dashboard => dashboard(ctx).await,
        Command::List {
            search,
            category,
            color,
            season,
            sort,
        } => {
            let filter = ClosetFilter {
                search,
                category,
                color,
                season,
            };
            list(ctx, &filter, sort.as_sort()).await
        }
        Command::Show { id } => show(ctx, &id).await,
        Command::Add(args) => add(ctx, args).await,
        Command::Wear { id } => {
            let item = ctx.pb.clothing_items().increment_wear_count(&id, Utc::now()).await?;
            println!("{} worn {} times", item.display_name(), item.wear_count);
            Ok(())
        }
        Command::Edit(args) => edit(ctx, args).await,
        Command::Delete { id, yes } => delete(ctx, &id, yes).await,
        Command::Watch => watch(ctx).await,
        Command::Suggest { id, occasion, save } => suggest(ctx, &id, occasion.as_deref(), save).await,
        Command::Outfits { page, per_page } => outfits(ctx, page, per_page).await,
        Command::Insights { filter } => insights(ctx, filter.map(Into::into)).await,
    }
}

async fn login(ctx: &Context, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };
    let user = ctx.pb.auth_with_password(email, &password).await?;
    let name = if user.name.is_empty() { &user.email } else { &user.name };
    println!("Signed in as {}", name);
    Ok(())
}

async fn register(ctx: &Context, email: &str, name: &str, password: Option<String>) -> Result<()> {
    let (password, confirm) = match password {
        Some(p) => (p.clone(), p),
        None => (prompt("Password: ")?, prompt("Confirm password: ")?),
    };
    if password != confirm {
        bail!("Passwords do not match");
    }

    ctx.pb.register(name, email, &password, &confirm).await?;
    ctx.pb.auth_with_password(email, &password).await?;
    println!("Account created; signed in as {}", email);
    Ok(())
}

async fn dashboard(ctx: &Context) -> Result<()> {
    let now = Utc::now();
    let stats = ctx.pb.clothing_items().dashboard_stats(now).await?;
    println!("{}", render::dashboard(&stats, now));
    Ok(())
}

async fn list(ctx: &Context, filter: &ClosetFilter, sort: &str) -> Result<()> {
    let page = ctx
        .pb
        .clothing_items()
        .get_user_items(1, CLOSET_PAGE_SIZE, None, Some(sort))
        .await?;
    if page.total_items > page.items.len() as i64 {
        warn!(
            total = page.total_items,
            loaded = page.items.len(),
            "Closet larger than one page; listing the first page only"
        );
    }

    let shown = filter.apply(&page.items);
    if shown.is_empty() {
        if page.items.is_empty() {
            println!("Your closet is empty. Add your first item with `cc-cli add`.");
        } else {
            println!("No items match these filters.");
        }
        return Ok(());
    }
    println!("{}", render::item_list(&shown, page.items.len(), Utc::now()));
    Ok(())
}

async fn show(ctx: &Context, id: &str) -> Result<()> {
    let items = ctx.pb.clothing_items();
    let item = items.get_one(id).await?;
    let url = items.image_url(&item, None);
    println!("{}", render::item_detail(&item, &url, Utc::now()));
    Ok(())
}

async fn add(ctx: &Context, args: AddArgs) -> Result<()> {
    let image = match &args.image {
        Some(path) => Some(
            ImageUpload::from_path(path).with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let mut form = NewClothingItem::default();

    if args.analyze {
        if let Some(image) = &image {
            image.validate()?;
            let analysis = ctx.ai.analyze_image(image).await?;
            println!("{}\n", render::analysis(&analysis));
            apply_analysis(&mut form, &analysis);
        }
    }

    apply_add_args(&mut form, args);

    let item = ctx
        .pb
        .clothing_items()
        .create(&form, image.as_ref())
        .await
        .map_err(|e| {
            let message = e.item_create_message();
            anyhow::Error::new(e).context(message)
        })?;
    println!("Added {} ({})", item.display_name(), item.id);
    Ok(())
}

fn apply_analysis(form: &mut NewClothingItem, analysis: &cc_common::ai_types::ClothingAnalysis) {
    form.name = analysis.name.clone();
    if let Some(category) = analysis.category() {
        form.category = Some(category);
    }
    if let Some(color) = analysis.color() {
        form.color = Some(color);
    }
    if let Some(season) = analysis.season() {
        form.season = Some(season);
    }
    if let Some(brand) = analysis.brand() {
        form.brand = brand.to_string();
    }
    if !analysis.occasions.is_empty() {
        form.tags = analysis.occasions.join(", ");
    }
}

/// Flags given on the command line win over anything analyzed
fn apply_add_args(form: &mut NewClothingItem, args: AddArgs) {
    if let Some(name) = args.name {
        form.name = name;
    }
    if args.category.is_some() {
        form.category = args.category;
    }
    if args.color.is_some() {
        form.color = args.color;
    }
    if args.size.is_some() {
        form.size = args.size;
    }
    if args.season.is_some() {
        form.season = args.season;
    }
    if let Some(brand) = args.brand {
        form.brand = brand;
    }
    if let Some(price) = args.price {
        form.purchase_price = price;
    }
    if let Some(description) = args.description {
        form.description = description;
    }
    if let Some(tags) = args.tags {
        form.tags = tags;
    }
}

async fn edit(ctx: &Context, args: EditArgs) -> Result<()> {
    let changes = ItemUpdate {
        name: args.name,
        category: args.category,
        color: args.color,
        brand: args.brand,
        size: args.size,
        season: args.season,
        purchase_price: args.price,
        description: args.description,
        tags: args.tags.as_deref().map(split_tags),
        ..ItemUpdate::default()
    };
    if changes.is_empty() {
        bail!("Nothing to change; pass at least one field flag");
    }

    let item = ctx.pb.clothing_items().update(&args.id, &changes).await?;
    println!("Updated {} ({})", item.display_name(), item.id);
    Ok(())
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

async fn delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    let items = ctx.pb.clothing_items();
    let item = items.get_one(id).await?;

    if !yes {
        let answer = prompt(&format!("Delete {}? [y/N] ", item.display_name()))?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    items.delete(id).await?;
    println!("Deleted {}", item.display_name());
    Ok(())
}

async fn watch(ctx: &Context) -> Result<()> {
    let mut events = ctx.pb.clothing_items().subscribe().await?;
    eprintln!("Watching for changes; Ctrl+C to stop");

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => {
                    let action = match event.action {
                        RecordAction::Create => "added",
                        RecordAction::Update => "updated",
                        RecordAction::Delete => "deleted",
                    };
                    println!("{:<8} {}", action, render::item_line(&event.record, Utc::now()));
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    info!("Realtime connection closed");
                    return Ok(());
                }
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

async fn suggest(ctx: &Context, id: &str, occasion: Option<&str>, save: Option<usize>) -> Result<()> {
    let items = ctx.pb.clothing_items();
    let selected = items.get_one(id).await?;
    let wardrobe: Vec<ClothingItem> = items
        .get_all_user_items()
        .await?
        .into_iter()
        .filter(|item| item.id != selected.id)
        .collect();
    if wardrobe.is_empty() {
        bail!("Add a few more items before asking for outfits");
    }

    let reply = ctx.ai.suggest_outfits(&selected, &wardrobe, occasion).await?;
    println!("{}", render::suggestions(&reply));

    let Some(n) = save else {
        return Ok(());
    };
    let suggestion = n
        .checked_sub(1)
        .and_then(|i| reply.suggestions.get(i))
        .ok_or_else(|| anyhow!("No suggestion number {}", n))?;

    let outfit = NewOutfit {
        name: suggestion.name.clone(),
        occasion: suggestion.occasion.clone(),
        notes: suggestion.styling_tips.clone(),
        clothing_items: item_ids_for(&suggestion.items, &selected, &wardrobe),
        ..NewOutfit::default()
    };
    let saved = ctx.pb.outfits().create(&outfit).await?;
    println!("\nSaved outfit {} ({})", saved.name, saved.id);
    Ok(())
}

/// Resolve outfit item names to record ids, case-insensitively
fn item_ids_for(names: &[String], selected: &ClothingItem, wardrobe: &[ClothingItem]) -> Vec<String> {
    let by_name: HashMap<String, &str> = std::iter::once(selected)
        .chain(wardrobe)
        .map(|item| (item.display_name().trim().to_lowercase(), item.id.as_str()))
        .collect();

    let mut ids: Vec<String> = Vec::new();
    for name in names {
        match by_name.get(&name.trim().to_lowercase()) {
            Some(id) if !ids.iter().any(|seen| seen.as_str() == *id) => ids.push(id.to_string()),
            Some(_) => {}
            None => warn!(item = %name, "Outfit item not found in wardrobe"),
        }
    }
    ids
}

async fn outfits(ctx: &Context, page: u32, per_page: u32) -> Result<()> {
    let list = ctx.pb.outfits().get_user_outfits(page, per_page, None).await?;
    if list.items.is_empty() {
        println!("No saved outfits. Save one with `cc-cli suggest <id> --save 1`.");
        return Ok(());
    }
    for outfit in &list.items {
        println!("{}", render::outfit(outfit));
    }
    println!("Page {} of {} ({} outfits)", list.page, list.total_pages, list.total_items);
    Ok(())
}

async fn insights(ctx: &Context, decision: Option<cc_common::ai_types::Disposition>) -> Result<()> {
    let wardrobe = ctx.pb.clothing_items().get_all_user_items().await?;
    if wardrobe.is_empty() {
        bail!("Your closet is empty. Add some items first.");
    }

    let insights = ctx.ai.wardrobe_insights(&wardrobe).await?;
    println!("{}", render::insights(&insights, decision));
    Ok(())
}

/// Read one line from stdin after printing `label` to stderr
fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_common::ai_types::{ClothingAnalysis, Disposition, Level};
    use cc_common::models::{Category, Color, Season};
    use serde_json::json;

    fn item(id: &str, name: &str) -> ClothingItem {
        serde_json::from_value(json!({ "id": id, "name": name })).unwrap()
    }

    #[test]
    fn test_item_ids_resolved_by_name() {
        let selected = item("a1", "White Shirt");
        let wardrobe = vec![item("b2", "Jeans"), item("c3", "Loafers")];
        let names = vec![
            "white shirt".to_string(),
            " JEANS ".to_string(),
            "Gold Watch".to_string(),
            "Jeans".to_string(),
        ];

        assert_eq!(item_ids_for(&names, &selected, &wardrobe), vec!["a1", "b2"]);
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("work, casual,,  summer "), vec!["work", "casual", "summer"]);
        assert!(split_tags(" , ").is_empty());
    }

    #[test]
    fn test_flags_override_analysis() {
        let analysis = ClothingAnalysis {
            name: "Denim Jacket".into(),
            category: "Outerwear".into(),
            color: "Blue".into(),
            pattern: "Solid".into(),
            material: "Denim".into(),
            style: "Casual".into(),
            season: "Fall".into(),
            occasions: vec!["casual".into(), "weekend".into()],
            brand_guess: "Unknown".into(),
            condition: "Good".into(),
            care_tips: vec![],
            resale_potential: Level::Medium,
            keep_donate_sell: Disposition::Keep,
            recommendation_reason: String::new(),
        };

        let mut form = NewClothingItem::default();
        apply_analysis(&mut form, &analysis);
        assert_eq!(form.name, "Denim Jacket");
        assert_eq!(form.category, Some(Category::Outerwear));
        assert_eq!(form.season, Some(Season::Fall));
        assert_eq!(form.brand, "");
        assert_eq!(form.tags, "casual, weekend");

        apply_add_args(
            &mut form,
            AddArgs {
                name: Some("Trucker Jacket".into()),
                color: Some(Color::Navy),
                ..AddArgs::default()
            },
        );
        assert_eq!(form.name, "Trucker Jacket");
        assert_eq!(form.color, Some(Color::Navy));
        assert_eq!(form.category, Some(Category::Outerwear));
    }
}
