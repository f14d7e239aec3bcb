//! Terminal presentation of a design run.

use crate::{
    decorator::{build_link, DesignOutcome, Notice, NoticeLevel},
    models::{GeneratedImage, ProductItem, SourceImage, Style},
};
use chrono::{DateTime, Utc};
use colored::*;
use std::fmt::Write;
use std::path::Path;

pub const GRID_COLUMNS: usize = 3;
const CARD_WIDTH: usize = 34;

pub fn banner() -> String {
    format!(
        "{}\n{}\n",
        "✨ AI Interior Decorator".bright_magenta().bold(),
        "Pick a style, describe your wishes, and get a new look plus shopping links.".bright_black()
    )
}

pub fn missing_key_warning() -> String {
    format!(
        "{} {}",
        "⚠️".yellow(),
        "API key missing. Set GEMINI_API_KEY (or add it to .env) to enable generation."
            .yellow()
            .bold()
    )
}

pub fn style_list() -> String {
    let mut out = String::new();
    for style in Style::ALL {
        let _ = writeln!(
            out,
            "  {} {}",
            format!("{:<20}", style.display_name()).bold(),
            style.slug().bright_black()
        );
    }
    out
}

pub fn notice_line(notice: &Notice) -> String {
    let text = notice.to_string();
    match notice.level {
        NoticeLevel::Info => text.normal().to_string(),
        NoticeLevel::Warning => text.yellow().to_string(),
        NoticeLevel::Error => text.red().bold().to_string(),
    }
}

/// `design_<style slug>_<unix time>.<ext>`
pub fn output_file_name(style: Style, image: &GeneratedImage, at: DateTime<Utc>) -> String {
    format!(
        "design_{}_{}.{}",
        style.slug(),
        at.timestamp(),
        image.extension()
    )
}

/// Deals items into `columns` columns round-robin: item i lands in column i % columns.
pub fn grid_columns(items: &[ProductItem], columns: usize) -> Vec<Vec<&ProductItem>> {
    let columns = columns.max(1);
    let mut grid: Vec<Vec<&ProductItem>> = vec![Vec::new(); columns];
    for (index, item) in items.iter().enumerate() {
        grid[index % columns].push(item);
    }
    grid
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", clipped)
    }
}

/// Cards side by side, one grid row at a time, each followed by its links.
pub fn product_grid(items: &[ProductItem]) -> String {
    let grid = grid_columns(items, GRID_COLUMNS);
    let rows = grid.first().map(|column| column.len()).unwrap_or(0);
    let mut out = String::new();

    for row in 0..rows {
        let cards: Vec<&ProductItem> = grid
            .iter()
            .filter_map(|column| column.get(row).copied())
            .collect();

        let names: Vec<String> = cards
            .iter()
            .map(|item| clip(&item.name, CARD_WIDTH).bold().cyan().to_string())
            .collect();
        let colors: Vec<String> = cards
            .iter()
            .map(|item| clip(&format!("Color: {}", item.color), CARD_WIDTH))
            .collect();

        let _ = writeln!(out, "{}", names.join("  "));
        let _ = writeln!(out, "{}", colors.join("  ").bright_black());
        for item in &cards {
            let _ = writeln!(out, "  🛒 {}: {}", item.name, build_link(item).underline());
        }
        out.push('\n');
    }

    out
}

fn describe_source(image: &SourceImage) -> String {
    let origin = image
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "upload".to_string());
    match image.dimensions() {
        Ok((w, h)) => format!("{} ({}x{}, {})", origin, w, h, image.mime_type),
        Err(_) => format!("{} ({})", origin, image.mime_type),
    }
}

pub fn outcome_report(outcome: &DesignOutcome, saved_to: Option<&Path>) -> String {
    let mut out = String::new();

    if let Some(source) = &outcome.source_image {
        let _ = writeln!(out, "{}", "Original Room".bold());
        let _ = writeln!(out, "  {}\n", describe_source(source));
    }

    if let Some(image) = &outcome.generated {
        let _ = writeln!(out, "{}", format!("✨ Result: {}", outcome.style).bold());
        let dimensions = image
            .dimensions()
            .map(|(w, h)| format!("{}x{}", w, h))
            .unwrap_or_else(|_| "unknown size".to_string());
        match saved_to {
            Some(path) => {
                let _ = writeln!(out, "  Saved to {} ({})\n", path.display(), dimensions);
            }
            None => {
                let _ = writeln!(out, "  Generated {} image ({})\n", image.mime_type, dimensions);
            }
        }
    }

    if outcome.has_products() {
        let _ = writeln!(out, "{}", "🛍️  Product Analysis".bold());
        let _ = writeln!(
            out,
            "{}\n",
            "Items spotted in the newly generated design:".bright_black()
        );
        out.push_str(&product_grid(&outcome.products));
    }

    for notice in outcome.notices.iter() {
        let _ = writeln!(out, "{}", notice_line(notice));
    }

    out
}
