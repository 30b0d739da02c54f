//! Announcement message builders.

use artweeks_db::models::week::Week;
use artweeks_db::models::work::Work;

use crate::webhook::{Embed, EmbedImage, WebhookMessage};

/// Discord caps embed descriptions at 4096 characters.
const MAX_DESCRIPTION_CHARS: usize = 4096;

const WEEK_COLOR: u32 = 0x5865F2;
const WORK_COLOR: u32 = 0x57F287;

const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".avif"];

/// Announcement for a published week.
pub fn week_message(week: &Week, site_url: &str) -> WebhookMessage {
    WebhookMessage {
        content: format!("**Week {} of {} is live!**", week.week, week.year),
        embeds: vec![Embed {
            title: week.theme.clone(),
            description: truncate(&week.information, MAX_DESCRIPTION_CHARS),
            url: Some(format!(
                "{}/weeks/{}/{}",
                site_url.trim_end_matches('/'),
                week.year,
                week.week
            )),
            color: Some(WEEK_COLOR),
            image: None,
        }],
    }
}

/// Announcement for an approved work.
pub fn work_message(work: &Work, site_url: &str) -> WebhookMessage {
    let weeks = work
        .week_numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let label = if work.week_numbers.len() > 1 { "weeks" } else { "week" };

    WebhookMessage {
        content: format!(
            "New work by **{}** for {label} {weeks} of {}",
            work.artist_name, work.year
        ),
        embeds: vec![Embed {
            title: work.title.clone(),
            description: truncate(&work.description, MAX_DESCRIPTION_CHARS),
            url: Some(format!("{}/works/{}", site_url.trim_end_matches('/'), work.id)),
            color: Some(WORK_COLOR),
            image: preview_image(work).map(|url| EmbedImage { url }),
        }],
    }
}

/// First item thumbnail, or the first item that looks like an image.
fn preview_image(work: &Work) -> Option<String> {
    work.items
        .iter()
        .find_map(|i| i.thumbnail_url.clone())
        .or_else(|| {
            work.items
                .iter()
                .find(|i| looks_like_image(&i.url))
                .map(|i| i.url.clone())
        })
}

fn looks_like_image(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use artweeks_db::models::work::WorkItem;
    use chrono::Utc;

    use super::*;

    fn work(items: Vec<WorkItem>, weeks: Vec<u32>) -> Work {
        Work {
            id: "abcd1234".into(),
            year: 2024,
            week_numbers: weeks,
            artist_id: "1".into(),
            artist_name: "Moon".into(),
            title: "Tide".into(),
            medium: None,
            description: "Ink on paper".into(),
            items,
            is_approved: true,
            is_soft_deleted: None,
            submitted_timestamp: Utc::now(),
            discord_id: None,
        }
    }

    fn item(url: &str, thumb: Option<&str>) -> WorkItem {
        WorkItem {
            url: url.into(),
            thumbnail_url: thumb.map(str::to_string),
        }
    }

    #[test]
    fn week_message_links_to_site() {
        let week = Week {
            year: 2024,
            week: 3,
            theme: "Water".into(),
            information: "Draw water.".into(),
            is_published: true,
            discord_id: None,
        };
        let msg = week_message(&week, "https://art.example/");
        assert_eq!(msg.content, "**Week 3 of 2024 is live!**");
        assert_eq!(msg.embeds[0].title, "Water");
        assert_eq!(
            msg.embeds[0].url.as_deref(),
            Some("https://art.example/weeks/2024/3")
        );
    }

    #[test]
    fn work_message_lists_all_weeks() {
        let msg = work_message(&work(vec![item("https://x/a.png", None)], vec![3, 4]), "https://art.example");
        assert_eq!(msg.content, "New work by **Moon** for weeks 3, 4 of 2024");
        assert_eq!(
            msg.embeds[0].url.as_deref(),
            Some("https://art.example/works/abcd1234")
        );
    }

    #[test]
    fn work_image_prefers_thumbnail() {
        let w = work(
            vec![
                item("https://x/a.png", None),
                item("https://youtu.be/v", Some("https://x/thumb.jpg")),
            ],
            vec![1],
        );
        assert_eq!(preview_image(&w).as_deref(), Some("https://x/thumb.jpg"));
    }

    #[test]
    fn work_image_falls_back_to_image_item() {
        let w = work(
            vec![item("https://youtu.be/v", None), item("https://x/b.JPG?s=1", None)],
            vec![1],
        );
        assert_eq!(preview_image(&w).as_deref(), Some("https://x/b.JPG?s=1"));

        let none = work(vec![item("https://youtu.be/v", None)], vec![1]);
        assert_eq!(preview_image(&none), None);
    }

    #[test]
    fn long_text_is_truncated() {
        let text = "a".repeat(5000);
        let out = truncate(&text, MAX_DESCRIPTION_CHARS);
        assert_eq!(out.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(out.ends_with('…'));
    }
}
