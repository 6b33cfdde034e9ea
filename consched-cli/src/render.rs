//! Terminal rendering for schedule events.
//!
//! Times are shown in the convention's time zone, not the machine's.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use consched_core::event::Event;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self, tz: Tz) -> String;
}

impl Render for Event {
    fn render(&self, tz: Tz) -> String {
        let mut line = format!("  {} {}", format_time(self.start, tz), self.name);

        if !self.room.is_empty() {
            line.push_str(&format!(" {}", format!("@ {}", self.room).dimmed()));
        }
        if !self.category.is_empty() {
            line.push_str(&format!(" {}", format!("[{}]", self.category).dimmed()));
        }

        line
    }
}

/// Multi-line detail view of a single event.
pub fn render_detail(event: &Event, tz: Tz) -> String {
    let mut lines = vec![event.name.bold().to_string()];

    let when = match event.end {
        Some(end) => format!(
            "{} {}-{}",
            format_date_label(event.start, tz),
            format_time(event.start, tz).trim(),
            format_time(end, tz).trim()
        ),
        None => format!(
            "{} {}",
            format_date_label(event.start, tz),
            format_time(event.start, tz).trim()
        ),
    };
    lines.push(format!("  When:     {when}"));

    for (label, value) in [
        ("Where", &event.room),
        ("Category", &event.category),
        ("Tags", &event.tags),
        ("Hosts", &event.hosts),
    ] {
        if !value.is_empty() {
            lines.push(format!("  {:<9} {}", format!("{label}:"), value));
        }
    }
    lines.push(format!("  {:<9} {}", "Id:", event.id.dimmed()));

    if let Some(description) = &event.description {
        lines.push(String::new());
        lines.push(description.to_string());
    }

    lines.join("\n")
}

/// Events grouped under day headings, in the given order.
pub fn render_listing(events: &[Event], tz: Tz) -> String {
    if events.is_empty() {
        return "No events found".dimmed().to_string();
    }

    let mut lines = Vec::new();
    let mut current_date: Option<String> = None;

    for event in events {
        let date_label = format_date_label(event.start, tz);

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(date_label.bold().to_string());
            current_date = Some(date_label);
        }

        lines.push(event.render(tz));
    }

    lines.join("\n")
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Sat Mar 21")
fn format_date_label(time: DateTime<Utc>, tz: Tz) -> String {
    let today = Utc::now().with_timezone(&tz).date_naive();
    let date = time.with_timezone(&tz).date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

fn format_time(time: DateTime<Utc>, tz: Tz) -> String {
    format!("{:>5}", time.with_timezone(&tz).format("%H:%M"))
}
