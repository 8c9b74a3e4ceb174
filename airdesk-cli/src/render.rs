//! Terminal rendering for airdesk-core types.
//!
//! Human output goes through the [`Render`] trait and owo_colors. With
//! `--json`, [`Printer`] prints the response envelope verbatim instead.

use airdesk_core::store::{AgentDirectory, BadgeStyle};
use airdesk_core::{
    Agent, AirdeskError, ApiResponse, Appointment, AppointmentStatus, Contact, DeletedRecord,
};
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Contact {
    fn render(&self) -> String {
        let name = self.full_name();
        let name = if name.is_empty() {
            "(unnamed)".dimmed().to_string()
        } else {
            name.bold().to_string()
        };

        let details: Vec<&str> = [self.email.as_deref(), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();

        format!("{} {}  {}", name, details.join(" · "), self.id.dimmed())
    }
}

/// An agent with its badge resolved against a directory.
pub struct AgentLine<'a> {
    pub agent: &'a Agent,
    pub directory: &'a AgentDirectory,
}

impl Render for AgentLine<'_> {
    fn render(&self) -> String {
        let r = self.agent.to_agent_ref();
        let badge = badge(
            &self.directory.initials_for(&r),
            &self.directory.badge_style_for(&r),
        );
        let email = self.agent.email.as_deref().unwrap_or_default();

        format!(
            "{} {} {}  {}",
            badge,
            self.directory.display_name_for(&r).bold(),
            email,
            self.agent.id.dimmed()
        )
    }
}

impl Render for AppointmentStatus {
    fn render(&self) -> String {
        let label = format!("{:<9}", self.as_str());
        match self {
            AppointmentStatus::Upcoming => label.green().to_string(),
            AppointmentStatus::Completed => label.dimmed().to_string(),
            AppointmentStatus::Cancelled => label.red().to_string(),
        }
    }
}

/// An appointment as of `now`, with agent badges colored by `directory`.
pub struct AppointmentLine<'a> {
    pub appointment: &'a Appointment,
    pub directory: &'a AgentDirectory,
    pub now: DateTime<Utc>,
}

impl Render for AppointmentLine<'_> {
    fn render(&self) -> String {
        let appt = self.appointment;

        let date = appt
            .date
            .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "no date         ".to_string());
        let address = appt.address.as_deref().unwrap_or("(no address)");
        let contact = appt.contact_full_name();

        let badges: Vec<String> = appt
            .agents()
            .iter()
            .map(|agent| {
                badge(
                    &self.directory.initials_for(agent),
                    &self.directory.badge_style_for(agent),
                )
            })
            .collect();

        let mut line = format!("{} {}  {}", appt.status(self.now).render(), date, address.bold());
        if !contact.is_empty() {
            line.push_str(&format!("  {contact}"));
        }
        if !badges.is_empty() {
            line.push_str(&format!("  {}", badges.join(" ")));
        }
        format!("{line}  {}", appt.id.dimmed())
    }
}

impl Render for DeletedRecord {
    fn render(&self) -> String {
        if self.deleted {
            format!("{} {}", "Deleted".red(), self.id)
        } else {
            format!("{} {}", "Not deleted".yellow(), self.id)
        }
    }
}

/// ` GH ` on the agent's color. Unparseable colors fall back to plain text.
pub fn badge(initials: &str, style: &BadgeStyle) -> String {
    let text = format!(" {initials} ");
    match (parse_hex(&style.background), parse_hex(&style.foreground)) {
        (Some((br, bg, bb)), Some((fr, fg, fb))) => text
            .truecolor(fr, fg, fb)
            .on_truecolor(br, bg, bb)
            .to_string(),
        _ => format!("[{initials}]"),
    }
}

/// `#rrggbb` or `#rgb`.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let (r, g, b) = (channel(&hex[0..1])?, channel(&hex[1..2])?, channel(&hex[2..3])?);
            Some((r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}

/// Joins rendered items, or a dimmed placeholder when there are none.
pub fn render_lines<T>(items: &[T], empty: &str, render: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.dimmed().to_string();
    }
    items.iter().map(render).collect::<Vec<_>>().join("\n")
}

#[derive(Clone, Copy)]
pub struct Printer {
    pub json: bool,
}

impl Printer {
    /// The JSON envelope, or whatever `human` makes of the payload.
    pub fn emit<T: Serialize>(
        &self,
        response: &ApiResponse<T>,
        human: impl FnOnce(&T) -> String,
    ) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(response)?);
        } else {
            println!("{}", human(&response.data));
        }
        Ok(())
    }

    /// Failure envelope on stdout for `--json` callers.
    pub fn error(&self, err: &anyhow::Error) -> Result<()> {
        let envelope = match err.downcast_ref::<AirdeskError>() {
            Some(e) => serde_json::to_value(e.envelope())?,
            None => json!({
                "success": false,
                "data": null,
                "status": null,
                "statusText": "",
                "message": format!("{err:#}"),
                "type": "Error",
            }),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        Ok(())
    }

    /// Run `work` behind a spinner unless stdout is reserved for JSON.
    pub async fn spin<T>(&self, message: &str, work: impl std::future::Future<Output = T>) -> T {
        if self.json {
            work.await
        } else {
            crate::utils::tui::spin(message, work).await
        }
    }
}
