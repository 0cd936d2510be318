//! Ticket text templates.
//!
//! Tokens are literal and case-sensitive (`{{client_name}}`). Every
//! occurrence is replaced in one pass, so substituted text is never
//! re-expanded. Unknown tokens are left as-is.

use chrono::{DateTime, Utc};

/// Values available to ticket templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    pub alert_id: String,
    pub alert_type: String,
    pub alert_message: String,
    pub alert_timestamp: String,
    pub client_id: String,
    pub client_name: String,
    pub device_id: String,
    pub device_name: String,
    pub agent_name: String,
    pub agent_hostname: String,
}

impl TemplateContext {
    fn lookup(&self, token: &str) -> Option<&str> {
        let value = match token {
            "alert_id" => &self.alert_id,
            "alert_type" => &self.alert_type,
            "alert_message" => &self.alert_message,
            "alert_timestamp" => &self.alert_timestamp,
            "client_id" => &self.client_id,
            "client_name" => &self.client_name,
            "device_id" => &self.device_id,
            "device_name" => &self.device_name,
            "agent_name" => &self.agent_name,
            "agent_hostname" => &self.agent_hostname,
            _ => return None,
        };
        Some(value)
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Substitute every known `{{token}}` in `template`.
pub fn render(template: &str, ctx: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after
            .find("}}")
            .and_then(|end| ctx.lookup(&after[..end]).map(|value| (end, value)))
        {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}
